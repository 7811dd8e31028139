//! Site navigation: the header menu and the footer link columns.

use serde::Serialize;

/// A link in the header or footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavLink {
    /// Link text.
    pub label: &'static str,
    /// Local URL.
    pub href: &'static str,
}

/// A titled column of footer links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FooterColumn {
    /// Column heading.
    pub title: &'static str,
    /// Links under the heading.
    pub links: &'static [NavLink],
}

const fn link(label: &'static str, href: &'static str) -> NavLink {
    NavLink { label, href }
}

/// Header menu, in display order.
pub const MAIN_NAV: &[NavLink] = &[
    link("Home", "/"),
    link("Directory", "/directory"),
    link("Search", "/search"),
    link("Accreditation", "/accreditation"),
    link("For Businesses", "/claim"),
];

/// Footer columns, in display order.
pub const FOOTER_COLUMNS: &[FooterColumn] = &[
    FooterColumn {
        title: "Discover",
        links: &[
            link("Business directory", "/directory"),
            link("Search businesses", "/search"),
            link("Accredited businesses", "/search?accredited=on"),
            link("Top rated", "/search?sort=rating"),
        ],
    },
    FooterColumn {
        title: "For Businesses",
        links: &[
            link("Claim your business", "/claim"),
            link("Get accredited", "/accreditation/apply"),
            link("Accreditation standards", "/accreditation"),
            link("Business dashboard", "/dashboard"),
        ],
    },
    FooterColumn {
        title: "Account",
        links: &[
            link("Sign in", "/login"),
            link("Create an account", "/register"),
            link("Forgot password", "/forgot-password"),
        ],
    },
];

/// A header link with its highlight state for the current page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    /// Link text.
    pub label: &'static str,
    /// Local URL.
    pub href: &'static str,
    /// Whether the current page belongs to this item.
    pub active: bool,
}

/// Header menu for a request to `path`.
#[must_use]
pub fn main_nav(path: &str) -> Vec<NavItem> {
    MAIN_NAV
        .iter()
        .map(|link| NavItem {
            label: link.label,
            href: link.href,
            active: is_active(link.href, path),
        })
        .collect()
}

fn is_active(href: &str, path: &str) -> bool {
    if href == "/" {
        return path == "/";
    }
    path == href
        || path
            .strip_prefix(href)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Every distinct local path linked from the header and footer.
#[must_use]
pub fn all_links() -> Vec<&'static str> {
    let mut links: Vec<&'static str> = MAIN_NAV
        .iter()
        .chain(FOOTER_COLUMNS.iter().flat_map(|c| c.links.iter()))
        .map(|link| link.href)
        .collect();
    links.sort_unstable();
    links.dedup();
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_item() {
        let nav = main_nav("/directory");
        let active: Vec<_> = nav.iter().filter(|i| i.active).map(|i| i.label).collect();
        assert_eq!(active, vec!["Directory"]);

        let nav = main_nav("/accreditation/apply");
        assert!(nav.iter().any(|i| i.active && i.label == "Accreditation"));

        let nav = main_nav("/");
        assert!(nav.iter().any(|i| i.active && i.label == "Home"));
        assert_eq!(nav.iter().filter(|i| i.active).count(), 1);
    }

    #[test]
    fn test_prefix_must_end_at_segment() {
        assert!(!is_active("/search", "/searchable"));
        assert!(is_active("/claim", "/claim/acme"));
    }

    #[test]
    fn test_links_are_local() {
        for href in all_links() {
            assert!(href.starts_with('/'), "{href} is not a local path");
        }
        assert!(all_links().contains(&"/forgot-password"));
    }
}
