//! Data shared by every page: head, header, flash notice and footer.

use chrono::{Datelike, Utc};

use super::nav::{main_nav, FooterColumn, NavItem, FOOTER_COLUMNS};
use super::session::Visitor;
use crate::config::{Config, DEFAULT_SITE_NAME};
use crate::domain::Role;

/// Account links shown in the header for a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountBadge {
    /// First name for the greeting.
    pub first_name: String,
    /// Role label.
    pub role: &'static str,
    /// Business owners and admins get a dashboard link.
    pub has_dashboard: bool,
}

/// Layout fields every page template carries.
#[derive(Debug, Clone)]
pub struct Layout {
    /// Site name.
    pub site_name: String,
    /// Document title, `"{page} | {site}"`.
    pub title: String,
    /// Meta description.
    pub description: String,
    /// Header menu.
    pub nav: Vec<NavItem>,
    /// Signed-in account, if any.
    pub account: Option<AccountBadge>,
    /// Flash message.
    pub notice: Option<&'static str>,
    /// Footer columns.
    pub footer: &'static [FooterColumn],
    /// Contact address in the footer.
    pub support_email: String,
    /// Copyright year.
    pub year: i32,
}

impl Layout {
    /// Layout for a page titled `page` seen by `visitor`.
    #[must_use]
    pub fn new(config: &Config, visitor: &Visitor, page: &str, description: impl Into<String>) -> Self {
        let account = visitor.user.as_ref().map(|user| AccountBadge {
            first_name: user.first_name().to_string(),
            role: user.role.label(),
            has_dashboard: user.role != Role::Consumer,
        });
        Self {
            site_name: config.site.name.clone(),
            title: page_title(page, &config.site.name),
            description: description.into(),
            nav: main_nav(&visitor.path),
            account,
            notice: visitor.notice,
            footer: FOOTER_COLUMNS,
            support_email: config.site.support_email.clone(),
            year: Utc::now().year(),
        }
    }

    /// Layout for pages rendered without a request context (errors).
    #[must_use]
    pub fn standalone(page: &str) -> Self {
        let config = Config::default();
        Self {
            site_name: DEFAULT_SITE_NAME.to_string(),
            title: page_title(page, DEFAULT_SITE_NAME),
            description: String::new(),
            nav: main_nav(""),
            account: None,
            notice: None,
            footer: FOOTER_COLUMNS,
            support_email: config.site.support_email,
            year: Utc::now().year(),
        }
    }
}

fn page_title(page: &str, site: &str) -> String {
    if page.is_empty() {
        site.to_string()
    } else {
        format!("{page} | {site}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::User;

    fn visitor(path: &str, user: Option<User>) -> Visitor {
        Visitor {
            user,
            path: path.to_string(),
            ..Visitor::default()
        }
    }

    #[test]
    fn test_title_format() {
        let layout = Layout::new(&Config::default(), &visitor("/search", None), "Search", "");
        assert_eq!(layout.title, "Search | P.I.M.P Business Repository");
        assert!(layout.account.is_none());
        assert!(layout.nav.iter().any(|i| i.active && i.href == "/search"));
    }

    #[test]
    fn test_account_badge() {
        let user = User {
            id: 1,
            name: "Morgan Reyes".to_string(),
            email: "morgan@example.com".to_string(),
            role: Role::BusinessOwner,
            created_at: Utc::now(),
        };
        let layout = Layout::new(&Config::default(), &visitor("/", Some(user)), "Home", "");
        let account = layout.account.unwrap();
        assert_eq!(account.first_name, "Morgan");
        assert!(account.has_dashboard);
    }

    #[test]
    fn test_standalone() {
        let layout = Layout::standalone("Not Found");
        assert_eq!(layout.title, "Not Found | P.I.M.P Business Repository");
        assert!(!layout.nav.iter().any(|i| i.active));
    }
}
