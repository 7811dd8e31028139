//! Directory categories.

use serde::Serialize;

/// A directory category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    /// URL slug.
    pub slug: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Emoji shown on category tiles.
    pub icon: &'static str,
}

/// All categories, in display order.
pub const CATEGORIES: &[Category] = &[
    Category { slug: "restaurants", name: "Restaurants", icon: "🍽️" },
    Category { slug: "home-services", name: "Home Services", icon: "🔧" },
    Category { slug: "automotive", name: "Automotive", icon: "🚗" },
    Category { slug: "health-medical", name: "Health & Medical", icon: "🩺" },
    Category { slug: "beauty-spas", name: "Beauty & Spas", icon: "💇" },
    Category { slug: "professional-services", name: "Professional Services", icon: "💼" },
    Category { slug: "retail", name: "Retail & Shopping", icon: "🛍️" },
    Category { slug: "technology", name: "Technology", icon: "💻" },
];

impl Category {
    /// Look up a category by slug.
    #[must_use]
    pub fn find(slug: &str) -> Option<&'static Category> {
        CATEGORIES.iter().find(|c| c.slug == slug)
    }

    /// Display name for a slug, falling back to the slug itself.
    #[must_use]
    pub fn display_name(slug: &str) -> String {
        Self::find(slug).map_or_else(|| slug.to_string(), |c| c.name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_category() {
        assert_eq!(Category::find("automotive").unwrap().name, "Automotive");
        assert!(Category::find("spaceships").is_none());
    }

    #[test]
    fn test_slugs_are_unique() {
        let mut slugs: Vec<_> = CATEGORIES.iter().map(|c| c.slug).collect();
        slugs.sort_unstable();
        slugs.dedup();
        assert_eq!(slugs.len(), CATEGORIES.len());
    }

    #[test]
    fn test_slugs_match_names() {
        for category in CATEGORIES {
            assert!(!category.slug.contains(' '));
            assert_eq!(category.slug, category.slug.to_lowercase());
        }
    }

    #[test]
    fn test_display_name_fallback() {
        assert_eq!(Category::display_name("retail"), "Retail & Shopping");
        assert_eq!(Category::display_name("unknown"), "unknown");
    }
}
