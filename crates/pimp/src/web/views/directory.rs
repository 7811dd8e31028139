//! Templates for browsing: home page, directory, search and the claim search.

#![allow(missing_docs)]

use askama::Template;
use askama_web::WebTemplate;
use serde::Deserialize;

use super::{BusinessCard, FilterLink, Pager, ReviewView, SelectOption};
use crate::storage::StorageStats;
use crate::web::layout::Layout;

/// A category tile on the home page.
#[derive(Debug, Clone)]
pub struct CategoryTile {
    /// Category slug.
    pub slug: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Emoji icon.
    pub icon: &'static str,
    /// Listings in the category.
    pub count: u32,
}

/// Home page template.
#[derive(Debug, Template, WebTemplate)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub tagline: String,
    pub categories: Vec<CategoryTile>,
    pub featured: Vec<BusinessCard>,
    pub recent: Vec<ReviewView>,
    pub stats: StorageStats,
}

/// Query parameters of the directory page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DirectoryParams {
    pub category: Option<String>,
    pub letter: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
}

/// Directory page template.
#[derive(Debug, Template, WebTemplate)]
#[template(path = "pages/directory.html")]
pub struct DirectoryTemplate {
    pub layout: Layout,
    pub heading: String,
    pub category_links: Vec<FilterLink>,
    pub letter_links: Vec<FilterLink>,
    pub sort_options: Vec<SelectOption>,
    pub category: String,
    pub letter: String,
    pub cards: Vec<BusinessCard>,
    pub pager: Pager,
}

/// Query parameters of the search page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    pub q: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub min_rating: Option<String>,
    pub accredited: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
}

/// Search page template.
#[derive(Debug, Template, WebTemplate)]
#[template(path = "pages/search.html")]
pub struct SearchTemplate {
    pub layout: Layout,
    pub heading: String,
    pub q: String,
    pub location: String,
    pub accredited: bool,
    pub category_options: Vec<SelectOption>,
    pub rating_options: Vec<SelectOption>,
    pub sort_options: Vec<SelectOption>,
    pub cards: Vec<BusinessCard>,
    pub pager: Pager,
}

/// Query parameters of the claim search.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClaimSearchParams {
    pub q: Option<String>,
    pub page: Option<String>,
}

/// Claim step 0: find the listing to claim.
#[derive(Debug, Template, WebTemplate)]
#[template(path = "programs/claim_search.html")]
pub struct ClaimSearchTemplate {
    pub layout: Layout,
    pub q: String,
    pub cards: Vec<BusinessCard>,
    pub pager: Pager,
}
