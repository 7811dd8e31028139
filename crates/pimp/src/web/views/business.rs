//! Templates for a single listing: profile, reviews and the review form.

#![allow(missing_docs)]

use askama::Template;
use askama_web::WebTemplate;
use serde::Deserialize;

use super::{DistributionRow, FilterLink, Pager, ReviewView, SelectOption, StarsView};
use crate::domain::{Business, BusinessHours};
use crate::validation::ValidationErrors;
use crate::web::layout::Layout;

/// Business profile page.
#[derive(Debug, Template, WebTemplate)]
#[template(path = "business/profile.html")]
pub struct ProfileTemplate {
    pub layout: Layout,
    pub business: Business,
    pub stars: StarsView,
    pub categories: Vec<String>,
    pub address: String,
    pub website: String,
    pub founded: String,
    pub hours: Vec<BusinessHours>,
    pub accreditation: String,
    pub accreditation_years: u32,
    pub distribution: Vec<DistributionRow>,
    pub reviews: Vec<ReviewView>,
    pub can_claim: bool,
    pub is_owner: bool,
}

/// Query parameters of the reviews page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReviewsParams {
    pub stars: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
}

/// All reviews of one listing.
#[derive(Debug, Template, WebTemplate)]
#[template(path = "business/reviews.html")]
pub struct ReviewsTemplate {
    pub layout: Layout,
    pub business: Business,
    pub stars: StarsView,
    pub star_links: Vec<FilterLink>,
    pub sort_options: Vec<SelectOption>,
    pub stars_filter: String,
    pub distribution: Vec<DistributionRow>,
    pub reviews: Vec<ReviewView>,
    pub pager: Pager,
}

/// Submitted review form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReviewForm {
    pub rating: String,
    pub title: String,
    pub body: String,
}

/// Write-a-review page.
#[derive(Debug, Template, WebTemplate)]
#[template(path = "business/review_form.html")]
pub struct ReviewFormTemplate {
    pub layout: Layout,
    pub business: Business,
    pub form: ReviewForm,
    pub errors: ValidationErrors,
    pub rating_options: Vec<SelectOption>,
    pub title_max: usize,
    pub body_min: usize,
    pub body_max: usize,
}
