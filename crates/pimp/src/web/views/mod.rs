//! Askama templates
//!
//! Template structs for rendering HTML pages, plus the small view-models
//! (cards, review blocks, pagers) that several pages share. Every page
//! template carries a [`Layout`] and extends `base.html`.

pub mod account;
pub mod business;
pub mod dashboard;
pub mod directory;
pub mod programs;

use askama::Template;
use askama_web::WebTemplate;
use axum::http::StatusCode;

use super::layout::Layout;
use super::session::build_url;
use crate::domain::{Business, RatingSummary, Review, Star, StarRating};
use crate::pagination::Pagination;
use crate::storage::RecentReview;

/// Date format used under reviews and responses.
const DATE_FORMAT: &str = "%B %-d, %Y";

/// A five-star rating and its screen-reader label, rendered by
/// `partials/stars.html` from a `stars` variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarsView {
    /// Star breakdown.
    pub rating: StarRating,
    /// Accessible label, e.g. "Rated 4.5 out of 5".
    pub label: String,
}

impl StarsView {
    /// A rating with its label.
    #[must_use]
    pub fn new(rating: StarRating, label: impl Into<String>) -> Self {
        Self {
            rating,
            label: label.into(),
        }
    }

    /// The five stars, in display order.
    #[must_use]
    pub fn stars(&self) -> Vec<Star> {
        self.rating.stars()
    }
}

/// A listing as a card in directory, search and home page grids.
#[derive(Debug, Clone)]
pub struct BusinessCard {
    /// Profile slug.
    pub slug: String,
    /// Listing name.
    pub name: String,
    /// One-line pitch.
    pub tagline: String,
    /// Letter for the placeholder logo.
    pub initial: char,
    /// Primary category name.
    pub category: String,
    /// City and state.
    pub locality: String,
    /// Phone number.
    pub phone: String,
    /// Star rating.
    pub stars: StarsView,
    /// Average with one decimal.
    pub average: String,
    /// Number of reviews.
    pub review_count: u32,
    /// Accreditation badge.
    pub accredited: bool,
    /// Whether someone owns the listing.
    pub claimed: bool,
}

impl From<&Business> for BusinessCard {
    fn from(business: &Business) -> Self {
        Self {
            slug: business.slug.clone(),
            name: business.name.clone(),
            tagline: business.tagline.clone(),
            initial: business.initial(),
            category: business.primary_category(),
            locality: business.address.locality(),
            phone: business.phone.clone(),
            stars: rating_stars(&business.rating),
            average: business.rating.average_label(),
            review_count: business.rating.count,
            accredited: business.accreditation.is_accredited(),
            claimed: business.is_claimed(),
        }
    }
}

/// Stars for an average rating.
#[must_use]
pub fn rating_stars(rating: &RatingSummary) -> StarsView {
    StarsView::new(
        rating.stars(),
        format!("Rated {} out of 5", rating.average_label()),
    )
}

/// Owner response under a review.
#[derive(Debug, Clone)]
pub struct ResponseView {
    /// Response text.
    pub body: String,
    /// Formatted response date.
    pub date: String,
}

/// A review block.
#[derive(Debug, Clone)]
pub struct ReviewView {
    /// Review id, for the helpful button and respond form.
    pub id: i64,
    /// Author display name.
    pub author: String,
    /// Avatar initials.
    pub initials: String,
    /// Star rating.
    pub stars: StarsView,
    /// Stars given.
    pub rating: u8,
    /// Headline.
    pub title: String,
    /// Review text.
    pub body: String,
    /// Formatted posting date.
    pub date: String,
    /// Helpful votes.
    pub helpful: u32,
    /// Owner response, if any.
    pub response: Option<ResponseView>,
    /// Listing name, when shown outside the listing's own pages.
    pub business_name: String,
    /// Listing slug, paired with `business_name`.
    pub business_slug: String,
}

impl From<&Review> for ReviewView {
    fn from(review: &Review) -> Self {
        Self {
            id: review.id,
            author: review.author_name.clone(),
            initials: review.author_initials(),
            stars: StarsView::new(review.stars(), format!("{} out of 5 stars", review.rating)),
            rating: review.rating,
            title: review.title.clone(),
            body: review.body.clone(),
            date: review.created_at.format(DATE_FORMAT).to_string(),
            helpful: review.helpful_count,
            response: review.response.as_ref().map(|r| ResponseView {
                body: r.body.clone(),
                date: r.responded_at.format(DATE_FORMAT).to_string(),
            }),
            business_name: String::new(),
            business_slug: String::new(),
        }
    }
}

impl From<&RecentReview> for ReviewView {
    fn from(recent: &RecentReview) -> Self {
        Self {
            business_name: recent.business_name.clone(),
            business_slug: recent.business_slug.clone(),
            ..Self::from(&recent.review)
        }
    }
}

/// One bar of a rating distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistributionRow {
    /// Star level.
    pub stars: u8,
    /// Reviews at that level.
    pub count: u32,
    /// Share of all reviews.
    pub percent: u32,
}

/// Distribution bars from five stars down to one.
#[must_use]
pub fn distribution(rating: &RatingSummary) -> Vec<DistributionRow> {
    (1..=5u8)
        .rev()
        .map(|stars| DistributionRow {
            stars,
            count: rating.distribution[usize::from(stars - 1)],
            percent: rating.percent(stars),
        })
        .collect()
}

/// An `<option>` in a select box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    /// Submitted value.
    pub value: String,
    /// Visible text.
    pub label: String,
    /// Whether it is the current choice.
    pub selected: bool,
}

impl SelectOption {
    /// Build options from `(value, label)` pairs, selecting `current`.
    pub fn list<V, L>(pairs: impl IntoIterator<Item = (V, L)>, current: &str) -> Vec<Self>
    where
        V: ToString,
        L: ToString,
    {
        pairs
            .into_iter()
            .map(|(value, label)| {
                let value = value.to_string();
                Self {
                    selected: value == current,
                    value,
                    label: label.to_string(),
                }
            })
            .collect()
    }
}

/// A link in a filter bar (categories, letters, star levels).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterLink {
    /// Link text.
    pub label: String,
    /// Target URL.
    pub href: String,
    /// Whether the filter is applied.
    pub active: bool,
}

/// A numbered page link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    /// Page number.
    pub number: usize,
    /// Target URL.
    pub href: String,
    /// Whether it is the page shown.
    pub current: bool,
}

/// Pagination controls under a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    /// Previous page URL.
    pub prev: Option<String>,
    /// Next page URL.
    pub next: Option<String>,
    /// Numbered links around the current page.
    pub links: Vec<PageLink>,
    /// "Showing 1-12 of 40".
    pub summary: String,
    /// Whether there is more than one page.
    pub visible: bool,
}

impl Pager {
    /// Controls for `pagination`, linking to `path` with `params` kept.
    #[must_use]
    pub fn new(pagination: &Pagination, path: &str, params: &[(&str, &str)]) -> Self {
        let href = |page: usize| {
            let page = page.to_string();
            let mut all = params.to_vec();
            all.push(("page", &page));
            build_url(path, &all)
        };
        let summary = if pagination.total == 0 {
            "No results".to_string()
        } else {
            format!(
                "Showing {}-{} of {}",
                pagination.first_item(),
                pagination.last_item(),
                pagination.total
            )
        };
        Self {
            prev: pagination.prev().map(&href),
            next: pagination.next().map(&href),
            links: pagination
                .window()
                .into_iter()
                .map(|number| PageLink {
                    number,
                    href: href(number),
                    current: number == pagination.page,
                })
                .collect(),
            summary,
            visible: pagination.total_pages() > 1,
        }
    }
}

/// Error page.
#[derive(Debug, Template, WebTemplate)]
#[template(path = "pages/error.html")]
pub struct ErrorTemplate {
    /// Shared layout.
    pub layout: Layout,
    /// HTTP status code.
    pub status: u16,
    /// Status text.
    pub heading: String,
    /// Explanation for the visitor.
    pub message: String,
}

impl ErrorTemplate {
    /// Error page for `status`.
    #[must_use]
    pub fn for_status(status: StatusCode, message: impl Into<String>) -> Self {
        let heading = match status {
            StatusCode::NOT_FOUND => "Page not found".to_string(),
            StatusCode::UNAUTHORIZED => "Please sign in".to_string(),
            StatusCode::FORBIDDEN => "Access denied".to_string(),
            other => other.canonical_reason().unwrap_or("Error").to_string(),
        };
        Self {
            layout: Layout::standalone(&heading),
            status: status.as_u16(),
            heading,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_stars() {
        let view = rating_stars(&RatingSummary::from_distribution([0, 0, 0, 1, 1]));
        assert_eq!(view.label, "Rated 4.5 out of 5");
        assert_eq!(view.stars(), vec![Star::Full, Star::Full, Star::Full, Star::Full, Star::Half]);
    }

    #[test]
    fn test_distribution_order() {
        let rating = RatingSummary::from_distribution([0, 0, 1, 1, 2]);
        let rows = distribution(&rating);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].stars, 5);
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[0].percent, 50);
        assert_eq!(rows[4].stars, 1);
    }

    #[test]
    fn test_select_options() {
        let options = SelectOption::list([("name", "Name"), ("rating", "Rating")], "rating");
        assert!(!options[0].selected);
        assert!(options[1].selected);
    }

    #[test]
    fn test_pager_links_keep_filters() {
        let pagination = Pagination::new(2, 10, 35);
        let pager = Pager::new(&pagination, "/search", &[("q", "pizza"), ("category", "")]);
        assert_eq!(pager.prev.as_deref(), Some("/search?q=pizza&page=1"));
        assert_eq!(pager.next.as_deref(), Some("/search?q=pizza&page=3"));
        assert_eq!(pager.links.len(), 4);
        assert!(pager.links[1].current);
        assert_eq!(pager.summary, "Showing 11-20 of 35");
        assert!(pager.visible);
    }

    #[test]
    fn test_empty_pager() {
        let pager = Pager::new(&Pagination::new(1, 10, 0), "/directory", &[]);
        assert!(pager.prev.is_none());
        assert!(pager.next.is_none());
        assert!(!pager.visible);
        assert_eq!(pager.summary, "No results");
    }

    #[test]
    fn test_error_template_renders() {
        let page = ErrorTemplate::for_status(StatusCode::NOT_FOUND, "business not found: nope");
        let html = page.render().unwrap();
        assert!(html.contains("Page not found"));
        assert!(html.contains("business not found: nope"));
        assert!(html.contains("<title>Page not found | P.I.M.P Business Repository</title>"));
    }
}
