//! JSON API used by the client scripts.
//!
//! Errors render as `{"error": "..."}` through [`ApiError`].

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::{non_blank, page_number};
use crate::domain::{Business, Category, Review};
use crate::error::{ApiError, Error};
use crate::pagination::Page;
use crate::storage::{BusinessQuery, ReviewQuery};
use crate::web::state::AppState;

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

/// Query parameters for the business list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BusinessListParams {
    /// Free text.
    pub q: Option<String>,
    /// Category slug.
    pub category: Option<String>,
    /// 1-based page.
    pub page: Option<String>,
}

/// Query parameters for paged lists.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PageParams {
    /// 1-based page.
    pub page: Option<String>,
}

/// A business in list responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusinessSummary {
    /// URL slug.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// One-line pitch.
    pub tagline: String,
    /// Primary category name.
    pub category: String,
    /// City and state.
    pub locality: String,
    /// Mean rating.
    pub rating: f64,
    /// Number of reviews.
    pub review_count: u32,
    /// Whether the listing is accredited.
    pub accredited: bool,
    /// Profile page path.
    pub url: String,
}

impl From<Business> for BusinessSummary {
    fn from(business: Business) -> Self {
        Self {
            category: business.primary_category(),
            locality: business.address.locality(),
            rating: business.rating.average,
            review_count: business.rating.count,
            accredited: business.accreditation.is_accredited(),
            url: format!("/business/{}", business.slug),
            slug: business.slug,
            name: business.name,
            tagline: business.tagline,
        }
    }
}

/// A category with the number of listings in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    /// The category.
    #[serde(flatten)]
    pub category: Category,
    /// Listings in the category.
    pub count: u32,
}

/// `GET /api/businesses`
pub async fn businesses(
    State(state): State<AppState>,
    Query(params): Query<BusinessListParams>,
) -> ApiResult<Page<BusinessSummary>> {
    let category = match non_blank(params.category.as_deref()) {
        Some(slug) => Some(
            Category::find(&slug)
                .ok_or_else(|| Error::not_found("category", &slug))?
                .slug
                .to_string(),
        ),
        None => None,
    };
    let query = BusinessQuery {
        text: non_blank(params.q.as_deref()),
        category,
        page: page_number(params.page.as_deref()),
        ..BusinessQuery::new(state.config().site.per_page)
    };
    let page = state.storage()?.search_businesses(&query)?;
    Ok(Json(page.map(BusinessSummary::from)))
}

/// `GET /api/businesses/{slug}`
pub async fn business(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Business> {
    let business = state.storage()?.require_business(&slug)?;
    Ok(Json(business))
}

/// `GET /api/businesses/{slug}/reviews`
pub async fn business_reviews(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<PageParams>,
) -> ApiResult<Page<Review>> {
    let storage = state.storage()?;
    let business = storage.require_business(&slug)?;
    let query = ReviewQuery {
        page: page_number(params.page.as_deref()),
        per_page: state.config().site.reviews_per_page,
        ..ReviewQuery::default()
    };
    let page = storage.reviews_for_business(business.id, &query)?;
    Ok(Json(page))
}

/// `POST /api/reviews/{id}/helpful`
pub async fn helpful(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Value> {
    let count = state.storage()?.mark_helpful(id)?;
    debug!("Review {} marked helpful ({})", id, count);
    Ok(Json(json!({ "helpful": count })))
}

/// `GET /api/categories`
pub async fn categories(State(state): State<AppState>) -> ApiResult<Vec<CategoryCount>> {
    let counts = state.storage()?.category_counts()?;
    Ok(Json(
        counts
            .into_iter()
            .map(|(category, count)| CategoryCount {
                category: *category,
                count,
            })
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Accreditation, AccreditationStatus, Address, RatingSummary};

    #[test]
    fn test_business_summary() {
        let business = Business {
            id: 1,
            slug: "acme-plumbing".to_string(),
            name: "Acme Plumbing".to_string(),
            tagline: "Leaks fixed fast".to_string(),
            description: String::new(),
            categories: vec!["home-services".to_string()],
            address: Address {
                street: "1 Main St".to_string(),
                city: "Springfield".to_string(),
                state: "IL".to_string(),
                zip: "62701".to_string(),
            },
            phone: String::new(),
            email: String::new(),
            website: None,
            hours: Vec::new(),
            founded: None,
            owner_id: None,
            accreditation: Accreditation {
                status: AccreditationStatus::Accredited,
                since: None,
            },
            rating: RatingSummary::from_distribution([0, 0, 0, 1, 1]),
            created_at: chrono::Utc::now(),
        };
        let summary = BusinessSummary::from(business);
        assert_eq!(summary.category, "Home Services");
        assert_eq!(summary.url, "/business/acme-plumbing");
        assert!((summary.rating - 4.5).abs() < f64::EPSILON);
        assert_eq!(summary.review_count, 2);
        assert!(summary.accredited);
    }

    #[test]
    fn test_category_count_flattens() {
        let value = serde_json::to_value(CategoryCount {
            category: crate::domain::CATEGORIES[0],
            count: 3,
        })
        .unwrap();
        assert_eq!(value["slug"], "restaurants");
        assert_eq!(value["count"], 3);
    }
}
