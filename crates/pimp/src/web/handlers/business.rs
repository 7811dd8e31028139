//! Business profile, reviews list and write-a-review handlers

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use tracing::{info, warn};

use super::{page_number, today, unprocessable};
use crate::domain::review::{BODY_MAX, BODY_MIN, TITLE_MAX};
use crate::domain::{Business, NewReview, ReviewSort, User};
use crate::error::{Error, Result};
use crate::storage::{ReviewQuery, Storage};
use crate::validation::{ValidationErrors, Validator};
use crate::web::layout::Layout;
use crate::web::session::{build_url, with_notice, SignedIn, Visitor};
use crate::web::state::AppState;
use crate::web::views::business::{
    ProfileTemplate, ReviewForm, ReviewFormTemplate, ReviewsParams, ReviewsTemplate,
};
use crate::web::views::{distribution, rating_stars, FilterLink, Pager, ReviewView, SelectOption};

/// Reviews shown on the profile page.
const PROFILE_REVIEWS: usize = 5;

/// Handler for a business profile. Counts a profile view.
pub async fn profile(
    State(state): State<AppState>,
    visitor: Visitor,
    Path(slug): Path<String>,
) -> Result<Response> {
    let (business, reviews) = {
        let storage = state.storage()?;
        let business = storage.require_business(&slug)?;
        if let Err(e) = storage.record_profile_view(business.id, today()) {
            warn!("Failed to record profile view of {}: {}", business.slug, e);
        }
        let query = ReviewQuery {
            page: 1,
            per_page: PROFILE_REVIEWS,
            ..ReviewQuery::default()
        };
        let reviews = storage.reviews_for_business(business.id, &query)?;
        (business, reviews.items)
    };

    let is_owner = visitor
        .user
        .as_ref()
        .is_some_and(|user| business.is_owned_by(user.id));
    let description = if business.tagline.is_empty() {
        format!("{} in {}", business.name, business.address.locality())
    } else {
        business.tagline.clone()
    };

    Ok(ProfileTemplate {
        layout: Layout::new(state.config(), &visitor, &business.name, description),
        stars: rating_stars(&business.rating),
        categories: business.category_names(),
        address: business.address.one_line(),
        website: business.website.clone().unwrap_or_default(),
        founded: business.founded.map(|y| y.to_string()).unwrap_or_default(),
        hours: business.hours.clone(),
        accreditation: business.accreditation.label(),
        accreditation_years: business.accreditation.years(today()),
        distribution: distribution(&business.rating),
        reviews: reviews.iter().map(ReviewView::from).collect(),
        can_claim: !business.is_claimed(),
        is_owner,
        business,
    }
    .into_response())
}

/// Handler for the full reviews list of a business.
pub async fn reviews(
    State(state): State<AppState>,
    visitor: Visitor,
    Path(slug): Path<String>,
    Query(params): Query<ReviewsParams>,
) -> Result<Response> {
    let stars = params
        .stars
        .as_deref()
        .and_then(|s| s.trim().parse::<u8>().ok())
        .filter(|s| (1..=5).contains(s));
    let sort = ReviewSort::parse_or_default(params.sort.as_deref());
    let (business, page) = {
        let storage = state.storage()?;
        let business = storage.require_business(&slug)?;
        let query = ReviewQuery {
            stars,
            sort,
            page: page_number(params.page.as_deref()),
            per_page: state.config().site.reviews_per_page,
        };
        let page = storage.reviews_for_business(business.id, &query)?;
        (business, page)
    };

    let path = format!("/business/{}/reviews", business.slug);
    let stars_param = stars.map(|s| s.to_string()).unwrap_or_default();
    let mut star_links = vec![FilterLink {
        label: "All ratings".to_string(),
        href: build_url(&path, &[("sort", sort.as_str())]),
        active: stars.is_none(),
    }];
    star_links.extend((1..=5u8).rev().map(|level| {
        let value = level.to_string();
        FilterLink {
            label: format!("{level} stars"),
            href: build_url(&path, &[("stars", &value), ("sort", sort.as_str())]),
            active: stars == Some(level),
        }
    }));

    Ok(ReviewsTemplate {
        layout: Layout::new(
            state.config(),
            &visitor,
            &format!("Reviews of {}", business.name),
            format!("Customer reviews of {}", business.name),
        ),
        stars: rating_stars(&business.rating),
        star_links,
        sort_options: SelectOption::list(
            ReviewSort::OPTIONS.iter().map(|(s, label)| (s.as_str(), *label)),
            sort.as_str(),
        ),
        distribution: distribution(&business.rating),
        reviews: page.items.iter().map(ReviewView::from).collect(),
        pager: Pager::new(
            &page.pagination,
            &path,
            &[("stars", &stars_param), ("sort", sort.as_str())],
        ),
        stars_filter: stars_param,
        business,
    }
    .into_response())
}

/// Handler for the write-a-review form.
pub async fn review_form(
    State(state): State<AppState>,
    SignedIn { user, visitor }: SignedIn,
    Path(slug): Path<String>,
) -> Result<Response> {
    let business = {
        let storage = state.storage()?;
        reviewable_business(&storage, &slug, &user)?
    };
    let form = ReviewForm::default();
    Ok(render_review_form(&state, &visitor, business, form, ValidationErrors::new()).into_response())
}

/// Handler for posting a review.
pub async fn submit_review(
    State(state): State<AppState>,
    SignedIn { user, visitor }: SignedIn,
    Path(slug): Path<String>,
    Form(form): Form<ReviewForm>,
) -> Result<Response> {
    let storage = state.storage()?;
    let business = reviewable_business(&storage, &slug, &user)?;

    let errors = validate_review(&form);
    if !errors.is_empty() {
        drop(storage);
        return Ok(unprocessable(render_review_form(
            &state, &visitor, business, form, errors,
        )));
    }

    let rating = form.rating.trim().parse::<u8>().unwrap_or_default();
    let review = storage.insert_review(&NewReview {
        business_id: business.id,
        user_id: Some(user.id),
        author_name: user.name.clone(),
        rating,
        title: form.title.trim().to_string(),
        body: form.body.trim().to_string(),
    })?;
    info!("User {} reviewed {} ({} stars)", user.id, business.slug, review.rating);

    let target = with_notice(&format!("/business/{}/reviews", business.slug), "review-posted");
    Ok(Redirect::to(&target).into_response())
}

/// Look up a listing the user may review.
fn reviewable_business(storage: &Storage, slug: &str, user: &User) -> Result<Business> {
    let business = storage.require_business(slug)?;
    if business.is_owned_by(user.id) {
        return Err(Error::forbidden("owners cannot review their own business"));
    }
    if storage.has_reviewed(user.id, business.id)? {
        return Err(Error::conflict("You have already reviewed this business"));
    }
    Ok(business)
}

fn validate_review(form: &ReviewForm) -> ValidationErrors {
    let mut v = Validator::new();
    v.int_range("rating", &form.rating, 1, 5, "Rating")
        .required("title", &form.title, "Title")
        .max_len("title", &form.title, TITLE_MAX, "Title")
        .required("body", &form.body, "Review")
        .min_len("body", &form.body, BODY_MIN, "Review")
        .max_len("body", &form.body, BODY_MAX, "Review");
    v.finish()
}

fn render_review_form(
    state: &AppState,
    visitor: &Visitor,
    business: Business,
    form: ReviewForm,
    errors: ValidationErrors,
) -> ReviewFormTemplate {
    let rating_options = SelectOption::list(
        (1..=5u8).rev().map(|n| {
            let label = if n == 1 { "1 star".to_string() } else { format!("{n} stars") };
            (n, label)
        }),
        form.rating.trim(),
    );
    ReviewFormTemplate {
        layout: Layout::new(
            state.config(),
            visitor,
            &format!("Review {}", business.name),
            format!("Share your experience with {}", business.name),
        ),
        business,
        form,
        errors,
        rating_options,
        title_max: TITLE_MAX,
        body_min: BODY_MIN,
        body_max: BODY_MAX,
    }
}
