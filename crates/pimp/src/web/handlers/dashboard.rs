//! Owner dashboard: overview, review responses, listing settings, analytics.
//!
//! Owners with several listings pick one with `?business=slug`; without it
//! the first listing (by name) is shown.

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use tracing::info;

use super::{non_blank, today, unprocessable};
use crate::domain::review::RESPONSE_MAX;
use crate::domain::{Business, BusinessUpdate, ReviewSort, User};
use crate::error::{Error, Result};
use crate::storage::{ReviewQuery, Storage};
use crate::validation::{ValidationErrors, Validator};
use crate::web::layout::Layout;
use crate::web::session::{build_url, with_notice, SignedIn, Visitor};
use crate::web::state::AppState;
use crate::web::views::dashboard::{
    AnalyticsTemplate, Bar, BusinessParams, ClaimSummary, DashboardReview, DashboardTemplate,
    NoBusinessTemplate, RespondForm, SettingsForm, SettingsTemplate,
};
use crate::web::views::{distribution, rating_stars, ReviewView, SelectOption};

/// Reviews listed on the overview.
const DASHBOARD_REVIEWS: usize = 10;

/// Reviews listed for accounts without a listing.
const OWN_REVIEWS: usize = 5;

/// A rejected response, shown again under its review.
struct Draft {
    review_id: i64,
    text: String,
    error: String,
}

/// Handler for the dashboard overview.
pub async fn dashboard(
    State(state): State<AppState>,
    SignedIn { user, visitor }: SignedIn,
    Query(params): Query<BusinessParams>,
) -> Result<Response> {
    let storage = state.storage()?;
    let owned = storage.businesses_owned_by(user.id)?;
    let Some(business) = select_business(&owned, params.business.as_deref())? else {
        let claims = storage.claims_by_user(user.id)?;
        let reviews = storage.reviews_by_user(user.id, OWN_REVIEWS)?;
        drop(storage);
        return Ok(NoBusinessTemplate {
            layout: Layout::new(state.config(), &visitor, "Dashboard", "Your account."),
            first_name: user.first_name().to_string(),
            claims: claims.iter().map(ClaimSummary::from).collect(),
            reviews: reviews.iter().map(ReviewView::from).collect(),
        }
        .into_response());
    };
    let page = render_dashboard(&state, &storage, &visitor, &user, &owned, business, None)?;
    Ok(page.into_response())
}

/// Handler for an owner's public response to a review.
pub async fn respond(
    State(state): State<AppState>,
    SignedIn { user, visitor }: SignedIn,
    Path(review_id): Path<i64>,
    Form(form): Form<RespondForm>,
) -> Result<Response> {
    let storage = state.storage()?;
    let review = storage
        .review_by_id(review_id)?
        .ok_or_else(|| Error::not_found("review", review_id))?;
    let business = storage
        .business_by_id(review.business_id)?
        .ok_or_else(|| Error::not_found("business", review.business_id))?;
    if !business.is_owned_by(user.id) {
        return Err(Error::forbidden(
            "only the business owner can respond to its reviews",
        ));
    }

    match storage.respond_to_review(review_id, user.id, &form.response) {
        Ok(_) => {
            info!("Owner {} responded to review {}", user.id, review_id);
            let target = build_url("/dashboard", &[("business", &business.slug)]);
            Ok(Redirect::to(&with_notice(&target, "response-posted")).into_response())
        }
        Err(Error::Validation(errors)) => {
            let owned = storage.businesses_owned_by(user.id)?;
            let draft = Draft {
                review_id,
                text: form.response,
                error: errors.message("response").to_string(),
            };
            let page =
                render_dashboard(&state, &storage, &visitor, &user, &owned, business, Some(draft))?;
            Ok(unprocessable(page))
        }
        Err(e) => Err(e),
    }
}

/// Handler for the listing settings form.
pub async fn settings(
    State(state): State<AppState>,
    SignedIn { user, visitor }: SignedIn,
    Query(params): Query<BusinessParams>,
) -> Result<Response> {
    let business = owned_business(&state, &user, params.business.as_deref())?;
    let form = SettingsForm::from_business(&business);
    Ok(render_settings(&state, &visitor, &business, form, ValidationErrors::new()).into_response())
}

/// Handler for saving listing settings.
pub async fn save_settings(
    State(state): State<AppState>,
    SignedIn { user, visitor }: SignedIn,
    Form(form): Form<SettingsForm>,
) -> Result<Response> {
    let business = owned_business(&state, &user, Some(form.business.as_str()))?;

    let errors = validate_settings(&form);
    if !errors.is_empty() {
        return Ok(unprocessable(render_settings(
            &state, &visitor, &business, form, errors,
        )));
    }

    let update = BusinessUpdate {
        tagline: form.tagline.trim().to_string(),
        description: form.description.trim().to_string(),
        phone: form.phone.trim().to_string(),
        email: form.email.trim().to_string(),
        website: non_blank(Some(form.website.as_str())),
        hours: form.hours(),
    };
    state.storage()?.update_business(business.id, &update)?;
    info!("Owner {} updated {}", user.id, business.slug);

    let target = build_url("/dashboard/settings", &[("business", &business.slug)]);
    Ok(Redirect::to(&with_notice(&target, "settings-saved")).into_response())
}

/// Handler for the analytics page.
pub async fn analytics(
    State(state): State<AppState>,
    SignedIn { user, visitor }: SignedIn,
    Query(params): Query<BusinessParams>,
) -> Result<Response> {
    let (owned, business, analytics) = {
        let storage = state.storage()?;
        let owned = storage.businesses_owned_by(user.id)?;
        let business = select_business(&owned, params.business.as_deref())?
            .ok_or_else(|| Error::forbidden("you do not manage a business listing"))?;
        let analytics = storage.business_analytics(&business, today())?;
        (owned, business, analytics)
    };

    let view_bars = Bar::scaled(
        analytics.daily_views.iter().map(|d| (d.label(), d.views)),
        analytics.peak_views(),
    );
    let review_bars = Bar::scaled(
        analytics.monthly_reviews.iter().map(|m| (m.label(), m.count)),
        analytics.peak_reviews(),
    );

    Ok(AnalyticsTemplate {
        layout: Layout::new(
            state.config(),
            &visitor,
            &format!("{} analytics", business.name),
            "Profile views and review trends.",
        ),
        switcher: switcher(&owned, &business),
        distribution: distribution(&business.rating),
        business,
        analytics,
        view_bars,
        review_bars,
    }
    .into_response())
}

/// Pick the listing named by `slug` from `owned`, or the first one.
///
/// A slug the user does not own is refused rather than silently replaced.
fn select_business(owned: &[Business], slug: Option<&str>) -> Result<Option<Business>> {
    match non_blank(slug) {
        Some(slug) => owned
            .iter()
            .find(|b| b.slug == slug)
            .cloned()
            .map(Some)
            .ok_or_else(|| Error::forbidden(format!("you do not manage {slug}"))),
        None => Ok(owned.first().cloned()),
    }
}

/// A listing the user owns, for the settings pages.
fn owned_business(state: &AppState, user: &User, slug: Option<&str>) -> Result<Business> {
    let owned = state.storage()?.businesses_owned_by(user.id)?;
    select_business(&owned, slug)?
        .ok_or_else(|| Error::forbidden("you do not manage a business listing"))
}

fn switcher(owned: &[Business], current: &Business) -> Vec<SelectOption> {
    SelectOption::list(
        owned.iter().map(|b| (b.slug.clone(), b.name.clone())),
        &current.slug,
    )
}

fn render_dashboard(
    state: &AppState,
    storage: &Storage,
    visitor: &Visitor,
    user: &User,
    owned: &[Business],
    business: Business,
    draft: Option<Draft>,
) -> Result<DashboardTemplate> {
    let query = ReviewQuery {
        sort: ReviewSort::Newest,
        page: 1,
        per_page: DASHBOARD_REVIEWS,
        ..ReviewQuery::default()
    };
    let reviews = storage.reviews_for_business(business.id, &query)?;
    let analytics = storage.business_analytics(&business, today())?;
    let claims = storage.claims_by_user(user.id)?;

    let reviews = reviews
        .items
        .iter()
        .map(|review| {
            let (text, error) = match &draft {
                Some(d) if d.review_id == review.id => (d.text.clone(), d.error.clone()),
                _ => (String::new(), String::new()),
            };
            DashboardReview {
                review: ReviewView::from(review),
                draft: text,
                error,
            }
        })
        .collect();

    Ok(DashboardTemplate {
        layout: Layout::new(
            state.config(),
            visitor,
            &format!("{} dashboard", business.name),
            "Manage your listing and respond to reviews.",
        ),
        stars: rating_stars(&business.rating),
        switcher: switcher(owned, &business),
        reviews,
        unanswered: analytics.total_reviews.saturating_sub(analytics.responded) as usize,
        views_last_30_days: analytics.total_views,
        response_rate: analytics.response_rate(),
        response_max: RESPONSE_MAX,
        accreditation: business.accreditation.label(),
        can_apply: !business.accreditation.is_accredited() && !business.accreditation.is_pending(),
        claims: claims.iter().map(ClaimSummary::from).collect(),
        business,
    })
}

fn validate_settings(form: &SettingsForm) -> ValidationErrors {
    let mut v = Validator::new();
    v.max_len("tagline", &form.tagline, 120, "Tagline")
        .max_len("description", &form.description, 2000, "Description")
        .required("phone", &form.phone, "Phone")
        .phone("phone", &form.phone)
        .required("email", &form.email, "Email")
        .email("email", &form.email)
        .url("website", &form.website);
    for row in form.hours_rows() {
        v.max_len(&row.field, &row.value, 40, row.day);
    }
    v.finish()
}

fn render_settings(
    state: &AppState,
    visitor: &Visitor,
    business: &Business,
    form: SettingsForm,
    errors: ValidationErrors,
) -> SettingsTemplate {
    SettingsTemplate {
        layout: Layout::new(
            state.config(),
            visitor,
            &format!("{} settings", business.name),
            "Update your listing details.",
        ),
        business_name: business.name.clone(),
        hours: form.hours_rows(),
        form,
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_settings() {
        let form = SettingsForm {
            business: "acme".to_string(),
            phone: "(555) 010-4000".to_string(),
            email: "hello@acme.example".to_string(),
            website: "acme.example".to_string(),
            hours_monday: "x".repeat(41),
            ..SettingsForm::default()
        };
        let errors = validate_settings(&form);
        assert!(errors.has("website"));
        assert!(errors.has("hours_monday"));
        assert!(!errors.has("phone"));
        assert!(!errors.has("email"));

        let form = SettingsForm {
            website: "https://acme.example".to_string(),
            hours_monday: "8:00 AM - 6:00 PM".to_string(),
            ..form
        };
        assert!(validate_settings(&form).is_empty());
    }

    #[test]
    fn test_validate_settings_requires_contact() {
        let errors = validate_settings(&SettingsForm::default());
        assert_eq!(errors.message("phone"), "Phone is required");
        assert_eq!(errors.message("email"), "Email is required");
    }
}
