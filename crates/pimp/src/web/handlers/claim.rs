//! Claim-your-business search and claim wizard

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use tracing::info;

use super::{non_blank, page_number, unprocessable};
use crate::domain::claim::POSITIONS;
use crate::domain::{Business, NewClaim, User, VerificationMethod};
use crate::error::{Error, Result};
use crate::storage::{BusinessQuery, BusinessSort, Storage};
use crate::validation::{checkbox, ValidationErrors, Validator};
use crate::web::layout::Layout;
use crate::web::session::{with_notice, SignedIn, Visitor};
use crate::web::state::AppState;
use crate::web::views::directory::{ClaimSearchParams, ClaimSearchTemplate};
use crate::web::views::programs::{ClaimForm, ClaimTemplate};
use crate::web::views::{BusinessCard, Pager, SelectOption};
use crate::wizard::{Wizard, WizardAction, WizardOutcome};

/// Titles of the claim steps.
const CLAIM_STEPS: [&str; 3] = ["Your role", "Verification", "Confirm"];

/// Longest note on a claim.
const NOTE_MAX: usize = 500;

/// Handler for finding an unclaimed listing.
pub async fn search(
    State(state): State<AppState>,
    visitor: Visitor,
    Query(params): Query<ClaimSearchParams>,
) -> Result<Response> {
    let q = non_blank(params.q.as_deref());
    let query = BusinessQuery {
        text: q.clone(),
        unclaimed_only: true,
        sort: BusinessSort::Name,
        page: page_number(params.page.as_deref()),
        ..BusinessQuery::new(state.config().site.per_page)
    };
    let results = state.storage()?.search_businesses(&query)?;
    let q = q.unwrap_or_default();

    Ok(ClaimSearchTemplate {
        layout: Layout::new(
            state.config(),
            &visitor,
            "Claim your business",
            "Find your business and claim the free listing.",
        ),
        cards: results.items.iter().map(BusinessCard::from).collect(),
        pager: Pager::new(&results.pagination, "/claim", &[("q", &q)]),
        q,
    }
    .into_response())
}

/// Handler for the first step of the claim wizard.
pub async fn claim_form(
    State(state): State<AppState>,
    SignedIn { user, visitor }: SignedIn,
    Path(slug): Path<String>,
) -> Result<Response> {
    let business = {
        let storage = state.storage()?;
        claimable_business(&storage, &slug, &user)?
    };
    let form = ClaimForm {
        phone: business.phone.clone(),
        ..ClaimForm::default()
    };
    Ok(render_claim(
        &state,
        &visitor,
        business,
        Wizard::start(CLAIM_STEPS.len()),
        form,
        ValidationErrors::new(),
    )
    .into_response())
}

/// Handler for every step of the claim wizard.
pub async fn claim_step(
    State(state): State<AppState>,
    SignedIn { user, visitor }: SignedIn,
    Path(slug): Path<String>,
    Form(form): Form<ClaimForm>,
) -> Result<Response> {
    let business = {
        let storage = state.storage()?;
        claimable_business(&storage, &slug, &user)?
    };

    let wizard = Wizard::at(form.step.trim().parse().unwrap_or(1), CLAIM_STEPS.len());
    let action = WizardAction::parse(form.action.as_deref());
    match wizard.apply(action, |step| validate_step(&form, step)) {
        WizardOutcome::Show { wizard, errors } => {
            let failed = !errors.is_empty();
            let page = render_claim(&state, &visitor, business, wizard, form, errors);
            if failed {
                Ok(unprocessable(page))
            } else {
                Ok(page.into_response())
            }
        }
        WizardOutcome::Complete => {
            let method = form
                .method
                .trim()
                .parse::<VerificationMethod>()
                .map_err(|_| Error::internal("verification method passed validation but did not parse"))?;
            let claim = state.storage()?.create_claim(&NewClaim {
                business_id: business.id,
                user_id: user.id,
                position: form.position.trim().to_string(),
                phone: form.phone.trim().to_string(),
                method,
                note: form.note.trim().to_string(),
            })?;
            info!("Claim {} filed for {} by user {}", claim.id, business.slug, user.id);
            Ok(Redirect::to(&with_notice("/dashboard", "claim-submitted")).into_response())
        }
    }
}

/// Look up a listing the user may still claim.
fn claimable_business(storage: &Storage, slug: &str, user: &User) -> Result<Business> {
    let business = storage.require_business(slug)?;
    if business.is_claimed() {
        return Err(Error::conflict(format!("{} has already been claimed", business.name)));
    }
    if storage.pending_claim(user.id, business.id)?.is_some() {
        return Err(Error::conflict("You already have a pending claim for this business"));
    }
    Ok(business)
}

fn validate_step(form: &ClaimForm, step: usize) -> ValidationErrors {
    let mut v = Validator::new();
    match step {
        1 => {
            v.one_of("position", form.position.trim(), POSITIONS, "role");
        }
        2 => {
            let methods = VerificationMethod::ALL.map(VerificationMethod::as_str);
            v.required("phone", &form.phone, "Phone")
                .phone("phone", &form.phone)
                .one_of("method", form.method.trim(), &methods, "verification method")
                .max_len("note", &form.note, NOTE_MAX, "Note");
        }
        _ => {
            v.checked(
                "confirm",
                checkbox(form.confirm.as_deref()),
                "Confirm that you are authorized to manage this business",
            );
        }
    }
    v.finish()
}

fn render_claim(
    state: &AppState,
    visitor: &Visitor,
    business: Business,
    wizard: Wizard,
    form: ClaimForm,
    errors: ValidationErrors,
) -> ClaimTemplate {
    let method = form.method.trim().parse::<VerificationMethod>().ok();
    ClaimTemplate {
        layout: Layout::new(
            state.config(),
            visitor,
            &format!("Claim {}", business.name),
            format!("Claim the listing for {}", business.name),
        ),
        steps: wizard.progress(&CLAIM_STEPS),
        step: wizard.step(),
        is_first: wizard.is_first(),
        is_last: wizard.is_last(),
        confirm: checkbox(form.confirm.as_deref()),
        position_options: SelectOption::list(
            POSITIONS.iter().map(|p| (p, p)),
            form.position.trim(),
        ),
        method_options: SelectOption::list(
            VerificationMethod::ALL.iter().map(|m| (m.as_str(), m.label())),
            form.method.trim(),
        ),
        method_label: method.map(|m| m.label().to_string()).unwrap_or_default(),
        business,
        form,
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_form() -> ClaimForm {
        ClaimForm {
            step: "3".to_string(),
            action: Some("submit".to_string()),
            position: "Owner".to_string(),
            phone: "(555) 010-3000".to_string(),
            method: "email".to_string(),
            note: String::new(),
            confirm: Some("on".to_string()),
        }
    }

    #[test]
    fn test_complete_claim_completes() {
        let form = complete_form();
        let outcome = Wizard::at(3, 3).apply(WizardAction::Submit, |step| validate_step(&form, step));
        assert_eq!(outcome, WizardOutcome::Complete);
    }

    #[test]
    fn test_position_must_be_offered() {
        let form = ClaimForm {
            position: "Landlord".to_string(),
            ..complete_form()
        };
        assert_eq!(validate_step(&form, 1).message("position"), "Choose a role");
    }

    #[test]
    fn test_verification_step() {
        let form = ClaimForm {
            phone: String::new(),
            method: "carrier-pigeon".to_string(),
            note: "x".repeat(NOTE_MAX + 1),
            ..complete_form()
        };
        let errors = validate_step(&form, 2);
        assert_eq!(errors.message("phone"), "Phone is required");
        assert_eq!(errors.message("method"), "Choose a verification method");
        assert!(errors.has("note"));
    }

    #[test]
    fn test_back_keeps_entries_without_validating() {
        let form = ClaimForm {
            confirm: None,
            ..complete_form()
        };
        let outcome = Wizard::at(3, 3).apply(WizardAction::Back, |step| validate_step(&form, step));
        match outcome {
            WizardOutcome::Show { wizard, errors } => {
                assert_eq!(wizard.step(), 2);
                assert!(errors.is_empty());
            }
            WizardOutcome::Complete => panic!("back must not complete"),
        }
    }
}
