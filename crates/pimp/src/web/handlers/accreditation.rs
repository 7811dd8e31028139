//! Accreditation information page and application wizard

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use tracing::info;

use super::{non_blank, unprocessable};
use crate::domain::accreditation::STANDARDS;
use crate::domain::{Business, NewApplication, User};
use crate::error::Result;
use crate::validation::{checkbox, ValidationErrors, Validator};
use crate::web::layout::Layout;
use crate::web::session::{with_notice, SignedIn, Visitor};
use crate::web::state::AppState;
use crate::web::views::dashboard::BusinessParams;
use crate::web::views::programs::{AccreditationTemplate, ApplyForm, ApplyTemplate};
use crate::web::views::SelectOption;
use crate::wizard::{Wizard, WizardAction, WizardOutcome};

/// Why businesses apply.
const BENEFITS: &[(&str, &str)] = &[
    (
        "Stand out in search",
        "Accredited listings carry a badge on every card, profile and search result.",
    ),
    (
        "Earn customer confidence",
        "Customers know you have committed to honest advertising and fair dispute handling.",
    ),
    (
        "Show your track record",
        "Your profile shows how many years you have held accreditation.",
    ),
    (
        "Filter-friendly",
        "Shoppers can limit search results to accredited businesses only.",
    ),
];

/// Titles of the application steps.
const APPLY_STEPS: [&str; 3] = ["Business", "Contact", "Standards"];

/// Longest complaint-process statement.
const COMPLAINT_MAX: usize = 1000;

/// Shortest complaint-process statement.
const COMPLAINT_MIN: usize = 20;

/// Handler for the accreditation information page.
pub async fn info(State(state): State<AppState>, visitor: Visitor) -> Result<Response> {
    let stats = state.storage()?.stats()?;
    Ok(AccreditationTemplate {
        layout: Layout::new(
            state.config(),
            &visitor,
            "Accreditation",
            "What accreditation means and how to apply.",
        ),
        standards: STANDARDS,
        benefits: BENEFITS,
        accredited_count: stats.accredited,
    }
    .into_response())
}

/// Handler for the first step of the application wizard. `?business=slug`
/// preselects a listing.
pub async fn apply_form(
    State(state): State<AppState>,
    SignedIn { user, visitor }: SignedIn,
    Query(params): Query<BusinessParams>,
) -> Result<Response> {
    let eligible = eligible_businesses(&state, &user)?;
    let preselected = non_blank(params.business.as_deref())
        .and_then(|slug| eligible.iter().find(|b| b.slug == slug))
        .or_else(|| match eligible.as_slice() {
            [only] => Some(only),
            _ => None,
        })
        .map(|b| b.id.to_string())
        .unwrap_or_default();

    let form = ApplyForm {
        business_id: preselected,
        contact_name: user.name.clone(),
        email: user.email.clone(),
        ..ApplyForm::default()
    };
    Ok(render_apply(
        &state,
        &visitor,
        Wizard::start(APPLY_STEPS.len()),
        form,
        &eligible,
        ValidationErrors::new(),
    )
    .into_response())
}

/// Handler for every step of the application wizard.
pub async fn apply_step(
    State(state): State<AppState>,
    SignedIn { user, visitor }: SignedIn,
    Form(form): Form<ApplyForm>,
) -> Result<Response> {
    let eligible = eligible_businesses(&state, &user)?;
    let eligible_ids: Vec<String> = eligible.iter().map(|b| b.id.to_string()).collect();

    let wizard = Wizard::at(form.step.trim().parse().unwrap_or(1), APPLY_STEPS.len());
    let action = WizardAction::parse(form.action.as_deref());
    match wizard.apply(action, |step| validate_step(&form, step, &eligible_ids)) {
        WizardOutcome::Show { wizard, errors } => {
            let page = render_apply(&state, &visitor, wizard, form, &eligible, errors.clone());
            if errors.is_empty() {
                Ok(page.into_response())
            } else {
                Ok(unprocessable(page))
            }
        }
        WizardOutcome::Complete => {
            let application = NewApplication {
                business_id: form.business_id.trim().parse().unwrap_or_default(),
                user_id: user.id,
                contact_name: form.contact_name.trim().to_string(),
                email: form.email.trim().to_string(),
                phone: form.phone.trim().to_string(),
                years_in_business: form.years.trim().parse().unwrap_or_default(),
                employees: form.employees.trim().parse().unwrap_or_default(),
                complaint_process: form.complaint_process.trim().to_string(),
            };
            let submitted = state.storage()?.submit_application(&application)?;
            info!(
                "User {} applied for accreditation of business {} (application {})",
                user.id, submitted.business_id, submitted.id
            );
            Ok(Redirect::to(&with_notice("/dashboard", "application-submitted")).into_response())
        }
    }
}

/// Listings the user owns that may apply.
fn eligible_businesses(state: &AppState, user: &User) -> Result<Vec<Business>> {
    let owned = state.storage()?.businesses_owned_by(user.id)?;
    Ok(owned
        .into_iter()
        .filter(|b| !b.accreditation.is_accredited() && !b.accreditation.is_pending())
        .collect())
}

fn validate_step(form: &ApplyForm, step: usize, eligible_ids: &[String]) -> ValidationErrors {
    let mut v = Validator::new();
    match step {
        1 => {
            let allowed: Vec<&str> = eligible_ids.iter().map(String::as_str).collect();
            v.one_of("business_id", form.business_id.trim(), &allowed, "business")
                .int_range("years", &form.years, 0, 200, "Years in business")
                .int_range("employees", &form.employees, 1, 100_000, "Number of employees");
        }
        2 => {
            v.required("contact_name", &form.contact_name, "Contact name")
                .max_len("contact_name", &form.contact_name, 100, "Contact name")
                .required("email", &form.email, "Email")
                .email("email", &form.email)
                .required("phone", &form.phone, "Phone")
                .phone("phone", &form.phone);
        }
        _ => {
            v.required("complaint_process", &form.complaint_process, "Complaint process")
                .min_len(
                    "complaint_process",
                    &form.complaint_process,
                    COMPLAINT_MIN,
                    "Complaint process",
                )
                .max_len(
                    "complaint_process",
                    &form.complaint_process,
                    COMPLAINT_MAX,
                    "Complaint process",
                )
                .checked(
                    "agree",
                    checkbox(form.agree.as_deref()),
                    "You must agree to the standards",
                );
        }
    }
    v.finish()
}

fn render_apply(
    state: &AppState,
    visitor: &Visitor,
    wizard: Wizard,
    form: ApplyForm,
    eligible: &[Business],
    errors: ValidationErrors,
) -> ApplyTemplate {
    let business_options = if eligible.is_empty() {
        Vec::new()
    } else {
        SelectOption::list(
            std::iter::once((String::new(), "Choose a business".to_string()))
                .chain(eligible.iter().map(|b| (b.id.to_string(), b.name.clone()))),
            form.business_id.trim(),
        )
    };
    let business_name = eligible
        .iter()
        .find(|b| b.id.to_string() == form.business_id.trim())
        .map(|b| b.name.clone())
        .unwrap_or_default();

    ApplyTemplate {
        layout: Layout::new(
            state.config(),
            visitor,
            "Apply for accreditation",
            "Apply to become an accredited business.",
        ),
        steps: wizard.progress(&APPLY_STEPS),
        step: wizard.step(),
        is_first: wizard.is_first(),
        is_last: wizard.is_last(),
        agree: checkbox(form.agree.as_deref()),
        form,
        business_options,
        business_name,
        standards: STANDARDS,
        errors,
    }
}
