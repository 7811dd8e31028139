//! Templates for the accreditation program and the claim-your-business
//! workflow. Both wizards carry every field of every step in the form, so the
//! pages render the fields of other steps as hidden inputs.

#![allow(missing_docs)]

use askama::Template;
use askama_web::WebTemplate;
use serde::Deserialize;

use super::SelectOption;
use crate::domain::Business;
use crate::validation::ValidationErrors;
use crate::web::layout::Layout;
use crate::wizard::StepView;

/// Accreditation information page.
#[derive(Debug, Template, WebTemplate)]
#[template(path = "programs/accreditation.html")]
pub struct AccreditationTemplate {
    pub layout: Layout,
    pub standards: &'static [(&'static str, &'static str)],
    pub benefits: &'static [(&'static str, &'static str)],
    pub accredited_count: u64,
}

/// Submitted accreditation application, all steps.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApplyForm {
    pub step: String,
    pub action: Option<String>,
    pub business_id: String,
    pub years: String,
    pub employees: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
    pub complaint_process: String,
    pub agree: Option<String>,
}

/// Accreditation application wizard.
#[derive(Debug, Template, WebTemplate)]
#[template(path = "programs/apply.html")]
pub struct ApplyTemplate {
    pub layout: Layout,
    pub steps: Vec<StepView>,
    pub step: usize,
    pub is_first: bool,
    pub is_last: bool,
    pub form: ApplyForm,
    pub agree: bool,
    pub business_options: Vec<SelectOption>,
    pub business_name: String,
    pub standards: &'static [(&'static str, &'static str)],
    pub errors: ValidationErrors,
}

/// Submitted claim, all steps.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClaimForm {
    pub step: String,
    pub action: Option<String>,
    pub position: String,
    pub phone: String,
    pub method: String,
    pub note: String,
    pub confirm: Option<String>,
}

/// Claim wizard for one listing.
#[derive(Debug, Template, WebTemplate)]
#[template(path = "programs/claim.html")]
pub struct ClaimTemplate {
    pub layout: Layout,
    pub business: Business,
    pub steps: Vec<StepView>,
    pub step: usize,
    pub is_first: bool,
    pub is_last: bool,
    pub form: ClaimForm,
    pub confirm: bool,
    pub position_options: Vec<SelectOption>,
    pub method_options: Vec<SelectOption>,
    pub method_label: String,
    pub errors: ValidationErrors,
}
