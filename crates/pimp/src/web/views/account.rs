//! Templates for signing in, registering and resetting passwords.

#![allow(missing_docs)]

use askama::Template;
use askama_web::WebTemplate;
use serde::Deserialize;

use super::SelectOption;
use crate::validation::ValidationErrors;
use crate::web::layout::Layout;

/// Submitted login form. The password is never echoed back.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub next: String,
}

/// Query parameters of the login page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginParams {
    pub next: Option<String>,
}

/// Sign-in page.
#[derive(Debug, Template, WebTemplate)]
#[template(path = "account/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub email: String,
    pub next: String,
    pub errors: ValidationErrors,
}

/// Submitted registration form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm: String,
    pub role: String,
    pub terms: Option<String>,
}

/// Registration page.
#[derive(Debug, Template, WebTemplate)]
#[template(path = "account/register.html")]
pub struct RegisterTemplate {
    pub layout: Layout,
    pub name: String,
    pub email: String,
    pub role_options: Vec<SelectOption>,
    pub terms: bool,
    pub min_password_length: usize,
    pub errors: ValidationErrors,
}

/// Submitted forgot-password form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ForgotForm {
    pub email: String,
}

/// Forgot-password page; `sent` shows the confirmation.
#[derive(Debug, Template, WebTemplate)]
#[template(path = "account/forgot.html")]
pub struct ForgotTemplate {
    pub layout: Layout,
    pub email: String,
    pub sent: bool,
    pub errors: ValidationErrors,
}

/// Query parameters of the reset page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResetParams {
    pub token: Option<String>,
}

/// Submitted reset form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResetForm {
    pub token: String,
    pub password: String,
    pub confirm: String,
}

/// Reset-password page; `invalid` replaces the form with an explanation.
#[derive(Debug, Template, WebTemplate)]
#[template(path = "account/reset.html")]
pub struct ResetTemplate {
    pub layout: Layout,
    pub token: String,
    pub invalid: bool,
    pub min_password_length: usize,
    pub errors: ValidationErrors,
}
