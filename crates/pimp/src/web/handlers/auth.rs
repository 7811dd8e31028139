//! Sign in, registration, sign out and password reset handlers

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use tracing::{debug, info, warn};

use super::{non_blank, unprocessable};
use crate::domain::{NewUser, Role};
use crate::error::{Error, Result};
use crate::validation::{checkbox, ValidationErrors, Validator};
use crate::web::layout::Layout;
use crate::web::session::{
    build_url, clear_cookie, redirect_with_cookie, safe_next, session_cookie, with_notice,
    Visitor, DEFAULT_NEXT,
};
use crate::web::state::AppState;
use crate::web::views::account::{
    ForgotForm, ForgotTemplate, LoginForm, LoginParams, LoginTemplate, RegisterForm,
    RegisterTemplate, ResetForm, ResetParams, ResetTemplate,
};
use crate::web::views::SelectOption;

/// Account types offered at registration.
const SIGNUP_ROLES: [Role; 2] = [Role::Consumer, Role::BusinessOwner];

const BAD_CREDENTIALS: &str = "The email or password you entered is incorrect.";

/// Handler for the sign-in page. Signed-in visitors go straight on.
pub async fn login_form(
    State(state): State<AppState>,
    visitor: Visitor,
    Query(params): Query<LoginParams>,
) -> Response {
    let next = safe_next(params.next.as_deref());
    if visitor.user.is_some() {
        return Redirect::to(&next).into_response();
    }
    render_login(&state, &visitor, String::new(), next, ValidationErrors::new()).into_response()
}

/// Handler for signing in.
pub async fn login(
    State(state): State<AppState>,
    visitor: Visitor,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let next = safe_next(non_blank(Some(form.next.as_str())).as_deref());

    let mut v = Validator::new();
    v.required("email", &form.email, "Email")
        .email("email", &form.email)
        .required("password", &form.password, "Password");
    let errors = v.finish();
    if !errors.is_empty() {
        return Ok(unprocessable(render_login(&state, &visitor, form.email, next, errors)));
    }

    let session = {
        let storage = state.storage()?;
        match storage.authenticate(&form.email, &form.password)? {
            Some(user) => Some(storage.create_session(user.id, state.config().session_ttl())?),
            None => None,
        }
    };
    let Some(session) = session else {
        warn!("Failed sign-in for {}", form.email.trim());
        let mut errors = ValidationErrors::new();
        errors.add("credentials", BAD_CREDENTIALS);
        let page = render_login(&state, &visitor, form.email, next, errors);
        return Ok((StatusCode::UNAUTHORIZED, page).into_response());
    };

    info!("User {} signed in", session.user_id);
    let cookie = session_cookie(&state.config().auth, &session.token, state.config().session_ttl());
    Ok(redirect_with_cookie(&with_notice(&next, "logged-in"), &cookie))
}

/// Handler for signing out. Always clears the cookie.
pub async fn logout(State(state): State<AppState>, visitor: Visitor) -> Result<Response> {
    if let Some(token) = &visitor.token {
        if state.storage()?.delete_session(token)? {
            debug!("Session ended");
        }
    }
    let cookie = clear_cookie(&state.config().auth);
    Ok(redirect_with_cookie(&with_notice("/", "logged-out"), &cookie))
}

/// Handler for the registration page.
pub async fn register_form(State(state): State<AppState>, visitor: Visitor) -> Response {
    if visitor.user.is_some() {
        return Redirect::to(DEFAULT_NEXT).into_response();
    }
    let form = RegisterForm {
        role: Role::Consumer.as_str().to_string(),
        ..RegisterForm::default()
    };
    render_register(&state, &visitor, form, ValidationErrors::new()).into_response()
}

/// Handler for creating an account. Signs the new user in.
pub async fn register(
    State(state): State<AppState>,
    visitor: Visitor,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let errors = validate_registration(&form, state.config().auth.min_password_length);
    if !errors.is_empty() {
        return Ok(unprocessable(render_register(&state, &visitor, form, errors)));
    }

    let role = form.role.trim().parse::<Role>().unwrap_or(Role::Consumer);
    let new_user = NewUser {
        name: form.name.trim().to_string(),
        email: form.email.trim().to_string(),
        password: form.password.clone(),
        role,
    };
    let created = {
        let storage = state.storage()?;
        match storage.create_user(&new_user) {
            Ok(user) => Ok(storage.create_session(user.id, state.config().session_ttl())?),
            Err(e) => Err(e),
        }
    };
    let session = match created {
        Ok(session) => session,
        Err(Error::Conflict { message }) => {
            let mut errors = ValidationErrors::new();
            errors.add("email", message);
            let page = render_register(&state, &visitor, form, errors);
            return Ok((StatusCode::CONFLICT, page).into_response());
        }
        Err(e) => return Err(e),
    };

    let cookie = session_cookie(&state.config().auth, &session.token, state.config().session_ttl());
    let target = match role {
        Role::BusinessOwner => "/claim",
        Role::Consumer | Role::Admin => DEFAULT_NEXT,
    };
    Ok(redirect_with_cookie(&with_notice(target, "registered"), &cookie))
}

/// Handler for the forgot-password page.
pub async fn forgot_form(State(state): State<AppState>, visitor: Visitor) -> Response {
    render_forgot(&state, &visitor, String::new(), false, ValidationErrors::new()).into_response()
}

/// Handler for requesting a reset link.
///
/// The confirmation is the same whether or not the address has an account.
/// No mail is sent; the link is written to the log.
pub async fn forgot(
    State(state): State<AppState>,
    visitor: Visitor,
    Form(form): Form<ForgotForm>,
) -> Result<Response> {
    let mut v = Validator::new();
    v.required("email", &form.email, "Email").email("email", &form.email);
    let errors = v.finish();
    if !errors.is_empty() {
        return Ok(unprocessable(render_forgot(&state, &visitor, form.email, false, errors)));
    }

    if let Some(token) = state.storage()?.create_password_reset(&form.email)? {
        let link = build_url("/reset-password", &[("token", &token)]);
        info!(email = %form.email.trim(), %link, "Password reset requested");
    }
    Ok(render_forgot(&state, &visitor, String::new(), true, ValidationErrors::new()).into_response())
}

/// Handler for the reset-password page.
pub async fn reset_form(
    State(state): State<AppState>,
    visitor: Visitor,
    Query(params): Query<ResetParams>,
) -> Result<Response> {
    let token = non_blank(params.token.as_deref()).unwrap_or_default();
    let valid = !token.is_empty() && state.storage()?.password_reset_user(&token)?.is_some();
    let page = render_reset(&state, &visitor, token, !valid, ValidationErrors::new());
    if valid {
        Ok(page.into_response())
    } else {
        Ok((StatusCode::BAD_REQUEST, page).into_response())
    }
}

/// Handler for setting a new password.
pub async fn reset(
    State(state): State<AppState>,
    visitor: Visitor,
    Form(form): Form<ResetForm>,
) -> Result<Response> {
    let min = state.config().auth.min_password_length;
    let mut v = Validator::new();
    v.required("password", &form.password, "Password")
        .min_len("password", &form.password, min, "Password")
        .matches("confirm", &form.password, &form.confirm);
    let errors = v.finish();
    if !errors.is_empty() {
        return Ok(unprocessable(render_reset(&state, &visitor, form.token, false, errors)));
    }

    let result = state.storage()?.reset_password(form.token.trim(), &form.password);
    match result {
        Ok(user) => {
            info!("User {} reset their password", user.id);
            Ok(Redirect::to(&with_notice("/login", "password-reset")).into_response())
        }
        Err(e) if e.is_not_found() => {
            let page = render_reset(&state, &visitor, String::new(), true, ValidationErrors::new());
            Ok((StatusCode::BAD_REQUEST, page).into_response())
        }
        Err(e) => Err(e),
    }
}

fn validate_registration(form: &RegisterForm, min_password_length: usize) -> ValidationErrors {
    let roles = SIGNUP_ROLES.map(Role::as_str);
    let mut v = Validator::new();
    v.required("name", &form.name, "Name")
        .max_len("name", &form.name, 80, "Name")
        .required("email", &form.email, "Email")
        .email("email", &form.email)
        .required("password", &form.password, "Password")
        .min_len("password", &form.password, min_password_length, "Password")
        .matches("confirm", &form.password, &form.confirm)
        .one_of("role", form.role.trim(), &roles, "type of account")
        .checked(
            "terms",
            checkbox(form.terms.as_deref()),
            "You must accept the terms of use",
        );
    v.finish()
}

fn render_login(
    state: &AppState,
    visitor: &Visitor,
    email: String,
    next: String,
    errors: ValidationErrors,
) -> LoginTemplate {
    LoginTemplate {
        layout: Layout::new(state.config(), visitor, "Sign in", "Sign in to your account."),
        email,
        next,
        errors,
    }
}

fn render_register(
    state: &AppState,
    visitor: &Visitor,
    form: RegisterForm,
    errors: ValidationErrors,
) -> RegisterTemplate {
    RegisterTemplate {
        layout: Layout::new(
            state.config(),
            visitor,
            "Create an account",
            "Create an account to review businesses or manage your listing.",
        ),
        role_options: SelectOption::list(
            SIGNUP_ROLES.iter().map(|r| (r.as_str(), r.label())),
            form.role.trim(),
        ),
        terms: checkbox(form.terms.as_deref()),
        min_password_length: state.config().auth.min_password_length,
        name: form.name,
        email: form.email,
        errors,
    }
}

fn render_forgot(
    state: &AppState,
    visitor: &Visitor,
    email: String,
    sent: bool,
    errors: ValidationErrors,
) -> ForgotTemplate {
    ForgotTemplate {
        layout: Layout::new(state.config(), visitor, "Forgot password", "Reset your password."),
        email,
        sent,
        errors,
    }
}

fn render_reset(
    state: &AppState,
    visitor: &Visitor,
    token: String,
    invalid: bool,
    errors: ValidationErrors,
) -> ResetTemplate {
    ResetTemplate {
        layout: Layout::new(state.config(), visitor, "Reset password", "Choose a new password."),
        token,
        invalid,
        min_password_length: state.config().auth.min_password_length,
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> RegisterForm {
        RegisterForm {
            name: "Dana Whitfield".to_string(),
            email: "dana@example.com".to_string(),
            password: "correct horse".to_string(),
            confirm: "correct horse".to_string(),
            role: "business_owner".to_string(),
            terms: Some("on".to_string()),
        }
    }

    #[test]
    fn test_valid_registration() {
        assert!(validate_registration(&registration(), 8).is_empty());
    }

    #[test]
    fn test_registration_errors() {
        let form = RegisterForm {
            password: "short".to_string(),
            confirm: "different".to_string(),
            role: "admin".to_string(),
            terms: None,
            ..registration()
        };
        let errors = validate_registration(&form, 8);
        assert_eq!(errors.message("password"), "Password must be at least 8 characters");
        assert_eq!(errors.message("confirm"), "Passwords do not match");
        assert_eq!(errors.message("role"), "Choose a type of account");
        assert!(errors.has("terms"));
        assert!(!errors.has("email"));
    }
}
