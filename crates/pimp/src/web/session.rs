//! Visitors, sign-in cookies and flash notices.
//!
//! Every page handler takes a [`Visitor`], which resolves the session cookie
//! to a user (if any) and picks up the `?notice=` code left by the previous
//! redirect. Handlers that need an account take [`SignedIn`] instead; it
//! redirects anonymous visitors to the login page.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, HeaderValue, Method};
use axum::response::{IntoResponse, Redirect, Response};
use chrono::Duration;

use super::state::AppState;
use crate::config::AuthConfig;
use crate::domain::User;
use crate::error::Error;

/// Where to go after signing in when no usable `next` was given.
pub const DEFAULT_NEXT: &str = "/dashboard";

/// Flash notice codes and the messages they stand for.
const NOTICES: &[(&str, &str)] = &[
    ("logged-in", "Welcome back! You are signed in."),
    ("logged-out", "You have been signed out."),
    ("registered", "Your account has been created. Welcome aboard!"),
    ("login-required", "Please sign in to continue."),
    ("review-posted", "Thanks! Your review has been posted."),
    ("response-posted", "Your response has been published."),
    ("settings-saved", "Your business details have been saved."),
    ("claim-submitted", "Your claim has been submitted. We will verify it shortly."),
    ("application-submitted", "Your accreditation application has been submitted."),
    ("password-reset", "Your password has been updated. Please sign in."),
];

/// Message for a notice code. Unknown codes show nothing.
#[must_use]
pub fn notice_message(code: &str) -> Option<&'static str> {
    NOTICES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, message)| *message)
}

/// Append a `notice` parameter to a local path.
#[must_use]
pub fn with_notice(path: &str, code: &str) -> String {
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{path}{separator}notice={code}")
}

/// The current request as seen by page handlers.
#[derive(Debug, Clone, Default)]
pub struct Visitor {
    /// Signed-in user.
    pub user: Option<User>,
    /// Session token from the cookie, valid or not.
    pub token: Option<String>,
    /// Request path, used to highlight the navigation.
    pub path: String,
    /// Flash message to show once.
    pub notice: Option<&'static str>,
}

impl FromRequestParts<AppState> for Visitor {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = cookie_value(&parts.headers, &state.config().auth.cookie_name).map(str::to_string);
        let user = match &token {
            Some(token) => state.storage()?.session_user(token)?,
            None => None,
        };
        let notice = parts
            .uri
            .query()
            .and_then(|q| query_value(q, "notice"))
            .and_then(notice_message);

        Ok(Self {
            user,
            token,
            path: parts.uri.path().to_string(),
            notice,
        })
    }
}

/// A visitor with an account. Anonymous visitors are sent to `/login`.
#[derive(Debug, Clone)]
pub struct SignedIn {
    /// The account.
    pub user: User,
    /// The full visitor, for the page layout.
    pub visitor: Visitor,
}

impl FromRequestParts<AppState> for SignedIn {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let visitor = Visitor::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;
        match visitor.user.clone() {
            Some(user) => Ok(Self { user, visitor }),
            None => {
                let next = if parts.method == Method::GET {
                    parts
                        .uri
                        .path_and_query()
                        .map_or_else(|| parts.uri.path().to_string(), ToString::to_string)
                } else {
                    referer_path(&parts.headers).unwrap_or_else(|| DEFAULT_NEXT.to_string())
                };
                Err(Redirect::to(&login_path(&next)).into_response())
            }
        }
    }
}

/// Login page URL that returns to `next` afterwards.
#[must_use]
pub fn login_path(next: &str) -> String {
    with_notice(&format!("/login?next={}", encode_component(next)), "login-required")
}

/// Accept `next` only when it is a path on this site.
///
/// Browsers drop tabs and newlines while parsing a URL, so `/\t/host` acts
/// as `//host`. Paths with control or whitespace characters are refused.
#[must_use]
pub fn safe_next(next: Option<&str>) -> String {
    match next.map(str::trim) {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains("://")
                && !path.contains('\\')
                && !path.chars().any(|c| c.is_control() || c.is_whitespace()) =>
        {
            path.to_string()
        }
        _ => DEFAULT_NEXT.to_string(),
    }
}

/// Path and query of a same-site `Referer`.
fn referer_path(headers: &HeaderMap) -> Option<String> {
    let referer = headers.get(header::REFERER)?.to_str().ok()?;
    let after_scheme = referer.split_once("://").map_or(referer, |(_, rest)| rest);
    let path = &after_scheme[after_scheme.find('/')?..];
    Some(safe_next(Some(path)))
}

/// Value of a cookie in the request headers.
#[must_use]
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"'))
}

/// `Set-Cookie` value carrying a session token.
#[must_use]
pub fn session_cookie(auth: &AuthConfig, token: &str, ttl: Duration) -> String {
    cookie(auth, token, ttl.num_seconds().max(0))
}

/// `Set-Cookie` value that removes the session cookie.
#[must_use]
pub fn clear_cookie(auth: &AuthConfig) -> String {
    cookie(auth, "", 0)
}

fn cookie(auth: &AuthConfig, value: &str, max_age: i64) -> String {
    let secure = if auth.secure_cookies { "; Secure" } else { "" };
    format!(
        "{}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}{secure}",
        auth.cookie_name
    )
}

/// Redirect that also sets (or clears) the session cookie.
#[must_use]
pub fn redirect_with_cookie(to: &str, cookie: &str) -> Response {
    let mut response = Redirect::to(to).into_response();
    if let Ok(value) = HeaderValue::from_str(cookie) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    response
}

/// Raw value of `key` in a query string. Only used for ASCII codes.
fn query_value<'a>(query: &'a str, key: &str) -> Option<&'a str> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

/// Percent-encode a query-string component.
#[must_use]
pub fn encode_component(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                encoded.push(char::from(byte));
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}

/// Build `path?k=v&...`, skipping empty values.
#[must_use]
pub fn build_url(path: &str, params: &[(&str, &str)]) -> String {
    let query: Vec<String> = params
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{key}={}", encode_component(value)))
        .collect();
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{}", query.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_cookie_value() {
        let h = headers("theme=dark; pimp_session=abc123; other=1");
        assert_eq!(cookie_value(&h, "pimp_session"), Some("abc123"));
        assert_eq!(cookie_value(&h, "theme"), Some("dark"));
        assert_eq!(cookie_value(&h, "missing"), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let mut auth = AuthConfig::default();
        let cookie = session_cookie(&auth, "tok", Duration::hours(2));
        assert!(cookie.starts_with(&format!("{}=tok;", auth.cookie_name)));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=7200"));
        assert!(!cookie.contains("Secure"));

        auth.secure_cookies = true;
        assert!(clear_cookie(&auth).ends_with("Max-Age=0; Secure"));
    }

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/business/acme")), "/business/acme");
        assert_eq!(safe_next(Some("/search?q=pizza")), "/search?q=pizza");
        assert_eq!(safe_next(Some("https://evil.example")), DEFAULT_NEXT);
        assert_eq!(safe_next(Some("//evil.example")), DEFAULT_NEXT);
        assert_eq!(safe_next(Some("/\\evil.example")), DEFAULT_NEXT);
        assert_eq!(safe_next(Some("dashboard")), DEFAULT_NEXT);
        assert_eq!(safe_next(Some("/\t/evil.example")), DEFAULT_NEXT);
        assert_eq!(safe_next(Some("/\n/evil.example")), DEFAULT_NEXT);
        assert_eq!(safe_next(Some("/\r\n/evil.example")), DEFAULT_NEXT);
        assert_eq!(safe_next(Some("/ /evil.example")), DEFAULT_NEXT);
        assert_eq!(safe_next(None), DEFAULT_NEXT);
    }

    #[test]
    fn test_referer_path() {
        let mut h = HeaderMap::new();
        h.insert(
            header::REFERER,
            HeaderValue::from_static("http://localhost:3000/business/acme/review"),
        );
        assert_eq!(referer_path(&h).as_deref(), Some("/business/acme/review"));

        h.insert(header::REFERER, HeaderValue::from_static("http://localhost:3000"));
        assert_eq!(referer_path(&h), None);
    }

    #[test]
    fn test_notices() {
        assert_eq!(
            notice_message("logged-out"),
            Some("You have been signed out.")
        );
        assert_eq!(notice_message("<script>"), None);
        assert_eq!(with_notice("/dashboard", "logged-in"), "/dashboard?notice=logged-in");
        assert_eq!(
            with_notice("/dashboard?business=acme", "settings-saved"),
            "/dashboard?business=acme&notice=settings-saved"
        );
    }

    #[test]
    fn test_login_path_encodes_next() {
        assert_eq!(
            login_path("/search?q=a b&page=2"),
            "/login?next=/search%3Fq%3Da%20b%26page%3D2&notice=login-required"
        );
    }

    #[test]
    fn test_build_url() {
        assert_eq!(
            build_url("/search", &[("q", "coffee & tea"), ("category", ""), ("page", "2")]),
            "/search?q=coffee%20%26%20tea&page=2"
        );
        assert_eq!(build_url("/directory", &[("letter", "")]), "/directory");
    }
}
