//! Request handlers, one module per area of the site.

pub mod accreditation;
pub mod api;
pub mod auth;
pub mod business;
pub mod claim;
pub mod dashboard;
pub mod directory;
pub mod health;
pub mod home;

use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use chrono::{NaiveDate, Utc};

use crate::error::Error;

/// Page number from a query value; anything unparsable is page 1.
pub(crate) fn page_number(value: Option<&str>) -> usize {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(1)
}

/// Trimmed value, or `None` when blank.
pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Current UTC date.
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Re-render a form that failed validation.
pub(crate) fn unprocessable(page: impl IntoResponse) -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, page).into_response()
}

/// Fallback for unknown routes.
pub async fn not_found(uri: Uri) -> Error {
    Error::not_found("page", uri.path())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_number() {
        assert_eq!(page_number(Some("3")), 3);
        assert_eq!(page_number(Some("0")), 1);
        assert_eq!(page_number(Some("abc")), 1);
        assert_eq!(page_number(None), 1);
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  pizza ")).as_deref(), Some("pizza"));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }
}
