//! Business claims.
//!
//! A signed-in user claims an unclaimed listing through the claim wizard. The
//! claim stays pending until an administrator approves it, at which point the
//! user becomes the listing's owner.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::text_enum;

/// How the claimant wants to prove they run the business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMethod {
    /// Call the listed business phone number.
    Phone,
    /// Email the listed business address.
    Email,
    /// Upload or mail a business document.
    Document,
}

text_enum!(VerificationMethod {
    Phone => "phone",
    Email => "email",
    Document => "document",
});

impl VerificationMethod {
    /// All methods in display order.
    pub const ALL: [VerificationMethod; 3] = [Self::Phone, Self::Email, Self::Document];

    /// Option label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Phone => "Phone call to the listed business number",
            Self::Email => "Email to the listed business address",
            Self::Document => "Business license or utility bill",
        }
    }
}

/// Review state of a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    /// Awaiting verification.
    Pending,
    /// Verified; the claimant owns the listing.
    Approved,
    /// Not verified.
    Rejected,
}

text_enum!(ClaimStatus {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
});

/// A claim on a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Claim {
    /// Storage id.
    pub id: i64,
    /// Listing claimed.
    pub business_id: i64,
    /// Claimant.
    pub user_id: i64,
    /// Claimant's role at the business, e.g. `Owner`.
    pub position: String,
    /// Contact phone.
    pub phone: String,
    /// How to verify.
    pub method: VerificationMethod,
    /// Optional note to the reviewer.
    pub note: String,
    /// Review state.
    pub status: ClaimStatus,
    /// When it was filed.
    pub created_at: DateTime<Utc>,
}

/// Input for a new claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClaim {
    /// Listing claimed.
    pub business_id: i64,
    /// Claimant.
    pub user_id: i64,
    /// Claimant's role at the business.
    pub position: String,
    /// Contact phone.
    pub phone: String,
    /// How to verify.
    pub method: VerificationMethod,
    /// Optional note.
    pub note: String,
}

/// Positions offered in the claim wizard.
pub const POSITIONS: &[&str] = &["Owner", "Co-owner", "Manager", "Authorized representative"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_text() {
        for method in VerificationMethod::ALL {
            assert_eq!(method.as_str().parse::<VerificationMethod>().unwrap(), method);
            assert!(!method.label().is_empty());
        }
    }

    #[test]
    fn test_status_text() {
        assert_eq!(ClaimStatus::Approved.to_string(), "approved");
        assert!("maybe".parse::<ClaimStatus>().is_err());
    }
}
