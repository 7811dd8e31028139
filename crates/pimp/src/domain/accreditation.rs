//! Accreditation status and applications.
//!
//! Accreditation is a trust badge on a business. Owners apply through a
//! three-step form; an administrator approves or denies the application from
//! the CLI.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::text_enum;

/// Accreditation state of a business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccreditationStatus {
    /// Never applied, or application denied.
    #[default]
    NotAccredited,
    /// An application is under review.
    Pending,
    /// Accreditation granted.
    Accredited,
    /// Accreditation withdrawn.
    Revoked,
}

text_enum!(AccreditationStatus {
    NotAccredited => "not_accredited",
    Pending => "pending",
    Accredited => "accredited",
    Revoked => "revoked",
});

/// Accreditation badge data shown on listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Accreditation {
    /// Current state.
    pub status: AccreditationStatus,
    /// Date accreditation was granted.
    pub since: Option<NaiveDate>,
}

impl Accreditation {
    /// Whether the business currently holds accreditation.
    #[must_use]
    pub fn is_accredited(&self) -> bool {
        self.status == AccreditationStatus::Accredited
    }

    /// Whether an application is under review.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == AccreditationStatus::Pending
    }

    /// Human-readable badge text.
    #[must_use]
    pub fn label(&self) -> String {
        match (self.status, self.since) {
            (AccreditationStatus::Accredited, Some(since)) => {
                format!("Accredited since {}", since.format("%B %Y"))
            }
            (AccreditationStatus::Accredited, None) => "Accredited".to_string(),
            (AccreditationStatus::Pending, _) => "Accreditation pending".to_string(),
            (AccreditationStatus::Revoked, _) => "Accreditation revoked".to_string(),
            (AccreditationStatus::NotAccredited, _) => "Not accredited".to_string(),
        }
    }

    /// Whole years of accreditation as of `today`.
    #[must_use]
    pub fn years(&self, today: NaiveDate) -> u32 {
        match (self.status, self.since) {
            (AccreditationStatus::Accredited, Some(since)) => {
                today.years_since(since).unwrap_or(0)
            }
            _ => 0,
        }
    }
}

/// Review state of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    /// Awaiting a decision.
    Pending,
    /// Accepted; the business is accredited.
    Approved,
    /// Rejected.
    Denied,
}

text_enum!(ApplicationStatus {
    Pending => "pending",
    Approved => "approved",
    Denied => "denied",
});

/// A submitted accreditation application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccreditationApplication {
    /// Storage id.
    pub id: i64,
    /// Business applying.
    pub business_id: i64,
    /// User who submitted it.
    pub user_id: i64,
    /// Contact person.
    pub contact_name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// Years the business has operated.
    pub years_in_business: u32,
    /// Number of employees.
    pub employees: u32,
    /// Free-text statement about how customer complaints are handled.
    pub complaint_process: String,
    /// Review state.
    pub status: ApplicationStatus,
    /// When it was submitted.
    pub submitted_at: DateTime<Utc>,
}

/// Input for a new application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplication {
    /// Business applying.
    pub business_id: i64,
    /// User submitting.
    pub user_id: i64,
    /// Contact person.
    pub contact_name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// Years the business has operated.
    pub years_in_business: u32,
    /// Number of employees.
    pub employees: u32,
    /// Complaint handling statement.
    pub complaint_process: String,
}

/// The standards an accredited business commits to.
pub const STANDARDS: &[(&str, &str)] = &[
    ("Build trust", "Establish and maintain a positive track record in the marketplace."),
    ("Advertise honestly", "Adhere to established standards of advertising and selling."),
    ("Tell the truth", "Honestly represent products and services, including clear terms."),
    ("Be transparent", "Openly identify the nature, location and ownership of the business."),
    ("Honor promises", "Abide by all written agreements and verbal representations."),
    ("Be responsive", "Address marketplace disputes quickly, professionally and in good faith."),
    ("Safeguard privacy", "Protect any data collected against mishandling and fraud."),
    ("Embody integrity", "Approach all business dealings with integrity."),
];
