//! User accounts.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::text_enum;

/// Account type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Writes reviews.
    #[default]
    Consumer,
    /// Manages one or more listings.
    BusinessOwner,
    /// Site staff.
    Admin,
}

text_enum!(Role {
    Consumer => "consumer",
    BusinessOwner => "business_owner",
    Admin => "admin",
});

impl Role {
    /// Label shown in the account type picker.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Consumer => "Customer",
            Self::BusinessOwner => "Business owner",
            Self::Admin => "Administrator",
        }
    }
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// Storage id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Login email, lowercased.
    pub email: String,
    /// Account type.
    pub role: Role,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// First word of the name, for greetings.
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

/// Input for registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Login email; normalized before storage.
    pub email: String,
    /// Plain-text password; hashed before storage.
    pub password: String,
    /// Account type.
    pub role: Role,
}

/// Normalize an email for storage and lookup.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_text() {
        assert_eq!(Role::BusinessOwner.as_str(), "business_owner");
        assert_eq!(Role::BusinessOwner.to_string(), "business_owner");
        assert_eq!(Role::Consumer.label(), "Customer");
    }

    #[test]
    fn test_first_name() {
        let user = User {
            id: 1,
            name: "Dana Whitfield".to_string(),
            email: "dana@example.com".to_string(),
            role: Role::Consumer,
            created_at: Utc::now(),
        };
        assert_eq!(user.first_name(), "Dana");
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Dana@Example.COM "), "dana@example.com");
    }
}
