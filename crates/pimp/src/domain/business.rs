//! Business listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::accreditation::Accreditation;
use super::category::Category;
use super::rating::RatingSummary;

/// Postal address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Street line.
    pub street: String,
    /// City.
    pub city: String,
    /// State or region code.
    pub state: String,
    /// Postal code.
    pub zip: String,
}

impl Address {
    /// `City, ST`.
    #[must_use]
    pub fn locality(&self) -> String {
        format!("{}, {}", self.city, self.state)
    }

    /// Full single-line address.
    #[must_use]
    pub fn one_line(&self) -> String {
        format!("{}, {}, {} {}", self.street, self.city, self.state, self.zip)
    }
}

/// Opening hours for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessHours {
    /// Day name, e.g. `Monday`.
    pub day: String,
    /// Free-form hours, e.g. `9:00 AM - 5:00 PM` or `Closed`.
    pub hours: String,
}

impl BusinessHours {
    /// Convenience constructor.
    #[must_use]
    pub fn new(day: &str, hours: &str) -> Self {
        Self {
            day: day.to_string(),
            hours: hours.to_string(),
        }
    }
}

/// The seven day names in display order.
pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// A directory listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Business {
    /// Storage id.
    pub id: i64,
    /// URL slug, unique.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// One-line pitch.
    pub tagline: String,
    /// Long description.
    pub description: String,
    /// Category slugs, primary first.
    pub categories: Vec<String>,
    /// Street address.
    pub address: Address,
    /// Contact phone.
    pub phone: String,
    /// Contact email.
    pub email: String,
    /// Website URL.
    pub website: Option<String>,
    /// Weekly opening hours.
    pub hours: Vec<BusinessHours>,
    /// Year founded.
    pub founded: Option<i32>,
    /// User who owns (has claimed) the listing.
    pub owner_id: Option<i64>,
    /// Accreditation badge.
    pub accreditation: Accreditation,
    /// Aggregate of reviews.
    pub rating: RatingSummary,
    /// When the listing was created.
    pub created_at: DateTime<Utc>,
}

impl Business {
    /// Whether someone has claimed the listing.
    #[must_use]
    pub fn is_claimed(&self) -> bool {
        self.owner_id.is_some()
    }

    /// Whether `user_id` owns the listing.
    #[must_use]
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.owner_id == Some(user_id)
    }

    /// Display name of the primary category.
    #[must_use]
    pub fn primary_category(&self) -> String {
        self.categories
            .first()
            .map(|slug| Category::display_name(slug))
            .unwrap_or_default()
    }

    /// Display names of all categories.
    #[must_use]
    pub fn category_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|slug| Category::display_name(slug))
            .collect()
    }

    /// First letter of the name, uppercased, for the A-Z filter.
    #[must_use]
    pub fn initial(&self) -> char {
        self.name
            .chars()
            .next()
            .map_or('#', |c| c.to_ascii_uppercase())
    }
}

/// Input for a new listing (seeding and CLI).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBusiness {
    /// Display name; the slug is derived from it.
    pub name: String,
    /// One-line pitch.
    pub tagline: String,
    /// Long description.
    pub description: String,
    /// Category slugs.
    pub categories: Vec<String>,
    /// Street address.
    pub address: Address,
    /// Contact phone.
    pub phone: String,
    /// Contact email.
    pub email: String,
    /// Website URL.
    pub website: Option<String>,
    /// Weekly opening hours.
    pub hours: Vec<BusinessHours>,
    /// Year founded.
    pub founded: Option<i32>,
}

/// Editable profile fields from the dashboard settings form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusinessUpdate {
    /// One-line pitch.
    pub tagline: String,
    /// Long description.
    pub description: String,
    /// Contact phone.
    pub phone: String,
    /// Contact email.
    pub email: String,
    /// Website URL; empty clears it.
    pub website: Option<String>,
    /// Weekly opening hours.
    pub hours: Vec<BusinessHours>,
}
