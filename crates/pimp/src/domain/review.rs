//! Customer reviews and owner responses.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::rating::StarRating;
use super::text_enum;

/// Longest accepted review title.
pub const TITLE_MAX: usize = 100;
/// Shortest accepted review body.
pub const BODY_MIN: usize = 20;
/// Longest accepted review body.
pub const BODY_MAX: usize = 2000;
/// Longest accepted owner response.
pub const RESPONSE_MAX: usize = 1000;

/// The business owner's public reply to a review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerResponse {
    /// Reply text.
    pub body: String,
    /// When the reply was posted.
    pub responded_at: DateTime<Utc>,
}

/// A customer review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Review {
    /// Storage id.
    pub id: i64,
    /// Business reviewed.
    pub business_id: i64,
    /// Author account, if the review came from a signed-in user.
    pub user_id: Option<i64>,
    /// Name shown with the review.
    pub author_name: String,
    /// 1 to 5.
    pub rating: u8,
    /// Headline.
    pub title: String,
    /// Review text.
    pub body: String,
    /// When it was posted.
    pub created_at: DateTime<Utc>,
    /// Number of "helpful" votes.
    pub helpful_count: u32,
    /// Owner reply, if any.
    pub response: Option<OwnerResponse>,
}

impl Review {
    /// Star breakdown of this review's rating.
    #[must_use]
    pub fn stars(&self) -> StarRating {
        StarRating::from_rating(f64::from(self.rating))
    }

    /// Whether the owner has replied.
    #[must_use]
    pub fn has_response(&self) -> bool {
        self.response.is_some()
    }

    /// Author initials for the avatar bubble.
    #[must_use]
    pub fn author_initials(&self) -> String {
        self.author_name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }
}

/// Input for a new review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    /// Business reviewed.
    pub business_id: i64,
    /// Author account.
    pub user_id: Option<i64>,
    /// Name shown with the review.
    pub author_name: String,
    /// 1 to 5.
    pub rating: u8,
    /// Headline.
    pub title: String,
    /// Review text.
    pub body: String,
}

/// Ordering for review lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewSort {
    /// Most recent first.
    #[default]
    Newest,
    /// Highest rating first.
    Highest,
    /// Lowest rating first.
    Lowest,
    /// Most helpful votes first.
    Helpful,
}

text_enum!(ReviewSort {
    Newest => "newest",
    Highest => "highest",
    Lowest => "lowest",
    Helpful => "helpful",
});

impl ReviewSort {
    /// All options with labels, for the sort dropdown.
    pub const OPTIONS: [(ReviewSort, &'static str); 4] = [
        (Self::Newest, "Newest"),
        (Self::Highest, "Highest rated"),
        (Self::Lowest, "Lowest rated"),
        (Self::Helpful, "Most helpful"),
    ];

    /// Parse a query value, defaulting to newest.
    #[must_use]
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }

    /// SQL `ORDER BY` clause.
    #[must_use]
    pub fn order_by(self) -> &'static str {
        match self {
            Self::Newest => "r.created_at DESC, r.id DESC",
            Self::Highest => "r.rating DESC, r.created_at DESC",
            Self::Lowest => "r.rating ASC, r.created_at DESC",
            Self::Helpful => "r.helpful_count DESC, r.created_at DESC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(author: &str) -> Review {
        Review {
            id: 1,
            business_id: 1,
            user_id: None,
            author_name: author.to_string(),
            rating: 4,
            title: "Great".to_string(),
            body: "Great service all round.".to_string(),
            created_at: Utc::now(),
            helpful_count: 0,
            response: None,
        }
    }

    #[test]
    fn test_initials() {
        assert_eq!(review("maria garcia").author_initials(), "MG");
        assert_eq!(review("Prince").author_initials(), "P");
        assert_eq!(review("Anna Beth Clark").author_initials(), "AB");
    }

    #[test]
    fn test_stars_for_review() {
        let stars = review("A").stars();
        assert_eq!((stars.full, stars.half, stars.empty), (4, false, 1));
    }

    #[test]
    fn test_sort_parse() {
        assert_eq!(ReviewSort::parse_or_default(Some("helpful")), ReviewSort::Helpful);
        assert_eq!(ReviewSort::parse_or_default(Some("bogus")), ReviewSort::Newest);
        assert_eq!(ReviewSort::parse_or_default(None), ReviewSort::Newest);
    }

    #[test]
    fn test_response_flag() {
        let mut r = review("A");
        assert!(!r.has_response());
        r.response = Some(OwnerResponse {
            body: "Thanks!".to_string(),
            responded_at: Utc::now(),
        });
        assert!(r.has_response());
    }
}
