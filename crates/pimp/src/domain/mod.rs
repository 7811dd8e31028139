//! Domain types for the business directory.
//!
//! These are the typed shapes of the records the site renders: businesses,
//! reviews, users, claims and accreditation applications.

pub mod accreditation;
pub mod business;
pub mod category;
pub mod claim;
pub mod rating;
pub mod review;
pub mod user;

pub use accreditation::{
    Accreditation, AccreditationApplication, AccreditationStatus, ApplicationStatus,
    NewApplication,
};
pub use business::{Address, Business, BusinessHours, BusinessUpdate, NewBusiness};
pub use category::{Category, CATEGORIES};
pub use claim::{Claim, ClaimStatus, NewClaim, VerificationMethod};
pub use rating::{RatingSummary, Star, StarRating};
pub use review::{NewReview, OwnerResponse, Review, ReviewSort};
pub use user::{NewUser, Role, User};

/// Implements `as_str`, `Display` and `FromStr` for a fieldless enum stored
/// as text.
macro_rules! text_enum {
    ($ty:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            /// The stored text form.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.pad(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = crate::error::Error;

            fn from_str(s: &str) -> crate::error::Result<Self> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(crate::error::Error::internal(format!(
                        concat!("unknown ", stringify!($ty), ": {}"),
                        other
                    ))),
                }
            }
        }
    };
}

pub(crate) use text_enum;

/// Turn a display name into a URL slug: lowercase ASCII alphanumerics
/// joined by single dashes.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else if ch == '&' {
            pending_dash = true;
            if !slug.is_empty() {
                slug.push_str("-and");
            }
        } else {
            pending_dash = true;
        }
    }
    slug
}
