//! Star ratings.
//!
//! A rating is displayed as five stars: `floor(r)` full stars, one half star
//! when the remainder is at least 0.5, and the rest empty.

use serde::Serialize;

/// Number of stars in every rendered rating.
pub const MAX_STARS: u8 = 5;

/// A single star in a rendered rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Star {
    /// A filled star.
    Full,
    /// A half-filled star.
    Half,
    /// An outlined star.
    Empty,
}

impl Star {
    /// CSS modifier for this star.
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Half => "half",
            Self::Empty => "empty",
        }
    }
}

impl std::fmt::Display for Star {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.css_class())
    }
}

/// Star breakdown of a numeric rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StarRating {
    /// Number of full stars.
    pub full: u8,
    /// Whether a half star follows the full ones.
    pub half: bool,
    /// Number of empty stars.
    pub empty: u8,
}

impl StarRating {
    /// Break a rating into stars. Values are clamped to `0..=5`; NaN counts as 0.
    #[must_use]
    pub fn from_rating(rating: f64) -> Self {
        let r = if rating.is_finite() {
            rating.clamp(0.0, f64::from(MAX_STARS))
        } else {
            0.0
        };
        let floor = r.floor();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let full = floor as u8;
        let half = full < MAX_STARS && r - floor >= 0.5;
        let empty = MAX_STARS - full - u8::from(half);
        Self { full, half, empty }
    }

    /// The five stars in display order.
    #[must_use]
    pub fn stars(&self) -> Vec<Star> {
        let mut stars = Vec::with_capacity(usize::from(MAX_STARS));
        stars.extend(std::iter::repeat(Star::Full).take(usize::from(self.full)));
        if self.half {
            stars.push(Star::Half);
        }
        stars.extend(std::iter::repeat(Star::Empty).take(usize::from(self.empty)));
        stars
    }
}

/// Aggregate of a business's reviews.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RatingSummary {
    /// Mean rating, 0 when there are no reviews.
    pub average: f64,
    /// Number of reviews.
    pub count: u32,
    /// Review counts for 1 to 5 stars (index 0 is one star).
    pub distribution: [u32; 5],
}

impl RatingSummary {
    /// Build a summary from a per-star distribution.
    #[must_use]
    pub fn from_distribution(distribution: [u32; 5]) -> Self {
        let count: u32 = distribution.iter().sum();
        let weighted: u32 = distribution
            .iter()
            .zip(1u32..)
            .map(|(n, stars)| n * stars)
            .sum();
        let average = if count == 0 {
            0.0
        } else {
            f64::from(weighted) / f64::from(count)
        };
        Self {
            average,
            count,
            distribution,
        }
    }

    /// Star breakdown of the average.
    #[must_use]
    pub fn stars(&self) -> StarRating {
        StarRating::from_rating(self.average)
    }

    /// Average formatted with one decimal, e.g. `4.5`.
    #[must_use]
    pub fn average_label(&self) -> String {
        format!("{:.1}", self.average)
    }

    /// Share of reviews with `stars` stars, as a whole percentage.
    #[must_use]
    pub fn percent(&self, stars: u8) -> u32 {
        if self.count == 0 || !(1..=MAX_STARS).contains(&stars) {
            return 0;
        }
        let n = self.distribution[usize::from(stars - 1)];
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let pct = (f64::from(n) * 100.0 / f64::from(self.count)).round() as u32;
        pct
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(r: f64) -> (u8, bool, u8) {
        let s = StarRating::from_rating(r);
        (s.full, s.half, s.empty)
    }

    #[test]
    fn test_whole_ratings() {
        assert_eq!(counts(0.0), (0, false, 5));
        assert_eq!(counts(3.0), (3, false, 2));
        assert_eq!(counts(5.0), (5, false, 0));
    }

    #[test]
    fn test_half_star_threshold() {
        assert_eq!(counts(3.49), (3, false, 2));
        assert_eq!(counts(3.5), (3, true, 1));
        assert_eq!(counts(4.75), (4, true, 0));
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        assert_eq!(counts(-2.0), (0, false, 5));
        assert_eq!(counts(7.3), (5, false, 0));
        assert_eq!(counts(f64::NAN), (0, false, 5));
    }

    #[test]
    fn test_always_five_stars() {
        for tenth in 0..=50 {
            let stars = StarRating::from_rating(f64::from(tenth) / 10.0).stars();
            assert_eq!(stars.len(), 5);
        }
    }

    #[test]
    fn test_star_order() {
        let stars = StarRating::from_rating(2.5).stars();
        assert_eq!(
            stars,
            vec![Star::Full, Star::Full, Star::Half, Star::Empty, Star::Empty]
        );
    }

    #[test]
    fn test_summary_from_distribution() {
        let summary = RatingSummary::from_distribution([0, 0, 1, 1, 3]);
        assert_eq!(summary.count, 5);
        assert!((summary.average - 4.4).abs() < 1e-9);
        assert_eq!(summary.average_label(), "4.4");
        assert_eq!(summary.percent(5), 60);
        assert_eq!(summary.percent(1), 0);
    }

    #[test]
    fn test_empty_summary() {
        let summary = RatingSummary::from_distribution([0; 5]);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.average_label(), "0.0");
        assert_eq!(summary.percent(3), 0);
        assert_eq!(summary.stars().empty, 5);
    }

    #[test]
    fn test_percent_rejects_bad_star_count() {
        let summary = RatingSummary::from_distribution([1, 1, 1, 1, 1]);
        assert_eq!(summary.percent(0), 0);
        assert_eq!(summary.percent(6), 0);
    }
}
