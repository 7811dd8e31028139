//! Profile views and review statistics for the owner dashboard.

use std::collections::HashMap;

use chrono::{Datelike, Months, NaiveDate};
use rusqlite::params;
use serde::Serialize;

use super::Storage;
use crate::domain::Business;
use crate::error::Result;

/// Days of profile views shown on the analytics page.
pub const VIEW_WINDOW_DAYS: u32 = 30;

/// Months of review counts shown on the analytics page.
pub const REVIEW_WINDOW_MONTHS: u32 = 6;

/// Profile views on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyViews {
    /// The day.
    pub day: NaiveDate,
    /// Views recorded.
    pub views: u32,
}

impl DailyViews {
    /// Short label, e.g. `Mar 5`.
    #[must_use]
    pub fn label(&self) -> String {
        self.day.format("%b %-d").to_string()
    }
}

/// Reviews received in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyReviews {
    /// First day of the month.
    pub month: NaiveDate,
    /// Reviews posted that month.
    pub count: u32,
}

impl MonthlyReviews {
    /// Short label, e.g. `Mar 2024`.
    #[must_use]
    pub fn label(&self) -> String {
        self.month.format("%b %Y").to_string()
    }
}

/// Everything the analytics page shows for one listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusinessAnalytics {
    /// Views per day, oldest first, [`VIEW_WINDOW_DAYS`] entries.
    pub daily_views: Vec<DailyViews>,
    /// Sum of `daily_views`.
    pub total_views: u32,
    /// Reviews per month, oldest first, [`REVIEW_WINDOW_MONTHS`] entries.
    pub monthly_reviews: Vec<MonthlyReviews>,
    /// Reviews with an owner response.
    pub responded: u32,
    /// All reviews.
    pub total_reviews: u32,
}

impl BusinessAnalytics {
    /// Share of reviews with a response, as a whole percentage.
    #[must_use]
    pub fn response_rate(&self) -> u32 {
        percent(self.responded, self.total_reviews)
    }

    /// Largest daily view count, for scaling the chart.
    #[must_use]
    pub fn peak_views(&self) -> u32 {
        self.daily_views.iter().map(|d| d.views).max().unwrap_or(0)
    }

    /// Largest monthly review count, for scaling the chart.
    #[must_use]
    pub fn peak_reviews(&self) -> u32 {
        self.monthly_reviews
            .iter()
            .map(|m| m.count)
            .max()
            .unwrap_or(0)
    }
}

/// `part` as a whole percentage of `whole`; 0 when `whole` is 0.
#[must_use]
pub fn percent(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    let scaled = u64::from(part) * 100 / u64::from(whole);
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

impl Storage {
    /// Count a view of a listing's profile page on `day`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn record_profile_view(&self, business_id: i64, day: NaiveDate) -> Result<()> {
        self.add_profile_views(business_id, day, 1)
    }

    /// Add `views` to a listing's count for `day`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn add_profile_views(&self, business_id: i64, day: NaiveDate, views: u32) -> Result<()> {
        self.conn.execute(
            r"
            INSERT INTO profile_views (business_id, day, views) VALUES (?1, ?2, ?3)
            ON CONFLICT (business_id, day) DO UPDATE SET views = views + excluded.views
            ",
            params![business_id, day.format("%Y-%m-%d").to_string(), views],
        )?;
        Ok(())
    }

    /// Views per day for the [`VIEW_WINDOW_DAYS`] days ending on `today`,
    /// with zero for days without views.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn daily_views(&self, business_id: i64, today: NaiveDate) -> Result<Vec<DailyViews>> {
        let days: Vec<NaiveDate> = (0..VIEW_WINDOW_DAYS)
            .rev()
            .filter_map(|back| today.checked_sub_days(chrono::Days::new(u64::from(back))))
            .collect();
        let Some(first) = days.first() else {
            return Ok(Vec::new());
        };

        let mut stmt = self.conn.prepare(
            "SELECT day, views FROM profile_views WHERE business_id = ?1 AND day >= ?2 AND day <= ?3",
        )?;
        let recorded: HashMap<String, i64> = stmt
            .query_map(
                params![
                    business_id,
                    first.format("%Y-%m-%d").to_string(),
                    today.format("%Y-%m-%d").to_string()
                ],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?
            .collect::<std::result::Result<_, _>>()?;

        Ok(days
            .into_iter()
            .map(|day| {
                let views = recorded
                    .get(&day.format("%Y-%m-%d").to_string())
                    .map_or(0, |n| u32::try_from(*n).unwrap_or(0));
                DailyViews { day, views }
            })
            .collect())
    }

    /// Reviews per calendar month for the [`REVIEW_WINDOW_MONTHS`] months
    /// ending with the month of `today`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn monthly_reviews(&self, business_id: i64, today: NaiveDate) -> Result<Vec<MonthlyReviews>> {
        let this_month = today.with_day(1).unwrap_or(today);
        let months: Vec<NaiveDate> = (0..REVIEW_WINDOW_MONTHS)
            .rev()
            .filter_map(|back| this_month.checked_sub_months(Months::new(back)))
            .collect();

        let mut stmt = self.conn.prepare(
            "SELECT substr(created_at, 1, 7), COUNT(*) FROM reviews WHERE business_id = ?1 GROUP BY 1",
        )?;
        let counts: HashMap<String, i64> = stmt
            .query_map([business_id], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<_, _>>()?;

        Ok(months
            .into_iter()
            .map(|month| {
                let count = counts
                    .get(&month.format("%Y-%m").to_string())
                    .map_or(0, |n| u32::try_from(*n).unwrap_or(0));
                MonthlyReviews { month, count }
            })
            .collect())
    }

    /// Number of a listing's reviews that have an owner response.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn responded_review_count(&self, business_id: i64) -> Result<u32> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM reviews WHERE business_id = ?1 AND response_body IS NOT NULL",
            [business_id],
            |row| row.get(0),
        )?;
        Ok(u32::try_from(n).unwrap_or(0))
    }

    /// Gather the analytics page data for a listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn business_analytics(&self, business: &Business, today: NaiveDate) -> Result<BusinessAnalytics> {
        let daily_views = self.daily_views(business.id, today)?;
        let total_views = daily_views.iter().map(|d| d.views).sum();
        Ok(BusinessAnalytics {
            daily_views,
            total_views,
            monthly_reviews: self.monthly_reviews(business.id, today)?,
            responded: self.responded_review_count(business.id)?,
            total_reviews: business.rating.count,
        })
    }
}
