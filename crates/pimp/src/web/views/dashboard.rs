//! Templates for the owner dashboard, listing settings and analytics.

#![allow(missing_docs)]

use askama::Template;
use askama_web::WebTemplate;
use serde::Deserialize;

use super::{DistributionRow, ReviewView, SelectOption, StarsView};
use crate::domain::business::WEEKDAYS;
use crate::domain::{Business, BusinessHours};
use crate::storage::{BusinessAnalytics, ClaimRow};
use crate::validation::ValidationErrors;
use crate::web::layout::Layout;

/// A claim as listed on the dashboard.
#[derive(Debug, Clone)]
pub struct ClaimSummary {
    pub business_name: String,
    pub business_slug: String,
    pub status: String,
    pub date: String,
}

impl From<&ClaimRow> for ClaimSummary {
    fn from(row: &ClaimRow) -> Self {
        Self {
            business_name: row.business_name.clone(),
            business_slug: row.business_slug.clone(),
            status: row.claim.status.to_string(),
            date: row.claim.created_at.format("%B %-d, %Y").to_string(),
        }
    }
}

/// A review on the dashboard, with the state of its respond form.
#[derive(Debug, Clone)]
pub struct DashboardReview {
    pub review: ReviewView,
    /// Rejected response text to put back in the form.
    pub draft: String,
    pub error: String,
}

/// Query parameters selecting one of the owner's listings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BusinessParams {
    pub business: Option<String>,
}

/// Owner dashboard for one listing.
#[derive(Debug, Template, WebTemplate)]
#[template(path = "dashboard/index.html")]
pub struct DashboardTemplate {
    pub layout: Layout,
    pub business: Business,
    pub stars: StarsView,
    pub switcher: Vec<SelectOption>,
    pub reviews: Vec<DashboardReview>,
    pub unanswered: usize,
    pub views_last_30_days: u32,
    pub response_rate: u32,
    pub response_max: usize,
    pub accreditation: String,
    pub can_apply: bool,
    pub claims: Vec<ClaimSummary>,
}

/// Dashboard for an account without a listing.
#[derive(Debug, Template, WebTemplate)]
#[template(path = "dashboard/no_business.html")]
pub struct NoBusinessTemplate {
    pub layout: Layout,
    pub first_name: String,
    pub claims: Vec<ClaimSummary>,
    pub reviews: Vec<ReviewView>,
}

/// Submitted owner response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RespondForm {
    pub response: String,
}

/// Submitted listing settings. Hours arrive as one field per weekday.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SettingsForm {
    pub business: String,
    pub tagline: String,
    pub description: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub hours_monday: String,
    pub hours_tuesday: String,
    pub hours_wednesday: String,
    pub hours_thursday: String,
    pub hours_friday: String,
    pub hours_saturday: String,
    pub hours_sunday: String,
}

impl SettingsForm {
    /// Prefill from a listing.
    #[must_use]
    pub fn from_business(business: &Business) -> Self {
        let mut form = Self {
            business: business.slug.clone(),
            tagline: business.tagline.clone(),
            description: business.description.clone(),
            phone: business.phone.clone(),
            email: business.email.clone(),
            website: business.website.clone().unwrap_or_default(),
            ..Self::default()
        };
        for entry in &business.hours {
            if let Some(slot) = form.slot_mut(&entry.day) {
                slot.clone_from(&entry.hours);
            }
        }
        form
    }

    fn slot_mut(&mut self, day: &str) -> Option<&mut String> {
        match day {
            "Monday" => Some(&mut self.hours_monday),
            "Tuesday" => Some(&mut self.hours_tuesday),
            "Wednesday" => Some(&mut self.hours_wednesday),
            "Thursday" => Some(&mut self.hours_thursday),
            "Friday" => Some(&mut self.hours_friday),
            "Saturday" => Some(&mut self.hours_saturday),
            "Sunday" => Some(&mut self.hours_sunday),
            _ => None,
        }
    }

    fn slots(&self) -> [&String; 7] {
        [
            &self.hours_monday,
            &self.hours_tuesday,
            &self.hours_wednesday,
            &self.hours_thursday,
            &self.hours_friday,
            &self.hours_saturday,
            &self.hours_sunday,
        ]
    }

    /// Hours for the days that were filled in, Monday first.
    #[must_use]
    pub fn hours(&self) -> Vec<BusinessHours> {
        WEEKDAYS
            .iter()
            .zip(self.slots())
            .filter(|(_, value)| !value.trim().is_empty())
            .map(|(day, value)| BusinessHours::new(day, value.trim()))
            .collect()
    }

    /// One input row per weekday.
    #[must_use]
    pub fn hours_rows(&self) -> Vec<HoursRow> {
        WEEKDAYS
            .iter()
            .zip(self.slots())
            .map(|(&day, value)| HoursRow {
                day,
                field: format!("hours_{}", day.to_lowercase()),
                value: value.clone(),
            })
            .collect()
    }
}

/// An opening-hours input.
#[derive(Debug, Clone)]
pub struct HoursRow {
    pub day: &'static str,
    pub field: String,
    pub value: String,
}

/// Listing settings page.
#[derive(Debug, Template, WebTemplate)]
#[template(path = "dashboard/settings.html")]
pub struct SettingsTemplate {
    pub layout: Layout,
    pub business_name: String,
    pub form: SettingsForm,
    pub hours: Vec<HoursRow>,
    pub errors: ValidationErrors,
}

/// A bar in a chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bar {
    pub label: String,
    pub value: u32,
    /// Height as a percentage of the tallest bar.
    pub height: u32,
}

impl Bar {
    /// Bars scaled against `peak`.
    pub fn scaled(points: impl IntoIterator<Item = (String, u32)>, peak: u32) -> Vec<Self> {
        points
            .into_iter()
            .map(|(label, value)| Self {
                label,
                value,
                height: crate::storage::analytics::percent(value, peak),
            })
            .collect()
    }
}

/// Analytics page.
#[derive(Debug, Template, WebTemplate)]
#[template(path = "dashboard/analytics.html")]
pub struct AnalyticsTemplate {
    pub layout: Layout,
    pub business: Business,
    pub switcher: Vec<SelectOption>,
    pub analytics: BusinessAnalytics,
    pub view_bars: Vec<Bar>,
    pub review_bars: Vec<Bar>,
    pub distribution: Vec<DistributionRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_hours_round_trip_by_day() {
        let form = SettingsForm {
            hours_monday: " 9:00 AM - 5:00 PM ".to_string(),
            hours_sunday: "Closed".to_string(),
            ..SettingsForm::default()
        };
        let hours = form.hours();
        assert_eq!(hours.len(), 2);
        assert_eq!(hours[0], BusinessHours::new("Monday", "9:00 AM - 5:00 PM"));
        assert_eq!(hours[1].day, "Sunday");

        let rows = form.hours_rows();
        assert_eq!(rows.len(), 7);
        assert_eq!(rows[2].field, "hours_wednesday");
        assert!(rows[2].value.is_empty());
    }

    #[test]
    fn test_bars_scale_to_peak() {
        let bars = Bar::scaled([("a".to_string(), 2), ("b".to_string(), 4)], 4);
        assert_eq!(bars[0].height, 50);
        assert_eq!(bars[1].height, 100);
        let flat = Bar::scaled([("a".to_string(), 0)], 0);
        assert_eq!(flat[0].height, 0);
    }
}
