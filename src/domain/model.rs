use crate::utils::error::{AppError, Result};
use crate::utils::validation::field_issue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Largest accepted `days` delta.
pub const MAX_DAYS: u32 = 10_000;
/// Largest accepted `hours` delta.
pub const MAX_HOURS: u32 = 100_000;

/// Hour boundaries of a working day, in the business time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingSchedule {
    pub start_hour: u32,
    pub lunch_start_hour: u32,
    pub lunch_end_hour: u32,
    pub end_hour: u32,
}

impl WorkingSchedule {
    pub const fn new(start_hour: u32, lunch_start_hour: u32, lunch_end_hour: u32, end_hour: u32) -> Self {
        Self {
            start_hour,
            lunch_start_hour,
            lunch_end_hour,
            end_hour,
        }
    }

    /// 08:00-12:00 and 13:00-17:00.
    pub const fn standard() -> Self {
        Self::new(8, 12, 13, 17)
    }

    /// start < lunch start < lunch end < end, all within a day.
    pub fn is_well_ordered(&self) -> bool {
        self.start_hour < self.lunch_start_hour
            && self.lunch_start_hour < self.lunch_end_hour
            && self.lunch_end_hour < self.end_hour
            && self.end_hour <= 23
    }

    pub fn is_lunch_hour(&self, hour: u32) -> bool {
        hour >= self.lunch_start_hour && hour < self.lunch_end_hour
    }
}

impl Default for WorkingSchedule {
    fn default() -> Self {
        Self::standard()
    }
}

/// A validated calculation request. At least one of `days` / `minutes` is positive.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationRequest {
    pub start: Option<DateTime<Utc>>,
    pub days: u32,
    pub minutes: u32,
}

impl CalculationRequest {
    /// Builds a request from the boundary's numeric deltas.
    ///
    /// Fractional days round up to whole business days; hours convert to
    /// `round(hours * 60)` minutes. Deltas above [`MAX_DAYS`] / [`MAX_HOURS`]
    /// are rejected rather than clamped.
    pub fn from_deltas(
        start: Option<DateTime<Utc>>,
        days: Option<f64>,
        hours: Option<f64>,
    ) -> Result<Self> {
        let mut issues = Vec::new();

        let days = days.filter(|d| *d > 0.0).map(f64::ceil).unwrap_or(0.0);
        if days > f64::from(MAX_DAYS) {
            issues.push(field_issue(
                "days",
                &format!("Number must be less than or equal to {}", MAX_DAYS),
            ));
        }

        let hours = hours.filter(|h| *h > 0.0).unwrap_or(0.0);
        if hours > f64::from(MAX_HOURS) {
            issues.push(field_issue(
                "hours",
                &format!("Number must be less than or equal to {}", MAX_HOURS),
            ));
        }

        if !issues.is_empty() {
            return Err(AppError::InvalidParameters { issues });
        }

        // Both values are bounded above, so the casts are exact.
        Ok(Self {
            start,
            days: days as u32,
            minutes: (hours * 60.0).round() as u32,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub date: String,
}
