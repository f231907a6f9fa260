use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashSet;

/// Answers whether a calendar date (in the business time zone) is a holiday.
pub trait HolidayCalendar: Send + Sync {
    fn is_holiday(&self, date: NaiveDate) -> bool;
}

impl HolidayCalendar for HashSet<NaiveDate> {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.contains(&date)
    }
}

/// A holiday calendar whose data must be loaded before it is consulted.
///
/// `refresh` is idempotent; callers await it before every calculation.
#[async_trait]
pub trait HolidayProvider: HolidayCalendar {
    async fn refresh(&self) -> Result<()>;
}
