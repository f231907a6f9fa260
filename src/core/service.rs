use crate::core::calendar::BusinessCalendar;
use crate::domain::model::{CalculationRequest, CalculationResult, WorkingSchedule};
use crate::domain::ports::HolidayProvider;
use crate::utils::error::{AppError, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::sync::Arc;

/// Zone all working-schedule boundaries are defined in.
pub const DEFAULT_TIME_ZONE: Tz = chrono_tz::America::Bogota;

/// Refreshes holidays, runs the calendar engine and formats the result in UTC.
pub struct WorkingDaysService {
    holidays: Arc<dyn HolidayProvider>,
    schedule: WorkingSchedule,
    time_zone: Tz,
}

impl WorkingDaysService {
    pub fn new(holidays: Arc<dyn HolidayProvider>, schedule: WorkingSchedule, time_zone: Tz) -> Self {
        Self {
            holidays,
            schedule,
            time_zone,
        }
    }

    pub fn with_defaults(holidays: Arc<dyn HolidayProvider>) -> Self {
        Self::new(holidays, WorkingSchedule::standard(), DEFAULT_TIME_ZONE)
    }

    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }

    pub fn schedule(&self) -> &WorkingSchedule {
        &self.schedule
    }

    /// `now` is used when the request carries no start instant.
    pub async fn calculate(
        &self,
        request: &CalculationRequest,
        now: DateTime<Utc>,
    ) -> Result<CalculationResult> {
        if request.days == 0 && request.minutes == 0 {
            return Err(AppError::invalid_parameters(
                "days - At least one of 'days' or 'hours' must be provided",
            ));
        }

        self.holidays.refresh().await?;

        let start = request.start.unwrap_or(now);
        let local_start = start.with_timezone(&self.time_zone).naive_local();

        let calendar = BusinessCalendar::new(self.schedule, self.holidays.as_ref());
        let local_result = calendar.calculate(local_start, request.days, request.minutes)?;
        let utc_result = self.to_utc(local_result)?;

        tracing::info!(
            "Calculated {} days / {} minutes from {} -> {}",
            request.days,
            request.minutes,
            start.format("%Y-%m-%dT%H:%M:%SZ"),
            utc_result.format("%Y-%m-%dT%H:%M:%SZ")
        );

        Ok(CalculationResult {
            date: format_utc(utc_result),
        })
    }

    fn to_utc(&self, local: NaiveDateTime) -> Result<DateTime<Utc>> {
        self.time_zone
            .from_local_datetime(&local)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| AppError::Calculation {
                message: format!("{} does not exist in {}", local, self.time_zone),
            })
    }
}

/// Second precision, no fraction, trailing `Z`.
pub fn format_utc(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
