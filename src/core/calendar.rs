//! Business calendar arithmetic.
//!
//! Every operation works on wall-clock `NaiveDateTime` values that are already
//! expressed in the business time zone. Conversion from/to UTC happens in
//! [`crate::core::service`].

use crate::domain::model::WorkingSchedule;
use crate::domain::ports::HolidayCalendar;
use crate::utils::error::{AppError, Result};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};

/// Upper bound on consecutive non-business days scanned in one direction.
pub const MAX_NON_BUSINESS_RUN: u32 = 366;

pub struct BusinessCalendar<'a, H: HolidayCalendar + ?Sized> {
    schedule: WorkingSchedule,
    holidays: &'a H,
}

impl<'a, H: HolidayCalendar + ?Sized> BusinessCalendar<'a, H> {
    pub fn new(schedule: WorkingSchedule, holidays: &'a H) -> Self {
        Self { schedule, holidays }
    }

    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.holidays.is_holiday(date)
    }

    /// Runs the full calculation: normalize, then whole days, then minutes.
    pub fn calculate(&self, start: NaiveDateTime, days: u32, minutes: u32) -> Result<NaiveDateTime> {
        if days == 0 && minutes == 0 {
            return Err(AppError::invalid_parameters(
                "days - At least one of 'days' or 'hours' must be provided",
            ));
        }

        let mut current = self.normalize_backward(start)?;
        tracing::debug!("Normalized start {} -> {}", start, current);

        if days > 0 {
            current = self.add_business_days(current, days)?;
            tracing::debug!("After {} business days: {}", days, current);
        }

        if minutes > 0 {
            current = self.add_business_minutes(current, minutes)?;
            tracing::debug!("After {} business minutes: {}", minutes, current);
        }

        Ok(current)
    }

    /// Snaps an arbitrary instant to the working boundary at or before it.
    ///
    /// Non-business dates move to the previous business day at end of day.
    pub fn normalize_backward(&self, dt: NaiveDateTime) -> Result<NaiveDateTime> {
        let date = dt.date();
        if !self.is_business_day(date) {
            let previous = self.previous_business_day(date)?;
            return at_hour(previous, self.schedule.end_hour);
        }

        let hour = dt.hour();
        if hour < self.schedule.start_hour {
            at_hour(date, self.schedule.start_hour)
        } else if self.schedule.is_lunch_hour(hour) {
            at_hour(date, self.schedule.lunch_start_hour)
        } else if hour >= self.schedule.end_hour {
            at_hour(date, self.schedule.end_hour)
        } else {
            shift(at_hour(date, hour)?, Duration::minutes(i64::from(dt.minute())))
        }
    }

    /// Moves forward `days` business days, keeping the time of day.
    pub fn add_business_days(&self, dt: NaiveDateTime, days: u32) -> Result<NaiveDateTime> {
        let mut current = dt;
        for _ in 0..days {
            current = shift(current, Duration::days(1))?;
            let mut skipped = 0;
            while !self.is_business_day(current.date()) {
                skipped += 1;
                if skipped > MAX_NON_BUSINESS_RUN {
                    return Err(exhausted(current.date()));
                }
                current = shift(current, Duration::days(1))?;
            }
        }
        Ok(current)
    }

    /// Moves forward through working blocks only, skipping lunch and
    /// non-business days.
    pub fn add_business_minutes(&self, dt: NaiveDateTime, minutes: u32) -> Result<NaiveDateTime> {
        let schedule = self.schedule;
        let lunch_start = i64::from(schedule.lunch_start_hour) * 60;
        let day_end = i64::from(schedule.end_hour) * 60;

        let mut current = dt;
        let mut remaining = i64::from(minutes);

        if !self.is_business_day(current.date()) {
            current = self.next_business_day_start(current.date())?;
        }

        if schedule.is_lunch_hour(current.hour()) {
            current = at_hour(current.date(), schedule.lunch_end_hour)?;
        }

        while remaining > 0 {
            let current_minute = i64::from(current.hour() * 60 + current.minute());
            let block_end = if current.hour() < schedule.lunch_start_hour {
                lunch_start
            } else {
                day_end
            };

            let available = block_end - current_minute;
            if available <= 0 {
                current = if schedule.is_lunch_hour(current.hour()) {
                    at_hour(current.date(), schedule.lunch_end_hour)?
                } else {
                    self.next_business_day_start(current.date())?
                };
                continue;
            }

            let consumed = available.min(remaining);
            current = shift(current, Duration::minutes(consumed))?;
            remaining -= consumed;

            if current.hour() == schedule.lunch_start_hour && current.minute() == 0 {
                current = at_hour(current.date(), schedule.lunch_end_hour)?;
            } else if current.hour() >= schedule.end_hour && remaining > 0 {
                current = self.next_business_day_start(current.date())?;
            }
        }

        Ok(current)
    }

    fn previous_business_day(&self, date: NaiveDate) -> Result<NaiveDate> {
        let mut day = date;
        for _ in 0..=MAX_NON_BUSINESS_RUN {
            day = day
                .checked_sub_signed(Duration::days(1))
                .ok_or_else(|| out_of_range(day))?;
            if self.is_business_day(day) {
                return Ok(day);
            }
        }
        Err(exhausted(date))
    }

    /// First business day strictly after `date`, at start of day.
    fn next_business_day_start(&self, date: NaiveDate) -> Result<NaiveDateTime> {
        let mut day = date;
        for _ in 0..=MAX_NON_BUSINESS_RUN {
            day = day
                .checked_add_signed(Duration::days(1))
                .ok_or_else(|| out_of_range(day))?;
            if self.is_business_day(day) {
                return at_hour(day, self.schedule.start_hour);
            }
        }
        Err(exhausted(date))
    }
}

fn at_hour(date: NaiveDate, hour: u32) -> Result<NaiveDateTime> {
    shift(date.and_time(NaiveTime::MIN), Duration::hours(i64::from(hour)))
}

fn shift(dt: NaiveDateTime, delta: Duration) -> Result<NaiveDateTime> {
    dt.checked_add_signed(delta)
        .ok_or_else(|| out_of_range(dt.date()))
}

fn out_of_range(from: NaiveDate) -> AppError {
    AppError::Calculation {
        message: format!("date arithmetic from {} leaves the supported range", from),
    }
}

fn exhausted(from: NaiveDate) -> AppError {
    AppError::Calculation {
        message: format!(
            "no business day found within {} days of {}",
            MAX_NON_BUSINESS_RUN, from
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct EveryDayIsAHoliday;

    impl HolidayCalendar for EveryDayIsAHoliday {
        fn is_holiday(&self, _date: NaiveDate) -> bool {
            true
        }
    }

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn no_holidays() -> HashSet<NaiveDate> {
        HashSet::new()
    }

    fn calendar(holidays: &HashSet<NaiveDate>) -> BusinessCalendar<'_, HashSet<NaiveDate>> {
        BusinessCalendar::new(WorkingSchedule::standard(), holidays)
    }

    #[test]
    fn test_business_day_predicate() {
        let holidays: HashSet<_> = [NaiveDate::from_ymd_opt(2024, 6, 11).unwrap()].into();
        let cal = calendar(&holidays);

        assert!(cal.is_business_day(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()));
        assert!(!cal.is_business_day(NaiveDate::from_ymd_opt(2024, 6, 11).unwrap()));
        assert!(!cal.is_business_day(NaiveDate::from_ymd_opt(2024, 6, 8).unwrap()));
        assert!(!cal.is_business_day(NaiveDate::from_ymd_opt(2024, 6, 9).unwrap()));
    }

    #[test]
    fn test_normalize_is_identity_inside_working_blocks() {
        let holidays = no_holidays();
        let cal = calendar(&holidays);

        for (h, m) in [(8, 0), (9, 15), (11, 59), (13, 0), (14, 30), (16, 59)] {
            let dt = local(2024, 6, 10, h, m);
            assert_eq!(cal.normalize_backward(dt).unwrap(), dt, "{:02}:{:02}", h, m);
        }
    }

    #[test]
    fn test_normalize_drops_seconds() {
        let holidays = no_holidays();
        let cal = calendar(&holidays);
        let dt = NaiveDate::from_ymd_opt(2024, 6, 10)
            .unwrap()
            .and_hms_milli_opt(10, 45, 31, 500)
            .unwrap();

        assert_eq!(cal.normalize_backward(dt).unwrap(), local(2024, 6, 10, 10, 45));
    }

    #[test]
    fn test_normalize_snaps_outside_working_blocks() {
        let holidays = no_holidays();
        let cal = calendar(&holidays);

        assert_eq!(
            cal.normalize_backward(local(2024, 6, 10, 6, 20)).unwrap(),
            local(2024, 6, 10, 8, 0)
        );
        assert_eq!(
            cal.normalize_backward(local(2024, 6, 10, 12, 40)).unwrap(),
            local(2024, 6, 10, 12, 0)
        );
        assert_eq!(
            cal.normalize_backward(local(2024, 6, 10, 17, 0)).unwrap(),
            local(2024, 6, 10, 17, 0)
        );
        assert_eq!(
            cal.normalize_backward(local(2024, 6, 10, 22, 10)).unwrap(),
            local(2024, 6, 10, 17, 0)
        );
    }

    #[test]
    fn test_normalize_weekend_goes_to_previous_friday_end_of_day() {
        let holidays = no_holidays();
        let cal = calendar(&holidays);

        assert_eq!(
            cal.normalize_backward(local(2024, 6, 8, 10, 0)).unwrap(),
            local(2024, 6, 7, 17, 0)
        );
        assert_eq!(
            cal.normalize_backward(local(2024, 6, 9, 3, 0)).unwrap(),
            local(2024, 6, 7, 17, 0)
        );
    }

    #[test]
    fn test_normalize_holiday_skips_back_over_weekend() {
        // Monday holiday: previous business day is the Friday before.
        let holidays: HashSet<_> = [NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()].into();
        let cal = calendar(&holidays);

        assert_eq!(
            cal.normalize_backward(local(2024, 6, 3, 9, 0)).unwrap(),
            local(2024, 5, 31, 17, 0)
        );
    }

    #[test]
    fn test_add_days_keeps_time_of_day() {
        let holidays = no_holidays();
        let cal = calendar(&holidays);

        let result = cal.calculate(local(2024, 6, 10, 10, 30), 2, 0).unwrap();
        assert_eq!(result, local(2024, 6, 12, 10, 30));
        assert_eq!(result.weekday(), Weekday::Wed);
    }

    #[test]
    fn test_add_days_after_hours_anchors_at_end_of_day() {
        let holidays = no_holidays();
        let cal = calendar(&holidays);

        let result = cal.calculate(local(2024, 6, 10, 20, 0), 1, 0).unwrap();
        assert_eq!(result, local(2024, 6, 11, 17, 0));
    }

    #[test]
    fn test_add_days_skips_weekend() {
        let holidays = no_holidays();
        let cal = calendar(&holidays);

        let result = cal.calculate(local(2024, 6, 7, 10, 0), 1, 0).unwrap();
        assert_eq!(result, local(2024, 6, 10, 10, 0));
        assert_eq!(result.weekday(), Weekday::Mon);
    }

    #[test]
    fn test_add_days_skips_holiday() {
        let holidays: HashSet<_> = [NaiveDate::from_ymd_opt(2024, 6, 11).unwrap()].into();
        let cal = calendar(&holidays);

        let result = cal.calculate(local(2024, 6, 10, 10, 0), 1, 0).unwrap();
        assert_eq!(result, local(2024, 6, 12, 10, 0));
        assert_eq!(result.weekday(), Weekday::Wed);
    }

    #[test]
    fn test_add_days_from_weekend_stays_at_end_of_day() {
        let holidays = no_holidays();
        let cal = calendar(&holidays);

        // Saturday -> Friday 17:00 -> Monday 17:00 -> Tuesday 17:00
        let result = cal.calculate(local(2024, 6, 8, 11, 0), 2, 0).unwrap();
        assert_eq!(result, local(2024, 6, 11, 17, 0));
    }

    #[test]
    fn test_add_days_never_lands_on_non_business_day() {
        let holidays: HashSet<_> = [
            NaiveDate::from_ymd_opt(2024, 6, 17).unwrap(),
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
        ]
        .into();
        let cal = calendar(&holidays);

        let start = local(2024, 6, 3, 9, 0);
        for days in 1..=40 {
            let result = cal.add_business_days(start, days).unwrap();
            assert!(cal.is_business_day(result.date()), "{} days -> {}", days, result);
        }
    }

    #[test]
    fn test_add_hours_skips_lunch() {
        let holidays = no_holidays();
        let cal = calendar(&holidays);

        assert_eq!(
            cal.calculate(local(2024, 6, 10, 10, 0), 0, 120).unwrap(),
            local(2024, 6, 10, 13, 0)
        );
        assert_eq!(
            cal.calculate(local(2024, 6, 10, 11, 0), 0, 120).unwrap(),
            local(2024, 6, 10, 14, 0)
        );
    }

    #[test]
    fn test_add_hours_rolls_over_end_of_day() {
        let holidays = no_holidays();
        let cal = calendar(&holidays);

        let result = cal.calculate(local(2024, 6, 10, 16, 0), 0, 120).unwrap();
        assert_eq!(result, local(2024, 6, 11, 9, 0));
        assert_eq!(result.weekday(), Weekday::Tue);
    }

    #[test]
    fn test_add_hours_ending_exactly_at_end_of_day_stays() {
        let holidays = no_holidays();
        let cal = calendar(&holidays);

        assert_eq!(
            cal.calculate(local(2024, 6, 10, 16, 0), 0, 60).unwrap(),
            local(2024, 6, 10, 17, 0)
        );
    }

    #[test]
    fn test_add_hours_from_lunch_starts_at_lunch_end() {
        let holidays = no_holidays();
        let cal = calendar(&holidays);

        // 12:30 normalizes to 12:00, then minutes count from 13:00.
        assert_eq!(
            cal.calculate(local(2024, 6, 10, 12, 30), 0, 30).unwrap(),
            local(2024, 6, 10, 13, 30)
        );
    }

    #[test]
    fn test_add_hours_from_weekend_starts_monday_morning() {
        let holidays = no_holidays();
        let cal = calendar(&holidays);

        // Sunday -> Friday 17:00, one hour rolls into Monday 09:00.
        assert_eq!(
            cal.calculate(local(2024, 6, 9, 14, 0), 0, 60).unwrap(),
            local(2024, 6, 10, 9, 0)
        );
    }

    #[test]
    fn test_add_hours_over_weekend_and_holiday() {
        let holidays: HashSet<_> = [NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()].into();
        let cal = calendar(&holidays);

        // Friday 16:00 + 3h: 1h Friday, Monday is a holiday, 2h Tuesday.
        assert_eq!(
            cal.calculate(local(2024, 6, 7, 16, 0), 0, 180).unwrap(),
            local(2024, 6, 11, 10, 0)
        );
    }

    #[test]
    fn test_add_minutes_from_non_business_day_jumps_forward() {
        let holidays = no_holidays();
        let cal = calendar(&holidays);

        assert_eq!(
            cal.add_business_minutes(local(2024, 6, 8, 10, 0), 30).unwrap(),
            local(2024, 6, 10, 8, 30)
        );
    }

    #[test]
    fn test_days_and_hours_combined() {
        let holidays = no_holidays();
        let cal = calendar(&holidays);

        // Monday 15:00 + 1 day -> Tuesday 15:00, + 4h -> Wednesday 10:00.
        assert_eq!(
            cal.calculate(local(2024, 6, 10, 15, 0), 1, 240).unwrap(),
            local(2024, 6, 12, 10, 0)
        );
    }

    #[test]
    fn test_minute_advancement_stays_inside_working_blocks() {
        let holidays: HashSet<_> = [NaiveDate::from_ymd_opt(2024, 6, 12).unwrap()].into();
        let cal = calendar(&holidays);
        let start = local(2024, 6, 10, 9, 10);

        for minutes in (1..=3000).step_by(37) {
            let result = cal.add_business_minutes(start, minutes).unwrap();
            let hm = result.hour() * 60 + result.minute();
            assert!(cal.is_business_day(result.date()), "{} -> {}", minutes, result);
            assert!((8 * 60..=17 * 60).contains(&hm), "{} -> {}", minutes, result);
            assert!(!(12 * 60..13 * 60).contains(&hm), "{} -> {}", minutes, result);
        }
    }

    #[test]
    fn test_zero_deltas_fail_fast() {
        let cal = BusinessCalendar::new(WorkingSchedule::standard(), &EveryDayIsAHoliday);

        let err = cal.calculate(local(2024, 6, 10, 10, 0), 0, 0).unwrap_err();
        assert!(matches!(err, AppError::InvalidParameters { .. }));
    }

    #[test]
    fn test_unbounded_holiday_run_is_an_error() {
        let cal = BusinessCalendar::new(WorkingSchedule::standard(), &EveryDayIsAHoliday);

        let err = cal.calculate(local(2024, 6, 10, 10, 0), 1, 0).unwrap_err();
        assert!(matches!(err, AppError::Calculation { .. }));
    }

    #[test]
    fn test_days_past_last_representable_date_is_an_error() {
        let holidays = no_holidays();
        let cal = calendar(&holidays);
        let last = NaiveDate::MAX.and_hms_opt(10, 0, 0).unwrap();

        let err = cal.add_business_days(last, 5).unwrap_err();
        assert!(matches!(err, AppError::Calculation { .. }));
    }

    #[test]
    fn test_minutes_past_last_representable_date_is_an_error() {
        let holidays = no_holidays();
        let cal = calendar(&holidays);
        let last = NaiveDate::MAX.and_hms_opt(16, 0, 0).unwrap();

        let err = cal.add_business_minutes(last, 24 * 60).unwrap_err();
        assert!(matches!(err, AppError::Calculation { .. }));
    }

    #[test]
    fn test_normalize_before_first_representable_date_is_an_error() {
        let cal = BusinessCalendar::new(WorkingSchedule::standard(), &EveryDayIsAHoliday);
        let first = NaiveDate::MIN.and_hms_opt(10, 0, 0).unwrap();

        let err = cal.normalize_backward(first).unwrap_err();
        assert!(matches!(err, AppError::Calculation { .. }));
    }

    #[test]
    fn test_huge_day_count_fails_without_panicking() {
        let holidays = no_holidays();
        let cal = calendar(&holidays);
        let near_end = NaiveDate::MAX
            .checked_sub_signed(Duration::days(30))
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();

        let err = cal.calculate(near_end, u32::MAX, 0).unwrap_err();
        assert!(matches!(err, AppError::Calculation { .. }));
    }
}
