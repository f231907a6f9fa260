pub mod calendar;
pub mod service;

pub use crate::domain::model::{CalculationRequest, CalculationResult, WorkingSchedule};
pub use crate::domain::ports::{HolidayCalendar, HolidayProvider};
pub use crate::utils::error::Result;
