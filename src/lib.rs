pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::holidays::{RemoteHolidays, RemoteHolidaysOptions, StaticHolidays};
pub use adapters::http::build_router;
pub use config::{ServiceSettings, TomlConfig};
pub use crate::core::{calendar::BusinessCalendar, service::WorkingDaysService};
pub use domain::model::{CalculationRequest, CalculationResult, WorkingSchedule};
pub use domain::ports::{HolidayCalendar, HolidayProvider};
pub use utils::error::{AppError, Result};
