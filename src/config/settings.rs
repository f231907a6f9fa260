use crate::adapters::holidays::{RemoteHolidays, RemoteHolidaysOptions, StaticHolidays};
use crate::config::toml_config::TomlConfig;
use crate::core::service::{WorkingDaysService, DEFAULT_TIME_ZONE};
use crate::domain::model::WorkingSchedule;
use crate::domain::ports::HolidayProvider;
use crate::utils::error::{AppError, Result};
use crate::utils::validation::{self, Validate};
use chrono::NaiveDate;
use chrono_tz::Tz;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct HolidaySettings {
    pub source_url: Option<String>,
    pub options: RemoteHolidaysOptions,
    pub extra_dates: Vec<NaiveDate>,
}

/// Fully resolved runtime settings: defaults, then file, then CLI overrides.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub host: String,
    pub port: u16,
    pub time_zone: String,
    pub schedule: WorkingSchedule,
    pub holidays: HolidaySettings,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            time_zone: DEFAULT_TIME_ZONE.name().to_string(),
            schedule: WorkingSchedule::standard(),
            holidays: HolidaySettings {
                source_url: None,
                options: RemoteHolidaysOptions::default(),
                extra_dates: Vec::new(),
            },
        }
    }
}

impl ServiceSettings {
    pub fn from_toml(config: &TomlConfig) -> Result<Self> {
        let mut settings = Self::default();

        if let Some(server) = &config.server {
            if let Some(host) = &server.host {
                settings.host = host.clone();
            }
            if let Some(port) = server.port {
                settings.port = port;
            }
        }

        if let Some(calendar) = &config.calendar {
            if let Some(tz) = &calendar.time_zone {
                settings.time_zone = tz.clone();
            }
            let schedule = &mut settings.schedule;
            schedule.start_hour = calendar.start_hour.unwrap_or(schedule.start_hour);
            schedule.lunch_start_hour = calendar.lunch_start_hour.unwrap_or(schedule.lunch_start_hour);
            schedule.lunch_end_hour = calendar.lunch_end_hour.unwrap_or(schedule.lunch_end_hour);
            schedule.end_hour = calendar.end_hour.unwrap_or(schedule.end_hour);
        }

        if let Some(holidays) = &config.holidays {
            let target = &mut settings.holidays;
            target.source_url = holidays.source_url.clone();
            if let Some(ttl) = holidays.cache_ttl_seconds {
                target.options.cache_ttl = Duration::from_secs(ttl);
            }
            if let Some(timeout) = holidays.timeout_seconds {
                target.options.timeout = Duration::from_secs(timeout);
            }
            if let Some(attempts) = holidays.retry_attempts {
                target.options.retry_attempts = attempts;
            }
            if let Some(delay) = holidays.retry_delay_millis {
                target.options.retry_delay = Duration::from_millis(delay);
            }
            if let Some(dates) = &holidays.extra_dates {
                target.extra_dates = parse_extra_dates(dates)?;
            }
        }

        Ok(settings)
    }

    pub fn parsed_time_zone(&self) -> Result<Tz> {
        self.time_zone
            .parse::<Tz>()
            .map_err(|e| AppError::InvalidConfigValueError {
                field: "calendar.time_zone".to_string(),
                value: self.time_zone.clone(),
                reason: e.to_string(),
            })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Remote source when a URL is configured, otherwise only the extra dates.
    pub fn build_holiday_provider(&self) -> Result<Arc<dyn HolidayProvider>> {
        let extra = self.holidays.extra_dates.iter().copied();
        match &self.holidays.source_url {
            Some(url) => {
                tracing::info!("Using remote holiday source: {}", url);
                let remote = RemoteHolidays::new(url.clone(), self.holidays.options.clone())?
                    .with_extra_dates(extra);
                Ok(Arc::new(remote))
            }
            None => {
                tracing::warn!(
                    "No holiday source configured; using {} static holidays",
                    self.holidays.extra_dates.len()
                );
                Ok(Arc::new(StaticHolidays::new(extra)))
            }
        }
    }

    pub fn build_service(&self) -> Result<WorkingDaysService> {
        self.validate()?;
        let provider = self.build_holiday_provider()?;
        Ok(WorkingDaysService::new(
            provider,
            self.schedule,
            self.parsed_time_zone()?,
        ))
    }
}

impl Validate for ServiceSettings {
    fn validate(&self) -> Result<()> {
        validation::validate_positive_number("server.port", u64::from(self.port), 1)?;

        if let Some(url) = &self.holidays.source_url {
            validation::validate_url("holidays.source_url", url)?;
        }

        if !self.schedule.is_well_ordered() {
            return Err(AppError::InvalidConfigValueError {
                field: "calendar".to_string(),
                value: format!(
                    "{}/{}/{}/{}",
                    self.schedule.start_hour,
                    self.schedule.lunch_start_hour,
                    self.schedule.lunch_end_hour,
                    self.schedule.end_hour
                ),
                reason: "Hours must satisfy start < lunch start < lunch end < end <= 23"
                    .to_string(),
            });
        }

        self.parsed_time_zone()?;
        Ok(())
    }
}

fn parse_extra_dates(dates: &[String]) -> Result<Vec<NaiveDate>> {
    dates
        .iter()
        .map(|raw| {
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| {
                AppError::InvalidConfigValueError {
                    field: "holidays.extra_dates".to_string(),
                    value: raw.clone(),
                    reason: format!("Expected YYYY-MM-DD: {}", e),
                }
            })
        })
        .collect()
}
