use crate::utils::error::{AppError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub server: Option<ServerConfig>,
    pub calendar: Option<CalendarConfig>,
    pub holidays: Option<HolidaysConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarConfig {
    pub time_zone: Option<String>,
    pub start_hour: Option<u32>,
    pub lunch_start_hour: Option<u32>,
    pub lunch_end_hour: Option<u32>,
    pub end_hour: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HolidaysConfig {
    pub source_url: Option<String>,
    pub cache_ttl_seconds: Option<u64>,
    pub timeout_seconds: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub retry_delay_millis: Option<u64>,
    pub extra_dates: Option<Vec<String>>, // YYYY-MM-DD
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AppError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AppError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${HOLIDAYS_URL})，未設定的變數保留原字串
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AppError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(url) = self.holidays.as_ref().and_then(|h| h.source_url.as_deref()) {
            crate::utils::validation::validate_url("holidays.source_url", url)?;
        }

        if let Some(port) = self.server.as_ref().and_then(|s| s.port) {
            crate::utils::validation::validate_positive_number("server.port", u64::from(port), 1)?;
        }

        if let Some(calendar) = &self.calendar {
            let hours = [
                ("calendar.start_hour", calendar.start_hour),
                ("calendar.lunch_start_hour", calendar.lunch_start_hour),
                ("calendar.lunch_end_hour", calendar.lunch_end_hour),
                ("calendar.end_hour", calendar.end_hour),
            ];
            for (field, value) in hours {
                if let Some(hour) = value {
                    crate::utils::validation::validate_range(field, hour, 0, 23)?;
                }
            }
        }

        Ok(())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
