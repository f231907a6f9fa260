use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid parameters: {}", issues.join("; "))]
    InvalidParameters { issues: Vec<String> },

    #[error("Holiday source error: {message}")]
    HolidaySource { message: String },

    #[error("Calculation error: {message}")]
    Calculation { message: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Client,
    Upstream,
    Configuration,
    Internal,
}

impl AppError {
    pub fn invalid_parameters<S: Into<String>>(issue: S) -> Self {
        AppError::InvalidParameters {
            issues: vec![issue.into()],
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::InvalidParameters { .. } => ErrorCategory::Client,
            AppError::HolidaySource { .. } | AppError::ApiError(_) => ErrorCategory::Upstream,
            AppError::ConfigError { .. } | AppError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            AppError::Calculation { .. } | AppError::IoError(_) => ErrorCategory::Internal,
        }
    }

    /// Message safe to show to API callers; never includes upstream URLs or payloads.
    pub fn user_friendly_message(&self) -> String {
        match self {
            AppError::InvalidParameters { .. } => "InvalidParameters".to_string(),
            AppError::HolidaySource { .. } | AppError::ApiError(_) => {
                "Holiday calendar is currently unavailable".to_string()
            }
            AppError::Calculation { .. } => "Unable to compute the requested date".to_string(),
            AppError::ConfigError { .. } | AppError::InvalidConfigValueError { .. } => {
                self.to_string()
            }
            AppError::IoError(_) => "Internal Server Error".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
