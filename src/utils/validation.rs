use crate::utils::error::{AppError, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(AppError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(AppError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(AppError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(AppError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(AppError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Formats a request-level issue as `"<field> - <message>"`.
pub fn field_issue(field_name: &str, message: &str) -> String {
    format!("{} - {}", field_name, message)
}

/// Parses an optional query value that must be a strictly positive number.
///
/// Returns `Ok(None)` when the value is absent, `Err(issue)` when it is present
/// but unusable. A blank value counts as 0.
pub fn parse_positive_number(
    field_name: &str,
    raw: Option<&str>,
) -> std::result::Result<Option<f64>, String> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let raw = raw.trim();
    let value = if raw.is_empty() {
        0.0
    } else {
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => return Err(field_issue(field_name, "Expected number, received nan")),
        }
    };

    if value <= 0.0 {
        return Err(field_issue(field_name, "Number must be greater than 0"));
    }

    Ok(Some(value))
}

/// Parses `YYYY-MM-DDTHH:MM:SS[.fff]Z`.
///
/// Anything without the trailing `Z` fails both the format and the suffix
/// check, and both issues are reported.
pub fn parse_utc_instant(
    field_name: &str,
    raw: &str,
) -> std::result::Result<DateTime<Utc>, Vec<String>> {
    let format_issue = || field_issue(field_name, "Date must be in ISO 8601 format with Z suffix");

    let Some(body) = raw.strip_suffix('Z') else {
        return Err(vec![
            format_issue(),
            field_issue(field_name, "Date must end with 'Z' to indicate UTC timezone"),
        ]);
    };

    NaiveDateTime::parse_from_str(body, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| vec![format_issue()])
}
