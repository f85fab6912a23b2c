use crate::utils::error::{Result, StandingsError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(StandingsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(StandingsError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(StandingsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_id(field_name: &str, value: i64) -> Result<()> {
    if value <= 0 {
        return Err(StandingsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Identifier must be positive".to_string(),
        });
    }
    Ok(())
}

pub fn validate_timeout(field_name: &str, secs: u64) -> Result<()> {
    if secs == 0 {
        return Err(StandingsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: secs.to_string(),
            reason: "Timeout must be at least one second".to_string(),
        });
    }
    Ok(())
}
