//! Configuration validation rules.
//!
//! Checks `AppConfig` values after they have been loaded from environment,
//! files, or defaults. Anything rejected here is a deployment mistake, so the
//! binary refuses to start instead of producing a partial context.

use crate::config::AppConfig;
use thiserror::Error;

/// Longest accepted cache lifetime: ten years.
pub const MAX_TTL_HOURS: u64 = 24 * 365 * 10;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    fn invalid(field: &str, reason: &str) -> Self {
        ConfigError::Invalid { field: field.into(), reason: reason.into() }
    }
}

impl From<ConfigError> for crate::Error {
    fn from(err: ConfigError) -> Self {
        crate::Error::InvalidConfig(err.to_string())
    }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `ttl_hours` is 0 or exceeds `MAX_TTL_HOURS`
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `max_concurrency` is outside 1..=16
    /// - `user_agent` is empty
    /// - any character budget is 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ttl_hours == 0 {
            return Err(ConfigError::invalid("ttl_hours", "must be greater than 0"));
        }
        if self.ttl_hours > MAX_TTL_HOURS {
            return Err(ConfigError::invalid("ttl_hours", "must not exceed 87600 (ten years)"));
        }

        if self.max_bytes == 0 {
            return Err(ConfigError::invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::invalid("max_bytes", "must not exceed 50MB"));
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if !(1..=16).contains(&self.max_concurrency) {
            return Err(ConfigError::invalid("max_concurrency", "must be between 1 and 16"));
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::invalid("user_agent", "must not be empty"));
        }

        for (field, value) in [
            ("primary_budget_chars", self.primary_budget_chars),
            ("supplementary_budget_chars", self.supplementary_budget_chars),
            ("primary_section_chars", self.primary_section_chars),
            ("supplementary_section_chars", self.supplementary_section_chars),
        ] {
            if value == 0 {
                return Err(ConfigError::invalid(field, "must be greater than 0"));
            }
        }

        if self.max_supplementary == 0 {
            tracing::warn!("max_supplementary is 0; supplementary sources will be fetched but never summarized");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_ttl() {
        let config = AppConfig { ttl_hours: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "ttl_hours"));
    }

    #[test]
    fn test_validate_ttl_overflow() {
        let config = AppConfig { ttl_hours: u64::MAX / 1000, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "ttl_hours"));
    }

    #[test]
    fn test_validate_ttl_upper_bound() {
        let config = AppConfig { ttl_hours: MAX_TTL_HOURS, ..Default::default() };
        assert!(config.validate().is_ok());
        assert!(chrono::TimeDelta::from_std(config.ttl()).is_ok());

        let config = AppConfig { ttl_hours: MAX_TTL_HOURS + 1, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_max_bytes_zero() {
        let config = AppConfig { max_bytes: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_bytes"));
    }

    #[test]
    fn test_validate_timeout_bounds() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));

        let config = AppConfig { timeout_ms: 301_000, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_concurrency_bounds() {
        let config = AppConfig { max_concurrency: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "max_concurrency"));

        let config = AppConfig { max_concurrency: 17, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "max_concurrency"));
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }

    #[test]
    fn test_validate_zero_budget() {
        let config = AppConfig { supplementary_section_chars: 0, ..Default::default() };
        let result = config.validate();
        assert!(
            matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "supplementary_section_chars")
        );
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig {
            ttl_hours: 1,
            max_bytes: 1,
            timeout_ms: 100,
            max_concurrency: 16,
            max_supplementary: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_error_into_core_error() {
        let err: crate::Error = ConfigError::invalid("ttl_hours", "must be greater than 0").into();
        assert!(err.to_string().starts_with("INVALID_CONFIG"));
    }
}
