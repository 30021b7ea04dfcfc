//! Application configuration with layered loading.
//!
//! Configuration is merged from multiple sources with figment:
//!
//! 1. Environment variables (DOCCTX_*)
//! 2. TOML config file (if DOCCTX_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (DOCCTX_*)
/// 2. TOML config file (if DOCCTX_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite content cache.
    ///
    /// Set via DOCCTX_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Lifetime of a cached page, applied uniformly to every entry.
    ///
    /// Set via DOCCTX_TTL_HOURS environment variable.
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u64,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via DOCCTX_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via DOCCTX_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Per-source network timeout in milliseconds.
    ///
    /// Set via DOCCTX_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Number of sources fetched at the same time.
    ///
    /// Set via DOCCTX_MAX_CONCURRENCY environment variable.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Maximum supplementary sections included in the aggregated context.
    ///
    /// Set via DOCCTX_MAX_SUPPLEMENTARY environment variable.
    #[serde(default = "default_max_supplementary")]
    pub max_supplementary: usize,

    /// Extraction budget (characters) for primary sources.
    #[serde(default = "default_primary_budget_chars")]
    pub primary_budget_chars: usize,

    /// Extraction budget (characters) for supplementary sources.
    #[serde(default = "default_supplementary_budget_chars")]
    pub supplementary_budget_chars: usize,

    /// Characters of a primary source shown in its context section.
    #[serde(default = "default_primary_section_chars")]
    pub primary_section_chars: usize,

    /// Characters of a supplementary source shown in its context section.
    #[serde(default = "default_supplementary_section_chars")]
    pub supplementary_section_chars: usize,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./docctx-cache.sqlite")
}

fn default_ttl_hours() -> u64 {
    24
}

fn default_user_agent() -> String {
    "docctx/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_max_concurrency() -> usize {
    4
}

fn default_max_supplementary() -> usize {
    8
}

fn default_primary_budget_chars() -> usize {
    3000
}

fn default_supplementary_budget_chars() -> usize {
    2000
}

fn default_primary_section_chars() -> usize {
    800
}

fn default_supplementary_section_chars() -> usize {
    600
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            ttl_hours: default_ttl_hours(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            max_concurrency: default_max_concurrency(),
            max_supplementary: default_max_supplementary(),
            primary_budget_chars: default_primary_budget_chars(),
            supplementary_budget_chars: default_supplementary_budget_chars(),
            primary_section_chars: default_primary_section_chars(),
            supplementary_section_chars: default_supplementary_section_chars(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Cache TTL as Duration. Saturates instead of overflowing; `validate`
    /// rejects anything that large.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_hours.saturating_mul(3600))
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("DOCCTX_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("DOCCTX_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./docctx-cache.sqlite"));
        assert_eq!(config.ttl_hours, 24);
        assert_eq!(config.user_agent, "docctx/0.1");
        assert_eq!(config.max_bytes, 5_242_880);
        assert_eq!(config.timeout_ms, 15_000);
        assert_eq!(config.max_concurrency, 4);
        assert_eq!(config.max_supplementary, 8);
        assert_eq!(config.primary_budget_chars, 3000);
        assert_eq!(config.supplementary_budget_chars, 2000);
        assert_eq!(config.primary_section_chars, 800);
        assert_eq!(config.supplementary_section_chars, 600);
    }

    #[test]
    fn test_durations() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(15));
        assert_eq!(config.ttl(), Duration::from_secs(24 * 3600));
        let huge = AppConfig { ttl_hours: u64::MAX, ..Default::default() };
        assert_eq!(huge.ttl(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_toml_layer_overrides_defaults() {
        let figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::string("ttl_hours = 6\nmax_supplementary = 3\n"));
        let config: AppConfig = figment.extract().unwrap();
        assert_eq!(config.ttl_hours, 6);
        assert_eq!(config.max_supplementary, 3);
        assert_eq!(config.timeout_ms, 15_000);
    }
}
