//! Application settings structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Lowest allowed monitor poll delay, protects the remote site.
pub const MIN_POLL_SECS: u64 = 60;

/// Root runtime settings, read once at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// HTTP client behavior
    #[serde(default)]
    pub http: HttpConfig,

    /// Remote Bazaar page layout
    #[serde(default)]
    pub bazaar: BazaarConfig,

    /// Request pacing
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load settings or return defaults if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Settings load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate settings values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::config("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::config("http.timeout_secs must be > 0"));
        }
        if url::Url::parse(&self.bazaar.base_url).is_err() {
            return Err(AppError::config(format!(
                "bazaar.base_url is not a valid URL: {}",
                self.bazaar.base_url
            )));
        }
        if scraper::Selector::parse(&self.bazaar.table_selector).is_err() {
            return Err(AppError::selector(
                &self.bazaar.table_selector,
                "bazaar.table_selector does not parse",
            ));
        }
        Ok(())
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Where and how to query the Bazaar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BazaarConfig {
    /// Search page URL; translated parameters are appended to it
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// CSS selector for the results table
    #[serde(default = "defaults::table_selector")]
    pub table_selector: String,
}

impl Default for BazaarConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            table_selector: defaults::table_selector(),
        }
    }
}

/// Request pacing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Pause between two consecutive Bazaar queries in milliseconds
    #[serde(default = "defaults::query_delay")]
    pub query_delay_ms: u64,

    /// Window in which request file events are coalesced, in milliseconds
    #[serde(default = "defaults::settle")]
    pub settle_ms: u64,

    /// Poll delay used until the request file sets one
    #[serde(default = "defaults::poll")]
    pub default_poll_secs: u64,
}

impl ScheduleConfig {
    pub fn query_delay(&self) -> Duration {
        Duration::from_millis(self.query_delay_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    /// Default poll delay, clamped to the floor.
    pub fn default_poll(&self) -> u64 {
        clamp_poll_secs(self.default_poll_secs)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            query_delay_ms: defaults::query_delay(),
            settle_ms: defaults::settle(),
            default_poll_secs: defaults::poll(),
        }
    }
}

/// Clamp a poll delay to `MIN_POLL_SECS`.
pub fn clamp_poll_secs(secs: u64) -> u64 {
    if secs < MIN_POLL_SECS {
        log::warn!(
            "Monitor poll delay cannot be less than {} seconds, using {}",
            MIN_POLL_SECS,
            MIN_POLL_SECS
        );
        MIN_POLL_SECS
    } else {
        secs
    }
}

mod defaults {
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; bazaar-query/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn base_url() -> String {
        "https://www.lazaruseq.com/Magelo/index.php?page=bazaar".into()
    }
    pub fn table_selector() -> String {
        r#"table[class="CB_Table CB_Highlight_Rows"]"#.into()
    }
    pub fn query_delay() -> u64 {
        3000
    }
    pub fn settle() -> u64 {
        500
    }
    pub fn poll() -> u64 {
        600
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_settings_ok() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut settings = Settings::default();
        settings.http.user_agent = "  ".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_selector() {
        let mut settings = Settings::default();
        settings.bazaar.table_selector = "[[invalid".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let content = "[schedule]\nquery_delay_ms = 10\n";
        let settings: Settings = toml::from_str(content).unwrap();
        assert_eq!(settings.schedule.query_delay_ms, 10);
        assert_eq!(settings.schedule.default_poll_secs, 600);
        assert_eq!(settings.http.timeout_secs, 30);
    }

    #[test]
    fn default_poll_is_clamped() {
        let mut schedule = ScheduleConfig::default();
        schedule.default_poll_secs = 5;
        assert_eq!(schedule.default_poll(), MIN_POLL_SECS);
    }

    #[test]
    fn missing_settings_file_falls_back() {
        let settings = Settings::load_or_default("/nonexistent/settings.toml");
        assert_eq!(settings.http.timeout_secs, 30);
    }
}
