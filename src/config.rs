// src/config.rs

//! Request file loading.
//!
//! The front-end owns an INI file with three sections:
//!
//! ```text
//! [General]
//! Monitor Server Poll (seconds)=600
//!
//! [Monitor]
//! Velium Shard=Price|1000/Compare|<
//!
//! [Queries]
//! 7ioryb7mjb3jz90m=/Name|Item name/Stat|ac/Class|4096
//! ```

use std::path::Path;

use ini::{Ini, ParseOption};

use crate::error::{AppError, Result};
use crate::models::{Request, clamp_poll_secs};

pub const GENERAL_SECTION: &str = "General";
pub const MONITOR_SECTION: &str = "Monitor";
pub const QUERIES_SECTION: &str = "Queries";
pub const POLL_KEY: &str = "Monitor Server Poll (seconds)";

/// One snapshot of the request file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFile {
    /// Poll delay in seconds, clamped. `None` when absent or malformed.
    pub poll_secs: Option<u64>,

    /// `[Monitor]` entries as (item name, term string), in file order
    pub monitor: Vec<(String, String)>,

    /// `[Queries]` entries as (request ID, term string), in file order
    pub queries: Vec<(String, String)>,
}

impl RequestFile {
    /// Load and parse the request file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let ini = Ini::load_from_file_opt(path.as_ref(), parse_option())?;
        Ok(Self::from_ini(&ini))
    }

    /// Parse request file content.
    pub fn parse(content: &str) -> Result<Self> {
        let ini = Ini::load_from_str_opt(content, parse_option())
            .map_err(|e| AppError::config(format!("Request file does not parse: {e}")))?;
        Ok(Self::from_ini(&ini))
    }

    fn from_ini(ini: &Ini) -> Self {
        let poll_secs = match ini.section(Some(GENERAL_SECTION)) {
            Some(general) => parse_poll(general.get(POLL_KEY)),
            None => {
                log::info!("[{}] section does not exist or is empty", GENERAL_SECTION);
                None
            }
        };

        Self {
            poll_secs,
            monitor: section_entries(ini, MONITOR_SECTION),
            queries: section_entries(ini, QUERIES_SECTION),
        }
    }

    /// Monitor requests in file order.
    pub fn monitor_requests(&self) -> Vec<Request> {
        self.monitor
            .iter()
            .map(|(name, raw)| Request::monitor(name, raw.as_str()))
            .collect()
    }

    /// Search requests in file order.
    pub fn search_requests(&self) -> Vec<Request> {
        self.queries
            .iter()
            .map(|(id, raw)| Request::search(id.as_str(), raw.as_str()))
            .collect()
    }
}

/// Values are taken verbatim; the front-end never quotes or escapes.
fn parse_option() -> ParseOption {
    ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..Default::default()
    }
}

fn parse_poll(value: Option<&str>) -> Option<u64> {
    let Some(value) = value else {
        log::warn!("'{}' setting does not exist or is empty", POLL_KEY);
        return None;
    };
    match value.trim().parse::<i64>() {
        Ok(secs) => Some(clamp_poll_secs(secs.max(0) as u64)),
        Err(e) => {
            log::warn!("'{}' is not an integer ({}): {}", POLL_KEY, value, e);
            None
        }
    }
}

fn section_entries(ini: &Ini, name: &str) -> Vec<(String, String)> {
    match ini.section(Some(name)) {
        Some(section) => section
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect(),
        None => {
            log::info!("[{}] section does not exist or is empty", name);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MIN_POLL_SECS;

    const SAMPLE: &str = "\
[General]
Monitor Server Poll (seconds)=900

[Monitor]
Velium Shard=Price|1000/Compare|<
Fabled Earthshaker=Price|50000/Compare|<=

[Queries]
7ioryb7mjb3jz90m=/Name|Item name/Stat|ac/Class|4096/Race|32/Slot|131072
";

    #[test]
    fn test_parse_sections() {
        let file = RequestFile::parse(SAMPLE).unwrap();
        assert_eq!(file.poll_secs, Some(900));
        assert_eq!(file.monitor.len(), 2);
        assert_eq!(file.monitor[0].0, "Velium Shard");
        assert_eq!(file.queries[0].0, "7ioryb7mjb3jz90m");
        assert_eq!(file.search_requests()[0].terms.len(), 5);
    }

    #[test]
    fn test_poll_delay_is_clamped() {
        let content = "[General]\nMonitor Server Poll (seconds)=5\n";
        let file = RequestFile::parse(content).unwrap();
        assert_eq!(file.poll_secs, Some(MIN_POLL_SECS));
    }

    #[test]
    fn test_malformed_poll_delay_is_none() {
        let content = "[General]\nMonitor Server Poll (seconds)=soon\n[Queries]\na=Name|b\n";
        let file = RequestFile::parse(content).unwrap();
        assert_eq!(file.poll_secs, None);
        assert_eq!(file.queries.len(), 1);
    }

    #[test]
    fn test_missing_sections_are_empty() {
        let file = RequestFile::parse("").unwrap();
        assert_eq!(file, RequestFile::default());
    }

    #[test]
    fn test_duplicate_query_ids_are_kept() {
        let content = "[Queries]\nabc=Name|Sword\nabc=Name|Sword\n";
        let file = RequestFile::parse(content).unwrap();
        assert_eq!(file.queries.len(), 2);
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let result = RequestFile::load("/nonexistent/BazMonitor.ini");
        assert!(result.is_err());
    }
}
