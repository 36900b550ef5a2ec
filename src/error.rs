// src/error.rs

//! Unified error handling for the bazaar bridge.

use std::fmt;

use thiserror::Error;

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Request file (INI) could not be read or parsed
    #[error("INI error: {0}")]
    Ini(#[from] ini::Error),

    /// Result file could not be read or written
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File watcher failed
    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The fetched page did not have the expected shape
    #[error("Scrape error for {context}: {message}")]
    Scrape { context: String, message: String },
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a scrape error with context.
    pub fn scrape(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Scrape {
            context: context.into(),
            message: message.to_string(),
        }
    }
}
