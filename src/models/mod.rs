// src/models/mod.rs

//! Domain models for the bazaar bridge.

mod config;
mod request;
mod result_row;
mod term;

// Re-export all public types
pub use config::{
    BazaarConfig, HttpConfig, MIN_POLL_SECS, ScheduleConfig, Settings, clamp_poll_secs,
};
pub use request::{Request, RequestKind, derive_id, monitor_terms};
pub use result_row::{HEADER, ResultRow};
pub use term::{SearchTerm, TermKey, parse_terms};
