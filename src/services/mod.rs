//! Service layer for the bridge.
//!
//! This module contains:
//! - Query translation (`build_query_url`)
//! - Request deduplication (`DedupCache`)
//! - Bazaar scraping (`BazaarClient`)

mod bazaar;
mod dedup;
pub mod query;

pub use bazaar::{BazaarClient, BazaarSource};
pub use dedup::DedupCache;
pub use query::{build_query, build_query_url};
