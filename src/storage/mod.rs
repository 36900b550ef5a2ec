//! Result file storage.
//!
//! Two independent CSV files share the same row shape:
//!
//! - **Search results**: reset on every request file reload, then appended
//!   to once per new search request.
//! - **Monitor results**: reset once at startup, then patched per item on
//!   every poll cycle (remove the item's rows, append the fresh ones).
//!
//! Any I/O error from a store is fatal to the caller; the files are the only
//! channel back to the front-end.

pub mod local;

pub use local::CsvStore;
