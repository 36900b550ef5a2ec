//! Pipeline entry points for the bridge.
//!
//! - `Bridge`: shared state, request file reloads and monitor cycles
//! - `run_bridge`: wires the file watcher and the monitor poller together

pub mod bridge;
pub mod watch;

pub use bridge::{BatchStats, Bridge, BridgePaths};
pub use watch::{RequestWatcher, poll_monitors, run_bridge, watch_request_file};
