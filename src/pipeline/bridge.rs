// src/pipeline/bridge.rs

//! Shared bridge state and the two batch operations: processing a reloaded
//! request file and running one monitor cycle.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::config::RequestFile;
use crate::error::Result;
use crate::models::{Request, Settings};
use crate::services::{BazaarSource, DedupCache};
use crate::storage::CsvStore;

/// File locations used by the bridge.
#[derive(Debug, Clone)]
pub struct BridgePaths {
    /// INI file written by the front-end
    pub request_file: PathBuf,
    pub search_results: PathBuf,
    pub monitor_results: PathBuf,
}

impl BridgePaths {
    /// Resolve file names against the front-end's config directory.
    pub fn in_dir(
        dir: impl AsRef<Path>,
        request_file: &str,
        search_results: &str,
        monitor_results: &str,
    ) -> Self {
        let dir = dir.as_ref();
        Self {
            request_file: dir.join(request_file),
            search_results: dir.join(search_results),
            monitor_results: dir.join(monitor_results),
        }
    }
}

/// Counters for one batch of Bazaar queries.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchStats {
    pub queried: usize,
    pub skipped: usize,
    pub failed: usize,
    pub rows: usize,
}

/// The bridge between the request file, the Bazaar and the result files.
pub struct Bridge {
    pub(crate) paths: BridgePaths,
    source: Arc<dyn BazaarSource>,
    /// Search request ID -> raw request; never cleared
    searches: DedupCache,
    /// Monitored item name -> raw request; replaced on every reload
    monitors: DedupCache,
    poll_secs: AtomicU64,
    search_store: CsvStore,
    monitor_store: CsvStore,
    query_delay: Duration,
    pub(crate) settle: Duration,
}

impl Bridge {
    pub fn new(paths: BridgePaths, settings: &Settings, source: Arc<dyn BazaarSource>) -> Self {
        Self {
            search_store: CsvStore::new(&paths.search_results),
            monitor_store: CsvStore::new(&paths.monitor_results),
            paths,
            source,
            searches: DedupCache::new(),
            monitors: DedupCache::new(),
            poll_secs: AtomicU64::new(settings.schedule.default_poll()),
            query_delay: settings.schedule.query_delay(),
            settle: settings.schedule.settle(),
        }
    }

    pub fn search_store(&self) -> &CsvStore {
        &self.search_store
    }

    pub fn monitor_store(&self) -> &CsvStore {
        &self.monitor_store
    }

    /// Current delay between two monitor cycles.
    pub fn poll_delay(&self) -> Duration {
        Duration::from_secs(self.poll_secs.load(Ordering::Relaxed))
    }

    /// Monitored items as (item name, raw request), sorted by name.
    pub fn monitored(&self) -> Vec<(String, String)> {
        self.monitors.snapshot()
    }

    /// Reset both result files. Called once at startup.
    pub async fn start(&self) -> Result<()> {
        log::info!("Using request file: {}", self.paths.request_file.display());
        log::info!(
            "Using search results file: {}",
            self.search_store.path().display()
        );
        log::info!(
            "Using monitor results file: {}",
            self.monitor_store.path().display()
        );

        self.search_store.reset().await?;
        self.monitor_store.reset().await?;
        Ok(())
    }

    /// Reload the request file and process it.
    ///
    /// An unreadable file is logged and leaves all state untouched; `Ok(None)`
    /// is returned in that case. Only result file errors are returned as `Err`.
    pub async fn reload(&self) -> Result<Option<BatchStats>> {
        let file = match RequestFile::load(&self.paths.request_file) {
            Ok(file) => file,
            Err(e) => {
                log::error!(
                    "Failed to read request file {}: {}",
                    self.paths.request_file.display(),
                    e
                );
                return Ok(None);
            }
        };
        log::debug!("Read request file: {}", self.paths.request_file.display());

        self.apply(file).await.map(Some)
    }

    /// Apply a freshly loaded request file.
    pub async fn apply(&self, file: RequestFile) -> Result<BatchStats> {
        match file.poll_secs {
            Some(secs) => self.poll_secs.store(secs, Ordering::Relaxed),
            None => log::info!(
                "Keeping monitor poll delay of {} seconds",
                self.poll_delay().as_secs()
            ),
        }
        log::debug!(
            "Monitor poll delay set to {} seconds",
            self.poll_delay().as_secs()
        );

        log::debug!("Registering {} monitor items", file.monitor.len());
        self.monitors.replace_all(file.monitor.iter().cloned());

        self.search_store.reset().await?;

        let requests = file.search_requests();
        log::debug!("Processing {} search queries", requests.len());
        self.run_searches(&requests).await
    }

    /// Run every search request not seen before, in order.
    pub async fn run_searches(&self, requests: &[Request]) -> Result<BatchStats> {
        let mut stats = BatchStats::default();

        for request in requests {
            if self.searches.contains(&request.id) {
                log::debug!("[{}] Duplicate query. Skipping.", request.id);
                stats.skipped += 1;
                continue;
            }

            if stats.queried > 0 {
                self.pause().await;
            }
            self.searches.put(&request.id, &request.raw);
            stats.queried += 1;

            log::debug!("[{}] Search terms: {:?}", request.id, request.terms);
            match self.source.query(&request.id, &request.terms).await {
                Ok(rows) => {
                    self.search_store.append(&rows).await?;
                    stats.rows += rows.len();
                    log::info!(
                        "[{}] Wrote {} rows to search results",
                        request.id,
                        rows.len()
                    );
                }
                Err(e) => {
                    stats.failed += 1;
                    log::error!("[{}] Error querying Bazaar: {}", request.id, e);
                }
            }
        }

        if stats.queried > 0 {
            log::info!(
                "Search batch: {} queried, {} skipped, {} failed, {} rows",
                stats.queried,
                stats.skipped,
                stats.failed,
                stats.rows
            );
        }
        Ok(stats)
    }

    /// Re-query every monitored item and patch its rows in the monitor file.
    ///
    /// Items run in order of their derived ID. A failed fetch leaves the
    /// item's previous rows in place.
    pub async fn run_monitor_cycle(&self) -> Result<BatchStats> {
        let mut requests: Vec<Request> = self
            .monitors
            .snapshot()
            .iter()
            .map(|(name, raw)| Request::monitor(name, raw.as_str()))
            .collect();
        requests.sort_by(|a, b| a.id.cmp(&b.id));

        let mut stats = BatchStats::default();
        for request in &requests {
            if stats.queried > 0 {
                self.pause().await;
            }
            stats.queried += 1;

            match self.source.query(&request.id, &request.terms).await {
                Ok(rows) => {
                    let removed = self.monitor_store.remove_query(&request.id).await?;
                    self.monitor_store.append(&rows).await?;
                    stats.rows += rows.len();
                    log::info!(
                        "[{}] Replaced {} with {} rows in monitor results",
                        request.id,
                        removed,
                        rows.len()
                    );
                }
                Err(e) => {
                    stats.failed += 1;
                    log::error!("[{}] Error querying Bazaar: {}", request.id, e);
                }
            }
        }

        log::debug!(
            "Monitor cycle: {} items, {} failed, {} rows",
            stats.queried,
            stats.failed,
            stats.rows
        );
        Ok(stats)
    }

    async fn pause(&self) {
        if !self.query_delay.is_zero() {
            tokio::time::sleep(self.query_delay).await;
        }
    }
}
