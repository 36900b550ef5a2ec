// src/pipeline/watch.rs

//! Long running triggers: the request file watcher and the monitor poller.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinError;

use crate::error::{AppError, Result};
use crate::pipeline::Bridge;

/// Run the bridge until Ctrl-C or until a trigger fails.
///
/// Both result files are reset and the request file is processed once, then
/// the watcher and the poller run as independent tasks. The file watch is
/// registered before the first reload so writes made during it are replayed.
pub async fn run_bridge(bridge: Arc<Bridge>) -> Result<()> {
    bridge.start().await?;
    let requests = RequestWatcher::register(&bridge.paths.request_file)?;
    bridge.reload().await?;

    let watcher = tokio::spawn(requests.run(Arc::clone(&bridge)));
    let poller = tokio::spawn(poll_monitors(Arc::clone(&bridge)));

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            log::info!("Interrupt received, stopping Bazaar query bridge");
            Ok(())
        }
        result = watcher => task_result("watcher", result),
        result = poller => task_result("poller", result),
    }
}

fn task_result(name: &str, joined: std::result::Result<Result<()>, JoinError>) -> Result<()> {
    match joined {
        Ok(Ok(())) => {
            log::warn!("{} task stopped", name);
            Ok(())
        }
        Ok(Err(e)) => {
            log::error!("{} task failed: {}", name, e);
            Err(e)
        }
        Err(e) => Err(AppError::Io(e.into())),
    }
}

/// Change notifications for the request file.
///
/// The parent directory is watched so editors that replace the file are
/// still seen. Events queue up from [`RequestWatcher::register`] until
/// [`RequestWatcher::run`] consumes them.
pub struct RequestWatcher {
    file: PathBuf,
    events: mpsc::UnboundedReceiver<notify::Result<Event>>,
    _watcher: RecommendedWatcher,
}

impl RequestWatcher {
    pub fn register(file: &Path) -> Result<Self> {
        let (tx, events) = mpsc::unbounded_channel();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = tx.send(res);
        })?;
        watcher.watch(&watch_dir(file), RecursiveMode::NonRecursive)?;
        log::info!("Watching {} for changes", file.display());

        Ok(Self {
            file: file.to_path_buf(),
            events,
            _watcher: watcher,
        })
    }

    /// Reload on every change to the request file. Events arriving within the
    /// settle window are folded into one reload.
    pub async fn run(mut self, bridge: Arc<Bridge>) -> Result<()> {
        while let Some(res) = self.events.recv().await {
            match res {
                Ok(event) if touches(&event, &self.file) => {
                    log::debug!("File event: {:?}", event);
                    tokio::time::sleep(bridge.settle).await;
                    while self.events.try_recv().is_ok() {}

                    log::info!("File modified: {}", self.file.display());
                    bridge.reload().await?;
                }
                Ok(event) => log::trace!("Ignoring file event: {:?}", event),
                Err(e) => log::error!("File watcher error: {}", e),
            }
        }

        Err(AppError::Watch(notify::Error::generic("watch channel closed")))
    }
}

/// Watch the bridge's request file and reload on every change.
pub async fn watch_request_file(bridge: Arc<Bridge>) -> Result<()> {
    RequestWatcher::register(&bridge.paths.request_file)?
        .run(bridge)
        .await
}

/// Re-query monitored items forever, sleeping the current poll delay between
/// cycles.
pub async fn poll_monitors(bridge: Arc<Bridge>) -> Result<()> {
    loop {
        bridge.run_monitor_cycle().await?;

        let delay = bridge.poll_delay();
        log::debug!("Next monitor cycle in {} seconds", delay.as_secs());
        tokio::time::sleep(delay).await;
    }
}

fn watch_dir(file: &Path) -> PathBuf {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Whether `event` is a write to `file`.
fn touches(event: &Event, file: &Path) -> bool {
    if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
        return false;
    }
    let Some(name) = file.file_name() else {
        return false;
    };
    event.paths.iter().any(|p| p.file_name() == Some(name))
}
