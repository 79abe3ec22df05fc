//! Configuration snapshot hot-reload.
//!
//! The loaded [`Pipeline`] is a read-only snapshot; reloading builds a
//! fresh snapshot from the config file and atomically swaps it in behind an
//! `Arc<RwLock<Pipeline>>`. Concurrent readers (request handlers) are never
//! blocked for more than the brief write-lock duration during a swap.
//!
//! Reload triggers:
//!
//! - **File change**: [`start_file_watcher`] uses the [`notify`] crate
//!   to detect modifications to `vaultgate.toml`.
//! - **SIGHUP** (Unix only): [`start_sighup_handler`] listens for the
//!   HUP signal for manual reload via `kill -HUP <pid>`.
//!
//! Invalid configuration is handled fail-safe: the old snapshot is retained
//! and a warning is logged.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::pipeline::Pipeline;

/// Shared handle to the current pipeline snapshot.
pub type SharedPipeline = Arc<RwLock<Pipeline>>;

/// Reload the pipeline from disk, replacing the contents of the `RwLock`.
///
/// On success the new snapshot is swapped in atomically. On failure (I/O
/// error, invalid TOML, missing env vars) the old snapshot is retained and
/// the error is returned.
pub fn reload_pipeline(
    pipeline_lock: &SharedPipeline,
    config_path: &Path,
) -> crate::error::Result<()> {
    let config = AppConfig::load_from_path(config_path)?;
    let fresh = Pipeline::from_config(&config);
    let mut pipeline = pipeline_lock.write().unwrap();
    *pipeline = fresh;
    info!(
        "Pipeline reloaded from {} ({} secrets)",
        config_path.display(),
        pipeline.store().len()
    );
    Ok(())
}

/// Start a file-system watcher that triggers [`reload_pipeline`] on config changes.
///
/// Returns a [`RecommendedWatcher`] handle that must be kept alive for the
/// duration of the watch. Dropping the handle stops the watcher.
pub fn start_file_watcher(
    config_path: PathBuf,
    pipeline_lock: SharedPipeline,
) -> notify::Result<RecommendedWatcher> {
    let path = config_path.clone();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => {
            if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                info!("Config file changed, reloading pipeline...");
                if let Err(e) = reload_pipeline(&pipeline_lock, &path) {
                    warn!("Pipeline reload failed (keeping old snapshot): {}", e);
                }
            }
        }
        Err(e) => {
            warn!("File watcher error: {}", e);
        }
    })?;

    watcher.watch(&config_path, RecursiveMode::NonRecursive)?;
    info!("Watching {} for changes", config_path.display());
    Ok(watcher)
}

/// Start a SIGHUP handler that reloads the pipeline on signal.
#[cfg(unix)]
pub fn start_sighup_handler(config_path: PathBuf, pipeline_lock: SharedPipeline) {
    tokio::spawn(async move {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sig = signal(SignalKind::hangup()).expect("Failed to register SIGHUP handler");
        loop {
            sig.recv().await;
            info!("SIGHUP received, reloading pipeline...");
            if let Err(e) = reload_pipeline(&pipeline_lock, &config_path) {
                warn!("Pipeline reload on SIGHUP failed (keeping old snapshot): {}", e);
            }
        }
    });
}

/// No-op SIGHUP handler for non-Unix platforms.
#[cfg(not(unix))]
pub fn start_sighup_handler(_config_path: PathBuf, _pipeline_lock: SharedPipeline) {
    // SIGHUP is not available on this platform
}
