//! Cache Evictor Task
//!
//! Background task that periodically deletes cache files older than the TTL.
//!
//! The evictor shares nothing with the request path except the cache
//! directory. Images only appear there through an atomic rename, so a file
//! that is still being written is never visible to a sweep.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Lower bound on the pause between sweeps
const MIN_INTERVAL: Duration = Duration::from_millis(100);

/// Result of one pass over the cache directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Regular files examined
    pub scanned: usize,
    /// Files deleted for being older than the TTL
    pub deleted: usize,
    /// Expired files that could not be deleted
    pub failed: usize,
}

/// Lifecycle of a spawned evictor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictorState {
    Running,
    Stopping,
    Stopped,
}

// == Cache Evictor ==
/// Age-based eviction over a cache directory.
#[derive(Debug, Clone)]
pub struct CacheEvictor {
    root: PathBuf,
    ttl: Duration,
    interval: Duration,
}

impl CacheEvictor {
    /// Evictor for `root` that sweeps every `ttl / 2`, which bounds the
    /// lifetime of any file to 1.5x the TTL.
    pub fn new(root: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            root: root.into(),
            ttl,
            interval: (ttl / 2).max(MIN_INTERVAL),
        }
    }

    /// Overrides the pause between sweeps.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_INTERVAL);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    // == Sweep ==
    /// Deletes every regular file whose modification time is more than the
    /// TTL in the past. Deletion failures are logged and skipped.
    pub async fn sweep(&self) -> io::Result<SweepReport> {
        sweep_expired(&self.root, self.ttl).await
    }

    // == Spawn ==
    /// Starts the sweep loop on the runtime.
    ///
    /// The first sweep runs immediately; after that the task sleeps for the
    /// interval or until stopped, whichever comes first.
    pub fn spawn(self) -> EvictorHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            info!(
                "Starting cache evictor on {} (ttl={}s, interval={}ms)",
                self.root.display(),
                self.ttl.as_secs(),
                self.interval.as_millis()
            );

            while !token.is_cancelled() {
                match self.sweep().await {
                    Ok(report) if report.deleted > 0 || report.failed > 0 => {
                        info!(
                            "Cache sweep: deleted {} of {} files ({} failed)",
                            report.deleted, report.scanned, report.failed
                        );
                    }
                    Ok(report) => debug!("Cache sweep: {} files, none expired", report.scanned),
                    Err(e) => error!("Error scanning cache directory {}: {}", self.root.display(), e),
                }

                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(self.interval) => {}
                }
            }

            info!("Cache evictor stopped");
        });

        EvictorHandle {
            cancel,
            task: Mutex::new(Some(task)),
        }
    }
}

/// One eviction pass over `root`.
pub async fn sweep_expired(root: &Path, ttl: Duration) -> io::Result<SweepReport> {
    let mut report = SweepReport::default();
    let mut entries = tokio::fs::read_dir(root).await?;
    let now = SystemTime::now();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let metadata = match entry.metadata().await {
            Ok(m) => m,
            // Deleted by someone else since listing
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => {
                warn!("Error reading metadata of {}: {}", path.display(), e);
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }
        report.scanned += 1;

        let Ok(modified) = metadata.modified() else {
            continue;
        };
        // mtime in the future counts as age zero
        let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
        if age <= ttl {
            continue;
        }

        let name = entry.file_name();
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                report.deleted += 1;
                info!("Deleted expired cache file: {}", name.to_string_lossy());
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                report.failed += 1;
                error!("Error deleting file {}: {}", name.to_string_lossy(), e);
            }
        }
    }

    Ok(report)
}

// == Evictor Handle ==
/// Owner of a running evictor. Stopping is explicit; dropping the handle
/// only signals the task.
#[derive(Debug)]
pub struct EvictorHandle {
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl EvictorHandle {
    /// Signals the evictor, wakes it if sleeping and waits until the task
    /// has exited. Safe to call any number of times, concurrently or not;
    /// every call returns only once the task is gone.
    pub async fn stop(&self) {
        self.cancel.cancel();

        let mut task = self.task.lock().await;
        if let Some(handle) = task.take() {
            if let Err(e) = handle.await {
                if e.is_panic() {
                    error!("Cache evictor panicked: {}", e);
                }
            }
        }
    }

    pub fn state(&self) -> EvictorState {
        match self.task.try_lock() {
            Err(_) => EvictorState::Stopping,
            Ok(task) => match task.as_ref() {
                None => EvictorState::Stopped,
                Some(handle) if handle.is_finished() => EvictorState::Stopped,
                Some(_) if self.cancel.is_cancelled() => EvictorState::Stopping,
                Some(_) => EvictorState::Running,
            },
        }
    }
}

impl Drop for EvictorHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
