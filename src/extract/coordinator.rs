//! Extraction task coordination
//!
//! One coordinator runs at most one extraction cycle per process. The
//! cycle executes on the runtime's worker pool; the caller joins it
//! through [`ResourceExtractor::wait_for_completion`], which also
//! guarantees a clean cache when the task was cancelled or panicked.

use crate::archive::ArchiveReader;
use crate::error::RescacheResult;
use crate::extract::freshness::{self, Freshness};
use crate::extract::passes;
use crate::metadata::PackageMetadata;
use crate::patch::{graduate_downloaded_patch, PatchProvider};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Coordinates the background extraction cycle for one cache directory
///
/// Resources are registered up front, `start` launches the cycle, and
/// `wait_for_completion` blocks until it reaches a terminal state.
/// Failures are not surfaced: the worst outcome is an empty cache that
/// the next start re-extracts.
pub struct ResourceExtractor {
    cache_dir: PathBuf,
    resources: HashSet<String>,
    baseline: Arc<dyn ArchiveReader>,
    metadata: Arc<dyn PackageMetadata>,
    patch: Option<Arc<dyn PatchProvider>>,
    started: bool,
    task: Option<JoinHandle<()>>,
}

impl ResourceExtractor {
    /// Coordinator for `cache_dir`, reading defaults from `baseline`
    /// and overrides from `patch` when one is wired in
    pub fn new(
        cache_dir: impl Into<PathBuf>,
        baseline: Arc<dyn ArchiveReader>,
        metadata: Arc<dyn PackageMetadata>,
        patch: Option<Arc<dyn PatchProvider>>,
    ) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            resources: HashSet::new(),
            baseline,
            metadata,
            patch,
            started: false,
            task: None,
        }
    }

    /// Register a resource key; only valid before `start`
    pub fn add_resource(&mut self, key: impl Into<String>) -> &mut Self {
        assert!(!self.started, "resources must be registered before start");
        self.resources.insert(key.into());
        self
    }

    /// Register a batch of resource keys; only valid before `start`
    pub fn add_resources<I, S>(&mut self, keys: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        assert!(!self.started, "resources must be registered before start");
        self.resources.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Launch the background extraction cycle; calling twice is a bug
    pub fn start(&mut self) -> &mut Self {
        assert!(!self.started, "start may only be called once");
        self.started = true;

        let cycle = Cycle {
            cache_dir: self.cache_dir.clone(),
            resources: self.resources.clone(),
            baseline: Arc::clone(&self.baseline),
            metadata: Arc::clone(&self.metadata),
            patch: self.patch.clone(),
        };
        self.task = Some(tokio::spawn(cycle.run()));
        self
    }

    /// Abort the background cycle; the next `wait_for_completion` will
    /// observe the abort and wipe the cache
    pub fn cancel(&self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }

    /// Block until the cycle finishes
    ///
    /// A cancelled or panicked cycle counts as a failure: the cache is
    /// wiped here so no partial state is ever consumed. A no-op when
    /// `start` was never called.
    pub async fn wait_for_completion(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };

        if let Err(e) = task.await {
            warn!("Extraction task did not complete cleanly: {e}");
            passes::delete_files(&self.cache_dir, &self.resources).await;
        }
    }
}

/// One extraction cycle's worth of state, moved into the spawned task
struct Cycle {
    cache_dir: PathBuf,
    resources: HashSet<String>,
    baseline: Arc<dyn ArchiveReader>,
    metadata: Arc<dyn PackageMetadata>,
    patch: Option<Arc<dyn PatchProvider>>,
}

impl Cycle {
    async fn run(self) {
        // Hold the installation lock for the whole cycle so the
        // downloader cannot swap the patch archive mid-read. The guard
        // drops on every exit path, failures included.
        let _guard = match &self.patch {
            Some(provider) => Some(provider.installation_lock().lock_owned().await),
            None => None,
        };

        self.run_locked().await;
    }

    async fn run_locked(&self) {
        if let Some(provider) = &self.patch {
            if let Err(e) = graduate_downloaded_patch(provider.as_ref()).await {
                // Partial graduation must never occur; leave the
                // previous archive and cache untouched.
                warn!("Aborting extraction cycle: {e}");
                return;
            }
        }

        let check =
            freshness::check(&self.cache_dir, self.metadata.as_ref(), self.patch.as_deref());
        let token = match check.await {
            Freshness::Fresh => {
                debug!("Resource cache is fresh, nothing to extract");
                return;
            }
            Freshness::Stale(token) => token,
        };

        if let Err(e) = fs::create_dir_all(&self.cache_dir).await {
            warn!("Could not create cache directory {}: {}", self.cache_dir.display(), e);
            return;
        }

        // Full wipe, then repopulate. No mixing of old and new versions.
        passes::delete_files(&self.cache_dir, &self.resources).await;

        if let Err(e) = self.extract_all().await {
            warn!("Extraction failed, wiping cache: {e}");
            passes::delete_files(&self.cache_dir, &self.resources).await;
            return;
        }

        let token_path = self.cache_dir.join(&token);
        if let Err(e) = fs::File::create(&token_path).await {
            // Not fatal: the next start re-detects staleness and
            // re-extracts.
            warn!("Failed to write freshness token {}: {}", token_path.display(), e);
        }
    }

    async fn extract_all(&self) -> RescacheResult<()> {
        // Override first; the baseline pass fills only what the patch
        // left out, so patched bytes always win.
        passes::extract_override(self.patch.as_deref(), &self.cache_dir, &self.resources).await?;
        passes::extract_from(self.baseline.as_ref(), &self.cache_dir, &self.resources, "baseline")
            .await
    }
}
