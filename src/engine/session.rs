use crate::engine::EngineEnvironment;
use crate::error::{ProcessingError, Result};
use crate::utils::constants::{APP_NAME, SCRATCH_DIR_PREFIX};
use rayon::ThreadPool;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::TempDir;
use tracing::{info, warn};

/// Process-scoped handle to the processing engine.
///
/// Owns the worker pool every parallel stage runs on and a scratch
/// directory under the engine home. Both are released by [`stop`] or, on
/// any early exit, when the session is dropped.
///
/// [`stop`]: AnalysisSession::stop
pub struct AnalysisSession {
    pool: ThreadPool,
    scratch: Option<TempDir>,
    scratch_path: PathBuf,
    workers: usize,
    started: Instant,
}

impl AnalysisSession {
    pub fn start(environment: &EngineEnvironment, max_workers: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(max_workers)
            .thread_name(|i| format!("trip-worker-{}", i))
            .build()
            .map_err(|e| ProcessingError::SessionStart(e.to_string()))?;

        let scratch = tempfile::Builder::new()
            .prefix(SCRATCH_DIR_PREFIX)
            .tempdir_in(environment.home())
            .map_err(|e| {
                ProcessingError::SessionStart(format!(
                    "cannot create scratch space in {}: {}",
                    environment.home().display(),
                    e
                ))
            })?;

        info!(
            app = APP_NAME,
            workers = max_workers,
            scratch = %scratch.path().display(),
            "analysis session started"
        );

        Ok(Self {
            pool,
            scratch_path: scratch.path().to_path_buf(),
            scratch: Some(scratch),
            workers: max_workers,
            started: Instant::now(),
        })
    }

    /// Run `op` on the session's worker pool.
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_path
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Release the session explicitly at the end of a successful run.
    pub fn stop(mut self) -> Result<()> {
        match self.scratch.take() {
            Some(scratch) => {
                scratch.close()?;
                info!(
                    elapsed_ms = self.started.elapsed().as_millis() as u64,
                    "analysis session stopped"
                );
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl Drop for AnalysisSession {
    fn drop(&mut self) {
        if let Some(scratch) = self.scratch.take() {
            if let Err(e) = scratch.close() {
                warn!("failed to remove session scratch space: {}", e);
            }
            warn!(
                elapsed_ms = self.started.elapsed().as_millis() as u64,
                "analysis session released after early exit"
            );
        }
    }
}
