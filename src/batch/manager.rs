use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::config::BatchConfig;
use super::runner::{BatchError, BatchRunner};
use crate::classify::Classifier;
use crate::record::RecordStore;
use crate::types::identifiers::RunId;
use crate::types::progress::RunProgress;

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("unknown run {0}")]
    UnknownRun(RunId),
    #[error("all {max_retained} retained runs are still active")]
    CapacityExhausted { max_retained: usize },
    #[error("no tokio runtime available to spawn the run")]
    NoRuntime,
    #[error("run task failed: {0}")]
    TaskFailed(String),
    #[error(transparent)]
    Batch(#[from] BatchError),
}

/// How long finished runs stay queryable and how many runs are kept at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionPolicy {
    pub max_retained: usize,
    pub finished_ttl_secs: i64,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            max_retained: 16,
            finished_ttl_secs: 3600,
        }
    }
}

struct ManagedRun {
    runner: Arc<BatchRunner>,
    created_at: DateTime<Utc>,
    handle: Option<JoinHandle<Result<RunProgress, BatchError>>>,
}

/// Process-wide registry of background runs.
///
/// Each `start` gets its own [`BatchRunner`]; nothing here serializes runs
/// against each other, so overlapping runs resolve as last commit wins.
pub struct RunManager {
    store: Arc<dyn RecordStore>,
    classifier: RwLock<Arc<Classifier>>,
    config: BatchConfig,
    retention: RetentionPolicy,
    finished_ttl: Duration,
    runs: Mutex<BTreeMap<RunId, ManagedRun>>,
}

impl RunManager {
    pub fn new(
        store: Arc<dyn RecordStore>,
        classifier: Arc<Classifier>,
        config: BatchConfig,
        retention: RetentionPolicy,
    ) -> Result<Self, ManagerError> {
        config.validate()?;
        if retention.max_retained == 0 {
            return Err(BatchError::InvalidConfig("max_retained must be at least 1".into()).into());
        }
        let finished_ttl = Some(retention.finished_ttl_secs)
            .filter(|secs| *secs >= 0)
            .and_then(Duration::try_seconds)
            .ok_or_else(|| {
                BatchError::InvalidConfig(format!(
                    "finished_ttl_secs out of range: {}",
                    retention.finished_ttl_secs
                ))
            })?;
        Ok(Self {
            store,
            classifier: RwLock::new(classifier),
            config,
            retention,
            finished_ttl,
            runs: Mutex::new(BTreeMap::new()),
        })
    }

    /// Rules picked up by runs started after this call.
    pub fn replace_classifier(&self, classifier: Arc<Classifier>) {
        *self
            .classifier
            .write()
            .unwrap_or_else(PoisonError::into_inner) = classifier;
    }

    /// Spawn a new run on the current tokio runtime.
    pub fn start(&self) -> Result<RunId, ManagerError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| ManagerError::NoRuntime)?;
        let now = Utc::now();

        let mut runs = self.lock_runs();
        self.evict_locked(&mut runs, now);
        self.make_room_locked(&mut runs);
        if runs.len() >= self.retention.max_retained {
            return Err(ManagerError::CapacityExhausted {
                max_retained: self.retention.max_retained,
            });
        }

        let classifier = self
            .classifier
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let runner = Arc::new(BatchRunner::new(
            self.store.clone(),
            classifier,
            self.config.clone(),
        )?);

        let id = RunId::generate();
        let task_runner = runner.clone();
        let handle = runtime.spawn(async move { task_runner.start_run().await });
        runs.insert(
            id,
            ManagedRun {
                runner,
                created_at: now,
                handle: Some(handle),
            },
        );
        info!(run_id = %id, "run registered");
        Ok(id)
    }

    pub fn progress(&self, id: &RunId) -> Result<RunProgress, ManagerError> {
        self.lock_runs()
            .get(id)
            .map(|run| run.runner.get_progress())
            .ok_or(ManagerError::UnknownRun(*id))
    }

    pub fn cancel(&self, id: &RunId) -> Result<(), ManagerError> {
        let runs = self.lock_runs();
        let run = runs.get(id).ok_or(ManagerError::UnknownRun(*id))?;
        run.runner.cancel();
        Ok(())
    }

    /// Wait for a run to reach a terminal state and return its final snapshot.
    ///
    /// Any number of callers may wait on the same run. A failed run is not an
    /// error here; its snapshot carries `status = error`.
    pub async fn wait(&self, id: &RunId) -> Result<RunProgress, ManagerError> {
        let (runner, handle) = {
            let mut runs = self.lock_runs();
            let run = runs.get_mut(id).ok_or(ManagerError::UnknownRun(*id))?;
            (run.runner.clone(), run.handle.take())
        };
        // Only the first waiter holds the task handle; it surfaces panics.
        if let Some(handle) = handle {
            if let Err(join_err) = handle.await {
                return Err(ManagerError::TaskFailed(join_err.to_string()));
            }
        }
        let mut progress = runner.subscribe();
        let finished = progress
            .wait_for(RunProgress::is_terminal)
            .await
            .map_err(|e| ManagerError::TaskFailed(e.to_string()))?
            .clone();
        Ok(finished)
    }

    /// Registered runs, oldest first.
    pub fn run_ids(&self) -> Vec<RunId> {
        let runs = self.lock_runs();
        let mut ids: Vec<(DateTime<Utc>, RunId)> =
            runs.iter().map(|(id, run)| (run.created_at, *id)).collect();
        ids.sort();
        ids.into_iter().map(|(_, id)| id).collect()
    }

    /// Drop finished runs past their TTL. Returns how many were removed.
    pub fn evict_finished(&self, now: DateTime<Utc>) -> usize {
        let mut runs = self.lock_runs();
        self.evict_locked(&mut runs, now)
    }

    fn evict_locked(&self, runs: &mut BTreeMap<RunId, ManagedRun>, now: DateTime<Utc>) -> usize {
        let before = runs.len();
        let ttl = self.finished_ttl;
        runs.retain(|_, run| {
            let progress = run.runner.get_progress();
            !(progress.is_terminal() && progress.ended_at.is_some_and(|t| now - t >= ttl))
        });
        let evicted = before - runs.len();
        if evicted > 0 {
            debug!(evicted, retained = runs.len(), "evicted expired runs");
        }
        evicted
    }

    /// Drop the oldest finished runs until one more run fits.
    fn make_room_locked(&self, runs: &mut BTreeMap<RunId, ManagedRun>) {
        if runs.len() < self.retention.max_retained {
            return;
        }
        let mut finished: Vec<(DateTime<Utc>, RunId)> = runs
            .iter()
            .filter(|(_, run)| run.runner.get_progress().is_terminal())
            .map(|(id, run)| (run.created_at, *id))
            .collect();
        finished.sort();
        let excess = runs.len() + 1 - self.retention.max_retained;
        for (_, id) in finished.into_iter().take(excess) {
            runs.remove(&id);
            debug!(run_id = %id, "evicted oldest finished run");
        }
    }

    fn lock_runs(&self) -> MutexGuard<'_, BTreeMap<RunId, ManagedRun>> {
        self.runs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
