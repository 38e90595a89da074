use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::Utc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use super::cancellation::CancellationToken;
use super::config::BatchConfig;
use crate::classify::Classifier;
use crate::record::{normalize_tags, Record, RecordStore, StoreError};
use crate::types::progress::{CategorySummary, RunProgress, RunStatus};

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("a run is already in progress")]
    AlreadyRunning,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("run cancelled")]
    Cancelled,
    #[error("invalid batch configuration: {0}")]
    InvalidConfig(String),
}

/// Drives one classification run at a time over a record store.
///
/// A run pages through the store in `batch_size` chunks, classifies every
/// record of a page, commits the page as a unit and then yields to the
/// scheduler. Pages committed before a failure stay committed.
///
/// The runner is meant to be shared behind an `Arc`: `get_progress` and
/// `cancel` may be called from other tasks while `start_run` is in flight.
pub struct BatchRunner {
    store: Arc<dyn RecordStore>,
    classifier: RwLock<Arc<Classifier>>,
    config: BatchConfig,
    progress: watch::Sender<RunProgress>,
    cancel: Mutex<CancellationToken>,
}

impl BatchRunner {
    pub fn new(
        store: Arc<dyn RecordStore>,
        classifier: Arc<Classifier>,
        config: BatchConfig,
    ) -> Result<Self, BatchError> {
        config.validate()?;
        let (progress, _) = watch::channel(RunProgress::idle());
        Ok(Self {
            store,
            classifier: RwLock::new(classifier),
            config,
            progress,
            cancel: Mutex::new(CancellationToken::new()),
        })
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Snapshot of the current or most recent run. Never waits on the run.
    pub fn get_progress(&self) -> RunProgress {
        self.progress.borrow().clone()
    }

    /// Receiver notified on every progress change.
    pub fn subscribe(&self) -> watch::Receiver<RunProgress> {
        self.progress.subscribe()
    }

    /// Ask the in-flight run to stop at the next page boundary.
    pub fn cancel(&self) {
        self.cancel_token().cancel();
    }

    /// Swap the rules used by subsequent runs.
    pub fn replace_classifier(&self, classifier: Arc<Classifier>) -> Result<(), BatchError> {
        let mut running = false;
        // Holding the progress lock keeps a run from starting mid-swap.
        self.progress.send_if_modified(|p| {
            if p.status == RunStatus::Running {
                running = true;
            } else {
                *self
                    .classifier
                    .write()
                    .unwrap_or_else(PoisonError::into_inner) = classifier.clone();
            }
            false
        });
        if running {
            return Err(BatchError::AlreadyRunning);
        }
        Ok(())
    }

    /// Discard the last run's progress and return to `idle`.
    pub fn reset(&self) -> Result<(), BatchError> {
        let mut running = false;
        self.progress.send_if_modified(|p| {
            if p.status == RunStatus::Running {
                running = true;
                return false;
            }
            *p = RunProgress::idle();
            *self.cancel.lock().unwrap_or_else(PoisonError::into_inner) = CancellationToken::new();
            true
        });
        if running {
            return Err(BatchError::AlreadyRunning);
        }
        Ok(())
    }

    /// Run classification over the whole store.
    ///
    /// Returns the final snapshot on completion. On a store failure or
    /// cancellation the snapshot is left in `error` with `last_error` set and
    /// the cause is returned.
    #[instrument(skip(self), fields(batch_size = self.config.batch_size))]
    pub async fn start_run(&self) -> Result<RunProgress, BatchError> {
        let started_at = Utc::now();
        let mut claimed = None;
        self.progress.send_if_modified(|p| {
            if p.status == RunStatus::Running {
                return false;
            }
            // A finished run's cancellation must not leak into the next one; a
            // cancel issued while the runner sat idle applies to this run. The
            // token is settled before `running` becomes visible.
            let cancel = {
                let mut token = self.cancel.lock().unwrap_or_else(PoisonError::into_inner);
                if p.is_terminal() {
                    *token = CancellationToken::new();
                }
                token.clone()
            };
            let classifier = self
                .classifier
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone();
            claimed = Some((classifier, cancel));
            *p = RunProgress::started(started_at);
            true
        });
        let Some((classifier, cancel)) = claimed else {
            return Err(BatchError::AlreadyRunning);
        };
        let _abort_guard = AbortGuard {
            progress: &self.progress,
        };

        info!("classification run started");
        match self.execute(&classifier, &cancel).await {
            Ok(()) => {
                self.progress.send_modify(|p| {
                    if p.processed_records < p.total_records {
                        warn!(
                            expected = p.total_records,
                            processed = p.processed_records,
                            "record store shrank during run; reconciling total"
                        );
                        p.total_records = p.processed_records;
                    }
                    p.complete(Utc::now());
                });
                let progress = self.get_progress();
                info!(
                    processed = progress.processed_records,
                    pages = progress.pages_committed,
                    "classification run completed"
                );
                Ok(progress)
            }
            Err(err) => {
                let message = err.to_string();
                self.progress.send_modify(|p| p.fail(message.clone(), Utc::now()));
                match err {
                    BatchError::Cancelled => warn!("classification run cancelled"),
                    _ => error!(error = %message, "classification run failed"),
                }
                Err(err)
            }
        }
    }

    async fn execute(
        &self,
        classifier: &Classifier,
        cancel: &CancellationToken,
    ) -> Result<(), BatchError> {
        let total = self.store.count().await?;
        self.progress.send_modify(|p| {
            p.total_records = total;
            p.rules_fingerprints.insert(
                classifier.main().group().id().clone(),
                classifier.main().rules().fingerprint().to_string(),
            );
            p.rules_fingerprints.insert(
                classifier.personality().group().id().clone(),
                classifier.personality().rules().fingerprint().to_string(),
            );
        });
        debug!(total, "record count fetched");

        let batch_size = self.config.batch_size;
        let mut offset = 0;
        while offset < total {
            if cancel.is_cancelled() {
                return Err(BatchError::Cancelled);
            }

            // Clamped so processed never overtakes the count taken at start.
            let limit = batch_size.min(total - offset);
            let mut page = self.store.fetch_page(offset, limit).await?;
            page.truncate(limit);
            if page.is_empty() {
                break;
            }

            let page_summary = self.classify_page(classifier, &mut page);
            self.store.commit(&page).await?;

            let committed = page.len();
            self.progress
                .send_modify(|p| p.record_page(committed, &page_summary));
            debug!(offset, committed, "page committed");
            offset += committed;

            tokio::task::yield_now().await;

            if committed < limit {
                break;
            }
        }
        Ok(())
    }

    /// Classify every record of a page in place. Never suspends.
    fn classify_page(&self, classifier: &Classifier, page: &mut [Record]) -> CategorySummary {
        let main_group = classifier.main().group().id();
        let personality_group = classifier.personality().group().id();
        let mut summary = CategorySummary::new();

        for record in page.iter_mut() {
            let assignment = if self.config.normalize_tags {
                classifier.assign(&normalize_tags(&record.tags))
            } else {
                classifier.assign(&record.tags)
            };
            summary.record(main_group, &assignment.main);
            summary.record(personality_group, &assignment.personality);
            record.apply(assignment);
        }
        summary
    }

    fn cancel_token(&self) -> CancellationToken {
        self.cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Marks a run that is dropped or unwinds while still `running` as failed,
/// so waiters and later `start_run` calls never see it stuck.
struct AbortGuard<'a> {
    progress: &'a watch::Sender<RunProgress>,
}

impl Drop for AbortGuard<'_> {
    fn drop(&mut self) {
        self.progress.send_if_modified(|p| {
            if p.status != RunStatus::Running {
                return false;
            }
            p.fail("run aborted", Utc::now());
            true
        });
    }
}
