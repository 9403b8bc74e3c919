use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use logvault_core::error::{LogVaultError, Result};
use logvault_core::model::{LogEntry, LogRecord};
use logvault_store::Store;
use tracing::warn;

use crate::partition::partition;

/// Write seam for a single batch. The store is the production sink; the
/// trait exists so batch failures can be injected under test.
pub trait BatchSink: Send + Sync + 'static {
    /// Writes one batch, returning how many records actually landed.
    fn write_batch(&self, batch: &[LogRecord]) -> Result<usize>;
}

impl BatchSink for Store {
    fn write_batch(&self, batch: &[LogRecord]) -> Result<usize> {
        self.insert_logs(batch)
    }
}

#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Concurrency ceiling: at most this many batch writes in flight.
    pub parallelism: usize,
    /// A batch still running past this deadline is treated as failed.
    pub batch_timeout: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            parallelism: 4,
            batch_timeout: Duration::from_secs(30),
        }
    }
}

/// Drives partitioned batches to a sink in waves.
///
/// Each wave dispatches up to `parallelism` batch writes concurrently and
/// joins all of them before the next wave starts, bounding peak store load.
/// A batch that fails or times out contributes zero to the success count
/// and is logged; it never aborts its siblings or later waves. Ingestion is
/// therefore best-effort partial-success, not all-or-nothing.
pub struct Coordinator<S> {
    sink: Arc<S>,
    cfg: CoordinatorConfig,
}

impl<S: BatchSink> Coordinator<S> {
    pub fn new(sink: Arc<S>, cfg: CoordinatorConfig) -> Self {
        Self { sink, cfg }
    }

    /// Returns the total number of records persisted across all batches.
    pub async fn ingest(&self, batches: Vec<Vec<LogRecord>>) -> Result<usize> {
        if batches.iter().all(|b| b.is_empty()) {
            return Err(LogVaultError::Validation(
                "logs must be a non-empty list".to_string(),
            ));
        }

        let parallelism = self.cfg.parallelism.max(1);
        let mut queue = batches.into_iter().enumerate();
        let mut total = 0usize;

        loop {
            let wave = queue.by_ref().take(parallelism).collect::<Vec<_>>();
            if wave.is_empty() {
                break;
            }

            let writes = wave.into_iter().map(|(idx, batch)| {
                let sink = Arc::clone(&self.sink);
                let timeout = self.cfg.batch_timeout;
                async move {
                    let size = batch.len();
                    let task = tokio::task::spawn_blocking(move || sink.write_batch(&batch));
                    let outcome = match tokio::time::timeout(timeout, task).await {
                        Ok(Ok(result)) => result,
                        Ok(Err(join_err)) => Err(LogVaultError::Internal(format!(
                            "batch write task failed: {join_err}"
                        ))),
                        Err(_) => Err(LogVaultError::Store(format!(
                            "batch write timed out after {timeout:?}"
                        ))),
                    };
                    (idx, size, outcome)
                }
            });

            for (idx, size, outcome) in join_all(writes).await {
                match outcome {
                    Ok(count) => total += count,
                    Err(e) => {
                        warn!(batch = idx, size, error = %e, "batch write failed, continuing");
                    }
                }
            }
        }

        Ok(total)
    }
}

/// The full write path: validate, partition, then coordinate the batch
/// writes. Rejects an empty entry list before any sink access.
pub async fn ingest_logs<S: BatchSink>(
    sink: Arc<S>,
    project_id: &str,
    entries: Vec<LogEntry>,
    batch_size: usize,
    cfg: CoordinatorConfig,
) -> Result<usize> {
    if entries.is_empty() {
        return Err(LogVaultError::Validation(
            "logs must be a non-empty list".to_string(),
        ));
    }

    let batches = partition(entries, project_id, batch_size);
    Coordinator::new(sink, cfg).ingest(batches).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use logvault_core::error::{LogVaultError, Result};
    use logvault_core::model::LogRecord;
    use logvault_core::query::LogQuery;
    use logvault_store::Store;

    use super::{BatchSink, Coordinator, CoordinatorConfig, ingest_logs};
    use crate::partition::partition;

    fn quick_cfg(parallelism: usize) -> CoordinatorConfig {
        CoordinatorConfig {
            parallelism,
            batch_timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn all_batches_succeeding_persist_everything() {
        let store = Arc::new(Store::open_in_memory().unwrap());
        let entries = testkit::sample_entries(12);
        let count = ingest_logs(Arc::clone(&store), "p1", entries, 5, quick_cfg(4))
            .await
            .unwrap();
        assert_eq!(count, 12);

        let res = store.query_logs(&LogQuery::for_project("p1")).unwrap();
        assert_eq!(res.total, 12);
    }

    #[tokio::test]
    async fn empty_input_is_rejected_before_any_write() {
        let store = Arc::new(Store::open_in_memory().unwrap());
        let err = ingest_logs(Arc::clone(&store), "p1", Vec::new(), 5, quick_cfg(4))
            .await
            .unwrap_err();
        assert!(matches!(err, LogVaultError::Validation(_)));
        assert_eq!(store.status().unwrap().logs_count, 0);
    }

    /// Fails any batch containing a record whose message is "poison".
    struct PoisonSink {
        inner: Arc<Store>,
    }

    impl BatchSink for PoisonSink {
        fn write_batch(&self, batch: &[LogRecord]) -> Result<usize> {
            if batch.iter().any(|r| r.message == "poison") {
                return Err(LogVaultError::Store("injected batch failure".into()));
            }
            self.inner.insert_logs(batch)
        }
    }

    #[tokio::test]
    async fn failed_batch_contributes_zero_and_siblings_proceed() {
        let store = Arc::new(Store::open_in_memory().unwrap());
        let sink = Arc::new(PoisonSink {
            inner: Arc::clone(&store),
        });

        // 12 entries, batch size 5 -> batches of 5, 5, 2; poison the middle one
        let mut entries = testkit::sample_entries(12);
        entries[7].message = "poison".into();

        let count = ingest_logs(sink, "p1", entries, 5, quick_cfg(2))
            .await
            .unwrap();
        assert_eq!(count, 7);
        assert_eq!(store.status().unwrap().logs_count, 7);
    }

    /// Reports a partial insert count without writing anything.
    struct PartialSink;

    impl BatchSink for PartialSink {
        fn write_batch(&self, batch: &[LogRecord]) -> Result<usize> {
            Ok(batch.len().saturating_sub(1))
        }
    }

    #[tokio::test]
    async fn partial_insert_counts_are_summed() {
        let batches = partition(testkit::sample_entries(10), "p1", 5);
        let count = Coordinator::new(Arc::new(PartialSink), quick_cfg(4))
            .ingest(batches)
            .await
            .unwrap();
        assert_eq!(count, 8);
    }

    /// Tracks the peak number of concurrent writes.
    struct ProbeSink {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl BatchSink for ProbeSink {
        fn write_batch(&self, batch: &[LogRecord]) -> Result<usize> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(25));
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(batch.len())
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn wave_ceiling_bounds_concurrent_writes() {
        let sink = Arc::new(ProbeSink {
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let batches = partition(testkit::sample_entries(40), "p1", 5);
        assert_eq!(batches.len(), 8);

        let count = Coordinator::new(Arc::clone(&sink), quick_cfg(2))
            .ingest(batches)
            .await
            .unwrap();
        assert_eq!(count, 40);
        assert!(sink.peak.load(Ordering::SeqCst) <= 2);
    }

    /// Hangs long enough to trip the per-batch timeout.
    struct StallSink {
        inner: Arc<Store>,
    }

    impl BatchSink for StallSink {
        fn write_batch(&self, batch: &[LogRecord]) -> Result<usize> {
            if batch.iter().any(|r| r.message == "stall") {
                std::thread::sleep(Duration::from_millis(500));
            }
            self.inner.insert_logs(batch)
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn timed_out_batch_is_treated_as_failed() {
        let store = Arc::new(Store::open_in_memory().unwrap());
        let sink = Arc::new(StallSink {
            inner: Arc::clone(&store),
        });

        let mut entries = testkit::sample_entries(6);
        entries[0].message = "stall".into();

        let cfg = CoordinatorConfig {
            parallelism: 2,
            batch_timeout: Duration::from_millis(50),
        };
        let count = ingest_logs(sink, "p1", entries, 3, cfg).await.unwrap();
        assert_eq!(count, 3);
    }
}
