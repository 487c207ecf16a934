//! Replay of quarantined transactions
//!
//! Rows in `ingestion_errors` keep the feed item exactly as received. The
//! reprocess job feeds each one back through [`IngestionPipeline::ingest`]:
//! a success deletes the quarantine row, a failure bumps its retry counter
//! and records the latest error. Rows that reach the attempt ceiling are
//! left alone.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{info, warn, Instrument};

use crate::config::SwapscanConfig;
use crate::errors::{ExtractionError, StoreError};
use crate::feed::FeedTransfer;
use crate::ingest::IngestionPipeline;
use crate::store::{IngestionErrorRecord, SwapStore};
use crate::tracing::spans;

/// Counts for one reprocessing pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReprocessSummary {
    /// Quarantine rows read
    pub attempted: usize,
    /// Rows that ingested cleanly and were removed
    pub repaired: usize,
    /// Rows that failed again
    pub failed: usize,
}

/// Replays quarantined transactions through an [`IngestionPipeline`].
#[derive(Clone)]
pub struct ReprocessJob {
    pipeline: IngestionPipeline,
    store: Arc<dyn SwapStore>,
    max_attempts: i32,
    batch_size: i64,
    concurrency: usize,
}

impl std::fmt::Debug for ReprocessJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReprocessJob")
            .field("max_attempts", &self.max_attempts)
            .field("batch_size", &self.batch_size)
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}

impl ReprocessJob {
    /// Create a job using the attempt ceiling and batch size from `config`.
    pub fn new(
        pipeline: IngestionPipeline,
        store: Arc<dyn SwapStore>,
        config: &SwapscanConfig,
    ) -> Self {
        Self {
            pipeline,
            store,
            max_attempts: config.max_reprocess_attempts,
            batch_size: config.reprocess_batch_size,
            concurrency: config.worker_concurrency.max(1),
        }
    }

    /// Replay one batch of retryable rows, oldest first.
    ///
    /// # Errors
    ///
    /// Only the initial quarantine read is fatal; per-row failures are
    /// counted and written back.
    pub async fn run(&self) -> Result<ReprocessSummary, StoreError> {
        let span = spans::reprocess_errors(self.max_attempts);
        async move {
            let rows = self
                .store
                .retryable_errors(self.max_attempts, self.batch_size)
                .await?;
            tracing::Span::current().record("rows", rows.len());
            info!(rows = rows.len(), "Reprocessing quarantined transactions");

            let results: Vec<bool> = stream::iter(rows)
                .take_while(|_| futures::future::ready(!self.pipeline.is_cancelled()))
                .map(|row| self.replay(row))
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

            let repaired = results.iter().filter(|ok| **ok).count();
            let summary = ReprocessSummary {
                attempted: results.len(),
                repaired,
                failed: results.len() - repaired,
            };
            info!(
                attempted = summary.attempted,
                repaired = summary.repaired,
                failed = summary.failed,
                "Reprocessing complete"
            );
            Ok(summary)
        }
        .instrument(span)
        .await
    }

    async fn replay(&self, row: IngestionErrorRecord) -> bool {
        let outcome = match FeedTransfer::from_raw(row.raw_data.clone()) {
            Ok(transfer) => self.pipeline.ingest(&transfer).await.map(|_| ()),
            Err(err) => Err(ExtractionError::decode_failure(err.to_string())),
        };

        let write_back = match &outcome {
            Ok(()) => self.store.clear_error(&row.tx_hash, &row.source).await,
            Err(err) => {
                warn!(
                    tx_hash = %row.tx_hash,
                    attempt = row.retry_count + 1,
                    error_type = err.error_type(),
                    error = %err,
                    "Retry failed"
                );
                self.store
                    .mark_retry(&row.tx_hash, &row.source, err.error_type(), &err.to_string())
                    .await
            }
        };
        if let Err(store_err) = write_back {
            warn!(tx_hash = %row.tx_hash, error = %store_err, "Failed to update quarantine row");
        }

        outcome.is_ok()
    }
}
