// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Batch ingestion of feed transfers
//!
//! Each transfer goes through attribution, extraction and one upsert. A
//! failure in any of those steps is contained to its transaction: the
//! transfer is written to the quarantine table with its classified error
//! type and the batch moves on.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use alloy_primitives::TxHash;
use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, warn, Instrument};

use crate::config::{ChainDescriptor, SwapscanConfig};
use crate::errors::{ExtractionError, SwapscanError};
use crate::extract::SwapLegSource;
use crate::feed::{FeedTransfer, TransferSource};
use crate::protocol::ProtocolIdentifier;
use crate::store::{IngestedSwapRecord, IngestionErrorRecord, SwapStore};
use crate::tracing::spans;

use super::record::build_record;

/// Counts for one ingestion or reprocessing batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Transfers handed to the batch
    pub fetched: usize,
    /// Swap rows written
    pub stored: usize,
    /// Of those, rows that carry an extracted in-leg
    pub with_legs: usize,
    /// Transfers written to the quarantine table
    pub quarantined: usize,
    /// Transfers whose quarantine write also failed
    pub lost: usize,
    /// Transfers never started because the run was cancelled
    pub skipped: usize,
}

enum Outcome {
    Stored { with_legs: bool },
    Quarantined,
    Lost,
}

/// Drives transfers from a [`TransferSource`] into a [`SwapStore`].
#[derive(Clone)]
pub struct IngestionPipeline {
    source: Arc<dyn TransferSource>,
    extractor: Arc<dyn SwapLegSource>,
    store: Arc<dyn SwapStore>,
    identifier: ProtocolIdentifier,
    native_symbols: HashMap<String, String>,
    worker_concurrency: usize,
    fee_rate_bps: u32,
    cancelled: Arc<AtomicBool>,
}

impl std::fmt::Debug for IngestionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestionPipeline")
            .field("worker_concurrency", &self.worker_concurrency)
            .field("fee_rate_bps", &self.fee_rate_bps)
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl IngestionPipeline {
    /// Create a pipeline. `chains` supplies the native-asset symbol per chain.
    pub fn new(
        source: Arc<dyn TransferSource>,
        extractor: Arc<dyn SwapLegSource>,
        store: Arc<dyn SwapStore>,
        chains: &[ChainDescriptor],
        config: &SwapscanConfig,
    ) -> Self {
        let native_symbols = chains
            .iter()
            .map(|c| (c.name.to_ascii_lowercase(), c.native_symbol.clone()))
            .collect();

        Self {
            source,
            extractor,
            store,
            identifier: ProtocolIdentifier::new(),
            native_symbols,
            worker_concurrency: config.worker_concurrency.max(1),
            fee_rate_bps: config.fee_rate_bps,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that stops the pipeline from starting new transactions.
    ///
    /// Transactions already in flight finish and are persisted.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// True once the cancel flag has been raised.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Ingest transfers newer than the latest stored fee timestamp.
    ///
    /// # Errors
    ///
    /// Feed failures and the initial timestamp lookup abort the run.
    pub async fn run_incremental(&self) -> Result<IngestSummary, SwapscanError> {
        let span = spans::ingest_batch("incremental");
        async move {
            let since = self.store.latest_fee_timestamp().await?;
            info!(since = ?since, "Starting incremental ingestion");
            let transfers = self.source.fetch_transfers(since).await?;
            Ok(self.process_batch(transfers).await)
        }
        .instrument(span)
        .await
    }

    /// Ingest every transfer the feed returns.
    ///
    /// # Errors
    ///
    /// Feed failures abort the run.
    pub async fn run_full(&self) -> Result<IngestSummary, SwapscanError> {
        let span = spans::ingest_batch("full");
        async move {
            info!("Starting full ingestion");
            let transfers = self.source.fetch_transfers(None).await?;
            Ok(self.process_batch(transfers).await)
        }
        .instrument(span)
        .await
    }

    /// Process a batch with at most `worker_concurrency` transactions in flight.
    pub async fn process_batch(&self, transfers: Vec<FeedTransfer>) -> IngestSummary {
        let fetched = transfers.len();
        tracing::Span::current().record("transfers", fetched);

        let outcomes: Vec<Outcome> = stream::iter(transfers)
            .take_while(|_| futures::future::ready(!self.is_cancelled()))
            .map(|transfer| self.process_transfer(transfer))
            .buffer_unordered(self.worker_concurrency)
            .collect()
            .await;

        let mut summary = IngestSummary {
            fetched,
            skipped: fetched - outcomes.len(),
            ..IngestSummary::default()
        };
        for outcome in outcomes {
            match outcome {
                Outcome::Stored { with_legs } => {
                    summary.stored += 1;
                    if with_legs {
                        summary.with_legs += 1;
                    }
                }
                Outcome::Quarantined => summary.quarantined += 1,
                Outcome::Lost => summary.lost += 1,
            }
        }

        if summary.skipped > 0 {
            warn!(skipped = summary.skipped, "Batch cancelled before completion");
        }
        info!(
            fetched = summary.fetched,
            stored = summary.stored,
            with_legs = summary.with_legs,
            quarantined = summary.quarantined,
            lost = summary.lost,
            "Batch complete"
        );
        summary
    }

    async fn process_transfer(&self, transfer: FeedTransfer) -> Outcome {
        match self.ingest(&transfer).await {
            Ok(record) => Outcome::Stored {
                with_legs: record.token_in_address.is_some(),
            },
            Err(err) => {
                warn!(
                    tx_hash = %transfer.tx_hash,
                    chain = %transfer.chain,
                    error_type = err.error_type(),
                    error = %err,
                    "Transaction quarantined"
                );
                let quarantine = IngestionErrorRecord::new(
                    transfer.tx_hash.clone(),
                    err.error_type(),
                    err.to_string(),
                    transfer.raw,
                );
                match self.store.record_error(&quarantine).await {
                    Ok(()) => Outcome::Quarantined,
                    Err(store_err) => {
                        error!(
                            tx_hash = %quarantine.tx_hash,
                            error = %store_err,
                            "Failed to write quarantine row"
                        );
                        Outcome::Lost
                    }
                }
            }
        }
    }

    /// Attribute, extract and persist one transfer.
    ///
    /// No quarantine row is written here; callers decide what a failure means.
    pub async fn ingest(
        &self,
        transfer: &FeedTransfer,
    ) -> Result<IngestedSwapRecord, ExtractionError> {
        let tx_hash: TxHash = transfer.tx_hash.parse().map_err(|_| {
            ExtractionError::decode_failure(format!("invalid transaction hash {}", transfer.tx_hash))
        })?;

        let protocol = self.identifier.identify(transfer, self.store.as_ref()).await;
        let extraction = self
            .extractor
            .extract_swap(&transfer.chain, tx_hash, transfer.block_number)
            .await?;

        let record = build_record(
            transfer,
            protocol,
            extraction.as_ref(),
            self.native_symbols
                .get(&transfer.chain.to_ascii_lowercase())
                .map(String::as_str),
            self.fee_rate_bps,
        );
        self.store.upsert_swap(&record).await?;

        debug!(
            tx_hash = %record.tx_hash,
            protocol = %record.protocol,
            method = ?record.extraction_method,
            "Swap record stored"
        );
        Ok(record)
    }
}
