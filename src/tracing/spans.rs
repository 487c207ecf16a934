//! Span creation helpers for swapscan operations.
//!
//! Telemetry is kept apart from business logic: instead of `#[instrument]`
//! attributes, each instrumented operation has a span helper here and the
//! operation attaches it with [`tracing::Instrument`].
//!
//! Usage pattern:
//! ```rust,ignore
//! pub async fn my_operation(&self, param: Type) -> Result<T> {
//!     let span = spans::my_operation(param_value);
//!     async move {
//!         // Business logic here
//!     }
//!     .instrument(span)
//!     .await
//! }
//! ```

use tracing::{Level, Span};

/// Create span for extracting the swap legs of one transaction.
///
/// Parent: ingest_batch or reprocess_errors span
/// Children: rpc_call spans from the chain client, resolve_internal_transfers
#[inline]
pub(crate) fn extract_swap(chain: &str, tx_hash: &str) -> Span {
    tracing::debug_span!("swapscan.extract_swap", chain = %chain, tx_hash = %tx_hash)
}

/// Create span for the two-tier internal transfer lookup.
///
/// Parent: extract_swap span
#[inline]
pub(crate) fn resolve_internal_transfers(chain: &str, tx_hash: &str) -> Span {
    tracing::debug_span!(
        "swapscan.resolve_internal_transfers",
        chain = %chain,
        tx_hash = %tx_hash,
        tier = tracing::field::Empty,
    )
}

/// Create span for one page of the inbound transfer feed.
///
/// Parent: ingest_batch span
#[inline]
pub(crate) fn fetch_feed_page(offset: usize, limit: usize) -> Span {
    tracing::debug_span!("swapscan.fetch_feed_page", offset = offset, limit = limit)
}

/// Create span for one ingestion run.
///
/// This is the root span of the `ingest` subcommand.
///
/// Parent: None (root span for this operation)
/// Children: fetch_feed_page spans, extract_swap spans (one per transaction)
#[inline]
pub(crate) fn ingest_batch(mode: &'static str) -> Span {
    tracing::span!(
        Level::INFO,
        "swapscan.ingest_batch",
        mode = mode,
        transfers = tracing::field::Empty,
    )
}

/// Create span for one quarantine reprocessing pass.
///
/// Parent: None (root span for this operation)
/// Children: extract_swap spans (one per quarantined transaction)
#[inline]
pub(crate) fn reprocess_errors(max_attempts: i32) -> Span {
    tracing::span!(
        Level::INFO,
        "swapscan.reprocess_errors",
        max_attempts = max_attempts,
        rows = tracing::field::Empty,
    )
}
