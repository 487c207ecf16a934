// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Persistence
//!
//! [`SwapStore`] is the only interface the pipeline writes through. Every
//! method is a single statement; nothing spans more than one logical record,
//! so a failure never needs to roll back unrelated rows.
//!
//! - [`PgStore`]: PostgreSQL via `sqlx`
//! - [`MemoryStore`]: in-process, with failure injection for tests

mod memory;
mod postgres;
mod records;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::StoreError;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use records::{IngestedSwapRecord, IngestionErrorRecord, FEED_SOURCE, RPC_VOLUME_SOURCE};

/// Storage for swap records and the error quarantine.
#[async_trait]
pub trait SwapStore: Send + Sync {
    /// Insert or update a swap record keyed on `tx_hash`.
    async fn upsert_swap(&self, record: &IngestedSwapRecord) -> Result<(), StoreError>;

    /// Insert or update a quarantine row keyed on `(tx_hash, source)`.
    ///
    /// An existing row keeps its `retry_count`.
    async fn record_error(&self, record: &IngestionErrorRecord) -> Result<(), StoreError>;

    /// Quarantine rows below `max_attempts` retries, oldest first.
    async fn retryable_errors(
        &self,
        max_attempts: i32,
        limit: i64,
    ) -> Result<Vec<IngestionErrorRecord>, StoreError>;

    /// Count a failed retry: bump `retry_count`, set `last_retry_at`, keep the latest error.
    async fn mark_retry(
        &self,
        tx_hash: &str,
        source: &str,
        error_type: &str,
        error_message: &str,
    ) -> Result<(), StoreError>;

    /// Remove a quarantine row after a successful retry.
    async fn clear_error(&self, tx_hash: &str, source: &str) -> Result<(), StoreError>;

    /// Protocol label from the trusted 1inch API stream, if it has this transaction.
    async fn trusted_protocol_for(&self, tx_hash: &str) -> Result<Option<String>, StoreError>;

    /// Latest `timestamp` among feed-ingested rows.
    async fn latest_fee_timestamp(&self) -> Result<Option<DateTime<Utc>>, StoreError>;
}
