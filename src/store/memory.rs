// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{IngestedSwapRecord, IngestionErrorRecord, SwapStore, FEED_SOURCE};
use crate::errors::StoreError;

#[derive(Debug, Default)]
struct Tables {
    swaps: HashMap<String, IngestedSwapRecord>,
    // Insertion order stands in for created_at
    errors: Vec<IngestionErrorRecord>,
    trusted: HashMap<String, String>,
    failing_upserts: HashSet<String>,
}

/// In-process [`SwapStore`] with the same conflict semantics as [`PgStore`](super::PgStore).
///
/// Upserts for hashes registered with [`MemoryStore::fail_upserts_for`]
/// return a constraint violation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make every `upsert_swap` for `tx_hash` fail with a constraint violation.
    pub fn fail_upserts_for(&self, tx_hash: impl Into<String>) {
        self.tables().failing_upserts.insert(tx_hash.into());
    }

    /// Stop failing upserts for `tx_hash`.
    pub fn heal(&self, tx_hash: &str) {
        self.tables().failing_upserts.remove(tx_hash);
    }

    /// Seed the trusted 1inch stream with a transaction.
    pub fn insert_trusted(&self, tx_hash: &str, protocol: impl Into<String>) {
        self.tables()
            .trusted
            .insert(tx_hash.to_ascii_lowercase(), protocol.into());
    }

    /// Stored swap record for `tx_hash`.
    pub fn swap(&self, tx_hash: &str) -> Option<IngestedSwapRecord> {
        self.tables().swaps.get(tx_hash).cloned()
    }

    /// All stored swap records.
    pub fn swaps(&self) -> Vec<IngestedSwapRecord> {
        self.tables().swaps.values().cloned().collect()
    }

    /// All quarantine rows.
    pub fn errors(&self) -> Vec<IngestionErrorRecord> {
        self.tables().errors.clone()
    }
}

#[async_trait]
impl SwapStore for MemoryStore {
    async fn upsert_swap(&self, record: &IngestedSwapRecord) -> Result<(), StoreError> {
        let mut tables = self.tables();
        if tables.failing_upserts.contains(&record.tx_hash) {
            return Err(StoreError::constraint(format!(
                "dex_aggregator_revenue rejected {}",
                record.tx_hash
            )));
        }
        match tables.swaps.get_mut(&record.tx_hash) {
            Some(existing) => existing.merge(record.clone()),
            None => {
                tables.swaps.insert(record.tx_hash.clone(), record.clone());
            }
        }
        Ok(())
    }

    async fn record_error(&self, record: &IngestionErrorRecord) -> Result<(), StoreError> {
        let mut tables = self.tables();
        let existing = tables
            .errors
            .iter_mut()
            .find(|e| e.tx_hash == record.tx_hash && e.source == record.source);
        match existing {
            Some(existing) => {
                existing.error_type = record.error_type.clone();
                existing.error_message = record.error_message.clone();
                existing.raw_data = record.raw_data.clone();
            }
            None => tables.errors.push(IngestionErrorRecord {
                retry_count: 0,
                last_retry_at: None,
                ..record.clone()
            }),
        }
        Ok(())
    }

    async fn retryable_errors(
        &self,
        max_attempts: i32,
        limit: i64,
    ) -> Result<Vec<IngestionErrorRecord>, StoreError> {
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(self
            .tables()
            .errors
            .iter()
            .filter(|e| e.retry_count < max_attempts && e.source == FEED_SOURCE)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn mark_retry(
        &self,
        tx_hash: &str,
        source: &str,
        error_type: &str,
        error_message: &str,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables();
        if let Some(row) = tables
            .errors
            .iter_mut()
            .find(|e| e.tx_hash == tx_hash && e.source == source)
        {
            row.retry_count += 1;
            row.last_retry_at = Some(Utc::now());
            row.error_type = error_type.to_string();
            row.error_message = error_message.to_string();
        }
        Ok(())
    }

    async fn clear_error(&self, tx_hash: &str, source: &str) -> Result<(), StoreError> {
        self.tables()
            .errors
            .retain(|e| !(e.tx_hash == tx_hash && e.source == source));
        Ok(())
    }

    async fn trusted_protocol_for(&self, tx_hash: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .tables()
            .trusted
            .get(&tx_hash.to_ascii_lowercase())
            .cloned())
    }

    async fn latest_fee_timestamp(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(self
            .tables()
            .swaps
            .values()
            .filter(|s| s.fee_data_source == FEED_SOURCE)
            .map(|s| s.timestamp)
            .max())
    }
}
