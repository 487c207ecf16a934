// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Internal transfer resolution
//!
//! Native value that moves between contracts inside a transaction emits no
//! log, so the receipt alone cannot show it. Two sources are consulted:
//!
//! 1. [`AssetTransfersClient`]: a bulk asset-transfer API scoped to the
//!    transaction's block. Fast, but only offered for some chains and only
//!    with an API key.
//! 2. [`ExplorerClient`]: the chain's block explorer `txlistinternal` endpoint.
//!
//! The first tier reports [`InternalTransferLookup::NotAttempted`] when it
//! cannot serve a chain; only then is the second tier asked. A
//! [`InternalTransferLookup::Found`] with an empty list is a real answer
//! ("no internal transfers") and ends the lookup.

mod asset_transfers;
mod explorer;

use std::sync::Arc;

use alloy_primitives::TxHash;
use async_trait::async_trait;
use tracing::{debug, Instrument};

use crate::tracing::spans;
use crate::types::swap::TransferCandidate;

pub use asset_transfers::{AssetTransfersClient, ALCHEMY_INTERNAL_CHAINS};
pub use explorer::ExplorerClient;

/// Outcome of asking one internal transfer source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalTransferLookup {
    /// The source cannot serve this chain (no key, unsupported chain); try the next one.
    NotAttempted,
    /// The source answered. An empty list means the transaction has no internal transfers.
    Found(Vec<TransferCandidate>),
}

impl InternalTransferLookup {
    /// Transfers found, treating `NotAttempted` as none.
    pub fn into_transfers(self) -> Vec<TransferCandidate> {
        match self {
            InternalTransferLookup::NotAttempted => Vec::new(),
            InternalTransferLookup::Found(transfers) => transfers,
        }
    }
}

/// A source of native transfers that happened inside a transaction.
///
/// Implementations degrade instead of failing: a source that was reachable
/// but errored returns `Found(vec![])`.
#[async_trait]
pub trait InternalTransferSource: Send + Sync {
    /// Look up the internal native transfers of `tx_hash` on `chain`.
    ///
    /// `block_hint` is the block the transaction was mined in, when the
    /// caller already knows it.
    async fn lookup(
        &self,
        chain: &str,
        tx_hash: TxHash,
        block_hint: Option<u64>,
    ) -> InternalTransferLookup;
}

/// Two-tier resolver: primary source, then fallback only on `NotAttempted`.
#[derive(Clone)]
pub struct InternalTransferResolver {
    primary: Arc<dyn InternalTransferSource>,
    fallback: Arc<dyn InternalTransferSource>,
}

impl std::fmt::Debug for InternalTransferResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InternalTransferResolver").finish_non_exhaustive()
    }
}

impl InternalTransferResolver {
    /// Create a resolver from a primary and a fallback source.
    pub fn new(
        primary: Arc<dyn InternalTransferSource>,
        fallback: Arc<dyn InternalTransferSource>,
    ) -> Self {
        Self { primary, fallback }
    }

    /// Internal native transfers of a transaction.
    ///
    /// Never fails; unavailable data resolves to an empty list.
    pub async fn get_internal_transfers(
        &self,
        chain: &str,
        tx_hash: TxHash,
        block_hint: Option<u64>,
    ) -> Vec<TransferCandidate> {
        let span = spans::resolve_internal_transfers(chain, &tx_hash.to_string());
        let record = span.clone();

        async move {
            match self.primary.lookup(chain, tx_hash, block_hint).await {
                InternalTransferLookup::Found(transfers) => {
                    record.record("tier", "primary");
                    debug!(count = transfers.len(), "Internal transfers from primary source");
                    transfers
                }
                InternalTransferLookup::NotAttempted => {
                    record.record("tier", "fallback");
                    let transfers = self
                        .fallback
                        .lookup(chain, tx_hash, block_hint)
                        .await
                        .into_transfers();
                    debug!(count = transfers.len(), "Internal transfers from fallback source");
                    transfers
                }
            }
        }
        .instrument(span)
        .await
    }
}
