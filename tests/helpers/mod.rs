// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Test helpers for swapscan integration tests
//!
//! Provides fake implementations of the pipeline's seams so batches can run
//! without chain endpoints, HTTP APIs or a database.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy_primitives::{Address, LogData, TxHash, B256};
use alloy_rpc_types::Log;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use swapscan::config::default_chains;
use swapscan::errors::{ExtractionError, FeedError};
use swapscan::feed::{FeedTransfer, TransferSource};
use swapscan::internal::{InternalTransferLookup, InternalTransferSource};
use swapscan::{
    ChainClientRegistry, ExtractionMethod, SwapExtractionResult, SwapLeg, SwapLegSource,
    SwapscanConfig, TokenId, TransferCandidate,
};

/// 1inch Aggregation Router V5, the usual fee payer in fixtures
pub const ONEINCH_ROUTER: &str = "0x1111111254eeb25477b68fb85ed929f73a960582";

/// Deterministic transaction hash string for fixture `n`
pub fn tx_hash(n: u8) -> String {
    format!("{:#x}", B256::repeat_byte(n))
}

/// A raw feed item as the transfer API returns it
pub fn feed_item(hash: &str, chain: &str, fee_usd: &str, timestamp: &str) -> Value {
    json!({
        "transactionHash": hash,
        "fromAddress": {
            "address": ONEINCH_ROUTER,
            "arkhamEntity": { "id": "1inch", "name": "1inch" }
        },
        "toAddress": "0xa4a4f610e89488eb4ecc6c63069f241a54485269",
        "tokenSymbol": "USDC",
        "tokenAddress": "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
        "historicalUSD": fee_usd,
        "unitValue": fee_usd,
        "chain": chain,
        "blockTimestamp": timestamp,
        "blockNumber": 19_000_000
    })
}

/// [`feed_item`] normalized into a [`FeedTransfer`]
pub fn feed_transfer(hash: &str, chain: &str, fee_usd: &str, timestamp: &str) -> FeedTransfer {
    FeedTransfer::from_raw(feed_item(hash, chain, fee_usd, timestamp))
        .expect("fixture feed item must decode")
}

/// A USDC -> native swap result
pub fn usdc_to_native() -> SwapExtractionResult {
    SwapExtractionResult {
        token_in: SwapLeg {
            token: TokenId::Erc20(
                "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"
                    .parse()
                    .expect("valid address"),
            ),
            amount_raw: "1000000000".into(),
            decimals: 6,
            symbol: Some("USDC".into()),
        },
        token_out: Some(SwapLeg {
            token: TokenId::Native,
            amount_raw: "400000000000000000".into(),
            decimals: 18,
            symbol: Some("NATIVE".into()),
        }),
        method: ExtractionMethod::LogsAndTrace,
    }
}

enum Script {
    Legs(SwapExtractionResult),
    Timeout,
    Undecodable,
}

/// Scripted [`SwapLegSource`]
///
/// Chains are checked against a real [`ChainClientRegistry`] built from the
/// default chain list, so an unconfigured chain fails exactly as it would in
/// production. Unscripted transactions extract to `Ok(None)`.
pub struct ScriptedExtractor {
    registry: ChainClientRegistry,
    scripts: Mutex<HashMap<TxHash, Script>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl ScriptedExtractor {
    pub fn new() -> Self {
        Self {
            registry: ChainClientRegistry::new(default_chains(), &SwapscanConfig::minimal()),
            scripts: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    /// Sleep this long inside every extraction
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn script(self, hash: &str, script: Script) -> Self {
        let hash: TxHash = hash.parse().expect("fixture hash must parse");
        self.scripts.lock().unwrap().insert(hash, script);
        self
    }

    /// Return `result` for `hash`
    pub fn with_legs(self, hash: &str, result: SwapExtractionResult) -> Self {
        self.script(hash, Script::Legs(result))
    }

    /// Time out on `hash`
    pub fn with_timeout(self, hash: &str) -> Self {
        self.script(hash, Script::Timeout)
    }

    /// Fail to decode `hash`
    pub fn with_decode_failure(self, hash: &str) -> Self {
        self.script(hash, Script::Undecodable)
    }

    /// Number of `extract_swap` calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SwapLegSource for ScriptedExtractor {
    async fn extract_swap(
        &self,
        chain: &str,
        tx_hash: TxHash,
        _block_hint: Option<u64>,
    ) -> Result<Option<SwapExtractionResult>, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.registry.descriptor(chain).is_none() {
            return Err(ExtractionError::unsupported_chain(chain));
        }

        match self.scripts.lock().unwrap().get(&tx_hash) {
            None => Ok(None),
            Some(Script::Legs(result)) => Ok(Some(result.clone())),
            Some(Script::Timeout) => Err(ExtractionError::ProviderTimeout {
                operation: "eth_getTransactionReceipt".into(),
                timeout: Duration::from_secs(30),
            }),
            Some(Script::Undecodable) => Err(ExtractionError::decode_failure(
                "Transfer log has 2 topics, expected 3",
            )),
        }
    }
}

/// [`InternalTransferSource`] returning a fixed answer and counting calls
pub struct CountingSource {
    answer: Option<Vec<TransferCandidate>>,
    calls: AtomicUsize,
}

impl CountingSource {
    /// Always answers `NotAttempted`
    pub fn not_attempted() -> Arc<Self> {
        Arc::new(Self {
            answer: None,
            calls: AtomicUsize::new(0),
        })
    }

    /// Always answers `Found(transfers)`
    pub fn found(transfers: Vec<TransferCandidate>) -> Arc<Self> {
        Arc::new(Self {
            answer: Some(transfers),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InternalTransferSource for CountingSource {
    async fn lookup(
        &self,
        _chain: &str,
        _tx_hash: TxHash,
        _block_hint: Option<u64>,
    ) -> InternalTransferLookup {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.answer {
            None => InternalTransferLookup::NotAttempted,
            Some(transfers) => InternalTransferLookup::Found(transfers.clone()),
        }
    }
}

/// In-memory [`TransferSource`] that honors `since` and records each request
pub struct FixedFeed {
    transfers: Vec<FeedTransfer>,
    requests: Mutex<Vec<Option<DateTime<Utc>>>>,
    fail: bool,
}

impl FixedFeed {
    pub fn new(transfers: Vec<FeedTransfer>) -> Self {
        Self {
            transfers,
            requests: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// A feed whose every request fails with HTTP 503
    pub fn unavailable() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }

    /// The `since` argument of every request so far
    pub fn requests(&self) -> Vec<Option<DateTime<Utc>>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransferSource for FixedFeed {
    async fn fetch_transfers(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<FeedTransfer>, FeedError> {
        self.requests.lock().unwrap().push(since);
        if self.fail {
            return Err(FeedError::Status {
                offset: 0,
                status: 503,
            });
        }
        Ok(self
            .transfers
            .iter()
            .filter(|t| since.is_none_or(|since| t.timestamp > since))
            .cloned()
            .collect())
    }
}

/// Helper to create a minimal Log for testing
pub fn create_test_log(address: Address, topics: Vec<B256>, data: Vec<u8>) -> Log {
    Log {
        inner: alloy_primitives::Log {
            address,
            data: LogData::new(topics, data.into()).unwrap(),
        },
        block_hash: Some(B256::ZERO),
        block_number: Some(1000),
        block_timestamp: Some(1234567890),
        transaction_hash: Some(B256::ZERO),
        transaction_index: Some(0),
        log_index: Some(0),
        removed: false,
    }
}
