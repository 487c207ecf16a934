// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use alloy_consensus::Transaction as TransactionTrait;
use alloy_network::TransactionResponse;
use alloy_primitives::{Address, TxHash, U256};
use alloy_provider::Provider;
use alloy_transport::TransportResult;
use async_trait::async_trait;
use tracing::{debug, warn, Instrument};

use super::calldata::decode_calldata;
use super::logs::transfers_from_logs;
use super::selection::{select_legs, ChosenLeg, InLegSource};
use crate::errors::{ExtractionError, RpcError};
use crate::internal::InternalTransferResolver;
use crate::provider::{ChainClient, ChainClientRegistry};
use crate::tokens::TokenMetadataResolver;
use crate::tracing::spans;
use crate::types::amount::scale_raw_amount;
use crate::types::swap::{ExtractionMethod, SwapExtractionResult, SwapLeg, TransferCandidate};

/// Anything that can turn a transaction into swap legs.
///
/// The ingestion pipeline depends on this trait rather than on
/// [`SwapExtractor`], so tests can substitute scripted results.
#[async_trait]
pub trait SwapLegSource: Send + Sync {
    /// Extract the legs of `tx_hash` on `chain`.
    ///
    /// `Ok(None)` means the transaction carries no identifiable input from
    /// its sender; it is not an error.
    async fn extract_swap(
        &self,
        chain: &str,
        tx_hash: TxHash,
        block_hint: Option<u64>,
    ) -> Result<Option<SwapExtractionResult>, ExtractionError>;
}

/// Legs chosen before metadata resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionPlan {
    /// In-leg token and amount
    pub token_in: ChosenLeg,
    /// Out-leg token and amount, if identified
    pub token_out: Option<ChosenLeg>,
    /// Path that produced the plan
    pub method: ExtractionMethod,
}

/// Choose legs for a transaction, in decreasing order of confidence:
///
/// 1. transfers with both an in-leg and an out-leg (`logs+trace`)
/// 2. router calldata (`decoded-calldata`)
/// 3. whatever in-leg the transfers gave, with no out-leg
///    (`native-value` when it is the top-level value, else `logs+trace`)
pub fn plan_extraction(
    sender: Address,
    value: U256,
    input: &[u8],
    transfers: &[TransferCandidate],
    fee_collector: Address,
) -> Option<ExtractionPlan> {
    let selection = select_legs(sender, value, transfers, fee_collector);

    if let Some(selection) = selection {
        if let Some(token_out) = selection.token_out {
            return Some(ExtractionPlan {
                token_in: selection.token_in,
                token_out: Some(token_out),
                method: ExtractionMethod::LogsAndTrace,
            });
        }
    }

    if let Some(decoded) = decode_calldata(input, value) {
        debug!(matcher = decoded.matcher, "Legs decoded from calldata");
        return Some(ExtractionPlan {
            token_in: ChosenLeg {
                token: decoded.token_in,
                amount: decoded.amount_in,
            },
            token_out: decoded
                .token_out
                .map(|(token, amount)| ChosenLeg { token, amount }),
            method: ExtractionMethod::DecodedCalldata,
        });
    }

    selection.map(|selection| ExtractionPlan {
        token_in: selection.token_in,
        token_out: None,
        method: match selection.in_source {
            InLegSource::TopLevelValue => ExtractionMethod::NativeValue,
            InLegSource::Transfer => ExtractionMethod::LogsAndTrace,
        },
    })
}

/// Network-backed extractor.
///
/// Per transaction it issues three concurrent lookups (transaction, receipt,
/// internal transfers), each bounded by the chain's RPC timeout, then
/// resolves token metadata for the chosen legs.
#[derive(Debug, Clone)]
pub struct SwapExtractor {
    registry: Arc<ChainClientRegistry>,
    internal: InternalTransferResolver,
    tokens: Arc<TokenMetadataResolver>,
    fee_collector: Address,
}

impl SwapExtractor {
    /// Create an extractor.
    pub fn new(
        registry: Arc<ChainClientRegistry>,
        internal: InternalTransferResolver,
        tokens: Arc<TokenMetadataResolver>,
        fee_collector: Address,
    ) -> Self {
        Self {
            registry,
            internal,
            tokens,
            fee_collector,
        }
    }

    async fn extract(
        &self,
        chain: &str,
        tx_hash: TxHash,
        block_hint: Option<u64>,
    ) -> Result<Option<SwapExtractionResult>, ExtractionError> {
        let client = self.registry.get_client(chain)?;
        let timeout = self.registry.rpc_timeout(chain);

        let (transaction, receipt, internal) = tokio::join!(
            bounded(
                timeout,
                "eth_getTransactionByHash",
                client.get_transaction_by_hash(tx_hash)
            ),
            bounded(
                timeout,
                "eth_getTransactionReceipt",
                client.get_transaction_receipt(tx_hash)
            ),
            tokio::time::timeout(
                timeout,
                self.internal.get_internal_transfers(chain, tx_hash, block_hint)
            ),
        );

        let transaction = transaction?.ok_or_else(|| RpcError::TransactionNotFound {
            tx_hash: tx_hash.to_string(),
        })?;
        let receipt = receipt?.ok_or_else(|| RpcError::ReceiptNotFound {
            tx_hash: tx_hash.to_string(),
        })?;
        let internal = internal.unwrap_or_else(|_| {
            warn!(chain, tx_hash = %tx_hash, "Internal transfer lookup timed out");
            Vec::new()
        });

        let mut transfers = transfers_from_logs(receipt.inner.inner.logs())?;
        transfers.extend(internal);

        let tx = &transaction.inner;
        let sender = TransactionResponse::from(tx);
        let Some(plan) = plan_extraction(
            sender,
            TransactionTrait::value(tx),
            TransactionTrait::input(tx),
            &transfers,
            self.fee_collector,
        ) else {
            debug!(sender = %sender, transfers = transfers.len(), "No input leg found");
            return Ok(None);
        };

        let token_in = self.leg(&client, chain, plan.token_in).await;
        let token_out = match plan.token_out {
            Some(leg) => Some(self.leg(&client, chain, leg).await),
            None => None,
        };

        debug!(
            method = %plan.method,
            token_in = %token_in.token,
            has_out = token_out.is_some(),
            "Extracted swap"
        );
        Ok(Some(SwapExtractionResult {
            token_in,
            token_out,
            method: plan.method,
        }))
    }

    async fn leg(&self, client: &ChainClient, chain: &str, chosen: ChosenLeg) -> SwapLeg {
        let metadata = self.tokens.resolve(client.as_ref(), chain, chosen.token).await;
        SwapLeg {
            token: chosen.token,
            amount_raw: chosen.amount.to_string(),
            decimals: metadata.decimals,
            symbol: metadata.symbol,
        }
    }
}

#[async_trait]
impl SwapLegSource for SwapExtractor {
    async fn extract_swap(
        &self,
        chain: &str,
        tx_hash: TxHash,
        block_hint: Option<u64>,
    ) -> Result<Option<SwapExtractionResult>, ExtractionError> {
        let span = spans::extract_swap(chain, &tx_hash.to_string());
        self.extract(chain, tx_hash, block_hint)
            .instrument(span)
            .await
    }
}

/// Await an RPC call under `timeout`, classifying both failure modes.
async fn bounded<F, T>(
    timeout: Duration,
    operation: &'static str,
    call: F,
) -> Result<T, RpcError>
where
    F: IntoFuture<Output = TransportResult<T>>,
{
    tokio::time::timeout(timeout, call)
        .await
        .map_err(|_| RpcError::timeout(operation, timeout))?
        .map_err(|e| RpcError::chain_connection_failed(operation, e))
}

/// Human-readable in/out amounts of a result, for the decimal columns.
pub fn scaled_amounts(
    result: &SwapExtractionResult,
) -> (Option<bigdecimal::BigDecimal>, Option<bigdecimal::BigDecimal>) {
    let scale = |leg: &SwapLeg| {
        leg.amount()
            .and_then(|raw| scale_raw_amount(raw, leg.decimals))
    };
    (
        scale(&result.token_in),
        result.token_out.as_ref().and_then(scale),
    )
}
