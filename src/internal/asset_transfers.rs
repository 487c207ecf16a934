// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Tier 1: Alchemy `alchemy_getAssetTransfers`.
//!
//! The `internal` transfer category is only offered on Ethereum and Polygon
//! mainnet, so every other chain is reported as not attempted.

use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{trace, warn};

use super::{InternalTransferLookup, InternalTransferSource};
use crate::errors::RpcError;
use crate::types::swap::TransferCandidate;

/// Chains with `internal` category support, keyed by lowercase chain name,
/// mapped to the Alchemy network subdomain.
pub const ALCHEMY_INTERNAL_CHAINS: [(&str, &str); 2] =
    [("ethereum", "eth-mainnet"), ("polygon", "polygon-mainnet")];

/// Upper bound on transfers returned for a single block.
const MAX_COUNT: &str = "0x3e8";

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct AssetTransfersResult {
    #[serde(default)]
    transfers: Vec<AssetTransfer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssetTransfer {
    hash: String,
    from: Address,
    to: Option<Address>,
    category: String,
    raw_contract: RawContract,
}

#[derive(Debug, Deserialize)]
struct RawContract {
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionLocation {
    block_number: Option<String>,
}

/// Client for the asset-transfer API.
#[derive(Debug, Clone)]
pub struct AssetTransfersClient {
    http: reqwest::Client,
    api_key: Option<String>,
}

impl AssetTransfersClient {
    /// Create a client. Without an API key every lookup is `NotAttempted`.
    pub fn new(http: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            http,
            api_key: api_key.filter(|key| !key.is_empty()),
        }
    }

    /// Endpoint for `chain`, or `None` when the chain or the key is missing.
    fn endpoint(&self, chain: &str) -> Option<String> {
        let key = self.api_key.as_ref()?;
        let chain = chain.to_ascii_lowercase();
        ALCHEMY_INTERNAL_CHAINS
            .iter()
            .find(|(name, _)| *name == chain)
            .map(|(_, network)| format!("https://{network}.g.alchemy.com/v2/{key}"))
    }

    async fn call<T: DeserializeOwned>(
        &self,
        url: &str,
        method: &'static str,
        params: Value,
    ) -> Result<T, RpcError> {
        let body = json!({ "jsonrpc": "2.0", "id": 1, "method": method, "params": params });
        let response: JsonRpcResponse<T> = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| RpcError::chain_connection_failed(method, e))?
            .json()
            .await
            .map_err(|e| RpcError::chain_connection_failed(method, e))?;

        match (response.result, response.error) {
            (Some(result), _) => Ok(result),
            (None, error) => Err(RpcError::ChainConnectionFailed {
                operation: method.to_string(),
                source: error
                    .map_or_else(|| "empty result".to_string(), |e| e.to_string())
                    .into(),
            }),
        }
    }

    async fn block_of(&self, url: &str, tx_hash: TxHash) -> Result<u64, RpcError> {
        let location: TransactionLocation = self
            .call(url, "eth_getTransactionByHash", json!([tx_hash]))
            .await?;
        location
            .block_number
            .as_deref()
            .and_then(|hex| u64::from_str_radix(hex.trim_start_matches("0x"), 16).ok())
            .ok_or_else(|| RpcError::TransactionNotFound {
                tx_hash: tx_hash.to_string(),
            })
    }

    async fn fetch(
        &self,
        url: &str,
        tx_hash: TxHash,
        block_hint: Option<u64>,
    ) -> Result<Vec<TransferCandidate>, RpcError> {
        let block = match block_hint {
            Some(block) => block,
            None => self.block_of(url, tx_hash).await?,
        };
        let params = json!([{
            "fromBlock": format!("{block:#x}"),
            "toBlock": format!("{block:#x}"),
            "category": ["internal"],
            "excludeZeroValue": true,
            "withMetadata": false,
            "maxCount": MAX_COUNT,
        }]);
        let result: AssetTransfersResult =
            self.call(url, "alchemy_getAssetTransfers", params).await?;
        trace!(block, total = result.transfers.len(), "Asset transfers in block");
        Ok(select_internal(result.transfers, tx_hash))
    }
}

/// Keep the non-zero internal transfers of one transaction.
fn select_internal(transfers: Vec<AssetTransfer>, tx_hash: TxHash) -> Vec<TransferCandidate> {
    transfers
        .into_iter()
        .filter(|t| t.category == "internal")
        .filter(|t| t.hash.parse::<TxHash>().is_ok_and(|hash| hash == tx_hash))
        .filter_map(|t| {
            let amount = t.raw_contract.value.as_deref()?.parse::<U256>().ok()?;
            let to = t.to?;
            (!amount.is_zero()).then(|| TransferCandidate::native(t.from, to, amount))
        })
        .collect()
}

#[async_trait]
impl InternalTransferSource for AssetTransfersClient {
    async fn lookup(
        &self,
        chain: &str,
        tx_hash: TxHash,
        block_hint: Option<u64>,
    ) -> InternalTransferLookup {
        let Some(url) = self.endpoint(chain) else {
            return InternalTransferLookup::NotAttempted;
        };

        match self.fetch(&url, tx_hash, block_hint).await {
            Ok(transfers) => InternalTransferLookup::Found(transfers),
            Err(error) => {
                warn!(chain, tx_hash = %tx_hash, error = %error, "Asset transfer lookup failed");
                InternalTransferLookup::Found(Vec::new())
            }
        }
    }
}
