//! Tier 2: block explorer `txlistinternal`.

use std::collections::HashMap;

use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{InternalTransferLookup, InternalTransferSource};
use crate::config::{ChainDescriptor, ExplorerApiVersion, ExplorerConfig};
use crate::types::swap::TransferCandidate;

#[derive(Debug, Deserialize)]
struct ExplorerResponse {
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InternalTx {
    from: String,
    // Empty for contract creations
    #[serde(default)]
    to: String,
    value: String,
    #[serde(default)]
    is_error: String,
}

/// Explorer client for every chain with a configured explorer.
#[derive(Debug, Clone)]
pub struct ExplorerClient {
    http: reqwest::Client,
    explorers: HashMap<String, ExplorerConfig>,
}

impl ExplorerClient {
    /// Use the first explorer of each descriptor; chains without one are skipped.
    pub fn new(http: reqwest::Client, chains: &[ChainDescriptor]) -> Self {
        let explorers = chains
            .iter()
            .filter_map(|chain| {
                let explorer = chain.explorers.first()?;
                Some((chain.name.to_ascii_lowercase(), explorer.clone()))
            })
            .collect();
        Self { http, explorers }
    }

    async fn fetch(
        &self,
        explorer: &ExplorerConfig,
        tx_hash: TxHash,
    ) -> Result<Vec<TransferCandidate>, reqwest::Error> {
        let response: ExplorerResponse = self
            .http
            .get(&explorer.base_url)
            .query(&query_params(explorer, tx_hash))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !response.result.is_array() {
            // Rate limits and bad keys come back as status "0" with a string result
            debug!(message = %response.message, result = %response.result, "Explorer returned no list");
            return Ok(Vec::new());
        }
        Ok(select_internal(response.result))
    }
}

/// Query string for `txlistinternal` in the explorer's request shape.
fn query_params(explorer: &ExplorerConfig, tx_hash: TxHash) -> Vec<(&'static str, String)> {
    let mut params = Vec::with_capacity(5);
    if let ExplorerApiVersion::V2 { chain_id } = explorer.version {
        params.push(("chainid", chain_id.to_string()));
    }
    params.extend([
        ("module", "account".to_string()),
        ("action", "txlistinternal".to_string()),
        ("txhash", tx_hash.to_string()),
        ("apikey", explorer.api_key.clone()),
    ]);
    params
}

/// Successful, non-zero internal transfers from a `result` array.
fn select_internal(result: Value) -> Vec<TransferCandidate> {
    let Ok(entries) = serde_json::from_value::<Vec<InternalTx>>(result) else {
        return Vec::new();
    };
    entries
        .into_iter()
        .filter(|tx| tx.is_error != "1")
        .filter_map(|tx| {
            let amount = U256::from_str_radix(&tx.value, 10).ok()?;
            let from = tx.from.parse::<Address>().ok()?;
            let to = tx.to.parse::<Address>().ok()?;
            (!amount.is_zero()).then(|| TransferCandidate::native(from, to, amount))
        })
        .collect()
}

#[async_trait]
impl InternalTransferSource for ExplorerClient {
    async fn lookup(
        &self,
        chain: &str,
        tx_hash: TxHash,
        _block_hint: Option<u64>,
    ) -> InternalTransferLookup {
        let Some(explorer) = self.explorers.get(&chain.to_ascii_lowercase()) else {
            debug!(chain, "No explorer configured");
            return InternalTransferLookup::NotAttempted;
        };

        match self.fetch(explorer, tx_hash).await {
            Ok(transfers) => InternalTransferLookup::Found(transfers),
            Err(error) => {
                warn!(chain, tx_hash = %tx_hash, error = %error, "Explorer lookup failed");
                InternalTransferLookup::Found(Vec::new())
            }
        }
    }
}
