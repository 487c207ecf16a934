// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use alloy_network::{AnyNetwork, Network, TransactionBuilder};
use alloy_primitives::{Address, Bytes};
use alloy_provider::Provider;
use alloy_sol_types::{sol, SolCall};
use tracing::{debug, trace};

use crate::config::constants::{tokens, NATIVE_SYMBOL};
use crate::errors::RpcError;
use crate::types::swap::TokenId;

/// Decimals assumed when a token does not answer `decimals()`.
pub const DEFAULT_DECIMALS: u8 = 18;

sol! {
    function decimals() external view returns (uint8);
    function symbol() external view returns (string);
}

mod legacy {
    alloy_sol_types::sol! {
        /// Pre-standard tokens (MKR, SAI) return the symbol as `bytes32`.
        function symbol() external view returns (bytes32);
    }
}

/// Resolved metadata for one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadata {
    /// Token decimals
    pub decimals: u8,
    /// Token symbol, if readable
    pub symbol: Option<String>,
}

/// Reads `decimals()`/`symbol()` with per-call timeouts and caches answers.
///
/// Only successful reads are cached, so a token that timed out is asked again
/// on its next appearance.
#[derive(Debug)]
pub struct TokenMetadataResolver {
    timeout: Duration,
    decimals: RwLock<HashMap<(String, Address), u8>>,
    symbols: RwLock<HashMap<(String, Address), String>>,
}

impl TokenMetadataResolver {
    /// Create a resolver whose `eth_call`s give up after `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            decimals: RwLock::new(HashMap::new()),
            symbols: RwLock::new(HashMap::new()),
        }
    }

    /// Token decimals; 18 for the native asset and on any failure.
    pub async fn get_decimals<P>(&self, client: &P, chain: &str, token: TokenId) -> u8
    where
        P: Provider<AnyNetwork>,
    {
        let address = match token {
            TokenId::Native => return DEFAULT_DECIMALS,
            TokenId::Erc20(address) => address,
        };
        if let Some((decimals, _)) = tokens::lookup(address) {
            return decimals;
        }

        let key = (chain.to_ascii_lowercase(), address);
        if let Some(decimals) = self.decimals.read().ok().and_then(|c| c.get(&key).copied()) {
            return decimals;
        }

        let result = self
            .eth_call(client, address, decimalsCall {}.abi_encode())
            .await
            .and_then(|output| {
                decimalsCall::abi_decode_returns(&output).map_err(|_| RpcError::CallDecodeFailed {
                    call: decimalsCall::SIGNATURE,
                    contract: address.to_string(),
                })
            });

        match result {
            Ok(decimals) => {
                if let Ok(mut cache) = self.decimals.write() {
                    cache.insert(key, decimals);
                }
                decimals
            }
            Err(error) => {
                debug!(chain, token = %address, error = %error, "decimals() failed, assuming 18");
                DEFAULT_DECIMALS
            }
        }
    }

    /// Token symbol; `"NATIVE"` for the native asset, `None` on any failure.
    pub async fn get_symbol<P>(&self, client: &P, chain: &str, token: TokenId) -> Option<String>
    where
        P: Provider<AnyNetwork>,
    {
        let address = match token {
            TokenId::Native => return Some(NATIVE_SYMBOL.to_string()),
            TokenId::Erc20(address) => address,
        };
        if let Some((_, symbol)) = tokens::lookup(address) {
            return Some(symbol.to_string());
        }

        let key = (chain.to_ascii_lowercase(), address);
        if let Some(symbol) = self.symbols.read().ok().and_then(|c| c.get(&key).cloned()) {
            return Some(symbol);
        }

        let symbol = match self.eth_call(client, address, symbolCall {}.abi_encode()).await {
            Ok(output) => decode_symbol(&output),
            Err(error) => {
                debug!(chain, token = %address, error = %error, "symbol() failed");
                None
            }
        }?;

        if let Ok(mut cache) = self.symbols.write() {
            cache.insert(key, symbol.clone());
        }
        Some(symbol)
    }

    /// Both decimals and symbol, fetched concurrently.
    pub async fn resolve<P>(&self, client: &P, chain: &str, token: TokenId) -> TokenMetadata
    where
        P: Provider<AnyNetwork>,
    {
        let (decimals, symbol) = tokio::join!(
            self.get_decimals(client, chain, token),
            self.get_symbol(client, chain, token)
        );
        TokenMetadata { decimals, symbol }
    }

    async fn eth_call<P>(&self, client: &P, to: Address, input: Vec<u8>) -> Result<Bytes, RpcError>
    where
        P: Provider<AnyNetwork>,
    {
        let request = <AnyNetwork as Network>::TransactionRequest::default()
            .with_to(to)
            .with_input(input);

        let output = tokio::time::timeout(self.timeout, client.call(request))
            .await
            .map_err(|_| RpcError::timeout(format!("eth_call({to})"), self.timeout))?
            .map_err(|e| RpcError::chain_connection_failed(format!("eth_call({to})"), e))?;

        trace!(contract = %to, output = %output, "eth_call returned");
        Ok(output)
    }
}

/// Decode `symbol()` return data as `string`, falling back to `bytes32`.
///
/// Empty and non-UTF-8 symbols resolve to `None`.
pub fn decode_symbol(output: &[u8]) -> Option<String> {
    let symbol = match symbolCall::abi_decode_returns(output) {
        Ok(symbol) => symbol,
        Err(_) => {
            let raw = legacy::symbolCall::abi_decode_returns(output).ok()?;
            let trimmed: Vec<u8> = raw
                .iter()
                .copied()
                .take_while(|byte| *byte != 0)
                .collect();
            String::from_utf8(trimmed).ok()?
        }
    };

    let symbol = symbol.trim().to_string();
    (!symbol.is_empty()).then_some(symbol)
}
