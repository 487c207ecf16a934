// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use alloy_network::AnyNetwork;
use alloy_provider::{ProviderBuilder, RootProvider};
use alloy_rpc_client::ClientBuilder;
use tracing::{debug, info, warn};

use crate::config::{ChainDescriptor, SwapscanConfig};
use crate::errors::{ExtractionError, RpcError};
use crate::transport::{LoggingLayer, RateLimitLayer, RetryLayer};

/// Shared client for one chain
pub type ChainClient = Arc<RootProvider<AnyNetwork>>;

/// Lazily-built, process-wide cache of chain clients keyed by chain name.
///
/// Lookups are case-insensitive. The first configured RPC endpoint is always
/// used; there is no endpoint rotation.
///
/// The registry is read-mostly: after a chain's client exists, concurrent
/// workers only take the read lock.
#[derive(Debug)]
pub struct ChainClientRegistry {
    descriptors: HashMap<String, ChainDescriptor>,
    clients: RwLock<HashMap<String, ChainClient>>,
    config: SwapscanConfig,
}

impl ChainClientRegistry {
    /// Create a registry for the given chains. No client is built yet.
    #[must_use]
    pub fn new(chains: Vec<ChainDescriptor>, config: &SwapscanConfig) -> Self {
        let descriptors = chains
            .into_iter()
            .map(|descriptor| (descriptor.name.to_ascii_lowercase(), descriptor))
            .collect();

        Self {
            descriptors,
            clients: RwLock::new(HashMap::new()),
            config: config.clone(),
        }
    }

    /// Static description of a chain, if configured.
    pub fn descriptor(&self, chain: &str) -> Option<&ChainDescriptor> {
        self.descriptors.get(&chain.to_ascii_lowercase())
    }

    /// Per-call timeout for this chain's RPC requests.
    pub fn rpc_timeout(&self, chain: &str) -> Duration {
        self.config.get_rpc_timeout(chain)
    }

    /// Names of all configured chains.
    pub fn chains(&self) -> Vec<&str> {
        self.descriptors.values().map(|d| d.name.as_str()).collect()
    }

    /// Return the client for `chain`, building and caching it on first use.
    ///
    /// # Errors
    ///
    /// - [`ExtractionError::UnsupportedChain`] if the chain has no descriptor
    ///   or no RPC endpoint
    /// - [`ExtractionError::ProviderError`] if the first endpoint is not a valid URL
    pub fn get_client(&self, chain: &str) -> Result<ChainClient, ExtractionError> {
        let key = chain.to_ascii_lowercase();

        if let Some(client) = self
            .clients
            .read()
            .ok()
            .and_then(|clients| clients.get(&key).cloned())
        {
            return Ok(client);
        }

        let descriptor = self
            .descriptors
            .get(&key)
            .ok_or_else(|| ExtractionError::unsupported_chain(chain))?;
        let url = descriptor
            .rpc_urls
            .first()
            .ok_or_else(|| ExtractionError::unsupported_chain(chain))?;

        let client = Arc::new(create_chain_client(
            &descriptor.name,
            url,
            self.config.get_requests_per_second(&descriptor.name),
            self.config.max_retries,
        )?);

        let mut clients = self.clients.write().unwrap_or_else(|e| e.into_inner());
        // Another worker may have raced us here; keep whichever landed first.
        let cached = clients.entry(key).or_insert_with(|| {
            info!(chain = %descriptor.name, url = %url, "Created chain client");
            client
        });
        Ok(cached.clone())
    }

    /// Use an already-built client for `chain` instead of connecting to its
    /// configured endpoint. Replaces any client cached for that chain.
    pub fn insert_client(&self, chain: &str, client: RootProvider<AnyNetwork>) {
        let mut clients = self.clients.write().unwrap_or_else(|e| e.into_inner());
        clients.insert(chain.to_ascii_lowercase(), Arc::new(client));
    }

    /// Number of clients built so far.
    pub fn cached_clients(&self) -> usize {
        self.clients.read().map(|c| c.len()).unwrap_or(0)
    }
}

/// Build a bare `RootProvider` with logging, retry and optional rate limiting.
///
/// No fillers are installed; the registry's clients only read chain state.
fn create_chain_client(
    chain: &str,
    url: &str,
    requests_per_second: Option<u32>,
    max_retries: u32,
) -> Result<RootProvider<AnyNetwork>, RpcError> {
    let parsed_url: url::Url = url.parse().map_err(|e| {
        warn!(chain = chain, url = url, error = ?e, "Invalid provider URL");
        RpcError::ProviderUrlInvalid(url.to_string())
    })?;

    let client = match requests_per_second {
        Some(limit) => {
            debug!(chain = chain, requests_per_second = limit, "Rate limiting chain client");
            ClientBuilder::default()
                .layer(LoggingLayer::for_chain(chain))
                .layer(RetryLayer::with_max_retries(max_retries))
                .layer(RateLimitLayer::per_second(limit))
                .http(parsed_url)
        }
        None => ClientBuilder::default()
            .layer(LoggingLayer::for_chain(chain))
            .layer(RetryLayer::with_max_retries(max_retries))
            .http(parsed_url),
    };

    Ok(ProviderBuilder::new()
        .disable_recommended_fillers()
        .network::<AnyNetwork>()
        .connect_client(client))
}
