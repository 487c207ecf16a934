//! Configuration for swapscan operations
//!
//! This module provides the configuration for RPC behavior, HTTP timeouts,
//! worker concurrency, feed pagination and the reprocessing job.
//!
//! # Example: Using defaults
//!
//! ```rust
//! use swapscan::SwapscanConfig;
//!
//! let config = SwapscanConfig::default();
//! assert_eq!(config.max_retries, 5);
//! ```
//!
//! # Example: Custom configuration
//!
//! ```rust
//! use swapscan::SwapscanConfigBuilder;
//! use std::time::Duration;
//!
//! let config = SwapscanConfigBuilder::with_defaults()
//!     .worker_concurrency(16)
//!     .chain_requests_per_second("Polygon", 5)
//!     .chain_timeout("BSC", Duration::from_secs(60))
//!     .build();
//! ```

use std::collections::HashMap;
use std::time::Duration;

use alloy_primitives::Address;

use crate::errors::ConfigError;

mod chains;
pub mod constants;

pub use chains::{
    chains_from_lookup, default_chains, ChainDescriptor, ExplorerApiVersion, ExplorerConfig,
    ETHERSCAN_V2_URL,
};

/// Default transfer feed host.
pub const DEFAULT_FEED_BASE_URL: &str = "https://api.arkhamintelligence.com";

/// Configuration for swapscan operations
///
/// Use [`SwapscanConfigBuilder`] for a fluent API to construct instances.
#[derive(Debug, Clone)]
pub struct SwapscanConfig {
    /// Timeout for each JSON-RPC call
    /// Default: 30 seconds
    pub rpc_timeout: Duration,

    /// Timeout for feed, explorer and asset-transfer HTTP requests
    /// Default: 30 seconds
    pub http_timeout: Duration,

    /// Requests per second allowed against each RPC endpoint
    /// Default: None (no client-side limit)
    pub requests_per_second: Option<u32>,

    /// Retries for transient RPC transport failures
    /// Default: 5
    pub max_retries: u32,

    /// Transactions processed concurrently within a batch
    /// Default: 8
    pub worker_concurrency: usize,

    /// Page size requested from the transfer feed
    /// Default: 1000
    pub feed_page_size: usize,

    /// Fixed pause between feed pages
    /// Default: 100ms
    pub feed_page_delay: Duration,

    /// Quarantined transactions are replayed while `retry_count` is below this
    /// Default: 10
    pub max_reprocess_attempts: i32,

    /// Quarantine rows replayed per reprocessing run
    /// Default: 1000
    pub reprocess_batch_size: i64,

    /// Address excluded from out-leg candidates
    /// Default: [`constants::INTEGRATOR_ADDRESS`]
    pub fee_collector: Address,

    /// Integrator fee in basis points, used to derive swap volume from the fee
    /// Default: 50 (0.5%)
    pub fee_rate_bps: u32,

    /// Chain-specific overrides, keyed by lowercase chain name
    pub chain_overrides: HashMap<String, ChainConfig>,
}

/// Chain-specific configuration overrides
#[derive(Debug, Clone, Default)]
pub struct ChainConfig {
    /// Override requests per second for this chain
    pub requests_per_second: Option<u32>,

    /// Override RPC timeout for this chain
    pub rpc_timeout: Option<Duration>,
}

impl Default for SwapscanConfig {
    fn default() -> Self {
        Self::with_common_defaults()
    }
}

impl SwapscanConfig {
    /// Create config with defaults suited to the public RPC endpoints
    ///
    /// Base and BSC public endpoints throttle aggressively, so they get a
    /// client-side limit of 4 requests per second.
    pub fn with_common_defaults() -> Self {
        let mut config = Self::minimal();

        for chain in ["Base", "BSC"] {
            config.set_chain_override(
                chain,
                ChainConfig {
                    requests_per_second: Some(4),
                    rpc_timeout: None,
                },
            );
        }

        config
    }

    /// Create minimal config with no chain overrides
    ///
    /// Suitable for testing or premium RPC endpoints with generous rate limits.
    pub fn minimal() -> Self {
        Self {
            rpc_timeout: Duration::from_secs(30),
            http_timeout: Duration::from_secs(30),
            requests_per_second: None,
            max_retries: 5,
            worker_concurrency: 8,
            feed_page_size: 1000,
            feed_page_delay: Duration::from_millis(100),
            max_reprocess_attempts: 10,
            reprocess_batch_size: 1000,
            fee_collector: constants::INTEGRATOR_ADDRESS,
            fee_rate_bps: 50,
            chain_overrides: HashMap::new(),
        }
    }

    /// Build config from environment variables on top of the common defaults
    ///
    /// Reads `RPC_TIMEOUT_SECS`, `HTTP_TIMEOUT_SECS`, `WORKER_CONCURRENCY`,
    /// `MAX_RETRIES` and `RPC_REQUESTS_PER_SECOND`. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| dotenvy::var(name).ok())
    }

    /// Same as [`SwapscanConfig::from_env`] with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::with_common_defaults();

        if let Some(secs) = parse_var::<u64, _>(&lookup, "RPC_TIMEOUT_SECS")? {
            config.rpc_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "HTTP_TIMEOUT_SECS")? {
            config.http_timeout = Duration::from_secs(secs);
        }
        if let Some(workers) = parse_var::<usize, _>(&lookup, "WORKER_CONCURRENCY")? {
            config.worker_concurrency = workers.max(1);
        }
        if let Some(retries) = parse_var::<u32, _>(&lookup, "MAX_RETRIES")? {
            config.max_retries = retries;
        }
        if let Some(rps) = parse_var::<u32, _>(&lookup, "RPC_REQUESTS_PER_SECOND")? {
            config.requests_per_second = Some(rps);
        }

        Ok(config)
    }

    /// Get effective requests per second for a specific chain
    pub fn get_requests_per_second(&self, chain: &str) -> Option<u32> {
        self.chain_overrides
            .get(&chain.to_ascii_lowercase())
            .and_then(|c| c.requests_per_second)
            .or(self.requests_per_second)
    }

    /// Get effective RPC timeout for a specific chain
    ///
    /// # Example
    ///
    /// ```rust
    /// use swapscan::SwapscanConfig;
    /// use std::time::Duration;
    ///
    /// let config = SwapscanConfig::default();
    /// assert_eq!(config.get_rpc_timeout("Arbitrum"), Duration::from_secs(30));
    /// ```
    pub fn get_rpc_timeout(&self, chain: &str) -> Duration {
        self.chain_overrides
            .get(&chain.to_ascii_lowercase())
            .and_then(|c| c.rpc_timeout)
            .unwrap_or(self.rpc_timeout)
    }

    /// Set chain-specific override
    pub fn set_chain_override(&mut self, chain: &str, config: ChainConfig) {
        self.chain_overrides
            .insert(chain.to_ascii_lowercase(), config);
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                name: name.to_string(),
                value: raw,
            }),
    }
}

/// Builder for [`SwapscanConfig`]
///
/// # Example
///
/// ```rust
/// use swapscan::SwapscanConfigBuilder;
/// use std::time::Duration;
///
/// let config = SwapscanConfigBuilder::new()
///     .rpc_timeout(Duration::from_secs(10))
///     .feed_page_delay(Duration::from_millis(250))
///     .build();
/// ```
pub struct SwapscanConfigBuilder {
    config: SwapscanConfig,
}

impl Default for SwapscanConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SwapscanConfigBuilder {
    /// Create a new builder with minimal defaults
    pub fn new() -> Self {
        Self {
            config: SwapscanConfig::minimal(),
        }
    }

    /// Start with common defaults
    pub fn with_defaults() -> Self {
        Self {
            config: SwapscanConfig::with_common_defaults(),
        }
    }

    /// Set global RPC timeout
    #[must_use]
    pub fn rpc_timeout(mut self, timeout: Duration) -> Self {
        self.config.rpc_timeout = timeout;
        self
    }

    /// Set timeout for feed, explorer and asset-transfer requests
    #[must_use]
    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.config.http_timeout = timeout;
        self
    }

    /// Set global requests per second
    #[must_use]
    pub fn requests_per_second(mut self, rps: u32) -> Self {
        self.config.requests_per_second = Some(rps);
        self
    }

    /// Set transport retry count
    #[must_use]
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set how many transactions of a batch run concurrently
    #[must_use]
    pub fn worker_concurrency(mut self, workers: usize) -> Self {
        self.config.worker_concurrency = workers.max(1);
        self
    }

    /// Set feed page size
    #[must_use]
    pub fn feed_page_size(mut self, size: usize) -> Self {
        self.config.feed_page_size = size.max(1);
        self
    }

    /// Set pause between feed pages
    #[must_use]
    pub fn feed_page_delay(mut self, delay: Duration) -> Self {
        self.config.feed_page_delay = delay;
        self
    }

    /// Set the reprocessing retry ceiling
    #[must_use]
    pub fn max_reprocess_attempts(mut self, attempts: i32) -> Self {
        self.config.max_reprocess_attempts = attempts;
        self
    }

    /// Set the fee-collection address excluded from out-leg selection
    #[must_use]
    pub fn fee_collector(mut self, address: Address) -> Self {
        self.config.fee_collector = address;
        self
    }

    /// Add chain-specific configuration
    #[must_use]
    pub fn chain_config(mut self, chain: &str, config: ChainConfig) -> Self {
        self.config.set_chain_override(chain, config);
        self
    }

    /// Convenience: set requests per second for a specific chain
    #[must_use]
    pub fn chain_requests_per_second(mut self, chain: &str, rps: u32) -> Self {
        let existing = self
            .config
            .chain_overrides
            .remove(&chain.to_ascii_lowercase())
            .unwrap_or_default();
        let chain_config = ChainConfig {
            requests_per_second: Some(rps),
            ..existing
        };
        self.config.set_chain_override(chain, chain_config);
        self
    }

    /// Convenience: set RPC timeout for a specific chain
    #[must_use]
    pub fn chain_timeout(mut self, chain: &str, timeout: Duration) -> Self {
        let existing = self
            .config
            .chain_overrides
            .remove(&chain.to_ascii_lowercase())
            .unwrap_or_default();
        let chain_config = ChainConfig {
            rpc_timeout: Some(timeout),
            ..existing
        };
        self.config.set_chain_override(chain, chain_config);
        self
    }

    /// Build the final configuration
    pub fn build(self) -> SwapscanConfig {
        self.config
    }
}
