// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Chain descriptors: RPC endpoints and block-explorer APIs per chain
//!
//! A [`ChainDescriptor`] is built once at startup and never mutated. The
//! built-in defaults cover the chains the fee-collection address is active on;
//! environment variables override endpoints and supply explorer API keys.
//!
//! # Explorer API versions
//!
//! Etherscan's unified v2 API serves many chains from a single host, selected
//! with a `chainid=` parameter. Chains it does not serve on the shared key
//! keep their legacy v1 per-chain host.
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use swapscan::config::chains_from_lookup;
//!
//! let env: HashMap<&str, &str> = HashMap::from([
//!     ("ETHEREUM_RPC_URL", "https://rpc-a.example,https://rpc-b.example"),
//!     ("ETHERSCAN_API_KEY", "key"),
//! ]);
//! let chains = chains_from_lookup(|name| env.get(name).map(|v| v.to_string()));
//! let ethereum = chains.iter().find(|c| c.name == "Ethereum").unwrap();
//! assert_eq!(ethereum.rpc_urls[0], "https://rpc-a.example");
//! ```

use alloy_chains::NamedChain;

/// Unified multi-chain explorer endpoint.
pub const ETHERSCAN_V2_URL: &str = "https://api.etherscan.io/v2/api";

/// Which request shape an explorer expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplorerApiVersion {
    /// Legacy per-chain host, no chain selector.
    V1,
    /// Single host, chain selected with `chainid=`.
    V2 {
        /// EIP-155 chain id
        chain_id: u64,
    },
}

/// A block-explorer API the internal transfer fallback can query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorerConfig {
    /// Base URL, e.g. `https://api.bscscan.com/api`
    pub base_url: String,
    /// API key sent as the `apikey` parameter
    pub api_key: String,
    /// Request shape
    pub version: ExplorerApiVersion,
}

/// Immutable description of one supported chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainDescriptor {
    /// Normalized chain name, as produced by the feed adapter (e.g. `"BSC"`)
    pub name: String,
    /// The alloy chain, when the name maps to one
    pub chain: Option<NamedChain>,
    /// Ordered RPC endpoints; the registry uses the first one
    pub rpc_urls: Vec<String>,
    /// Ordered explorer APIs; the internal transfer fallback uses the first one
    pub explorers: Vec<ExplorerConfig>,
    /// Symbol of the chain's native asset
    pub native_symbol: String,
}

impl ChainDescriptor {
    /// EIP-155 chain id, if known.
    pub fn chain_id(&self) -> Option<u64> {
        self.chain.map(|chain| chain as u64)
    }
}

/// Static defaults for one chain.
struct ChainDefaults {
    name: &'static str,
    chain: NamedChain,
    env_prefix: &'static str,
    rpc_url: &'static str,
    native_symbol: &'static str,
    legacy_explorer: &'static str,
    legacy_key_env: &'static str,
    served_by_v2: bool,
}

const DEFAULTS: [ChainDefaults; 7] = [
    ChainDefaults {
        name: "Ethereum",
        chain: NamedChain::Mainnet,
        env_prefix: "ETHEREUM",
        rpc_url: "https://ethereum.publicnode.com",
        native_symbol: "ETH",
        legacy_explorer: "https://api.etherscan.io/api",
        legacy_key_env: "ETHERSCAN_API_KEY",
        served_by_v2: true,
    },
    ChainDefaults {
        name: "Optimism",
        chain: NamedChain::Optimism,
        env_prefix: "OPTIMISM",
        rpc_url: "https://mainnet.optimism.io",
        native_symbol: "ETH",
        legacy_explorer: "https://api-optimistic.etherscan.io/api",
        legacy_key_env: "OPTIMISM_API_KEY",
        served_by_v2: true,
    },
    ChainDefaults {
        name: "Arbitrum",
        chain: NamedChain::Arbitrum,
        env_prefix: "ARBITRUM",
        rpc_url: "https://arb1.arbitrum.io/rpc",
        native_symbol: "ETH",
        legacy_explorer: "https://api.arbiscan.io/api",
        legacy_key_env: "ARBISCAN_API_KEY",
        served_by_v2: true,
    },
    ChainDefaults {
        name: "Base",
        chain: NamedChain::Base,
        env_prefix: "BASE",
        rpc_url: "https://mainnet.base.org",
        native_symbol: "ETH",
        legacy_explorer: "https://api.basescan.org/api",
        legacy_key_env: "BASESCAN_API_KEY",
        served_by_v2: true,
    },
    ChainDefaults {
        name: "Polygon",
        chain: NamedChain::Polygon,
        env_prefix: "POLYGON",
        rpc_url: "https://polygon-rpc.com",
        native_symbol: "MATIC",
        legacy_explorer: "https://api.polygonscan.com/api",
        legacy_key_env: "POLYGONSCAN_API_KEY",
        served_by_v2: true,
    },
    ChainDefaults {
        name: "BSC",
        chain: NamedChain::BinanceSmartChain,
        env_prefix: "BSC",
        rpc_url: "https://bsc-dataseed.binance.org",
        native_symbol: "BNB",
        legacy_explorer: "https://api.bscscan.com/api",
        legacy_key_env: "BSCSCAN_API_KEY",
        served_by_v2: false,
    },
    ChainDefaults {
        name: "Avalanche",
        chain: NamedChain::Avalanche,
        env_prefix: "AVALANCHE",
        rpc_url: "https://api.avax.network/ext/bc/C/rpc",
        native_symbol: "AVAX",
        legacy_explorer: "https://api.snowtrace.io/api",
        legacy_key_env: "SNOWTRACE_API_KEY",
        served_by_v2: false,
    },
];

/// Built-in chains with public RPC endpoints and no explorer keys.
pub fn default_chains() -> Vec<ChainDescriptor> {
    chains_from_lookup(|_| None)
}

/// Build chain descriptors from the defaults, overlaid with values from `lookup`.
///
/// Recognized keys:
/// - `<CHAIN>_RPC_URL`: comma-separated ordered endpoint list
/// - `ETHERSCAN_API_KEY`: enables the v2 explorer for chains it serves
/// - per-chain legacy keys (`BSCSCAN_API_KEY`, `SNOWTRACE_API_KEY`, ...): enable the v1 host
///
/// When both are present the v2 explorer is listed first.
pub fn chains_from_lookup<F>(lookup: F) -> Vec<ChainDescriptor>
where
    F: Fn(&str) -> Option<String>,
{
    let etherscan_key = lookup("ETHERSCAN_API_KEY").filter(|key| !key.is_empty());

    DEFAULTS
        .iter()
        .map(|defaults| {
            let rpc_urls = lookup(&format!("{}_RPC_URL", defaults.env_prefix))
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|url| !url.is_empty())
                        .map(String::from)
                        .collect::<Vec<_>>()
                })
                .filter(|urls| !urls.is_empty())
                .unwrap_or_else(|| vec![defaults.rpc_url.to_string()]);

            let mut explorers = Vec::new();
            if defaults.served_by_v2 {
                if let Some(key) = &etherscan_key {
                    explorers.push(ExplorerConfig {
                        base_url: ETHERSCAN_V2_URL.to_string(),
                        api_key: key.clone(),
                        version: ExplorerApiVersion::V2 {
                            chain_id: defaults.chain as u64,
                        },
                    });
                }
            }
            if let Some(key) = lookup(defaults.legacy_key_env).filter(|key| !key.is_empty()) {
                explorers.push(ExplorerConfig {
                    base_url: defaults.legacy_explorer.to_string(),
                    api_key: key,
                    version: ExplorerApiVersion::V1,
                });
            }

            ChainDescriptor {
                name: defaults.name.to_string(),
                chain: Some(defaults.chain),
                rpc_urls,
                explorers,
                native_symbol: defaults.native_symbol.to_string(),
            }
        })
        .collect()
}
