//! # swapscan
//!
//! Swap extraction and aggregator attribution for fee-collection transfers.
//!
//! An integrator collects a fee on every swap routed through its aggregator
//! integrations. swapscan takes the inbound feed of those fee transfers and,
//! for each one, reconstructs the underlying swap from chain data and
//! attributes it to the aggregator that executed it:
//!
//! - [`provider`]: one lazily built, rate-limited JSON-RPC client per chain
//! - [`tokens`]: cached ERC-20 decimals and symbol lookups
//! - [`internal`]: internal native-asset transfers from an asset-transfer API,
//!   with a block-explorer fallback
//! - [`extract`]: in-leg and out-leg selection from receipt logs, internal
//!   transfers and router calldata
//! - [`protocol`]: attribution from entity metadata, router addresses and the
//!   trusted 1inch stream
//! - [`ingest`] and [`reprocess`]: persistence, error quarantine and replay
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use swapscan::{IngestionPipeline, MemoryStore, SwapscanConfig};
//!
//! let config = SwapscanConfig::default();
//! let pipeline = IngestionPipeline::new(feed, extractor, Arc::new(MemoryStore::new()), &chains, &config);
//! let summary = pipeline.run_incremental().await?;
//! println!("stored {} swaps, quarantined {}", summary.stored, summary.quarantined);
//! ```

pub mod bootstrap;
pub mod config;
pub mod errors;
pub mod events;
pub mod extract;
pub mod feed;
pub mod ingest;
pub mod internal;
pub mod protocol;
pub mod provider;
pub mod reprocess;
pub mod store;
pub mod tokens;
mod tracing;
pub mod transport;
pub mod types;

pub use config::{ChainConfig, ChainDescriptor, SwapscanConfig, SwapscanConfigBuilder};
pub use errors::{ConfigError, ExtractionError, FeedError, RpcError, StoreError, SwapscanError};
pub use extract::{SwapExtractor, SwapLegSource};
pub use feed::{ArkhamFeed, FeedTransfer, TransferSource};
pub use ingest::{IngestSummary, IngestionPipeline};
pub use internal::{InternalTransferResolver, InternalTransferSource};
pub use protocol::{Protocol, ProtocolIdentifier, ProtocolMatch};
pub use provider::ChainClientRegistry;
pub use reprocess::{ReprocessJob, ReprocessSummary};
pub use store::{IngestedSwapRecord, IngestionErrorRecord, MemoryStore, PgStore, SwapStore};
pub use tokens::TokenMetadataResolver;
pub use types::swap::{ExtractionMethod, SwapExtractionResult, SwapLeg, TokenId, TransferCandidate};
