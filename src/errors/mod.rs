//! Error types for the swapscan library.
//!
//! Module-specific errors are used inside each component, and
//! [`SwapscanError`] unifies them for the binary and for callers that do not
//! need to distinguish sources.
//!
//! - [`RpcError`] - JSON-RPC failures against a chain endpoint
//! - [`ExtractionError`] - per-transaction failures, classified for the quarantine table
//! - [`FeedError`] - inbound transfer feed failures (abort the run)
//! - [`StoreError`] - database failures
//! - [`ConfigError`] - environment/configuration failures
//!
//! # Example
//!
//! ```rust,ignore
//! use swapscan::{SwapscanError, IngestionPipeline};
//!
//! async fn run(pipeline: &IngestionPipeline) -> Result<(), SwapscanError> {
//!     // FeedError and StoreError convert automatically
//!     let summary = pipeline.run_incremental().await?;
//!     println!("{summary:?}");
//!     Ok(())
//! }
//! ```

mod config;
mod extraction;
mod feed;
mod rpc;
mod store;

pub use config::ConfigError;
pub use extraction::ExtractionError;
pub use feed::FeedError;
pub use rpc::RpcError;
pub use store::StoreError;

/// Unified error type for all swapscan operations.
///
/// All module-specific error types convert to `SwapscanError` via `From`, so
/// `?` propagates them naturally.
#[derive(Debug, thiserror::Error)]
pub enum SwapscanError {
    /// Error from configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from a chain RPC endpoint.
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// Error from extracting a single transaction.
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Error from the inbound transfer feed.
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    /// Error from the persistence layer.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
