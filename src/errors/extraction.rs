// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Per-transaction error taxonomy.
//!
//! Every failure inside the ingestion of a single transaction is classified
//! into an [`ExtractionError`]. The classification decides the
//! `error_type` string written to the `ingestion_errors` quarantine table.

use std::time::Duration;

use super::{RpcError, StoreError};

/// Errors raised while extracting, attributing or persisting one transaction.
///
/// # Examples
///
/// ```rust
/// use swapscan::ExtractionError;
///
/// let err = ExtractionError::unsupported_chain("Fantom");
/// assert_eq!(err.error_type(), "unsupported_chain");
/// assert!(!err.is_retryable());
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// No RPC endpoint is configured for the transaction's chain.
    #[error("No RPC configuration for chain {chain}")]
    UnsupportedChain {
        /// Normalized chain name from the feed
        chain: String,
    },

    /// A network call did not finish within its timeout.
    #[error("{operation} timed out after {timeout:?}")]
    ProviderTimeout {
        /// Description of the call that timed out
        operation: String,
        /// The timeout that elapsed
        timeout: Duration,
    },

    /// A network or API call failed.
    #[error("Provider error: {0}")]
    ProviderError(#[source] RpcError),

    /// Log, calldata or feed payload had an unexpected shape.
    #[error("Decode failure: {details}")]
    DecodeFailure {
        /// What could not be decoded
        details: String,
    },

    /// Writing the swap record failed.
    #[error("Persistence error: {0}")]
    PersistenceError(#[from] StoreError),
}

impl ExtractionError {
    /// Create an `UnsupportedChain` error.
    pub fn unsupported_chain(chain: impl Into<String>) -> Self {
        ExtractionError::UnsupportedChain {
            chain: chain.into(),
        }
    }

    /// Create a `DecodeFailure` error.
    pub fn decode_failure(details: impl Into<String>) -> Self {
        ExtractionError::DecodeFailure {
            details: details.into(),
        }
    }

    /// Stable identifier stored in `ingestion_errors.error_type`.
    pub fn error_type(&self) -> &'static str {
        match self {
            ExtractionError::UnsupportedChain { .. } => "unsupported_chain",
            ExtractionError::ProviderTimeout { .. } => "provider_timeout",
            ExtractionError::ProviderError(_) => "provider_error",
            ExtractionError::DecodeFailure { .. } => "decode_failure",
            ExtractionError::PersistenceError(_) => "persistence_error",
        }
    }

    /// Whether replaying the transaction later may succeed.
    ///
    /// A missing chain configuration will not fix itself between runs.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ExtractionError::UnsupportedChain { .. })
    }
}

impl From<RpcError> for ExtractionError {
    fn from(error: RpcError) -> Self {
        match error {
            RpcError::Timeout { operation, timeout } => {
                ExtractionError::ProviderTimeout { operation, timeout }
            }
            other => ExtractionError::ProviderError(other),
        }
    }
}
