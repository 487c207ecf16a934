//! Shared RPC error types for blockchain provider operations.
//!
//! These errors describe failures talking to a chain's JSON-RPC endpoint and
//! carry the operation being performed so log lines can be traced back to a call.

use std::time::Duration;

/// Errors that can occur during blockchain RPC operations.
///
/// # Examples
///
/// ```rust
/// use swapscan::RpcError;
///
/// let error = RpcError::TransactionNotFound {
///     tx_hash: "0x123...".to_string(),
/// };
/// println!("Error: {}", error);
/// ```
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// The configured endpoint is not a valid URL.
    #[error("Invalid provider URL: {0}")]
    ProviderUrlInvalid(String),

    /// Transaction was not found on the blockchain.
    ///
    /// Usually the hash belongs to another chain, or the node has not indexed it yet.
    #[error("Transaction not found: {tx_hash}")]
    TransactionNotFound {
        /// The transaction hash that wasn't found
        tx_hash: String,
    },

    /// Receipt was not found for a transaction.
    #[error("Receipt not found for transaction: {tx_hash}")]
    ReceiptNotFound {
        /// The transaction hash whose receipt wasn't found
        tx_hash: String,
    },

    /// Failed to connect to the blockchain or execute an RPC call.
    ///
    /// This is a catch-all for RPC failures that don't fit other categories,
    /// such as network errors or provider downtime.
    #[error("Chain connection failed during {operation}")]
    ChainConnectionFailed {
        /// Description of the operation that failed
        operation: String,
        /// The underlying error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An `eth_call` returned data that could not be ABI-decoded.
    #[error("Failed to decode {call} return data from {contract}")]
    CallDecodeFailed {
        /// Solidity signature of the call
        call: &'static str,
        /// Contract address, as a hex string
        contract: String,
    },

    /// The call did not complete within the configured timeout.
    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        /// Description of the operation that timed out
        operation: String,
        /// The timeout that elapsed
        timeout: Duration,
    },
}

impl RpcError {
    /// Helper to create a `ChainConnectionFailed` error from any error type.
    pub fn chain_connection_failed(
        operation: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        RpcError::ChainConnectionFailed {
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    /// Helper to create a `Timeout` error.
    pub fn timeout(operation: impl Into<String>, timeout: Duration) -> Self {
        RpcError::Timeout {
            operation: operation.into(),
            timeout,
        }
    }

    /// Returns true if the error is a timeout rather than a provider failure.
    pub fn is_timeout(&self) -> bool {
        matches!(self, RpcError::Timeout { .. })
    }
}
