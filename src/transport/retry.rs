// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Retry layer with exponential backoff for chain RPC clients.
//!
//! Transient transport failures are retried inside the client so a single
//! dropped connection does not quarantine a transaction. Anything still
//! failing after the last attempt surfaces as a provider error and goes to
//! the error quarantine.

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};

use alloy_json_rpc::{RequestPacket, ResponsePacket, RpcError};
use alloy_transport::TransportError;
use tower::Layer;
use tracing::{debug, warn};

/// Backoff settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retry attempts after the initial request
    pub max_retries: u32,
    /// Delay before the first retry; doubles each attempt
    pub base_delay: Duration,
    /// Upper bound for a single delay
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
        }
    }
}

/// A Tower layer that retries failed RPC requests.
///
/// ```text
/// delay = min(base_delay * 2^attempt, max_delay)
/// ```
///
/// # Example
///
/// ```rust
/// use swapscan::transport::RetryLayer;
///
/// let layer = RetryLayer::with_max_retries(5);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RetryLayer {
    config: Arc<RetryConfig>,
}

impl RetryLayer {
    /// Creates a retry layer from explicit settings.
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Creates a retry layer with default delays and `max_retries` attempts.
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self::new(RetryConfig {
            max_retries,
            ..Default::default()
        })
    }
}

impl<S> Layer<S> for RetryLayer {
    type Service = RetryService<S>;

    fn layer(&self, service: S) -> Self::Service {
        RetryService {
            service,
            config: self.config.clone(),
        }
    }
}

/// A Tower service that retries transient failures with backoff.
#[derive(Clone, Debug)]
pub struct RetryService<S> {
    service: S,
    config: Arc<RetryConfig>,
}

impl<S> tower::Service<RequestPacket> for RetryService<S>
where
    S: tower::Service<RequestPacket, Response = ResponsePacket, Error = TransportError>
        + Clone
        + Send
        + 'static,
    S::Future: Send,
{
    type Response = ResponsePacket;
    type Error = TransportError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&mut self, request: RequestPacket) -> Self::Future {
        let service = self.service.clone();
        let config = self.config.clone();

        Box::pin(async move {
            let mut attempt = 0u32;
            loop {
                let mut service = service.clone();
                let error = match service.call(request.clone()).await {
                    Ok(response) => {
                        if attempt > 0 {
                            debug!(attempt, "Request succeeded after retry");
                        }
                        return Ok(response);
                    }
                    Err(error) => error,
                };

                if !is_retryable_error(&error) {
                    return Err(error);
                }
                if attempt >= config.max_retries {
                    warn!(error = %error, attempts = attempt + 1, "Max retries exceeded");
                    return Err(error);
                }

                let delay = calculate_backoff(attempt, &config);
                debug!(
                    error = %error,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "Retryable error, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        })
    }
}

/// `min(base_delay * 2^attempt, max_delay)`
fn calculate_backoff(attempt: u32, config: &RetryConfig) -> Duration {
    let multiplier = 2u128.saturating_pow(attempt);
    let delay_ms = config.base_delay.as_millis().saturating_mul(multiplier);
    Duration::from_millis(delay_ms.min(config.max_delay.as_millis()) as u64)
}

/// Transport failures, malformed or null responses and provider error codes
/// flagged as retryable (rate limits) are retried; serialization errors are not.
fn is_retryable_error(error: &TransportError) -> bool {
    match error {
        RpcError::Transport(kind) => kind.is_retry_err(),
        RpcError::SerError(_) => false,
        RpcError::DeserError { .. } => true,
        RpcError::ErrorResp(err) => err.is_retry_err(),
        RpcError::NullResp => true,
        _ => false,
    }
}
