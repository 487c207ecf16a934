// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Tower-based logging layer for chain RPC clients.
//!
//! Records the JSON-RPC method, the chain it was sent to and its latency.

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Instant,
};

use alloy_json_rpc::{RequestPacket, ResponsePacket};
use alloy_transport::TransportError;
use tower::Layer;
use tracing::{debug, trace, warn, Instrument};

/// A Tower layer that adds a tracing span to each RPC request.
///
/// # Example
///
/// ```rust,ignore
/// use swapscan::transport::LoggingLayer;
/// use alloy_rpc_client::ClientBuilder;
///
/// let client = ClientBuilder::default()
///     .layer(LoggingLayer::for_chain("Ethereum").with_payloads())
///     .http(rpc_url);
/// ```
#[derive(Clone, Debug, Default)]
pub struct LoggingLayer {
    chain: Arc<str>,
    /// Whether to trace request and response payloads (verbose)
    log_payloads: bool,
}

impl LoggingLayer {
    /// Creates a logging layer whose spans carry the given chain name.
    pub fn for_chain(chain: &str) -> Self {
        Self {
            chain: Arc::from(chain),
            log_payloads: false,
        }
    }

    /// Enables `trace!` logging of request and response payloads.
    ///
    /// Warning: receipts of busy router transactions are large.
    pub fn with_payloads(mut self) -> Self {
        self.log_payloads = true;
        self
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = LoggingService<S>;

    fn layer(&self, service: S) -> Self::Service {
        LoggingService {
            service,
            chain: self.chain.clone(),
            log_payloads: self.log_payloads,
        }
    }
}

/// A Tower service that logs RPC requests and responses.
#[derive(Clone, Debug)]
pub struct LoggingService<S> {
    service: S,
    chain: Arc<str>,
    log_payloads: bool,
}

impl<S> tower::Service<RequestPacket> for LoggingService<S>
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
        let log_payloads = self.log_payloads;
        let mut service = self.service.clone();
        let method = extract_method(&request);

        let span = tracing::debug_span!(
            "rpc_call",
            chain = %self.chain,
            method = %method,
            duration_ms = tracing::field::Empty,
        );

        Box::pin(
            async move {
                let start = Instant::now();

                if log_payloads {
                    trace!(request = ?request, "RPC request");
                }

                let result = service.call(request).await;
                let duration_ms = start.elapsed().as_millis() as u64;
                tracing::Span::current().record("duration_ms", duration_ms);

                match &result {
                    Ok(response) if log_payloads => {
                        trace!(response = ?response, duration_ms, "RPC response");
                    }
                    Ok(_) => debug!(duration_ms, "RPC response"),
                    Err(e) => warn!(error = %e, duration_ms, "RPC error"),
                }

                result
            }
            .instrument(span),
        )
    }
}

/// Extract the RPC method name from a request packet.
fn extract_method(request: &RequestPacket) -> String {
    match request {
        RequestPacket::Single(req) => req.method().to_string(),
        RequestPacket::Batch(reqs) => match reqs.as_slice() {
            [] => "batch(empty)".to_string(),
            [only] => only.method().to_string(),
            many => format!("batch({} calls)", many.len()),
        },
    }
}
