// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Tower middleware for the chain RPC clients.
//!
//! Every client the [`ChainClientRegistry`](crate::ChainClientRegistry) builds is
//! wrapped, outermost first, in:
//!
//! 1. [`LoggingLayer`] - one `rpc_call` span per JSON-RPC request, tagged with the chain
//! 2. [`RetryLayer`] - exponential backoff on transient transport failures
//! 3. [`RateLimitLayer`] - token bucket, only when the chain has a requests-per-second limit
//!
//! ## Usage
//!
//! ```rust,ignore
//! use swapscan::transport::{LoggingLayer, RateLimitLayer, RetryLayer};
//! use alloy_rpc_client::ClientBuilder;
//!
//! let client = ClientBuilder::default()
//!     .layer(LoggingLayer::for_chain("Base"))
//!     .layer(RetryLayer::with_max_retries(5))
//!     .layer(RateLimitLayer::per_second(4))
//!     .http(rpc_url);
//! ```

mod logging;
mod rate_limit;
mod retry;

pub use logging::{LoggingLayer, LoggingService};
pub use rate_limit::{RateLimitLayer, RateLimitService};
pub use retry::{RetryConfig, RetryLayer, RetryService};
