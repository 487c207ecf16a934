// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Chain client registry
//!
//! One JSON-RPC client per configured chain, created on first use and shared
//! for the rest of the process. Clients are type-erased over `AnyNetwork` so
//! OP-stack, BSC and Avalanche receipts all deserialize through the same type;
//! the extractor only needs sender, value, input and logs.
//!
//! # Example
//!
//! ```rust,ignore
//! use swapscan::{ChainClientRegistry, SwapscanConfig, config::default_chains};
//! use alloy_provider::Provider;
//!
//! let registry = ChainClientRegistry::new(default_chains(), &SwapscanConfig::default());
//! let client = registry.get_client("Base")?;
//! let block = client.get_block_number().await?;
//! ```

mod registry;

pub use registry::{ChainClient, ChainClientRegistry};
