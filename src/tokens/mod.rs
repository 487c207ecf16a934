// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Token metadata resolution
//!
//! Decimals and symbols for swap legs, read with `eth_call`. Metadata is
//! best-effort: a token that reverts, times out or returns garbage resolves to
//! 18 decimals and no symbol, and the swap is still recorded.

mod metadata;

pub use metadata::{decode_symbol, TokenMetadata, TokenMetadataResolver, DEFAULT_DECIMALS};
