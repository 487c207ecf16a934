//! Swap extraction types
//!
//! A transaction is reduced to a list of [`TransferCandidate`]s (ERC-20 logs
//! plus internal native transfers), from which an in-leg and an optional
//! out-leg are chosen and enriched into [`SwapLeg`]s.

use std::fmt;

use alloy_primitives::{Address, U256};

use crate::config::constants::{NATIVE_PLACEHOLDERS, NATIVE_SYMBOL};

/// Identity of the asset moved by a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenId {
    /// The chain's native asset (ETH, BNB, MATIC, ...)
    Native,
    /// An ERC-20 contract
    Erc20(Address),
}

impl TokenId {
    /// Map a router-supplied token address, treating native placeholders as [`TokenId::Native`].
    pub fn from_address(address: Address) -> Self {
        if NATIVE_PLACEHOLDERS.contains(&address) {
            TokenId::Native
        } else {
            TokenId::Erc20(address)
        }
    }

    /// True for the native sentinel.
    pub fn is_native(&self) -> bool {
        matches!(self, TokenId::Native)
    }

    /// Contract address, or `None` for the native asset.
    pub fn address(&self) -> Option<Address> {
        match self {
            TokenId::Native => None,
            TokenId::Erc20(address) => Some(*address),
        }
    }
}

/// Persisted form: `NATIVE` or a lowercase `0x` address.
impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenId::Native => f.write_str(NATIVE_SYMBOL),
            TokenId::Erc20(address) => write!(f, "{address:#x}"),
        }
    }
}

/// One value movement observed in a transaction.
///
/// Never persisted; only consumed by leg selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferCandidate {
    /// Sender of the value
    pub from: Address,
    /// Recipient of the value
    pub to: Address,
    /// Asset moved
    pub token: TokenId,
    /// Raw amount in the asset's smallest unit
    pub amount: U256,
}

impl TransferCandidate {
    /// A native-asset movement (internal call value or top-level value).
    pub fn native(from: Address, to: Address, amount: U256) -> Self {
        Self {
            from,
            to,
            token: TokenId::Native,
            amount,
        }
    }

    /// An ERC-20 `Transfer` log.
    pub fn erc20(token: Address, from: Address, to: Address, amount: U256) -> Self {
        Self {
            from,
            to,
            token: TokenId::Erc20(token),
            amount,
        }
    }

    /// True when the candidate moves the native asset.
    pub fn is_native(&self) -> bool {
        self.token.is_native()
    }
}

/// One side of a swap, enriched with token metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapLeg {
    /// Asset of the leg
    pub token: TokenId,
    /// Raw amount as a base-10 string
    pub amount_raw: String,
    /// Token decimals (18 when unknown)
    pub decimals: u8,
    /// Token symbol; `None` when the contract does not expose a readable one
    pub symbol: Option<String>,
}

impl SwapLeg {
    /// Raw amount parsed back to an integer.
    pub fn amount(&self) -> Option<U256> {
        crate::types::amount::parse_raw_amount(&self.amount_raw)
    }
}

/// Which extraction path produced a result, in decreasing order of confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMethod {
    /// Receipt logs plus internal native transfers
    LogsAndTrace,
    /// Top-level transaction value only, no out-leg
    NativeValue,
    /// A known router signature decoded from calldata
    DecodedCalldata,
}

impl ExtractionMethod {
    /// Tag stored alongside the result.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::LogsAndTrace => "logs+trace",
            ExtractionMethod::NativeValue => "native-value",
            ExtractionMethod::DecodedCalldata => "decoded-calldata",
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Best-effort reconstruction of a swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapExtractionResult {
    /// What the sender gave up
    pub token_in: SwapLeg,
    /// What the sender received, when identifiable
    pub token_out: Option<SwapLeg>,
    /// Path that produced this result
    pub method: ExtractionMethod,
}
