//! Well-known addresses and constants
//!
//! Magic addresses used across the crate live here: the integrator's
//! fee-collection address, aggregator router contracts, and tokens whose
//! metadata is answered without an RPC call.

use alloy_primitives::{address, Address};

/// The integrator's fee-collection address.
///
/// Every transfer in the inbound feed lands on this address. It is also the
/// address the out-leg heuristic refuses to pick, since the fee skim is never
/// the swap output.
///
/// Contract: 0xA4a4f610e89488EB4ECc6c63069f241a54485269
pub const INTEGRATOR_ADDRESS: Address = address!("a4a4f610e89488eb4ecc6c63069f241a54485269");

/// Placeholder addresses routers use to denote the chain's native asset.
pub const NATIVE_PLACEHOLDERS: [Address; 2] = [
    Address::ZERO,
    address!("eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee"),
];

/// Symbol reported for the native-asset sentinel before chain mapping.
pub const NATIVE_SYMBOL: &str = "NATIVE";

/// Aggregator router contracts
pub mod routers {
    use super::*;

    /// 1inch Aggregation Router V5
    pub const ONEINCH_V5: Address = address!("1111111254eeb25477b68fb85ed929f73a960582");

    /// 1inch Aggregation Router V6
    pub const ONEINCH_V6: Address = address!("111111125421ca6dc452d289314280a0f8842a65");

    /// 1inch Aggregation Router V4
    pub const ONEINCH_V4: Address = address!("11111112542d85b3ef69ae05771c2dccff4faa26");

    /// ParaSwap Augustus Swapper V5
    pub const PARASWAP_AUGUSTUS_V5: Address = address!("def171fe48cf0115b1d80b88dc8eab59176fee57");

    /// ParaSwap token transfer proxy
    pub const PARASWAP_TRANSFER_PROXY: Address =
        address!("216b4b4ba9f3e719726886d34a177484278bfcae");

    /// CoW Protocol GPv2 settlement
    pub const COWSWAP_SETTLEMENT: Address = address!("9008d19f58aabd9ed0d60971565aa8510560ab41");

    /// 0x Exchange Proxy (Matcha)
    pub const ZEROX_EXCHANGE_PROXY: Address = address!("def1c0ded9bec7f1a1670819833240f027b25eff");
}

/// Tokens with known decimals, keyed by contract address
pub mod tokens {
    use super::*;

    /// Native USDC on Ethereum Mainnet
    pub const ETH_USDC: Address = address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");

    /// USDT on Ethereum Mainnet
    pub const ETH_USDT: Address = address!("dac17f958d2ee523a2206206994597c13d831ec7");

    /// Native USDC on Arbitrum One
    pub const ARB_USDC: Address = address!("af88d065e77c8cc2239327c5edb3a432268e5831");

    /// Native USDC on Base
    pub const BASE_USDC: Address = address!("833589fcd6edb6e08f4c7c32d4f71b54bda02913");

    /// Native USDC on Optimism
    pub const OP_USDC: Address = address!("0b2c639c533813f4aa9d7837caf62653d097ff85");

    /// Binance-Peg USDC on BSC
    ///
    /// Unlike USDC elsewhere this token uses 18 decimals.
    pub const BSC_BINANCE_PEG_USDC: Address = address!("8ac76a51cc950d9822d68b83fe1ad97b32cd580d");

    /// Binance-Peg USDT on BSC (18 decimals)
    pub const BSC_BINANCE_PEG_USDT: Address = address!("55d398326f99059ff775485246999027b3197955");

    /// (address, decimals, symbol) for every token in this module.
    pub const KNOWN: [(Address, u8, &str); 7] = [
        (ETH_USDC, 6, "USDC"),
        (ETH_USDT, 6, "USDT"),
        (ARB_USDC, 6, "USDC"),
        (BASE_USDC, 6, "USDC"),
        (OP_USDC, 6, "USDC"),
        (BSC_BINANCE_PEG_USDC, 18, "USDC"),
        (BSC_BINANCE_PEG_USDT, 18, "USDT"),
    ];

    /// Look up a token in [`KNOWN`].
    pub fn lookup(token: Address) -> Option<(u8, &'static str)> {
        KNOWN
            .iter()
            .find(|(address, _, _)| *address == token)
            .map(|(_, decimals, symbol)| (*decimals, *symbol))
    }
}

/// Feed chain identifiers and the normalized names they map to.
pub const CHAIN_ALIASES: [(&str, &str); 12] = [
    ("ethereum", "Ethereum"),
    ("bsc", "BSC"),
    ("binance-smart-chain", "BSC"),
    ("polygon", "Polygon"),
    ("polygon-pos", "Polygon"),
    ("arbitrum_one", "Arbitrum"),
    ("arbitrum-one", "Arbitrum"),
    ("arbitrum", "Arbitrum"),
    ("optimism", "Optimism"),
    ("base", "Base"),
    ("avalanche", "Avalanche"),
    ("blast", "Blast"),
];
