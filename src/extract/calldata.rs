// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Router calldata decoding
//!
//! Last-resort extraction for transactions whose receipt does not reveal the
//! swap. The input is tried against [`MATCHERS`] in order and the first
//! matcher that decodes wins; a matcher that fails just yields `None`.
//!
//! Out-leg amounts taken from calldata are the caller's minimum acceptable
//! output, not the settled amount.

use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolCall};

use crate::types::swap::TokenId;

sol! {
    interface ThorchainRouter {
        function deposit(address vault, address asset, uint256 amount, string memo) external payable;
        function depositWithExpiry(address vault, address asset, uint256 amount, string memo, uint256 expiration) external payable;
    }

    interface OneInchRouter {
        struct SwapDescription {
            address srcToken;
            address dstToken;
            address srcReceiver;
            address dstReceiver;
            uint256 amount;
            uint256 minReturnAmount;
            uint256 flags;
        }

        function swap(address executor, SwapDescription desc, bytes permit, bytes data) external payable returns (uint256 returnAmount, uint256 spentAmount);
        function unoswap(address srcToken, uint256 amount, uint256 minReturn, uint256[] pools) external payable returns (uint256 returnAmount);
    }

    interface UniswapV3Router {
        struct ExactInputSingleParams {
            address tokenIn;
            address tokenOut;
            uint24 fee;
            address recipient;
            uint256 deadline;
            uint256 amountIn;
            uint256 amountOutMinimum;
            uint160 sqrtPriceLimitX96;
        }

        struct ExactInputParams {
            bytes path;
            address recipient;
            uint256 deadline;
            uint256 amountIn;
            uint256 amountOutMinimum;
        }

        function exactInputSingle(ExactInputSingleParams params) external payable returns (uint256 amountOut);
        function exactInput(ExactInputParams params) external payable returns (uint256 amountOut);
    }

    interface UniswapV2Router {
        function swapExactTokensForTokens(uint256 amountIn, uint256 amountOutMin, address[] path, address to, uint256 deadline) external returns (uint256[] amounts);
        function swapExactETHForTokens(uint256 amountOutMin, address[] path, address to, uint256 deadline) external payable returns (uint256[] amounts);
        function swapExactTokensForETH(uint256 amountIn, uint256 amountOutMin, address[] path, address to, uint256 deadline) external returns (uint256[] amounts);
    }
}

/// Legs recovered from router calldata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalldataSwap {
    /// Name of the matcher that decoded the input
    pub matcher: &'static str,
    /// Token sold
    pub token_in: TokenId,
    /// Amount sold
    pub amount_in: U256,
    /// Token bought and minimum amount, when the call names it
    pub token_out: Option<(TokenId, U256)>,
}

/// Decoder for one router function. Receives the full input and the top-level value.
pub type Matcher = fn(&[u8], U256) -> Option<CalldataSwap>;

/// Known router functions, tried in this order.
pub const MATCHERS: [(&str, Matcher); 8] = [
    ("thorchain.deposit", thorchain_deposit),
    ("thorchain.depositWithExpiry", thorchain_deposit_with_expiry),
    ("1inch.swap", oneinch_swap),
    ("1inch.unoswap", oneinch_unoswap),
    ("uniswap_v3.exactInputSingle", uniswap_v3_exact_input_single),
    ("uniswap_v3.exactInput", uniswap_v3_exact_input),
    ("uniswap_v2.swapExactTokensForTokens", uniswap_v2_tokens_for_tokens),
    ("uniswap_v2.swapExactETH", uniswap_v2_eth),
];

/// Decode `input` with the first matching router function.
pub fn decode_calldata(input: &[u8], value: U256) -> Option<CalldataSwap> {
    if input.len() < 4 {
        return None;
    }
    MATCHERS.iter().find_map(|&(name, matcher)| {
        matcher(input, value).map(|decoded| CalldataSwap {
            matcher: name,
            ..decoded
        })
    })
}

fn swap(token_in: TokenId, amount_in: U256, token_out: Option<(TokenId, U256)>) -> CalldataSwap {
    CalldataSwap {
        matcher: "",
        token_in,
        amount_in,
        token_out,
    }
}

/// THORChain's router ignores `amount` for native deposits and uses the call value.
fn thorchain_leg(asset: Address, amount: U256, value: U256) -> CalldataSwap {
    let token = TokenId::from_address(asset);
    let amount = if token.is_native() { value } else { amount };
    swap(token, amount, None)
}

fn thorchain_deposit(input: &[u8], value: U256) -> Option<CalldataSwap> {
    let call = ThorchainRouter::depositCall::abi_decode(input).ok()?;
    Some(thorchain_leg(call.asset, call.amount, value))
}

fn thorchain_deposit_with_expiry(input: &[u8], value: U256) -> Option<CalldataSwap> {
    let call = ThorchainRouter::depositWithExpiryCall::abi_decode(input).ok()?;
    Some(thorchain_leg(call.asset, call.amount, value))
}

fn oneinch_swap(input: &[u8], _value: U256) -> Option<CalldataSwap> {
    let call = OneInchRouter::swapCall::abi_decode(input).ok()?;
    let desc = call.desc;
    Some(swap(
        TokenId::from_address(desc.srcToken),
        desc.amount,
        Some((TokenId::from_address(desc.dstToken), desc.minReturnAmount)),
    ))
}

fn oneinch_unoswap(input: &[u8], _value: U256) -> Option<CalldataSwap> {
    let call = OneInchRouter::unoswapCall::abi_decode(input).ok()?;
    Some(swap(TokenId::from_address(call.srcToken), call.amount, None))
}

fn uniswap_v3_exact_input_single(input: &[u8], _value: U256) -> Option<CalldataSwap> {
    let params = UniswapV3Router::exactInputSingleCall::abi_decode(input).ok()?.params;
    Some(swap(
        TokenId::from_address(params.tokenIn),
        params.amountIn,
        Some((TokenId::from_address(params.tokenOut), params.amountOutMinimum)),
    ))
}

/// Packed path: `token (20) | fee (3) | token (20) | ...`
fn uniswap_v3_exact_input(input: &[u8], _value: U256) -> Option<CalldataSwap> {
    let params = UniswapV3Router::exactInputCall::abi_decode(input).ok()?.params;
    let path = params.path.as_ref();
    if path.len() < 43 {
        return None;
    }
    let first = Address::from_slice(&path[..20]);
    let last = Address::from_slice(&path[path.len() - 20..]);
    Some(swap(
        TokenId::from_address(first),
        params.amountIn,
        Some((TokenId::from_address(last), params.amountOutMinimum)),
    ))
}

fn uniswap_v2_tokens_for_tokens(input: &[u8], _value: U256) -> Option<CalldataSwap> {
    let call = UniswapV2Router::swapExactTokensForTokensCall::abi_decode(input).ok()?;
    let (first, last) = (call.path.first()?, call.path.last()?);
    Some(swap(
        TokenId::from_address(*first),
        call.amountIn,
        Some((TokenId::from_address(*last), call.amountOutMin)),
    ))
}

fn uniswap_v2_eth(input: &[u8], value: U256) -> Option<CalldataSwap> {
    if let Ok(call) = UniswapV2Router::swapExactETHForTokensCall::abi_decode(input) {
        let last = call.path.last()?;
        return Some(swap(
            TokenId::Native,
            value,
            Some((TokenId::from_address(*last), call.amountOutMin)),
        ));
    }
    let call = UniswapV2Router::swapExactTokensForETHCall::abi_decode(input).ok()?;
    let first = call.path.first()?;
    Some(swap(
        TokenId::from_address(*first),
        call.amountIn,
        Some((TokenId::Native, call.amountOutMin)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::aliases::{U160, U24};
    use alloy_primitives::{address, Bytes};

    const USDC: Address = address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
    const WETH: Address = address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");
    const USER: Address = address!("00000000000000000000000000000000000000a1");

    #[test]
    fn test_thorchain_native_deposit_uses_call_value() {
        let input = ThorchainRouter::depositCall {
            vault: Address::repeat_byte(9),
            asset: Address::ZERO,
            amount: U256::ZERO,
            memo: "=:BTC.BTC:bc1q...".to_string(),
        }
        .abi_encode();

        let decoded = decode_calldata(&input, U256::from(5_000)).unwrap();
        assert_eq!(decoded.matcher, "thorchain.deposit");
        assert_eq!(decoded.token_in, TokenId::Native);
        assert_eq!(decoded.amount_in, U256::from(5_000));
        assert_eq!(decoded.token_out, None);
    }

    #[test]
    fn test_oneinch_swap_with_eth_placeholder() {
        let input = OneInchRouter::swapCall {
            executor: Address::repeat_byte(1),
            desc: OneInchRouter::SwapDescription {
                srcToken: address!("eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee"),
                dstToken: USDC,
                srcReceiver: Address::repeat_byte(2),
                dstReceiver: USER,
                amount: U256::from(10u64.pow(18)),
                minReturnAmount: U256::from(3_000_000_000u64),
                flags: U256::ZERO,
            },
            permit: Bytes::new(),
            data: Bytes::new(),
        }
        .abi_encode();

        let decoded = decode_calldata(&input, U256::ZERO).unwrap();
        assert_eq!(decoded.matcher, "1inch.swap");
        assert_eq!(decoded.token_in, TokenId::Native);
        assert_eq!(
            decoded.token_out,
            Some((TokenId::Erc20(USDC), U256::from(3_000_000_000u64)))
        );
    }

    #[test]
    fn test_uniswap_v3_exact_input_path_ends() {
        let mut path = Vec::new();
        path.extend_from_slice(USDC.as_slice());
        path.extend_from_slice(&[0x00, 0x01, 0xf4]);
        path.extend_from_slice(WETH.as_slice());
        let input = UniswapV3Router::exactInputCall {
            params: UniswapV3Router::ExactInputParams {
                path: path.into(),
                recipient: USER,
                deadline: U256::MAX,
                amountIn: U256::from(1_000),
                amountOutMinimum: U256::from(1),
            },
        }
        .abi_encode();

        let decoded = decode_calldata(&input, U256::ZERO).unwrap();
        assert_eq!(decoded.matcher, "uniswap_v3.exactInput");
        assert_eq!(decoded.token_in, TokenId::Erc20(USDC));
        assert_eq!(decoded.token_out.map(|(t, _)| t), Some(TokenId::Erc20(WETH)));
    }

    #[test]
    fn test_uniswap_v3_exact_input_single() {
        let input = UniswapV3Router::exactInputSingleCall {
            params: UniswapV3Router::ExactInputSingleParams {
                tokenIn: WETH,
                tokenOut: USDC,
                fee: U24::from(500),
                recipient: USER,
                deadline: U256::MAX,
                amountIn: U256::from(77),
                amountOutMinimum: U256::from(70),
                sqrtPriceLimitX96: U160::ZERO,
            },
        }
        .abi_encode();

        let decoded = decode_calldata(&input, U256::ZERO).unwrap();
        assert_eq!(decoded.amount_in, U256::from(77));
        assert_eq!(decoded.token_out, Some((TokenId::Erc20(USDC), U256::from(70))));
    }

    #[test]
    fn test_uniswap_v2_eth_for_tokens() {
        let input = UniswapV2Router::swapExactETHForTokensCall {
            amountOutMin: U256::from(9),
            path: vec![WETH, USDC],
            to: USER,
            deadline: U256::MAX,
        }
        .abi_encode();

        let decoded = decode_calldata(&input, U256::from(123)).unwrap();
        assert_eq!(decoded.matcher, "uniswap_v2.swapExactETH");
        assert_eq!(decoded.token_in, TokenId::Native);
        assert_eq!(decoded.amount_in, U256::from(123));
    }

    #[test]
    fn test_uniswap_v2_tokens_for_eth() {
        let input = UniswapV2Router::swapExactTokensForETHCall {
            amountIn: U256::from(500),
            amountOutMin: U256::from(1),
            path: vec![USDC, WETH],
            to: USER,
            deadline: U256::MAX,
        }
        .abi_encode();

        let decoded = decode_calldata(&input, U256::ZERO).unwrap();
        assert_eq!(decoded.token_in, TokenId::Erc20(USDC));
        assert_eq!(decoded.token_out, Some((TokenId::Native, U256::from(1))));
    }

    #[test]
    fn test_unknown_or_short_input() {
        assert_eq!(decode_calldata(&[], U256::from(1)), None);
        assert_eq!(decode_calldata(&[0xde, 0xad, 0xbe, 0xef, 0, 0], U256::ZERO), None);

        // Known selector, truncated arguments
        let mut input = UniswapV2Router::swapExactTokensForTokensCall::SELECTOR.to_vec();
        input.extend_from_slice(&[0u8; 31]);
        assert_eq!(decode_calldata(&input, U256::ZERO), None);
    }
}
