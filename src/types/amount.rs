//! Raw on-chain amounts and their decimal-scaled form

use std::str::FromStr;

use alloy_primitives::U256;
use bigdecimal::{num_bigint::BigInt, BigDecimal};

/// Scale a raw token amount by `10^decimals` for database storage.
///
/// The division is exact: `BigDecimal` keeps every digit of a `U256`, so
/// 18-decimal amounts do not lose precision the way an `f64` would.
///
/// Returns `None` only if the amount's decimal rendering cannot be parsed,
/// which does not happen for values produced by `U256`'s `Display`.
///
/// # Example
///
/// ```rust
/// use swapscan::types::amount::scale_raw_amount;
/// use alloy_primitives::U256;
/// use bigdecimal::BigDecimal;
/// use std::str::FromStr;
///
/// let usdc = scale_raw_amount(U256::from(1_500_000u64), 6).unwrap();
/// assert_eq!(usdc, BigDecimal::from_str("1.5").unwrap());
/// ```
pub fn scale_raw_amount(raw: U256, decimals: u8) -> Option<BigDecimal> {
    let digits = BigInt::from_str(&raw.to_string()).ok()?;
    Some(BigDecimal::new(digits, i64::from(decimals)).normalized())
}

/// Parse a raw amount stored as a base-10 string.
pub fn parse_raw_amount(raw: &str) -> Option<U256> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    U256::from_str_radix(raw, 10).ok()
}
