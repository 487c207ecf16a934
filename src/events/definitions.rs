//! Canonical ERC-20 event definitions
//!
//! Receipt logs are matched against [`Transfer::SIGNATURE_HASH`] and decoded
//! with `Transfer::decode_log`:
//!
//! ```rust,ignore
//! use swapscan::Transfer;
//! use alloy_sol_types::SolEvent;
//!
//! for log in receipt_logs {
//!     if log.topic0() == Some(&Transfer::SIGNATURE_HASH) {
//!         let event = Transfer::decode_log(&log.inner)?;
//!         println!("{} -> {}: {}", event.from, event.to, event.value);
//!     }
//! }
//! ```

use std::fmt::Debug;

use alloy_sol_types::sol;

sol! {
    /// ERC-20 Transfer event
    ///
    /// - `from`: sender (indexed, topic 1)
    /// - `to`: recipient (indexed, topic 2)
    /// - `value`: raw amount, not adjusted for decimals (log data)
    event Transfer(address indexed from, address indexed to, uint256 value);
}

impl Debug for Transfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Transfer(from: {}, to: {}, value: {})",
            self.from, self.to, self.value
        )
    }
}
