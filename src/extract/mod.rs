//! Swap leg extraction
//!
//! Reconstructs what a transaction's sender gave up and received:
//!
//! - [`logs`]: ERC-20 `Transfer` events from the receipt
//! - [`selection`]: in-leg and out-leg heuristics over the transfer list
//! - [`calldata`]: known router signatures, tried when transfers are inconclusive
//! - [`SwapExtractor`]: fetches the inputs and resolves token metadata
//!
//! # Known limitation
//!
//! When no transfer returns to the sender, the out-leg is the largest
//! remaining transfer in another token that is not the fee skim. There is no
//! minimum-confidence threshold, so multi-hop routes can yield an
//! intermediate hop as the out-leg.

pub mod calldata;
mod extractor;
pub mod logs;
pub mod selection;

pub use extractor::{plan_extraction, scaled_amounts, ExtractionPlan, SwapExtractor, SwapLegSource};
