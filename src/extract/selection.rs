//! Leg selection heuristics
//!
//! Pure functions over an already-assembled transfer list. Candidate order
//! matters: ERC-20 logs come first in receipt order, then internal native
//! transfers, and "first" below always means first in that order.

use alloy_primitives::{Address, U256};
use tracing::debug;

use crate::types::swap::{TokenId, TransferCandidate};

/// Where the in-leg was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InLegSource {
    /// A transfer sent by the transaction sender
    Transfer,
    /// The transaction's top-level native value
    TopLevelValue,
}

/// Token and raw amount of a chosen leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChosenLeg {
    /// Asset moved
    pub token: TokenId,
    /// Raw amount
    pub amount: U256,
}

impl From<&TransferCandidate> for ChosenLeg {
    fn from(transfer: &TransferCandidate) -> Self {
        Self {
            token: transfer.token,
            amount: transfer.amount,
        }
    }
}

/// Result of running both heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegSelection {
    /// What the sender gave up
    pub token_in: ChosenLeg,
    /// Where `token_in` came from
    pub in_source: InLegSource,
    /// What the sender received, if a candidate survived the filters
    pub token_out: Option<ChosenLeg>,
}

/// The in-leg: first transfer sent by `sender`, else a non-zero top-level value.
pub fn select_token_in(
    sender: Address,
    tx_value: U256,
    transfers: &[TransferCandidate],
) -> Option<(ChosenLeg, InLegSource)> {
    if let Some(transfer) = transfers.iter().find(|t| t.from == sender) {
        return Some((transfer.into(), InLegSource::Transfer));
    }
    (!tx_value.is_zero()).then_some((
        ChosenLeg {
            token: TokenId::Native,
            amount: tx_value,
        },
        InLegSource::TopLevelValue,
    ))
}

/// The out-leg for a known in-leg token.
///
/// 1. First transfer to `sender` in a different token.
/// 2. Otherwise the largest transfer in a different token that is not paid to
///    `fee_collector`. Ties go to the earliest transfer. There is no minimum
///    size, so a small router hop can be picked on multi-hop routes.
pub fn select_token_out(
    sender: Address,
    token_in: TokenId,
    transfers: &[TransferCandidate],
    fee_collector: Address,
) -> Option<ChosenLeg> {
    if let Some(direct) = transfers
        .iter()
        .find(|t| t.to == sender && t.token != token_in)
    {
        return Some(direct.into());
    }

    let largest = transfers
        .iter()
        .filter(|t| t.to != fee_collector && t.token != token_in)
        .fold(None::<&TransferCandidate>, |best, t| match best {
            Some(b) if b.amount >= t.amount => Some(b),
            _ => Some(t),
        });

    if let Some(largest) = largest {
        debug!(
            token = %largest.token,
            amount = %largest.amount,
            "Out-leg from largest remaining transfer"
        );
    }
    largest.map(ChosenLeg::from)
}

/// Run both heuristics. `None` only when no in-leg exists.
pub fn select_legs(
    sender: Address,
    tx_value: U256,
    transfers: &[TransferCandidate],
    fee_collector: Address,
) -> Option<LegSelection> {
    let (token_in, in_source) = select_token_in(sender, tx_value, transfers)?;
    let token_out = select_token_out(sender, token_in.token, transfers, fee_collector);
    Some(LegSelection {
        token_in,
        in_source,
        token_out,
    })
}
