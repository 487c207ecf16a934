//! Building `dex_aggregator_revenue` rows from a feed transfer and its swap legs

use bigdecimal::BigDecimal;

use crate::config::constants::NATIVE_SYMBOL;
use crate::extract::scaled_amounts;
use crate::feed::FeedTransfer;
use crate::protocol::ProtocolMatch;
use crate::store::{IngestedSwapRecord, FEED_SOURCE, RPC_VOLUME_SOURCE};
use crate::types::swap::{SwapExtractionResult, SwapLeg};

/// Swap volume implied by a fee: `fee_usd * 10_000 / fee_rate_bps`.
pub fn fee_implied_volume(fee_usd: &BigDecimal, fee_rate_bps: u32) -> Option<BigDecimal> {
    if fee_rate_bps == 0 {
        return None;
    }
    Some((fee_usd * BigDecimal::from(10_000u32) / BigDecimal::from(fee_rate_bps)).normalized())
}

/// Display symbol of a leg, with the native sentinel replaced by the chain's asset.
fn leg_symbol(leg: &SwapLeg, native_symbol: Option<&str>) -> Option<String> {
    match (leg.symbol.as_deref(), native_symbol) {
        (Some(NATIVE_SYMBOL), Some(native)) => Some(native.to_string()),
        (symbol, _) => symbol.map(String::from),
    }
}

/// Assemble the row for one transfer.
///
/// Without an extraction result the swap-leg columns stay `NULL`, and the
/// upsert leaves any previously stored legs in place.
pub fn build_record(
    transfer: &FeedTransfer,
    protocol: ProtocolMatch,
    extraction: Option<&SwapExtractionResult>,
    native_symbol: Option<&str>,
    fee_rate_bps: u32,
) -> IngestedSwapRecord {
    let mut record = IngestedSwapRecord {
        tx_hash: transfer.tx_hash.clone(),
        chain: transfer.chain.clone(),
        protocol: protocol.protocol.as_str().to_string(),
        timestamp: transfer.timestamp,
        actual_fee_usd: transfer.fee_usd.clone(),
        fee_token_symbol: transfer.token_symbol.clone(),
        fee_token_address: transfer.token_address.clone(),
        fee_amount_raw: transfer.unit_value.clone(),
        block_number: transfer.block_number.and_then(|b| i64::try_from(b).ok()),
        from_address: transfer.from.as_ref().map(|c| c.address.clone()),
        to_address: transfer.to.as_ref().map(|c| c.address.clone()),
        fee_data_source: FEED_SOURCE.to_string(),
        swap_volume_usd: None,
        token_in_address: None,
        token_in_symbol: None,
        token_in_decimals: None,
        amount_in: None,
        amount_in_raw: None,
        token_out_address: None,
        token_out_symbol: None,
        token_out_decimals: None,
        amount_out: None,
        amount_out_raw: None,
        extraction_method: None,
        volume_data_source: None,
    };

    let Some(result) = extraction else {
        return record;
    };

    let (amount_in, amount_out) = scaled_amounts(result);
    record.swap_volume_usd = transfer
        .fee_usd
        .as_ref()
        .and_then(|fee| fee_implied_volume(fee, fee_rate_bps));

    let token_in = &result.token_in;
    record.token_in_address = Some(token_in.token.to_string());
    record.token_in_symbol = leg_symbol(token_in, native_symbol);
    record.token_in_decimals = Some(i16::from(token_in.decimals));
    record.amount_in = amount_in;
    record.amount_in_raw = Some(token_in.amount_raw.clone());

    if let Some(token_out) = &result.token_out {
        record.token_out_address = Some(token_out.token.to_string());
        record.token_out_symbol = leg_symbol(token_out, native_symbol);
        record.token_out_decimals = Some(i16::from(token_out.decimals));
        record.amount_out = amount_out;
        record.amount_out_raw = Some(token_out.amount_raw.clone());
    }

    record.extraction_method = Some(result.method.as_str().to_string());
    record.volume_data_source = Some(RPC_VOLUME_SOURCE.to_string());
    record
}
