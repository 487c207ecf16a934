//! ERC-20 transfers from receipt logs

use alloy_rpc_types::Log;
use alloy_sol_types::SolEvent;
use tracing::trace;

use crate::errors::ExtractionError;
use crate::events::Transfer;
use crate::types::swap::TransferCandidate;

/// Decode every ERC-20 `Transfer` in `logs`, in log order.
///
/// ERC-721 transfers share the signature but index the token id as a fourth
/// topic; they are skipped.
///
/// # Errors
///
/// [`ExtractionError::DecodeFailure`] if a three-topic `Transfer` log has
/// malformed data.
pub fn transfers_from_logs(logs: &[Log]) -> Result<Vec<TransferCandidate>, ExtractionError> {
    let mut transfers = Vec::new();

    for log in logs {
        let topics = log.topics();
        if topics.first() != Some(&Transfer::SIGNATURE_HASH) || topics.len() != 3 {
            continue;
        }

        let event = Transfer::decode_log(&log.inner).map_err(|e| {
            ExtractionError::decode_failure(format!(
                "Transfer log {} from {}: {e}",
                log.log_index.unwrap_or_default(),
                log.address()
            ))
        })?;
        trace!(token = %log.address(), transfer = ?event.data, "Decoded transfer");

        let Transfer { from, to, value } = event.data;
        transfers.push(TransferCandidate::erc20(log.address(), from, to, value));
    }

    Ok(transfers)
}
