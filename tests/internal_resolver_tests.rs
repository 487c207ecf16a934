//! Integration tests for the two-tier internal transfer lookup

mod helpers;

use alloy_primitives::{address, b256, U256};
use helpers::CountingSource;
use swapscan::{InternalTransferResolver, TransferCandidate};

const TX: alloy_primitives::TxHash =
    b256!("8f1e1ad2bc6a4bd7a0e5cd2d1c22fc9d3b3f4b5e6d7c8a9b0c1d2e3f4a5b6c7d");

fn native_transfer() -> TransferCandidate {
    TransferCandidate::native(
        address!("1111111254eeb25477b68fb85ed929f73a960582"),
        address!("00000000000000000000000000000000000000aa"),
        U256::from(10u64).pow(U256::from(17u64)),
    )
}

#[tokio::test]
async fn test_fallback_runs_once_when_primary_not_attempted() {
    let primary = CountingSource::not_attempted();
    let fallback = CountingSource::found(vec![native_transfer()]);
    let resolver = InternalTransferResolver::new(primary.clone(), fallback.clone());

    let transfers = resolver.get_internal_transfers("BSC", TX, Some(38_000_000)).await;

    assert_eq!(transfers, vec![native_transfer()]);
    assert_eq!(primary.calls(), 1);
    assert_eq!(fallback.calls(), 1);
}

#[tokio::test]
async fn test_empty_primary_answer_skips_fallback() {
    let primary = CountingSource::found(Vec::new());
    let fallback = CountingSource::found(vec![native_transfer()]);
    let resolver = InternalTransferResolver::new(primary.clone(), fallback.clone());

    let transfers = resolver.get_internal_transfers("Ethereum", TX, None).await;

    assert!(transfers.is_empty());
    assert_eq!(primary.calls(), 1);
    assert_eq!(fallback.calls(), 0);
}

#[tokio::test]
async fn test_both_tiers_unavailable_yields_empty() {
    let primary = CountingSource::not_attempted();
    let fallback = CountingSource::not_attempted();
    let resolver = InternalTransferResolver::new(primary.clone(), fallback.clone());

    assert!(resolver
        .get_internal_transfers("Avalanche", TX, None)
        .await
        .is_empty());
    assert_eq!(fallback.calls(), 1);
}
