// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for batch ingestion
//!
//! Batches run against a scripted extractor and the in-memory store, covering
//! per-transaction quarantine, upsert merging and incremental feed reads.

mod helpers;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use bigdecimal::BigDecimal;
use helpers::{feed_transfer, tx_hash, usdc_to_native, FixedFeed, ScriptedExtractor};
use swapscan::config::default_chains;
use swapscan::{
    IngestionPipeline, MemoryStore, SwapLegSource, SwapStore, SwapscanConfig,
    SwapscanConfigBuilder, SwapscanError,
};

fn pipeline(
    feed: Arc<FixedFeed>,
    extractor: Arc<ScriptedExtractor>,
    store: Arc<MemoryStore>,
) -> IngestionPipeline {
    IngestionPipeline::new(
        feed,
        extractor,
        store,
        &default_chains(),
        &SwapscanConfig::minimal(),
    )
}

#[tokio::test]
async fn test_batch_quarantines_failures_and_continues() {
    let (first, second, third) = (tx_hash(1), tx_hash(2), tx_hash(3));
    let feed = Arc::new(FixedFeed::new(vec![
        feed_transfer(&first, "ethereum", "1.5", "2024-05-01T10:00:00Z"),
        feed_transfer(&second, "fantom", "0.7", "2024-05-01T09:00:00Z"),
        feed_transfer(&third, "ethereum", "2.0", "2024-05-01T08:00:00Z"),
    ]));
    let extractor = Arc::new(
        ScriptedExtractor::new()
            .with_legs(&first, usdc_to_native())
            .with_legs(&third, usdc_to_native()),
    );
    let store = Arc::new(MemoryStore::new());
    store.fail_upserts_for(third.clone());

    let summary = pipeline(feed, extractor, Arc::clone(&store))
        .run_full()
        .await
        .unwrap();

    assert_eq!(summary.fetched, 3);
    assert_eq!(summary.stored, 1);
    assert_eq!(summary.quarantined, 2);
    assert_eq!(summary.lost, 0);

    let swaps = store.swaps();
    assert_eq!(swaps.len(), 1);
    assert_eq!(swaps[0].tx_hash, first);

    let mut errors = store.errors();
    errors.sort_by(|a, b| a.tx_hash.cmp(&b.tx_hash));
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].tx_hash, second);
    assert_eq!(errors[0].error_type, "unsupported_chain");
    assert_eq!(errors[1].tx_hash, third);
    assert_eq!(errors[1].error_type, "persistence_error");
    assert!(errors.iter().all(|e| e.retry_count == 0 && e.source == "arkham"));
    assert_eq!(errors[0].raw_data["chain"], "fantom");
}

#[tokio::test]
async fn test_stored_record_carries_attribution_and_legs() {
    let hash = tx_hash(4);
    let feed = Arc::new(FixedFeed::new(vec![feed_transfer(
        &hash,
        "ethereum",
        "5",
        "2024-05-01T10:00:00Z",
    )]));
    let extractor = Arc::new(ScriptedExtractor::new().with_legs(&hash, usdc_to_native()));
    let store = Arc::new(MemoryStore::new());

    let summary = pipeline(feed, extractor, Arc::clone(&store))
        .run_full()
        .await
        .unwrap();
    assert_eq!(summary.with_legs, 1);

    let record = store.swap(&hash).unwrap();
    assert_eq!(record.chain, "Ethereum");
    assert_eq!(record.protocol, "1inch");
    assert_eq!(record.token_in_symbol.as_deref(), Some("USDC"));
    assert_eq!(record.amount_in, Some(BigDecimal::from(1000)));
    assert_eq!(record.token_out_address.as_deref(), Some("NATIVE"));
    assert_eq!(record.token_out_symbol.as_deref(), Some("ETH"));
    assert_eq!(record.amount_out, Some(BigDecimal::from_str("0.4").unwrap()));
    assert_eq!(record.swap_volume_usd, Some(BigDecimal::from(1000)));
    assert_eq!(record.extraction_method.as_deref(), Some("logs+trace"));
    assert_eq!(record.volume_data_source.as_deref(), Some("rpc"));
    assert_eq!(record.fee_data_source, "arkham");
}

#[tokio::test]
async fn test_reingest_keeps_one_row_with_latest_fee() {
    let hash = tx_hash(5);
    let store = Arc::new(MemoryStore::new());

    let with_legs = Arc::new(ScriptedExtractor::new().with_legs(&hash, usdc_to_native()));
    pipeline(
        Arc::new(FixedFeed::new(vec![feed_transfer(
            &hash,
            "ethereum",
            "1.25",
            "2024-05-01T10:00:00Z",
        )])),
        with_legs,
        Arc::clone(&store),
    )
    .run_full()
    .await
    .unwrap();

    // Second pass extracts nothing; the legs from the first pass must survive
    pipeline(
        Arc::new(FixedFeed::new(vec![feed_transfer(
            &hash,
            "ethereum",
            "3.75",
            "2024-05-01T10:00:00Z",
        )])),
        Arc::new(ScriptedExtractor::new()),
        Arc::clone(&store),
    )
    .run_full()
    .await
    .unwrap();

    let swaps = store.swaps();
    assert_eq!(swaps.len(), 1);
    assert_eq!(
        swaps[0].actual_fee_usd,
        Some(BigDecimal::from_str("3.75").unwrap())
    );
    assert_eq!(swaps[0].token_in_symbol.as_deref(), Some("USDC"));
    assert_eq!(swaps[0].extraction_method.as_deref(), Some("logs+trace"));
}

#[tokio::test]
async fn test_failed_transaction_writes_no_swap_row() {
    let hash = tx_hash(6);
    let store = Arc::new(MemoryStore::new());
    let extractor = Arc::new(ScriptedExtractor::new().with_timeout(&hash));
    let feed = Arc::new(FixedFeed::new(vec![feed_transfer(
        &hash,
        "bsc",
        "0.4",
        "2024-05-01T10:00:00Z",
    )]));

    let pipeline = pipeline(feed, extractor, Arc::clone(&store));
    pipeline.run_full().await.unwrap();
    pipeline.run_full().await.unwrap();

    assert!(store.swaps().is_empty());
    let errors = store.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].error_type, "provider_timeout");
    assert_eq!(errors[0].retry_count, 0);
}

#[tokio::test]
async fn test_no_swap_still_stores_fee_row() {
    let hash = tx_hash(7);
    let store = Arc::new(MemoryStore::new());
    let feed = Arc::new(FixedFeed::new(vec![feed_transfer(
        &hash,
        "polygon",
        "0.9",
        "2024-05-01T10:00:00Z",
    )]));

    let summary = pipeline(feed, Arc::new(ScriptedExtractor::new()), Arc::clone(&store))
        .run_full()
        .await
        .unwrap();

    assert_eq!(summary.stored, 1);
    assert_eq!(summary.with_legs, 0);
    let record = store.swap(&hash).unwrap();
    assert!(record.token_in_address.is_none());
    assert!(record.swap_volume_usd.is_none());
    assert!(record.volume_data_source.is_none());
}

#[tokio::test]
async fn test_invalid_hash_is_quarantined_without_extraction() {
    let store = Arc::new(MemoryStore::new());
    let extractor = Arc::new(ScriptedExtractor::new());
    let feed = Arc::new(FixedFeed::new(vec![feed_transfer(
        "0xnot-a-hash",
        "ethereum",
        "1",
        "2024-05-01T10:00:00Z",
    )]));

    pipeline(feed, Arc::clone(&extractor), Arc::clone(&store))
        .run_full()
        .await
        .unwrap();

    assert_eq!(extractor.calls(), 0);
    let errors = store.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].error_type, "decode_failure");
}

#[tokio::test]
async fn test_incremental_run_reads_since_latest_timestamp() {
    let (old, new) = (tx_hash(8), tx_hash(9));
    let store = Arc::new(MemoryStore::new());
    let extractor = Arc::new(ScriptedExtractor::new());

    let first = Arc::new(FixedFeed::new(vec![feed_transfer(
        &old,
        "ethereum",
        "1",
        "2024-05-01T10:00:00Z",
    )]));
    pipeline(Arc::clone(&first), Arc::clone(&extractor), Arc::clone(&store))
        .run_incremental()
        .await
        .unwrap();
    assert_eq!(first.requests(), vec![None]);

    let second = Arc::new(FixedFeed::new(vec![
        feed_transfer(&new, "ethereum", "1", "2024-05-02T10:00:00Z"),
        feed_transfer(&old, "ethereum", "1", "2024-05-01T10:00:00Z"),
    ]));
    let summary = pipeline(Arc::clone(&second), Arc::clone(&extractor), Arc::clone(&store))
        .run_incremental()
        .await
        .unwrap();

    let since = second.requests()[0].unwrap();
    assert_eq!(since.to_rfc3339(), "2024-05-01T10:00:00+00:00");
    assert_eq!(summary.fetched, 1);
    assert_eq!(store.swaps().len(), 2);
}

#[tokio::test]
async fn test_feed_failure_aborts_run() {
    let store = Arc::new(MemoryStore::new());
    let result = pipeline(
        Arc::new(FixedFeed::unavailable()),
        Arc::new(ScriptedExtractor::new()),
        Arc::clone(&store),
    )
    .run_full()
    .await;

    assert!(matches!(result, Err(SwapscanError::Feed(_))));
    assert!(store.errors().is_empty());
}

#[tokio::test]
async fn test_cancelled_batch_starts_nothing() {
    let store = Arc::new(MemoryStore::new());
    let extractor = Arc::new(ScriptedExtractor::new());
    let transfers: Vec<_> = (10..14)
        .map(|n| feed_transfer(&tx_hash(n), "ethereum", "1", "2024-05-01T10:00:00Z"))
        .collect();

    let pipeline = pipeline(
        Arc::new(FixedFeed::new(Vec::new())),
        Arc::clone(&extractor),
        Arc::clone(&store),
    );
    pipeline
        .cancel_handle()
        .store(true, std::sync::atomic::Ordering::Relaxed);
    let summary = pipeline.process_batch(transfers).await;

    assert_eq!(summary.fetched, 4);
    assert_eq!(summary.skipped, 4);
    assert_eq!(extractor.calls(), 0);
    assert!(store.swaps().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_mid_batch_finishes_in_flight_work() {
    let store = Arc::new(MemoryStore::new());
    let extractor = Arc::new(ScriptedExtractor::new().with_delay(Duration::from_secs(10)));
    let transfers: Vec<_> = (20..26)
        .map(|n| feed_transfer(&tx_hash(n), "ethereum", "1", "2024-05-01T10:00:00Z"))
        .collect();

    let pipeline = IngestionPipeline::new(
        Arc::new(FixedFeed::new(Vec::new())),
        Arc::clone(&extractor) as Arc<dyn SwapLegSource>,
        Arc::clone(&store) as Arc<dyn SwapStore>,
        &default_chains(),
        &SwapscanConfigBuilder::new().worker_concurrency(2).build(),
    );
    let cancel = pipeline.cancel_handle();
    // Lands while the second pair of transactions is being extracted
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(15)).await;
        cancel.store(true, std::sync::atomic::Ordering::Relaxed);
    });

    let summary = pipeline.process_batch(transfers).await;

    assert_eq!(summary.fetched, 6);
    assert_eq!(summary.stored, 4);
    assert_eq!(summary.skipped, 2);
    assert_eq!(extractor.calls(), 4);
    assert_eq!(store.swaps().len(), 4);
}
