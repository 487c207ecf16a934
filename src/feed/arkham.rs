// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use alloy_primitives::Address;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn, Instrument};

use super::{FeedTransfer, TransferSource};
use crate::config::SwapscanConfig;
use crate::errors::FeedError;
use crate::tracing::spans;

#[derive(Debug, Deserialize)]
struct TransfersPage {
    #[serde(default)]
    transfers: Vec<Value>,
}

/// Offset-paginated client for the Arkham `/transfers` endpoint.
///
/// Pages are fetched strictly one after another with a fixed pause between
/// them.
#[derive(Debug, Clone)]
pub struct ArkhamFeed {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    integrator: Address,
    page_size: usize,
    page_delay: Duration,
}

impl ArkhamFeed {
    /// Create a feed client for transfers into `config.fee_collector`.
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        config: &SwapscanConfig,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            integrator: config.fee_collector,
            page_size: config.feed_page_size.max(1),
            page_delay: config.feed_page_delay,
        }
    }

    /// Fetch the raw items of one page.
    ///
    /// # Errors
    ///
    /// [`FeedError`] on transport failure, non-2xx status or an undecodable body.
    pub async fn fetch_page(&self, offset: usize) -> Result<Vec<Value>, FeedError> {
        let span = spans::fetch_feed_page(offset, self.page_size);
        async move {
            let response = self
                .http
                .get(format!("{}/transfers", self.base_url))
                .header("Accept", "application/json")
                .header("API-Key", &self.api_key)
                .query(&[
                    ("base", self.integrator.to_string()),
                    ("limit", self.page_size.to_string()),
                    ("offset", offset.to_string()),
                ])
                .send()
                .await
                .map_err(|e| FeedError::transport(offset, e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(FeedError::Status {
                    offset,
                    status: status.as_u16(),
                });
            }

            let page: TransfersPage = response.json().await.map_err(|e| FeedError::Decode {
                offset,
                details: e.to_string(),
            })?;
            debug!(items = page.transfers.len(), "Fetched feed page");
            Ok(page.transfers)
        }
        .instrument(span)
        .await
    }
}

/// Outcome of folding one page into the collected transfers.
#[derive(Debug, PartialEq, Eq)]
enum PageOutcome {
    /// Keep paginating
    Continue,
    /// Reached already-stored transfers, an empty page or a short page
    Done,
}

/// Normalize a page's items into `out`, stopping at the first item at or
/// before `since`. Malformed items are logged and skipped.
fn collect_page(
    items: Vec<Value>,
    page_size: usize,
    offset: usize,
    since: Option<DateTime<Utc>>,
    out: &mut Vec<FeedTransfer>,
) -> PageOutcome {
    if items.is_empty() {
        return PageOutcome::Done;
    }
    let full_page = items.len() >= page_size;

    for (index, item) in items.into_iter().enumerate() {
        let transfer = match FeedTransfer::from_raw(item) {
            Ok(transfer) => transfer,
            Err(error) => {
                warn!(offset = offset + index, error = %error, "Skipping malformed feed item");
                continue;
            }
        };
        if since.is_some_and(|since| transfer.timestamp <= since) {
            info!(timestamp = %transfer.timestamp, "Reached stored transfers");
            return PageOutcome::Done;
        }
        out.push(transfer);
    }

    if full_page {
        PageOutcome::Continue
    } else {
        PageOutcome::Done
    }
}

#[async_trait]
impl TransferSource for ArkhamFeed {
    async fn fetch_transfers(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<FeedTransfer>, FeedError> {
        let mut transfers = Vec::new();
        let mut offset = 0;

        loop {
            let items = self.fetch_page(offset).await?;
            let fetched = items.len();
            if collect_page(items, self.page_size, offset, since, &mut transfers)
                == PageOutcome::Done
            {
                break;
            }
            offset += fetched;
            tokio::time::sleep(self.page_delay).await;
        }

        info!(
            count = transfers.len(),
            incremental = since.is_some(),
            "Fetched feed transfers"
        );
        Ok(transfers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(hash: &str, timestamp: &str) -> Value {
        json!({
            "transactionHash": hash,
            "chain": "base",
            "blockTimestamp": timestamp,
            "historicalUSD": 1.0
        })
    }

    #[test]
    fn test_full_page_continues() {
        let mut out = Vec::new();
        let items = vec![
            item("0x1", "2024-05-02T00:00:00Z"),
            item("0x2", "2024-05-01T00:00:00Z"),
        ];
        assert_eq!(collect_page(items, 2, 0, None, &mut out), PageOutcome::Continue);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_short_and_empty_pages_stop() {
        let mut out = Vec::new();
        let items = vec![item("0x1", "2024-05-02T00:00:00Z")];
        assert_eq!(collect_page(items, 2, 0, None, &mut out), PageOutcome::Done);
        assert_eq!(collect_page(vec![], 2, 1, None, &mut out), PageOutcome::Done);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_incremental_stop_at_stored_timestamp() {
        let since = "2024-05-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let mut out = Vec::new();
        let items = vec![
            item("0x3", "2024-05-03T00:00:00Z"),
            item("0x2", "2024-05-01T00:00:00Z"),
            item("0x1", "2024-04-30T00:00:00Z"),
        ];
        assert_eq!(collect_page(items, 3, 0, Some(since), &mut out), PageOutcome::Done);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].tx_hash, "0x3");
    }

    #[test]
    fn test_malformed_items_are_skipped() {
        let mut out = Vec::new();
        let items = vec![json!({ "chain": "base" }), item("0x1", "2024-05-02T00:00:00Z")];
        assert_eq!(collect_page(items, 2, 0, None, &mut out), PageOutcome::Continue);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_item_without_timestamp_is_kept() {
        let mut out = Vec::new();
        let items = vec![
            json!({ "transactionHash": "0x9", "chain": "base", "historicalUSD": 2.0 }),
            item("0x1", "2024-05-02T00:00:00Z"),
        ];
        let since = "2024-05-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(collect_page(items, 2, 0, Some(since), &mut out), PageOutcome::Continue);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].tx_hash, "0x9");
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let feed = ArkhamFeed::new(
            reqwest::Client::new(),
            "https://api.example/",
            "key",
            &SwapscanConfig::default(),
        );
        assert_eq!(feed.base_url, "https://api.example");
        assert_eq!(feed.page_size, 1000);
    }
}
