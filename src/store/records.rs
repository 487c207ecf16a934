//! Persisted row types

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde_json::Value;

/// `fee_data_source` and `ingestion_errors.source` for feed-ingested rows.
pub const FEED_SOURCE: &str = "arkham";

/// `volume_data_source` when the swap legs came from chain data.
pub const RPC_VOLUME_SOURCE: &str = "rpc";

/// One row of `dex_aggregator_revenue`.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestedSwapRecord {
    pub tx_hash: String,
    pub chain: String,
    pub protocol: String,
    pub timestamp: DateTime<Utc>,

    pub actual_fee_usd: Option<BigDecimal>,
    pub fee_token_symbol: Option<String>,
    pub fee_token_address: Option<String>,
    pub fee_amount_raw: Option<String>,
    pub block_number: Option<i64>,
    pub from_address: Option<String>,
    pub to_address: Option<String>,
    pub fee_data_source: String,

    pub swap_volume_usd: Option<BigDecimal>,
    pub token_in_address: Option<String>,
    pub token_in_symbol: Option<String>,
    pub token_in_decimals: Option<i16>,
    pub amount_in: Option<BigDecimal>,
    pub amount_in_raw: Option<String>,
    pub token_out_address: Option<String>,
    pub token_out_symbol: Option<String>,
    pub token_out_decimals: Option<i16>,
    pub amount_out: Option<BigDecimal>,
    pub amount_out_raw: Option<String>,
    pub extraction_method: Option<String>,
    pub volume_data_source: Option<String>,
}

impl IngestedSwapRecord {
    /// Overlay `newer` onto `self` the way the upsert does: fee fields and
    /// protocol are replaced, swap-leg fields only when `newer` has them.
    pub fn merge(&mut self, newer: IngestedSwapRecord) {
        fn keep<T>(current: &mut Option<T>, newer: Option<T>) {
            if newer.is_some() {
                *current = newer;
            }
        }

        self.chain = newer.chain;
        self.protocol = newer.protocol;
        self.timestamp = newer.timestamp;
        self.actual_fee_usd = newer.actual_fee_usd;
        self.fee_token_symbol = newer.fee_token_symbol;
        self.fee_token_address = newer.fee_token_address;
        self.fee_amount_raw = newer.fee_amount_raw;
        self.block_number = newer.block_number;
        self.from_address = newer.from_address;
        self.to_address = newer.to_address;
        self.fee_data_source = newer.fee_data_source;

        keep(&mut self.swap_volume_usd, newer.swap_volume_usd);
        keep(&mut self.token_in_address, newer.token_in_address);
        keep(&mut self.token_in_symbol, newer.token_in_symbol);
        keep(&mut self.token_in_decimals, newer.token_in_decimals);
        keep(&mut self.amount_in, newer.amount_in);
        keep(&mut self.amount_in_raw, newer.amount_in_raw);
        keep(&mut self.token_out_address, newer.token_out_address);
        keep(&mut self.token_out_symbol, newer.token_out_symbol);
        keep(&mut self.token_out_decimals, newer.token_out_decimals);
        keep(&mut self.amount_out, newer.amount_out);
        keep(&mut self.amount_out_raw, newer.amount_out_raw);
        keep(&mut self.extraction_method, newer.extraction_method);
        keep(&mut self.volume_data_source, newer.volume_data_source);
    }
}

/// One row of `ingestion_errors`, unique on `(tx_hash, source)`.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct IngestionErrorRecord {
    pub tx_hash: String,
    pub source: String,
    pub error_type: String,
    pub error_message: String,
    pub retry_count: i32,
    pub last_retry_at: Option<DateTime<Utc>>,
    /// The feed item as received, replayed by the reprocess job
    pub raw_data: Value,
}

impl IngestionErrorRecord {
    /// A fresh quarantine entry with no retries yet.
    pub fn new(
        tx_hash: impl Into<String>,
        error_type: impl Into<String>,
        error_message: impl Into<String>,
        raw_data: Value,
    ) -> Self {
        Self {
            tx_hash: tx_hash.into(),
            source: FEED_SOURCE.to_string(),
            error_type: error_type.into(),
            error_message: error_message.into(),
            retry_count: 0,
            last_retry_at: None,
            raw_data,
        }
    }
}
