use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info};

use super::{IngestedSwapRecord, IngestionErrorRecord, SwapStore, FEED_SOURCE};
use crate::errors::StoreError;

const CREATE_REVENUE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS dex_aggregator_revenue (
    id                  BIGSERIAL PRIMARY KEY,
    tx_hash             TEXT NOT NULL UNIQUE,
    chain               TEXT NOT NULL,
    protocol            TEXT NOT NULL,
    timestamp           TIMESTAMPTZ NOT NULL,
    actual_fee_usd      NUMERIC,
    fee_token_symbol    TEXT,
    fee_token_address   TEXT,
    fee_amount_raw      TEXT,
    block_number        BIGINT,
    from_address        TEXT,
    to_address          TEXT,
    fee_data_source     TEXT NOT NULL,
    swap_volume_usd     NUMERIC,
    token_in_address    TEXT,
    token_in_symbol     TEXT,
    token_in_decimals   SMALLINT,
    amount_in           NUMERIC,
    amount_in_raw       TEXT,
    token_out_address   TEXT,
    token_out_symbol    TEXT,
    token_out_decimals  SMALLINT,
    amount_out          NUMERIC,
    amount_out_raw      TEXT,
    extraction_method   TEXT,
    volume_data_source  TEXT,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW()
)"#;

const CREATE_ERRORS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS ingestion_errors (
    id              BIGSERIAL PRIMARY KEY,
    tx_hash         TEXT NOT NULL,
    source          TEXT NOT NULL,
    error_type      TEXT NOT NULL,
    error_message   TEXT NOT NULL,
    retry_count     INTEGER NOT NULL DEFAULT 0,
    last_retry_at   TIMESTAMPTZ,
    raw_data        JSONB NOT NULL,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (tx_hash, source)
)"#;

const UPSERT_SWAP: &str = r#"
INSERT INTO dex_aggregator_revenue (
    tx_hash, chain, protocol, timestamp,
    actual_fee_usd, fee_token_symbol, fee_token_address, fee_amount_raw,
    block_number, from_address, to_address, fee_data_source,
    swap_volume_usd,
    token_in_address, token_in_symbol, token_in_decimals, amount_in, amount_in_raw,
    token_out_address, token_out_symbol, token_out_decimals, amount_out, amount_out_raw,
    extraction_method, volume_data_source
) VALUES (
    $1, $2, $3, $4,
    $5, $6, $7, $8,
    $9, $10, $11, $12,
    $13,
    $14, $15, $16, $17, $18,
    $19, $20, $21, $22, $23,
    $24, $25
)
ON CONFLICT (tx_hash) DO UPDATE SET
    chain = EXCLUDED.chain,
    protocol = EXCLUDED.protocol,
    timestamp = EXCLUDED.timestamp,
    actual_fee_usd = EXCLUDED.actual_fee_usd,
    fee_token_symbol = EXCLUDED.fee_token_symbol,
    fee_token_address = EXCLUDED.fee_token_address,
    fee_amount_raw = EXCLUDED.fee_amount_raw,
    block_number = EXCLUDED.block_number,
    from_address = EXCLUDED.from_address,
    to_address = EXCLUDED.to_address,
    fee_data_source = EXCLUDED.fee_data_source,
    swap_volume_usd = COALESCE(EXCLUDED.swap_volume_usd, dex_aggregator_revenue.swap_volume_usd),
    token_in_address = COALESCE(EXCLUDED.token_in_address, dex_aggregator_revenue.token_in_address),
    token_in_symbol = COALESCE(EXCLUDED.token_in_symbol, dex_aggregator_revenue.token_in_symbol),
    token_in_decimals = COALESCE(EXCLUDED.token_in_decimals, dex_aggregator_revenue.token_in_decimals),
    amount_in = COALESCE(EXCLUDED.amount_in, dex_aggregator_revenue.amount_in),
    amount_in_raw = COALESCE(EXCLUDED.amount_in_raw, dex_aggregator_revenue.amount_in_raw),
    token_out_address = COALESCE(EXCLUDED.token_out_address, dex_aggregator_revenue.token_out_address),
    token_out_symbol = COALESCE(EXCLUDED.token_out_symbol, dex_aggregator_revenue.token_out_symbol),
    token_out_decimals = COALESCE(EXCLUDED.token_out_decimals, dex_aggregator_revenue.token_out_decimals),
    amount_out = COALESCE(EXCLUDED.amount_out, dex_aggregator_revenue.amount_out),
    amount_out_raw = COALESCE(EXCLUDED.amount_out_raw, dex_aggregator_revenue.amount_out_raw),
    extraction_method = COALESCE(EXCLUDED.extraction_method, dex_aggregator_revenue.extraction_method),
    volume_data_source = COALESCE(EXCLUDED.volume_data_source, dex_aggregator_revenue.volume_data_source),
    updated_at = NOW()
"#;

const UPSERT_ERROR: &str = r#"
INSERT INTO ingestion_errors (tx_hash, source, error_type, error_message, raw_data, retry_count)
VALUES ($1, $2, $3, $4, $5, 0)
ON CONFLICT (tx_hash, source) DO UPDATE SET
    error_type = EXCLUDED.error_type,
    error_message = EXCLUDED.error_message,
    raw_data = EXCLUDED.raw_data
"#;

/// PostgreSQL-backed [`SwapStore`].
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `database_url` with a pool sized for `max_connections` workers.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Create both tables if they do not exist.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_REVENUE_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_ERRORS_TABLE).execute(&self.pool).await?;
        info!("Schema ready");
        Ok(())
    }
}

/// Unique violations surface as constraint errors, not generic database errors.
fn classify(error: sqlx::Error) -> StoreError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() || db.is_check_violation() => {
            StoreError::constraint(db.message().to_string())
        }
        _ => StoreError::Database(error),
    }
}

#[async_trait]
impl SwapStore for PgStore {
    async fn upsert_swap(&self, record: &IngestedSwapRecord) -> Result<(), StoreError> {
        sqlx::query(UPSERT_SWAP)
            .bind(&record.tx_hash)
            .bind(&record.chain)
            .bind(&record.protocol)
            .bind(record.timestamp)
            .bind(&record.actual_fee_usd)
            .bind(&record.fee_token_symbol)
            .bind(&record.fee_token_address)
            .bind(&record.fee_amount_raw)
            .bind(record.block_number)
            .bind(&record.from_address)
            .bind(&record.to_address)
            .bind(&record.fee_data_source)
            .bind(&record.swap_volume_usd)
            .bind(&record.token_in_address)
            .bind(&record.token_in_symbol)
            .bind(record.token_in_decimals)
            .bind(&record.amount_in)
            .bind(&record.amount_in_raw)
            .bind(&record.token_out_address)
            .bind(&record.token_out_symbol)
            .bind(record.token_out_decimals)
            .bind(&record.amount_out)
            .bind(&record.amount_out_raw)
            .bind(&record.extraction_method)
            .bind(&record.volume_data_source)
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        debug!(tx_hash = %record.tx_hash, protocol = %record.protocol, "Upserted swap");
        Ok(())
    }

    async fn record_error(&self, record: &IngestionErrorRecord) -> Result<(), StoreError> {
        sqlx::query(UPSERT_ERROR)
            .bind(&record.tx_hash)
            .bind(&record.source)
            .bind(&record.error_type)
            .bind(&record.error_message)
            .bind(&record.raw_data)
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn retryable_errors(
        &self,
        max_attempts: i32,
        limit: i64,
    ) -> Result<Vec<IngestionErrorRecord>, StoreError> {
        let rows = sqlx::query_as::<_, IngestionErrorRecord>(
            "SELECT tx_hash, source, error_type, error_message, retry_count, last_retry_at, raw_data
             FROM ingestion_errors
             WHERE retry_count < $1 AND source = $2
             ORDER BY created_at ASC
             LIMIT $3",
        )
        .bind(max_attempts)
        .bind(FEED_SOURCE)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn mark_retry(
        &self,
        tx_hash: &str,
        source: &str,
        error_type: &str,
        error_message: &str,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE ingestion_errors
             SET retry_count = retry_count + 1,
                 last_retry_at = NOW(),
                 error_type = $3,
                 error_message = $4
             WHERE tx_hash = $1 AND source = $2",
        )
        .bind(tx_hash)
        .bind(source)
        .bind(error_type)
        .bind(error_message)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn clear_error(&self, tx_hash: &str, source: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM ingestion_errors WHERE tx_hash = $1 AND source = $2")
            .bind(tx_hash)
            .bind(source)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn trusted_protocol_for(&self, tx_hash: &str) -> Result<Option<String>, StoreError> {
        let found = sqlx::query(
            "SELECT 1 FROM swaps WHERE source = '1inch' AND LOWER(tx_hash) = LOWER($1) LIMIT 1",
        )
        .bind(tx_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(found.map(|_| "1inch".to_string()))
    }

    async fn latest_fee_timestamp(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        let latest: Option<DateTime<Utc>> = sqlx::query_scalar(
            "SELECT MAX(timestamp) FROM dex_aggregator_revenue WHERE fee_data_source = $1",
        )
        .bind(FEED_SOURCE)
        .fetch_one(&self.pool)
        .await?;
        Ok(latest)
    }
}
