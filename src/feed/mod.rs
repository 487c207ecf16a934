//! Inbound transfer feed
//!
//! The feed lists every transfer into the integrator's fee-collection
//! address. Its items are loosely shaped: addresses arrive either as bare
//! strings or as objects carrying entity annotations, amounts as numbers or
//! strings. [`FeedTransfer::from_raw`] is the single place that shape is
//! normalized; everything downstream sees typed fields.

mod arkham;

use std::str::FromStr;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::config::constants::CHAIN_ALIASES;
use crate::errors::FeedError;

pub use arkham::ArkhamFeed;

/// Entity annotation attached to an address by the feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ArkhamEntity {
    /// Entity slug, e.g. `1inch`
    #[serde(default)]
    pub id: Option<String>,
    /// Display name, e.g. `1inch Network`
    #[serde(default)]
    pub name: Option<String>,
}

/// An address as the feed sends it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AddressField {
    /// `"0xabc..."`
    Plain(String),
    /// `{"address": "0xabc...", "arkhamEntity": {...}}`
    Annotated {
        /// The address itself
        #[serde(default)]
        address: String,
        /// Entity annotation, if the feed knows the owner
        #[serde(default, rename = "arkhamEntity")]
        arkham_entity: Option<ArkhamEntity>,
    },
}

/// A normalized feed address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counterparty {
    /// Lowercased address; may be non-EVM on chains the feed covers
    pub address: String,
    /// Entity annotation, if any
    pub entity: Option<ArkhamEntity>,
}

impl From<AddressField> for Counterparty {
    fn from(field: AddressField) -> Self {
        match field {
            AddressField::Plain(address) => Counterparty {
                address: address.to_ascii_lowercase(),
                entity: None,
            },
            AddressField::Annotated {
                address,
                arkham_entity,
            } => Counterparty {
                address: address.to_ascii_lowercase(),
                entity: arkham_entity,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTransfer {
    transaction_hash: Option<String>,
    #[serde(default)]
    from_address: Option<AddressField>,
    #[serde(default)]
    to_address: Option<AddressField>,
    #[serde(default)]
    token_symbol: Option<String>,
    #[serde(default)]
    token_address: Option<String>,
    #[serde(default, rename = "historicalUSD")]
    historical_usd: Option<Value>,
    #[serde(default)]
    unit_value: Option<Value>,
    #[serde(default)]
    chain: Option<String>,
    block_timestamp: Option<String>,
    #[serde(default)]
    block_number: Option<u64>,
}

/// One fee transfer from the feed, normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedTransfer {
    /// Transaction hash as sent by the feed
    pub tx_hash: String,
    /// Normalized chain name (see [`normalize_chain_name`])
    pub chain: String,
    /// Address that paid the fee, usually the aggregator's router
    pub from: Option<Counterparty>,
    /// Fee recipient
    pub to: Option<Counterparty>,
    /// Fee token symbol
    pub token_symbol: Option<String>,
    /// Fee token address, or `NATIVE`
    pub token_address: Option<String>,
    /// Fee value in USD at transfer time
    pub fee_usd: Option<BigDecimal>,
    /// Fee amount in token units, verbatim
    pub unit_value: Option<String>,
    /// Block the transfer was mined in
    pub block_number: Option<u64>,
    /// Block timestamp
    pub timestamp: DateTime<Utc>,
    /// The item exactly as received, kept for quarantine replay
    pub raw: Value,
}

impl FeedTransfer {
    /// Normalize one raw feed item.
    ///
    /// # Errors
    ///
    /// [`FeedError::Decode`] if the item has no transaction hash or does not
    /// have the expected shape. A missing or unreadable `blockTimestamp` is
    /// replaced with the current time.
    pub fn from_raw(raw: Value) -> Result<Self, FeedError> {
        let decode = |details: String| FeedError::Decode { offset: 0, details };

        let item: RawTransfer =
            serde_json::from_value(raw.clone()).map_err(|e| decode(e.to_string()))?;
        let tx_hash = item
            .transaction_hash
            .filter(|hash| !hash.is_empty())
            .ok_or_else(|| decode("missing transactionHash".into()))?;
        let timestamp = match item.block_timestamp.as_deref().and_then(parse_timestamp) {
            Some(timestamp) => timestamp,
            None => {
                warn!(
                    tx_hash = %tx_hash,
                    block_timestamp = ?item.block_timestamp,
                    "Unreadable blockTimestamp, using current time"
                );
                Utc::now()
            }
        };

        Ok(Self {
            tx_hash,
            chain: normalize_chain_name(item.chain.as_deref().unwrap_or_default()),
            from: item.from_address.map(Counterparty::from),
            to: item.to_address.map(Counterparty::from),
            token_symbol: item.token_symbol,
            token_address: item.token_address.filter(|a| !a.is_empty()),
            fee_usd: item.historical_usd.as_ref().and_then(decimal_from_json),
            unit_value: item.unit_value.as_ref().and_then(string_from_json),
            block_number: item.block_number,
            timestamp,
            raw,
        })
    }
}

/// Map a feed chain identifier to the name used for chain lookups.
///
/// Unknown identifiers are capitalized; an empty one becomes `Unknown`.
pub fn normalize_chain_name(raw: &str) -> String {
    let lower = raw.trim().to_ascii_lowercase();
    if lower.is_empty() {
        return "Unknown".to_string();
    }
    if let Some((_, name)) = CHAIN_ALIASES.iter().find(|(alias, _)| *alias == lower) {
        return (*name).to_string();
    }
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Parse an ISO-8601 block timestamp. A missing offset is read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn decimal_from_json(value: &Value) -> Option<BigDecimal> {
    match value {
        Value::Number(number) => BigDecimal::from_str(&number.to_string()).ok(),
        Value::String(text) => BigDecimal::from_str(text.trim()).ok(),
        _ => None,
    }
}

fn string_from_json(value: &Value) -> Option<String> {
    match value {
        Value::Number(number) => Some(number.to_string()),
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        _ => None,
    }
}

/// A source of fee transfers, newest first.
#[async_trait]
pub trait TransferSource: Send + Sync {
    /// Fetch transfers. With `since`, stop at the first transfer at or before it.
    ///
    /// # Errors
    ///
    /// Any [`FeedError`]; the run cannot continue without the feed.
    async fn fetch_transfers(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<FeedTransfer>, FeedError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chain_aliases() {
        assert_eq!(normalize_chain_name("arbitrum_one"), "Arbitrum");
        assert_eq!(normalize_chain_name("binance-smart-chain"), "BSC");
        assert_eq!(normalize_chain_name("Polygon-POS"), "Polygon");
        assert_eq!(normalize_chain_name("fantom"), "Fantom");
        assert_eq!(normalize_chain_name(""), "Unknown");
    }

    #[test]
    fn test_address_field_shapes() {
        let plain: AddressField = serde_json::from_value(json!("0xABC")).unwrap();
        assert_eq!(
            Counterparty::from(plain),
            Counterparty {
                address: "0xabc".into(),
                entity: None
            }
        );

        let annotated: AddressField = serde_json::from_value(json!({
            "address": "0xDEF",
            "chain": "ethereum",
            "arkhamEntity": { "id": "1inch", "name": "1inch Network", "type": "dex" }
        }))
        .unwrap();
        let counterparty = Counterparty::from(annotated);
        assert_eq!(counterparty.address, "0xdef");
        assert_eq!(counterparty.entity.unwrap().id.as_deref(), Some("1inch"));
    }

    #[test]
    fn test_feed_transfer_from_raw() {
        let raw = json!({
            "transactionHash": "0xaaa",
            "fromAddress": { "address": "0x1111111254EEB25477B68FB85ED929F73A960582" },
            "toAddress": "0xa4a4f610e89488eb4ecc6c63069f241a54485269",
            "tokenSymbol": "USDC",
            "tokenAddress": "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
            "historicalUSD": 12.5,
            "unitValue": 12.5,
            "chain": "ethereum",
            "blockTimestamp": "2024-05-01T12:00:00Z",
            "blockNumber": 19_000_000
        });

        let transfer = FeedTransfer::from_raw(raw.clone()).unwrap();
        assert_eq!(transfer.chain, "Ethereum");
        assert_eq!(transfer.fee_usd, Some(BigDecimal::from_str("12.5").unwrap()));
        assert_eq!(transfer.unit_value.as_deref(), Some("12.5"));
        assert_eq!(transfer.block_number, Some(19_000_000));
        assert_eq!(transfer.timestamp.to_rfc3339(), "2024-05-01T12:00:00+00:00");
        assert_eq!(
            transfer.from.unwrap().address,
            "0x1111111254eeb25477b68fb85ed929f73a960582"
        );
        assert_eq!(transfer.raw, raw);
    }

    #[test]
    fn test_missing_hash_is_decode_error() {
        let err = FeedTransfer::from_raw(json!({ "blockTimestamp": "2024-05-01T12:00:00Z" }))
            .unwrap_err();
        assert!(matches!(err, FeedError::Decode { .. }));
    }

    #[test]
    fn test_unreadable_timestamp_defaults_to_now() {
        let before = Utc::now();
        for raw in [
            json!({ "transactionHash": "0xbbb", "chain": "base" }),
            json!({ "transactionHash": "0xbbb", "chain": "base", "blockTimestamp": "yesterday" }),
        ] {
            let transfer = FeedTransfer::from_raw(raw.clone()).unwrap();
            assert_eq!(transfer.tx_hash, "0xbbb");
            assert!(transfer.timestamp >= before);
            assert_eq!(transfer.raw, raw);
        }
    }

    #[test]
    fn test_timestamp_without_offset() {
        let parsed = parse_timestamp("2024-05-01T12:00:00.250").unwrap();
        assert_eq!(parsed.timestamp_millis() % 1000, 250);
        assert!(parse_timestamp("yesterday").is_none());
    }
}
