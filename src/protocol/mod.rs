//! Protocol attribution
//!
//! Every fee transfer is attributed to exactly one aggregator protocol. The
//! signals are tried in order and the first one that matches wins:
//!
//! 1. entity annotation on the fee payer (from the feed)
//! 2. the fee payer's address in the known router table
//! 3. the transaction already present in the trusted 1inch stream
//! 4. `other`
//!
//! Attribution never fails. A store error during step 3 is logged and the
//! chain falls through to the default.

use std::collections::HashMap;
use std::fmt;

use alloy_primitives::Address;
use tracing::{debug, warn};

use crate::config::constants::routers;
use crate::feed::{ArkhamEntity, Counterparty, FeedTransfer};
use crate::store::SwapStore;

/// Aggregator protocols the dashboard distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    OneInch,
    Paraswap,
    CowSwap,
    Matcha,
    ZeroX,
    Other,
}

impl Protocol {
    /// Persisted label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::OneInch => "1inch",
            Protocol::Paraswap => "paraswap",
            Protocol::CowSwap => "cowswap",
            Protocol::Matcha => "matcha",
            Protocol::ZeroX => "0x",
            Protocol::Other => "other",
        }
    }

    /// Parse a persisted label. Unknown labels are `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "1inch" => Some(Protocol::OneInch),
            "paraswap" => Some(Protocol::Paraswap),
            "cowswap" => Some(Protocol::CowSwap),
            "matcha" => Some(Protocol::Matcha),
            "0x" => Some(Protocol::ZeroX),
            "other" => Some(Protocol::Other),
            _ => None,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which signal produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSignal {
    EntityMetadata,
    RouterAddress,
    DbLookup,
    Default,
}

/// The attribution for one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolMatch {
    pub protocol: Protocol,
    pub signal: MatchSignal,
}

/// Map an entity annotation to a protocol by keyword.
pub fn match_entity(entity: &ArkhamEntity) -> Option<Protocol> {
    let id = entity.id.as_deref().unwrap_or_default().to_lowercase();
    let name = entity.name.as_deref().unwrap_or_default().to_lowercase();

    if id.contains("1inch") || name.contains("1inch") {
        Some(Protocol::OneInch)
    } else if id.contains("paraswap") || name.contains("paraswap") {
        Some(Protocol::Paraswap)
    } else if id.contains("cow") || name.contains("cowswap") {
        Some(Protocol::CowSwap)
    } else if id.contains("matcha") || name.contains("0x") {
        Some(Protocol::Matcha)
    } else {
        None
    }
}

/// Attributes fee transfers to protocols.
#[derive(Debug, Clone)]
pub struct ProtocolIdentifier {
    routers: HashMap<Address, Protocol>,
}

impl Default for ProtocolIdentifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolIdentifier {
    /// Identifier with the built-in router table.
    pub fn new() -> Self {
        let routers = [
            (routers::ONEINCH_V5, Protocol::OneInch),
            (routers::ONEINCH_V6, Protocol::OneInch),
            (routers::ONEINCH_V4, Protocol::OneInch),
            (routers::PARASWAP_AUGUSTUS_V5, Protocol::Paraswap),
            (routers::PARASWAP_TRANSFER_PROXY, Protocol::Paraswap),
            (routers::COWSWAP_SETTLEMENT, Protocol::CowSwap),
            (routers::ZEROX_EXCHANGE_PROXY, Protocol::ZeroX),
        ];
        Self {
            routers: routers.into_iter().collect(),
        }
    }

    /// Look up a counterparty address in the router table.
    pub fn match_router(&self, address: &str) -> Option<Protocol> {
        let address = address.parse::<Address>().ok()?;
        self.routers.get(&address).copied()
    }

    /// Signals 1 and 2, which need no I/O.
    pub fn match_offline(&self, payer: Option<&Counterparty>) -> Option<ProtocolMatch> {
        let payer = payer?;
        if let Some(protocol) = payer.entity.as_ref().and_then(match_entity) {
            return Some(ProtocolMatch {
                protocol,
                signal: MatchSignal::EntityMetadata,
            });
        }
        self.match_router(&payer.address)
            .map(|protocol| ProtocolMatch {
                protocol,
                signal: MatchSignal::RouterAddress,
            })
    }

    /// Combine the offline signals with a trusted-stream label.
    pub fn classify(
        &self,
        payer: Option<&Counterparty>,
        trusted_label: Option<&str>,
    ) -> ProtocolMatch {
        if let Some(found) = self.match_offline(payer) {
            return found;
        }
        match trusted_label.and_then(Protocol::from_label) {
            Some(protocol) if protocol != Protocol::Other => ProtocolMatch {
                protocol,
                signal: MatchSignal::DbLookup,
            },
            _ => ProtocolMatch {
                protocol: Protocol::Other,
                signal: MatchSignal::Default,
            },
        }
    }

    /// Attribute one feed transfer. The store is only queried when the
    /// offline signals do not match.
    pub async fn identify<S>(&self, transfer: &FeedTransfer, store: &S) -> ProtocolMatch
    where
        S: SwapStore + ?Sized,
    {
        let payer = transfer.from.as_ref();
        if let Some(found) = self.match_offline(payer) {
            debug!(
                tx_hash = %transfer.tx_hash,
                protocol = %found.protocol,
                signal = ?found.signal,
                "Protocol identified"
            );
            return found;
        }

        let trusted = match store.trusted_protocol_for(&transfer.tx_hash).await {
            Ok(label) => label,
            Err(error) => {
                warn!(tx_hash = %transfer.tx_hash, error = %error, "Trusted-stream lookup failed");
                None
            }
        };
        let found = self.classify(None, trusted.as_deref());
        debug!(
            tx_hash = %transfer.tx_hash,
            protocol = %found.protocol,
            signal = ?found.signal,
            "Protocol identified"
        );
        found
    }
}
