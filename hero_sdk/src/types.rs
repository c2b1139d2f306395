use serde::{Deserialize, Serialize};

/// A fungible payment-token object owned by the wallet.
///
/// Snapshot at fetch time; consumed (and therefore invalidated) by any
/// transaction that spends the object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentCoin {
    pub coin_object_id: String,
    /// Balance in base units (smallest unit of the native currency).
    pub balance: u64,
}

/// Co-signed transaction payload returned by the sponsor service.
///
/// `digest` is the correlation id binding the later signature to this
/// prepared transaction. Must be signed and submitted at most once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SponsoredTransactionHandle {
    /// Base64-encoded payload for the wallet to sign.
    pub bytes: String,
    /// Opaque correlation id consumed by the execute call.
    pub digest: String,
}

/// Result of a submitted sponsored transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub digest: String,
    /// Raw status string as reported by the service, if present.
    pub status_raw: Option<String>,
}

/// A hero NFT as observed on chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hero {
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub power: u64,
}

/// An active marketplace listing. Read-only from this crate's perspective;
/// mutation happens only through successful entry-point invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub nft: Hero,
    /// Price in base units.
    pub price: u64,
    pub seller: String,
}

/// Marketplace events, one tagged variant per on-chain event kind.
///
/// Timestamps are optional because older events in practice come back
/// without one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HeroEvent {
    Listed {
        listing_id: String,
        price: u64,
        seller: String,
        timestamp: Option<String>,
    },
    Bought {
        listing_id: String,
        price: u64,
        buyer: String,
        seller: String,
        timestamp: Option<String>,
    },
}

/// Shorten an id or address for log lines: `0x1234abcd...beef`.
///
/// Ids are expected to be ASCII hex, but this also runs on
/// service-returned digests, so it works on characters rather than byte
/// offsets and cannot panic on multi-byte input.
pub fn short_id(id: &str) -> String {
    let count = id.chars().count();
    if count <= 14 {
        return id.to_string();
    }
    let head: String = id.chars().take(8).collect();
    let tail: String = id.chars().skip(count - 4).collect();
    format!("{head}...{tail}")
}
