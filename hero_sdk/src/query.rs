//! Read-only chain queries.
//!
//! Thin JSON-RPC client over the fullnode: coin balances by owner, object
//! fetches by id list, and typed event queries. Paging and filtering happen
//! on the remote side; this client only decodes what comes back, skipping
//! malformed entries with a warning instead of failing the whole query.

use crate::error::{Error, Result};
use crate::types::{Hero, HeroEvent, Listing, PaymentCoin};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

/// Coin type of the platform's native currency.
pub const NATIVE_COIN_TYPE: &str = "0x2::sui::SUI";

/// Which marketplace event stream to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Listed,
    Bought,
}

impl EventKind {
    fn event_struct(self) -> &'static str {
        match self {
            EventKind::Listed => "HeroListed",
            EventKind::Bought => "HeroBought",
        }
    }
}

/// Source of the wallet's payment coins. Split out as a trait so buy flows
/// can be tested without a fullnode.
#[async_trait]
pub trait CoinSource: Send + Sync {
    async fn coins(&self, owner: &str) -> Result<Vec<PaymentCoin>>;
}

/// JSON-RPC client for the fullnode.
#[derive(Clone)]
pub struct ChainClient {
    http: Client,
    rpc_url: String,
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope {
    result: Option<Value>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

impl ChainClient {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            rpc_url: rpc_url.into(),
        }
    }

    pub fn with_client(rpc_url: impl Into<String>, http: Client) -> Self {
        Self {
            http,
            rpc_url: rpc_url.into(),
        }
    }

    async fn rpc(&self, method: &str, params: Value) -> Result<Value> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let envelope: RpcEnvelope = self
            .http
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Query(format!("{method}: {e}")))?
            .json()
            .await
            .map_err(|e| Error::Query(format!("{method}: invalid response: {e}")))?;

        if let Some(err) = envelope.error {
            return Err(Error::Query(format!(
                "{method}: {} (code {})",
                err.message, err.code
            )));
        }
        envelope
            .result
            .ok_or_else(|| Error::Query(format!("{method}: response carried no result")))
    }

    /// Fetch the owner's native-currency coin objects.
    pub async fn get_coins(&self, owner: &str) -> Result<Vec<PaymentCoin>> {
        let result = self
            .rpc("suix_getCoins", json!([owner, NATIVE_COIN_TYPE, null, null]))
            .await?;
        let entries = result
            .get("data")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Ok(entries.iter().filter_map(parse_coin).collect())
    }

    /// Fetch hero objects by id.
    pub async fn get_heroes(&self, ids: &[String]) -> Result<Vec<Hero>> {
        let objects = self.multi_get_objects(ids).await?;
        Ok(objects.iter().filter_map(parse_hero).collect())
    }

    /// Fetch listing objects by id.
    pub async fn get_listings(&self, ids: &[String]) -> Result<Vec<Listing>> {
        let objects = self.multi_get_objects(ids).await?;
        Ok(objects.iter().filter_map(parse_listing).collect())
    }

    async fn multi_get_objects(&self, ids: &[String]) -> Result<Vec<Value>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let result = self
            .rpc(
                "sui_multiGetObjects",
                json!([ids, { "showContent": true }]),
            )
            .await?;
        Ok(result.as_array().cloned().unwrap_or_default())
    }

    /// Query marketplace events of one kind, newest first.
    pub async fn query_events(&self, package_id: &str, kind: EventKind) -> Result<Vec<HeroEvent>> {
        let event_type = format!("{package_id}::hero::{}", kind.event_struct());
        let result = self
            .rpc(
                "suix_queryEvents",
                json!([{ "MoveEventType": event_type }, null, 50, true]),
            )
            .await?;
        let entries = result
            .get("data")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Ok(entries.iter().filter_map(|e| parse_event(e, kind)).collect())
    }
}

#[async_trait]
impl CoinSource for ChainClient {
    async fn coins(&self, owner: &str) -> Result<Vec<PaymentCoin>> {
        self.get_coins(owner).await
    }
}

fn str_field(value: &Value, field: &str) -> Option<String> {
    value.get(field).and_then(Value::as_str).map(str::to_string)
}

/// Numeric fields arrive as decimal strings on the wire.
fn u64_field(value: &Value, field: &str) -> Option<u64> {
    match value.get(field)? {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

fn parse_coin(entry: &Value) -> Option<PaymentCoin> {
    let coin_object_id = str_field(entry, "coinObjectId")?;
    let balance = match u64_field(entry, "balance") {
        Some(b) => b,
        None => {
            warn!(coin = %coin_object_id, "skipping coin with unreadable balance");
            return None;
        }
    };
    Some(PaymentCoin {
        coin_object_id,
        balance,
    })
}

/// Object content fields live at `data.content.fields`.
fn content_fields(object: &Value) -> Option<&Value> {
    object.pointer("/data/content/fields")
}

fn hero_from_fields(fields: &Value) -> Option<Hero> {
    Some(Hero {
        id: fields
            .pointer("/id/id")
            .and_then(Value::as_str)
            .map(str::to_string)?,
        name: str_field(fields, "name")?,
        image_url: str_field(fields, "image_url").unwrap_or_default(),
        power: u64_field(fields, "power").unwrap_or(0),
    })
}

fn parse_hero(object: &Value) -> Option<Hero> {
    let fields = content_fields(object)?;
    let hero = hero_from_fields(fields);
    if hero.is_none() {
        warn!("skipping object without hero fields");
    }
    hero
}

fn parse_listing(object: &Value) -> Option<Listing> {
    let fields = content_fields(object)?;
    let listing = (|| {
        Some(Listing {
            id: fields
                .pointer("/id/id")
                .and_then(Value::as_str)
                .map(str::to_string)?,
            nft: hero_from_fields(fields.pointer("/nft/fields")?)?,
            price: u64_field(fields, "price")?,
            seller: str_field(fields, "seller")?,
        })
    })();
    if listing.is_none() {
        warn!("skipping object without listing fields");
    }
    listing
}

fn parse_event(entry: &Value, kind: EventKind) -> Option<HeroEvent> {
    let parsed = entry.get("parsedJson")?;
    let timestamp = str_field(entry, "timestampMs");
    let listing_id = str_field(parsed, "id")?;
    let price = u64_field(parsed, "price")?;
    let seller = str_field(parsed, "seller")?;

    match kind {
        EventKind::Listed => Some(HeroEvent::Listed {
            listing_id,
            price,
            seller,
            timestamp,
        }),
        EventKind::Bought => Some(HeroEvent::Bought {
            listing_id,
            price,
            buyer: str_field(parsed, "buyer")?,
            seller,
            timestamp,
        }),
    }
}
