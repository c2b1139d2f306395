//! Client for the sponsored-transaction relay backend.
//!
//! One POST per action attempt; nothing is retried automatically because a
//! retry would need a fresh intent (stale object references must never be
//! resubmitted).

use crate::error::{Error, Result};
use crate::intent::HeroAction;
use crate::types::{short_id, ExecutionResult, SponsoredTransactionHandle};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

/// The relay operations the flow orchestrator depends on. Kept as a trait so
/// flows are testable with in-process fakes.
#[async_trait]
pub trait RelayApi: Send + Sync {
    /// Request sponsorship for one action. `payment_coin` is the selected
    /// coin object id and is required for buy.
    async fn sponsor(
        &self,
        sender: &str,
        action: &HeroAction,
        payment_coin: Option<&str>,
    ) -> Result<SponsoredTransactionHandle>;

    /// Submit the user's signature for final on-chain execution.
    async fn execute(&self, digest: &str, signature: &str) -> Result<ExecutionResult>;
}

/// HTTP client for the relay backend endpoints.
#[derive(Clone)]
pub struct RelayClient {
    http: Client,
    base_url: String,
    package_id: String,
}

#[derive(Debug, Deserialize)]
struct SponsoredResponse {
    bytes: String,
    digest: String,
}

#[derive(Debug, Deserialize)]
struct ExecuteResponse {
    result: Value,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

impl RelayClient {
    pub fn new(base_url: impl Into<String>, package_id: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            package_id: package_id.into(),
        }
    }

    /// Create a client with a custom reqwest client (timeouts, proxies).
    pub fn with_client(
        base_url: impl Into<String>,
        package_id: impl Into<String>,
        http: Client,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            package_id: package_id.into(),
        }
    }

    pub fn package_id(&self) -> &str {
        &self.package_id
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
        mk_err: fn(String) -> Error,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| mk_err(format!("request to {path} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            // Backend failures come back as 500 with an {error} body.
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|b| b.error)
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(mk_err(message));
        }

        response
            .json()
            .await
            .map_err(|e| mk_err(format!("invalid response from {path}: {e}")))
    }

    fn sponsor_body(
        &self,
        sender: &str,
        action: &HeroAction,
        payment_coin: Option<&str>,
    ) -> Result<Value> {
        let body = match action {
            HeroAction::Create {
                name,
                image_url,
                power,
            } => json!({
                "sender": sender,
                "packageId": self.package_id,
                "name": name,
                "imageUrl": image_url,
                "power": power.to_string(),
            }),
            HeroAction::List { hero_id, price } => json!({
                "sender": sender,
                "packageId": self.package_id,
                "heroId": hero_id,
                "price": price,
            }),
            HeroAction::Buy { listing_id, price } => {
                let coin = payment_coin.ok_or_else(|| {
                    Error::Validation("buy requires a selected payment coin".into())
                })?;
                json!({
                    "sender": sender,
                    "packageId": self.package_id,
                    "paymentCoinObject": coin,
                    "listHeroId": listing_id,
                    "price": price,
                })
            }
            HeroAction::Transfer { hero_id, recipient } => json!({
                "sender": sender,
                "packageId": self.package_id,
                "heroId": hero_id,
                "recipient": recipient,
            }),
        };
        Ok(body)
    }
}

#[async_trait]
impl RelayApi for RelayClient {
    async fn sponsor(
        &self,
        sender: &str,
        action: &HeroAction,
        payment_coin: Option<&str>,
    ) -> Result<SponsoredTransactionHandle> {
        let body = self.sponsor_body(sender, action, payment_coin)?;
        debug!(
            action = action.label(),
            sender = %short_id(sender),
            "requesting sponsorship"
        );
        let response: SponsoredResponse = self
            .post(action.endpoint(), &body, Error::Relay)
            .await?;
        Ok(SponsoredTransactionHandle {
            bytes: response.bytes,
            digest: response.digest,
        })
    }

    async fn execute(&self, digest: &str, signature: &str) -> Result<ExecutionResult> {
        debug!(digest = %short_id(digest), "submitting signed transaction");
        let body = json!({ "digest": digest, "signature": signature });
        let response: ExecuteResponse = self
            .post("/api/execute-transaction", &body, Error::Submission)
            .await?;

        let executed_digest = response
            .result
            .get("digest")
            .and_then(Value::as_str)
            .unwrap_or(digest)
            .to_string();
        let status_raw = response
            .result
            .pointer("/effects/status/status")
            .or_else(|| response.result.get("status"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(ExecutionResult {
            digest: executed_digest,
            status_raw,
        })
    }
}
