// src/sponsor.rs
// HTTP client for the upstream gas-sponsorship provider.
//
// The provider co-signs a prepared transaction and fronts the network fees.
// The allow-list sent with each request is a capability restriction: it
// names exactly the one entry point the intent targets, so the relay cannot
// be abused to sponsor arbitrary calls. Requests are never retried; each
// action attempt is a fresh request from the caller's point of view.

use hero_sdk::types::{short_id, SponsoredTransactionHandle};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SponsorError {
    #[error("sponsor service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("sponsor service rejected the request ({status}): {message}")]
    Rejected {
        status: reqwest::StatusCode,
        message: String,
    },
}

#[derive(Clone)]
pub struct SponsorClient {
    http: Client,
    base_url: String,
    api_key: String,
    network: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SponsorRequestBody<'a> {
    network: &'a str,
    transaction_kind_bytes: &'a str,
    sender: &'a str,
    allowed_move_call_targets: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    allowed_addresses: Option<&'a [String]>,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct SponsorData {
    bytes: String,
    digest: String,
}

impl SponsorClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        network: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            network: network.into(),
        }
    }

    /// Ask the provider to co-sign an unsigned transaction payload.
    pub async fn create_sponsored_transaction(
        &self,
        sender: &str,
        transaction_kind_bytes: &str,
        allowed_move_call_targets: &[String],
        allowed_addresses: Option<Vec<String>>,
    ) -> Result<SponsoredTransactionHandle, SponsorError> {
        let url = format!("{}/v1/transaction-blocks/sponsor", self.base_url);
        let body = SponsorRequestBody {
            network: &self.network,
            transaction_kind_bytes,
            sender,
            allowed_move_call_targets,
            allowed_addresses: allowed_addresses.as_deref(),
        };

        debug!(
            sender = %short_id(sender),
            targets = ?allowed_move_call_targets,
            "requesting sponsorship from provider"
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let envelope: Envelope<SponsorData> = Self::decode(response).await?;

        Ok(SponsoredTransactionHandle {
            bytes: envelope.data.bytes,
            digest: envelope.data.digest,
        })
    }

    /// Submit the user's signature for final on-chain execution. The digest
    /// is consumed by this call whether it succeeds or not.
    pub async fn execute_sponsored_transaction(
        &self,
        digest: &str,
        signature: &str,
    ) -> Result<Value, SponsorError> {
        let url = format!(
            "{}/v1/transaction-blocks/sponsor/{}",
            self.base_url, digest
        );

        debug!(digest = %short_id(digest), "executing sponsored transaction");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&json!({ "signature": signature }))
            .send()
            .await?;
        let envelope: Envelope<Value> = Self::decode(response).await?;
        Ok(envelope.data)
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, SponsorError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SponsorError::Rejected { status, message });
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_uses_provider_field_names() {
        let targets = vec!["0xp::hero::transfer_hero".to_string()];
        let addresses = vec!["0xrecipient".to_string()];
        let body = SponsorRequestBody {
            network: "testnet",
            transaction_kind_bytes: "AAAA",
            sender: "0xsender",
            allowed_move_call_targets: &targets,
            allowed_addresses: Some(&addresses),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["transactionKindBytes"], "AAAA");
        assert_eq!(json["allowedMoveCallTargets"][0], "0xp::hero::transfer_hero");
        assert_eq!(json["allowedAddresses"][0], "0xrecipient");
    }

    #[test]
    fn absent_allowed_addresses_is_omitted() {
        let targets = vec!["0xp::hero::create_hero".to_string()];
        let body = SponsorRequestBody {
            network: "testnet",
            transaction_kind_bytes: "AAAA",
            sender: "0xsender",
            allowed_move_call_targets: &targets,
            allowed_addresses: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("allowedAddresses").is_none());
    }
}
