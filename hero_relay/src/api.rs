// src/api.rs
// Axum router for the sponsored-transaction endpoints.
//
// Every handler follows the same shape: validate the request, build the
// unsigned intent, hand it to the sponsorship provider with an allow-list
// naming exactly the targeted entry point, and return the co-signed payload
// plus its correlation digest. Any failure becomes HTTP 500 with an
// `{error}` body; nothing is retried here.

use crate::sponsor::{SponsorClient, SponsorError};
use axum::extract::Extension;
use axum::http::{header, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use hero_sdk::intent::{build_buy, build_create, build_list, build_transfer};
use hero_sdk::types::short_id;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{error, info};

pub struct AppState {
    pub sponsor: SponsorClient,
}

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Upstream(String),
}

impl From<hero_sdk::Error> for ApiError {
    fn from(e: hero_sdk::Error) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<SponsorError> for ApiError {
    fn from(e: SponsorError) -> Self {
        ApiError::Upstream(e.to_string())
    }
}

impl IntoResponse for ApiError {
    // Uniform failure surface: 500 with {error}, matching what clients expect.
    fn into_response(self) -> Response {
        error!(error = %self, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHeroRequest {
    pub sender: String,
    pub package_id: String,
    pub name: String,
    pub image_url: String,
    pub power: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListHeroRequest {
    pub sender: String,
    pub package_id: String,
    pub hero_id: String,
    /// Decimal display-unit price, converted with truncation.
    pub price: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyHeroRequest {
    pub sender: String,
    pub package_id: String,
    pub payment_coin_object: String,
    pub list_hero_id: String,
    pub price: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferHeroRequest {
    pub sender: String,
    pub package_id: String,
    pub hero_id: String,
    pub recipient: String,
}

#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    pub digest: String,
    pub signature: String,
}

#[derive(Debug, Serialize)]
pub struct SponsoredResponse {
    pub bytes: String,
    pub digest: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/create-hero", post(create_hero))
        .route("/api/list-hero", post(list_hero))
        .route("/api/buy-hero", post(buy_hero))
        .route("/api/transfer-hero", post(transfer_hero))
        .route("/api/execute-transaction", post(execute_transaction))
        .layer(middleware::from_fn(log_requests))
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(Extension(state))
}

async fn log_requests<B>(req: Request<B>, next: Next<B>) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    info!(
        %method,
        %path,
        status = %response.status(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        %user_agent,
        "request"
    );
    response
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "OK", "message": "Hero Marketplace Relay" }))
}

async fn create_hero(
    Extension(state): Extension<Arc<AppState>>,
    Json(req): Json<CreateHeroRequest>,
) -> ApiResult<SponsoredResponse> {
    info!(
        sender = %short_id(&req.sender),
        name = %req.name,
        power = %req.power,
        "CREATE_HERO initiated"
    );

    let power: u64 = req
        .power
        .trim()
        .parse()
        .map_err(|_| ApiError::BadRequest("power must be a positive integer".into()))?;
    let intent = build_create(&req.package_id, &req.name, &req.image_url, power)?;

    let handle = state
        .sponsor
        .create_sponsored_transaction(
            &req.sender,
            &intent.to_kind_base64()?,
            &[intent.target.clone()],
            None,
        )
        .await?;

    info!(
        sender = %short_id(&req.sender),
        digest = %short_id(&handle.digest),
        "CREATE_HERO sponsored"
    );
    Ok(Json(SponsoredResponse {
        bytes: handle.bytes,
        digest: handle.digest,
    }))
}

async fn list_hero(
    Extension(state): Extension<Arc<AppState>>,
    Json(req): Json<ListHeroRequest>,
) -> ApiResult<SponsoredResponse> {
    info!(
        sender = %short_id(&req.sender),
        hero = %short_id(&req.hero_id),
        price = %req.price,
        "LIST_HERO initiated"
    );

    let intent = build_list(&req.package_id, &req.hero_id, &req.price)?;

    let handle = state
        .sponsor
        .create_sponsored_transaction(
            &req.sender,
            &intent.to_kind_base64()?,
            &[intent.target.clone()],
            None,
        )
        .await?;

    info!(
        sender = %short_id(&req.sender),
        digest = %short_id(&handle.digest),
        "LIST_HERO sponsored"
    );
    Ok(Json(SponsoredResponse {
        bytes: handle.bytes,
        digest: handle.digest,
    }))
}

async fn buy_hero(
    Extension(state): Extension<Arc<AppState>>,
    Json(req): Json<BuyHeroRequest>,
) -> ApiResult<SponsoredResponse> {
    info!(
        sender = %short_id(&req.sender),
        listing = %short_id(&req.list_hero_id),
        coin = %short_id(&req.payment_coin_object),
        price = %req.price,
        "BUY_HERO initiated"
    );

    let intent = build_buy(
        &req.package_id,
        &req.payment_coin_object,
        &req.list_hero_id,
        &req.price,
    )?;

    let handle = state
        .sponsor
        .create_sponsored_transaction(
            &req.sender,
            &intent.to_kind_base64()?,
            &[intent.target.clone()],
            None,
        )
        .await?;

    info!(
        sender = %short_id(&req.sender),
        digest = %short_id(&handle.digest),
        "BUY_HERO sponsored"
    );
    Ok(Json(SponsoredResponse {
        bytes: handle.bytes,
        digest: handle.digest,
    }))
}

async fn transfer_hero(
    Extension(state): Extension<Arc<AppState>>,
    Json(req): Json<TransferHeroRequest>,
) -> ApiResult<SponsoredResponse> {
    info!(
        sender = %short_id(&req.sender),
        hero = %short_id(&req.hero_id),
        recipient = %short_id(&req.recipient),
        "TRANSFER_HERO initiated"
    );

    let intent = build_transfer(&req.package_id, &req.hero_id, &req.recipient)?;

    // Transfers additionally pin the provider to the declared recipient.
    let handle = state
        .sponsor
        .create_sponsored_transaction(
            &req.sender,
            &intent.to_kind_base64()?,
            &[intent.target.clone()],
            Some(vec![req.recipient.clone()]),
        )
        .await?;

    info!(
        sender = %short_id(&req.sender),
        digest = %short_id(&handle.digest),
        "TRANSFER_HERO sponsored"
    );
    Ok(Json(SponsoredResponse {
        bytes: handle.bytes,
        digest: handle.digest,
    }))
}

async fn execute_transaction(
    Extension(state): Extension<Arc<AppState>>,
    Json(req): Json<ExecuteRequest>,
) -> ApiResult<Value> {
    info!(digest = %short_id(&req.digest), "executing sponsored transaction");

    let result = state
        .sponsor
        .execute_sponsored_transaction(&req.digest, &req.signature)
        .await?;

    info!(
        digest = %short_id(&req.digest),
        status = result
            .pointer("/effects/status/status")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("unknown"),
        "transaction executed"
    );
    Ok(Json(json!({ "result": result })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_deserialize_from_wire_field_names() {
        let req: BuyHeroRequest = serde_json::from_value(json!({
            "sender": "0xs",
            "packageId": "0xp",
            "paymentCoinObject": "0xc",
            "listHeroId": "0xl",
            "price": "1.5"
        }))
        .unwrap();
        assert_eq!(req.payment_coin_object, "0xc");
        assert_eq!(req.list_hero_id, "0xl");

        let req: TransferHeroRequest = serde_json::from_value(json!({
            "sender": "0xs",
            "packageId": "0xp",
            "heroId": "0xh",
            "recipient": "0xr"
        }))
        .unwrap();
        assert_eq!(req.hero_id, "0xh");
    }

    #[test]
    fn validation_failures_map_to_bad_request() {
        let err: ApiError = hero_sdk::Error::Validation("power must be a positive integer".into()).into();
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert_eq!(err.to_string(), "invalid input: power must be a positive integer");
    }

    #[test]
    fn sponsored_response_shape() {
        let response = SponsoredResponse {
            bytes: "AAAA".into(),
            digest: "0xd".into(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, json!({ "bytes": "AAAA", "digest": "0xd" }));
    }
}
