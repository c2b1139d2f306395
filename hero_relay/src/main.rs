mod api;
mod config;
mod sponsor;

use anyhow::{bail, Result};
use api::AppState;
use config::RelayConfig;
use sponsor::SponsorClient;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = RelayConfig::from_env()?;
    let validation = config.validate();
    validation.print_summary();
    if !validation.valid {
        bail!("configuration is invalid, refusing to start");
    }

    let state = Arc::new(AppState {
        sponsor: SponsorClient::new(
            &config.sponsor_api_url,
            &config.sponsor_api_key,
            &config.network,
        ),
    });
    let app = api::router(state);

    info!(
        addr = %config.addr,
        network = %config.network,
        "🚀 Hero Marketplace relay started"
    );

    axum::Server::bind(&config.addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
