// src/config.rs
// Relay configuration from the environment, validated at startup.

use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Address the relay listens on.
    pub addr: SocketAddr,
    /// Base URL of the upstream gas-sponsorship provider.
    pub sponsor_api_url: String,
    /// Private API key for the provider. Never logged.
    pub sponsor_api_key: String,
    /// Chain network passed through to the provider.
    pub network: String,
}

/// Validation result for configuration checks
pub struct ConfigValidation {
    pub valid: bool,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ConfigValidation {
    pub fn print_summary(&self) {
        for w in &self.warnings {
            warn!("⚠️  config: {}", w);
        }
        for e in &self.errors {
            error!("❌ config: {}", e);
        }
        if self.valid && self.warnings.is_empty() {
            info!("✅ Configuration validation passed");
        }
    }
}

impl RelayConfig {
    pub fn from_env() -> Result<Self> {
        let addr = env::var("RELAY_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3001".into())
            .parse()
            .context("RELAY_ADDR has invalid format (expected IP:PORT)")?;

        Ok(RelayConfig {
            addr,
            sponsor_api_url: env::var("SPONSOR_API_URL")
                .unwrap_or_else(|_| "http://localhost:9100".into()),
            sponsor_api_key: env::var("SPONSOR_API_KEY").unwrap_or_default(),
            network: env::var("NETWORK").unwrap_or_else(|_| "testnet".into()),
        })
    }

    pub fn validate(&self) -> ConfigValidation {
        let mut warnings = Vec::new();
        let mut errors = Vec::new();

        if self.sponsor_api_key.is_empty() {
            errors.push("SPONSOR_API_KEY not set - the provider will reject every request".into());
        } else if self.sponsor_api_key.len() < 32 {
            warnings.push(format!(
                "SPONSOR_API_KEY is short ({} chars) - double-check it is a real key",
                self.sponsor_api_key.len()
            ));
        }

        if !self.sponsor_api_url.starts_with("http://")
            && !self.sponsor_api_url.starts_with("https://")
        {
            errors.push(format!(
                "SPONSOR_API_URL must be an http(s) URL, got '{}'",
                self.sponsor_api_url
            ));
        } else if self.sponsor_api_url.contains("localhost") {
            warnings.push("SPONSOR_API_URL points at localhost - fine for development only".into());
        }

        match self.network.as_str() {
            "testnet" | "devnet" | "mainnet" => {}
            other => warnings.push(format!("NETWORK '{other}' is not a known network name")),
        }

        ConfigValidation {
            valid: errors.is_empty(),
            warnings,
            errors,
        }
    }
}
