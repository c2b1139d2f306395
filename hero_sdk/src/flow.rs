//! Per-action flow orchestration.
//!
//! One parameterized state machine drives all four actions:
//!
//! ```text
//! Idle -> SelectingCoin (buy only) -> BuildingIntent -> AwaitingSponsorship
//!      -> AwaitingSignature -> Submitting -> Succeeded | Failed
//! ```
//!
//! Terminal states are final; a new attempt is a fresh flow. Any step's
//! failure moves straight to `Failed` with the originating error and nothing
//! is rolled back: the remote services are the source of truth for what
//! actually happened on chain. Flows share no mutable state, so independent
//! actions may run concurrently; two flows racing on the same payment coin
//! resolve at the remote service as an ordinary submission failure.

use crate::coin::{display_to_base_units, select_coin};
use crate::error::{Error, Result};
use crate::intent::HeroAction;
use crate::query::CoinSource;
use crate::relay::RelayApi;
use crate::signer::WalletSigner;
use crate::types::{short_id, ExecutionResult};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    SelectingCoin,
    BuildingIntent,
    AwaitingSponsorship,
    AwaitingSignature,
    Submitting,
    Succeeded,
    Failed,
}

/// What happened during one flow attempt: the state path taken (always
/// ending in `Succeeded` or `Failed`) and the outcome.
#[derive(Debug)]
pub struct FlowReport {
    pub states: Vec<FlowState>,
    pub outcome: Result<ExecutionResult>,
}

impl FlowReport {
    pub fn final_state(&self) -> FlowState {
        *self.states.last().unwrap_or(&FlowState::Idle)
    }

    pub fn succeeded(&self) -> bool {
        self.final_state() == FlowState::Succeeded
    }
}

/// Orchestrates marketplace action flows against injected collaborators.
///
/// All dependencies are passed in so flows are testable with fakes.
pub struct HeroFlow {
    package_id: String,
    relay: Arc<dyn RelayApi>,
    signer: Arc<dyn WalletSigner>,
    coins: Arc<dyn CoinSource>,
    refresh: watch::Sender<u64>,
}

impl HeroFlow {
    pub fn new(
        package_id: impl Into<String>,
        relay: Arc<dyn RelayApi>,
        signer: Arc<dyn WalletSigner>,
        coins: Arc<dyn CoinSource>,
    ) -> Self {
        let (refresh, _) = watch::channel(0);
        Self {
            package_id: package_id.into(),
            relay,
            signer,
            coins,
            refresh,
        }
    }

    /// Subscribe to the "data may have changed" signal. The counter bumps
    /// once per successful flow; this is the only cross-component signal
    /// the orchestrator emits.
    pub fn subscribe_refresh(&self) -> watch::Receiver<u64> {
        self.refresh.subscribe()
    }

    /// Run one action flow to a terminal state.
    pub async fn run(&self, action: HeroAction) -> FlowReport {
        let mut states = vec![FlowState::Idle];
        let outcome = self.drive(&action, &mut states).await;

        match &outcome {
            Ok(result) => {
                states.push(FlowState::Succeeded);
                self.refresh.send_modify(|n| *n += 1);
                info!(
                    action = action.label(),
                    digest = %short_id(&result.digest),
                    "flow succeeded"
                );
            }
            Err(error) => {
                states.push(FlowState::Failed);
                warn!(action = action.label(), %error, "flow failed");
            }
        }

        FlowReport { states, outcome }
    }

    async fn drive(
        &self,
        action: &HeroAction,
        states: &mut Vec<FlowState>,
    ) -> Result<ExecutionResult> {
        let sender = self.signer.address().to_string();

        // Buy pays from an owned coin; pick one before anything else so an
        // underfunded wallet fails without a single network call to the relay.
        let payment_coin = if action.requires_coin() {
            states.push(FlowState::SelectingCoin);
            let price = action
                .price()
                .ok_or_else(|| Error::Validation("buy action carries no price".into()))?;
            let required = display_to_base_units(price)?;
            let coins = self.coins.coins(&sender).await?;
            let coin = select_coin(&coins, required)
                .ok_or(Error::InsufficientFunds { required })?;
            debug!(
                coin = %short_id(&coin.coin_object_id),
                balance = coin.balance,
                required,
                "payment coin selected"
            );
            Some(coin.coin_object_id.clone())
        } else {
            None
        };

        // Local validation happens here; a bad field never reaches the relay.
        states.push(FlowState::BuildingIntent);
        let intent = action.build_intent(&self.package_id, payment_coin.as_deref())?;
        debug!(entry_point = %intent.target, "intent built");

        states.push(FlowState::AwaitingSponsorship);
        let handle = self
            .relay
            .sponsor(&sender, action, payment_coin.as_deref())
            .await?;

        // The wait here is unbounded: the wallet may be prompting the user.
        states.push(FlowState::AwaitingSignature);
        let signature = self.signer.sign(&handle.bytes).await?;
        if signature.is_empty() {
            return Err(Error::Signing("wallet returned an empty signature".into()));
        }

        states.push(FlowState::Submitting);
        self.relay.execute(&handle.digest, &signature).await
    }
}
