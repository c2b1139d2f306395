//! # Hero Marketplace SDK
//!
//! Client-side core for a sponsored-transaction NFT marketplace:
//! payment-coin selection, unsigned-intent construction, the relay protocol
//! (sponsor, sign, execute), wallet signing, read-only chain queries, and
//! the per-action flow orchestrator tying them together.
//!
//! State transitions and ownership rules live in the on-chain contract;
//! signing co-ordination and gas sponsorship live in the relay backend and
//! the sponsor service. This crate owns the multi-step handshake between
//! them.

pub mod coin;
pub mod error;
pub mod flow;
pub mod intent;
pub mod query;
pub mod relay;
pub mod signer;
pub mod types;

pub use coin::{display_to_base_units, select_coin, BASE_UNITS_PER_COIN};
pub use error::{Error, Result};
pub use flow::{FlowReport, FlowState, HeroFlow};
pub use intent::{
    build_buy, build_create, build_list, build_transfer, Argument, HeroAction,
    UnsignedTransactionIntent,
};
pub use query::{ChainClient, CoinSource, EventKind};
pub use relay::{RelayApi, RelayClient};
pub use signer::{Keystore, KeystoreSigner, WalletSigner};
pub use types::{
    ExecutionResult, Hero, HeroEvent, Listing, PaymentCoin, SponsoredTransactionHandle,
};

/// SDK version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coin::{display_to_base_units, select_coin, BASE_UNITS_PER_COIN};
    pub use crate::error::{Error, Result};
    pub use crate::flow::{FlowReport, FlowState, HeroFlow};
    pub use crate::intent::{HeroAction, UnsignedTransactionIntent};
    pub use crate::query::{ChainClient, CoinSource, EventKind};
    pub use crate::relay::{RelayApi, RelayClient};
    pub use crate::signer::{Keystore, KeystoreSigner, WalletSigner};
    pub use crate::types::*;
}
