//! Unsigned transaction intents for the marketplace entry points.
//!
//! One pure constructor per action. All four validate their inputs and fail
//! fast with a descriptive error before anything touches the network. The
//! intent is built fresh per action attempt and never persisted.

use crate::coin::display_to_base_units;
use crate::error::{Error, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

/// Module name on the marketplace contract.
pub const HERO_MODULE: &str = "hero";

/// A typed argument to a contract entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Argument {
    /// Reference to an owned or shared object by id.
    Object(String),
    U64(u64),
    Address(String),
    /// Raw bytes, used for string-typed contract parameters.
    Raw(Vec<u8>),
    /// The coin produced by the intent's split step.
    SplitResult,
}

/// A coin-split step executed before the entry-point call, producing a new
/// coin reference carrying exactly `amount` base units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinSplit {
    pub coin: String,
    pub amount: u64,
}

/// An unsigned transaction invoking one named entry point with ordered
/// arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTransactionIntent {
    /// Fully qualified entry point: `package::module::function`.
    pub target: String,
    /// Optional split step (buy only), executed before the call.
    pub split_coin: Option<CoinSplit>,
    pub arguments: Vec<Argument>,
}

impl UnsignedTransactionIntent {
    /// Serialize the intent to the opaque payload sent to the sponsor.
    pub fn to_kind_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| Error::Internal(format!("failed to encode intent: {e}")))
    }

    /// Base64 form of [`Self::to_kind_bytes`].
    pub fn to_kind_base64(&self) -> Result<String> {
        Ok(BASE64.encode(self.to_kind_bytes()?))
    }
}

fn ensure_nonempty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Object ids and addresses are 0x-prefixed hex strings.
fn ensure_hex_id(field: &str, value: &str) -> Result<()> {
    ensure_nonempty(field, value)?;
    let rest = value
        .strip_prefix("0x")
        .ok_or_else(|| Error::Validation(format!("{field} must start with 0x")))?;
    if rest.is_empty() || !rest.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::Validation(format!("{field} is not a valid hex id: '{value}'")));
    }
    Ok(())
}

fn positive_price(price: &str) -> Result<u64> {
    let units = display_to_base_units(price)?;
    if units == 0 {
        return Err(Error::Validation("price must be positive".into()));
    }
    Ok(units)
}

/// Intent for `hero::create_hero(name, image_url, power)`.
pub fn build_create(
    package_id: &str,
    name: &str,
    image_url: &str,
    power: u64,
) -> Result<UnsignedTransactionIntent> {
    ensure_hex_id("packageId", package_id)?;
    ensure_nonempty("name", name)?;
    ensure_nonempty("imageUrl", image_url)?;
    if power == 0 {
        return Err(Error::Validation("power must be a positive integer".into()));
    }
    Ok(UnsignedTransactionIntent {
        target: format!("{package_id}::{HERO_MODULE}::create_hero"),
        split_coin: None,
        arguments: vec![
            Argument::Raw(name.as_bytes().to_vec()),
            Argument::Raw(image_url.as_bytes().to_vec()),
            Argument::U64(power),
        ],
    })
}

/// Intent for `hero::list_hero(hero, price)`.
///
/// `price` is a decimal display-unit amount; the conversion to base units
/// truncates fractional base units.
pub fn build_list(package_id: &str, hero_id: &str, price: &str) -> Result<UnsignedTransactionIntent> {
    ensure_hex_id("packageId", package_id)?;
    ensure_hex_id("heroId", hero_id)?;
    let price_units = positive_price(price)?;
    Ok(UnsignedTransactionIntent {
        target: format!("{package_id}::{HERO_MODULE}::list_hero"),
        split_coin: None,
        arguments: vec![Argument::Object(hero_id.to_string()), Argument::U64(price_units)],
    })
}

/// Intent for `hero::buy_hero(listing, payment)`.
///
/// Splits the exact price out of the chosen payment coin first, then passes
/// the split result as the payment argument.
pub fn build_buy(
    package_id: &str,
    payment_coin_id: &str,
    listing_id: &str,
    price: &str,
) -> Result<UnsignedTransactionIntent> {
    ensure_hex_id("packageId", package_id)?;
    ensure_hex_id("paymentCoinObject", payment_coin_id)?;
    ensure_hex_id("listHeroId", listing_id)?;
    let price_units = positive_price(price)?;
    Ok(UnsignedTransactionIntent {
        target: format!("{package_id}::{HERO_MODULE}::buy_hero"),
        split_coin: Some(CoinSplit {
            coin: payment_coin_id.to_string(),
            amount: price_units,
        }),
        arguments: vec![Argument::Object(listing_id.to_string()), Argument::SplitResult],
    })
}

/// Intent for `hero::transfer_hero(hero, recipient)`.
pub fn build_transfer(
    package_id: &str,
    hero_id: &str,
    recipient: &str,
) -> Result<UnsignedTransactionIntent> {
    ensure_hex_id("packageId", package_id)?;
    ensure_hex_id("heroId", hero_id)?;
    ensure_hex_id("recipient", recipient)?;
    Ok(UnsignedTransactionIntent {
        target: format!("{package_id}::{HERO_MODULE}::transfer_hero"),
        split_coin: None,
        arguments: vec![
            Argument::Object(hero_id.to_string()),
            Argument::Address(recipient.to_string()),
        ],
    })
}

/// One user-initiated marketplace action.
///
/// This is the descriptor table driving the flow orchestrator and the relay
/// client: each variant knows its entry point, its relay endpoint, and how
/// to build its intent, so the four flows share one implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeroAction {
    Create {
        name: String,
        image_url: String,
        power: u64,
    },
    List {
        hero_id: String,
        /// Decimal display-unit amount.
        price: String,
    },
    Buy {
        listing_id: String,
        price: String,
    },
    Transfer {
        hero_id: String,
        recipient: String,
    },
}

impl HeroAction {
    /// Entry-point function name on the `hero` module.
    pub fn entry_point(&self) -> &'static str {
        match self {
            HeroAction::Create { .. } => "create_hero",
            HeroAction::List { .. } => "list_hero",
            HeroAction::Buy { .. } => "buy_hero",
            HeroAction::Transfer { .. } => "transfer_hero",
        }
    }

    /// Uppercase label used in log lines.
    pub fn label(&self) -> &'static str {
        match self {
            HeroAction::Create { .. } => "CREATE_HERO",
            HeroAction::List { .. } => "LIST_HERO",
            HeroAction::Buy { .. } => "BUY_HERO",
            HeroAction::Transfer { .. } => "TRANSFER_HERO",
        }
    }

    /// Relay endpoint serving this action.
    pub fn endpoint(&self) -> &'static str {
        match self {
            HeroAction::Create { .. } => "/api/create-hero",
            HeroAction::List { .. } => "/api/list-hero",
            HeroAction::Buy { .. } => "/api/buy-hero",
            HeroAction::Transfer { .. } => "/api/transfer-hero",
        }
    }

    pub fn move_call_target(&self, package_id: &str) -> String {
        format!("{package_id}::{HERO_MODULE}::{}", self.entry_point())
    }

    /// Recipients the sponsor is allowed to co-sign for. Only transfer
    /// restricts this, to the single declared recipient.
    pub fn allowed_addresses(&self) -> Option<Vec<String>> {
        match self {
            HeroAction::Transfer { recipient, .. } => Some(vec![recipient.clone()]),
            _ => None,
        }
    }

    /// Whether the flow must select a payment coin before building.
    pub fn requires_coin(&self) -> bool {
        matches!(self, HeroAction::Buy { .. })
    }

    /// The display-unit price attached to the action, if any.
    pub fn price(&self) -> Option<&str> {
        match self {
            HeroAction::List { price, .. } | HeroAction::Buy { price, .. } => Some(price),
            _ => None,
        }
    }

    /// Build this action's intent. Buy requires the selected payment coin.
    pub fn build_intent(
        &self,
        package_id: &str,
        payment_coin: Option<&str>,
    ) -> Result<UnsignedTransactionIntent> {
        match self {
            HeroAction::Create {
                name,
                image_url,
                power,
            } => build_create(package_id, name, image_url, *power),
            HeroAction::List { hero_id, price } => build_list(package_id, hero_id, price),
            HeroAction::Buy { listing_id, price } => {
                let coin = payment_coin.ok_or_else(|| {
                    Error::Validation("buy requires a selected payment coin".into())
                })?;
                build_buy(package_id, coin, listing_id, price)
            }
            HeroAction::Transfer { hero_id, recipient } => {
                build_transfer(package_id, hero_id, recipient)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PKG: &str = "0x6b8d2f7c4a1e9d3b5f0c8a7e6d4b2f1a9c8e7d6b5a4f3e2d1c0b9a8f7e6d5c4b";
    const OBJ: &str = "0x1111111111111111111111111111111111111111111111111111111111111111";
    const ADDR: &str = "0x2222222222222222222222222222222222222222222222222222222222222222";

    #[test]
    fn transfer_intent_shape() {
        let intent = build_transfer(PKG, OBJ, ADDR).unwrap();
        assert_eq!(intent.target, format!("{PKG}::hero::transfer_hero"));
        assert!(intent.split_coin.is_none());
        assert_eq!(
            intent.arguments,
            vec![
                Argument::Object(OBJ.to_string()),
                Argument::Address(ADDR.to_string())
            ]
        );
    }

    #[test]
    fn list_price_is_truncated_not_rounded() {
        let intent = build_list(PKG, OBJ, "1.9999999995").unwrap();
        assert_eq!(intent.arguments[1], Argument::U64(1_999_999_999));
    }

    #[test]
    fn buy_splits_exact_price_from_payment_coin() {
        let intent = build_buy(PKG, OBJ, ADDR, "2.5").unwrap();
        let split = intent.split_coin.unwrap();
        assert_eq!(split.coin, OBJ);
        assert_eq!(split.amount, 2_500_000_000);
        assert_eq!(
            intent.arguments,
            vec![Argument::Object(ADDR.to_string()), Argument::SplitResult]
        );
    }

    #[test]
    fn create_carries_name_image_and_power() {
        let intent = build_create(PKG, "Fire Dragon", "https://img.example/fd.png", 100).unwrap();
        assert_eq!(intent.target, format!("{PKG}::hero::create_hero"));
        assert_eq!(intent.arguments.len(), 3);
        assert_eq!(intent.arguments[2], Argument::U64(100));
    }

    #[test]
    fn create_rejects_empty_fields_and_zero_power() {
        assert!(build_create(PKG, "", "https://img", 1).is_err());
        assert!(build_create(PKG, "Hero", "  ", 1).is_err());
        assert!(build_create(PKG, "Hero", "https://img", 0).is_err());
    }

    #[test]
    fn builders_reject_malformed_ids() {
        assert!(build_transfer("not-hex", OBJ, ADDR).is_err());
        assert!(build_transfer(PKG, "0x", ADDR).is_err());
        assert!(build_transfer(PKG, OBJ, "0xzz").is_err());
        assert!(build_list(PKG, "", "1").is_err());
    }

    #[test]
    fn builders_reject_nonpositive_price() {
        assert!(build_list(PKG, OBJ, "0").is_err());
        assert!(build_list(PKG, OBJ, "0.0000000009").is_err());
        assert!(build_buy(PKG, OBJ, ADDR, "-3").is_err());
    }

    #[test]
    fn intent_payload_round_trips_through_bincode() {
        let intent = build_buy(PKG, OBJ, ADDR, "1").unwrap();
        let bytes = intent.to_kind_bytes().unwrap();
        let back: UnsignedTransactionIntent = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, intent);
    }

    #[test]
    fn action_descriptor_table() {
        let action = HeroAction::Transfer {
            hero_id: OBJ.into(),
            recipient: ADDR.into(),
        };
        assert_eq!(action.entry_point(), "transfer_hero");
        assert_eq!(action.endpoint(), "/api/transfer-hero");
        assert_eq!(action.allowed_addresses(), Some(vec![ADDR.to_string()]));
        assert!(!action.requires_coin());

        let buy = HeroAction::Buy {
            listing_id: OBJ.into(),
            price: "1".into(),
        };
        assert!(buy.requires_coin());
        assert_eq!(buy.price(), Some("1"));
        // Building a buy intent without a selected coin is a validation error.
        assert!(buy.build_intent(PKG, None).is_err());
    }
}
