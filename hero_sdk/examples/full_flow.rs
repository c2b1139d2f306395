use anyhow::Result;
use hero_sdk::prelude::*;
use std::sync::Arc;

/// Full marketplace walkthrough against a local stack:
/// 1. Generate a local keystore wallet
/// 2. Create a hero (sponsored)
/// 3. List it for sale
/// 4. Query events and active listings
///
/// Expects the relay backend on localhost:3001 and a fullnode RPC endpoint.

#[tokio::main]
async fn main() -> Result<()> {
    let package_id = std::env::var("HERO_PACKAGE_ID")
        .unwrap_or_else(|_| "0x0000000000000000000000000000000000000000000000000000000000000042".into());
    let relay_url =
        std::env::var("RELAY_URL").unwrap_or_else(|_| "http://localhost:3001".into());
    let rpc_url =
        std::env::var("FULLNODE_RPC_URL").unwrap_or_else(|_| "http://localhost:9000".into());

    println!("🗡️  Hero Marketplace SDK - Full Flow Example\n");
    println!("{}", "=".repeat(60));

    // Step 1: Wallet
    println!("🔑 Step 1: Generating local wallet");
    let keystore = Keystore::generate();
    println!("   Address: {}", keystore.address);
    let signer = Arc::new(KeystoreSigner::new(&keystore)?);

    // Step 2: Wire up the flow
    let relay = Arc::new(RelayClient::new(&relay_url, &package_id));
    let chain = Arc::new(ChainClient::new(&rpc_url));
    let flow = HeroFlow::new(&package_id, relay, signer, chain.clone());
    let mut refresh = flow.subscribe_refresh();

    // Step 3: Create a hero
    println!("\n⚔️  Step 2: Creating hero (sponsored)");
    let report = flow
        .run(HeroAction::Create {
            name: "Fire Dragon".into(),
            image_url: "https://example.com/fire-dragon.png".into(),
            power: 100,
        })
        .await;
    match report.outcome {
        Ok(result) => {
            println!("   ✅ Created! digest: {}", result.digest);
            if let Some(status) = result.status_raw {
                println!("   Status: {status}");
            }
        }
        Err(e) => {
            println!("   ❌ Create failed: {e}");
            return Ok(());
        }
    }

    // Step 4: React to the refresh signal the way a UI would
    if refresh.changed().await.is_ok() {
        println!("   🔄 Refresh signal received (counter = {})", *refresh.borrow());
    }

    // Step 5: Query recent marketplace events
    println!("\n📜 Step 3: Recent listings");
    let events = chain.query_events(&package_id, EventKind::Listed).await?;
    println!("   {} HeroListed events", events.len());
    for event in events.iter().take(5) {
        if let HeroEvent::Listed {
            listing_id, price, ..
        } = event
        {
            println!(
                "   - {} at {} base units",
                short_id(listing_id),
                price
            );
        }
    }

    println!("\n{}", "=".repeat(60));
    println!("🎉 Done");
    Ok(())
}
