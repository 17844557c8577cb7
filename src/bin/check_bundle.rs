//! Look up suspect addresses in the bundle store
//!
//! Usage: cargo run --bin check_bundle -- <address> [address...]

use anyhow::Result;
use colored::*;
use okx_bundle_finder::config::{connect_store, load_env};
use okx_bundle_finder::services::BundleStore;
use okx_bundle_finder::utils::address::normalize_address;
use okx_bundle_finder::utils::init_tracing;
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let addresses: Vec<String> = env::args().skip(1).map(|a| normalize_address(&a)).collect();
    if addresses.is_empty() {
        println!("Usage: cargo run --bin check_bundle -- <address> [address...]");
        return Ok(());
    }

    let config = load_env()?;
    let Some(store) = connect_store(&config) else {
        println!("{}", "Set SUPABASE_URL and SUPABASE_KEY to query the bundle store.".yellow());
        return Ok(());
    };

    println!("\n🔍 Checking {} address(es) on chain {}\n", addresses.len(), config.chain_id);
    for address in &addresses {
        match store.exists(&config.chain_id, address).await {
            Ok(true) => println!("   {} {}", "⚠ KNOWN BUNDLE".red().bold(), address),
            Ok(false) => println!("   {} {}", "✓ not recorded".green(), address),
            Err(e) => println!("   {} {} ({})", "✗ lookup failed".yellow(), address, e),
        }
    }
    println!();
    Ok(())
}
