//! Standalone health check utility

use anyhow::Result;
use colored::*;
use okx_bundle_finder::config::{load_env, Env};
use okx_bundle_finder::utils::health_check::{CheckStatus, HealthCheckResult};
use okx_bundle_finder::utils::{init_tracing, log_health_check, perform_health_check, Logger};

fn print_header() {
    println!("\n{}", "━".repeat(60).cyan().bold());
    println!("{}", "     🏥 BUNDLE FINDER - HEALTH CHECK".cyan().bold());
    println!("{}\n", "━".repeat(60).cyan().bold());
}

fn print_configuration(env: &Env) {
    println!("{}", "📊 Configuration Summary:".cyan());
    println!();
    println!("   Chain ID: {}", env.chain_id);
    println!("   Market API: {}", env.okx_base_url);
    println!("   Analyzing {} target(s):", env.target_addresses.len());
    for (idx, addr) in env.target_addresses.iter().enumerate() {
        println!("      {}. {}", idx + 1, Logger::format_address(addr));
    }
    println!("   Tokens per target: {}", env.token_limit);
    println!("   History window: {}", env.history_limit);
    println!("   Bundle threshold: {}", env.bundle_score_threshold);
    println!("   Request spacing: {}ms (timeout {}ms)", env.request_delay_ms, env.request_timeout_ms);
    println!();
}

fn print_recommendations(result: &HealthCheckResult) {
    let mut issues = 0;

    if result.checks.market_api.status == CheckStatus::Error {
        issues += 1;
        println!("{}\n", "📋 Market API Issue:".red().bold());
        println!("   • Check your internet connection");
        println!("   • Verify OKX_API_BASE_URL in .env (default is the OKX web3 market API)");
        println!("   • The API may be rate limiting you; raise REQUEST_DELAY_MS\n");
    }

    match result.checks.bundle_store.status {
        CheckStatus::Error => {
            issues += 1;
            println!("{}\n", "📋 Bundle Store Issue:".red().bold());
            println!("   • Check SUPABASE_URL and SUPABASE_KEY in .env");
            println!("   • Make sure the `bundles` table exists with a unique (chain_id, suspect_address)\n");
        }
        CheckStatus::Disabled => {
            println!("{}\n", "ℹ  Bundle persistence is disabled (no Supabase credentials).".yellow());
        }
        CheckStatus::Ok => {}
    }

    if issues == 0 {
        println!("{}\n", "🎉 All Systems Operational!".green().bold());
        println!("{}", "You're ready to run an analysis:".cyan());
        println!("   {}\n", "cargo run --release".green());
    } else {
        println!("{}\n", format!("⚠️  {} Issue(s) Found", issues).red().bold());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    print_header();
    println!("{}\n", "⏳ Running diagnostic checks...".yellow());

    let env = load_env()?;
    let result = perform_health_check(&env).await?;

    log_health_check(&result);
    print_configuration(&env);
    print_recommendations(&result);

    std::process::exit(if result.healthy { 0 } else { 1 });
}
