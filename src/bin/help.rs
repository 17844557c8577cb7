//! Help command - lists the finder's commands and configuration

use colored::*;

fn main() {
    println!("{}", "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".cyan().bold());
    println!("{}", "     🕵️  OKX BUNDLE FINDER - COMMANDS".cyan().bold());
    println!("{}\n", "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".cyan().bold());

    println!("{}\n", "📖 GETTING STARTED".yellow().bold());
    println!("  {}   Verify the market API and bundle store", "cargo run --bin health_check".green());
    println!("  {}          Compile Rust project", "cargo build --release".green());
    println!("  {}              Analyze every TARGET_ADDRESSES entry", "cargo run --release".green());
    println!();

    println!("{}\n", "🔍 BUNDLE LOOKUP".yellow().bold());
    println!(
        "  {}  Check addresses against stored bundles",
        "cargo run --bin check_bundle -- <address>...".green()
    );
    println!();

    println!("{}\n", "⚙️  CONFIGURATION (.env)".yellow().bold());
    let vars = [
        ("TARGET_ADDRESSES", "Wallets to analyze (comma list or JSON array)", "required"),
        ("CHAIN_ID", "OKX chain id (56 = BSC, 501 = Solana)", "56"),
        ("SCAN_SCOPE", "Token preset: low=30, middle=50, high=100", "middle"),
        ("TOKEN_LIMIT", "Tokens fetched per target (overrides SCAN_SCOPE)", "50"),
        ("HISTORY_LIMIT", "Trades scanned before the first buy", "100"),
        ("BUNDLE_SCORE_THRESHOLD", "Score at or above which a wallet is a bundle", "0.2"),
        ("TOP_N", "Suspects printed per target", "10"),
        ("OKX_API_BASE_URL", "Market API base URL", "OKX web3"),
        ("REQUEST_TIMEOUT_MS", "Per-request timeout", "20000"),
        ("REQUEST_DELAY_MS", "Minimum spacing between API calls", "250"),
        ("SUPABASE_URL / SUPABASE_KEY", "Enable bundle persistence", "unset"),
        ("REFRESH_KNOWN_BUNDLES", "Re-upsert bundles already stored", "false"),
        ("REPORT_PATH", "Report base path (.json and .csv)", "sock_puppet_report"),
        ("LOG_TO_FILE", "Mirror console output to logs/", "true"),
    ];
    for (name, description, default) in vars {
        println!("  {:<28} {} {}", name.green(), description, format!("[{}]", default).dimmed());
    }
    println!();

    println!("{}\n", "📝 NOTES".yellow().bold());
    println!("  • Score = tokens where the wallet bought just before the target / tokens with a target buy");
    println!("  • Set RUST_LOG=debug for per-token diagnostics");
    println!();
}
