use anyhow::Result;
use colored::Colorize;
use okx_bundle_finder::config::{connect_store, load_env, RunConfig};
use okx_bundle_finder::interfaces::RunStatus;
use okx_bundle_finder::services::{BundleAnalyzer, BundleStore, OkxMarketClient};
use okx_bundle_finder::utils::{init_tracing, write_reports, Logger};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let env = load_env()?;
    Logger::set_file_logging(env.log_to_file);

    println!("\n{} First time running the finder?", "💡".yellow());
    println!("   List commands: {}", "cargo run --bin help".cyan());
    println!("   Run health check: {}\n", "cargo run --bin health_check".cyan());

    Logger::startup(&env.target_addresses, &env.chain_id, env.token_limit, env.history_limit);

    let client = OkxMarketClient::from_env(&env)?;
    let store = connect_store(&env);
    let config = RunConfig::from_env(&env);
    let analyzer = BundleAnalyzer::new(&client, &config)
        .with_store(store.as_ref().map(|s| s as &dyn BundleStore));

    Logger::separator();
    Logger::info(&format!("🚀 Starting analysis for {} target(s)...", env.target_addresses.len()));

    let total = env.target_addresses.len();
    let mut reports = Vec::with_capacity(total);
    for (index, target) in env.target_addresses.iter().enumerate() {
        Logger::target(index + 1, total, target);

        let report = analyzer.analyze(target).await;
        match report.status {
            RunStatus::NoData => Logger::warning("No data: the token list came back empty"),
            RunStatus::NoBuyHistory => Logger::warning("No valid buy history found for this target"),
            RunStatus::Completed => {
                Logger::success(&format!(
                    "Scanned {} valid tokens with buy history ({} fetched, {} failed calls)",
                    report.valid_token_count, report.tokens_fetched, report.failed_calls
                ));
                Logger::top_suspects(&report.suspects, env.top_n, env.bundle_score_threshold);
                Logger::verdict(
                    report.bundle_candidates(env.bundle_score_threshold).count(),
                    env.bundle_score_threshold,
                );
            }
        }
        if let Some(summary) = &report.persistence {
            Logger::info(&format!(
                "Bundle store: {} checked, {} saved, {} already known, {} failed",
                summary.checked, summary.inserted, summary.already_known, summary.failed
            ));
        }
        reports.push(report);
    }

    Logger::separator();
    match write_reports(&env.report_path, &reports).await {
        Ok(Some((json_path, csv_path))) => Logger::success(&format!(
            "Report saved to: {} and {}",
            json_path.display(),
            csv_path.display()
        )),
        Ok(None) => Logger::warning("No data found to report."),
        Err(e) => Logger::error(&format!("Failed to save report: {:#}", e)),
    }

    Ok(())
}
