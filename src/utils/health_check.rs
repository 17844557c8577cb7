use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::config::Env;
use crate::services::bundle_store::{BundleStore, SupabaseStore};
use crate::services::market_data::OkxMarketClient;
use crate::utils::logger::Logger;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub healthy: bool,
    pub checks: HealthChecks,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthChecks {
    pub market_api: CheckResult,
    pub bundle_store: CheckResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Disabled,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub status: CheckStatus,
    pub message: String,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Ok,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Error,
            message: message.into(),
        }
    }
}

/// Probes the upstream token-list endpoint with the first target and, when
/// configured, the `bundles` resource. A disabled store is still healthy.
pub async fn perform_health_check(env: &Env) -> Result<HealthCheckResult> {
    let client = OkxMarketClient::from_env(env)?;
    let probe_wallet = env.target_addresses.first().map(String::as_str).unwrap_or_default();

    let market_api = match client.fetch_token_page(probe_wallet, &env.chain_id, 0, 1).await {
        Ok(tokens) => CheckResult::ok(format!(
            "API responding at {} ({} token(s) on first page)",
            client.base_url(),
            tokens.len()
        )),
        Err(e) => CheckResult::error(format!("API check failed: {}", e)),
    };

    let bundle_store = match &env.supabase {
        None => CheckResult {
            status: CheckStatus::Disabled,
            message: "Supabase not configured".to_string(),
        },
        Some(supabase) => {
            let timeout = std::time::Duration::from_millis(env.request_timeout_ms);
            match SupabaseStore::new(&supabase.url, &supabase.key, timeout) {
                Ok(store) => match store.exists(&env.chain_id, probe_wallet).await {
                    Ok(_) => CheckResult::ok(format!("bundles table reachable at {}", store.host())),
                    Err(e) => CheckResult::error(format!("Store check failed: {}", e)),
                },
                Err(e) => CheckResult::error(format!("Store misconfigured: {}", e)),
            }
        }
    };

    let healthy = market_api.status == CheckStatus::Ok && bundle_store.status != CheckStatus::Error;

    Ok(HealthCheckResult {
        healthy,
        checks: HealthChecks {
            market_api,
            bundle_store,
        },
        timestamp: chrono::Utc::now().timestamp(),
    })
}

fn icon(status: &CheckStatus) -> &'static str {
    match status {
        CheckStatus::Ok => "✅",
        CheckStatus::Disabled => "⏸",
        CheckStatus::Error => "❌",
    }
}

pub fn log_health_check(result: &HealthCheckResult) {
    Logger::separator();
    Logger::header("🏥 HEALTH CHECK");
    Logger::info(&format!(
        "Overall Status: {}",
        if result.healthy { "✅ Healthy" } else { "❌ Unhealthy" }
    ));
    Logger::info(&format!(
        "Market API: {} {}",
        icon(&result.checks.market_api.status),
        result.checks.market_api.message
    ));
    Logger::info(&format!(
        "Bundle store: {} {}",
        icon(&result.checks.bundle_store.status),
        result.checks.bundle_store.message
    ));
    Logger::separator();
}
