use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::utils::address::{is_valid_address, normalize_address, SOLANA_CHAIN_ID};
use crate::utils::logger::Logger;

pub const DEFAULT_OKX_BASE_URL: &str = "https://web3.okx.com/priapi/v1/dx/market/v2";

/// Token-count presets offered by the web form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanScope {
    Low,
    Middle,
    High,
}

impl ScanScope {
    pub fn token_count(self) -> usize {
        match self {
            ScanScope::Low => 30,
            ScanScope::Middle => 50,
            ScanScope::High => 100,
        }
    }
}

impl FromStr for ScanScope {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(ScanScope::Low),
            "middle" | "medium" => Ok(ScanScope::Middle),
            "high" => Ok(ScanScope::High),
            other => anyhow::bail!("Invalid SCAN_SCOPE: {} (expected low, middle or high)", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseConfig {
    pub url: String,
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct Env {
    pub target_addresses: Vec<String>,
    pub chain_id: String,
    pub token_limit: usize,
    pub history_limit: usize,
    pub bundle_score_threshold: f64,
    pub top_n: usize,
    pub okx_base_url: String,
    pub request_timeout_ms: u64,
    pub request_delay_ms: u64,
    pub supabase: Option<SupabaseConfig>,
    pub refresh_known_bundles: bool,
    pub report_path: PathBuf,
    pub log_to_file: bool,
}

fn parse_or<T>(lookup: &dyn Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(raw) => raw.parse::<T>().with_context(|| format!("Invalid {}: {}", key, raw)),
        None => Ok(default),
    }
}

fn validate_url(key: &str, value: &str) -> Result<()> {
    let parsed = url::Url::parse(value).with_context(|| format!("Invalid {}: {}", key, value))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("Invalid {}: must be a valid HTTP/HTTPS URL", key);
    }
    Ok(())
}

pub fn parse_target_addresses(input: &str, chain_id: &str) -> Result<Vec<String>> {
    let trimmed = input.trim();

    let raw: Vec<String> = if trimmed.starts_with('[') && trimmed.ends_with(']') {
        serde_json::from_str(trimmed).context("Invalid JSON format for TARGET_ADDRESSES")?
    } else {
        trimmed.split(',').map(str::to_string).collect()
    };

    let mut addresses: Vec<String> = Vec::new();
    for addr in raw.iter().map(|a| normalize_address(a)).filter(|a| !a.is_empty()) {
        if !is_valid_address(chain_id, &addr) {
            let expected = if chain_id == SOLANA_CHAIN_ID {
                "base58, 32-44 characters"
            } else {
                "0x followed by 40 hexadecimal characters"
            };
            anyhow::bail!("Invalid address in TARGET_ADDRESSES: {} (expected {})", addr, expected);
        }
        if !addresses.contains(&addr) {
            addresses.push(addr);
        }
    }

    if addresses.is_empty() {
        anyhow::bail!("TARGET_ADDRESSES must contain at least one address");
    }
    Ok(addresses)
}

/// Missing or unusable credentials disable persistence; the run goes on
/// without it.
fn parse_supabase(lookup: &dyn Fn(&str) -> Option<String>) -> Option<SupabaseConfig> {
    let supabase_url = lookup("SUPABASE_URL").filter(|v| !v.trim().is_empty());
    let supabase_key = lookup("SUPABASE_KEY").filter(|v| !v.trim().is_empty());
    match (supabase_url, supabase_key) {
        (Some(url), Some(key)) => {
            let url = url.trim().trim_end_matches('/').to_string();
            if let Err(e) = validate_url("SUPABASE_URL", &url) {
                Logger::warning(&format!("{:#}, bundle persistence disabled", e));
                return None;
            }
            Some(SupabaseConfig {
                url,
                key: key.trim().to_string(),
            })
        }
        (None, None) => None,
        (Some(_), None) => {
            Logger::warning("SUPABASE_URL is set but SUPABASE_KEY is missing, bundle persistence disabled");
            None
        }
        (None, Some(_)) => {
            Logger::warning("SUPABASE_KEY is set but SUPABASE_URL is missing, bundle persistence disabled");
            None
        }
    }
}

impl Env {
    /// Builds the configuration from any key lookup (process env, a parsed
    /// `.env` file, a map in tests).
    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        let chain_id = lookup("CHAIN_ID")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "56".to_string());
        if !chain_id.chars().all(|c| c.is_ascii_digit()) {
            anyhow::bail!("Invalid CHAIN_ID: {} (expected a numeric chain id)", chain_id);
        }

        let targets_raw = lookup("TARGET_ADDRESSES").context("TARGET_ADDRESSES is required")?;
        let target_addresses = parse_target_addresses(&targets_raw, &chain_id)?;

        let scope_default = match lookup("SCAN_SCOPE").filter(|v| !v.trim().is_empty()) {
            Some(raw) => raw.parse::<ScanScope>()?.token_count(),
            None => ScanScope::Middle.token_count(),
        };
        let token_limit = parse_or(lookup, "TOKEN_LIMIT", scope_default)?;
        if !(1..=1000).contains(&token_limit) {
            anyhow::bail!("Invalid TOKEN_LIMIT: must be between 1 and 1000");
        }

        let history_limit = parse_or(lookup, "HISTORY_LIMIT", 100usize)?;
        if !(1..=1000).contains(&history_limit) {
            anyhow::bail!("Invalid HISTORY_LIMIT: must be between 1 and 1000");
        }

        let bundle_score_threshold = parse_or(lookup, "BUNDLE_SCORE_THRESHOLD", 0.2f64)?;
        if !(0.0..=1.0).contains(&bundle_score_threshold) {
            anyhow::bail!("Invalid BUNDLE_SCORE_THRESHOLD: must be between 0 and 1");
        }

        let top_n = parse_or(lookup, "TOP_N", 10usize)?;

        let okx_base_url = lookup("OKX_API_BASE_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_OKX_BASE_URL.to_string());
        validate_url("OKX_API_BASE_URL", &okx_base_url)?;

        let request_timeout_ms = parse_or(lookup, "REQUEST_TIMEOUT_MS", 20_000u64)?;
        if request_timeout_ms < 1000 {
            anyhow::bail!("Invalid REQUEST_TIMEOUT_MS: must be at least 1000ms");
        }
        let request_delay_ms = parse_or(lookup, "REQUEST_DELAY_MS", 250u64)?;

        let supabase = parse_supabase(lookup);

        Ok(Env {
            target_addresses,
            chain_id,
            token_limit,
            history_limit,
            bundle_score_threshold,
            top_n,
            okx_base_url,
            request_timeout_ms,
            request_delay_ms,
            supabase,
            refresh_known_bundles: parse_or(lookup, "REFRESH_KNOWN_BUNDLES", false)?,
            report_path: PathBuf::from(
                lookup("REPORT_PATH")
                    .filter(|v| !v.trim().is_empty())
                    .unwrap_or_else(|| "sock_puppet_report".to_string()),
            ),
            log_to_file: parse_or(lookup, "LOG_TO_FILE", true)?,
        })
    }
}

pub fn load_env() -> Result<Env> {
    dotenvy::dotenv().ok(); // Load .env file if it exists
    Env::from_lookup(&|key: &str| std::env::var(key).ok())
}

/// Reads only the given file; the process environment is not consulted.
pub fn load_env_file(path: &Path) -> Result<Env> {
    let mut values = HashMap::new();
    for item in dotenvy::from_path_iter(path)
        .with_context(|| format!("Failed to read {}", path.display()))?
    {
        let (key, value) = item.with_context(|| format!("Malformed line in {}", path.display()))?;
        values.insert(key, value);
    }
    Env::from_lookup(&|key: &str| values.get(key).cloned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: &str = "0x8d73a36d78e2ae4a437053c9ce3be70d483ab74d";

    fn env_from(pairs: &[(&str, &str)]) -> Result<Env> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Env::from_lookup(&|key: &str| map.get(key).cloned())
    }

    #[test]
    fn defaults_follow_batch_script() {
        let env = env_from(&[("TARGET_ADDRESSES", TARGET)]).unwrap();
        assert_eq!(env.chain_id, "56");
        assert_eq!(env.token_limit, 50);
        assert_eq!(env.history_limit, 100);
        assert_eq!(env.bundle_score_threshold, 0.2);
        assert_eq!(env.request_timeout_ms, 20_000);
        assert_eq!(env.request_delay_ms, 250);
        assert_eq!(env.okx_base_url, DEFAULT_OKX_BASE_URL);
        assert!(env.supabase.is_none());
        assert!(!env.refresh_known_bundles);
    }

    #[test]
    fn targets_accept_json_array_and_lowercase() {
        let env = env_from(&[(
            "TARGET_ADDRESSES",
            r#"["0x8D73A36D78E2AE4A437053C9CE3BE70D483AB74D", "0x1111111111111111111111111111111111111111"]"#,
        )])
        .unwrap();
        assert_eq!(env.target_addresses[0], TARGET);
        assert_eq!(env.target_addresses.len(), 2);
    }

    #[test]
    fn duplicate_targets_collapse() {
        let raw = format!("{},{}", TARGET, TARGET.to_uppercase().replace("0X", "0x"));
        let env = env_from(&[("TARGET_ADDRESSES", raw.as_str())]).unwrap();
        assert_eq!(env.target_addresses, vec![TARGET.to_string()]);
    }

    #[test]
    fn solana_targets_need_solana_chain() {
        let sol = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";
        assert!(env_from(&[("TARGET_ADDRESSES", sol)]).is_err());
        let env = env_from(&[("TARGET_ADDRESSES", sol), ("CHAIN_ID", "501")]).unwrap();
        assert_eq!(env.target_addresses, vec![sol.to_string()]);
    }

    #[test]
    fn scope_sets_token_limit_unless_overridden() {
        let env = env_from(&[("TARGET_ADDRESSES", TARGET), ("SCAN_SCOPE", "high")]).unwrap();
        assert_eq!(env.token_limit, 100);
        let env = env_from(&[
            ("TARGET_ADDRESSES", TARGET),
            ("SCAN_SCOPE", "low"),
            ("TOKEN_LIMIT", "12"),
        ])
        .unwrap();
        assert_eq!(env.token_limit, 12);
        assert!(env_from(&[("TARGET_ADDRESSES", TARGET), ("SCAN_SCOPE", "huge")]).is_err());
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(env_from(&[("TARGET_ADDRESSES", TARGET), ("BUNDLE_SCORE_THRESHOLD", "1.5")]).is_err());
        assert!(env_from(&[("TARGET_ADDRESSES", TARGET), ("REQUEST_TIMEOUT_MS", "10")]).is_err());
        assert!(env_from(&[("TARGET_ADDRESSES", TARGET), ("HISTORY_LIMIT", "0")]).is_err());
        assert!(env_from(&[("TARGET_ADDRESSES", TARGET), ("TOKEN_LIMIT", "abc")]).is_err());
        assert!(env_from(&[]).is_err());
    }

    #[test]
    fn supabase_disabled_unless_fully_configured() {
        let env = env_from(&[
            ("TARGET_ADDRESSES", TARGET),
            ("SUPABASE_URL", "https://abc.supabase.co/"),
            ("SUPABASE_KEY", "service-key"),
        ])
        .unwrap();
        assert_eq!(
            env.supabase,
            Some(SupabaseConfig {
                url: "https://abc.supabase.co".to_string(),
                key: "service-key".to_string(),
            })
        );
        let half = env_from(&[("TARGET_ADDRESSES", TARGET), ("SUPABASE_URL", "https://abc.supabase.co")]).unwrap();
        assert!(half.supabase.is_none());
        let key_only = env_from(&[("TARGET_ADDRESSES", TARGET), ("SUPABASE_KEY", "service-key")]).unwrap();
        assert!(key_only.supabase.is_none());
        let bad_url = env_from(&[
            ("TARGET_ADDRESSES", TARGET),
            ("SUPABASE_URL", "ftp://abc.supabase.co"),
            ("SUPABASE_KEY", "service-key"),
        ])
        .unwrap();
        assert!(bad_url.supabase.is_none());
    }
}
