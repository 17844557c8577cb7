use super::env::Env;
use crate::utils::address::same_address;

/// Immutable per-target settings handed to the analyzer.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub chain_id: String,
    pub token_limit: usize,
    pub history_limit: usize,
    pub bundle_score_threshold: f64,
    pub refresh_known_bundles: bool,
    /// Never counted as suspects, in addition to the target itself.
    pub excluded_addresses: Vec<String>,
}

impl RunConfig {
    pub fn new(chain_id: &str) -> Self {
        Self {
            chain_id: chain_id.to_string(),
            token_limit: 50,
            history_limit: 100,
            bundle_score_threshold: 0.2,
            refresh_known_bundles: false,
            excluded_addresses: Vec::new(),
        }
    }

    /// Every configured target is excluded so targets never flag each other.
    pub fn from_env(env: &Env) -> Self {
        Self {
            chain_id: env.chain_id.clone(),
            token_limit: env.token_limit,
            history_limit: env.history_limit,
            bundle_score_threshold: env.bundle_score_threshold,
            refresh_known_bundles: env.refresh_known_bundles,
            excluded_addresses: env.target_addresses.clone(),
        }
    }

    pub fn with_token_limit(mut self, token_limit: usize) -> Self {
        self.token_limit = token_limit;
        self
    }

    pub fn with_history_limit(mut self, history_limit: usize) -> Self {
        self.history_limit = history_limit;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.bundle_score_threshold = threshold;
        self
    }

    pub fn with_refresh_known_bundles(mut self, refresh: bool) -> Self {
        self.refresh_known_bundles = refresh;
        self
    }

    pub fn with_excluded(mut self, addresses: &[&str]) -> Self {
        self.excluded_addresses = addresses.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn is_excluded(&self, target: &str, address: &str) -> bool {
        same_address(target, address)
            || self
                .excluded_addresses
                .iter()
                .any(|excluded| same_address(excluded, address))
    }
}
