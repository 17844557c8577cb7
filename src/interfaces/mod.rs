use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Token entry from the PnL token list (`data.tokenList[]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    #[serde(default)]
    pub token_symbol: Option<String>,
    #[serde(default)]
    pub token_contract_address: Option<String>,
}

impl TokenRecord {
    pub fn new(symbol: &str, contract: &str) -> Self {
        Self {
            token_symbol: Some(symbol.to_string()),
            token_contract_address: Some(contract.to_string()),
        }
    }

    pub fn symbol(&self) -> &str {
        self.token_symbol.as_deref().unwrap_or("Unknown")
    }

    /// Contract address, `None` when missing or blank.
    pub fn contract(&self) -> Option<&str> {
        self.token_contract_address
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// Trade entry from the trading-history filter list (`data.list[]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRecord {
    #[serde(default, deserialize_with = "deserialize_trade_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub user_address: Option<String>,
    #[serde(default, deserialize_with = "deserialize_buy_flag")]
    pub is_buy: bool,
}

impl TradeRecord {
    pub fn buy(id: &str, user_address: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            user_address: Some(user_address.to_string()),
            is_buy: true,
        }
    }

    pub fn sell(id: &str, user_address: &str) -> Self {
        Self {
            is_buy: false,
            ..Self::buy(id, user_address)
        }
    }
}

// Upstream sends ids as strings on some chains and integers on others.
fn deserialize_trade_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

// Only `1` and `"1"` mark a buy.
fn deserialize_buy_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_i64() == Some(1),
        Value::String(s) => s == "1",
        _ => false,
    })
}

/// Per-suspect result of one target analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspectScore {
    pub target_address: String,
    pub suspect_address: String,
    pub count: u32,
    pub total_analyzed: u32,
    pub score: f64,
}

impl SuspectScore {
    /// Threshold is inclusive.
    pub fn is_bundle(&self, threshold: f64) -> bool {
        self.score >= threshold
    }
}

/// Row of the `bundles` table, unique on `(chain_id, suspect_address)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleRecord {
    pub chain_id: String,
    pub suspect_address: String,
    pub score: f64,
    pub count: u32,
    pub total_analyzed: u32,
    pub updated_at: String,
}

impl BundleRecord {
    pub fn from_suspect(chain_id: &str, suspect: &SuspectScore, now: DateTime<Utc>) -> Self {
        Self {
            chain_id: chain_id.to_string(),
            suspect_address: suspect.suspect_address.clone(),
            score: suspect.score,
            count: suspect.count,
            total_analyzed: suspect.total_analyzed,
            updated_at: now.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Running,
    Ok,
    Empty,
    Disabled,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStep {
    pub name: String,
    pub status: StepStatus,
    pub message: String,
    pub ts: i64,
}

impl RunStep {
    pub fn running(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: StepStatus::Running,
            message: String::new(),
            ts: Utc::now().timestamp(),
        }
    }

    pub fn finish(&mut self, status: StepStatus, message: impl Into<String>) {
        self.status = status;
        self.message = message.into();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// At least one token had an anchor buy.
    Completed,
    /// The token list came back empty.
    NoData,
    /// Tokens were fetched but the target never bought any of them.
    NoBuyHistory,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistenceSummary {
    pub checked: usize,
    pub inserted: usize,
    pub already_known: usize,
    pub failed: usize,
}

/// Everything one target run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub target_address: String,
    pub chain_id: String,
    pub status: RunStatus,
    pub steps: Vec<RunStep>,
    pub tokens_fetched: usize,
    pub valid_token_count: u32,
    pub failed_calls: usize,
    pub suspects: Vec<SuspectScore>,
    pub has_bundle: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistence: Option<PersistenceSummary>,
}

impl AnalysisReport {
    pub fn bundle_candidates(&self, threshold: f64) -> impl Iterator<Item = &SuspectScore> {
        self.suspects.iter().filter(move |s| s.is_bundle(threshold))
    }
}
