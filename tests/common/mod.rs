//! Common test utilities and helpers

#![allow(dead_code)]

use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tempfile::TempDir;

use okx_bundle_finder::interfaces::{BundleRecord, TokenRecord, TradeRecord};
use okx_bundle_finder::services::{
    BundleStore, MarketDataSource, SortOrder, StoreError, TokenListing, TradeQuery,
};
use okx_bundle_finder::utils::FetchError;

pub const TARGET: &str = "0x1111111111111111111111111111111111111111";
pub const OTHER_TARGET: &str = "0x2222222222222222222222222222222222222222";

/// Create a temporary directory holding a `.env` with the given body
pub fn create_test_env_file(contents: &str) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    fs::write(temp_dir.path().join(".env"), contents).expect("Failed to write test .env file");
    temp_dir
}

pub fn addrs(list: &[&str]) -> Vec<String> {
    list.iter().map(|a| a.to_string()).collect()
}

#[derive(Default)]
struct FakeToken {
    /// Trades returned for the target's ascending anchor lookup.
    own_trades: Vec<TradeRecord>,
    /// Trades returned for the descending window before the anchor.
    preceding: Vec<TradeRecord>,
    fail_anchor: bool,
    fail_preceding: bool,
}

/// In-memory market keyed by token contract.
#[derive(Default)]
pub struct FakeMarket {
    tokens: Vec<TokenRecord>,
    by_contract: HashMap<String, FakeToken>,
    token_list_failure: bool,
    trade_calls: AtomicUsize,
    queries: Mutex<Vec<TradeQuery>>,
}

impl FakeMarket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token where the target's first buy is `anchor` and `buyers` bought
    /// right before it, newest first.
    pub fn with_token(mut self, symbol: &str, contract: &str, anchor: &str, buyers: &[&str]) -> Self {
        self.tokens.push(TokenRecord::new(symbol, contract));
        let preceding = buyers
            .iter()
            .enumerate()
            .map(|(i, buyer)| TradeRecord::buy(&format!("{}-{}", contract, i), buyer))
            .collect();
        self.by_contract.insert(
            contract.to_string(),
            FakeToken {
                own_trades: vec![TradeRecord::sell("s0", TARGET), TradeRecord::buy(anchor, TARGET)],
                preceding,
                ..Default::default()
            },
        );
        self
    }

    /// Token the target holds but never bought.
    pub fn with_unbought_token(mut self, symbol: &str, contract: &str) -> Self {
        self.tokens.push(TokenRecord::new(symbol, contract));
        self.by_contract.insert(
            contract.to_string(),
            FakeToken {
                own_trades: vec![TradeRecord::sell("s0", TARGET)],
                preceding: vec![TradeRecord::buy("p0", "0xshouldnotappear")],
                ..Default::default()
            },
        );
        self
    }

    pub fn with_preceding_sells(mut self, contract: &str, sellers: &[&str]) -> Self {
        if let Some(token) = self.by_contract.get_mut(contract) {
            token
                .preceding
                .extend(sellers.iter().map(|s| TradeRecord::sell("sell", s)));
        }
        self
    }

    pub fn with_failing_anchor(mut self, symbol: &str, contract: &str) -> Self {
        self.tokens.push(TokenRecord::new(symbol, contract));
        self.by_contract.insert(
            contract.to_string(),
            FakeToken {
                fail_anchor: true,
                ..Default::default()
            },
        );
        self
    }

    pub fn with_failing_window(mut self, symbol: &str, contract: &str, anchor: &str) -> Self {
        self.tokens.push(TokenRecord::new(symbol, contract));
        self.by_contract.insert(
            contract.to_string(),
            FakeToken {
                own_trades: vec![TradeRecord::buy(anchor, TARGET)],
                fail_preceding: true,
                ..Default::default()
            },
        );
        self
    }

    pub fn with_raw_token(mut self, token: TokenRecord) -> Self {
        self.tokens.push(token);
        self
    }

    pub fn with_token_list_failure(mut self) -> Self {
        self.token_list_failure = true;
        self
    }

    pub fn trade_calls(&self) -> usize {
        self.trade_calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<TradeQuery> {
        self.queries.lock().unwrap().clone()
    }
}

fn server_error() -> FetchError {
    FetchError::HttpStatus(StatusCode::INTERNAL_SERVER_ERROR)
}

#[async_trait]
impl MarketDataSource for FakeMarket {
    async fn fetch_token_list(&self, _wallet: &str, _chain_id: &str, desired_count: usize) -> TokenListing {
        if self.token_list_failure {
            return TokenListing {
                tokens: Vec::new(),
                failure: Some(server_error()),
            };
        }
        TokenListing {
            tokens: self.tokens.iter().take(desired_count).cloned().collect(),
            failure: None,
        }
    }

    async fn fetch_trades(&self, query: &TradeQuery) -> Result<Vec<TradeRecord>, FetchError> {
        self.trade_calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.clone());

        let Some(token) = self.by_contract.get(&query.token_address) else {
            return Ok(Vec::new());
        };
        match query.order {
            SortOrder::Ascending => {
                if token.fail_anchor {
                    return Err(server_error());
                }
                Ok(token.own_trades.clone())
            }
            SortOrder::Descending => {
                if token.fail_preceding {
                    return Err(server_error());
                }
                Ok(token.preceding.iter().take(query.limit).cloned().collect())
            }
        }
    }
}

/// Bundle store that remembers every call.
#[derive(Default)]
pub struct RecordingStore {
    known: Mutex<HashSet<String>>,
    pub upserts: Mutex<Vec<BundleRecord>>,
    pub exists_calls: AtomicUsize,
    fail_upsert: bool,
    fail_exists: bool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_known(self, address: &str) -> Self {
        self.known.lock().unwrap().insert(address.to_string());
        self
    }

    pub fn failing_upserts(mut self) -> Self {
        self.fail_upsert = true;
        self
    }

    pub fn failing_lookups(mut self) -> Self {
        self.fail_exists = true;
        self
    }

    pub fn upserted_addresses(&self) -> Vec<String> {
        self.upserts
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.suspect_address.clone())
            .collect()
    }
}

#[async_trait]
impl BundleStore for RecordingStore {
    async fn exists(&self, _chain_id: &str, suspect_address: &str) -> Result<bool, StoreError> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_exists {
            return Err(StoreError::HttpStatus(StatusCode::SERVICE_UNAVAILABLE));
        }
        Ok(self.known.lock().unwrap().contains(suspect_address))
    }

    async fn upsert(&self, record: &BundleRecord) -> Result<(), StoreError> {
        if self.fail_upsert {
            return Err(StoreError::HttpStatus(StatusCode::INTERNAL_SERVER_ERROR));
        }
        self.upserts.lock().unwrap().push(record.clone());
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "Recording"
    }
}
