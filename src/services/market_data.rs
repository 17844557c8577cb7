//! OKX web3 market data: the PnL token list and the trading-history filter.
//!
//! Every call goes through one [`RateLimiter`] and is attempted exactly once.
//! Failures come back as [`FetchError`]; deciding what a failure means is left
//! to the caller.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

use crate::config::Env;
use crate::interfaces::{TokenRecord, TradeRecord};
use crate::utils::fetch_data::{build_http_client, get_json, post_json, FetchError};
use crate::utils::rate_limiter::RateLimiter;

pub const TOKEN_PAGE_SIZE: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Oldest first.
    Ascending,
    /// Newest first.
    Descending,
}

/// One windowed trading-history query.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeQuery {
    pub token_address: String,
    pub chain_id: String,
    /// Restricts results to this wallet's trades.
    pub wallet: Option<String>,
    /// Anchors the window at this trade id ("everything before it" when descending).
    pub anchor_id: Option<String>,
    pub order: SortOrder,
    pub limit: usize,
}

/// Token list plus the reason paging stopped early, if it did.
#[derive(Debug, Default)]
pub struct TokenListing {
    pub tokens: Vec<TokenRecord>,
    pub failure: Option<FetchError>,
}

#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Never fails as a whole: returns whatever was collected before a failure.
    async fn fetch_token_list(&self, wallet: &str, chain_id: &str, desired_count: usize) -> TokenListing;

    async fn fetch_trades(&self, query: &TradeQuery) -> Result<Vec<TradeRecord>, FetchError>;
}

/// Pages through `fetch_page(offset)` until `desired_count` tokens are held,
/// a page comes back short, or a page fails.
pub async fn collect_token_pages<F, Fut>(desired_count: usize, page_size: usize, mut fetch_page: F) -> TokenListing
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<Vec<TokenRecord>, FetchError>>,
{
    let mut listing = TokenListing::default();
    let mut offset = 0;

    while listing.tokens.len() < desired_count {
        match fetch_page(offset).await {
            Ok(page) => {
                let full_page = page.len() >= page_size;
                listing.tokens.extend(page);
                if !full_page {
                    break;
                }
                offset += page_size;
            }
            Err(e) => {
                tracing::warn!(offset, error = %e, "token list page failed, keeping {} tokens", listing.tokens.len());
                listing.failure = Some(e);
                break;
            }
        }
    }

    listing.tokens.truncate(desired_count);
    listing
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    code: Value,
    #[serde(default)]
    msg: Option<String>,
    data: Option<T>,
}

impl<T> Envelope<T> {
    fn into_data(self) -> Result<Option<T>, FetchError> {
        if self.code.as_f64() == Some(0.0) {
            Ok(self.data)
        } else {
            Err(FetchError::Upstream {
                code: self.code.to_string(),
                msg: self.msg.unwrap_or_default(),
            })
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenListData {
    #[serde(rename = "tokenList", default)]
    token_list: Option<Vec<TokenRecord>>,
}

#[derive(Debug, Deserialize)]
struct TradeListData {
    #[serde(default)]
    list: Option<Vec<TradeRecord>>,
}

/// `{code, msg, data: {tokenList: [...]}}`; only a numeric zero `code` is success.
pub fn parse_token_list(body: Value) -> Result<Vec<TokenRecord>, FetchError> {
    let envelope: Envelope<TokenListData> = serde_json::from_value(body)?;
    Ok(envelope
        .into_data()?
        .and_then(|data| data.token_list)
        .unwrap_or_default())
}

/// `{code, msg, data: {list: [...]}}`.
pub fn parse_trade_list(body: Value) -> Result<Vec<TradeRecord>, FetchError> {
    let envelope: Envelope<TradeListData> = serde_json::from_value(body)?;
    Ok(envelope
        .into_data()?
        .and_then(|data| data.list)
        .unwrap_or_default())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TradingHistoryFilter<'a> {
    chain_id: &'a str,
    token_contract_address: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_address_list: Option<Vec<&'a str>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TradingHistoryRequest<'a> {
    desc: bool,
    order_by: &'a str,
    limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    data_id: Option<&'a str>,
    trading_history_filter: TradingHistoryFilter<'a>,
}

impl<'a> TradingHistoryRequest<'a> {
    fn from_query(query: &'a TradeQuery) -> Self {
        Self {
            desc: query.order == SortOrder::Descending,
            order_by: "timestamp",
            limit: query.limit,
            data_id: query.anchor_id.as_deref(),
            trading_history_filter: TradingHistoryFilter {
                chain_id: &query.chain_id,
                token_contract_address: &query.token_address,
                kind: "0",
                user_address_list: query.wallet.as_deref().map(|w| vec![w]),
            },
        }
    }
}

pub struct OkxMarketClient {
    base_url: String,
    http: Client,
    limiter: RateLimiter,
}

impl OkxMarketClient {
    pub fn new(base_url: &str, timeout: Duration, limiter: RateLimiter) -> Result<Self, FetchError> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: build_http_client(timeout)?,
            limiter,
        })
    }

    pub fn from_env(env: &Env) -> Result<Self, FetchError> {
        Self::new(
            &env.okx_base_url,
            Duration::from_millis(env.request_timeout_ms),
            RateLimiter::fixed_delay(Duration::from_millis(env.request_delay_ms)),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch_token_page(
        &self,
        wallet: &str,
        chain_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<TokenRecord>, FetchError> {
        self.limiter.acquire().await;
        let url = format!("{}/pnl/token-list", self.base_url);
        let query = [
            ("walletAddress", wallet.to_string()),
            ("chainId", chain_id.to_string()),
            ("isAsc", "false".to_string()),
            ("sortType", "1".to_string()),
            ("offset", offset.to_string()),
            ("limit", limit.to_string()),
            ("filterRisk", "true".to_string()),
            ("filterSmallBalance", "false".to_string()),
            ("t", chrono::Utc::now().timestamp_millis().to_string()),
        ];
        let body = get_json(&self.http, &url, &query).await?;
        parse_token_list(body)
    }
}

#[async_trait]
impl MarketDataSource for OkxMarketClient {
    async fn fetch_token_list(&self, wallet: &str, chain_id: &str, desired_count: usize) -> TokenListing {
        collect_token_pages(desired_count, TOKEN_PAGE_SIZE, move |offset| {
            self.fetch_token_page(wallet, chain_id, offset, TOKEN_PAGE_SIZE)
        })
        .await
    }

    async fn fetch_trades(&self, query: &TradeQuery) -> Result<Vec<TradeRecord>, FetchError> {
        self.limiter.acquire().await;
        let url = format!("{}/trading-history/filter-list", self.base_url);
        let request = TradingHistoryRequest::from_query(query);
        let body = post_json(&self.http, &url, &request).await?;
        parse_trade_list(body)
    }
}
