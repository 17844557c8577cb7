use super::market_data::{MarketDataSource, SortOrder, TradeQuery};
use crate::utils::address::normalize_address;
use crate::utils::fetch_data::FetchError;

/// Buyer addresses from the `limit` trades immediately before `anchor_id`.
///
/// EVM addresses come back lowercased so one wallet always tallies under one
/// key. Page order is kept and duplicates are left in; de-duplication and
/// exclusion belong to the caller.
pub async fn find_preceding_buyers<S>(
    source: &S,
    token_address: &str,
    chain_id: &str,
    anchor_id: &str,
    limit: usize,
) -> Result<Vec<String>, FetchError>
where
    S: MarketDataSource + ?Sized,
{
    let query = TradeQuery {
        token_address: token_address.to_string(),
        chain_id: chain_id.to_string(),
        wallet: None,
        anchor_id: Some(anchor_id.to_string()),
        order: SortOrder::Descending,
        limit,
    };
    let trades = source.fetch_trades(&query).await?;
    Ok(trades
        .into_iter()
        .filter(|t| t.is_buy)
        .filter_map(|t| t.user_address)
        .filter(|addr| !addr.is_empty())
        .map(|addr| normalize_address(&addr))
        .collect())
}
