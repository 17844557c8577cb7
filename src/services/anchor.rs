use super::market_data::{MarketDataSource, SortOrder, TradeQuery};
use crate::utils::fetch_data::FetchError;

/// Records scanned for the wallet's first buy.
pub const ANCHOR_WINDOW: usize = 50;

/// Id of `wallet`'s earliest buy of `token_address`.
///
/// `Ok(None)` means the wallet has no buy in the first [`ANCHOR_WINDOW`]
/// trades, or its first buy carries no id. Either way the token is skipped.
pub async fn find_first_buy<S>(
    source: &S,
    wallet: &str,
    token_address: &str,
    chain_id: &str,
) -> Result<Option<String>, FetchError>
where
    S: MarketDataSource + ?Sized,
{
    let query = TradeQuery {
        token_address: token_address.to_string(),
        chain_id: chain_id.to_string(),
        wallet: Some(wallet.to_string()),
        anchor_id: None,
        order: SortOrder::Ascending,
        limit: ANCHOR_WINDOW,
    };
    let trades = source.fetch_trades(&query).await?;
    Ok(trades.into_iter().find(|t| t.is_buy).and_then(|t| t.id))
}
