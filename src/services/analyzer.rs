//! Per-target aggregation: walk the target's tokens, find who bought right
//! before the target's first buy, and score how often each wallet shows up.

use std::collections::{HashMap, HashSet};

use super::anchor::find_first_buy;
use super::bundle_store::{persist_bundles, BundleStore};
use super::market_data::MarketDataSource;
use super::precedence::find_preceding_buyers;
use crate::config::RunConfig;
use crate::interfaces::{AnalysisReport, RunStatus, RunStep, StepStatus, SuspectScore};
use crate::utils::logger::Logger;

/// Address -> number of tokens it was seen on, in first-seen order.
#[derive(Debug, Default, Clone)]
pub struct SuspectTally {
    order: Vec<String>,
    counts: HashMap<String, u32>,
}

impl SuspectTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one token's buyers. Each distinct address counts once no matter
    /// how often it appears in the window.
    pub fn record_token<I>(&mut self, buyers: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut seen = HashSet::new();
        for buyer in buyers {
            if !seen.insert(buyer.clone()) {
                continue;
            }
            match self.counts.get_mut(&buyer) {
                Some(count) => *count += 1,
                None => {
                    self.counts.insert(buyer.clone(), 1);
                    self.order.push(buyer);
                }
            }
        }
    }

    pub fn count(&self, address: &str) -> u32 {
        self.counts.get(address).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.order
            .iter()
            .map(move |address| (address.as_str(), self.counts[address]))
    }
}

/// `score = count / valid_token_count`, sorted by score descending.
///
/// The sort is stable, so equal scores stay in first-seen order. Returns an
/// empty list when no token was analysed.
pub fn score_suspects(target: &str, tally: &SuspectTally, valid_token_count: u32) -> Vec<SuspectScore> {
    if valid_token_count == 0 {
        return Vec::new();
    }

    let mut suspects: Vec<SuspectScore> = tally
        .iter()
        .map(|(address, count)| SuspectScore {
            target_address: target.to_string(),
            suspect_address: address.to_string(),
            count,
            total_analyzed: valid_token_count,
            score: f64::from(count) / f64::from(valid_token_count),
        })
        .collect();

    suspects.sort_by(|a, b| b.score.total_cmp(&a.score));
    suspects
}

pub fn has_bundle(suspects: &[SuspectScore], threshold: f64) -> bool {
    suspects.iter().any(|s| s.is_bundle(threshold))
}

pub struct BundleAnalyzer<'a, S: MarketDataSource + ?Sized> {
    source: &'a S,
    store: Option<&'a dyn BundleStore>,
    config: &'a RunConfig,
}

impl<'a, S: MarketDataSource + ?Sized> BundleAnalyzer<'a, S> {
    pub fn new(source: &'a S, config: &'a RunConfig) -> Self {
        Self {
            source,
            store: None,
            config,
        }
    }

    pub fn with_store(mut self, store: Option<&'a dyn BundleStore>) -> Self {
        self.store = store;
        self
    }

    /// Runs the full pipeline for one target. Per-token failures skip the
    /// token; nothing here returns an error.
    pub async fn analyze(&self, target: &str) -> AnalysisReport {
        let config = self.config;
        let mut steps = Vec::new();

        let mut db_step = RunStep::running("Checking database");
        match self.store {
            Some(store) => db_step.finish(StepStatus::Ok, format!("{} ready", store.backend_type())),
            None => db_step.finish(StepStatus::Disabled, "Bundle store not configured"),
        }
        Logger::step(&db_step);
        steps.push(db_step);

        let mut token_step = RunStep::running("Fetch token history");
        let listing = self
            .source
            .fetch_token_list(target, &config.chain_id, config.token_limit)
            .await;
        let tokens = listing.tokens;
        let mut failed_calls = usize::from(listing.failure.is_some());
        if tokens.is_empty() {
            match &listing.failure {
                Some(e) => token_step.finish(StepStatus::Failed, format!("Fetched 0 tokens ({})", e)),
                None => token_step.finish(StepStatus::Empty, "Fetched 0 tokens"),
            }
            Logger::step(&token_step);
            steps.push(token_step);
            Logger::warning("No tokens found for this target");
            return AnalysisReport {
                target_address: target.to_string(),
                chain_id: config.chain_id.clone(),
                status: RunStatus::NoData,
                steps,
                tokens_fetched: 0,
                valid_token_count: 0,
                failed_calls,
                suspects: Vec::new(),
                has_bundle: false,
                persistence: None,
            };
        }
        token_step.finish(StepStatus::Ok, format!("Fetched {} tokens", tokens.len()));
        Logger::step(&token_step);
        steps.push(token_step);

        let mut trades_step = RunStep::running("Fetch trading history");
        let mut tally = SuspectTally::new();
        let mut valid_token_count: u32 = 0;

        for (index, token) in tokens.iter().enumerate() {
            Logger::progress(index + 1, tokens.len(), token.symbol());

            let Some(contract) = token.contract() else {
                tracing::debug!(symbol = token.symbol(), "token without contract address, skipped");
                continue;
            };

            let anchor_id = match find_first_buy(self.source, target, contract, &config.chain_id).await {
                Ok(Some(id)) => id,
                Ok(None) => {
                    tracing::debug!(token = contract, "no buy by target, skipped");
                    continue;
                }
                Err(e) => {
                    tracing::warn!(token = contract, error = %e, "anchor lookup failed, skipped");
                    failed_calls += 1;
                    continue;
                }
            };

            valid_token_count += 1;

            let buyers = match find_preceding_buyers(
                self.source,
                contract,
                &config.chain_id,
                &anchor_id,
                config.history_limit,
            )
            .await
            {
                Ok(buyers) => buyers,
                Err(e) => {
                    tracing::warn!(token = contract, anchor = %anchor_id, error = %e, "preceding trades failed");
                    failed_calls += 1;
                    continue;
                }
            };

            tally.record_token(buyers.into_iter().filter(|b| !config.is_excluded(target, b)));
        }
        Logger::clear_line();

        trades_step.finish(
            StepStatus::Ok,
            format!("Processed {} tokens with buy history", valid_token_count),
        );
        Logger::step(&trades_step);
        steps.push(trades_step);

        let mut analyze_step = RunStep::running("Analyze data");
        let suspects = score_suspects(target, &tally, valid_token_count);
        let bundle_found = has_bundle(&suspects, config.bundle_score_threshold);

        let persistence = match self.store {
            Some(store) if bundle_found => Some(
                persist_bundles(
                    store,
                    &config.chain_id,
                    &suspects,
                    config.bundle_score_threshold,
                    config.refresh_known_bundles,
                )
                .await,
            ),
            _ => None,
        };

        let status = if valid_token_count == 0 {
            analyze_step.finish(StepStatus::Empty, "No valid buy history found for this target");
            RunStatus::NoBuyHistory
        } else if tally.is_empty() {
            analyze_step.finish(StepStatus::Ok, "Analysis completed, no preceding buyers found");
            RunStatus::Completed
        } else {
            analyze_step.finish(StepStatus::Ok, "Analysis completed");
            RunStatus::Completed
        };
        Logger::step(&analyze_step);
        steps.push(analyze_step);

        AnalysisReport {
            target_address: target.to_string(),
            chain_id: config.chain_id.clone(),
            status,
            steps,
            tokens_fetched: tokens.len(),
            valid_token_count,
            failed_calls,
            suspects,
            has_bundle: bundle_found,
            persistence,
        }
    }
}
