//! Discovery loop
//!
//! Drives the whole pipeline: poll the profiles feed, screen candidates,
//! fetch their pairs, score and format, render the chart, deliver, and
//! remember what was sent. Fully sequential; one candidate at a time.

use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::alert::format_alert;
use crate::chart::render_performance_chart;
use crate::config::ScannerConfig;
use crate::dexscreener::{select_main_pair, DexPair, DexScreenerClient, TokenProfile};
use crate::error::Result;
use crate::filter::{FilterResult, TokenFilter};
use crate::telegram::TelegramNotifier;

/// Addresses already alerted on during this run.
///
/// Process memory only: the set starts empty, grows monotonically and is
/// lost on restart, so a token can be re-alerted after the process bounces.
#[derive(Debug, Default)]
pub struct KnownTokens(HashSet<String>);

impl KnownTokens {
    pub fn contains(&self, address: &str) -> bool {
        self.0.contains(address)
    }

    pub fn mark(&mut self, address: &str) {
        self.0.insert(address.to_string());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Read side of the market-data API
#[async_trait]
pub trait MarketData: Send + Sync {
    async fn latest_profiles(&self) -> Result<Vec<TokenProfile>>;
    async fn token_pairs(&self, chain_id: &str, address: &str) -> Result<Vec<DexPair>>;
}

#[async_trait]
impl MarketData for DexScreenerClient {
    async fn latest_profiles(&self) -> Result<Vec<TokenProfile>> {
        self.get_latest_profiles().await
    }

    async fn token_pairs(&self, chain_id: &str, address: &str) -> Result<Vec<DexPair>> {
        self.get_token_pairs(chain_id, address).await
    }
}

/// Delivery side; `true` means the alert reached the channel
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn send(&self, message: &str, chart: Option<Vec<u8>>) -> bool;
}

#[async_trait]
impl AlertSink for TelegramNotifier {
    async fn send(&self, message: &str, chart: Option<Vec<u8>>) -> bool {
        TelegramNotifier::send(self, message, chart).await
    }
}

/// Sleep abstraction so tests run passes without wall-clock delays
#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// The polling scanner that owns all per-run state
pub struct Scanner<M, A, C> {
    chain_id: String,
    config: ScannerConfig,
    filter: TokenFilter,
    known: KnownTokens,
    market: M,
    sink: A,
    clock: C,
}

impl<M: MarketData, A: AlertSink, C: Clock> Scanner<M, A, C> {
    pub fn new(
        chain_id: String,
        config: ScannerConfig,
        filter: TokenFilter,
        market: M,
        sink: A,
        clock: C,
    ) -> Self {
        Self {
            chain_id,
            config,
            filter,
            known: KnownTokens::default(),
            market,
            sink,
            clock,
        }
    }

    pub fn known_tokens(&self) -> &KnownTokens {
        &self.known
    }

    /// One full discovery pass. Returns the number of alerts delivered.
    ///
    /// Per-token failures (pair fetch, formatting, delivery) skip that token
    /// only; a profiles-feed failure ends the pass with zero alerts.
    pub async fn run_pass(&mut self) -> Result<usize> {
        debug!("Fetching latest token profiles...");
        let profiles = match self.market.latest_profiles().await {
            Ok(profiles) => profiles,
            Err(e) => {
                warn!("Failed to fetch token profiles: {}", e);
                info!("Pass complete: 0 token(s) alerted");
                return Ok(0);
            }
        };

        let total = profiles.len();
        let candidates: Vec<TokenProfile> = profiles
            .into_iter()
            .filter(|p| p.chain_id == self.chain_id)
            .collect();
        info!(
            "{} of {} profiles are on {}",
            candidates.len(),
            total,
            self.chain_id
        );

        let mut sent = 0;
        for profile in &candidates {
            let address = &profile.token_address;

            if let FilterResult::Filtered(reason) = self.filter.evaluate(address, &self.known) {
                debug!("Skipping {}: {}", address, reason);
                continue;
            }

            let pairs = match self.market.token_pairs(&self.chain_id, address).await {
                Ok(pairs) => pairs,
                Err(e) => {
                    warn!("Failed to fetch pairs for {}: {}", address, e);
                    continue;
                }
            };

            let Some(main_pair) = select_main_pair(&pairs) else {
                debug!("No usable pair for {}", address);
                continue;
            };

            let liquidity = main_pair.liquidity_usd();
            if let FilterResult::Filtered(reason) = self.filter.check_liquidity(liquidity) {
                debug!("Skipping {}: {}", address, reason);
                continue;
            }

            let Some((message, pair)) = format_alert(profile, &pairs) else {
                debug!("Could not format alert for {}", address);
                continue;
            };

            let chart = render_performance_chart(pair, address);
            if chart.is_none() {
                debug!("Sending text-only alert for {}", address);
            }

            if self.sink.send(&message, chart).await {
                self.known.mark(address);
                sent += 1;
                info!("Alerted on {} (liquidity ${:.2})", address, liquidity);
            } else {
                warn!("Alert for {} not delivered; will retry next pass", address);
            }

            // Pace deliveries so the channel is not flooded in one burst
            self.clock
                .sleep(Duration::from_secs(self.config.per_token_delay_secs))
                .await;
        }

        info!("Pass complete: {} token(s) alerted", sent);
        Ok(sent)
    }

    /// Poll forever until the process is interrupted.
    pub async fn run(&mut self) -> Result<()> {
        info!(
            "Starting discovery loop (polling every {}s)",
            self.config.poll_interval_secs
        );

        loop {
            let delay = match self.run_pass().await {
                Ok(_) => Duration::from_secs(self.config.poll_interval_secs),
                Err(e) => {
                    error!("Discovery pass failed unexpectedly: {}", e);
                    Duration::from_secs(self.config.recovery_delay_secs)
                }
            };

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupt received, shutting down");
                    break;
                }
                _ = self.clock.sleep(delay) => {}
            }
        }

        Ok(())
    }
}
