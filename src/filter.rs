//! Candidate token filtering
//!
//! Decides which profiles from the feed are worth fetching and alerting on.
//! Dedup against already-alerted tokens always applies; address-pattern
//! blocking honors the `enabled` flag.

use regex::Regex;
use tracing::debug;

use crate::config::FiltersConfig;
use crate::error::{Error, Result};
use crate::scanner::KnownTokens;

/// Reason why a token was filtered
#[derive(Debug, Clone)]
pub enum FilterReason {
    /// Profile carries no token address
    MissingAddress,
    /// Token was already alerted on this run
    AlreadyKnown,
    /// Token address matches a blocked pattern
    BlockedAddress(String),
    /// Main pair liquidity below the configured minimum
    LiquidityBelowMinimum(f64),
}

impl std::fmt::Display for FilterReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterReason::MissingAddress => write!(f, "profile has no token address"),
            FilterReason::AlreadyKnown => write!(f, "already alerted this run"),
            FilterReason::BlockedAddress(pattern) => {
                write!(f, "address matches blocked pattern: {}", pattern)
            }
            FilterReason::LiquidityBelowMinimum(usd) => {
                write!(f, "liquidity ${:.2} below minimum", usd)
            }
        }
    }
}

/// Filter result
#[derive(Debug, Clone)]
pub enum FilterResult {
    /// Token passed all filters
    Pass,
    /// Token was filtered
    Filtered(FilterReason),
}

impl FilterResult {
    pub fn is_pass(&self) -> bool {
        matches!(self, FilterResult::Pass)
    }

    pub fn is_filtered(&self) -> bool {
        matches!(self, FilterResult::Filtered(_))
    }
}

/// Token filter based on configuration
pub struct TokenFilter {
    config: FiltersConfig,
    blocked_patterns: Vec<Regex>,
}

impl TokenFilter {
    /// Create a new token filter from config
    pub fn new(config: FiltersConfig) -> Result<Self> {
        let blocked_patterns = config
            .blocked_address_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::InvalidRegex(e.to_string()))?;

        Ok(Self {
            config,
            blocked_patterns,
        })
    }

    /// Screen a candidate address before any pair data is fetched
    pub fn evaluate(&self, token_address: &str, known: &KnownTokens) -> FilterResult {
        if token_address.is_empty() {
            return FilterResult::Filtered(FilterReason::MissingAddress);
        }

        // Dedup is an invariant of the discovery loop, not a tunable filter
        if known.contains(token_address) {
            return FilterResult::Filtered(FilterReason::AlreadyKnown);
        }

        if self.config.enabled {
            for pattern in &self.blocked_patterns {
                if pattern.is_match(token_address) {
                    debug!("Token {} blocked by pattern: {}", token_address, pattern);
                    return FilterResult::Filtered(FilterReason::BlockedAddress(
                        pattern.to_string(),
                    ));
                }
            }
        }

        FilterResult::Pass
    }

    /// Check the main pair's USD liquidity against the configured minimum.
    /// The threshold applies even when pattern filtering is disabled.
    pub fn check_liquidity(&self, liquidity_usd: f64) -> FilterResult {
        if liquidity_usd < self.config.min_liquidity_usd {
            return FilterResult::Filtered(FilterReason::LiquidityBelowMinimum(liquidity_usd));
        }
        FilterResult::Pass
    }
}
