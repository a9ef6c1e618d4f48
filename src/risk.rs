//! Heuristic investment-risk scoring
//!
//! The score is a fixed heuristic, not a statistically validated model:
//! thin liquidity raises risk, traded volume offsets it, and 24h volatility
//! adds back in. The constants are part of the alert contract and render
//! verbatim in the message, so they must not drift.

use crate::dexscreener::{DexPair, Window};

/// Derived risk metrics for a token's main pair
#[derive(Debug, Clone, PartialEq)]
pub struct RiskAssessment {
    pub liquidity: f64,
    pub volume_24h: f64,
    pub price_change_24h: f64,
    pub risk_score: f64,
    /// `risk_score * 10` clamped into [0, 100]
    pub risk_percentage: f64,
}

impl RiskAssessment {
    pub fn from_pair(pair: &DexPair) -> Self {
        let liquidity = pair.liquidity_usd();
        let volume_24h = pair.volume(Window::H24);
        let price_change_24h = pair.price_change(Window::H24);

        let risk_score =
            (liquidity / 10_000.0) - (volume_24h / 100_000.0) + (price_change_24h.abs() / 10.0);
        let risk_percentage = (risk_score * 10.0).clamp(0.0, 100.0);

        Self {
            liquidity,
            volume_24h,
            price_change_24h,
            risk_score,
            risk_percentage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dexscreener::{Liquidity, PriceChange, Volume};

    fn pair(liquidity: f64, volume_24h: f64, price_change_24h: f64) -> DexPair {
        DexPair {
            base_token: None,
            price_change: Some(PriceChange {
                m5: None,
                h1: None,
                h6: None,
                h24: Some(price_change_24h),
            }),
            volume: Some(Volume {
                m5: None,
                h1: None,
                h6: None,
                h24: Some(volume_24h),
            }),
            liquidity: Some(Liquidity {
                usd: Some(liquidity),
                base: None,
                quote: None,
            }),
            url: None,
        }
    }

    #[test]
    fn test_reference_example() {
        // liquidity=20000, volume=50000, change=10 -> 2 - 0.5 + 1 = 2.5 -> 25%
        let risk = RiskAssessment::from_pair(&pair(20_000.0, 50_000.0, 10.0));
        assert_eq!(risk.risk_score, 2.5);
        assert_eq!(risk.risk_percentage, 25.0);
    }

    #[test]
    fn test_percentage_clamps_high() {
        let risk = RiskAssessment::from_pair(&pair(1e9, 0.0, 0.0));
        assert_eq!(risk.risk_percentage, 100.0);
    }

    #[test]
    fn test_percentage_clamps_low() {
        let risk = RiskAssessment::from_pair(&pair(0.0, 1e9, 0.0));
        assert!(risk.risk_score < 0.0);
        assert_eq!(risk.risk_percentage, 0.0);
    }

    #[test]
    fn test_volatility_uses_absolute_change() {
        let up = RiskAssessment::from_pair(&pair(10_000.0, 0.0, 50.0));
        let down = RiskAssessment::from_pair(&pair(10_000.0, 0.0, -50.0));
        assert_eq!(up.risk_score, down.risk_score);
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let empty = DexPair {
            base_token: None,
            price_change: None,
            volume: None,
            liquidity: None,
            url: None,
        };
        let risk = RiskAssessment::from_pair(&empty);
        assert_eq!(risk.risk_score, 0.0);
        assert_eq!(risk.risk_percentage, 0.0);
    }

    #[test]
    fn test_deterministic() {
        let p = pair(42_000.0, 13_000.0, -7.25);
        assert_eq!(
            RiskAssessment::from_pair(&p),
            RiskAssessment::from_pair(&p)
        );
    }
}
