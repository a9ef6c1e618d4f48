//! DexScreener New-Token Alert Bot Library
//!
//! Polls DexScreener for newly listed tokens, screens them by liquidity and
//! address heuristics, and posts risk-scored alerts with a performance chart
//! to Telegram.

pub mod alert;
pub mod chart;
pub mod cli;
pub mod config;
pub mod dexscreener;
pub mod error;
pub mod filter;
pub mod risk;
pub mod scanner;
pub mod telegram;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
