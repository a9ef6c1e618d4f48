//! CLI command implementations

use anyhow::Result;
use tracing::{info, warn};

use crate::config::Config;
use crate::dexscreener::DexScreenerClient;
use crate::filter::TokenFilter;
use crate::scanner::{Scanner, TokioClock};
use crate::telegram::TelegramNotifier;

/// Start the alert bot
pub async fn start(config: &Config, once: bool) -> Result<()> {
    info!("Starting DexScreener alert bot...");
    info!(
        "Chain: {}, liquidity threshold: ${}, poll interval: {}s",
        config.dexscreener.chain_id,
        config.filters.min_liquidity_usd,
        config.scanner.poll_interval_secs
    );

    if config.telegram.bot_token.is_empty() || config.telegram.chat_id.is_empty() {
        warn!("Telegram credentials not configured - alerts will not be delivered");
    }

    let market = DexScreenerClient::new(&config.dexscreener);
    let notifier = TelegramNotifier::new(&config.telegram);
    let filter = TokenFilter::new(config.filters.clone())
        .map_err(|e| anyhow::anyhow!("Failed to create token filter: {}", e))?;

    let mut scanner = Scanner::new(
        config.dexscreener.chain_id.clone(),
        config.scanner.clone(),
        filter,
        market,
        notifier,
        TokioClock,
    );

    if once {
        let sent = scanner.run_pass().await?;
        info!("Single pass finished: {} token(s) alerted", sent);
        return Ok(());
    }

    scanner.run().await?;
    Ok(())
}

/// Show current configuration (secrets masked)
pub fn show_config(config: &Config) -> Result<()> {
    println!("{}", config.masked_display());
    Ok(())
}
