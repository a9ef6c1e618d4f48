//! Configuration loading and validation

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dexscreener: DexScreenerConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub filters: FiltersConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DexScreenerConfig {
    /// Token-profiles feed (latest listings across all chains)
    #[serde(default = "default_profiles_url")]
    pub profiles_url: String,
    /// Token-pairs endpoint base; chain and address are appended per request
    #[serde(default = "default_pairs_url")]
    pub pairs_url: String,
    /// Chain whose listings we alert on
    #[serde(default = "default_chain_id")]
    pub chain_id: String,
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
    /// DexScreener rejects requests without a browser-like User-Agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    #[serde(default = "default_telegram_api_url")]
    pub api_url: String,
    #[serde(default = "default_bot_token")]
    pub bot_token: String,
    #[serde(default = "default_chat_id")]
    pub chat_id: String,
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScannerConfig {
    /// Seconds between full discovery passes
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Seconds to pause between candidates, to avoid bursting Telegram
    #[serde(default = "default_per_token_delay_secs")]
    pub per_token_delay_secs: u64,
    /// Seconds to pause after an unexpected pass failure before retrying
    #[serde(default = "default_recovery_delay_secs")]
    pub recovery_delay_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FiltersConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Minimum pool liquidity in USD; applies regardless of `enabled`
    #[serde(default = "default_min_liquidity_usd")]
    pub min_liquidity_usd: f64,
    /// Token addresses matching any of these regexes are never alerted on
    #[serde(default = "default_blocked_address_patterns")]
    pub blocked_address_patterns: Vec<String>,
}

// Default value functions
fn default_profiles_url() -> String {
    "https://api.dexscreener.com/token-profiles/latest/v1".into()
}

fn default_pairs_url() -> String {
    "https://api.dexscreener.com/token-pairs/v1".into()
}

fn default_chain_id() -> String {
    "solana".into()
}

fn default_http_timeout_secs() -> u64 {
    15
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".into()
}

fn default_telegram_api_url() -> String {
    "https://api.telegram.org".into()
}

fn default_bot_token() -> String {
    std::env::var("TELEGRAM_BOT_TOKEN").unwrap_or_default()
}

fn default_chat_id() -> String {
    std::env::var("TELEGRAM_CHAT_ID").unwrap_or_default()
}

fn default_poll_interval_secs() -> u64 {
    300
}

fn default_per_token_delay_secs() -> u64 {
    1
}

fn default_recovery_delay_secs() -> u64 {
    10
}

fn default_min_liquidity_usd() -> f64 {
    5000.0
}

fn default_blocked_address_patterns() -> Vec<String> {
    // Pump.fun mints carry a "pump" suffix; they get their own firehose of
    // alerts elsewhere and drown out organic listings.
    vec!["(?i)pump$".into()]
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let settings = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::from(path).required(false))
            // Override with environment variables (prefix DEXWATCH_)
            .add_source(
                config::Environment::with_prefix("DEXWATCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Config = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.scanner.poll_interval_secs == 0 {
            anyhow::bail!("poll_interval_secs must be positive");
        }

        if self.filters.min_liquidity_usd < 0.0 {
            anyhow::bail!("min_liquidity_usd cannot be negative");
        }

        if self.dexscreener.chain_id.is_empty() {
            anyhow::bail!("chain_id cannot be empty");
        }

        if self.dexscreener.timeout_secs == 0 || self.telegram.timeout_secs == 0 {
            anyhow::bail!("HTTP timeouts must be positive");
        }

        // Validate filter patterns (compile regex to check)
        for pattern in &self.filters.blocked_address_patterns {
            regex::Regex::new(pattern)
                .with_context(|| format!("Invalid blocked_address_pattern regex: {}", pattern))?;
        }

        Ok(())
    }

    /// Get masked configuration for display (hide secrets)
    pub fn masked_display(&self) -> String {
        format!(
            r#"Configuration:
  DexScreener:
    profiles_url: {}
    pairs_url: {}
    chain: {}
    timeout: {}s
  Telegram:
    api_url: {}
    bot_token: {}
    chat_id: {}
    timeout: {}s
  Scanner:
    poll_interval: {}s
    per_token_delay: {}s
    recovery_delay: {}s
  Filters:
    enabled: {}
    min_liquidity: ${}
    blocked_address_patterns: {:?}
"#,
            self.dexscreener.profiles_url,
            self.dexscreener.pairs_url,
            self.dexscreener.chain_id,
            self.dexscreener.timeout_secs,
            self.telegram.api_url,
            if self.telegram.bot_token.is_empty() {
                "(not set)"
            } else {
                "***"
            },
            if self.telegram.chat_id.is_empty() {
                "(not set)"
            } else {
                "***"
            },
            self.telegram.timeout_secs,
            self.scanner.poll_interval_secs,
            self.scanner.per_token_delay_secs,
            self.scanner.recovery_delay_secs,
            self.filters.enabled,
            self.filters.min_liquidity_usd,
            self.filters.blocked_address_patterns,
        )
    }
}

impl Default for DexScreenerConfig {
    fn default() -> Self {
        Self {
            profiles_url: default_profiles_url(),
            pairs_url: default_pairs_url(),
            chain_id: default_chain_id(),
            timeout_secs: default_http_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_url: default_telegram_api_url(),
            bot_token: default_bot_token(),
            chat_id: default_chat_id(),
            timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            per_token_delay_secs: default_per_token_delay_secs(),
            recovery_delay_secs: default_recovery_delay_secs(),
        }
    }
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_liquidity_usd: default_min_liquidity_usd(),
            blocked_address_patterns: default_blocked_address_patterns(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dexscreener: DexScreenerConfig::default(),
            telegram: TelegramConfig::default(),
            scanner: ScannerConfig::default(),
            filters: FiltersConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.filters.enabled);
        assert_eq!(config.scanner.poll_interval_secs, 300);
        assert_eq!(config.filters.min_liquidity_usd, 5000.0);
        assert_eq!(config.dexscreener.chain_id, "solana");
        assert_eq!(
            config.filters.blocked_address_patterns,
            vec!["(?i)pump$".to_string()]
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[scanner]
poll_interval_secs = 60

[filters]
min_liquidity_usd = 12000.0
"#
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.scanner.poll_interval_secs, 60);
        assert_eq!(config.filters.min_liquidity_usd, 12000.0);
        // Untouched sections fall back to defaults
        assert_eq!(config.scanner.per_token_delay_secs, 1);
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = Config::default();
        config.scanner.poll_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_regex() {
        let mut config = Config::default();
        config.filters.blocked_address_patterns = vec!["(unclosed".into()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_masked_display_hides_token() {
        let mut config = Config::default();
        config.telegram.bot_token = "123456:secret".into();
        let display = config.masked_display();
        assert!(!display.contains("secret"));
        assert!(display.contains("***"));
    }
}
