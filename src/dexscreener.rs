// DexScreener API client for new token discovery
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::DexScreenerConfig;
use crate::error::{Error, Result};

/// A newly listed token from the profiles feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenProfile {
    pub url: Option<String>,
    #[serde(rename = "chainId")]
    pub chain_id: String,
    #[serde(rename = "tokenAddress")]
    pub token_address: String,
    pub icon: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub links: Vec<ProfileLink>,
}

/// Social/web link attached to a token profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileLink {
    #[serde(rename = "type")]
    pub link_type: Option<String>,
    pub label: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceChange {
    pub m5: Option<f64>,
    pub h1: Option<f64>,
    pub h6: Option<f64>,
    pub h24: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Volume {
    pub m5: Option<f64>,
    pub h1: Option<f64>,
    pub h6: Option<f64>,
    pub h24: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Liquidity {
    pub usd: Option<f64>,
    pub base: Option<f64>,
    pub quote: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseToken {
    pub address: Option<String>,
    pub name: Option<String>,
    pub symbol: Option<String>,
}

/// One market for a token, with its own liquidity/volume/price metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DexPair {
    #[serde(rename = "baseToken")]
    pub base_token: Option<BaseToken>,
    #[serde(rename = "priceChange")]
    pub price_change: Option<PriceChange>,
    pub volume: Option<Volume>,
    pub liquidity: Option<Liquidity>,
    pub url: Option<String>,
}

/// The four reporting windows DexScreener exposes, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    M5,
    H1,
    H6,
    H24,
}

impl Window {
    pub const ALL: [Window; 4] = [Window::M5, Window::H1, Window::H6, Window::H24];

    pub fn label(self) -> &'static str {
        match self {
            Window::M5 => "5 min",
            Window::H1 => "1 hour",
            Window::H6 => "6 hours",
            Window::H24 => "24 hours",
        }
    }
}

impl DexPair {
    /// USD liquidity, defaulting to 0 when the field is absent
    pub fn liquidity_usd(&self) -> f64 {
        self.liquidity.as_ref().and_then(|l| l.usd).unwrap_or(0.0)
    }

    /// Price change % for a window, defaulting to 0 when absent
    pub fn price_change(&self, window: Window) -> f64 {
        let pc = match &self.price_change {
            Some(pc) => pc,
            None => return 0.0,
        };
        match window {
            Window::M5 => pc.m5,
            Window::H1 => pc.h1,
            Window::H6 => pc.h6,
            Window::H24 => pc.h24,
        }
        .unwrap_or(0.0)
    }

    /// USD volume for a window, defaulting to 0 when absent
    pub fn volume(&self, window: Window) -> f64 {
        let vol = match &self.volume {
            Some(vol) => vol,
            None => return 0.0,
        };
        match window {
            Window::M5 => vol.m5,
            Window::H1 => vol.h1,
            Window::H6 => vol.h6,
            Window::H24 => vol.h24,
        }
        .unwrap_or(0.0)
    }
}

/// Pick the pair with the highest USD liquidity.
///
/// Strict `>` keeps the earliest pair on ties. When no pair reports positive
/// liquidity the first pair wins, so a token with only zero-liquidity markets
/// still gets assessed rather than dropped.
pub fn select_main_pair(pairs: &[DexPair]) -> Option<&DexPair> {
    let mut main_pair = None;
    let mut max_liquidity = 0.0;

    for pair in pairs {
        let liquidity = pair.liquidity_usd();
        if liquidity > max_liquidity {
            main_pair = Some(pair);
            max_liquidity = liquidity;
        }
    }

    main_pair.or_else(|| pairs.first())
}

pub struct DexScreenerClient {
    client: reqwest::Client,
    profiles_url: String,
    pairs_url: String,
}

impl DexScreenerClient {
    pub fn new(config: &DexScreenerConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(config.user_agent.clone())
                .timeout(std::time::Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            profiles_url: config.profiles_url.clone(),
            pairs_url: config.pairs_url.clone(),
        }
    }

    /// Fetch the latest token profiles across all chains.
    ///
    /// Entries that fail to parse are skipped; a non-list body is a
    /// malformed response.
    pub async fn get_latest_profiles(&self) -> Result<Vec<TokenProfile>> {
        let resp = self
            .client
            .get(&self.profiles_url)
            .send()
            .await?
            .error_for_status()?;

        let body: Value = resp.json().await?;
        let entries = match body {
            Value::Array(entries) => entries,
            other => {
                return Err(Error::MalformedResponse(format!(
                    "expected a list of token profiles, got {}",
                    json_kind(&other)
                )))
            }
        };

        Ok(collect_valid(entries, "token profile"))
    }

    /// Fetch all pairs for a token, normalizing the three wire shapes
    /// (bare list, `{"pairs": [...]}`, single pair object) into one list.
    pub async fn get_token_pairs(&self, chain_id: &str, address: &str) -> Result<Vec<DexPair>> {
        let url = format!("{}/{}/{}", self.pairs_url, chain_id, address);
        let resp = self.client.get(&url).send().await?.error_for_status()?;

        let text = resp.text().await?;
        if text.trim().is_empty() {
            debug!("Empty pairs response for {}", address);
            return Ok(Vec::new());
        }

        let body: Value = serde_json::from_str(&text)
            .map_err(|e| Error::MalformedResponse(format!("undecodable pairs body: {}", e)))?;

        let entries = match body {
            Value::Array(entries) => entries,
            Value::Object(mut map) => match map.remove("pairs") {
                Some(Value::Array(entries)) => entries,
                Some(Value::Null) | None => vec![Value::Object(map)],
                Some(other) => {
                    return Err(Error::MalformedResponse(format!(
                        "pairs field is {}, expected a list",
                        json_kind(&other)
                    )))
                }
            },
            other => {
                return Err(Error::MalformedResponse(format!(
                    "expected pairs list or object, got {}",
                    json_kind(&other)
                )))
            }
        };

        Ok(collect_valid(entries, "pair"))
    }
}

/// Deserialize each entry, dropping malformed ones instead of failing the call
fn collect_valid<T: serde::de::DeserializeOwned>(entries: Vec<Value>, what: &str) -> Vec<T> {
    entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<T>(entry) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("Skipping malformed {}: {}", what, e);
                None
            }
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
