//! Telegram alert message formatting
//!
//! Messages use Telegram HTML parse mode. Values are shown the way traders
//! scan them: liquidity/volume in thousands with one decimal, price change
//! with two decimals, and the risk formula spelled out with live numbers so
//! the score can be sanity-checked from the alert itself.

use crate::dexscreener::{select_main_pair, DexPair, TokenProfile};
use crate::risk::RiskAssessment;

const GECKOTERMINAL_POOLS_URL: &str = "https://www.geckoterminal.com/solana/pools";

/// Build the alert message for a token and pick its main pair.
///
/// Returns `None` when no pair survived parsing; callers skip the token
/// without sending anything.
pub fn format_alert<'a>(
    profile: &TokenProfile,
    pairs: &'a [DexPair],
) -> Option<(String, &'a DexPair)> {
    let pair = select_main_pair(pairs)?;
    let risk = RiskAssessment::from_pair(pair);

    let address = &profile.token_address;
    let gecko_link = format!("{}/{}", GECKOTERMINAL_POOLS_URL, address);

    let message = format!(
        "<b>\u{2705} New Token Detected!</b>\n\n\
         <b>Liquidity:</b> {:.1}K\n\
         <b>Volume 24h:</b> {:.1}K\n\
         <b>Price Change 24h:</b> {:.2}%\n\n\
         <b>Risk Calculation:</b> ({:.2} / 10,000) - ({:.2} / 100,000) + (|{:.2}| / 10) = {:.2}\n\
         <b>Risk Percentage:</b> {:.0}%\n\n\
         <b>\u{1f517} Links:</b> {}\n\
         <b>\u{1f4ca} Chart:</b> <a href='{}'>GeckoTerminal</a>\n\
         <b>\u{1f50d} DexScreener:</b> <a href='{}'>Open</a>\n\
         <b>\u{1f194} Address:</b> <code>{}</code>",
        risk.liquidity / 1000.0,
        risk.volume_24h / 1000.0,
        risk.price_change_24h,
        risk.liquidity,
        risk.volume_24h,
        risk.price_change_24h,
        risk.risk_score,
        risk.risk_percentage,
        format_links(profile),
        gecko_link,
        profile.url.as_deref().unwrap_or(""),
        address,
    );

    Some((message, pair))
}

/// Render the links section. Each entry is followed by a literal " | ",
/// including the last one; no links renders an empty section.
fn format_links(profile: &TokenProfile) -> String {
    let mut formatted = String::new();

    for link in &profile.links {
        let url = link.url.as_deref().unwrap_or("");
        match link.link_type.as_deref() {
            Some("twitter") => {
                formatted.push_str(&format!("\u{1f426} <a href='{}'>Twitter</a> | ", url));
            }
            Some("telegram") => {
                formatted.push_str(&format!("\u{1f4e2} <a href='{}'>Telegram</a> | ", url));
            }
            _ if !url.is_empty() => {
                formatted.push_str(&format!("\u{1f310} <a href='{}'>Site</a> | ", url));
            }
            _ => {}
        }
    }

    formatted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dexscreener::{Liquidity, PriceChange, ProfileLink, Volume};

    fn profile(links: Vec<ProfileLink>) -> TokenProfile {
        TokenProfile {
            url: Some("https://dexscreener.com/solana/abc".into()),
            chain_id: "solana".into(),
            token_address: "So1TestAddress".into(),
            icon: None,
            description: None,
            links,
        }
    }

    fn pair() -> DexPair {
        DexPair {
            base_token: None,
            price_change: Some(PriceChange {
                m5: None,
                h1: None,
                h6: None,
                h24: Some(10.0),
            }),
            volume: Some(Volume {
                m5: None,
                h1: None,
                h6: None,
                h24: Some(50_000.0),
            }),
            liquidity: Some(Liquidity {
                usd: Some(20_000.0),
                base: None,
                quote: None,
            }),
            url: None,
        }
    }

    fn link(link_type: &str, url: &str) -> ProfileLink {
        ProfileLink {
            link_type: Some(link_type.into()),
            label: None,
            url: Some(url.into()),
        }
    }

    #[test]
    fn test_format_alert_renders_metrics() {
        let (message, _) = format_alert(&profile(vec![]), &[pair()]).unwrap();
        assert!(message.contains("<b>Liquidity:</b> 20.0K"));
        assert!(message.contains("<b>Volume 24h:</b> 50.0K"));
        assert!(message.contains("<b>Price Change 24h:</b> 10.00%"));
        assert!(message.contains("(20000.00 / 10,000) - (50000.00 / 100,000) + (|10.00| / 10) = 2.50"));
        assert!(message.contains("<b>Risk Percentage:</b> 25%"));
        assert!(message.contains("<code>So1TestAddress</code>"));
        assert!(message.contains("https://www.geckoterminal.com/solana/pools/So1TestAddress"));
    }

    #[test]
    fn test_format_alert_no_pairs_returns_none() {
        assert!(format_alert(&profile(vec![]), &[]).is_none());
    }

    #[test]
    fn test_links_empty_section() {
        let (message, _) = format_alert(&profile(vec![]), &[pair()]).unwrap();
        // Empty links render an empty section with no stray separators
        assert!(message.contains("Links:</b> \n"));
        assert!(!message.contains("Links:</b>  | "));
    }

    #[test]
    fn test_links_trailing_separator_after_every_entry() {
        let links = vec![
            link("twitter", "https://x.com/token"),
            link("telegram", "https://t.me/token"),
            link("website", "https://token.example"),
        ];
        let formatted = format_links(&profile(links));
        assert_eq!(formatted.matches(" | ").count(), 3);
        assert!(formatted.ends_with(" | "));
        assert!(formatted.contains(">Twitter</a>"));
        assert!(formatted.contains(">Telegram</a>"));
        assert!(formatted.contains(">Site</a>"));
    }

    #[test]
    fn test_links_skip_unknown_type_without_url() {
        let links = vec![ProfileLink {
            link_type: Some("website".into()),
            label: None,
            url: None,
        }];
        assert_eq!(format_links(&profile(links)), "");
    }

    #[test]
    fn test_missing_listing_url_renders_empty_href() {
        let mut p = profile(vec![]);
        p.url = None;
        let (message, _) = format_alert(&p, &[pair()]).unwrap();
        assert!(message.contains("<a href=''>Open</a>"));
    }
}
