use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Url;

pub const DEFAULT_PORT: u16 = 8443;
pub const WEBHOOK_PATH: &str = "/webhook";

/// Knobs for the `/cleanup` sweep.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SweepSettings {
    /// How many ids below the command message the join/leave scan inspects.
    pub scan_limit: u32,
    /// Upper bound on the number of ids a full sweep will touch.
    pub max_range: u32,
    /// Sleep and retry once when Telegram answers with `retry_after`.
    pub retry_on_flood: bool,
    pub max_backoff: Duration,
    /// Delete the copy left behind by a successful forward probe.
    pub remove_probe_copies: bool,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            scan_limit: 100,
            max_range: 10_000,
            retry_on_flood: true,
            max_backoff: Duration::from_secs(30),
            remove_probe_copies: false,
        }
    }
}

impl SweepSettings {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            scan_limit: parse_var("CLEANUP_SCAN_LIMIT")?.unwrap_or(defaults.scan_limit),
            max_range: parse_var("CLEANUP_MAX_RANGE")?.unwrap_or(defaults.max_range),
            retry_on_flood: parse_var("CLEANUP_RETRY_ON_FLOOD")?
                .unwrap_or(defaults.retry_on_flood),
            max_backoff: parse_var("CLEANUP_MAX_BACKOFF_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.max_backoff),
            remove_probe_copies: parse_var("CLEANUP_REMOVE_PROBES")?
                .unwrap_or(defaults.remove_probe_copies),
        })
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub bot_token: String,
    /// Public base URL; the webhook lives at `<base>/webhook`.
    pub webhook_url: Url,
    pub port: u16,
    pub invite_link: Option<String>,
    pub sweep: SweepSettings,
}

impl Config {
    /// Reads the process environment. `.env` loading is left to the caller.
    pub fn from_env() -> Result<Self> {
        let bot_token = required_var("BOT_TOKEN")?;
        let base_url = required_var("WEBHOOK_URL")?;
        let webhook_url = webhook_endpoint(&base_url)?;
        let port = parse_var("PORT")?.unwrap_or(DEFAULT_PORT);
        let invite_link = env::var("GROUP_INVITE_LINK")
            .ok()
            .filter(|link| !link.trim().is_empty());

        Ok(Self {
            bot_token,
            webhook_url,
            port,
            invite_link,
            sweep: SweepSettings::from_env()?,
        })
    }
}

/// Builds the full webhook URL from the public base URL.
pub fn webhook_endpoint(base_url: &str) -> Result<Url> {
    let base = base_url.trim().trim_end_matches('/');
    Url::parse(&format!("{base}{WEBHOOK_PATH}"))
        .with_context(|| format!("WEBHOOK_URL is not a valid URL: {base_url}"))
}

fn required_var(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => anyhow::bail!("{name} environment variable not set"),
    }
}

fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("invalid value for {name}: {raw}")),
        _ => Ok(None),
    }
}
