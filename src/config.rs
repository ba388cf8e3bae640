use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use std::net::SocketAddr;
use std::time::Duration;
use url::Url;

pub const PRIZE_POOL: &str = "36K SOMI";
pub const ENDS_AT_ISO: &str = "2025-11-30T00:00:00Z";
pub const UPSTREAM_BASE: &str = "https://api-v2.zealy.io/api/communities/somniatradingcompetition/trading-competition/0b50bebd-51ee-43cf-b66c-6988509c981d/leaderboard";
pub const UPSTREAM_PAGE: u32 = 1;
pub const UPSTREAM_PAGE_SIZE: u32 = 20;

/// Deployment knobs. Campaign values are fixed and live in [`Campaign`].
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub upstream_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            upstream_timeout: Duration::from_millis(10_000),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: std::env::var("BIND_ADDR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.bind_addr),
            upstream_timeout: std::env::var("UPSTREAM_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.upstream_timeout),
        }
    }
}

/// Fixed campaign information, built once at start-up and shared read-only.
#[derive(Debug, Clone)]
pub struct Campaign {
    pub prize_pool: String,
    pub ends_at: DateTime<Utc>,
    pub upstream_url: Url,
}

impl Campaign {
    pub fn somnia() -> Result<Self> {
        let ends_at = DateTime::parse_from_rfc3339(ENDS_AT_ISO)
            .with_context(|| format!("invalid campaign end {}", ENDS_AT_ISO))?
            .with_timezone(&Utc);
        Ok(Self {
            prize_pool: PRIZE_POOL.to_string(),
            ends_at,
            upstream_url: upstream_url(UPSTREAM_BASE)?,
        })
    }

    /// Same campaign, different leaderboard host. Used to point at fakes.
    pub fn with_upstream_base(mut self, base: &str) -> Result<Self> {
        self.upstream_url = upstream_url(base)?;
        Ok(self)
    }

    pub fn with_ends_at(mut self, ends_at: DateTime<Utc>) -> Self {
        self.ends_at = ends_at;
        self
    }

    pub fn ends_at_iso(&self) -> String {
        self.ends_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

fn upstream_url(base: &str) -> Result<Url> {
    let page = UPSTREAM_PAGE.to_string();
    let page_size = UPSTREAM_PAGE_SIZE.to_string();
    Url::parse_with_params(base, &[("page", page.as_str()), ("pageSize", page_size.as_str())])
        .with_context(|| format!("invalid upstream url {}", base))
}
