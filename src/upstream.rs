use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, ORIGIN, REFERER,
    USER_AGENT,
};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::error::ProxyError;
use crate::logging::{body_digest, log_upstream_error, log_upstream_fetch, v_str, ProfileScope};

pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// One row of the competition leaderboard as the upstream reports it.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardItem {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    pub rank: i64,
    pub volume: f64,
    pub expected_reward: f64,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardPage {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    pub total_records: i64,
    pub total_volume: f64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: Vec<LeaderboardItem>,
}

fn null_as_empty<'de, D>(de: D) -> Result<Vec<LeaderboardItem>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<LeaderboardItem>>::deserialize(de)?.unwrap_or_default())
}

impl LeaderboardPage {
    pub fn from_slice(body: &[u8]) -> Result<Self, ProxyError> {
        Ok(serde_json::from_slice(body)?)
    }
}

#[async_trait]
pub trait LeaderboardSource: Send + Sync {
    /// Fetch the first leaderboard page. One attempt, no retry.
    async fn fetch_page(&self) -> Result<LeaderboardPage, ProxyError>;
}

/// Headers the upstream expects from its own web client.
pub fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(ORIGIN, HeaderValue::from_static("https://zealy.io"));
    headers.insert(REFERER, HeaderValue::from_static("https://zealy.io/"));
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("cross-site"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("cors"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("empty"),
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers
}

pub struct HttpLeaderboardSource {
    client: Client,
    url: Url,
}

impl HttpLeaderboardSource {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, ProxyError> {
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(browser_headers())
            .build()?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl LeaderboardSource for HttpLeaderboardSource {
    async fn fetch_page(&self) -> Result<LeaderboardPage, ProxyError> {
        let _scope =
            ProfileScope::with_context("upstream_fetch", &[("url", v_str(self.url.as_str()))]);

        let resp = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| {
                log_upstream_error("transport", &e.to_string());
                ProxyError::from(e)
            })?;

        let status = resp.status();
        if !status.is_success() {
            log_upstream_error("upstream_status", status.as_str());
            return Err(ProxyError::Upstream { status: status.as_u16() });
        }

        let body = resp.bytes().await.map_err(|e| {
            log_upstream_error("body", &e.to_string());
            ProxyError::from(e)
        })?;
        log_upstream_fetch(status.as_u16(), body.len(), &body_digest(&body));

        LeaderboardPage::from_slice(&body).map_err(|e| {
            log_upstream_error(e.kind(), &e.to_string());
            e
        })
    }
}
