// src/indicators/providers/world_bank.rs
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};

use crate::indicators::parse_envelope;
use crate::indicators::types::{FetchError, IndicatorSeries, IndicatorSource, SeriesKey};

pub const DEFAULT_BASE_URL: &str = "https://api.worldbank.org/v2";
pub const DEFAULT_PER_PAGE: u32 = 100;

/// World Bank v2 indicators API:
/// `GET {base}/country/{CC}/indicator/{ID}?format=json&per_page=N`.
pub struct WorldBankProvider {
    mode: Mode,
}

enum Mode {
    // Canned response body, parsed as if it came off the wire.
    Fixture(String),
    Http {
        base_url: String,
        per_page: u32,
        client: reqwest::Client,
    },
}

impl WorldBankProvider {
    pub fn from_fixture_str(body: &str) -> Self {
        Self {
            mode: Mode::Fixture(body.to_string()),
        }
    }

    /// HTTP mode. `timeout` bounds the whole request (connect + body).
    pub fn from_url(base_url: &str, per_page: u32, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("tariff-impact-sim/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .context("building world bank http client")?;
        Ok(Self {
            mode: Mode::Http {
                base_url: base_url.trim_end_matches('/').to_string(),
                per_page: per_page.max(1),
                client,
            },
        })
    }

    fn series_url(base_url: &str, key: &SeriesKey) -> String {
        format!(
            "{}/country/{}/indicator/{}",
            base_url, key.country, key.indicator
        )
    }

    async fn fetch_body(
        client: &reqwest::Client,
        url: &str,
        per_page: u32,
    ) -> Result<String, FetchError> {
        let per_page = per_page.to_string();
        let resp = client
            .get(url)
            .query(&[("format", "json"), ("per_page", per_page.as_str())])
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(resp.text().await?)
    }
}

#[async_trait]
impl IndicatorSource for WorldBankProvider {
    async fn try_fetch(&self, key: &SeriesKey) -> Result<IndicatorSeries, FetchError> {
        crate::indicators::ensure_metrics_described();
        let t0 = Instant::now();

        let out = match &self.mode {
            Mode::Fixture(body) => parse_envelope(key, body),
            Mode::Http {
                base_url,
                per_page,
                client,
            } => {
                counter!("indicator_fetch_total").increment(1);
                let url = Self::series_url(base_url, key);
                tracing::debug!(%url, "fetching indicator series");
                Self::fetch_body(client, &url, *per_page)
                    .await
                    .and_then(|body| parse_envelope(key, &body))
            }
        };

        // failed fetches are timed too
        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("indicator_fetch_ms").record(ms);
        out
    }

    fn name(&self) -> &'static str {
        "world_bank"
    }
}
