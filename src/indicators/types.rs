// src/indicators/types.rs
use std::fmt;

use async_trait::async_trait;
use metrics::counter;
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Identifies one (country, indicator) series. Also the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesKey {
    pub country: String,   // two-letter code, uppercase ("CA", "US")
    pub indicator: String, // World Bank indicator id ("NY.GDP.MKTP.CD")
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("invalid country code '{0}': expected two ASCII letters")]
    Country(String),
    #[error("invalid indicator code '{0}'")]
    Indicator(String),
}

impl SeriesKey {
    /// Validate and normalize a (country, indicator) pair.
    pub fn new(country: &str, indicator: &str) -> Result<Self, KeyError> {
        static RE_COUNTRY: OnceCell<Regex> = OnceCell::new();
        static RE_INDICATOR: OnceCell<Regex> = OnceCell::new();
        let re_country =
            RE_COUNTRY.get_or_init(|| Regex::new(r"^[A-Za-z]{2}$").expect("country regex"));
        let re_indicator = RE_INDICATOR
            .get_or_init(|| Regex::new(r"^[A-Za-z0-9_.]{1,64}$").expect("indicator regex"));

        let country = country.trim();
        let indicator = indicator.trim();
        if !re_country.is_match(country) {
            return Err(KeyError::Country(country.to_string()));
        }
        if !re_indicator.is_match(indicator) {
            return Err(KeyError::Indicator(indicator.to_string()));
        }
        Ok(Self {
            country: country.to_ascii_uppercase(),
            indicator: indicator.to_ascii_uppercase(),
        })
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.country, self.indicator)
    }
}

/// One (period, value) point. Periods are calendar years.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub period: i32,
    pub value: f64,
}

/// Ordered (ascending by period) series for one key. May be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSeries {
    pub key: SeriesKey,
    pub observations: Vec<Observation>,
}

impl IndicatorSeries {
    pub fn empty(key: SeriesKey) -> Self {
        Self {
            key,
            observations: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }
}

/// Latest known value of a series, or an explicit "unavailable" marker.
/// Unavailable is never zero and never formats as a number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum IndicatorSnapshot {
    Available { value: f64 },
    Unavailable,
}

impl IndicatorSnapshot {
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Available { value } => Some(*value),
            Self::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available { .. })
    }
}

impl fmt::Display for IndicatorSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available { value } => write!(f, "{value:.2}"),
            Self::Unavailable => f.write_str("Unavailable"),
        }
    }
}

/// Why a fetch produced nothing. Recovered inside the fetch layer.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("upstream returned HTTP {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl FetchError {
    /// Short label used for the `kind` metric dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Status(_) => "status",
            Self::Malformed(_) => "malformed",
        }
    }
}

#[async_trait]
pub trait IndicatorSource: Send + Sync {
    /// Fetch and normalize one series, reporting why it failed.
    async fn try_fetch(&self, key: &SeriesKey) -> Result<IndicatorSeries, FetchError>;

    fn name(&self) -> &'static str;

    /// Best-effort fetch: any failure degrades to an empty series.
    async fn fetch_series(&self, key: &SeriesKey) -> IndicatorSeries {
        match self.try_fetch(key).await {
            Ok(series) => series,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    source = self.name(),
                    country = %key.country,
                    indicator = %key.indicator,
                    "indicator fetch failed; series unavailable"
                );
                counter!("indicator_fetch_errors_total", "kind" => e.kind()).increment(1);
                IndicatorSeries::empty(key.clone())
            }
        }
    }
}
