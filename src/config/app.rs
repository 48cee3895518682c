// src/config/app.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs};

use crate::indicators::providers::world_bank::{DEFAULT_BASE_URL, DEFAULT_PER_PAGE};
use crate::indicators::types::{KeyError, SeriesKey};
use crate::policy::PolicyBounds;
use crate::report::Scenario;

pub const ENV_CONFIG_PATH: &str = "TARIFF_CONFIG_PATH";
pub const DEFAULT_CONFIG_TOML: &str = "config/tariff.toml";
pub const DEFAULT_CONFIG_JSON: &str = "config/tariff.json";

const MIN_TIMEOUT_MS: u64 = 100;

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_timeout_ms() -> u64 {
    5_000
}
fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}
fn default_cache_ttl_secs() -> u64 {
    3_600
}
fn default_origin_tariff_min() -> f64 {
    5.0
}
fn default_snapshot_countries() -> Vec<String> {
    vec!["CA".into(), "US".into()]
}
fn default_snapshot_indicators() -> Vec<NamedIndicator> {
    vec![
        NamedIndicator {
            label: "GDP".into(),
            code: "NY.GDP.MKTP.CD".into(),
        },
        NamedIndicator {
            label: "Inflation (CPI)".into(),
            code: "FP.CPI.TOTL".into(),
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedIndicator {
    pub label: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_base_url")]
    pub world_bank_base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// 0 = keep for the whole process lifetime.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Lower bound of the tariff slider: 5 (classic) or 0 (wide variant).
    #[serde(default = "default_origin_tariff_min")]
    pub origin_tariff_min: f64,
    #[serde(default)]
    pub scenario: Scenario,
    #[serde(default = "default_snapshot_countries")]
    pub snapshot_countries: Vec<String>,
    #[serde(default = "default_snapshot_indicators")]
    pub snapshot_indicators: Vec<NamedIndicator>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            world_bank_base_url: default_base_url(),
            request_timeout_ms: default_timeout_ms(),
            per_page: default_per_page(),
            cache_ttl_secs: default_cache_ttl_secs(),
            origin_tariff_min: default_origin_tariff_min(),
            scenario: Scenario::default(),
            snapshot_countries: default_snapshot_countries(),
            snapshot_indicators: default_snapshot_indicators(),
        }
    }
}

impl AppConfig {
    /// Load from an explicit path. TOML or JSON, chosen by extension.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg: AppConfig = match ext.as_str() {
            "json" => serde_json::from_str(&content)
                .with_context(|| format!("parsing json config {}", path.display()))?,
            _ => toml::from_str(&content)
                .with_context(|| format!("parsing toml config {}", path.display()))?,
        };
        Ok(cfg.sanitized())
    }

    /// Resolution order:
    /// 1) $TARIFF_CONFIG_PATH (must exist)
    /// 2) config/tariff.toml
    /// 3) config/tariff.json
    /// 4) built-in defaults
    ///
    /// Env overrides are applied on top in every case.
    pub fn load_default() -> Result<Self> {
        let base = if let Ok(p) = env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else if Path::new(DEFAULT_CONFIG_TOML).exists() {
            Self::load_from(Path::new(DEFAULT_CONFIG_TOML))?
        } else if Path::new(DEFAULT_CONFIG_JSON).exists() {
            Self::load_from(Path::new(DEFAULT_CONFIG_JSON))?
        } else {
            Self::default()
        };
        Ok(base.with_env_overrides())
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = env::var("WORLD_BANK_BASE_URL") {
            if !url.trim().is_empty() {
                self.world_bank_base_url = url.trim().to_string();
            }
        }
        if let Some(ms) = parse_env_u64("INDICATOR_TIMEOUT_MS") {
            self.request_timeout_ms = ms;
        }
        if let Some(secs) = parse_env_u64("INDICATOR_CACHE_TTL_SECS") {
            self.cache_ttl_secs = secs;
        }
        self.sanitized()
    }

    fn sanitized(mut self) -> Self {
        self.request_timeout_ms = self.request_timeout_ms.max(MIN_TIMEOUT_MS);
        self.per_page = self.per_page.max(1);
        if !self.origin_tariff_min.is_finite() || !(0.0..=50.0).contains(&self.origin_tariff_min)
        {
            self.origin_tariff_min = default_origin_tariff_min();
        }
        self
    }

    pub fn policy_bounds(&self) -> PolicyBounds {
        PolicyBounds::with_origin_min(self.origin_tariff_min)
    }

    /// Every configured (country, indicator) pair, validated.
    pub fn snapshot_keys(&self) -> Result<Vec<(SeriesKey, String)>, KeyError> {
        let mut out = Vec::new();
        for country in &self.snapshot_countries {
            for ind in &self.snapshot_indicators {
                out.push((SeriesKey::new(country, &ind.code)?, ind.label.clone()));
            }
        }
        Ok(out)
    }
}

fn parse_env_u64(name: &str) -> Option<u64> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse::<u64>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "ignoring non-numeric env override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
request_timeout_ms = 20
origin_tariff_min = 0.0
"#,
        )
        .unwrap();
        let cfg = cfg.sanitized();
        assert_eq!(cfg.request_timeout_ms, MIN_TIMEOUT_MS);
        assert_eq!(cfg.origin_tariff_min, 0.0);
        assert_eq!(cfg.world_bank_base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.scenario, Scenario::default());
        assert_eq!(cfg.snapshot_keys().unwrap().len(), 4);
    }

    #[test]
    fn bad_tariff_floor_falls_back() {
        let cfg = AppConfig {
            origin_tariff_min: 75.0,
            ..AppConfig::default()
        }
        .sanitized();
        assert_eq!(cfg.origin_tariff_min, 5.0);
    }

    #[test]
    fn invalid_snapshot_country_is_reported() {
        let cfg = AppConfig {
            snapshot_countries: vec!["CAN".into()],
            ..AppConfig::default()
        };
        assert!(cfg.snapshot_keys().is_err());
    }
}
