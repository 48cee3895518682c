// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod calculator;
pub mod config;
pub mod indicators;
pub mod policy;
pub mod predictor;
pub mod report;
pub mod telemetry;
pub mod vulnerability;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::calculator::{compute_origin_impact, compute_retaliation_impact, ImpactResult};
pub use crate::indicators::latest_value;
pub use crate::predictor::{fit_and_predict, PredictError};

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::Router;
use tracing::info;

use crate::config::AppConfig;
use crate::indicators::providers::world_bank::WorldBankProvider;

/// Build the full application router from config on disk + env:
/// World Bank provider, indicator cache, API routes and `/metrics`.
pub async fn app() -> Result<Router> {
    let cfg = AppConfig::load_default()?;
    let metrics = telemetry::Metrics::init(cfg.cache_ttl_secs)?;

    let provider = WorldBankProvider::from_url(
        &cfg.world_bank_base_url,
        cfg.per_page,
        Duration::from_millis(cfg.request_timeout_ms),
    )?;
    info!(
        base_url = %cfg.world_bank_base_url,
        timeout_ms = cfg.request_timeout_ms,
        cache_ttl_secs = cfg.cache_ttl_secs,
        "tariff impact app configured"
    );

    let state = AppState::new(Arc::new(provider), cfg);
    Ok(api::router(state).merge(metrics.router()))
}
