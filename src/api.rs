use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::calculator::{compute_origin_impact, compute_retaliation_impact, ImpactResult};
use crate::config::AppConfig;
use crate::indicators::cache::{Freshness, SeriesCache};
use crate::indicators::latest_value;
use crate::indicators::types::{IndicatorSnapshot, IndicatorSource, Observation, SeriesKey};
use crate::policy::PolicyInputs;
use crate::predictor::{self, PredictError};
use crate::report::{self, ImpactTable, ReportRow, Side};
use crate::vulnerability::{provincial_vulnerability, RegionVulnerability};

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn IndicatorSource>,
    pub cache: Arc<SeriesCache>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(source: Arc<dyn IndicatorSource>, config: AppConfig) -> Self {
        let cache = SeriesCache::new(Freshness::from_secs(config.cache_ttl_secs));
        Self {
            source,
            cache: Arc::new(cache),
            config: Arc::new(config),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/indicators/snapshot", get(indicator_snapshot))
        .route("/indicators/{country}/{indicator}", get(indicator_series))
        .route("/simulate", get(simulate))
        .route("/report", get(report_text))
        .route("/report/rows", get(report_rows))
        .route("/vulnerability", get(vulnerability))
        .route("/predict", post(predict))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

// ------------------------------------------------------------
// Errors
// ------------------------------------------------------------

pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl ToString) -> Self {
        Self {
            status,
            message: message.to_string(),
        }
    }
}

// Extractor rejections keep axum's status but use the JSON error body.
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

// ------------------------------------------------------------
// Indicators
// ------------------------------------------------------------

#[derive(Serialize)]
struct SeriesOut {
    country: String,
    indicator: String,
    series: Vec<Observation>,
    latest: IndicatorSnapshot,
    fetched_at: DateTime<Utc>,
}

async fn indicator_series(
    State(state): State<AppState>,
    Path((country, indicator)): Path<(String, String)>,
) -> Result<Json<SeriesOut>, ApiError> {
    let key = SeriesKey::new(&country, &indicator)
        .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e))?;

    let cached = state.cache.get_or_fetch(state.source.as_ref(), &key).await;
    let latest = latest_value(&cached.series);
    Ok(Json(SeriesOut {
        country: key.country,
        indicator: key.indicator,
        series: cached.series.observations.clone(),
        latest,
        fetched_at: cached.fetched_at,
    }))
}

#[derive(Serialize)]
struct SnapshotOut {
    country: String,
    indicator: String,
    label: String,
    latest: IndicatorSnapshot,
    period: Option<i32>,
}

async fn indicator_snapshot(
    State(state): State<AppState>,
) -> Result<Json<Vec<SnapshotOut>>, ApiError> {
    let keys = state
        .config
        .snapshot_keys()
        .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e))?;

    let mut out = Vec::with_capacity(keys.len());
    for (key, label) in keys {
        let cached = state.cache.get_or_fetch(state.source.as_ref(), &key).await;
        let latest = latest_value(&cached.series);
        let period = latest
            .is_available()
            .then(|| cached.series.observations.last().map(|o| o.period))
            .flatten();
        out.push(SnapshotOut {
            country: key.country,
            indicator: key.indicator,
            label,
            latest,
            period,
        });
    }
    Ok(Json(out))
}

// ------------------------------------------------------------
// Simulation + report
// ------------------------------------------------------------

/// Slider values as query params; absent ones take the slider defaults.
#[derive(Debug, Default, Deserialize)]
struct PolicyQuery {
    tariff: Option<f64>,
    retaliation: Option<f64>,
    subsidy: Option<f64>,
    tax: Option<f64>,
}

impl PolicyQuery {
    fn into_inputs(self) -> PolicyInputs {
        let d = PolicyInputs::default();
        PolicyInputs {
            tariff_rate: self.tariff.unwrap_or(d.tariff_rate),
            retaliation_rate: self.retaliation.unwrap_or(d.retaliation_rate),
            subsidy: self.subsidy.unwrap_or(d.subsidy),
            tax_change: self.tax.unwrap_or(d.tax_change),
        }
    }
}

#[derive(Serialize)]
struct ImpactPair {
    origin: ImpactResult,
    retaliation: ImpactResult,
}

#[derive(Serialize)]
struct SimulationOut {
    inputs: PolicyInputs,
    results: ImpactPair,
    origin_table: ImpactTable,
    retaliation_table: ImpactTable,
}

fn run_simulation(config: &AppConfig, q: PolicyQuery) -> Result<SimulationOut, ApiError> {
    let inputs = q.into_inputs();
    inputs
        .validate(&config.policy_bounds())
        .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e))?;

    let origin = compute_origin_impact(inputs.tariff_rate);
    let retaliation = compute_retaliation_impact(&origin, inputs.retaliation_rate);
    counter!("simulate_requests_total").increment(1);
    tracing::debug!(
        tariff = inputs.tariff_rate,
        retaliation = inputs.retaliation_rate,
        "simulation computed"
    );

    Ok(SimulationOut {
        inputs,
        origin_table: report::impact_table(&config.scenario, Side::Origin, &origin),
        retaliation_table: report::impact_table(&config.scenario, Side::Retaliation, &retaliation),
        results: ImpactPair {
            origin,
            retaliation,
        },
    })
}

async fn simulate(
    State(state): State<AppState>,
    query: Result<Query<PolicyQuery>, QueryRejection>,
) -> Result<Json<SimulationOut>, ApiError> {
    let Query(q) = query?;
    run_simulation(&state.config, q).map(Json)
}

async fn report_rows(
    State(state): State<AppState>,
    query: Result<Query<PolicyQuery>, QueryRejection>,
) -> Result<Json<Vec<ReportRow>>, ApiError> {
    let Query(q) = query?;
    let sim = run_simulation(&state.config, q)?;
    Ok(Json(report::flatten(&[
        &sim.origin_table,
        &sim.retaliation_table,
    ])))
}

async fn report_text(
    State(state): State<AppState>,
    query: Result<Query<PolicyQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(q) = query?;
    let sim = run_simulation(&state.config, q)?;
    let rows = report::flatten(&[&sim.origin_table, &sim.retaliation_table]);
    let body = report::render_text(&report::report_title(&state.config.scenario), &rows);
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response())
}

async fn vulnerability() -> Json<&'static [RegionVulnerability]> {
    Json(provincial_vulnerability())
}

// ------------------------------------------------------------
// Predictor
// ------------------------------------------------------------

#[derive(Deserialize)]
struct PredictReq {
    #[serde(default)]
    samples: Option<Vec<(f64, f64)>>,
    query: f64,
}

#[derive(Serialize)]
struct PredictResp {
    prediction: f64,
    slope: f64,
    intercept: f64,
    samples: usize,
    synthetic: bool,
}

fn predict_error_kind(e: &PredictError) -> &'static str {
    match e {
        PredictError::InsufficientData { .. } => "insufficient_data",
        PredictError::DegenerateInput => "degenerate_input",
        PredictError::NonFiniteSample { .. } => "non_finite",
    }
}

async fn predict(
    body: Result<Json<PredictReq>, JsonRejection>,
) -> Result<Json<PredictResp>, ApiError> {
    let Json(body) = body?;
    let (samples, synthetic) = match body.samples {
        Some(s) => (s, false),
        None => (predictor::synthetic_tariff_samples(), true),
    };
    let fit = predictor::fit(&samples).map_err(|e| {
        counter!("predict_errors_total", "kind" => predict_error_kind(&e)).increment(1);
        ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, e)
    })?;
    Ok(Json(PredictResp {
        prediction: fit.predict(body.query),
        slope: fit.slope,
        intercept: fit.intercept,
        samples: fit.samples,
        synthetic,
    }))
}
