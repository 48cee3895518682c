// src/indicators/mod.rs
pub mod cache;
pub mod providers;
pub mod types;

use crate::indicators::types::{
    FetchError, IndicatorSeries, IndicatorSnapshot, Observation, SeriesKey,
};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;
use serde_json::Value;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("indicator_fetch_total", "Upstream indicator requests issued.");
        describe_counter!(
            "indicator_fetch_errors_total",
            "Indicator fetches degraded to an empty series, by kind."
        );
        describe_histogram!("indicator_fetch_ms", "Upstream fetch + parse time in milliseconds.");
        describe_counter!("indicator_cache_hits_total", "Series served from the cache.");
        describe_counter!(
            "indicator_cache_misses_total",
            "Series missing or stale in the cache."
        );
        describe_gauge!(
            "indicator_cache_ttl_secs",
            "Configured cache TTL in seconds (0 = session-scoped)."
        );
    });
}

/// Parse a World Bank style envelope: `[meta, [record, ...]]`.
///
/// A missing/`null` second element means "no data" and yields an empty series.
/// Anything that is not a JSON array of at least two elements is malformed
/// (the API answers errors with a one-element `[{"message": ...}]`).
pub fn parse_envelope(key: &SeriesKey, body: &str) -> Result<IndicatorSeries, FetchError> {
    let root: Value =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;
    let Value::Array(parts) = root else {
        return Err(FetchError::Malformed("envelope is not an array".into()));
    };
    if parts.len() < 2 {
        return Err(FetchError::Malformed(format!(
            "envelope has {} element(s), expected 2",
            parts.len()
        )));
    }
    match &parts[1] {
        Value::Null => Ok(IndicatorSeries::empty(key.clone())),
        Value::Array(records) => Ok(normalize_records(key, records)),
        _ => Err(FetchError::Malformed("records element is not a list".into())),
    }
}

/// Drop null/non-numeric values and non-integer periods, then sort ascending by period.
pub fn normalize_records(key: &SeriesKey, records: &[Value]) -> IndicatorSeries {
    let mut observations: Vec<Observation> = records
        .iter()
        .filter_map(|rec| {
            let value = coerce_value(rec.get("value")?)?;
            let period = coerce_period(rec.get("date")?)?;
            Some(Observation { period, value })
        })
        .collect();
    observations.sort_by_key(|o| o.period);

    IndicatorSeries {
        key: key.clone(),
        observations,
    }
}

fn coerce_value(v: &Value) -> Option<f64> {
    let x = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    x.is_finite().then_some(x)
}

fn coerce_period(v: &Value) -> Option<i32> {
    match v {
        Value::Number(n) => n.as_i64().and_then(|p| i32::try_from(p).ok()),
        Value::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    }
}

/// Value of the most recent observation, or `Unavailable` for an empty series.
pub fn latest_value(series: &IndicatorSeries) -> IndicatorSnapshot {
    series
        .observations
        .iter()
        .rev()
        .find(|o| o.value.is_finite())
        .map(|o| IndicatorSnapshot::Available { value: o.value })
        .unwrap_or(IndicatorSnapshot::Unavailable)
}
