// src/predictor.rs
//! Single-feature ordinary least squares.
//!
//! Closed form: slope = Sxy / Sxx, intercept = mean_y - slope * mean_x.
//! Fewer than two samples or a constant feature is an error, never a
//! placeholder prediction.

use serde::{Deserialize, Serialize};

use crate::calculator::compute_origin_impact;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictError {
    #[error("insufficient data: need at least 2 samples, got {got}")]
    InsufficientData { got: usize },
    #[error("degenerate input: feature is constant across all samples")]
    DegenerateInput,
    #[error("sample {index} is not finite")]
    NonFiniteSample { index: usize },
}

/// `y = intercept + slope * x`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub samples: usize,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

pub fn fit(samples: &[(f64, f64)]) -> Result<LinearFit, PredictError> {
    if samples.len() < 2 {
        return Err(PredictError::InsufficientData { got: samples.len() });
    }
    if let Some(index) = samples
        .iter()
        .position(|(x, y)| !x.is_finite() || !y.is_finite())
    {
        return Err(PredictError::NonFiniteSample { index });
    }

    let x0 = samples[0].0;
    if samples.iter().all(|(x, _)| *x == x0) {
        return Err(PredictError::DegenerateInput);
    }

    let n = samples.len() as f64;
    let mean_x = samples.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = samples.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut sxx, mut sxy) = (0.0, 0.0);
    for (x, y) in samples {
        let dx = x - mean_x;
        sxx += dx * dx;
        sxy += dx * (y - mean_y);
    }
    // spread can still vanish or overflow when distinct features sit at the
    // edges of f64 range
    if !(sxx > 0.0 && sxx.is_finite()) {
        return Err(PredictError::DegenerateInput);
    }

    let slope = sxy / sxx;
    Ok(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
        samples: samples.len(),
    })
}

pub fn fit_and_predict(samples: &[(f64, f64)], query_feature: f64) -> Result<f64, PredictError> {
    Ok(fit(samples)?.predict(query_feature))
}

/// Tariff rate → GDP loss pairs for rates 0, 5, ..., 50, taken from the
/// calculator. Used when a caller asks for a prediction without data.
pub fn synthetic_tariff_samples() -> Vec<(f64, f64)> {
    (0..=10)
        .map(|i| {
            let rate = f64::from(i) * 5.0;
            (rate, compute_origin_impact(rate).gdp_loss)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_line() {
        let y = fit_and_predict(&[(1.0, 2.0), (2.0, 4.0), (3.0, 6.0)], 4.0).unwrap();
        assert_eq!(y, 8.0);
    }

    #[test]
    fn constant_feature_is_degenerate() {
        assert_eq!(
            fit_and_predict(&[(5.0, 1.0), (5.0, 2.0)], 1.0),
            Err(PredictError::DegenerateInput)
        );
        assert_eq!(
            fit(&[(0.0, 1.0), (0.0, 3.0), (0.0, 2.0)]),
            Err(PredictError::DegenerateInput)
        );
    }

    #[test]
    fn large_distinct_features_still_fit() {
        let y = fit_and_predict(&[(1e8, 0.0), (1e8 + 1.0, 1.0)], 1e8 + 2.0).unwrap();
        assert_eq!(y, 2.0);

        // squaring the raw features would overflow; the centered spread does not
        let f = fit(&[(1e155, 1.0), (1e155 + 1e150, 2.0), (1e155 + 2e150, 3.0)]).unwrap();
        assert!((f.predict(1e155 + 3e150) - 4.0).abs() < 1e-6);
    }

    #[test]
    fn too_few_samples() {
        assert_eq!(
            fit_and_predict(&[], 1.0),
            Err(PredictError::InsufficientData { got: 0 })
        );
        assert_eq!(
            fit_and_predict(&[(1.0, 1.0)], 1.0),
            Err(PredictError::InsufficientData { got: 1 })
        );
    }

    #[test]
    fn non_finite_rejected() {
        assert_eq!(
            fit(&[(1.0, 1.0), (f64::NAN, 2.0)]),
            Err(PredictError::NonFiniteSample { index: 1 })
        );
    }

    #[test]
    fn noisy_fit_minimizes_squared_residuals() {
        // y = 1 + 2x with symmetric noise; OLS recovers it exactly
        let samples = [(0.0, 1.5), (0.0, 0.5), (1.0, 3.5), (1.0, 2.5)];
        let f = fit(&samples).unwrap();
        assert!((f.slope - 2.0).abs() < 1e-12);
        assert!((f.intercept - 1.0).abs() < 1e-12);
    }

    #[test]
    fn synthetic_set_tracks_gdp_coefficient() {
        let samples = synthetic_tariff_samples();
        assert_eq!(samples.len(), 11);
        let f = fit(&samples).unwrap();
        assert!((f.slope - 0.03).abs() < 1e-3);
        assert!((f.predict(20.0) - 0.6).abs() < 1e-2);
    }
}
