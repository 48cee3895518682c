//! # Tariff Impact Calculator
//! Pure, closed-form arithmetic mapping a tariff rate to four impact
//! estimates. No I/O and no error states: any finite input produces an
//! output, out-of-range inputs simply produce out-of-range results.
//!
//! The coefficients are fixed and must not drift; downstream tables and
//! exported reports are compared against them.

use serde::{Deserialize, Serialize};

/// Tariff rate at which retaliation is considered "full strength".
pub const RETALIATION_NORMALIZER: f64 = 50.0;

const TRADE_BASELINE: f64 = 500.0;
const TRADE_PER_POINT: f64 = 5.0;
const GDP_PER_POINT: f64 = 0.03;
const JOBS_PER_POINT: f64 = 3000.0;
const INFLATION_PER_POINT: f64 = 0.02;

/// Estimated losses for one side of a tariff exchange.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactResult {
    /// Billions, affected country's currency.
    pub trade_loss: f64,
    /// Billions, affected country's currency.
    pub gdp_loss: f64,
    /// Whole-number head count (stored as f64).
    pub job_loss: f64,
    /// Percentage points.
    pub inflation_increase: f64,
}

/// The four indicators, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactIndicator {
    TradeLoss,
    GdpLoss,
    JobLoss,
    InflationIncrease,
}

impl ImpactIndicator {
    pub const ALL: [ImpactIndicator; 4] = [
        ImpactIndicator::TradeLoss,
        ImpactIndicator::GdpLoss,
        ImpactIndicator::JobLoss,
        ImpactIndicator::InflationIncrease,
    ];

    /// Decimal places the value is reported with.
    pub fn decimals(self) -> u32 {
        match self {
            ImpactIndicator::JobLoss => 0,
            _ => 2,
        }
    }
}

impl ImpactResult {
    pub fn get(&self, indicator: ImpactIndicator) -> f64 {
        match indicator {
            ImpactIndicator::TradeLoss => self.trade_loss,
            ImpactIndicator::GdpLoss => self.gdp_loss,
            ImpactIndicator::JobLoss => self.job_loss,
            ImpactIndicator::InflationIncrease => self.inflation_increase,
        }
    }

    /// (indicator, value) pairs in table order.
    pub fn entries(&self) -> [(ImpactIndicator, f64); 4] {
        ImpactIndicator::ALL.map(|i| (i, self.get(i)))
    }

    fn map(&self, f: impl Fn(ImpactIndicator, f64) -> f64) -> Self {
        Self {
            trade_loss: f(ImpactIndicator::TradeLoss, self.trade_loss),
            gdp_loss: f(ImpactIndicator::GdpLoss, self.gdp_loss),
            job_loss: f(ImpactIndicator::JobLoss, self.job_loss),
            inflation_increase: f(ImpactIndicator::InflationIncrease, self.inflation_increase),
        }
    }
}

/// Round to `decimals` places from the exact binary value of `x`, ties to
/// even. `0.015_f64` sits just below 0.015 and rounds to 0.01.
pub fn round_to(x: f64, decimals: u32) -> f64 {
    if !x.is_finite() {
        return x;
    }
    format!("{:.*}", decimals as usize, x).parse().unwrap_or(x)
}

/// Losses suffered by the country the tariff is imposed on.
pub fn compute_origin_impact(tariff_rate: f64) -> ImpactResult {
    let raw = ImpactResult {
        trade_loss: TRADE_BASELINE - TRADE_PER_POINT * tariff_rate,
        gdp_loss: GDP_PER_POINT * tariff_rate,
        job_loss: JOBS_PER_POINT * tariff_rate,
        inflation_increase: INFLATION_PER_POINT * tariff_rate,
    };
    raw.map(|i, v| round_to(v, i.decimals()))
}

/// Counter-losses for the imposing country: each origin value scaled by
/// `retaliation_rate / 50`, rounded like the origin values.
pub fn compute_retaliation_impact(origin: &ImpactResult, retaliation_rate: f64) -> ImpactResult {
    let ratio = retaliation_rate / RETALIATION_NORMALIZER;
    origin.map(|i, v| round_to(v * ratio, i.decimals()))
}
