// src/policy.rs
//! User-controlled levers and their slider bounds.
//!
//! The calculator accepts any number; bounds are checked here, at the
//! boundary where a request becomes a `PolicyInputs`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lever {
    OriginTariff,
    RetaliationTariff,
    Subsidy,
    TaxChange,
}

impl Lever {
    pub fn name(self) -> &'static str {
        match self {
            Lever::OriginTariff => "tariff",
            Lever::RetaliationTariff => "retaliation",
            Lever::Subsidy => "subsidy",
            Lever::TaxChange => "tax",
        }
    }
}

/// Inclusive range plus slider step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeverBounds {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl LeverBounds {
    pub const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    fn check(&self, lever: Lever, value: f64) -> Result<(), PolicyError> {
        if !value.is_finite() || value < self.min || value > self.max {
            return Err(PolicyError::OutOfRange {
                lever: lever.name(),
                value,
                min: self.min,
                max: self.max,
            });
        }
        let steps = (value - self.min) / self.step;
        if (steps - steps.round()).abs() > 1e-9 {
            return Err(PolicyError::OffStep {
                lever: lever.name(),
                value,
                step: self.step,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PolicyError {
    #[error("{lever}={value} is outside [{min}, {max}]")]
    OutOfRange {
        lever: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{lever}={value} is not a multiple of step {step}")]
    OffStep {
        lever: &'static str,
        value: f64,
        step: f64,
    },
}

/// Slider bounds for every lever. `origin_tariff.min` is 5 in the classic
/// layout and 0 in the wider variant; see `AppConfig::origin_tariff_min`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicyBounds {
    pub origin_tariff: LeverBounds,
    pub retaliation_tariff: LeverBounds,
    pub subsidy: LeverBounds,
    pub tax_change: LeverBounds,
}

impl Default for PolicyBounds {
    fn default() -> Self {
        Self::with_origin_min(5.0)
    }
}

impl PolicyBounds {
    pub fn with_origin_min(origin_min: f64) -> Self {
        Self {
            origin_tariff: LeverBounds::new(origin_min, 50.0, 5.0),
            retaliation_tariff: LeverBounds::new(0.0, 50.0, 5.0),
            subsidy: LeverBounds::new(0.0, 50.0, 1.0),
            tax_change: LeverBounds::new(-5.0, 5.0, 1.0),
        }
    }

    pub fn for_lever(&self, lever: Lever) -> LeverBounds {
        match lever {
            Lever::OriginTariff => self.origin_tariff,
            Lever::RetaliationTariff => self.retaliation_tariff,
            Lever::Subsidy => self.subsidy,
            Lever::TaxChange => self.tax_change,
        }
    }
}

/// One computation's lever values. Built once per request, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicyInputs {
    /// Tariff imposed on the affected country's goods (%).
    pub tariff_rate: f64,
    /// Counter-tariff on the imposing country's goods (%).
    pub retaliation_rate: f64,
    /// Government subsidy support (billions).
    pub subsidy: f64,
    /// Corporate tax rate change (percentage points).
    pub tax_change: f64,
}

impl Default for PolicyInputs {
    fn default() -> Self {
        Self {
            tariff_rate: 20.0,
            retaliation_rate: 10.0,
            subsidy: 10.0,
            tax_change: 0.0,
        }
    }
}

impl PolicyInputs {
    pub fn value(&self, lever: Lever) -> f64 {
        match lever {
            Lever::OriginTariff => self.tariff_rate,
            Lever::RetaliationTariff => self.retaliation_rate,
            Lever::Subsidy => self.subsidy,
            Lever::TaxChange => self.tax_change,
        }
    }

    /// First violated bound, if any, in lever order.
    pub fn validate(&self, bounds: &PolicyBounds) -> Result<(), PolicyError> {
        for lever in [
            Lever::OriginTariff,
            Lever::RetaliationTariff,
            Lever::Subsidy,
            Lever::TaxChange,
        ] {
            bounds.for_lever(lever).check(lever, self.value(lever))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(PolicyInputs::default()
            .validate(&PolicyBounds::default())
            .is_ok());
    }

    #[test]
    fn tariff_floor_depends_on_variant() {
        let zero = PolicyInputs {
            tariff_rate: 0.0,
            ..PolicyInputs::default()
        };
        assert!(matches!(
            zero.validate(&PolicyBounds::default()),
            Err(PolicyError::OutOfRange { lever: "tariff", .. })
        ));
        assert!(zero.validate(&PolicyBounds::with_origin_min(0.0)).is_ok());
    }

    #[test]
    fn off_step_and_out_of_range() {
        let b = PolicyBounds::default();
        let off = PolicyInputs {
            retaliation_rate: 12.0,
            ..PolicyInputs::default()
        };
        assert!(matches!(
            off.validate(&b),
            Err(PolicyError::OffStep { lever: "retaliation", .. })
        ));

        let tax = PolicyInputs {
            tax_change: -6.0,
            ..PolicyInputs::default()
        };
        assert!(matches!(
            tax.validate(&b),
            Err(PolicyError::OutOfRange { lever: "tax", .. })
        ));

        let nan = PolicyInputs {
            subsidy: f64::NAN,
            ..PolicyInputs::default()
        };
        assert!(nan.validate(&b).is_err());
    }

    #[test]
    fn negative_tax_steps_are_accepted() {
        let p = PolicyInputs {
            tax_change: -3.0,
            subsidy: 37.0,
            ..PolicyInputs::default()
        };
        assert!(p.validate(&PolicyBounds::default()).is_ok());
    }
}
