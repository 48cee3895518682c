// tests/calculator_properties.rs
//
// Sweeps the slider ranges and checks the closed-form contracts of the
// calculator through the public API.

use serde::Deserialize;
use tariff_impact_sim::calculator::{round_to, ImpactIndicator};
use tariff_impact_sim::{compute_origin_impact, compute_retaliation_impact};

/// One slider position with the published figures for it, in table order
/// (trade, gdp, jobs, inflation).
#[derive(Deserialize)]
struct GridRow {
    tariff: f64,
    retaliation: f64,
    origin: [f64; 4],
    retaliation_impact: [f64; 4],
}

fn tariff_grid() -> impl Iterator<Item = f64> {
    // 0.0, 0.5, ..., 50.0 covers both slider variants and off-step values
    (0..=100).map(|i| f64::from(i) * 0.5)
}

#[test]
fn trade_loss_matches_formula_across_range() {
    for t in tariff_grid() {
        let r = compute_origin_impact(t);
        assert_eq!(r.trade_loss, round_to(500.0 - 5.0 * t, 2), "tariff={t}");
        assert_eq!(r.gdp_loss, round_to(0.03 * t, 2), "tariff={t}");
        assert_eq!(r.inflation_increase, round_to(0.02 * t, 2), "tariff={t}");
    }
}

#[test]
fn job_loss_is_non_negative_whole_count() {
    for t in tariff_grid() {
        let r = compute_origin_impact(t);
        assert!(r.job_loss >= 0.0, "tariff={t}");
        assert_eq!(r.job_loss.fract(), 0.0, "tariff={t}");
        assert_eq!(r.job_loss, (3000.0 * t).round(), "tariff={t}");
    }
}

#[test]
fn retaliation_zero_and_full_strength() {
    for t in tariff_grid() {
        let origin = compute_origin_impact(t);
        let none = compute_retaliation_impact(&origin, 0.0);
        for ind in ImpactIndicator::ALL {
            assert_eq!(none.get(ind), 0.0, "tariff={t} {ind:?}");
        }
        assert_eq!(compute_retaliation_impact(&origin, 50.0), origin, "tariff={t}");
    }
}

#[test]
fn retaliation_scales_linearly_on_slider_steps() {
    let origin = compute_origin_impact(20.0);
    let unit = compute_retaliation_impact(&origin, 5.0);
    for step in 0..=10 {
        let rate = f64::from(step) * 5.0;
        let r = compute_retaliation_impact(&origin, rate);
        for ind in ImpactIndicator::ALL {
            let expected = round_to(unit.get(ind) * f64::from(step), ind.decimals());
            assert!(
                (r.get(ind) - expected).abs() < 1e-9,
                "rate={rate} {ind:?}: got {} expected {expected}",
                r.get(ind)
            );
        }
    }
}

#[test]
fn reference_scenario() {
    let origin = compute_origin_impact(20.0);
    assert_eq!(origin.trade_loss, 400.0);
    assert_eq!(origin.gdp_loss, 0.6);
    assert_eq!(origin.job_loss, 60000.0);
    assert_eq!(origin.inflation_increase, 0.4);

    let retaliation = compute_retaliation_impact(&origin, 10.0);
    assert_eq!(retaliation.trade_loss, 80.0);
}

#[test]
fn every_slider_step_matches_published_table() {
    let rows: Vec<GridRow> =
        serde_json::from_str(include_str!("fixtures/impact_grid.json")).expect("grid fixture");
    assert_eq!(rows.len(), 11 * 11);

    for row in rows {
        let origin = compute_origin_impact(row.tariff);
        let retaliation = compute_retaliation_impact(&origin, row.retaliation);
        for (i, ind) in ImpactIndicator::ALL.into_iter().enumerate() {
            assert_eq!(
                origin.get(ind),
                row.origin[i],
                "origin tariff={} {ind:?}",
                row.tariff
            );
            assert_eq!(
                retaliation.get(ind),
                row.retaliation_impact[i],
                "tariff={} retaliation={} {ind:?}",
                row.tariff,
                row.retaliation
            );
        }
    }
}
