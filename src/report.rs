// src/report.rs
//! Labelled impact tables and the flattened rows handed to exporters.

use serde::{Deserialize, Serialize};

use crate::calculator::{ImpactIndicator, ImpactResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// Display name used in row labels ("Canada", "U.S.").
    pub name: String,
    /// Two-letter code used for indicator lookups.
    pub code: String,
    pub currency: String,
}

/// Who imposes the tariff and who absorbs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub imposing: Country,
    pub affected: Country,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            imposing: Country {
                name: "U.S.".into(),
                code: "US".into(),
                currency: "USD".into(),
            },
            affected: Country {
                name: "Canada".into(),
                code: "CA".into(),
                currency: "CAD".into(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Losses of the country the tariff is imposed on.
    Origin,
    /// Counter-losses of the imposing country after retaliation.
    Retaliation,
}

fn label(country: &Country, side: Side, indicator: ImpactIndicator) -> String {
    let (name, cur) = (&country.name, &country.currency);
    match (indicator, side) {
        (ImpactIndicator::TradeLoss, _) => format!("{name} Trade Loss (Billion {cur})"),
        (ImpactIndicator::GdpLoss, Side::Origin) => format!("{name} GDP Loss (Billion {cur})"),
        (ImpactIndicator::GdpLoss, Side::Retaliation) => {
            format!("{name} GDP Impact (Billion {cur})")
        }
        (ImpactIndicator::JobLoss, _) => format!("{name} Job Loss Estimate"),
        (ImpactIndicator::InflationIncrease, _) => format!("{name} Inflation Increase (%)"),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub indicator: String,
    pub estimated_value: f64,
    /// Places the value is reported with (0 for head counts).
    pub decimals: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactTable {
    pub country: String,
    pub rows: Vec<TableRow>,
}

pub fn impact_table(scenario: &Scenario, side: Side, result: &ImpactResult) -> ImpactTable {
    let country = match side {
        Side::Origin => &scenario.affected,
        Side::Retaliation => &scenario.imposing,
    };
    ImpactTable {
        country: country.code.clone(),
        rows: result
            .entries()
            .into_iter()
            .map(|(ind, v)| TableRow {
                indicator: label(country, side, ind),
                estimated_value: v,
                decimals: ind.decimals(),
            })
            .collect(),
    }
}

/// Export-layer input: one (label, value) pair per row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub label: String,
    pub value: f64,
    pub decimals: u32,
}

/// Origin rows first, then retaliation rows.
pub fn flatten(tables: &[&ImpactTable]) -> Vec<ReportRow> {
    tables
        .iter()
        .flat_map(|t| t.rows.iter())
        .map(|r| ReportRow {
            label: r.indicator.clone(),
            value: r.estimated_value,
            decimals: r.decimals,
        })
        .collect()
}

pub fn report_title(scenario: &Scenario) -> String {
    let code = scenario.imposing.code.to_ascii_uppercase();
    format!("{code} Tariff Impact Report")
}

/// Plain-text body: title, blank line, `label: value` lines, each value
/// printed with the row's own precision.
pub fn render_text(title: &str, rows: &[ReportRow]) -> String {
    let mut out = String::with_capacity(64 + rows.len() * 48);
    out.push_str(title);
    out.push_str("\n\n");
    for r in rows {
        out.push_str(&format!("{}: {:.*}\n", r.label, r.decimals as usize, r.value));
    }
    out
}
