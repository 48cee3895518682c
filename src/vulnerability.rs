// src/vulnerability.rs
//! Static, illustrative exposure scores (0..=1) of Canadian provinces to
//! tariffs on their exports. Not computed from data.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegionVulnerability {
    pub region: &'static str,
    pub index: f64,
}

const PROVINCES: [RegionVulnerability; 6] = [
    RegionVulnerability { region: "Ontario", index: 0.35 },
    RegionVulnerability { region: "Quebec", index: 0.25 },
    RegionVulnerability { region: "British Columbia", index: 0.15 },
    RegionVulnerability { region: "Alberta", index: 0.10 },
    RegionVulnerability { region: "Manitoba", index: 0.10 },
    RegionVulnerability { region: "Saskatchewan", index: 0.05 },
];

pub fn provincial_vulnerability() -> &'static [RegionVulnerability] {
    &PROVINCES
}
