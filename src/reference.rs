//! Static reference data: usage-profile presets and the demand tariff-code registry.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::Path,
};

use serde::Deserialize;

use crate::prelude::*;

/// How the daily usage splits between the peak and off-peak windows.
///
/// Rough heuristics, since the actual time-of-use windows vary per supply area,
/// but they let the user model different consumption patterns.
#[derive(Debug, Eq, PartialEq, clap::ValueEnum, Clone, Copy)]
pub enum UsageProfile {
    Flat,
    SlightPeak,
    HeavyPeak,
    OffPeakHeavy,
    BatteryOptimised,
}

impl UsageProfile {
    pub const ALL: [Self; 5] =
        [Self::Flat, Self::SlightPeak, Self::HeavyPeak, Self::OffPeakHeavy, Self::BatteryOptimised];

    #[must_use]
    pub const fn peak_share(self) -> f64 {
        match self {
            Self::Flat => 0.50,
            Self::SlightPeak => 0.60,
            Self::HeavyPeak => 0.75,
            Self::OffPeakHeavy => 0.30,
            Self::BatteryOptimised => 0.10,
        }
    }

    #[must_use]
    pub const fn off_peak_share(self) -> f64 {
        1.0 - self.peak_share()
    }

    /// The name shown in the workbook dropdown.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Flat => "Flat 50/50",
            Self::SlightPeak => "Slight Peak 60/40",
            Self::HeavyPeak => "Heavy Peak 75/25",
            Self::OffPeakHeavy => "Off-Peak Heavy 30/70",
            Self::BatteryOptimised => "Battery Optimised 10/90",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Flat => "Even usage across peak and off-peak",
            Self::SlightPeak => "Slightly more usage during peak hours",
            Self::HeavyPeak => "Most usage during peak hours",
            Self::OffPeakHeavy => "Most usage shifted to off-peak",
            Self::BatteryOptimised => "Battery covers peak, almost all off-peak",
        }
    }
}

/// Network tariff codes that require a demand meter, keyed globally and per
/// supply area. The built-in set covers the common ones; region-specific codes
/// are injected from a TOML file.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DemandTariffRegistry {
    #[serde(default)]
    global: BTreeSet<String>,

    #[serde(default)]
    supply_areas: BTreeMap<String, BTreeSet<String>>,
}

impl Default for DemandTariffRegistry {
    fn default() -> Self {
        Self {
            global: ["D", "DMD"].into_iter().map(str::to_owned).collect(),
            supply_areas: [
                // Ausgrid residential demand tariffs.
                ("4", &["EA305", "EA310", "EA315"][..]),
                // Endeavour Energy.
                ("13", &["N70", "N71"][..]),
                // Energex.
                ("30", &["3700", "3900"][..]),
            ]
            .into_iter()
            .map(|(area, codes)| {
                (area.to_owned(), codes.iter().copied().map(str::to_owned).collect())
            })
            .collect(),
        }
    }
}

impl DemandTariffRegistry {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read `{}`", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse the registry in `{}`", path.display()))
    }

    #[must_use]
    pub fn is_demand_tariff(&self, supply_area_id: &str, code: &str) -> bool {
        if code.is_empty() {
            return false;
        }
        let code = code.to_uppercase();
        self.global.contains(&code)
            || self
                .supply_areas
                .get(supply_area_id)
                .is_some_and(|codes| codes.contains(&code))
    }
}
