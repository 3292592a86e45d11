//! Spreadsheet formulas for the calculator sheet.
//!
//! The costs are emitted as formulas over the user-editable input cells, so the
//! workbook keeps recalculating after export. Cell coordinates are data here:
//! each calculator column carries its role, title and letter.

use crate::{quantity::energy::KilowattHours, reference::UsageProfile};

pub const DAILY_USAGE_CELL: &str = "$B$4";
pub const SOLAR_EXPORT_CELL: &str = "$B$5";
pub const USAGE_PROFILE_CELL: &str = "$B$6";
pub const CONTROLLED_LOAD_TOGGLE_CELL: &str = "$B$7";
pub const CONTROLLED_LOAD_USAGE_CELL: &str = "$B$8";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CalculatorColumn {
    PlanName,
    Retailer,
    TariffType,
    PlanUrl,
    SupplyCharge,
    UsageRate,
    PeakRate,
    OffPeakRate,
    FeedInFirstTier,
    FeedInRemainder,
    FeedInDetails,
    ControlledLoadRate,
    ControlledLoadSupply,
    PeakShare,
    OffPeakShare,
    UsageCost,
    SolarCredit,
    ControlledLoadCost,
    NetPerDay,
    NetPerMonth,
}

impl CalculatorColumn {
    pub const ALL: [Self; 20] = [
        Self::PlanName,
        Self::Retailer,
        Self::TariffType,
        Self::PlanUrl,
        Self::SupplyCharge,
        Self::UsageRate,
        Self::PeakRate,
        Self::OffPeakRate,
        Self::FeedInFirstTier,
        Self::FeedInRemainder,
        Self::FeedInDetails,
        Self::ControlledLoadRate,
        Self::ControlledLoadSupply,
        Self::PeakShare,
        Self::OffPeakShare,
        Self::UsageCost,
        Self::SolarCredit,
        Self::ControlledLoadCost,
        Self::NetPerDay,
        Self::NetPerMonth,
    ];

    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::PlanName => 'A',
            Self::Retailer => 'B',
            Self::TariffType => 'C',
            Self::PlanUrl => 'D',
            Self::SupplyCharge => 'E',
            Self::UsageRate => 'F',
            Self::PeakRate => 'G',
            Self::OffPeakRate => 'H',
            Self::FeedInFirstTier => 'I',
            Self::FeedInRemainder => 'J',
            Self::FeedInDetails => 'K',
            Self::ControlledLoadRate => 'L',
            Self::ControlledLoadSupply => 'M',
            Self::PeakShare => 'N',
            Self::OffPeakShare => 'O',
            Self::UsageCost => 'P',
            Self::SolarCredit => 'Q',
            Self::ControlledLoadCost => 'R',
            Self::NetPerDay => 'S',
            Self::NetPerMonth => 'T',
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::PlanName => "Plan Name",
            Self::Retailer => "Retailer",
            Self::TariffType => "Tariff Type",
            Self::PlanUrl => "Plan URL",
            Self::SupplyCharge => "Supply (c/day)",
            Self::UsageRate => "Usage Rate (c/kWh)",
            Self::PeakRate => "Peak Rate (c/kWh)",
            Self::OffPeakRate => "Off-Peak Rate (c/kWh)",
            Self::FeedInFirstTier => "Solar FIT first tier (c/kWh)",
            Self::FeedInRemainder => "Solar FIT thereafter (c/kWh)",
            Self::FeedInDetails => "Solar FIT Details",
            Self::ControlledLoadRate => "CL Rate (c/kWh)",
            Self::ControlledLoadSupply => "CL Supply (c/day)",
            Self::PeakShare => "Peak %",
            Self::OffPeakShare => "Off-Peak %",
            Self::UsageCost => "Usage Cost/day (c)",
            Self::SolarCredit => "Solar Credit/day (c)",
            Self::ControlledLoadCost => "CL Cost/day (c)",
            Self::NetPerDay => "Net Cost/day (c)",
            Self::NetPerMonth => "Net Cost/month ($)",
        }
    }
}

fn cell(column: CalculatorColumn, row: usize) -> String {
    format!("{}{row}", column.letter())
}

/// Nested `IF` chain resolving the selected profile to its peak share.
#[must_use]
pub fn profile_peak_share() -> String {
    share_formula(UsageProfile::peak_share)
}

#[must_use]
pub fn profile_off_peak_share() -> String {
    share_formula(UsageProfile::off_peak_share)
}

fn share_formula(share: fn(UsageProfile) -> f64) -> String {
    let mut formula = "0.5".to_owned();
    for profile in UsageProfile::ALL.iter().rev() {
        formula = format!(
            "IF({USAGE_PROFILE_CELL}=\"{}\",{},{formula})",
            profile.display_name(),
            share(*profile),
        );
    }
    format!("={formula}")
}

#[must_use]
pub fn usage_cost(row: usize, is_time_of_use: bool) -> String {
    if is_time_of_use {
        format!(
            "={DAILY_USAGE_CELL}*({}*{}+{}*{})",
            cell(CalculatorColumn::PeakShare, row),
            cell(CalculatorColumn::PeakRate, row),
            cell(CalculatorColumn::OffPeakShare, row),
            cell(CalculatorColumn::OffPeakRate, row),
        )
    } else {
        format!("={DAILY_USAGE_CELL}*{}", cell(CalculatorColumn::UsageRate, row))
    }
}

/// Tiered credit: the first band is capped, the remainder band absorbs the rest.
/// An uncapped first band degenerates to a flat credit.
#[must_use]
pub fn solar_credit(row: usize, first_cap: Option<KilowattHours>) -> String {
    let first = cell(CalculatorColumn::FeedInFirstTier, row);
    match first_cap {
        Some(cap) => format!(
            "=MIN({SOLAR_EXPORT_CELL},{cap})*{first}+MAX({SOLAR_EXPORT_CELL}-{cap},0)*{}",
            cell(CalculatorColumn::FeedInRemainder, row),
            cap = cap.0,
        ),
        None => format!("={SOLAR_EXPORT_CELL}*{first}"),
    }
}

#[must_use]
pub fn controlled_load_cost(row: usize) -> String {
    format!(
        "=IF({CONTROLLED_LOAD_TOGGLE_CELL}=\"Yes\",{CONTROLLED_LOAD_USAGE_CELL}*{}+{},0)",
        cell(CalculatorColumn::ControlledLoadRate, row),
        cell(CalculatorColumn::ControlledLoadSupply, row),
    )
}

#[must_use]
pub fn net_per_day(row: usize) -> String {
    format!(
        "={}+{}-{}+{}",
        cell(CalculatorColumn::SupplyCharge, row),
        cell(CalculatorColumn::UsageCost, row),
        cell(CalculatorColumn::SolarCredit, row),
        cell(CalculatorColumn::ControlledLoadCost, row),
    )
}

#[must_use]
pub fn net_per_month(row: usize) -> String {
    format!("={}*30.44/100", cell(CalculatorColumn::NetPerDay, row))
}
