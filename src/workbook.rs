//! The workbook model: sheets of typed cells, built from the projections, with
//! the calculator sheet carrying live formulas instead of precomputed numbers.

pub mod formula;
pub mod writer;

use chrono::{DateTime, Local};
use enumset::EnumSet;
use itertools::Itertools;

use crate::{
    api::{CustomerType, Fuel},
    core::{
        classifier::PricingModel,
        compared::ComparedPlan,
        projection::{Projection, Sheet, project},
        rate_model::RateKind,
        scenario::UsageScenario,
    },
    reference::UsageProfile,
    workbook::formula::CalculatorColumn,
};

#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Integer(i64),
    Number(f64),
    Link(String),
    Formula(String),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(text) => text.clone(),
            Self::Integer(value) => value.to_string(),
            Self::Number(value) => format!("{value:.2}"),
            Self::Link(url) | Self::Formula(url) => url.clone(),
        }
    }
}

#[derive(Debug)]
pub struct SheetData {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug)]
pub struct Workbook {
    pub sheets: Vec<SheetData>,
}

pub struct RunMetadata {
    pub postcode: String,
    pub fuel: Fuel,
    pub customer_type: CustomerType,
    pub supply_areas: String,
    pub generated_at: DateTime<Local>,
}

/// Assemble the workbook: the summary sheet first, then the requested
/// projections. Empty projections are skipped like the website skips empty
/// categories.
#[must_use]
pub fn build(
    metadata: &RunMetadata,
    plans: &[ComparedPlan],
    sheets: EnumSet<Sheet>,
    scenario: &UsageScenario,
    profile: UsageProfile,
) -> Workbook {
    let mut workbook = Workbook { sheets: vec![summary_sheet(metadata, plans)] };
    for sheet in sheets {
        let projection = project(plans, sheet);
        if projection.rows.is_empty() && sheet != Sheet::AllPlans {
            continue;
        }
        let data = match sheet {
            Sheet::PlanCalculator => calculator_sheet(&projection, scenario, profile),
            _ => plans_sheet(sheet, &projection),
        };
        workbook.sheets.push(data);
    }
    workbook
}

fn summary_sheet(metadata: &RunMetadata, plans: &[ComparedPlan]) -> SheetData {
    let mut rows = vec![
        vec![Cell::text("Energy Made Easy - Plan Comparison")],
        vec![Cell::Empty],
        vec![Cell::text("Postcode:"), Cell::text(&metadata.postcode)],
        vec![Cell::text("Fuel Type:"), Cell::text(metadata.fuel.to_string())],
        vec![Cell::text("Customer Type:"), Cell::text(metadata.customer_type.to_string())],
        vec![Cell::text("Supply Area:"), Cell::text(&metadata.supply_areas)],
        vec![Cell::text("Total Plans:"), Cell::Integer(plans.len() as i64)],
        vec![
            Cell::text("Generated At:"),
            Cell::text(metadata.generated_at.format("%Y-%m-%d %H:%M:%S").to_string()),
        ],
        vec![Cell::text("Source:"), Cell::Link("https://www.energymadeeasy.gov.au/".to_owned())],
        vec![Cell::Empty],
        vec![Cell::text("Plans by Retailer")],
        vec![Cell::text("Retailer"), Cell::text("Number of Plans")],
    ];
    for (retailer, count) in
        plans.iter().map(|plan| plan.retailer.as_str()).counts().into_iter().sorted()
    {
        rows.push(vec![Cell::text(retailer), Cell::Integer(count as i64)]);
    }

    let area_counts =
        plans.iter().map(|plan| plan.supply_area.as_str()).counts().into_iter().sorted().collect_vec();
    if area_counts.len() > 1 {
        rows.push(vec![Cell::Empty]);
        rows.push(vec![Cell::text("Plans by Supply Area")]);
        rows.push(vec![Cell::text("Supply Area"), Cell::text("Number of Plans")]);
        for (area, count) in area_counts {
            rows.push(vec![Cell::text(area), Cell::Integer(count as i64)]);
        }
    }

    SheetData { name: "Summary".to_owned(), rows }
}

const PLANS_SHEET_COLUMNS: [&str; 30] = [
    "Plan ID",
    "Plan Name",
    "Retailer",
    "Supply Area",
    "Plan URL",
    "Tariff Type",
    "Pricing Model",
    "Contract Term",
    "Benefit Period",
    "Supply Charge (c/day)",
    "Usage Rate Min (c/kWh)",
    "Usage Rate Max (c/kWh)",
    "Peak Rate (c/kWh)",
    "Off-Peak Rate (c/kWh)",
    "Solar FIT Min (c/kWh)",
    "Solar FIT Max (c/kWh)",
    "Solar FIT Details",
    "Controlled Load",
    "CL Rate (c/kWh)",
    "CL Supply (c/day)",
    "Discounts",
    "Fees",
    "Payment Options",
    "Meter Types",
    "Est. Cost/Year (Low Usage)",
    "Est. Cost/Year (Medium Usage)",
    "Est. Cost/Year (High Usage)",
    "Est. Cost/Year (Low, No Disc.)",
    "Est. Cost/Year (Medium, No Disc.)",
    "Est. Cost/Year (High, No Disc.)",
];

fn plans_sheet(sheet: Sheet, projection: &Projection<'_>) -> SheetData {
    let mut rows = Vec::with_capacity(projection.rows.len() + 1);
    rows.push(PLANS_SHEET_COLUMNS.iter().copied().map(Cell::text).collect_vec());
    for plan in &projection.rows {
        rows.push(plan_row(plan));
    }
    SheetData { name: sheet.to_string(), rows }
}

fn plan_row(plan: &ComparedPlan) -> Vec<Cell> {
    let model = &plan.rate_model;
    let is_time_of_use = plan.classification.pricing_model == PricingModel::TimeOfUse;
    let optional_rate = |rate: Option<crate::quantity::rate::CentsPerKilowattHour>| {
        rate.map_or(Cell::Empty, |rate| Cell::Number(rate.0))
    };
    let benchmark = |value: Option<crate::quantity::cost::Dollars>| {
        value.map_or(Cell::Empty, |value| Cell::Number(value.0))
    };
    vec![
        Cell::text(&plan.plan_id),
        Cell::text(&plan.plan_name),
        Cell::text(&plan.retailer),
        Cell::text(&plan.supply_area),
        Cell::Link(plan.plan_url.clone()),
        Cell::text(plan.classification.label()),
        Cell::text(plan.classification.pricing_model.to_string()),
        Cell::text(&plan.contract_term),
        Cell::text(&plan.benefit_period),
        Cell::Number(model.supply_charge.0),
        optional_rate(plan.usage_rate_min),
        optional_rate(plan.usage_rate_max),
        optional_rate(is_time_of_use.then(|| model.rate(RateKind::Peak)).flatten()),
        optional_rate(is_time_of_use.then(|| model.rate(RateKind::OffPeak)).flatten()),
        Cell::Number(model.min_feed_in_rate().0),
        Cell::Number(model.max_feed_in_rate().0),
        Cell::text(&plan.solar_fit_details),
        Cell::text(&plan.controlled_load_details),
        Cell::Number(model.rate(RateKind::ControlledLoad).map_or(0.0, |rate| rate.0)),
        Cell::Number(model.controlled_load_supply.0),
        Cell::text(&plan.discounts),
        Cell::text(&plan.fees),
        Cell::text(&plan.payment_options),
        Cell::text(&plan.meter_types),
        benchmark(plan.benchmarks.small),
        benchmark(plan.benchmarks.medium),
        benchmark(plan.benchmarks.large),
        benchmark(plan.benchmarks.small_no_discounts),
        benchmark(plan.benchmarks.medium_no_discounts),
        benchmark(plan.benchmarks.large_no_discounts),
    ]
}

fn calculator_sheet(
    projection: &Projection<'_>,
    scenario: &UsageScenario,
    profile: UsageProfile,
) -> SheetData {
    let mut rows: Vec<Vec<Cell>> = vec![
        vec![Cell::text("Plan Calculator")],
        vec![Cell::text("Enter your estimated usage below. All costs update automatically.")],
        vec![Cell::Empty],
        vec![
            Cell::text("Daily Usage (kWh):"),
            Cell::Number(scenario.daily_usage.0),
            Cell::text("Your estimated daily electricity consumption"),
        ],
        vec![
            Cell::text("Daily Solar Export (kWh):"),
            Cell::Number(scenario.daily_solar_export.0),
            Cell::text("How much solar you expect to export back to the grid per day"),
        ],
        vec![
            Cell::text("Usage Profile (TOU plans):"),
            Cell::text(profile.display_name()),
            Cell::text("Controls the peak/off-peak split for time-of-use plans"),
        ],
        vec![
            Cell::text("Controlled Load:"),
            Cell::text(if scenario.controlled_load.is_some() { "Yes" } else { "No" }),
            Cell::text("Select Yes if you have a controlled load circuit (hot water, pool pump)"),
        ],
        vec![
            Cell::text("Controlled Load Usage (kWh/day):"),
            Cell::Number(scenario.controlled_load.map_or(8.0, |load| load.0)),
            Cell::text("Daily kWh on your controlled load circuit, only used when Controlled Load = Yes"),
        ],
        vec![Cell::Empty],
        vec![Cell::text("Profile Reference:")],
    ];
    for profile in UsageProfile::ALL {
        rows.push(vec![
            Cell::text(profile.display_name()),
            Cell::text(format!(
                "Peak {:.0}% / Off-Peak {:.0}%",
                profile.peak_share() * 100.0,
                profile.off_peak_share() * 100.0,
            )),
            Cell::text(profile.description()),
        ]);
    }
    rows.push(vec![Cell::Empty]);
    rows.push(CalculatorColumn::ALL.iter().map(|column| Cell::text(column.title())).collect());

    for plan in &projection.rows {
        let row_number = rows.len() + 1;
        rows.push(calculator_row(plan, row_number));
    }

    SheetData { name: Sheet::PlanCalculator.to_string(), rows }
}

fn calculator_row(plan: &ComparedPlan, row: usize) -> Vec<Cell> {
    let model = &plan.rate_model;
    let is_time_of_use = plan.classification.pricing_model == PricingModel::TimeOfUse;
    let first_tier = model.feed_in_tiers.first();
    let remainder_rate = model.feed_in_tiers.get(1).map_or(0.0, |tier| tier.rate.0);

    let (peak_share, off_peak_share) = if is_time_of_use {
        (
            Cell::Formula(formula::profile_peak_share()),
            Cell::Formula(formula::profile_off_peak_share()),
        )
    } else {
        // Single-rate plans take all usage at the one rate.
        (Cell::Number(1.0), Cell::Number(0.0))
    };

    vec![
        Cell::text(&plan.plan_name),
        Cell::text(&plan.retailer),
        Cell::text(plan.classification.label()),
        Cell::Link(plan.plan_url.clone()),
        Cell::Number(model.supply_charge.0),
        if is_time_of_use {
            Cell::Empty
        } else {
            Cell::Number(model.rate(RateKind::Flat).map_or(0.0, |rate| rate.0))
        },
        if is_time_of_use {
            Cell::Number(model.rate(RateKind::Peak).map_or(0.0, |rate| rate.0))
        } else {
            Cell::Empty
        },
        if is_time_of_use {
            Cell::Number(model.rate(RateKind::OffPeak).map_or(0.0, |rate| rate.0))
        } else {
            Cell::Empty
        },
        Cell::Number(first_tier.map_or(0.0, |tier| tier.rate.0)),
        Cell::Number(remainder_rate),
        Cell::text(&plan.solar_fit_details),
        Cell::Number(model.rate(RateKind::ControlledLoad).map_or(0.0, |rate| rate.0)),
        Cell::Number(model.controlled_load_supply.0),
        peak_share,
        off_peak_share,
        Cell::Formula(formula::usage_cost(row, is_time_of_use)),
        Cell::Formula(formula::solar_credit(row, first_tier.and_then(|tier| tier.cap))),
        Cell::Formula(formula::controlled_load_cost(row)),
        Cell::Formula(formula::net_per_day(row)),
        Cell::Formula(formula::net_per_month(row)),
    ]
}
