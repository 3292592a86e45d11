//! A plan annotated with everything the workbook and the summary tables need.

use itertools::Itertools;

use crate::{
    api::energy_made_easy::{Contract, Plan},
    core::{
        calculator::{ComputedCost, compute_cost},
        classifier::{Classification, classify},
        error::CoreError,
        rate_model::{GST_MULTIPLIER, RateKind, RateModel},
        scenario::UsageScenario,
    },
    quantity::{cost::Dollars, rate::CentsPerKilowattHour},
};

#[derive(Clone, Debug)]
pub struct ComparedPlan {
    pub plan_id: String,
    pub plan_name: String,
    pub retailer: String,
    pub supply_area: String,
    pub plan_url: String,

    pub classification: Classification,
    pub contract_term: String,
    pub benefit_period: String,

    pub rate_model: RateModel,

    /// Lowest and highest usage rate across all blocks, for the spread columns.
    pub usage_rate_min: Option<CentsPerKilowattHour>,
    pub usage_rate_max: Option<CentsPerKilowattHour>,

    pub solar_fit_details: String,
    pub controlled_load_details: String,
    pub discounts: String,
    pub fees: String,
    pub payment_options: String,
    pub meter_types: String,

    pub benchmarks: YearlyBenchmarks,
    pub cost: ComputedCost,
}

/// Yearly benchmark estimates from the plan comparison reference, in dollars.
#[derive(Clone, Copy, Debug, Default)]
pub struct YearlyBenchmarks {
    pub small: Option<Dollars>,
    pub medium: Option<Dollars>,
    pub large: Option<Dollars>,
    pub small_no_discounts: Option<Dollars>,
    pub medium_no_discounts: Option<Dollars>,
    pub large_no_discounts: Option<Dollars>,
}

impl ComparedPlan {
    pub fn try_new(
        plan: &Plan,
        postcode: &str,
        supply_area: &str,
        scenario: &UsageScenario,
    ) -> Result<Self, CoreError> {
        let data = &plan.plan_data;
        let contract =
            data.contracts.first().ok_or(CoreError::MalformedPlanData { field: "contract" })?;
        let rate_model = RateModel::try_from_contract(contract)?;
        let cost = compute_cost(&rate_model, scenario)?;
        let (usage_rate_min, usage_rate_max) = usage_rate_bounds(&rate_model);

        Ok(Self {
            plan_id: data.plan_id.clone(),
            plan_name: data.plan_name.clone(),
            retailer: data.retailer_name.clone(),
            supply_area: supply_area.to_owned(),
            plan_url: plan_url(&data.plan_id, postcode),
            classification: classify(&rate_model),
            contract_term: contract_term(contract),
            benefit_period: benefit_period(contract),
            usage_rate_min,
            usage_rate_max,
            solar_fit_details: solar_fit_details(&rate_model),
            controlled_load_details: controlled_load_details(contract),
            discounts: discounts(contract),
            fees: fees(contract),
            payment_options: payment_options(contract),
            meter_types: meter_types(contract),
            benchmarks: benchmarks(plan),
            rate_model,
            cost,
        })
    }
}

fn plan_url(plan_id: &str, postcode: &str) -> String {
    format!(
        "https://www.energymadeeasy.gov.au/plan?id={plan_id}&postcode={postcode}\
         &pricingPeriod=yearly&withDiscounts=true&benchmarkUsage=medium"
    )
}

fn usage_rate_bounds(
    model: &RateModel,
) -> (Option<CentsPerKilowattHour>, Option<CentsPerKilowattHour>) {
    let rates = model
        .usage_rates
        .iter()
        .filter(|(kind, _)| *kind != RateKind::ControlledLoad)
        .map(|(_, rate)| *rate);
    rates.minmax().into_option().map_or((None, None), |(min, max)| (Some(min), Some(max)))
}

/// For example: `10.00c/kWh (first 8kWh/day); 3.00c/kWh`.
fn solar_fit_details(model: &RateModel) -> String {
    if model.feed_in_tiers.is_empty() {
        return "No solar feed-in tariff".to_owned();
    }
    model
        .feed_in_tiers
        .iter()
        .map(|tier| match tier.cap {
            Some(cap) => format!("{:.2}c/kWh (first {}kWh/day)", tier.rate.0, cap.0),
            None => format!("{:.2}c/kWh", tier.rate.0),
        })
        .join("; ")
}

fn controlled_load_details(contract: &Contract) -> String {
    if contract.controlled_load.is_empty() {
        return "N/A".to_owned();
    }
    contract
        .controlled_load
        .iter()
        .map(|load| {
            let single_rate = &load.single_rate;
            let name = if single_rate.display_name.is_empty() {
                "Controlled Load"
            } else {
                single_rate.display_name.as_str()
            };
            let rates = single_rate
                .rates
                .iter()
                .map(|rate| format!("{:.2}c/kWh", rate.unit_price * GST_MULTIPLIER))
                .join(", ");
            match single_rate.daily_supply_charge {
                Some(charge) if charge > 0.0 => {
                    format!("{name}: {rates} + {:.2}c/day supply", charge * GST_MULTIPLIER)
                }
                _ => format!("{name}: {rates}"),
            }
        })
        .join("; ")
}

fn discounts(contract: &Contract) -> String {
    if contract.discounts.is_empty() {
        return "None".to_owned();
    }
    contract
        .discounts
        .iter()
        .map(|discount| {
            let name = if discount.name.is_empty() { "Discount" } else { discount.name.as_str() };
            match (discount.percent, discount.amount) {
                (Some(percent), _) => format!("{name} ({percent}%)"),
                (None, Some(amount)) => format!("{name} (${amount})"),
                (None, None) => name.to_owned(),
            }
        })
        .join("; ")
}

fn fees(contract: &Contract) -> String {
    if contract.fees.is_empty() {
        return "None".to_owned();
    }
    contract
        .fees
        .iter()
        .map(|fee| format!("{}: ${:.2}", fee_type_name(&fee.fee_type), fee.amount))
        .join("; ")
}

fn fee_type_name(code: &str) -> &str {
    match code {
        "ConnF" => "Connection Fee",
        "DiscoF" => "Disconnection Fee",
        "DiscoFMO" => "Disconnection Fee (Move Out)",
        "DiscoFNP" => "Disconnection Fee (Non-Payment)",
        "ChDF" => "Charge Dispute Fee",
        "DDF" => "Dishonoured Direct Debit Fee",
        "LPF" => "Late Payment Fee",
        "PBF" => "Paper Bill Fee",
        "CCF" => "Credit Card Fee",
        "PPF" => "Payment Processing Fee",
        "RecoF" => "Reconnection Fee",
        "MBSF" => "Membership Fee",
        "OF" => "Other Fee",
        "" => "Unknown",
        other => other,
    }
}

fn payment_options(contract: &Contract) -> String {
    if contract.payment_options.is_empty() {
        return "N/A".to_owned();
    }
    contract
        .payment_options
        .iter()
        .map(|option| match option.as_str() {
            "P" => "Post/Mail",
            "DD" => "Direct Debit",
            "CC" => "Credit Card",
            "BP" => "BPay",
            "CP" => "Centrepay",
            other => other,
        })
        .join(", ")
}

fn meter_types(contract: &Contract) -> String {
    if contract.meter_types.is_empty() {
        return "N/A".to_owned();
    }
    contract
        .meter_types
        .iter()
        .map(|meter| match meter.as_str() {
            "Type 6" => "Basic Meter",
            "Type 4" => "Smart Meter",
            "Type 4a" => "Smart Meter (4a)",
            "Type 1" => "Interval Meter",
            other => other,
        })
        .unique()
        .join(", ")
}

fn contract_term(contract: &Contract) -> String {
    match contract.term_type.as_str() {
        "E" => "No lock-in".to_owned(),
        "1" => "1 year".to_owned(),
        "2" => "2 years".to_owned(),
        "3" => "3 years".to_owned(),
        "" => "N/A".to_owned(),
        other => other.to_owned(),
    }
}

fn benefit_period(contract: &Contract) -> String {
    if contract.benefit_period.is_empty() {
        "N/A".to_owned()
    } else {
        contract.benefit_period.clone()
    }
}

fn benchmarks(plan: &Plan) -> YearlyBenchmarks {
    let Some(reference) = &plan.pcr else {
        return YearlyBenchmarks::default();
    };
    let costs = if plan.plan_data.fuel_type == "G" {
        &reference.costs.gas
    } else {
        &reference.costs.electricity
    };
    let Some(costs) = costs else {
        return YearlyBenchmarks::default();
    };
    let yearly = |benchmark: &Option<crate::api::energy_made_easy::Benchmark>| {
        benchmark.as_ref().and_then(|benchmark| benchmark.yearly.clone())
    };
    let (small, medium, large) = (yearly(&costs.small), yearly(&costs.medium), yearly(&costs.large));
    YearlyBenchmarks {
        small: small.as_ref().and_then(|y| y.all_discounts.map(Dollars)),
        medium: medium.as_ref().and_then(|y| y.all_discounts.map(Dollars)),
        large: large.as_ref().and_then(|y| y.all_discounts.map(Dollars)),
        small_no_discounts: small.as_ref().and_then(|y| y.no_discounts.map(Dollars)),
        medium_no_discounts: medium.as_ref().and_then(|y| y.no_discounts.map(Dollars)),
        large_no_discounts: large.as_ref().and_then(|y| y.no_discounts.map(Dollars)),
    }
}

#[cfg(test)]
impl ComparedPlan {
    /// Minimal fixture for projection and workbook tests.
    pub(crate) fn fixture(name: &str) -> Self {
        use crate::{
            core::{
                classifier::PricingModel,
                rate_model::RateKind,
            },
            quantity::{cost::Cents, energy::KilowattHours},
        };

        let rate_model = RateModel {
            supply_charge: Cents(99.0),
            usage_rates: vec![(RateKind::Flat, CentsPerKilowattHour(27.5))],
            feed_in_tiers: Vec::new(),
            controlled_load_supply: Cents::ZERO,
        };
        let scenario = UsageScenario::builder()
            .daily_usage(KilowattHours(20.0))
            .daily_solar_export(KilowattHours::ZERO)
            .build();
        let cost = compute_cost(&rate_model, &scenario).unwrap();
        Self {
            plan_id: format!("{name}-ID"),
            plan_name: name.to_owned(),
            retailer: "Test Retailer".to_owned(),
            supply_area: "Test Area".to_owned(),
            plan_url: plan_url(&format!("{name}-ID"), "2000"),
            classification: Classification {
                pricing_model: PricingModel::SingleRate,
                has_controlled_load: false,
            },
            contract_term: "No lock-in".to_owned(),
            benefit_period: "N/A".to_owned(),
            usage_rate_min: Some(CentsPerKilowattHour(27.5)),
            usage_rate_max: Some(CentsPerKilowattHour(27.5)),
            solar_fit_details: "No solar feed-in tariff".to_owned(),
            controlled_load_details: "N/A".to_owned(),
            discounts: "None".to_owned(),
            fees: "None".to_owned(),
            payment_options: "N/A".to_owned(),
            meter_types: "N/A".to_owned(),
            benchmarks: YearlyBenchmarks::default(),
            rate_model,
            cost,
        }
    }
}
