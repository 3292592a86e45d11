//! Residential-eligibility filtering.
//!
//! The plans API returns everything offered in a postcode, including plans that
//! require special metering. The website hides those by default, and so do we.

use crate::{api::energy_made_easy::{Contract, Plan}, reference::DemandTariffRegistry};

#[derive(Clone, Copy, Debug, Default)]
pub struct EligibilityOptions {
    /// Keep plans that require a controlled load circuit.
    pub allow_controlled_load: bool,

    /// Keep plans that require a demand meter.
    pub allow_demand: bool,

    /// Skip filtering entirely.
    pub disable_filtering: bool,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FilterStats {
    pub total: usize,
    pub demand_excluded: usize,
    pub controlled_load_excluded: usize,
    pub kept: usize,
}

#[must_use]
pub fn has_demand_charge(contract: &Contract) -> bool {
    contract.tariff_periods.iter().any(|period| !period.demand_charges.is_empty())
}

#[must_use]
pub fn has_controlled_load(contract: &Contract) -> bool {
    !contract.controlled_load.is_empty()
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Exclusion {
    Demand,
    ControlledLoad,
}

fn exclusion(
    plan: &Plan,
    supply_area_id: &str,
    options: EligibilityOptions,
    registry: &DemandTariffRegistry,
) -> Option<Exclusion> {
    if options.disable_filtering {
        return None;
    }
    // A plan without a contract fails later in model construction with a
    // proper diagnostic.
    let contract = plan.plan_data.contracts.first()?;
    let demand_flagged = has_demand_charge(contract)
        || registry.is_demand_tariff(supply_area_id, &plan.plan_data.tariff_type);
    if demand_flagged && !options.allow_demand {
        return Some(Exclusion::Demand);
    }
    if has_controlled_load(contract) && !options.allow_controlled_load {
        return Some(Exclusion::ControlledLoad);
    }
    None
}

/// Decide whether a standard residential customer can use the plan.
/// Pure over the plan attributes, the options, and the injected registry.
#[must_use]
pub fn is_eligible(
    plan: &Plan,
    supply_area_id: &str,
    options: EligibilityOptions,
    registry: &DemandTariffRegistry,
) -> bool {
    exclusion(plan, supply_area_id, options, registry).is_none()
}

/// Filter a fetched batch, keeping counts of what was dropped and why.
#[must_use]
pub fn filter_plans(
    plans: Vec<Plan>,
    supply_area_id: &str,
    options: EligibilityOptions,
    registry: &DemandTariffRegistry,
) -> (Vec<Plan>, FilterStats) {
    let mut stats = FilterStats { total: plans.len(), ..FilterStats::default() };
    let mut kept = Vec::with_capacity(plans.len());
    for plan in plans {
        match exclusion(&plan, supply_area_id, options, registry) {
            None => kept.push(plan),
            Some(Exclusion::Demand) => stats.demand_excluded += 1,
            Some(Exclusion::ControlledLoad) => stats.controlled_load_excluded += 1,
        }
    }
    stats.kept = kept.len();
    (kept, stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(value: serde_json::Value) -> Plan {
        serde_json::from_value(value).unwrap()
    }

    fn demand_plan() -> Plan {
        plan(serde_json::json!({
            "planData": {
                "planId": "D1",
                "tariffType": "SR",
                "contract": [{"tariffPeriod": [{"demandCharge": [{"amount": 10.0}]}]}],
            },
        }))
    }

    fn controlled_load_plan() -> Plan {
        plan(serde_json::json!({
            "planData": {
                "planId": "CL1",
                "contract": [{"controlledLoad": [{"singleRate": {"rates": [{"unitPrice": 18.0}]}}]}],
            },
        }))
    }

    #[test]
    fn test_demand_plan_is_excluded_by_default() {
        let registry = DemandTariffRegistry::default();
        assert!(!is_eligible(&demand_plan(), "4", EligibilityOptions::default(), &registry));
        assert!(is_eligible(
            &demand_plan(),
            "4",
            EligibilityOptions { allow_demand: true, ..EligibilityOptions::default() },
            &registry,
        ));
        assert!(is_eligible(
            &demand_plan(),
            "4",
            EligibilityOptions { disable_filtering: true, ..EligibilityOptions::default() },
            &registry,
        ));
    }

    #[test]
    fn test_demand_tariff_code_is_excluded() {
        let registry = DemandTariffRegistry::default();
        let plan = plan(serde_json::json!({
            "planData": {"planId": "D2", "tariffType": "EA305", "contract": [{"tariffPeriod": [{}]}]},
        }));
        assert!(!is_eligible(&plan, "4", EligibilityOptions::default(), &registry));
        // The same code is not a demand tariff in another supply area.
        assert!(is_eligible(&plan, "13", EligibilityOptions::default(), &registry));
    }

    #[test]
    fn test_controlled_load_plan_needs_the_flag() {
        let registry = DemandTariffRegistry::default();
        assert!(!is_eligible(
            &controlled_load_plan(),
            "4",
            EligibilityOptions::default(),
            &registry,
        ));
        assert!(is_eligible(
            &controlled_load_plan(),
            "4",
            EligibilityOptions { allow_controlled_load: true, ..EligibilityOptions::default() },
            &registry,
        ));
    }

    #[test]
    fn test_filter_keeps_counts() {
        let registry = DemandTariffRegistry::default();
        let plain = plan(serde_json::json!({
            "planData": {"planId": "P1", "contract": [{"tariffPeriod": [{}]}]},
        }));
        let (kept, stats) = filter_plans(
            vec![plain, demand_plan(), controlled_load_plan()],
            "4",
            EligibilityOptions::default(),
            &registry,
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(
            stats,
            FilterStats { total: 3, demand_excluded: 1, controlled_load_excluded: 1, kept: 1 },
        );
    }
}
