//! Pure projections of the annotated plan set into the output sheets.

use std::{
    cmp::Reverse,
    fmt::{Display, Formatter},
};

use crate::{
    core::{classifier::PricingModel, compared::ComparedPlan},
    quantity::rate::CentsPerKilowattHour,
};

/// The cheapest-plans sheet keeps only the best offers.
pub const CHEAPEST_PLANS_CAP: usize = 50;

#[derive(Debug, clap::ValueEnum, enumset::EnumSetType)]
pub enum Sheet {
    AllPlans,
    SingleRate,
    TimeOfUse,
    BestSolarFit,
    CheapestPlans,
    PlanCalculator,
}

impl Display for Sheet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AllPlans => write!(f, "All Plans"),
            Self::SingleRate => write!(f, "Single Rate Plans"),
            Self::TimeOfUse => write!(f, "Time of Use Plans"),
            Self::BestSolarFit => write!(f, "Best Solar FIT"),
            Self::CheapestPlans => write!(f, "Cheapest Plans"),
            Self::PlanCalculator => write!(f, "Plan Calculator"),
        }
    }
}

/// The initial ordering of a sheet. The workbook viewer may re-sort
/// interactively, this only sets the starting point.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SortDirective {
    SourceOrder,
    MaxFeedInDescending,
    BenchmarkAscending,
    SupplyChargeAscending,
}

pub struct Projection<'a> {
    pub rows: Vec<&'a ComparedPlan>,
    pub sort: SortDirective,
}

/// Project the plan set onto one sheet. Pure and idempotent; sorts are stable,
/// so ties keep their source order.
#[must_use]
pub fn project(plans: &[ComparedPlan], sheet: Sheet) -> Projection<'_> {
    match sheet {
        Sheet::AllPlans => {
            Projection { rows: plans.iter().collect(), sort: SortDirective::SourceOrder }
        }
        Sheet::SingleRate => Projection {
            rows: by_pricing_model(plans, PricingModel::SingleRate),
            sort: SortDirective::SourceOrder,
        },
        Sheet::TimeOfUse => Projection {
            rows: by_pricing_model(plans, PricingModel::TimeOfUse),
            sort: SortDirective::SourceOrder,
        },
        Sheet::BestSolarFit => {
            let mut rows: Vec<&ComparedPlan> = plans
                .iter()
                .filter(|plan| plan.rate_model.max_feed_in_rate() > CentsPerKilowattHour::ZERO)
                .collect();
            rows.sort_by_key(|plan| Reverse(plan.rate_model.max_feed_in_rate()));
            Projection { rows, sort: SortDirective::MaxFeedInDescending }
        }
        Sheet::CheapestPlans => {
            let mut rows: Vec<&ComparedPlan> =
                plans.iter().filter(|plan| plan.benchmarks.medium.is_some()).collect();
            rows.sort_by_key(|plan| plan.benchmarks.medium);
            rows.truncate(CHEAPEST_PLANS_CAP);
            Projection { rows, sort: SortDirective::BenchmarkAscending }
        }
        Sheet::PlanCalculator => {
            let mut rows: Vec<&ComparedPlan> = plans.iter().collect();
            rows.sort_by_key(|plan| plan.rate_model.supply_charge);
            Projection { rows, sort: SortDirective::SupplyChargeAscending }
        }
    }
}

fn by_pricing_model(plans: &[ComparedPlan], pricing_model: PricingModel) -> Vec<&ComparedPlan> {
    plans.iter().filter(|plan| plan.classification.pricing_model == pricing_model).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::rate_model::FeedInTier,
        quantity::{cost::Dollars, energy::KilowattHours},
    };

    fn with_feed_in(name: &str, rate: f64) -> ComparedPlan {
        let mut plan = ComparedPlan::fixture(name);
        plan.rate_model.feed_in_tiers =
            vec![FeedInTier { cap: None, rate: CentsPerKilowattHour(rate) }];
        plan
    }

    fn with_benchmark(name: &str, medium: f64) -> ComparedPlan {
        let mut plan = ComparedPlan::fixture(name);
        plan.benchmarks.medium = Some(Dollars(medium));
        plan
    }

    #[test]
    fn test_all_plans_keeps_source_order() {
        let plans = vec![ComparedPlan::fixture("b"), ComparedPlan::fixture("a")];
        let projection = project(&plans, Sheet::AllPlans);
        assert_eq!(projection.sort, SortDirective::SourceOrder);
        let names: Vec<&str> =
            projection.rows.iter().map(|plan| plan.plan_name.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
    }

    #[test]
    fn test_best_solar_fit_sorts_descending_and_drops_zero() {
        let plans = vec![
            with_feed_in("low", 3.0),
            ComparedPlan::fixture("none"),
            with_feed_in("high", 12.0),
        ];
        let projection = project(&plans, Sheet::BestSolarFit);
        let names: Vec<&str> =
            projection.rows.iter().map(|plan| plan.plan_name.as_str()).collect();
        assert_eq!(names, ["high", "low"]);
    }

    #[test]
    fn test_best_solar_fit_ties_keep_source_order() {
        let plans = vec![
            with_feed_in("first", 5.0),
            with_feed_in("second", 5.0),
            with_feed_in("third", 5.0),
        ];
        let projection = project(&plans, Sheet::BestSolarFit);
        let names: Vec<&str> =
            projection.rows.iter().map(|plan| plan.plan_name.as_str()).collect();
        assert_eq!(names, ["first", "second", "third"]);
    }

    #[test]
    fn test_cheapest_plans_is_capped_and_ascending() {
        // 120 plans, priced in reverse so the sort has to work for it.
        let plans: Vec<ComparedPlan> = (0..120)
            .map(|index| with_benchmark(&format!("plan-{index}"), f64::from(2000 - index)))
            .collect();
        let projection = project(&plans, Sheet::CheapestPlans);
        assert_eq!(projection.rows.len(), CHEAPEST_PLANS_CAP);
        assert_eq!(projection.rows[0].benchmarks.medium, Some(Dollars(1881.0)));
        assert!(
            projection
                .rows
                .iter()
                .is_sorted_by_key(|plan| plan.benchmarks.medium),
        );
    }

    #[test]
    fn test_cheapest_plans_drops_missing_benchmarks() {
        let plans = vec![ComparedPlan::fixture("no-benchmark"), with_benchmark("priced", 1500.0)];
        let projection = project(&plans, Sheet::CheapestPlans);
        assert_eq!(projection.rows.len(), 1);
        assert_eq!(projection.rows[0].plan_name, "priced");
    }

    #[test]
    fn test_calculator_sorts_by_supply_charge() {
        let mut cheap_supply = ComparedPlan::fixture("cheap-supply");
        cheap_supply.rate_model.supply_charge = crate::quantity::cost::Cents(50.0);
        let plans = vec![ComparedPlan::fixture("expensive-supply"), cheap_supply];
        let projection = project(&plans, Sheet::PlanCalculator);
        assert_eq!(projection.sort, SortDirective::SupplyChargeAscending);
        assert_eq!(projection.rows[0].plan_name, "cheap-supply");
    }

    #[test]
    fn test_projection_is_idempotent() {
        let plans = vec![with_feed_in("a", 5.0), with_feed_in("b", 7.0)];
        let first: Vec<String> = project(&plans, Sheet::BestSolarFit)
            .rows
            .iter()
            .map(|plan| plan.plan_name.clone())
            .collect();
        let second: Vec<String> = project(&plans, Sheet::BestSolarFit)
            .rows
            .iter()
            .map(|plan| plan.plan_name.clone())
            .collect();
        assert_eq!(first, second);
    }
}
