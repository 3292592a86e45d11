//! Deterministic daily and monthly cost of a plan under a usage scenario.

use crate::{
    core::{
        error::CoreError,
        rate_model::{FeedInTier, RateKind, RateModel},
        scenario::UsageScenario,
    },
    quantity::{
        cost::{Cents, Dollars},
        energy::KilowattHours,
        rate::CentsPerKilowattHour,
    },
};

/// Average days per month, used for the monthly projection.
pub const DAYS_PER_MONTH: f64 = 30.44;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ComputedCost {
    pub supply_charge: Cents,
    pub usage_cost: Cents,
    pub controlled_load_cost: Cents,
    pub solar_credit: Cents,

    /// May be negative (a net credit), never clamped.
    pub net_per_day: Cents,

    pub net_per_month: Dollars,
}

/// Price the scenario against the rate model. Pure: the same inputs always
/// produce bit-identical output, which is what lets the workbook re-derive the
/// numbers from its own input cells.
pub fn compute_cost(model: &RateModel, scenario: &UsageScenario) -> Result<ComputedCost, CoreError> {
    scenario.validate()?;

    let usage_cost = scenario.daily_usage * blended_rate(model, scenario);
    let controlled_load_cost =
        match (scenario.controlled_load, model.rate(RateKind::ControlledLoad)) {
            (Some(load), Some(rate)) => load * rate + model.controlled_load_supply,
            _ => Cents::ZERO,
        };
    let solar_credit = solar_credit(&model.feed_in_tiers, scenario.daily_solar_export);
    let net_per_day = model.supply_charge + usage_cost + controlled_load_cost - solar_credit;

    Ok(ComputedCost {
        supply_charge: model.supply_charge,
        usage_cost,
        controlled_load_cost,
        solar_credit,
        net_per_day,
        net_per_month: (net_per_day * DAYS_PER_MONTH).to_dollars(),
    })
}

/// The effective usage rate: the flat rate for single-rate plans, otherwise the
/// share-weighted mix of the time-of-use rates.
fn blended_rate(model: &RateModel, scenario: &UsageScenario) -> CentsPerKilowattHour {
    model.rate(RateKind::Flat).map_or_else(
        || {
            let peak = model
                .rate(RateKind::Peak)
                .map_or(CentsPerKilowattHour::ZERO, |rate| rate * scenario.peak_share);
            let off_peak = model
                .rate(RateKind::OffPeak)
                .map_or(CentsPerKilowattHour::ZERO, |rate| rate * scenario.off_peak_share);
            let shoulder = model
                .rate(RateKind::Shoulder)
                .map_or(CentsPerKilowattHour::ZERO, |rate| rate * scenario.shoulder_share());
            peak + off_peak + shoulder
        },
        |flat| flat,
    )
}

/// Walk the feed-in bands from the cheapest cap upwards, crediting each band
/// for the export it absorbs, as a fold over `(remaining, prior cap, credit)`.
#[must_use]
pub fn solar_credit(tiers: &[FeedInTier], export: KilowattHours) -> Cents {
    let (_, _, credit) = tiers.iter().fold(
        (export, KilowattHours::ZERO, Cents::ZERO),
        |(remaining, prior_cap, credit), tier| {
            if remaining <= KilowattHours::ZERO {
                return (remaining, prior_cap, credit);
            }
            let consumed = match tier.cap {
                Some(cap) => remaining.min(cap - prior_cap),
                None => remaining,
            };
            (
                remaining - consumed,
                tier.cap.unwrap_or(prior_cap),
                credit + consumed * tier.rate,
            )
        },
    );
    credit
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn tiered() -> Vec<FeedInTier> {
        vec![
            FeedInTier { cap: Some(KilowattHours(8.0)), rate: CentsPerKilowattHour(10.0) },
            FeedInTier { cap: None, rate: CentsPerKilowattHour(3.0) },
        ]
    }

    fn single_rate_model() -> RateModel {
        RateModel {
            supply_charge: Cents(99.0),
            usage_rates: vec![(RateKind::Flat, CentsPerKilowattHour(27.5))],
            feed_in_tiers: vec![FeedInTier { cap: None, rate: CentsPerKilowattHour(5.0) }],
            controlled_load_supply: Cents::ZERO,
        }
    }

    #[test]
    fn test_tiered_credit_spills_into_the_remainder_band() {
        assert_abs_diff_eq!(solar_credit(&tiered(), KilowattHours(10.0)).0, 86.0);
    }

    #[test]
    fn test_tiered_credit_below_the_first_cap() {
        assert_abs_diff_eq!(solar_credit(&tiered(), KilowattHours(5.0)).0, 50.0);
    }

    #[test]
    fn test_tiered_credit_without_export() {
        assert_abs_diff_eq!(solar_credit(&tiered(), KilowattHours::ZERO).0, 0.0);
    }

    #[test]
    fn test_flat_tier_matches_the_general_walk() {
        let flat = vec![FeedInTier { cap: None, rate: CentsPerKilowattHour(5.0) }];
        assert_eq!(
            solar_credit(&flat, KilowattHours(12.5)),
            KilowattHours(12.5) * CentsPerKilowattHour(5.0),
        );
    }

    #[test]
    fn test_no_tiers_means_no_credit() {
        assert_eq!(solar_credit(&[], KilowattHours(10.0)), Cents::ZERO);
    }

    #[test]
    fn test_single_rate_cost() {
        let scenario = UsageScenario::builder()
            .daily_usage(KilowattHours(20.0))
            .daily_solar_export(KilowattHours(10.0))
            .build();
        let cost = compute_cost(&single_rate_model(), &scenario).unwrap();
        assert_abs_diff_eq!(cost.usage_cost.0, 550.0);
        assert_abs_diff_eq!(cost.solar_credit.0, 50.0);
        assert_abs_diff_eq!(cost.net_per_day.0, 599.0);
        assert_abs_diff_eq!(cost.net_per_month.0, 599.0 * 30.44 / 100.0);
    }

    #[test]
    fn test_time_of_use_cost_is_share_weighted() {
        let model = RateModel {
            supply_charge: Cents(100.0),
            usage_rates: vec![
                (RateKind::Peak, CentsPerKilowattHour(40.0)),
                (RateKind::OffPeak, CentsPerKilowattHour(20.0)),
            ],
            feed_in_tiers: Vec::new(),
            controlled_load_supply: Cents::ZERO,
        };
        let scenario = UsageScenario::builder()
            .daily_usage(KilowattHours(10.0))
            .daily_solar_export(KilowattHours::ZERO)
            .peak_share(0.75)
            .off_peak_share(0.25)
            .build();
        let cost = compute_cost(&model, &scenario).unwrap();
        assert_abs_diff_eq!(cost.usage_cost.0, 10.0 * (0.75 * 40.0 + 0.25 * 20.0));
    }

    #[test]
    fn test_shoulder_rate_takes_the_remaining_share() {
        let model = RateModel {
            supply_charge: Cents(100.0),
            usage_rates: vec![
                (RateKind::Peak, CentsPerKilowattHour(40.0)),
                (RateKind::OffPeak, CentsPerKilowattHour(20.0)),
                (RateKind::Shoulder, CentsPerKilowattHour(30.0)),
            ],
            feed_in_tiers: Vec::new(),
            controlled_load_supply: Cents::ZERO,
        };
        let scenario = UsageScenario::builder()
            .daily_usage(KilowattHours(10.0))
            .daily_solar_export(KilowattHours::ZERO)
            .peak_share(0.5)
            .off_peak_share(0.3)
            .build();
        let cost = compute_cost(&model, &scenario).unwrap();
        assert_abs_diff_eq!(
            cost.usage_cost.0,
            10.0 * (0.5 * 40.0 + 0.3 * 20.0 + 0.2 * 30.0),
            epsilon = 1e-9,
        );
    }

    #[test]
    fn test_controlled_load_adds_usage_and_supply() {
        let model = RateModel {
            supply_charge: Cents(99.0),
            usage_rates: vec![
                (RateKind::Flat, CentsPerKilowattHour(27.5)),
                (RateKind::ControlledLoad, CentsPerKilowattHour(19.8)),
            ],
            feed_in_tiers: Vec::new(),
            controlled_load_supply: Cents(4.4),
        };
        let scenario = UsageScenario::builder()
            .daily_usage(KilowattHours(20.0))
            .daily_solar_export(KilowattHours::ZERO)
            .controlled_load(KilowattHours(8.0))
            .build();
        let cost = compute_cost(&model, &scenario).unwrap();
        assert_abs_diff_eq!(cost.controlled_load_cost.0, 8.0 * 19.8 + 4.4);
    }

    #[test]
    fn test_net_cost_may_be_negative() {
        let model = RateModel {
            supply_charge: Cents(80.0),
            usage_rates: vec![(RateKind::Flat, CentsPerKilowattHour(27.5))],
            feed_in_tiers: vec![FeedInTier { cap: None, rate: CentsPerKilowattHour(12.0) }],
            controlled_load_supply: Cents::ZERO,
        };
        let scenario = UsageScenario::builder()
            .daily_usage(KilowattHours::ZERO)
            .daily_solar_export(KilowattHours(10.0))
            .build();
        let cost = compute_cost(&model, &scenario).unwrap();
        assert_abs_diff_eq!(cost.net_per_day.0, -40.0);
    }

    #[test]
    fn test_recalculation_is_bit_identical() {
        let scenario = UsageScenario::builder()
            .daily_usage(KilowattHours(17.3))
            .daily_solar_export(KilowattHours(6.9))
            .peak_share(0.6)
            .off_peak_share(0.4)
            .build();
        let model = single_rate_model();
        assert_eq!(
            compute_cost(&model, &scenario).unwrap(),
            compute_cost(&model, &scenario).unwrap(),
        );
    }

    #[test]
    fn test_negative_usage_is_rejected() {
        let scenario = UsageScenario::builder()
            .daily_usage(KilowattHours(-1.0))
            .daily_solar_export(KilowattHours::ZERO)
            .build();
        assert_eq!(
            compute_cost(&single_rate_model(), &scenario),
            Err(CoreError::InvalidScenario { reason: "daily usage must not be negative" }),
        );
    }
}
