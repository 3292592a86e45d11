//! Semantic representation of a plan's charges.

use crate::{
    api::energy_made_easy::{Contract, TariffPeriod},
    core::error::CoreError,
    quantity::{cost::Cents, energy::KilowattHours, rate::CentsPerKilowattHour},
};

/// The API returns ex-GST values, the website shows inc-GST.
pub const GST_MULTIPLIER: f64 = 1.1;

/// Convert an ex-GST amount to the GST-inclusive value the website displays,
/// rounded to 2 decimal places.
fn incl_gst(ex_gst: f64) -> f64 {
    (ex_gst * GST_MULTIPLIER * 100.0).round() / 100.0
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RateKind {
    Flat,
    Peak,
    OffPeak,
    Shoulder,
    ControlledLoad,
}

/// One feed-in band: exports up to `cap` kilowatt-hours per day are credited at `rate`.
/// An uncapped terminal band has no `cap`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeedInTier {
    pub cap: Option<KilowattHours>,
    pub rate: CentsPerKilowattHour,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RateModel {
    /// GST-inclusive cents per day.
    pub supply_charge: Cents,

    /// GST-inclusive usage rates, one entry per rate kind.
    pub usage_rates: Vec<(RateKind, CentsPerKilowattHour)>,

    /// Retailer feed-in bands, ascending by cap, GST exempt.
    pub feed_in_tiers: Vec<FeedInTier>,

    /// Daily supply charge of the controlled load circuit, zero when absent.
    pub controlled_load_supply: Cents,
}

impl RateModel {
    /// Build the model from the primary contract of a raw plan.
    pub fn try_from_contract(contract: &Contract) -> Result<Self, CoreError> {
        let period = contract
            .tariff_periods
            .first()
            .ok_or(CoreError::MalformedPlanData { field: "tariffPeriod" })?;
        let supply_charge = period
            .daily_supply_charge
            .map(|charge| Cents(incl_gst(charge)))
            .ok_or(CoreError::MalformedPlanData { field: "dailySupplyCharge" })?;

        let mut usage_rates = if contract.pricing_model == "TOU" {
            tou_rates(period)?
        } else {
            flat_rate(period)?
        };

        let mut controlled_load_supply = Cents::ZERO;
        if let Some(controlled_load) = contract.controlled_load.first() {
            if let Some(rate) = controlled_load.single_rate.rates.first() {
                usage_rates
                    .push((RateKind::ControlledLoad, CentsPerKilowattHour(incl_gst(rate.unit_price))));
            }
            controlled_load_supply = controlled_load
                .single_rate
                .daily_supply_charge
                .map_or(Cents::ZERO, |charge| Cents(incl_gst(charge)));
        }

        let feed_in_tiers = feed_in_tiers(contract)?;

        Ok(Self { supply_charge, usage_rates, feed_in_tiers, controlled_load_supply })
    }

    #[must_use]
    pub fn rate(&self, kind: RateKind) -> Option<CentsPerKilowattHour> {
        self.usage_rates.iter().find(|(rate_kind, _)| *rate_kind == kind).map(|(_, rate)| *rate)
    }

    /// The best feed-in rate across all bands, zero without solar credit.
    #[must_use]
    pub fn max_feed_in_rate(&self) -> CentsPerKilowattHour {
        self.feed_in_tiers.iter().map(|tier| tier.rate).max().unwrap_or(CentsPerKilowattHour::ZERO)
    }

    #[must_use]
    pub fn min_feed_in_rate(&self) -> CentsPerKilowattHour {
        self.feed_in_tiers.iter().map(|tier| tier.rate).min().unwrap_or(CentsPerKilowattHour::ZERO)
    }
}

fn flat_rate(period: &TariffPeriod) -> Result<Vec<(RateKind, CentsPerKilowattHour)>, CoreError> {
    // Volume-blocked plans use the first-block (maximum) rate as the representative one.
    let rate = period
        .block_rates
        .iter()
        .map(|block| block.unit_price)
        .reduce(f64::max)
        .ok_or(CoreError::MalformedPlanData { field: "blockRate" })?;
    Ok(vec![(RateKind::Flat, CentsPerKilowattHour(incl_gst(rate)))])
}

fn tou_rates(period: &TariffPeriod) -> Result<Vec<(RateKind, CentsPerKilowattHour)>, CoreError> {
    let rates: Vec<(Option<&str>, f64)> = period
        .tou_blocks
        .iter()
        .flat_map(|block| {
            block.block_rates.iter().map(move |rate| (block.kind.as_deref(), rate.unit_price))
        })
        .collect();
    if rates.is_empty() {
        return Err(CoreError::MalformedPlanData { field: "touBlock" });
    }

    let tagged = |tag: &str, pick: fn(f64, f64) -> f64| -> Option<f64> {
        rates.iter().filter(|(kind, _)| *kind == Some(tag)).map(|(_, price)| *price).reduce(pick)
    };
    // Untagged blocks fall back to the magnitude heuristic: the most expensive
    // rate is peak, the cheapest is off-peak.
    let fallback_max = rates.iter().map(|(_, price)| *price).reduce(f64::max).unwrap_or_default();
    let fallback_min = rates.iter().map(|(_, price)| *price).reduce(f64::min).unwrap_or_default();
    let peak = tagged("P", f64::max).unwrap_or(fallback_max);
    let off_peak = tagged("OP", f64::min).unwrap_or(fallback_min);

    let mut usage_rates = vec![
        (RateKind::Peak, CentsPerKilowattHour(incl_gst(peak))),
        (RateKind::OffPeak, CentsPerKilowattHour(incl_gst(off_peak))),
    ];
    if let Some(shoulder) = tagged("S", f64::max) {
        usage_rates.push((RateKind::Shoulder, CentsPerKilowattHour(incl_gst(shoulder))));
    }
    Ok(usage_rates)
}

/// Collect the retailer feed-in bands, skipping legacy government bonus schemes
/// (those are paid to grandfathered customers and are not part of the offer)
/// and non-positive rates.
fn feed_in_tiers(contract: &Contract) -> Result<Vec<FeedInTier>, CoreError> {
    let mut tiers = Vec::new();
    for fit in &contract.solar_fit {
        if fit.kind.as_deref() == Some("G") {
            continue;
        }
        if let Some(rate) = fit.rate {
            if rate > 0.0 {
                tiers.push(FeedInTier { cap: None, rate: CentsPerKilowattHour(rate) });
            }
        } else {
            for tier in &fit.single_tariff_rates {
                if tier.unit_price <= 0.0 {
                    continue;
                }
                let cap = (tier.volume > 0.0).then(|| KilowattHours(tier.volume));
                tiers.push(FeedInTier { cap, rate: CentsPerKilowattHour(tier.unit_price) });
            }
        }
    }
    validate_tiers(&tiers)?;
    Ok(tiers)
}

/// Bands must ascend by cap and partition the export volume contiguously from zero;
/// an uncapped band, if any, must be the last.
fn validate_tiers(tiers: &[FeedInTier]) -> Result<(), CoreError> {
    let mut prior_cap = KilowattHours::ZERO;
    let mut uncapped_seen = false;
    for tier in tiers {
        if uncapped_seen {
            return Err(CoreError::InvalidTierOrdering);
        }
        match tier.cap {
            Some(cap) if cap <= prior_cap => return Err(CoreError::InvalidTierOrdering),
            Some(cap) => prior_cap = cap,
            None => uncapped_seen = true,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn contract(value: serde_json::Value) -> Contract {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_single_rate_with_gst() {
        let model = RateModel::try_from_contract(&contract(serde_json::json!({
            "pricingModel": "SR",
            "tariffPeriod": [{"dailySupplyCharge": 90.0, "blockRate": [{"unitPrice": 25.0}]}],
        })))
        .unwrap();
        assert_abs_diff_eq!(model.supply_charge.0, 99.0);
        assert_eq!(model.rate(RateKind::Flat), Some(CentsPerKilowattHour(27.5)));
        assert!(model.feed_in_tiers.is_empty());
    }

    #[test]
    fn test_blocked_single_rate_uses_maximum() {
        let model = RateModel::try_from_contract(&contract(serde_json::json!({
            "pricingModel": "SR",
            "tariffPeriod": [{
                "dailySupplyCharge": 80.0,
                "blockRate": [{"unitPrice": 22.0}, {"unitPrice": 20.0}],
            }],
        })))
        .unwrap();
        assert_eq!(model.rate(RateKind::Flat), Some(CentsPerKilowattHour(24.2)));
    }

    #[test]
    fn test_tou_tagged_roles() {
        let model = RateModel::try_from_contract(&contract(serde_json::json!({
            "pricingModel": "TOU",
            "tariffPeriod": [{
                "dailySupplyCharge": 100.0,
                "touBlock": [
                    {"type": "OP", "blockRate": [{"unitPrice": 15.0}]},
                    {"type": "P", "blockRate": [{"unitPrice": 40.0}]},
                    {"type": "S", "blockRate": [{"unitPrice": 25.0}]},
                ],
            }],
        })))
        .unwrap();
        assert_eq!(model.rate(RateKind::Peak), Some(CentsPerKilowattHour(44.0)));
        assert_eq!(model.rate(RateKind::OffPeak), Some(CentsPerKilowattHour(16.5)));
        assert_eq!(model.rate(RateKind::Shoulder), Some(CentsPerKilowattHour(27.5)));
    }

    #[test]
    fn test_tou_untagged_uses_magnitude() {
        let model = RateModel::try_from_contract(&contract(serde_json::json!({
            "pricingModel": "TOU",
            "tariffPeriod": [{
                "dailySupplyCharge": 100.0,
                "touBlock": [
                    {"blockRate": [{"unitPrice": 40.0}]},
                    {"blockRate": [{"unitPrice": 15.0}]},
                ],
            }],
        })))
        .unwrap();
        assert_eq!(model.rate(RateKind::Peak), Some(CentsPerKilowattHour(44.0)));
        assert_eq!(model.rate(RateKind::OffPeak), Some(CentsPerKilowattHour(16.5)));
        assert_eq!(model.rate(RateKind::Shoulder), None);
    }

    #[test]
    fn test_controlled_load() {
        let model = RateModel::try_from_contract(&contract(serde_json::json!({
            "pricingModel": "SR",
            "tariffPeriod": [{"dailySupplyCharge": 90.0, "blockRate": [{"unitPrice": 25.0}]}],
            "controlledLoad": [{
                "singleRate": {
                    "displayName": "Controlled Load 1",
                    "rates": [{"unitPrice": 18.0}],
                    "dailySupplyCharge": 4.0,
                },
            }],
        })))
        .unwrap();
        assert_eq!(model.rate(RateKind::ControlledLoad), Some(CentsPerKilowattHour(19.8)));
        assert_abs_diff_eq!(model.controlled_load_supply.0, 4.4);
    }

    #[test]
    fn test_government_feed_in_is_excluded() {
        let model = RateModel::try_from_contract(&contract(serde_json::json!({
            "pricingModel": "SR",
            "tariffPeriod": [{"dailySupplyCharge": 90.0, "blockRate": [{"unitPrice": 25.0}]}],
            "solarFit": [
                {"type": "G", "singleTariffRates": [{"unitPrice": 44.0, "volume": 0}]},
                {"type": "R", "singleTariffRates": [{"unitPrice": 5.0, "volume": 0}]},
            ],
        })))
        .unwrap();
        assert_eq!(model.feed_in_tiers.len(), 1);
        assert_eq!(model.max_feed_in_rate(), CentsPerKilowattHour(5.0));
    }

    #[test]
    fn test_tiered_feed_in() {
        let model = RateModel::try_from_contract(&contract(serde_json::json!({
            "pricingModel": "SR",
            "tariffPeriod": [{"dailySupplyCharge": 90.0, "blockRate": [{"unitPrice": 25.0}]}],
            "solarFit": [{
                "type": "R",
                "singleTariffRates": [
                    {"unitPrice": 10.0, "volume": 8.0},
                    {"unitPrice": 3.0, "volume": 0},
                ],
            }],
        })))
        .unwrap();
        assert_eq!(model.feed_in_tiers[0].cap, Some(KilowattHours(8.0)));
        assert_eq!(model.feed_in_tiers[1].cap, None);
    }

    #[test]
    fn test_missing_supply_charge() {
        let error = RateModel::try_from_contract(&contract(serde_json::json!({
            "pricingModel": "SR",
            "tariffPeriod": [{"blockRate": [{"unitPrice": 25.0}]}],
        })))
        .unwrap_err();
        assert_eq!(error, CoreError::MalformedPlanData { field: "dailySupplyCharge" });
    }

    #[test]
    fn test_missing_usage_rates() {
        let error = RateModel::try_from_contract(&contract(serde_json::json!({
            "pricingModel": "SR",
            "tariffPeriod": [{"dailySupplyCharge": 90.0}],
        })))
        .unwrap_err();
        assert_eq!(error, CoreError::MalformedPlanData { field: "blockRate" });
    }

    #[test]
    fn test_descending_tier_caps_are_rejected() {
        let error = RateModel::try_from_contract(&contract(serde_json::json!({
            "pricingModel": "SR",
            "tariffPeriod": [{"dailySupplyCharge": 90.0, "blockRate": [{"unitPrice": 25.0}]}],
            "solarFit": [{
                "type": "R",
                "singleTariffRates": [
                    {"unitPrice": 10.0, "volume": 8.0},
                    {"unitPrice": 12.0, "volume": 4.0},
                ],
            }],
        })))
        .unwrap_err();
        assert_eq!(error, CoreError::InvalidTierOrdering);
    }

    #[test]
    fn test_second_uncapped_tier_is_rejected() {
        let error = RateModel::try_from_contract(&contract(serde_json::json!({
            "pricingModel": "SR",
            "tariffPeriod": [{"dailySupplyCharge": 90.0, "blockRate": [{"unitPrice": 25.0}]}],
            "solarFit": [{
                "type": "R",
                "singleTariffRates": [
                    {"unitPrice": 10.0, "volume": 0},
                    {"unitPrice": 3.0, "volume": 0},
                ],
            }],
        })))
        .unwrap_err();
        assert_eq!(error, CoreError::InvalidTierOrdering);
    }
}
