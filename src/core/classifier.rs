use std::fmt::{Display, Formatter};

use crate::core::rate_model::{RateKind, RateModel};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PricingModel {
    SingleRate,
    TimeOfUse,
}

impl Display for PricingModel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SingleRate => write!(f, "Single rate"),
            Self::TimeOfUse => write!(f, "Time of use"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Classification {
    pub pricing_model: PricingModel,
    pub has_controlled_load: bool,
}

impl Classification {
    /// The short tariff label shown in the workbook.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match (self.pricing_model, self.has_controlled_load) {
            (PricingModel::SingleRate, false) => "SR",
            (PricingModel::SingleRate, true) => "SRCL",
            (PricingModel::TimeOfUse, false) => "TOU",
            (PricingModel::TimeOfUse, true) => "TOUCL",
        }
    }
}

#[must_use]
pub fn classify(model: &RateModel) -> Classification {
    let is_time_of_use = model.usage_rates.iter().any(|(kind, _)| {
        matches!(kind, RateKind::Peak | RateKind::OffPeak | RateKind::Shoulder)
    });
    Classification {
        pricing_model: if is_time_of_use { PricingModel::TimeOfUse } else { PricingModel::SingleRate },
        has_controlled_load: model.rate(RateKind::ControlledLoad).is_some(),
    }
}
