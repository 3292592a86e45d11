use bon::Builder;

use crate::{core::error::CoreError, quantity::energy::KilowattHours};

/// A usage scenario to price the plans against. May be re-applied to the same
/// rate models any number of times.
#[derive(Builder, Clone, Copy, Debug, PartialEq)]
pub struct UsageScenario {
    pub daily_usage: KilowattHours,

    pub daily_solar_export: KilowattHours,

    /// Share of the daily usage falling into the peak window, for time-of-use plans.
    #[builder(default = 0.5)]
    pub peak_share: f64,

    #[builder(default = 0.5)]
    pub off_peak_share: f64,

    /// Daily kilowatt-hours on the controlled load circuit, when there is one.
    pub controlled_load: Option<KilowattHours>,
}

impl UsageScenario {
    /// Negative inputs and out-of-range shares are rejected, never silently clamped.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.daily_usage < KilowattHours::ZERO {
            return Err(CoreError::InvalidScenario { reason: "daily usage must not be negative" });
        }
        if self.daily_solar_export < KilowattHours::ZERO {
            return Err(CoreError::InvalidScenario { reason: "solar export must not be negative" });
        }
        if self.controlled_load.is_some_and(|load| load < KilowattHours::ZERO) {
            return Err(CoreError::InvalidScenario {
                reason: "controlled load usage must not be negative",
            });
        }
        if !(0.0..=1.0).contains(&self.peak_share) {
            return Err(CoreError::InvalidScenario { reason: "peak share must be within [0, 1]" });
        }
        if !(0.0..=1.0).contains(&self.off_peak_share) {
            return Err(CoreError::InvalidScenario {
                reason: "off-peak share must be within [0, 1]",
            });
        }
        if self.peak_share + self.off_peak_share > 1.0 + 1e-9 {
            return Err(CoreError::InvalidScenario { reason: "usage shares must not exceed 100%" });
        }
        Ok(())
    }

    /// Whatever is left after the peak and off-peak shares, applied to the
    /// shoulder rate when the plan defines one.
    #[must_use]
    pub fn shoulder_share(&self) -> f64 {
        (1.0 - self.peak_share - self.off_peak_share).max(0.0)
    }
}
