use std::ops::Mul;

use crate::quantity::{cost::Cents, rate::CentsPerKilowattHour};

quantity!(KilowattHours, "kWh");

impl Mul<CentsPerKilowattHour> for KilowattHours {
    type Output = Cents;

    fn mul(self, rhs: CentsPerKilowattHour) -> Self::Output {
        Cents(self.0 * rhs.0)
    }
}
