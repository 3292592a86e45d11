use std::ops::Mul;

quantity!(CentsPerKilowattHour, "c/kWh");

impl Mul<f64> for CentsPerKilowattHour {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}
