use std::{
    fmt::{Debug, Display, Formatter},
    ops::Mul,
};

quantity!(Cents, "c");

impl Cents {
    #[must_use]
    pub const fn to_dollars(self) -> Dollars {
        Dollars(self.0 / 100.0)
    }
}

impl Mul<f64> for Cents {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

/// Australian dollars, used for monthly projections and the yearly benchmark estimates.
#[repr(transparent)]
#[derive(
    ::derive_more::Add,
    ::derive_more::AddAssign,
    ::derive_more::FromStr,
    ::derive_more::Neg,
    ::derive_more::Sub,
    ::derive_more::SubAssign,
    ::derive_more::Sum,
    ::serde::Deserialize,
    ::serde::Serialize,
    Clone,
    Copy,
)]
pub struct Dollars(pub f64);

impl Display for Dollars {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "${:.2}", self.0)
    }
}

impl Debug for Dollars {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "${:.2}", self.0)
    }
}

ordered_float!(Dollars);

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_cents_to_dollars() {
        assert_abs_diff_eq!(Cents(1234.5).to_dollars().0, 12.345);
    }

    #[test]
    fn test_negative_cost_is_preserved() {
        assert_abs_diff_eq!((Cents(80.0) - Cents(120.0)).0, -40.0);
    }
}
