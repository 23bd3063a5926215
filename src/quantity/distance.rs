use std::ops::{Div, Mul};

use crate::quantity::{
    energy::KilowattHours,
    rate::KilowattHoursPerMile,
    speed::Knots,
    time::Hours,
};

quantity!(NauticalMiles, "NM", precision: 1);

impl Mul<KilowattHoursPerMile> for NauticalMiles {
    type Output = KilowattHours;

    fn mul(self, rhs: KilowattHoursPerMile) -> Self::Output {
        KilowattHours(self.0 * rhs.0)
    }
}

impl Div<Knots> for NauticalMiles {
    type Output = Hours;

    fn div(self, rhs: Knots) -> Self::Output {
        Hours(self.0 / rhs.0)
    }
}
