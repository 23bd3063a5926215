use std::ops::{Div, Mul};

use crate::quantity::{
    cost::Cost,
    power::Kilowatts,
    rate::KilowattHourRate,
    time::Hours,
};

quantity!(KilowattHours, "kWh", precision: 1);

impl KilowattHours {
    pub const ONE_WATT_HOUR: Self = Self(0.001);
}

impl Mul<KilowattHourRate> for KilowattHours {
    type Output = Cost;

    fn mul(self, rhs: KilowattHourRate) -> Self::Output {
        Cost(self.0 * rhs.0)
    }
}

/// Time needed to transfer this much energy at the given power.
impl Div<Kilowatts> for KilowattHours {
    type Output = Hours;

    fn div(self, rhs: Kilowatts) -> Self::Output {
        Hours(self.0 / rhs.0)
    }
}
