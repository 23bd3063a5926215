use std::ops::Mul;

use crate::quantity::{cost::Cost, energy::KilowattHours};

quantity!(KilowattHourRate, "$/kWh", precision: 4);

impl Mul<KilowattHours> for KilowattHourRate {
    type Output = Cost;

    fn mul(self, rhs: KilowattHours) -> Self::Output {
        Cost(self.0 * rhs.0)
    }
}

// Propulsion consumption per unit of distance travelled.
quantity!(KilowattHoursPerMile, "kWh/NM", precision: 2);
