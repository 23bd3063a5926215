use serde::{Deserialize, Serialize};

use crate::{
    core::{scenario::Scenario, station::CurrentSign},
    quantity::{energy::KilowattHours, time::Hours},
};

/// Consumption multipliers by current direction.
///
/// Defaults match the historical calibration: a following current saves a quarter
/// of the propulsion energy, an opposing one adds a quarter.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentMultipliers {
    pub downstream: f64,
    pub slack: f64,
    pub upstream: f64,
}

impl Default for CurrentMultipliers {
    fn default() -> Self {
        Self { downstream: 0.75, slack: 1.0, upstream: 1.25 }
    }
}

impl CurrentMultipliers {
    #[must_use]
    pub const fn for_sign(&self, sign: CurrentSign) -> f64 {
        match sign {
            CurrentSign::Downstream => self.downstream,
            CurrentSign::Slack => self.slack,
            CurrentSign::Upstream => self.upstream,
        }
    }
}

/// Pre-computed propulsion demand and duration of one inter-station leg.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Leg {
    pub energy: KilowattHours,
    pub travel_time: Hours,
}

/// Evaluate the energy model for every leg of the route, in route order.
#[must_use]
pub fn plan_legs(scenario: &Scenario) -> Vec<Leg> {
    scenario.stations[..scenario.segment_count()]
        .iter()
        .map(|station| {
            let distance =
                station.dist_to_next.expect("validation guarantees non-terminal distances");
            Leg {
                energy: distance
                    * scenario.base_consumption
                    * scenario.current_multipliers.for_sign(station.current_sign),
                travel_time: distance / scenario.cruise_speed,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::station::Station,
        ops::ClockTime,
        quantity::{distance::NauticalMiles, rate::KilowattHoursPerMile, speed::Knots},
    };

    fn scenario(sign: CurrentSign) -> Scenario {
        let first = Station::builder()
            .id("A")
            .dist_to_next(NauticalMiles(40.0))
            .current_sign(sign)
            .build();
        Scenario::builder()
            .stations(vec![first, Station::builder().id("B").build()])
            .battery_capacity(KilowattHours(300.0))
            .initial_soc(KilowattHours(300.0))
            .final_soc_required(KilowattHours(0.0))
            .departure(ClockTime::MIDNIGHT)
            .cruise_speed(Knots(16.0))
            .base_consumption(KilowattHoursPerMile(3.0))
            .soc_step(KilowattHours(5.0))
            .build()
    }

    #[test]
    fn slack_leg() {
        let legs = plan_legs(&scenario(CurrentSign::Slack));
        assert_eq!(legs, vec![Leg { energy: KilowattHours(120.0), travel_time: Hours(2.5) }]);
    }

    #[test]
    fn upstream_costs_a_quarter_more() {
        let legs = plan_legs(&scenario(CurrentSign::Upstream));
        assert_eq!(legs[0].energy, KilowattHours(150.0));
        // Travel time depends on distance and cruise speed only:
        assert_eq!(legs[0].travel_time, Hours(2.5));
    }

    #[test]
    fn downstream_saves_a_quarter() {
        let legs = plan_legs(&scenario(CurrentSign::Downstream));
        assert_eq!(legs[0].energy, KilowattHours(90.0));
    }
}
