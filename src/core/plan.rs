use serde::Serialize;

use crate::{
    core::{action::Action, pricing::CostBreakdown},
    ops::ClockTime,
    quantity::{cost::Cost, energy::KilowattHours, time::Hours},
};

/// One berth call plus the traversal of the outgoing segment.
#[derive(Clone, Debug, Serialize)]
pub struct PlanStep {
    pub station: String,

    /// Berth arrival on the clock face.
    pub arrival_clock: ClockTime,

    /// Linear time since departure at berth arrival.
    pub arrival_elapsed: Hours,

    pub soc_arriving: KilowattHours,
    pub action: Action,
    pub containers_swapped: u32,
    pub energy_charged: KilowattHours,

    /// Forced wait for the operating window, already included in `dwell`.
    pub wait: Hours,
    pub dwell: Hours,

    pub soc_departing: KilowattHours,
    pub departure_clock: ClockTime,
    pub segment_energy: KilowattHours,
    pub travel_time: Hours,
    pub cost: CostBreakdown,
}

/// Cost-optimal journey schedule.
#[derive(Clone, Debug, Serialize)]
pub struct Plan {
    pub total_cost: Cost,

    /// Linear journey duration, never folded modulo 24.
    pub total_journey_hours: Hours,

    /// Terminus arrival on the clock face.
    pub arrival_clock_time: ClockTime,

    pub arrival_soc: KilowattHours,

    /// Berth calls that exchanged containers.
    pub swap_count: u32,

    /// One entry per station with an outgoing segment, in route order.
    pub steps: Vec<PlanStep>,
}

impl Plan {
    /// Derive the journey totals from an ordered step chain.
    #[must_use]
    pub fn from_steps(
        steps: Vec<PlanStep>,
        arrival_clock_time: ClockTime,
        total_journey_hours: Hours,
        arrival_soc: KilowattHours,
    ) -> Self {
        let total_cost = steps.iter().map(|step| step.cost.total).sum();
        let swap_count =
            u32::try_from(steps.iter().filter(|step| step.action.is_swap()).count())
                .unwrap_or(u32::MAX);
        Self {
            total_cost,
            total_journey_hours,
            arrival_clock_time,
            arrival_soc,
            swap_count,
            steps,
        }
    }
}
