use crate::{
    core::{action::Action, pricing::CostBreakdown, soc_grid::SocLevel},
    ops::ClockTime,
    quantity::{cost::Cost, energy::KilowattHours, time::Hours},
};

/// Frontier key: SoC level plus a coarse arrival-time bucket.
///
/// Bucketing keeps the time dimension finite; two arrivals in the same bucket
/// compete for one slot, which is the documented approximation of the
/// `time_bucket` dial.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct StateKey {
    pub level: SocLevel,
    pub bucket: u32,
}

/// Everything that happened at the preceding station's berth on the way to a state,
/// kept so a finished plan can be read straight off the backpointer chain.
#[derive(Clone, Debug)]
pub struct BerthCall {
    pub action: Action,

    /// Forced wait for the operating window to open.
    pub wait: Hours,

    /// Wait plus queueing, handling and charging.
    pub dwell: Hours,

    pub arrival_clock: ClockTime,
    pub departure_clock: ClockTime,
    pub soc_arriving: KilowattHours,
    pub soc_departing: KilowattHours,
    pub breakdown: CostBreakdown,
    pub segment_energy: KilowattHours,
    pub travel_time: Hours,
}

/// One surviving, non-dominated state of the dynamic program.
#[derive(Clone, Debug)]
pub struct StateRecord {
    /// Cumulative cost since departure.
    pub cost: Cost,

    /// Linear elapsed time since departure; never folded modulo 24.
    pub elapsed: Hours,

    /// Key of the predecessor state at the previous station.
    pub predecessor: Option<StateKey>,

    /// Absent only on the departure-station seed record.
    pub berth: Option<BerthCall>,
}
