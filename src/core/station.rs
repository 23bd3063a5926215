use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::{
    ops::HourWindow,
    quantity::{
        cost::Cost,
        distance::NauticalMiles,
        energy::KilowattHours,
        power::Kilowatts,
        rate::KilowattHourRate,
        time::Hours,
    },
};

/// Water-current direction on a station's outgoing segment.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrentSign {
    /// Current pushes the vessel along the route.
    Downstream,
    #[default]
    Slack,
    /// Current opposes the vessel.
    Upstream,
}

/// Peak-hour surcharge window. The multiplier applies to the pricing subtotal
/// when the berth arrival instant falls inside the window.
#[derive(Copy, Clone, Debug, PartialEq, Builder, Serialize, Deserialize)]
pub struct PeakWindow {
    pub window: HourWindow,
    pub multiplier: f64,
}

/// Per-berth pricing parameters of the hybrid model.
///
/// Omitted components default to their identity (0 for additive terms,
/// no discount, no peak window), so a bare tariff prices every berth call at zero.
#[derive(Clone, Debug, Default, Builder, Serialize, Deserialize)]
#[serde(default)]
pub struct Tariff {
    #[builder(default)]
    pub base_service_fee: Cost,

    /// Handling fee per exchanged container.
    #[builder(default)]
    pub swap_cost_per_container: Cost,

    /// Strategic-location markup per exchanged container.
    #[builder(default)]
    pub location_premium_per_container: Cost,

    /// Rate billed on the SoC delta of swapped containers, on grid-charge energy,
    /// and on cold-ironed hotelling energy.
    #[builder(default)]
    pub energy_cost_per_kwh: KilowattHourRate,

    /// Battery-wear surcharge on billable replenishment energy.
    #[builder(default)]
    pub degradation_fee_per_kwh: KilowattHourRate,

    /// Fixed fee for using the shore charging connection, applied whenever
    /// grid-charge energy is drawn.
    #[builder(default)]
    pub base_charging_fee: Cost,

    pub peak: Option<PeakWindow>,

    /// Multiplicative discount on the subtotal, in `[0, 1)`.
    #[builder(default)]
    pub subscription_discount: f64,
}

/// One waypoint of the route, with its outgoing-segment geometry, replenishment
/// capabilities, berth-time model, and tariff.
#[derive(Clone, Debug, Builder, Serialize, Deserialize)]
pub struct Station {
    #[builder(into)]
    pub id: String,

    /// Distance to the following station. `None` only on the terminus.
    #[serde(default)]
    pub dist_to_next: Option<NauticalMiles>,

    #[serde(default)]
    #[builder(default)]
    pub current_sign: CurrentSign,

    #[serde(default)]
    #[builder(default)]
    pub swap_allowed: bool,

    #[serde(default)]
    #[builder(default)]
    pub charging_allowed: bool,

    /// Allows exchanging a strict subset of the containers.
    #[serde(default)]
    #[builder(default)]
    pub partial_swap_allowed: bool,

    /// The berth mandates a container exchange: idle and charge-only calls are illegal.
    #[serde(default)]
    #[builder(default)]
    pub swap_required: bool,

    /// Containers carried by a vessel served at this berth.
    #[serde(default)]
    #[builder(default)]
    pub container_count: u32,

    #[serde(default, rename = "container_capacity_kwh")]
    #[builder(default)]
    pub container_capacity: KilowattHours,

    /// Charged containers in stock at this station.
    #[serde(default)]
    #[builder(default)]
    pub charged_stock: u32,

    #[serde(default, rename = "charging_power_kw")]
    #[builder(default)]
    pub charging_power: Kilowatts,

    /// Hotelling demand while berthed, cold-ironed from the shore grid.
    #[serde(default, rename = "hotelling_power_kw")]
    #[builder(default)]
    pub hotelling_power: Kilowatts,

    /// Absent means the station operates around the clock.
    #[serde(default)]
    pub operating_hours: Option<HourWindow>,

    #[serde(default, rename = "queue_time_hr")]
    #[builder(default)]
    pub queue_time: Hours,

    #[serde(default, rename = "swap_time_per_container_hr")]
    #[builder(default)]
    pub swap_time_per_container: Hours,

    /// Berth-duration cap on the service time (queueing, handling, charging).
    /// A forced wait for opening hours does not count against it.
    #[serde(default, rename = "max_dwell_hr")]
    pub max_dwell: Option<Hours>,

    #[serde(default, rename = "pricing")]
    #[builder(default)]
    pub tariff: Tariff,
}

impl Station {
    /// The station can actually hand out charged containers.
    #[must_use]
    pub fn can_swap(&self) -> bool {
        self.swap_allowed && self.container_count > 0 && self.charged_stock > 0
    }

    /// The station can actually deliver grid energy.
    #[must_use]
    pub fn can_charge(&self) -> bool {
        self.charging_allowed && self.charging_power > Kilowatts::ZERO
    }

    /// Highest container count exchangeable in one call.
    #[must_use]
    pub fn max_swappable(&self) -> u32 {
        self.container_count.min(self.charged_stock)
    }
}
