use serde::Serialize;

use crate::{
    core::station::Tariff,
    ops::ClockTime,
    quantity::{cost::Cost, energy::KilowattHours, power::Kilowatts, time::Hours},
};

/// Itemized price of one berth call.
///
/// The additive components are recorded at their raw (pre-surcharge) values;
/// `total` carries the peak multiplier and the subscription discount, so it is
/// not the plain sum of the items.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub service_fee: Cost,
    pub swap_fee: Cost,
    pub location_premium: Cost,
    pub energy_fee: Cost,
    pub degradation_fee: Cost,
    pub charging_fee: Cost,

    /// Multiplier actually applied to the component subtotal (1.0 off-peak).
    pub peak_multiplier: f64,
    pub subscription_discount: f64,

    /// Cold-ironed hotelling energy billed at the station's energy rate,
    /// outside the peak/discount scope.
    pub hotelling_fee: Cost,

    pub total: Cost,
}

impl CostBreakdown {
    pub const FREE: Self = Self {
        service_fee: Cost::ZERO,
        swap_fee: Cost::ZERO,
        location_premium: Cost::ZERO,
        energy_fee: Cost::ZERO,
        degradation_fee: Cost::ZERO,
        charging_fee: Cost::ZERO,
        peak_multiplier: 1.0,
        subscription_discount: 0.0,
        hotelling_fee: Cost::ZERO,
        total: Cost::ZERO,
    };
}

impl Tariff {
    /// Price a berth call under the hybrid model.
    ///
    /// `billable_energy` is the SoC-based delta handed over (swap delta plus grid
    /// charge); `grid_charge` is the grid-drawn part of it and only gates the fixed
    /// charging fee. The peak surcharge is keyed on the berth `arrival` instant;
    /// hotelling is billed over the whole `dwell`, forced waits included.
    #[must_use]
    pub fn assess(
        &self,
        containers: u32,
        billable_energy: KilowattHours,
        grid_charge: KilowattHours,
        arrival: ClockTime,
        dwell: Hours,
        hotelling_power: Kilowatts,
    ) -> CostBreakdown {
        let containers = f64::from(containers);
        let service_fee = self.base_service_fee;
        let swap_fee = self.swap_cost_per_container * containers;
        let location_premium = self.location_premium_per_container * containers;
        let energy_fee = self.energy_cost_per_kwh * billable_energy;
        let degradation_fee = self.degradation_fee_per_kwh * billable_energy;
        let charging_fee =
            if grid_charge > KilowattHours::ZERO { self.base_charging_fee } else { Cost::ZERO };

        let peak_multiplier = match &self.peak {
            Some(peak) if peak.window.contains(arrival) => peak.multiplier,
            _ => 1.0,
        };
        let components = service_fee
            + swap_fee
            + location_premium
            + energy_fee
            + degradation_fee
            + charging_fee;
        let subtotal = components * peak_multiplier;
        let hotelling_fee = self.energy_cost_per_kwh * (hotelling_power * dwell);

        CostBreakdown {
            service_fee,
            swap_fee,
            location_premium,
            energy_fee,
            degradation_fee,
            charging_fee,
            peak_multiplier,
            subscription_discount: self.subscription_discount,
            hotelling_fee,
            total: subtotal * (1.0 - self.subscription_discount) + hotelling_fee,
        }
    }
}
