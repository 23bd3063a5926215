use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::{
    core::{energy::CurrentMultipliers, station::Station},
    ops::ClockTime,
    quantity::{
        energy::KilowattHours,
        rate::KilowattHoursPerMile,
        speed::Knots,
        time::Hours,
    },
};

/// Self-contradictory scenario input, rejected before any solve work.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("the route needs at least two stations")]
    RouteTooShort,

    #[display("station `{station}` is not the terminus but has no distance to the next station")]
    MissingDistance { station: String },

    #[display("station `{station}` has a negative distance to the next station")]
    NegativeDistance { station: String },

    #[display("departure hour {hour} is outside [0, 24)")]
    DepartureOutOfRange { hour: f64 },

    #[display("cruise speed must be positive")]
    NonPositiveCruiseSpeed,

    #[display("base consumption cannot be negative")]
    NegativeConsumption,

    #[display("SoC step must lie in (0, capacity)")]
    SocStepOutOfRange,

    #[display("minimum SoC exceeds battery capacity")]
    MinSocAboveCapacity,

    #[display("initial SoC must lie in [minimum SoC, capacity]")]
    InitialSocOutOfRange,

    #[display("required final SoC must lie in [minimum SoC, capacity]")]
    FinalSocOutOfRange,

    #[display("station `{station}` has a negative queue or handling time")]
    NegativeBerthTime { station: String },

    #[display("station `{station}` has a negative berth-duration cap")]
    NegativeMaxDwell { station: String },

    #[display("station `{station}` has an operating hour outside [0, 24]")]
    OperatingHourOutOfRange { station: String },

    #[display("station `{station}` allows swapping but its container bank is not configured")]
    ContainerBankMissing { station: String },

    #[display(
        "station `{station}`: container count times container capacity must match the battery \
         capacity"
    )]
    ContainerBankMismatch { station: String },

    #[display("station `{station}` requires a swap but does not allow one")]
    SwapRequiredNotAllowed { station: String },

    #[display("station `{station}` has a negative price component")]
    NegativePrice { station: String },

    #[display("station `{station}`: subscription discount must lie in [0, 1)")]
    DiscountOutOfRange { station: String },

    #[display("station `{station}`: peak-hour multiplier cannot be negative")]
    NegativePeakMultiplier { station: String },
}

/// Immutable description of one planning problem: the route and the vessel.
///
/// Construction does not validate; call [`Scenario::validate`] (the solver does so on
/// entry) to reject contradictory inputs with a [`ConfigError`].
#[derive(Clone, Debug, Builder, Serialize, Deserialize)]
pub struct Scenario {
    pub stations: Vec<Station>,

    #[serde(rename = "battery_capacity_kwh")]
    pub battery_capacity: KilowattHours,

    /// Operating floor: no surviving state may fall below it.
    #[serde(default, rename = "min_soc_kwh")]
    #[builder(default)]
    pub min_soc: KilowattHours,

    #[serde(rename = "initial_soc_kwh")]
    pub initial_soc: KilowattHours,

    #[serde(rename = "final_soc_required_kwh")]
    pub final_soc_required: KilowattHours,

    /// Clock hour of day at which the vessel leaves the first station's berth area.
    #[serde(rename = "departure_hour")]
    pub departure: ClockTime,

    pub cruise_speed: Knots,

    #[serde(rename = "base_consumption_per_unit")]
    pub base_consumption: KilowattHoursPerMile,

    /// Grid resolution of the SoC dimension: precision/performance dial.
    #[serde(rename = "soc_step_kwh")]
    pub soc_step: KilowattHours,

    #[serde(default)]
    #[builder(default)]
    pub allow_hybrid_swap_and_charge: bool,

    #[serde(default)]
    #[builder(default)]
    pub current_multipliers: CurrentMultipliers,
}

impl Scenario {
    /// Number of travel segments on the route.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.stations.len().saturating_sub(1)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stations.len() < 2 {
            return Err(ConfigError::RouteTooShort);
        }
        let departure = self.departure.hour();
        if !(0.0..24.0).contains(&departure) {
            return Err(ConfigError::DepartureOutOfRange { hour: departure });
        }
        if self.cruise_speed <= Knots::ZERO {
            return Err(ConfigError::NonPositiveCruiseSpeed);
        }
        if self.base_consumption < KilowattHoursPerMile::ZERO {
            return Err(ConfigError::NegativeConsumption);
        }
        if self.soc_step <= KilowattHours::ZERO || self.soc_step >= self.battery_capacity {
            return Err(ConfigError::SocStepOutOfRange);
        }
        if self.min_soc > self.battery_capacity || self.min_soc < KilowattHours::ZERO {
            return Err(ConfigError::MinSocAboveCapacity);
        }
        if self.initial_soc > self.battery_capacity || self.initial_soc < self.min_soc {
            return Err(ConfigError::InitialSocOutOfRange);
        }
        if self.final_soc_required > self.battery_capacity
            || self.final_soc_required < self.min_soc
        {
            return Err(ConfigError::FinalSocOutOfRange);
        }
        for (index, station) in self.stations.iter().enumerate() {
            self.validate_station(station, index == self.stations.len() - 1)?;
        }
        Ok(())
    }

    fn validate_station(&self, station: &Station, is_terminus: bool) -> Result<(), ConfigError> {
        let id = || station.id.clone();

        match station.dist_to_next {
            None if !is_terminus => return Err(ConfigError::MissingDistance { station: id() }),
            Some(distance) if distance.0 < 0.0 => {
                return Err(ConfigError::NegativeDistance { station: id() });
            }
            _ => {}
        }
        if station.queue_time < Hours::ZERO || station.swap_time_per_container < Hours::ZERO {
            return Err(ConfigError::NegativeBerthTime { station: id() });
        }
        if station.max_dwell.is_some_and(|dwell| dwell < Hours::ZERO) {
            return Err(ConfigError::NegativeMaxDwell { station: id() });
        }
        if let Some(window) = &station.operating_hours
            && !((0.0..24.0).contains(&window.open) && (0.0..=24.0).contains(&window.close))
        {
            return Err(ConfigError::OperatingHourOutOfRange { station: id() });
        }
        if station.swap_required && !station.swap_allowed {
            return Err(ConfigError::SwapRequiredNotAllowed { station: id() });
        }
        if station.swap_allowed {
            if station.container_count == 0 || station.container_capacity <= KilowattHours::ZERO {
                return Err(ConfigError::ContainerBankMissing { station: id() });
            }
            let bank = station.container_capacity * f64::from(station.container_count);
            if (bank - self.battery_capacity).0.abs() > self.soc_step.0 {
                return Err(ConfigError::ContainerBankMismatch { station: id() });
            }
        }
        self.validate_tariff(station)
    }

    fn validate_tariff(&self, station: &Station) -> Result<(), ConfigError> {
        use crate::quantity::{cost::Cost, rate::KilowattHourRate};

        let id = || station.id.clone();
        let tariff = &station.tariff;

        let fees = [
            tariff.base_service_fee,
            tariff.swap_cost_per_container,
            tariff.location_premium_per_container,
            tariff.base_charging_fee,
        ];
        if fees.into_iter().any(|fee| fee < Cost::ZERO)
            || tariff.energy_cost_per_kwh < KilowattHourRate::ZERO
            || tariff.degradation_fee_per_kwh < KilowattHourRate::ZERO
        {
            return Err(ConfigError::NegativePrice { station: id() });
        }
        if !(0.0..1.0).contains(&tariff.subscription_discount) {
            return Err(ConfigError::DiscountOutOfRange { station: id() });
        }
        if tariff.peak.is_some_and(|peak| peak.multiplier < 0.0) {
            return Err(ConfigError::NegativePeakMultiplier { station: id() });
        }
        Ok(())
    }
}
