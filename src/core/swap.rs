use crate::quantity::energy::KilowattHours;

/// Result of exchanging depleted containers for charged ones at a berth.
///
/// Billing is SoC-based: the billable energy is the charge actually handed over,
/// `Σ (container capacity − residual)` across the exchanged containers, never the
/// nominal capacity of the containers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Exchange {
    pub containers: u32,

    /// Charge delta between provided and returned containers; what the tariff bills.
    pub energy: KilowattHours,

    pub soc_after: KilowattHours,
}

/// Exchange `containers` of the vessel's bank, picking the most depleted ones first.
///
/// The aggregate SoC decomposes into full containers, at most one partially charged
/// one, and empty ones; the exchange drains that pool from the empty end, so a swap
/// never wastes residual charge that a later container still holds.
#[must_use]
pub fn exchange_depleted_first(
    soc: KilowattHours,
    container_capacity: KilowattHours,
    container_count: u32,
    containers: u32,
) -> Exchange {
    debug_assert!(containers <= container_count);

    #[expect(clippy::cast_possible_truncation)]
    #[expect(clippy::cast_sign_loss)]
    let full = ((soc / container_capacity) + 1e-9).floor() as u32;
    let full = full.min(container_count);
    let partial_residual = soc - container_capacity * f64::from(full);
    let has_partial = partial_residual > KilowattHours::ZERO && full < container_count;
    let empty = container_count - full - u32::from(has_partial);

    let mut remaining = containers;
    let mut energy = KilowattHours::ZERO;

    let from_empty = remaining.min(empty);
    energy += container_capacity * f64::from(from_empty);
    remaining -= from_empty;

    if remaining > 0 && has_partial {
        energy += container_capacity - partial_residual;
        remaining -= 1;
    }

    // Any remaining exchanges hit full containers and transfer no energy.
    let _ = remaining;

    Exchange { containers, energy, soc_after: soc + energy }
}
