use std::fmt::{Debug, Formatter};

use serde::Serialize;

use crate::quantity::energy::KilowattHours;

/// Discrete state-of-charge level in units of the grid step.
#[must_use]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(transparent)]
pub struct SocLevel(pub usize);

impl Debug for SocLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl SocLevel {
    #[must_use]
    pub const fn checked_sub(self, steps: usize) -> Option<Self> {
        match self.0.checked_sub(steps) {
            Some(level) => Some(Self(level)),
            None => None,
        }
    }
}

/// Uniform grid of representable SoC values: `{0, step, 2·step, …, top·step}`.
///
/// Quantization is pessimistic in both directions — credits round down, debits
/// round up — so a schedule feasible on the grid is feasible in reality.
#[derive(Copy, Clone, Debug)]
pub struct SocGrid {
    step: KilowattHours,
    top: SocLevel,
}

/// Guards exact grid points against floating-point noise.
const GRID_EPSILON: f64 = 1e-9;

impl SocGrid {
    pub fn new(step: KilowattHours, capacity: KilowattHours) -> Self {
        debug_assert!(step > KilowattHours::ZERO && step < capacity);
        #[expect(clippy::cast_possible_truncation)]
        #[expect(clippy::cast_sign_loss)]
        let top = ((capacity / step) + GRID_EPSILON).floor() as usize;
        Self { step, top: SocLevel(top) }
    }

    #[must_use]
    pub const fn step(&self) -> KilowattHours {
        self.step
    }

    /// Highest representable level, `⌊capacity / step⌋`.
    #[must_use]
    pub const fn top(&self) -> SocLevel {
        self.top
    }

    /// Quantize a credit (charge present or gained): rounds down, clamped to the top.
    pub fn floor(&self, energy: KilowattHours) -> SocLevel {
        debug_assert!(energy >= KilowattHours::ZERO);
        #[expect(clippy::cast_possible_truncation)]
        #[expect(clippy::cast_sign_loss)]
        let level = ((energy / self.step) + GRID_EPSILON).floor() as usize;
        SocLevel(level.min(self.top.0))
    }

    /// Quantize a debit (consumption or a floor requirement): rounds up.
    #[must_use]
    pub fn ceil_steps(&self, energy: KilowattHours) -> usize {
        debug_assert!(energy >= KilowattHours::ZERO);
        #[expect(clippy::cast_possible_truncation)]
        #[expect(clippy::cast_sign_loss)]
        let steps = ((energy / self.step) - GRID_EPSILON).ceil() as usize;
        steps
    }

    /// Physical value of a grid level.
    pub fn energy(&self, level: SocLevel) -> KilowattHours {
        #[expect(clippy::cast_precision_loss)]
        let multiple = level.0 as f64;
        self.step * multiple
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_is_the_floored_capacity() {
        let grid = SocGrid::new(KilowattHours(5.0), KilowattHours(300.0));
        assert_eq!(grid.top(), SocLevel(60));

        let ragged = SocGrid::new(KilowattHours(7.0), KilowattHours(300.0));
        assert_eq!(ragged.top(), SocLevel(42));
    }

    #[test]
    fn credits_round_down() {
        let grid = SocGrid::new(KilowattHours(5.0), KilowattHours(300.0));
        assert_eq!(grid.floor(KilowattHours(129.9)), SocLevel(25));
        assert_eq!(grid.floor(KilowattHours(130.0)), SocLevel(26));
        assert_eq!(grid.floor(KilowattHours(1_000.0)), grid.top());
    }

    #[test]
    fn debits_round_up() {
        let grid = SocGrid::new(KilowattHours(5.0), KilowattHours(300.0));
        assert_eq!(grid.ceil_steps(KilowattHours(62.5)), 13);
        assert_eq!(grid.ceil_steps(KilowattHours(60.0)), 12);
        assert_eq!(grid.ceil_steps(KilowattHours::ZERO), 0);
    }

    #[test]
    fn energy_round_trips_exact_levels() {
        let grid = SocGrid::new(KilowattHours(2.5), KilowattHours(100.0));
        assert_eq!(grid.energy(SocLevel(25)), KilowattHours(62.5));
        assert_eq!(grid.floor(grid.energy(SocLevel(25))), SocLevel(25));
    }
}
