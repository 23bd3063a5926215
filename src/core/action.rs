use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::quantity::energy::KilowattHours;

/// What the vessel does while berthed at a station.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    Idle,

    /// Exchange `containers` depleted containers for charged ones.
    Swap { containers: u32 },

    /// Draw `energy` from the shore connection.
    Charge { energy: KilowattHours },

    /// Exchange containers, then top up from the shore connection.
    SwapCharge { containers: u32, energy: KilowattHours },
}

impl Action {
    #[must_use]
    pub const fn is_swap(&self) -> bool {
        matches!(self, Self::Swap { .. } | Self::SwapCharge { .. })
    }

    #[must_use]
    pub const fn containers(&self) -> u32 {
        match self {
            Self::Idle | Self::Charge { .. } => 0,
            Self::Swap { containers } | Self::SwapCharge { containers, .. } => *containers,
        }
    }

    #[must_use]
    pub const fn grid_charge(&self) -> KilowattHours {
        match self {
            Self::Idle | Self::Swap { .. } => KilowattHours::ZERO,
            Self::Charge { energy } | Self::SwapCharge { energy, .. } => *energy,
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Swap { containers } => write!(f, "swap ×{containers}"),
            Self::Charge { energy } => write!(f, "charge {energy}"),
            Self::SwapCharge { containers, energy } => {
                write!(f, "swap ×{containers} + charge {energy}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        assert!(!Action::Idle.is_swap());
        assert!(Action::SwapCharge { containers: 2, energy: KilowattHours(10.0) }.is_swap());
        assert_eq!(Action::Swap { containers: 3 }.containers(), 3);
        assert_eq!(Action::Charge { energy: KilowattHours(10.0) }.containers(), 0);
        assert_eq!(
            Action::Charge { energy: KilowattHours(10.0) }.grid_charge(),
            KilowattHours(10.0),
        );
    }
}
