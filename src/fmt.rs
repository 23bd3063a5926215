use std::fmt::{Debug, Display, Formatter};

use crate::{ops::ClockTime, quantity::time::Hours};

/// A linear journey instant rendered as a day-prefixed clock time,
/// e.g. `14:30` on the departure day and `Day 2 06:15` later on.
pub struct FormattedJourneyTime {
    pub departure: ClockTime,
    pub elapsed: Hours,
}

impl Display for FormattedJourneyTime {
    #[expect(clippy::cast_precision_loss)]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let total_minutes = Hours(self.departure.hour()).total_minutes()
            + self.elapsed.total_minutes();
        let day = total_minutes / (24 * 60);
        let clock = ClockTime::from_hour(total_minutes as f64 / 60.0);
        if day > 0 {
            write!(f, "Day {day} {clock}")
        } else {
            write!(f, "{clock}")
        }
    }
}

impl Debug for FormattedJourneyTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
