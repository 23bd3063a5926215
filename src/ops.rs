pub mod clock;

pub use self::clock::{ClockTime, HourWindow};
