#![doc = include_str!("../README.md")]

pub mod core;
mod fmt;
pub mod ops;
mod prelude;
pub mod quantity;
pub mod tables;

pub use crate::core::{
    diagnostic::{DiagnosticReport, Suggestion},
    outcome::Outcome,
    plan::{Plan, PlanStep},
    scenario::{ConfigError, Scenario},
    solver::Solver,
    station::{CurrentSign, PeakWindow, Station, Tariff},
};
