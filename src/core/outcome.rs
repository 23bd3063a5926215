use serde::Serialize;

use crate::core::{diagnostic::DiagnosticReport, plan::Plan};

/// Result of a solve. Feasibility failures and cancellation are values,
/// never errors: callers handle every case exhaustively.
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Plan(Plan),
    Infeasible(DiagnosticReport),
    Cancelled,
}

impl Outcome {
    #[must_use]
    pub const fn plan(&self) -> Option<&Plan> {
        match self {
            Self::Plan(plan) => Some(plan),
            Self::Infeasible(_) | Self::Cancelled => None,
        }
    }

    #[must_use]
    pub const fn diagnostic(&self) -> Option<&DiagnosticReport> {
        match self {
            Self::Infeasible(report) => Some(report),
            Self::Plan(_) | Self::Cancelled => None,
        }
    }
}
