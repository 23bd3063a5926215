use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};
use itertools::Itertools;

use crate::{
    core::{action::Action, diagnostic::DiagnosticReport, plan::Plan},
    fmt::FormattedJourneyTime,
    ops::ClockTime,
    quantity::{cost::Cost, time::Hours},
};

const fn action_color(action: &Action) -> Color {
    match action {
        Action::Idle => Color::Reset,
        Action::Swap { .. } => Color::Cyan,
        Action::Charge { .. } => Color::Green,
        Action::SwapCharge { .. } => Color::Magenta,
    }
}

/// Render the journey schedule, one row per berth call.
pub fn build_plan_table(plan: &Plan) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling()
        .set_header(vec![
            Cell::new("Station"),
            Cell::new("Arrival"),
            Cell::new("Wait"),
            Cell::new("Action"),
            Cell::new("SoC\nin"),
            Cell::new("SoC\nout"),
            Cell::new("Dwell"),
            Cell::new("Travel"),
            Cell::new("Cost"),
        ]);
    for step in &plan.steps {
        table.add_row(vec![
            Cell::new(&step.station).add_attribute(Attribute::Bold),
            Cell::new(step.arrival_clock),
            Cell::new(step.wait).fg(if step.wait > Hours::ZERO {
                Color::Yellow
            } else {
                Color::Reset
            }),
            Cell::new(step.action).fg(action_color(&step.action)),
            Cell::new(step.soc_arriving).set_alignment(CellAlignment::Right),
            Cell::new(step.soc_departing).set_alignment(CellAlignment::Right),
            Cell::new(step.dwell).set_alignment(CellAlignment::Right),
            Cell::new(step.travel_time).set_alignment(CellAlignment::Right),
            Cell::new(step.cost.total).set_alignment(CellAlignment::Right).fg(
                if step.cost.total > Cost::ZERO { Color::Red } else { Color::Green },
            ),
        ]);
    }
    table
}

/// Render the journey totals next to the schedule.
pub fn build_totals_table(plan: &Plan, departure: ClockTime) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling()
        .set_header(vec![
            Cell::new("Total cost").add_attribute(Attribute::Bold),
            Cell::new("Journey"),
            Cell::new("Arrival"),
            Cell::new("Swaps"),
        ])
        .add_row(vec![
            Cell::new(plan.total_cost).add_attribute(Attribute::Bold),
            Cell::new(plan.total_journey_hours),
            Cell::new(FormattedJourneyTime { departure, elapsed: plan.total_journey_hours }),
            Cell::new(plan.swap_count),
        ]);
    table
}

/// Render the infeasibility post-mortem.
pub fn build_diagnostic_table(report: &DiagnosticReport) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling()
        .set_header(vec![Cell::new("Finding"), Cell::new("Detail")]);

    table.add_row(vec![
        Cell::new("Terminus"),
        if report.terminus_reached {
            Cell::new(format!("reached by {} state(s)", report.reachable_terminal_states))
        } else {
            Cell::new("unreachable").fg(Color::Red)
        },
    ]);
    if let Some(best) = report.best_final_soc {
        table.add_row(vec![
            Cell::new("Best final SoC"),
            Cell::new(format!("{best} of required {}", report.required_final_soc)),
        ]);
    }
    if let Some(shortfall) = report.shortfall {
        table.add_row(vec![Cell::new("Shortfall"), Cell::new(shortfall).fg(Color::Red)]);
    }
    for bottleneck in &report.bottlenecks {
        table.add_row(vec![
            Cell::new(format!("Bottleneck {} → {}", bottleneck.from, bottleneck.to))
                .fg(Color::Red),
            Cell::new(format!(
                "needs {} of {} capacity",
                bottleneck.energy_required, bottleneck.battery_capacity,
            )),
        ]);
    }
    if let Some(deficit) = report.energy_budget.deficit {
        table.add_row(vec![
            Cell::new("Energy deficit"),
            Cell::new(format!(
                "{deficit}; replenishment at: {}",
                if report.energy_budget.replenishment_stations.is_empty() {
                    "none".to_string()
                } else {
                    report.energy_budget.replenishment_stations.iter().join(", ")
                },
            )),
        ]);
    }
    for contradiction in &report.contradictions {
        table.add_row(vec![
            Cell::new("Configuration").fg(Color::Yellow),
            Cell::new(format!("{contradiction:?}")),
        ]);
    }
    if let Some(overflow) = &report.frontier_overflow {
        table.add_row(vec![
            Cell::new("State space").fg(Color::Red),
            Cell::new(format!(
                "{} states at {} exceed the cap of {}",
                overflow.states, overflow.station, overflow.cap,
            )),
        ]);
    }
    if !report.suggestions.is_empty() {
        table.add_row(vec![
            Cell::new("Suggestions"),
            Cell::new(report.suggestions.iter().map(|s| format!("{s:?}")).join(", ")),
        ]);
    }
    table
}
