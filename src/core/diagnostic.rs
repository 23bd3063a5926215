use std::fmt::{Display, Formatter};

use enumset::{EnumSet, EnumSetType};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    core::{
        energy::Leg,
        frontier::Frontier,
        scenario::Scenario,
        soc_grid::SocGrid,
        station::Station,
    },
    quantity::energy::KilowattHours,
};

/// Remedial actions offered to the user, filtered to those that plausibly
/// address the identified causes.
#[derive(EnumSetType, Debug, Serialize, Deserialize)]
#[enumset(serialize_repr = "list")]
#[serde(rename_all = "snake_case")]
pub enum Suggestion {
    EnableReplenishment,
    RaiseBatteryCapacity,
    LowerFinalSocRequirement,
    WidenOperatingHours,
    IncreaseContainerStock,
    RaiseChargingPower,
    ExtendMaxDwell,
    CoarsenSocStep,
}

/// A segment that every surviving state failed to cross.
#[derive(Clone, Debug, Serialize)]
pub struct SegmentBottleneck {
    pub segment_index: usize,
    pub from: String,
    pub to: String,
    pub energy_required: KilowattHours,
    pub battery_capacity: KilowattHours,

    /// No full battery could cross this segment at all.
    pub exceeds_capacity: bool,

    /// Whether any station up to and including the segment start can replenish.
    pub replenishment_upstream: bool,
}

/// Whole-journey energy accounting.
#[derive(Clone, Debug, Serialize)]
pub struct EnergyBudget {
    pub total_segment_energy: KilowattHours,

    /// Charge the vessel may spend without replenishing:
    /// initial SoC minus the required final SoC.
    pub spendable: KilowattHours,

    /// Set when the journey cannot be completed on the initial charge alone.
    pub deficit: Option<KilowattHours>,

    /// Stations that can actually swap or charge.
    pub replenishment_stations: Vec<String>,

    /// Deficit with no replenishment anywhere: infeasible regardless of schedule.
    pub catastrophic: bool,
}

/// Configuration smells that pass validation but commonly explain infeasibility.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Contradiction {
    /// Swap capability advertised with no charged containers in stock.
    SwapWithoutStock { station: String },

    /// Charging capability advertised with zero connection power.
    ChargingWithoutPower { station: String },

    /// Operating window of zero length; the station can never serve.
    EmptyOperatingWindow { station: String },

    /// Peak window of zero length; if "no peak" was intended, omit the window.
    EmptyPeakWindow { station: String },

    /// The operating window is shorter than the unavoidable queue time.
    WindowShorterThanQueue { station: String },

    /// The berth mandates a swap it can never perform.
    SwapRequiredWithoutService { station: String },
}

/// The solve hit the frontier-size safety cap: the SoC/time grid is too fine
/// for this scenario.
#[derive(Clone, Debug, Serialize)]
pub struct FrontierOverflow {
    pub station: String,
    pub states: usize,
    pub cap: usize,
}

/// Structured post-mortem of an infeasible (or resource-exhausted) solve.
#[derive(Clone, Debug, Serialize)]
pub struct DiagnosticReport {
    /// Whether any state reached the terminus at all.
    pub terminus_reached: bool,

    pub reachable_terminal_states: usize,

    /// Best final SoC over all terminal states, when any exist.
    pub best_final_soc: Option<KilowattHours>,

    pub required_final_soc: KilowattHours,

    /// `required − best achievable`, when the terminus was reached short.
    pub shortfall: Option<KilowattHours>,

    pub bottlenecks: Vec<SegmentBottleneck>,
    pub energy_budget: EnergyBudget,
    pub contradictions: Vec<Contradiction>,
    pub frontier_overflow: Option<FrontierOverflow>,
    pub suggestions: EnumSet<Suggestion>,
}

/// Post-mortem over the partial state spaces of a failed solve.
///
/// `frontiers` may be shorter than the route when the sweep aborted early
/// (frontier overflow); every scan degrades gracefully to the stations it saw.
pub(crate) fn build_report(
    scenario: &Scenario,
    grid: &SocGrid,
    legs: &[Leg],
    frontiers: &[Frontier],
    frontier_overflow: Option<FrontierOverflow>,
) -> DiagnosticReport {
    let terminal = frontiers.get(scenario.stations.len() - 1);
    let reachable_terminal_states = terminal.map_or(0, Frontier::len);
    let terminus_reached = reachable_terminal_states > 0;
    let best_final_soc =
        terminal.and_then(Frontier::best_level).map(|level| grid.energy(level));
    let shortfall = best_final_soc
        .filter(|best| *best < scenario.final_soc_required)
        .map(|best| scenario.final_soc_required - best);

    let bottlenecks = scan_bottlenecks(scenario, legs, frontiers);
    let energy_budget = energy_budget(scenario, legs);
    let contradictions = scan_contradictions(scenario);
    let suggestions = suggest(
        scenario,
        &bottlenecks,
        &energy_budget,
        &contradictions,
        shortfall,
        frontier_overflow.is_some(),
    );

    DiagnosticReport {
        terminus_reached,
        reachable_terminal_states,
        best_final_soc,
        required_final_soc: scenario.final_soc_required,
        shortfall,
        bottlenecks,
        energy_budget,
        contradictions,
        frontier_overflow,
        suggestions,
    }
}

fn scan_bottlenecks(
    scenario: &Scenario,
    legs: &[Leg],
    frontiers: &[Frontier],
) -> Vec<SegmentBottleneck> {
    legs.iter()
        .enumerate()
        .filter(|(index, _)| {
            let before = frontiers.get(*index).map_or(0, Frontier::len);
            let after = frontiers.get(index + 1).map_or(0, Frontier::len);
            before > 0 && after == 0 && frontiers.len() > index + 1
        })
        .map(|(index, leg)| SegmentBottleneck {
            segment_index: index,
            from: scenario.stations[index].id.clone(),
            to: scenario.stations[index + 1].id.clone(),
            energy_required: leg.energy,
            battery_capacity: scenario.battery_capacity,
            exceeds_capacity: leg.energy > scenario.battery_capacity,
            replenishment_upstream: scenario.stations[..=index]
                .iter()
                .any(|station| station.can_swap() || station.can_charge()),
        })
        .collect()
}

fn energy_budget(scenario: &Scenario, legs: &[Leg]) -> EnergyBudget {
    let total_segment_energy: KilowattHours = legs.iter().map(|leg| leg.energy).sum();
    let spendable = scenario.initial_soc - scenario.final_soc_required;
    let deficit = (total_segment_energy > spendable)
        .then(|| total_segment_energy - spendable);
    let replenishment_stations = scenario
        .stations
        .iter()
        .filter(|station| station.can_swap() || station.can_charge())
        .map(|station| station.id.clone())
        .collect_vec();
    let catastrophic = deficit.is_some() && replenishment_stations.is_empty();
    EnergyBudget {
        total_segment_energy,
        spendable,
        deficit,
        replenishment_stations,
        catastrophic,
    }
}

fn scan_contradictions(scenario: &Scenario) -> Vec<Contradiction> {
    let mut found = Vec::new();
    for station in &scenario.stations {
        let id = || station.id.clone();
        if station.swap_allowed && station.charged_stock == 0 {
            found.push(Contradiction::SwapWithoutStock { station: id() });
        }
        if station.charging_allowed && !station.can_charge() {
            found.push(Contradiction::ChargingWithoutPower { station: id() });
        }
        if let Some(window) = &station.operating_hours {
            if window.is_empty() {
                found.push(Contradiction::EmptyOperatingWindow { station: id() });
            } else if window.length() < station.queue_time {
                found.push(Contradiction::WindowShorterThanQueue { station: id() });
            }
        }
        if station.tariff.peak.is_some_and(|peak| peak.window.is_empty()) {
            found.push(Contradiction::EmptyPeakWindow { station: id() });
        }
        if station.swap_required && !station.can_swap() {
            found.push(Contradiction::SwapRequiredWithoutService { station: id() });
        }
    }
    found
}

fn suggest(
    scenario: &Scenario,
    bottlenecks: &[SegmentBottleneck],
    energy_budget: &EnergyBudget,
    contradictions: &[Contradiction],
    shortfall: Option<KilowattHours>,
    overflowed: bool,
) -> EnumSet<Suggestion> {
    let mut suggestions = EnumSet::new();

    if overflowed {
        suggestions |= Suggestion::CoarsenSocStep;
    }
    for bottleneck in bottlenecks {
        if bottleneck.exceeds_capacity {
            suggestions |= Suggestion::RaiseBatteryCapacity;
        }
        if !bottleneck.replenishment_upstream {
            suggestions |= Suggestion::EnableReplenishment;
        }
    }
    if energy_budget.deficit.is_some() {
        if energy_budget.replenishment_stations.is_empty() {
            suggestions |= Suggestion::EnableReplenishment | Suggestion::RaiseBatteryCapacity;
        }
        if scenario.final_soc_required > KilowattHours::ZERO {
            suggestions |= Suggestion::LowerFinalSocRequirement;
        }
    }
    if shortfall.is_some() {
        suggestions |= Suggestion::LowerFinalSocRequirement;
        if scenario.stations.iter().any(|station| {
            station.swap_allowed && station.charged_stock < station.container_count
        }) {
            suggestions |= Suggestion::IncreaseContainerStock;
        }
        if scenario.stations.iter().any(Station::can_charge) {
            suggestions |= Suggestion::RaiseChargingPower;
            if scenario
                .stations
                .iter()
                .any(|station| station.can_charge() && station.max_dwell.is_some())
            {
                suggestions |= Suggestion::ExtendMaxDwell;
            }
        }
    }
    if contradictions.iter().any(|contradiction| {
        matches!(
            contradiction,
            Contradiction::EmptyOperatingWindow { .. }
                | Contradiction::WindowShorterThanQueue { .. },
        )
    }) {
        suggestions |= Suggestion::WidenOperatingHours;
    }
    if contradictions
        .iter()
        .any(|contradiction| matches!(contradiction, Contradiction::SwapWithoutStock { .. }))
    {
        suggestions |= Suggestion::IncreaseContainerStock;
    }
    if contradictions
        .iter()
        .any(|contradiction| matches!(contradiction, Contradiction::ChargingWithoutPower { .. }))
    {
        suggestions |= Suggestion::RaiseChargingPower;
    }

    suggestions
}

impl Display for DiagnosticReport {
    /// Canonical text rendering; the structured fields remain the API.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.terminus_reached {
            writeln!(
                f,
                "terminus reached by {} state(s); best final SoC {} of required {}",
                self.reachable_terminal_states,
                self.best_final_soc.unwrap_or(KilowattHours::ZERO),
                self.required_final_soc,
            )?;
            if let Some(shortfall) = self.shortfall {
                writeln!(f, "shortfall: {shortfall}")?;
            }
        } else {
            writeln!(f, "terminus unreachable")?;
        }

        for bottleneck in &self.bottlenecks {
            writeln!(
                f,
                "bottleneck on segment #{} {} -> {}: requires {} of {} capacity{}{}",
                bottleneck.segment_index,
                bottleneck.from,
                bottleneck.to,
                bottleneck.energy_required,
                bottleneck.battery_capacity,
                if bottleneck.exceeds_capacity { " (exceeds capacity)" } else { "" },
                if bottleneck.replenishment_upstream {
                    ""
                } else {
                    " (no replenishment before it)"
                },
            )?;
        }

        let budget = &self.energy_budget;
        writeln!(
            f,
            "energy budget: journey needs {}, spendable without replenishment {}",
            budget.total_segment_energy, budget.spendable,
        )?;
        if let Some(deficit) = budget.deficit {
            writeln!(f, "deficit: {deficit}")?;
        }
        if budget.catastrophic {
            writeln!(f, "no station can replenish: infeasible regardless of schedule")?;
        } else if !budget.replenishment_stations.is_empty() {
            writeln!(
                f,
                "replenishment available at: {}",
                budget.replenishment_stations.iter().join(", "),
            )?;
        }

        for contradiction in &self.contradictions {
            writeln!(f, "configuration: {contradiction:?}")?;
        }
        if let Some(overflow) = &self.frontier_overflow {
            writeln!(
                f,
                "state space blew past {} states at station {}: precision too fine or scenario \
                 too large",
                overflow.cap, overflow.station,
            )?;
        }
        if !self.suggestions.is_empty() {
            writeln!(f, "suggestions: {}", self.suggestions.iter().map(|s| format!("{s:?}")).join(", "))?;
        }
        Ok(())
    }
}
