use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Instant,
};

use bon::Builder;

use crate::{
    core::{
        action::Action,
        diagnostic::{self, FrontierOverflow},
        energy::{Leg, plan_legs},
        frontier::Frontier,
        outcome::Outcome,
        plan::{Plan, PlanStep},
        scenario::{ConfigError, Scenario},
        soc_grid::{SocGrid, SocLevel},
        state::{BerthCall, StateKey, StateRecord},
        station::Station,
        swap::exchange_depleted_first,
    },
    ops::ClockTime,
    prelude::*,
    quantity::{cost::Cost, energy::KilowattHours, time::Hours},
};

/// Comparison slack for berth-time and dwell checks.
const EPSILON: f64 = 1e-9;

/// Forward-sweep dynamic program over `(SoC level, arrival time)` states.
///
/// For each station the solver keeps a pruned frontier of non-dominated states,
/// enumerates every legal berth action, prices it, traverses the outgoing leg
/// and merges the results into the next frontier. Identical inputs produce
/// identical plans: enumeration and merging are fully deterministic.
#[derive(Builder)]
pub struct Solver<'a> {
    scenario: &'a Scenario,

    /// Width of the arrival-time buckets keying the frontier. Finer buckets
    /// track arrival times more precisely at the price of a larger state space.
    #[builder(default = Hours(0.1))]
    time_bucket: Hours,

    /// Safety cap on a single station's frontier; exceeding it aborts the solve
    /// with a resource-exhaustion diagnostic.
    #[builder(default = 50_000)]
    max_frontier_states: usize,

    /// Cooperative cancellation flag, observed between expansions.
    cancel: Option<&'a AtomicBool>,
}

/// One legal berth action with its service time and resulting on-grid SoC.
struct Candidate {
    action: Action,
    level_after: SocLevel,

    /// Queueing, handling and charging; excludes any wait for opening hours.
    service: Hours,

    /// SoC-based billable energy: swap delta plus grid charge.
    billable: KilowattHours,
    grid_charge: KilowattHours,
}

struct BerthTiming {
    wait: Hours,
    dwell: Hours,
}

impl Solver<'_> {
    /// Run the solve to completion, cancellation, or a diagnosed dead end.
    #[instrument(skip_all)]
    pub fn solve(self) -> Result<Outcome, ConfigError> {
        self.scenario.validate()?;
        let start_instant = Instant::now();

        let scenario = self.scenario;
        let grid = SocGrid::new(scenario.soc_step, scenario.battery_capacity);
        let legs = plan_legs(scenario);
        let min_level_steps = grid.ceil_steps(scenario.min_soc);
        info!(
            stations = scenario.stations.len(),
            soc_levels = grid.top().0 + 1,
            "optimizing…",
        );

        let mut frontiers = Vec::with_capacity(scenario.stations.len());
        let mut origin = Frontier::new();
        origin.insert(
            StateKey { level: grid.floor(scenario.initial_soc), bucket: 0 },
            StateRecord {
                cost: Cost::ZERO,
                elapsed: Hours::ZERO,
                predecessor: None,
                berth: None,
            },
        );
        frontiers.push(origin);

        for (index, leg) in legs.iter().enumerate() {
            let station = &scenario.stations[index];
            let mut next = Frontier::new();

            for (key, record) in frontiers[index].iter_sorted() {
                if self.cancelled() {
                    info!("cancelled");
                    return Ok(Outcome::Cancelled);
                }
                self.expand_state(station, leg, &grid, min_level_steps, key, record, &mut next);
            }

            debug!(station = station.id.as_str(), states = next.len(), "stage expanded");
            if next.len() > self.max_frontier_states {
                let overflow = FrontierOverflow {
                    station: scenario.stations[index + 1].id.clone(),
                    states: next.len(),
                    cap: self.max_frontier_states,
                };
                warn!(states = overflow.states, cap = overflow.cap, "frontier overflow, aborting");
                let report =
                    diagnostic::build_report(scenario, &grid, &legs, &frontiers, Some(overflow));
                return Ok(Outcome::Infeasible(report));
            }
            frontiers.push(next);
        }

        if self.cancelled() {
            info!("cancelled");
            return Ok(Outcome::Cancelled);
        }

        let required_level_steps = grid.ceil_steps(scenario.final_soc_required);
        let terminal = frontiers
            .last()
            .expect("the route has at least two stations")
            .iter_sorted()
            .filter(|(key, _)| key.level.0 >= required_level_steps)
            .min_by_key(|(key, record)| (record.cost, record.elapsed, *key))
            .map(|(key, _)| key);

        let outcome = match terminal {
            Some(key) => {
                info!(elapsed = ?start_instant.elapsed(), "optimized");
                Outcome::Plan(self.extract_plan(&grid, &frontiers, key))
            }
            None => {
                info!(elapsed = ?start_instant.elapsed(), "infeasible");
                Outcome::Infeasible(diagnostic::build_report(
                    scenario, &grid, &legs, &frontiers, None,
                ))
            }
        };
        Ok(outcome)
    }

    fn cancelled(&self) -> bool {
        self.cancel.is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Apply every legal berth action to one state and merge the successors
    /// into the next station's frontier.
    #[expect(clippy::too_many_arguments)]
    fn expand_state(
        &self,
        station: &Station,
        leg: &Leg,
        grid: &SocGrid,
        min_level_steps: usize,
        key: StateKey,
        record: &StateRecord,
        next: &mut Frontier,
    ) {
        let arrival_clock = self.scenario.departure + record.elapsed;
        let soc_arriving = grid.energy(key.level);
        let leg_steps = grid.ceil_steps(leg.energy);

        for candidate in self.enumerate_candidates(station, key.level, grid) {
            let Some(timing) = berth_timing(station, arrival_clock, candidate.service) else {
                continue;
            };
            let Some(level_after_leg) = candidate.level_after.checked_sub(leg_steps) else {
                continue;
            };
            if level_after_leg.0 < min_level_steps {
                continue;
            }

            let breakdown = station.tariff.assess(
                candidate.action.containers(),
                candidate.billable,
                candidate.grid_charge,
                arrival_clock,
                timing.dwell,
                station.hotelling_power,
            );
            let elapsed = record.elapsed + timing.dwell + leg.travel_time;
            let berth = BerthCall {
                action: candidate.action,
                wait: timing.wait,
                dwell: timing.dwell,
                arrival_clock,
                departure_clock: arrival_clock + timing.dwell,
                soc_arriving,
                soc_departing: grid.energy(candidate.level_after),
                breakdown,
                segment_energy: leg.energy,
                travel_time: leg.travel_time,
            };
            next.insert(
                StateKey { level: level_after_leg, bucket: self.bucket(elapsed) },
                StateRecord {
                    cost: record.cost + breakdown.total,
                    elapsed,
                    predecessor: Some(key),
                    berth: Some(berth),
                },
            );
        }
    }

    /// Legal actions at a station given the arriving SoC level, in deterministic
    /// order: idle, swaps by ascending container count, charges by ascending
    /// energy, then hybrid combinations.
    fn enumerate_candidates(
        &self,
        station: &Station,
        level: SocLevel,
        grid: &SocGrid,
    ) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        let soc = grid.energy(level);
        let fits =
            |service: Hours| station.max_dwell.is_none_or(|cap| service <= cap + Hours(EPSILON));

        if !station.swap_required && fits(station.queue_time) {
            candidates.push(Candidate {
                action: Action::Idle,
                level_after: level,
                service: station.queue_time,
                billable: KilowattHours::ZERO,
                grid_charge: KilowattHours::ZERO,
            });
        }

        if station.can_swap() {
            for containers in swap_counts(station) {
                let service = station.queue_time
                    + station.swap_time_per_container * f64::from(containers);
                if !fits(service) {
                    break;
                }
                let exchange = exchange_depleted_first(
                    soc,
                    station.container_capacity,
                    station.container_count,
                    containers,
                );
                candidates.push(Candidate {
                    action: Action::Swap { containers },
                    level_after: grid.floor(exchange.soc_after),
                    service,
                    billable: exchange.energy,
                    grid_charge: KilowattHours::ZERO,
                });
            }
        }

        if station.can_charge() && !station.swap_required {
            for target in (level.0 + 1)..=grid.top().0 {
                let energy = grid.energy(SocLevel(target)) - soc;
                let service = station.queue_time + energy / station.charging_power;
                if !fits(service) {
                    break;
                }
                candidates.push(Candidate {
                    action: Action::Charge { energy },
                    level_after: SocLevel(target),
                    service,
                    billable: energy,
                    grid_charge: energy,
                });
            }
        }

        if self.scenario.allow_hybrid_swap_and_charge
            && station.can_swap()
            && station.can_charge()
        {
            for containers in swap_counts(station) {
                let swap_service = station.queue_time
                    + station.swap_time_per_container * f64::from(containers);
                if !fits(swap_service) {
                    break;
                }
                let exchange = exchange_depleted_first(
                    soc,
                    station.container_capacity,
                    station.container_count,
                    containers,
                );
                let base = grid.floor(exchange.soc_after);
                for target in (base.0 + 1)..=grid.top().0 {
                    let energy = grid.energy(SocLevel(target)) - grid.energy(base);
                    let service = swap_service + energy / station.charging_power;
                    if !fits(service) {
                        break;
                    }
                    candidates.push(Candidate {
                        action: Action::SwapCharge { containers, energy },
                        level_after: SocLevel(target),
                        service,
                        billable: exchange.energy + energy,
                        grid_charge: energy,
                    });
                }
            }
        }

        candidates
    }

    #[expect(clippy::cast_possible_truncation)]
    #[expect(clippy::cast_sign_loss)]
    fn bucket(&self, elapsed: Hours) -> u32 {
        ((elapsed / self.time_bucket) + EPSILON).floor() as u32
    }

    /// Walk the backpointer chain from the selected terminal state and
    /// materialize the journey plan in route order.
    fn extract_plan(&self, grid: &SocGrid, frontiers: &[Frontier], terminal: StateKey) -> Plan {
        let scenario = self.scenario;
        let last = scenario.stations.len() - 1;
        let terminal_record =
            frontiers[last].get(terminal).expect("the terminal state was just selected");

        let mut steps = Vec::with_capacity(last);
        let mut key = terminal;
        for index in (1..=last).rev() {
            let record = frontiers[index].get(key).expect("backpointer chain is complete");
            let berth = record.berth.as_ref().expect("non-origin records carry a berth call");
            let predecessor =
                record.predecessor.expect("non-origin records have a predecessor");
            let arrival_elapsed = frontiers[index - 1]
                .get(predecessor)
                .expect("backpointer chain is complete")
                .elapsed;
            steps.push(PlanStep {
                station: scenario.stations[index - 1].id.clone(),
                arrival_clock: berth.arrival_clock,
                arrival_elapsed,
                soc_arriving: berth.soc_arriving,
                action: berth.action,
                containers_swapped: berth.action.containers(),
                energy_charged: berth.action.grid_charge(),
                wait: berth.wait,
                dwell: berth.dwell,
                soc_departing: berth.soc_departing,
                departure_clock: berth.departure_clock,
                segment_energy: berth.segment_energy,
                travel_time: berth.travel_time,
                cost: berth.breakdown,
            });
            key = predecessor;
        }
        steps.reverse();

        Plan::from_steps(
            steps,
            scenario.departure + terminal_record.elapsed,
            terminal_record.elapsed,
            grid.energy(terminal.level),
        )
    }
}

/// Legal container counts for one exchange, ascending.
#[expect(clippy::reversed_empty_ranges)]
fn swap_counts(station: &Station) -> std::ops::RangeInclusive<u32> {
    if station.partial_swap_allowed {
        1..=station.max_swappable()
    } else if station.max_swappable() >= station.container_count {
        // Full-bank exchange only:
        station.container_count..=station.container_count
    } else {
        1..=0
    }
}

/// Fit the berth call into the station's operating window.
///
/// An arrival before opening waits for the window; a service that would cross
/// the closing hour is rejected outright.
fn berth_timing(station: &Station, arrival: ClockTime, service: Hours) -> Option<BerthTiming> {
    let Some(window) = &station.operating_hours else {
        return Some(BerthTiming { wait: Hours::ZERO, dwell: service });
    };
    if window.is_empty() {
        return None;
    }
    let (wait, service_start) = if window.contains(arrival) {
        (Hours::ZERO, arrival)
    } else {
        (arrival.until(window.opening()), window.opening())
    };
    if service > window.remaining_from(service_start) + Hours(EPSILON) {
        return None;
    }
    Some(BerthTiming { wait, dwell: wait + service })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{
            diagnostic::Suggestion,
            station::{CurrentSign, PeakWindow, Tariff},
        },
        ops::HourWindow,
        quantity::{
            distance::NauticalMiles,
            power::Kilowatts,
            rate::{KilowattHourRate, KilowattHoursPerMile},
            speed::Knots,
        },
    };

    fn waypoint(id: &str, dist_to_next: f64) -> Station {
        Station::builder().id(id).dist_to_next(NauticalMiles(dist_to_next)).build()
    }

    fn terminus(id: &str) -> Station {
        Station::builder().id(id).build()
    }

    fn scenario(stations: Vec<Station>) -> Scenario {
        Scenario::builder()
            .stations(stations)
            .battery_capacity(KilowattHours(100.0))
            .initial_soc(KilowattHours(100.0))
            .final_soc_required(KilowattHours(10.0))
            .departure(ClockTime::MIDNIGHT)
            .cruise_speed(Knots(10.0))
            .base_consumption(KilowattHoursPerMile(1.0))
            .soc_step(KilowattHours(1.0))
            .build()
    }

    fn solve(scenario: &Scenario) -> Outcome {
        Solver::builder().scenario(scenario).build().solve().unwrap()
    }

    fn solved_plan(scenario: &Scenario) -> Plan {
        match solve(scenario) {
            Outcome::Plan(plan) => plan,
            outcome => panic!("expected a plan, got {outcome:?}"),
        }
    }

    fn diagnostic(scenario: &Scenario) -> crate::core::diagnostic::DiagnosticReport {
        match solve(scenario) {
            Outcome::Infeasible(report) => report,
            outcome => panic!("expected a diagnostic, got {outcome:?}"),
        }
    }

    /// P1–P5 of the plan contract.
    fn assert_plan_invariants(scenario: &Scenario, plan: &Plan) {
        for step in &plan.steps {
            assert!(step.soc_arriving >= scenario.min_soc - KilowattHours(1e-9));
            assert!(step.soc_departing <= scenario.battery_capacity + KilowattHours(1e-9));
            if let Some(window) = &scenario
                .stations
                .iter()
                .find(|station| station.id == step.station)
                .unwrap()
                .operating_hours
            {
                // Either the arrival lies inside the window or the wait is explicit:
                assert!(window.contains(step.arrival_clock) || step.wait > Hours::ZERO);
            }
        }
        assert!(plan.arrival_soc >= scenario.final_soc_required - KilowattHours(1e-9));
        let total: Cost = plan.steps.iter().map(|step| step.cost.total).sum();
        assert!((plan.total_cost - total).0.abs() < 1e-6);
        let swaps =
            u32::try_from(plan.steps.iter().filter(|step| step.action.is_swap()).count())
                .unwrap();
        assert_eq!(plan.swap_count, swaps);
    }

    #[test]
    fn trivial_single_segment_needs_no_replenishment() {
        let scenario = scenario(vec![waypoint("A", 10.0), terminus("B")]);
        let plan = solved_plan(&scenario);

        assert_eq!(plan.steps.len(), 1);
        assert_eq!(plan.steps[0].action, Action::Idle);
        assert_eq!(plan.swap_count, 0);
        assert_eq!(plan.total_cost, Cost::ZERO);
        assert_eq!(plan.arrival_soc, KilowattHours(90.0));
        assert_eq!(plan.total_journey_hours, Hours(1.0));
        assert_plan_invariants(&scenario, &plan);
    }

    fn swap_station(id: &str, dist_to_next: f64) -> Station {
        Station::builder()
            .id(id)
            .dist_to_next(NauticalMiles(dist_to_next))
            .swap_allowed(true)
            .partial_swap_allowed(true)
            .container_count(2)
            .container_capacity(KilowattHours(50.0))
            .charged_stock(2)
            .tariff(
                Tariff::builder()
                    .swap_cost_per_container(Cost(50.0))
                    .energy_cost_per_kwh(KilowattHourRate(0.25))
                    .build(),
            )
            .build()
    }

    fn forced_swap_scenario(final_soc: f64) -> Scenario {
        let mut scenario =
            scenario(vec![waypoint("A", 50.0), swap_station("B", 50.0), terminus("C")]);
        scenario.min_soc = KilowattHours(20.0);
        scenario.final_soc_required = KilowattHours(final_soc);
        scenario.soc_step = KilowattHours(5.0);
        scenario
    }

    #[test]
    fn depleted_leg_forces_a_single_swap() {
        let scenario = forced_swap_scenario(20.0);
        let plan = solved_plan(&scenario);

        assert_eq!(plan.swap_count, 1);
        // One container covers the deficit; the second would only add fees:
        assert_eq!(plan.steps[1].action, Action::Swap { containers: 1 });
        assert_eq!(plan.steps[1].soc_arriving, KilowattHours(50.0));
        assert_eq!(plan.steps[1].soc_departing, KilowattHours(100.0));
        // 1 × $50 handling + 50 kWh × $0.25 billed on the SoC delta:
        assert_eq!(plan.total_cost, Cost(62.5));
        assert_eq!(plan.arrival_soc, KilowattHours(50.0));
        assert_plan_invariants(&scenario, &plan);
    }

    #[test]
    fn soc_based_billing_charges_the_delta_not_the_nominal_capacity() {
        // A stricter terminal requirement forces both containers out:
        let mut scenario = forced_swap_scenario(45.0);
        scenario.initial_soc = KilowattHours(80.0);
        let plan = solved_plan(&scenario);

        assert_eq!(plan.steps[1].action, Action::Swap { containers: 2 });
        // Arriving at 30 kWh: one empty container (50 kWh) plus one at 30 (20 kWh):
        assert_eq!(plan.steps[1].cost.energy_fee, Cost(70.0 * 0.25));
        assert_plan_invariants(&scenario, &plan);
    }

    #[test]
    fn upstream_current_penalty_forces_the_swap() {
        let mut scenario = forced_swap_scenario(20.0);
        scenario.soc_step = KilowattHours(2.5);
        scenario.stations[1].current_sign = CurrentSign::Upstream;
        let plan = solved_plan(&scenario);

        // B -> C costs 50 × 1.25 = 62.5 kWh, so even a full battery at B
        // arrives with 37.5 kWh:
        assert_eq!(plan.steps[1].segment_energy, KilowattHours(62.5));
        assert!(plan.steps[1].action.is_swap());
        assert_eq!(plan.arrival_soc, KilowattHours(37.5));
        assert_plan_invariants(&scenario, &plan);
    }

    #[test]
    fn closed_station_adds_an_explicit_wait() {
        let mut scenario =
            scenario(vec![waypoint("A", 60.0), waypoint("B", 40.0), terminus("C")]);
        scenario.battery_capacity = KilowattHours(200.0);
        scenario.initial_soc = KilowattHours(200.0);
        scenario.final_soc_required = KilowattHours::ZERO;
        scenario.soc_step = KilowattHours(10.0);
        scenario.stations[1].operating_hours = Some(HourWindow::new(8.0, 22.0));
        scenario.stations[1].queue_time = Hours(1.0);
        let plan = solved_plan(&scenario);

        let at_b = &plan.steps[1];
        assert_eq!(at_b.arrival_clock, ClockTime::from_hour(6.0));
        assert_eq!(at_b.wait, Hours(2.0));
        assert_eq!(at_b.dwell, Hours(3.0));
        assert_eq!(at_b.departure_clock, ClockTime::from_hour(9.0));
        // The wait counts towards the linear journey time:
        assert_eq!(plan.total_journey_hours, Hours(13.0));
        assert_eq!(plan.arrival_clock_time, ClockTime::from_hour(13.0));
        assert_plan_invariants(&scenario, &plan);
    }

    fn peak_arbitrage_scenario(peak_multiplier: f64) -> Scenario {
        let swap_bank = |id: &str, dist: f64, fee: f64, peak: Option<PeakWindow>| {
            Station::builder()
                .id(id)
                .dist_to_next(NauticalMiles(dist))
                .swap_allowed(true)
                .container_count(1)
                .container_capacity(KilowattHours(100.0))
                .charged_stock(1)
                .tariff(Tariff {
                    base_service_fee: Cost(fee),
                    peak,
                    ..Tariff::default()
                })
                .build()
        };
        let peak = Some(
            PeakWindow::builder()
                .window(HourWindow::new(8.0, 18.0))
                .multiplier(peak_multiplier)
                .build(),
        );
        let mut scenario = scenario(vec![
            waypoint("A", 30.0),
            swap_bank("B", 10.0, 100.0, peak),
            swap_bank("B2", 50.0, 150.0, None),
            terminus("C"),
        ]);
        scenario.final_soc_required = KilowattHours(20.0);
        scenario.departure = ClockTime::from_hour(7.0);
        scenario
    }

    #[test]
    fn peak_surcharge_moves_the_swap_to_the_dearer_off_peak_station() {
        // Arrival at B falls at 10:00, inside its peak window. Doubling the
        // $100 fee beats B2's flat $150, so the plan swaps at B2 instead:
        let scenario = peak_arbitrage_scenario(2.0);
        let plan = solved_plan(&scenario);

        assert_eq!(plan.steps[1].action, Action::Idle);
        assert_eq!(plan.steps[2].action, Action::Swap { containers: 1 });
        assert_eq!(plan.total_cost, Cost(150.0));
        assert_plan_invariants(&scenario, &plan);

        // With a mild surcharge the peak station stays cheaper:
        let mild = peak_arbitrage_scenario(1.25);
        let plan = solved_plan(&mild);
        assert_eq!(plan.steps[1].action, Action::Swap { containers: 1 });
        assert_eq!(plan.total_cost, Cost(125.0));
    }

    fn charging_station(id: &str, dist_to_next: f64, power: f64) -> Station {
        Station::builder()
            .id(id)
            .dist_to_next(NauticalMiles(dist_to_next))
            .charging_allowed(true)
            .charging_power(Kilowatts(power))
            .tariff(
                Tariff::builder()
                    .energy_cost_per_kwh(KilowattHourRate(0.25))
                    .base_charging_fee(Cost(10.0))
                    .build(),
            )
            .build()
    }

    #[test]
    fn grid_charge_tops_up_exactly_to_the_requirement() {
        let mut scenario = scenario(vec![
            waypoint("A", 50.0),
            charging_station("B", 50.0, 100.0),
            terminus("C"),
        ]);
        scenario.final_soc_required = KilowattHours(30.0);
        scenario.soc_step = KilowattHours(5.0);
        let plan = solved_plan(&scenario);

        assert_eq!(plan.steps[1].action, Action::Charge { energy: KilowattHours(30.0) });
        assert_eq!(plan.steps[1].dwell, Hours(0.3));
        // 30 kWh × $0.25 plus the $10 connection fee:
        assert_eq!(plan.total_cost, Cost(17.5));
        assert_eq!(plan.arrival_soc, KilowattHours(30.0));
        assert_plan_invariants(&scenario, &plan);
    }

    #[test]
    fn hybrid_call_beats_either_action_alone_under_a_berth_cap() {
        let mut scenario = scenario(vec![
            waypoint("A", 50.0),
            swap_station("B", 50.0),
            terminus("C"),
        ]);
        scenario.allow_hybrid_swap_and_charge = true;
        scenario.initial_soc = KilowattHours(80.0);
        scenario.final_soc_required = KilowattHours(45.0);
        scenario.soc_step = KilowattHours(5.0);
        let station = &mut scenario.stations[1];
        station.charged_stock = 1;
        station.charging_allowed = true;
        station.charging_power = Kilowatts(50.0);
        station.swap_time_per_container = Hours(0.2);
        station.max_dwell = Some(Hours(1.0));
        let plan = solved_plan(&scenario);

        // Arriving at 30 kWh with one charged container in stock: the swap alone
        // only reaches 80 kWh, a pure charge cannot finish within the berth cap,
        // and swap-then-charge tops up just enough to land on the requirement:
        assert_eq!(
            plan.steps[1].action,
            Action::SwapCharge { containers: 1, energy: KilowattHours(15.0) },
        );
        assert_eq!(plan.steps[1].soc_departing, KilowattHours(95.0));
        assert_eq!(plan.arrival_soc, KilowattHours(45.0));
        assert_plan_invariants(&scenario, &plan);
    }

    #[test]
    fn bottleneck_segment_is_reported_with_suggestions() {
        let mut scenario =
            scenario(vec![waypoint("A", 100.0), waypoint("B", 600.0), terminus("C")]);
        scenario.battery_capacity = KilowattHours(500.0);
        scenario.initial_soc = KilowattHours(500.0);
        scenario.final_soc_required = KilowattHours::ZERO;
        scenario.soc_step = KilowattHours(25.0);
        let report = diagnostic(&scenario);

        assert!(!report.terminus_reached);
        assert_eq!(report.bottlenecks.len(), 1);
        let bottleneck = &report.bottlenecks[0];
        assert_eq!(bottleneck.segment_index, 1);
        assert_eq!(bottleneck.from, "B");
        assert_eq!(bottleneck.to, "C");
        assert!(bottleneck.exceeds_capacity);
        assert!(!bottleneck.replenishment_upstream);
        assert!(report.energy_budget.catastrophic);
        assert!(report.suggestions.contains(Suggestion::EnableReplenishment));
        assert!(report.suggestions.contains(Suggestion::RaiseBatteryCapacity));
    }

    #[test]
    fn terminal_shortfall_is_quantified() {
        let mut scenario = scenario(vec![waypoint("A", 50.0), terminus("B")]);
        scenario.final_soc_required = KilowattHours(60.0);
        let report = diagnostic(&scenario);

        assert!(report.terminus_reached);
        assert_eq!(report.best_final_soc, Some(KilowattHours(50.0)));
        assert_eq!(report.shortfall, Some(KilowattHours(10.0)));
        assert!(
            report
                .suggestions
                .contains(Suggestion::LowerFinalSocRequirement)
        );
    }

    #[test]
    fn cancellation_short_circuits_the_sweep() {
        let scenario = scenario(vec![waypoint("A", 10.0), terminus("B")]);
        let cancel = AtomicBool::new(true);
        let outcome =
            Solver::builder().scenario(&scenario).cancel(&cancel).build().solve().unwrap();
        assert!(matches!(outcome, Outcome::Cancelled));
    }

    #[test]
    fn frontier_overflow_recommends_a_coarser_grid() {
        let scenario = scenario(vec![
            waypoint("A", 50.0),
            charging_station("B", 50.0, 100.0),
            terminus("C"),
        ]);
        let outcome = Solver::builder()
            .scenario(&scenario)
            .max_frontier_states(2)
            .build()
            .solve()
            .unwrap();
        let report = match outcome {
            Outcome::Infeasible(report) => report,
            outcome => panic!("expected a diagnostic, got {outcome:?}"),
        };
        let overflow = report.frontier_overflow.expect("the frontier must overflow");
        assert_eq!(overflow.cap, 2);
        assert!(report.suggestions.contains(Suggestion::CoarsenSocStep));
    }

    #[test]
    fn contradictory_configuration_fails_before_solving() {
        let mut scenario = scenario(vec![waypoint("A", 10.0), terminus("B")]);
        scenario.min_soc = KilowattHours(150.0);
        let error = Solver::builder().scenario(&scenario).build().solve().unwrap_err();
        assert_eq!(error, ConfigError::MinSocAboveCapacity);
    }

    #[test]
    fn raising_the_final_requirement_never_lowers_the_cost() {
        let lax = solved_plan(&forced_swap_scenario(20.0)).total_cost;
        let strict = solved_plan(&forced_swap_scenario(45.0)).total_cost;
        assert!(strict >= lax);
    }

    #[test]
    fn enabling_replenishment_never_raises_the_cost() {
        let scenario = peak_arbitrage_scenario(2.0);
        let with_both = solved_plan(&scenario).total_cost;

        let mut only_b2 = peak_arbitrage_scenario(2.0);
        only_b2.stations[1].swap_allowed = false;
        let restricted = solved_plan(&only_b2).total_cost;

        assert!(with_both <= restricted);

        // And when the extra station is the cheap one, the cost strictly drops:
        let mut cheap_b = peak_arbitrage_scenario(2.0);
        cheap_b.stations[1].tariff.base_service_fee = Cost(25.0);
        cheap_b.stations[1].tariff.peak = None;
        assert!(solved_plan(&cheap_b).total_cost < restricted);
    }

    #[test]
    fn refining_the_grid_never_raises_the_cost_beyond_tolerance() {
        let coarse = forced_swap_scenario(20.0);
        let mut fine = forced_swap_scenario(20.0);
        fine.soc_step = KilowattHours(2.5);

        let coarse_cost = solved_plan(&coarse).total_cost;
        let fine_cost = solved_plan(&fine).total_cost;

        let tolerance = coarse.soc_step.0
            * coarse.stations[1].tariff.energy_cost_per_kwh.0
            * coarse.stations.len() as f64;
        assert!(fine_cost.0 <= coarse_cost.0 + tolerance);
    }

    #[test]
    fn identical_inputs_yield_byte_identical_plans() {
        let scenario = peak_arbitrage_scenario(2.0);
        let first = serde_json::to_string(&solved_plan(&scenario)).unwrap();
        let second = serde_json::to_string(&solved_plan(&scenario)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn swap_required_station_rules_out_idling_through() {
        let mut scenario =
            scenario(vec![waypoint("A", 10.0), swap_station("B", 10.0), terminus("C")]);
        scenario.stations[1].swap_required = true;
        scenario.soc_step = KilowattHours(5.0);
        let plan = solved_plan(&scenario);

        // Idling through B would be free, but the berth mandates an exchange:
        assert!(plan.steps[1].action.is_swap());
        assert!(plan.total_cost > Cost::ZERO);
        assert_plan_invariants(&scenario, &plan);
    }
}
