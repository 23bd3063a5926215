use itertools::Itertools;
use rustc_hash::FxHashMap;

use crate::{
    core::{
        soc_grid::SocLevel,
        state::{StateKey, StateRecord},
    },
    quantity::{cost::Cost, time::Hours},
};

/// Comparison slack for costs and times during dominance checks.
const EPSILON: f64 = 1e-9;

/// Set of non-dominated states reachable at one station.
///
/// A state dominates another when it is no worse on SoC, arrival time and cost,
/// and strictly better on at least one. Dominated states are dropped on insert,
/// which keeps the frontier (and with it the whole solve) bounded.
#[derive(Default)]
pub struct Frontier {
    states: FxHashMap<StateKey, StateRecord>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    #[must_use]
    pub fn get(&self, key: StateKey) -> Option<&StateRecord> {
        self.states.get(&key)
    }

    /// Insert a candidate state, enforcing the dominance rule.
    ///
    /// Returns whether the candidate survived. The outcome is independent of
    /// map iteration order: a candidate is kept iff no incumbent dominates it,
    /// and every incumbent it dominates is dropped. Exact ties keep the
    /// incumbent, so earlier-enumerated actions win deterministically.
    pub fn insert(&mut self, key: StateKey, record: StateRecord) -> bool {
        if let Some(incumbent) = self.states.get(&key) {
            let better_cost = record.cost < incumbent.cost - Cost(EPSILON);
            let same_cost = (record.cost - incumbent.cost).0.abs() <= EPSILON;
            let earlier = record.elapsed < incumbent.elapsed - Hours(EPSILON);
            if !(better_cost || (same_cost && earlier)) {
                return false;
            }
            self.states.insert(key, record);
            return true;
        }

        let dominated_by_incumbent = self.states.iter().any(|(incumbent_key, incumbent)| {
            dominates(
                (incumbent_key.level, incumbent.elapsed, incumbent.cost),
                (key.level, record.elapsed, record.cost),
            )
        });
        if dominated_by_incumbent {
            return false;
        }

        let losers = self
            .states
            .iter()
            .filter(|(incumbent_key, incumbent)| {
                dominates(
                    (key.level, record.elapsed, record.cost),
                    (incumbent_key.level, incumbent.elapsed, incumbent.cost),
                )
            })
            .map(|(incumbent_key, _)| *incumbent_key)
            .collect_vec();
        for loser in losers {
            self.states.remove(&loser);
        }

        self.states.insert(key, record);
        true
    }

    /// States in ascending key order, for deterministic expansion.
    pub fn iter_sorted(&self) -> impl Iterator<Item = (StateKey, &StateRecord)> {
        self.states
            .iter()
            .sorted_unstable_by_key(|(key, _)| **key)
            .map(|(key, record)| (*key, record))
    }

    /// Highest SoC level present, if any state survived.
    #[must_use]
    pub fn best_level(&self) -> Option<SocLevel> {
        self.states.keys().map(|key| key.level).max()
    }
}

/// Strict-or-equal on every dimension, strict on at least one.
fn dominates(a: (SocLevel, Hours, Cost), b: (SocLevel, Hours, Cost)) -> bool {
    let (level_a, elapsed_a, cost_a) = a;
    let (level_b, elapsed_b, cost_b) = b;
    let no_worse = level_a >= level_b
        && elapsed_a <= elapsed_b + Hours(EPSILON)
        && cost_a <= cost_b + Cost(EPSILON);
    let strictly_better = level_a > level_b
        || elapsed_a < elapsed_b - Hours(EPSILON)
        || cost_a < cost_b - Cost(EPSILON);
    no_worse && strictly_better
}
