//! Placement strategies for flexible obligations.
//!
//! A strategy decides, within the freedom the dependency order leaves, in
//! which sequence flexible events are processed and which (day, slot)
//! candidates are tried for each. The planner owns the actual placement
//! attempt and falls to the next candidate on a recoverable rejection.
//!
//! # Usage
//!
//! ```
//! use dayplan::strategy::StrategyKind;
//!
//! let strategy = StrategyKind::BalancedWork.strategy();
//! assert_eq!(strategy.name(), "balanced-work");
//! ```

mod rules;

pub use rules::{BalancedWork, DeadlineOriented, EarliestFit};

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::models::{ClockTime, DayPlan, FlexEvent};

/// Processing-order key: lower sorts first.
///
/// Components are (primary, secondary, submission index); the trailing
/// index makes every ordering a total, deterministic one.
pub type OrderKey = (u32, u8, usize);

/// Day/slot search state handed to a strategy for one event.
///
/// `days` spans the whole plan; only indices in `earliest..=latest` are
/// eligible for this event (dependency- and deadline-restricted).
#[derive(Debug)]
pub struct PlacementContext<'a> {
    /// Every day of the plan, in date order.
    pub days: &'a [DayPlan],
    /// First eligible day index.
    pub earliest: usize,
    /// Last eligible day index (inclusive).
    pub latest: usize,
    /// Earliest clock time eligible for flexible placement.
    pub window_start: ClockTime,
    /// Latest clock time a flexible block may end.
    pub window_end: ClockTime,
}

/// A placement heuristic.
///
/// Strategies only propose; the planner verifies each candidate against the
/// day's structural preconditions and takes the first that commits.
pub trait PlacementStrategy: Debug {
    /// Strategy name as carried by a plan (e.g. "earliest-fit").
    fn name(&self) -> &'static str;

    /// Sort key for the processing order over not-yet-placed events.
    fn order_key(&self, event: &FlexEvent, submission_idx: usize) -> OrderKey;

    /// Candidate (day index, start time) pairs in preference order.
    fn candidates(&self, event: &FlexEvent, ctx: &PlacementContext<'_>) -> Vec<(usize, ClockTime)>;

    /// Human-readable description.
    fn description(&self) -> &'static str {
        self.name()
    }
}

/// Selector for the built-in strategies; the name a plan records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyKind {
    /// First day, first slot that fits.
    EarliestFit,
    /// Prefer the least-loaded eligible day.
    BalancedWork,
    /// Urgent first, placed late to keep early slack free.
    DeadlineOriented,
}

impl StrategyKind {
    /// The strategy implementation behind this kind.
    pub fn strategy(&self) -> &'static dyn PlacementStrategy {
        match self {
            StrategyKind::EarliestFit => &EarliestFit,
            StrategyKind::BalancedWork => &BalancedWork,
            StrategyKind::DeadlineOriented => &DeadlineOriented,
        }
    }

    /// Strategy name string.
    pub fn name(&self) -> &'static str {
        self.strategy().name()
    }
}

impl Default for StrategyKind {
    fn default() -> Self {
        StrategyKind::EarliestFit
    }
}
