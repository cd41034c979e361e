//! The multi-day plan produced by the planner.
//!
//! A `Plan` is treated as an immutable value once returned: repair
//! operations build a new one instead of patching the old, so "completed
//! and untouched blocks stay byte-identical" is checkable by comparison.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ScheduleError, ScheduleResult};
use crate::graph::DependencyGraph;
use crate::strategy::StrategyKind;

use super::block::TimeBlock;
use super::day::DayPlan;
use super::time::{ClockTime, Date, Weekday};

/// A complete multi-day placement.
///
/// Days are keyed by [`Date::sort_key`], so iteration and the serialized
/// list are both in date order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Number of days in the window.
    pub num_days: usize,
    /// First date of the window.
    pub first_date: Date,
    /// Day-of-week label of the first date.
    pub first_weekday: Weekday,
    /// Minimum gap (minutes) applied to every day.
    pub min_gap_min: u32,
    /// Daily non-break work ceiling (hours).
    pub capacity_hours: u32,
    /// The dependency graph the placement honored.
    pub graph: DependencyGraph,
    /// Ordered date → day mapping.
    pub days: BTreeMap<u32, DayPlan>,
    /// The strategy that produced this plan.
    pub strategy: StrategyKind,
    /// Earliest clock time eligible for flexible placement.
    pub window_start: ClockTime,
    /// Latest clock time a flexible block may end.
    pub window_end: ClockTime,
}

impl Plan {
    /// The day covering `date`, if inside the window.
    pub fn day(&self, date: Date) -> Option<&DayPlan> {
        self.days.get(&date.sort_key())
    }

    /// Last date of the window.
    pub fn last_date(&self) -> Date {
        self.days
            .values()
            .next_back()
            .map(|d| d.date)
            .unwrap_or(self.first_date)
    }

    /// Days in date order.
    ///
    /// Finite and restartable; multiple consumers can iterate independently.
    pub fn iter_days(&self) -> impl Iterator<Item = &DayPlan> {
        self.days.values()
    }

    /// Every placed block across the window, in date-then-time order.
    pub fn iter_blocks(&self) -> impl Iterator<Item = &TimeBlock> {
        self.days.values().flat_map(DayPlan::iter_blocks)
    }

    /// The block placed for event `id`, if any.
    pub fn block_for(&self, id: &str) -> Option<&TimeBlock> {
        self.days.values().find_map(|d| d.block_for(id))
    }

    /// Marks the block for `id` completed.
    ///
    /// Completion is the caller's signal to the repair engine; it never
    /// changes a block's placement.
    pub fn mark_completed(&mut self, id: &str) -> ScheduleResult<()> {
        let found = self.days.values_mut().any(|d| d.mark_completed(id));
        if found {
            Ok(())
        } else {
            Err(ScheduleError::UnknownEvent { id: id.into() })
        }
    }

    /// Total non-break minutes placed across the window.
    pub fn total_working_minutes(&self) -> u32 {
        self.days.values().map(DayPlan::working_minutes).sum()
    }
}
