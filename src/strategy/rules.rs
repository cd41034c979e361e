//! Built-in placement strategies.
//!
//! All three honor the same hard constraints (dependency order, deadline,
//! day-window, minimum gap, capacity); they differ only in which of the
//! remaining valid placements they prefer.

use log::trace;

use crate::models::{ClockTime, FlexEvent, Priority};

use super::{OrderKey, PlacementContext, PlacementStrategy};

/// Earliest-fit placement.
///
/// Events are processed in submission order. Candidate days are scanned
/// from the earliest eligible day toward the deadline and the earliest
/// wide-enough slot of each day is proposed, so the first success is the
/// soonest legal placement.
#[derive(Debug, Clone, Copy)]
pub struct EarliestFit;

impl PlacementStrategy for EarliestFit {
    fn name(&self) -> &'static str {
        "earliest-fit"
    }

    fn order_key(&self, _event: &FlexEvent, submission_idx: usize) -> OrderKey {
        (0, 0, submission_idx)
    }

    fn candidates(&self, event: &FlexEvent, ctx: &PlacementContext<'_>) -> Vec<(usize, ClockTime)> {
        (ctx.earliest..=ctx.latest)
            .filter_map(|di| {
                ctx.days[di]
                    .earliest_fit(event.duration_min, ctx.window_start, ctx.window_end)
                    .map(|slot| (di, slot))
            })
            .collect()
    }

    fn description(&self) -> &'static str {
        "First day, first slot that fits"
    }
}

/// Balanced-work placement.
///
/// Events are processed in submission order; among eligible days that still
/// have capacity and a fitting slot, the one with the least committed
/// non-break work is preferred (ties go to the earlier day), spreading load
/// evenly across the window.
#[derive(Debug, Clone, Copy)]
pub struct BalancedWork;

impl PlacementStrategy for BalancedWork {
    fn name(&self) -> &'static str {
        "balanced-work"
    }

    fn order_key(&self, _event: &FlexEvent, submission_idx: usize) -> OrderKey {
        (0, 0, submission_idx)
    }

    fn candidates(&self, event: &FlexEvent, ctx: &PlacementContext<'_>) -> Vec<(usize, ClockTime)> {
        let mut ranked: Vec<(u32, usize, ClockTime)> = (ctx.earliest..=ctx.latest)
            .filter_map(|di| {
                let day = &ctx.days[di];
                let load = day.working_minutes();
                if (load + event.duration_min) / 60 > day.capacity_hours {
                    trace!("day {}: skipped for '{}', at capacity", day.date, event.name);
                    return None;
                }
                day.earliest_fit(event.duration_min, ctx.window_start, ctx.window_end)
                    .map(|slot| (load, di, slot))
            })
            .collect();
        ranked.sort_by_key(|&(load, di, _)| (load, di));
        ranked.into_iter().map(|(_, di, slot)| (di, slot)).collect()
    }

    fn description(&self) -> &'static str {
        "Prefer the least-loaded eligible day"
    }
}

/// Deadline-oriented placement.
///
/// Events are processed by ascending deadline (ties: highest priority
/// first, then submission order). Days are scanned earliest-first, but
/// within the chosen day the latest fitting slot is proposed, keeping the
/// early part of each day open for work that has not been processed yet.
#[derive(Debug, Clone, Copy)]
pub struct DeadlineOriented;

impl PlacementStrategy for DeadlineOriented {
    fn name(&self) -> &'static str {
        "deadline-oriented"
    }

    fn order_key(&self, event: &FlexEvent, submission_idx: usize) -> OrderKey {
        let urgency = match event.priority {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        };
        (event.deadline.sort_key(), urgency, submission_idx)
    }

    fn candidates(&self, event: &FlexEvent, ctx: &PlacementContext<'_>) -> Vec<(usize, ClockTime)> {
        (ctx.earliest..=ctx.latest)
            .filter_map(|di| {
                ctx.days[di]
                    .latest_fit(event.duration_min, ctx.window_start, ctx.window_end)
                    .map(|slot| (di, slot))
            })
            .collect()
    }

    fn description(&self) -> &'static str {
        "Urgent first, placed late to keep early slack free"
    }
}
