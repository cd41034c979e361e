//! Plan repair.
//!
//! Adjusts an existing plan when tasks were missed, new items arrive, or
//! the strategy changes — re-deriving only the affected flexible blocks and
//! leaving settled work untouched. Every operation returns a new `Plan`;
//! the input plan is never mutated.
//!
//! Fixed events are never moved, so a missed fixed event simply stays where
//! it was declared; only flexible obligations are re-placed.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::{debug, warn};

use crate::error::{ScheduleError, ScheduleResult};
use crate::graph::DependencyGraph;
use crate::models::{BlockKind, Break, Date, DayPlan, Event, FixedEvent, FlexEvent, Plan};
use crate::strategy::{PlacementStrategy, StrategyKind};
use crate::validation::{ValidationError, ValidationErrorKind};

use super::planner::place_flex;

/// Repair engine built from an existing plan.
///
/// Construction extracts the plan's obligations, breaks, and dependency
/// graph once; each operation then works against a plan value passed in.
#[derive(Debug, Clone)]
pub struct Repairer {
    fixed: Vec<FixedEvent>,
    flex: Vec<FlexEvent>,
    breaks: Vec<Break>,
    graph: DependencyGraph,
}

impl Repairer {
    /// Extracts the sources of `plan` for reuse across repairs.
    pub fn from_plan(plan: &Plan) -> Self {
        let mut fixed = Vec::new();
        let mut flex = Vec::new();
        let mut breaks = Vec::new();
        for day in plan.iter_days() {
            for event in &day.events {
                match event {
                    Event::Fixed(e) => fixed.push(e.clone()),
                    Event::Flex(e) => flex.push(e.clone()),
                }
            }
            breaks.extend(day.breaks.iter().cloned());
        }
        Self {
            fixed,
            flex,
            breaks,
            graph: plan.graph.clone(),
        }
    }

    /// The extracted fixed events.
    pub fn fixed_events(&self) -> &[FixedEvent] {
        &self.fixed
    }

    /// The extracted flexible events.
    pub fn flex_events(&self) -> &[FlexEvent] {
        &self.flex
    }

    /// The extracted breaks.
    pub fn breaks(&self) -> &[Break] {
        &self.breaks
    }

    /// The extracted dependency graph.
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Re-places missed flexible work with minimal displacement.
    ///
    /// Blocks dated before `today` and not completed are removed and
    /// shifted into the earliest legal slot from `today` forward,
    /// regardless of the plan's strategy. Past deadlines are relaxed to the
    /// horizon. Completed and future blocks stay byte-identical.
    pub fn shift_missed(&self, plan: &Plan, today: Date) -> ScheduleResult<Plan> {
        let missed = missed_flex_ids(plan, today);
        debug!("shifting {} missed block(s) from before {today}", missed.len());
        self.replant(
            plan,
            &missed,
            floor_index(plan, today),
            StrategyKind::EarliestFit.strategy(),
            true,
        )
    }

    /// Re-places missed flexible work under the plan's active strategy.
    ///
    /// Same missed set as [`Repairer::shift_missed`], but the replacement
    /// slots are chosen the way the original placement chose them.
    pub fn replace_missed(&self, plan: &Plan, today: Date) -> ScheduleResult<Plan> {
        let missed = missed_flex_ids(plan, today);
        debug!(
            "replacing {} missed block(s) via {}",
            missed.len(),
            plan.strategy.name()
        );
        self.replant(
            plan,
            &missed,
            floor_index(plan, today),
            plan.strategy.strategy(),
            true,
        )
    }

    /// Merges new obligations and breaks into the plan.
    ///
    /// Only the supplied items are placed; every previously placed block is
    /// left exactly as it was. New dependency edges are merged into the
    /// plan's graph (cycle-checked) and may reference existing events.
    pub fn add_items(
        &self,
        plan: &Plan,
        new_fixed: &[FixedEvent],
        new_flex: &[FlexEvent],
        new_breaks: &[Break],
        new_daily_breaks: &[Break],
        new_edges: &DependencyGraph,
    ) -> ScheduleResult<Plan> {
        let mut result = plan.clone();

        // Ids must stay unique across old and new obligations.
        let existing: HashSet<&str> = self
            .fixed
            .iter()
            .map(|e| e.id.as_str())
            .chain(self.flex.iter().map(|e| e.id.as_str()))
            .collect();
        let mut problems = Vec::new();
        for id in new_fixed
            .iter()
            .map(|e| e.id.as_str())
            .chain(new_flex.iter().map(|e| e.id.as_str()))
        {
            if existing.contains(id) {
                problems.push(ValidationError {
                    kind: ValidationErrorKind::DuplicateId,
                    message: format!("event id '{id}' already exists in the plan"),
                });
            }
        }
        if !problems.is_empty() {
            return Err(ScheduleError::InvalidInput(problems));
        }

        // Merge the graph; add_dependency rejects any edge closing a cycle.
        let mut graph = self.graph.clone();
        for (dependent, prerequisite) in new_edges.iter_edges() {
            graph.add_dependency(dependent, prerequisite)?;
        }

        let (mut days, dates) = take_days(&mut result);

        for brk in new_daily_breaks {
            for day in days.iter_mut() {
                day.add_break(brk);
            }
        }
        for brk in new_breaks {
            match brk.date.and_then(|d| dates.iter().position(|&x| x == d)) {
                Some(di) => days[di].add_break(brk),
                None => warn!(
                    "one-off break {}-{} dated outside the window, skipped",
                    brk.start, brk.end
                ),
            }
        }

        for event in new_fixed {
            let Some(di) = dates.iter().position(|&d| d == event.date) else {
                warn!(
                    "fixed event '{}' dated {} outside the window",
                    event.name, event.date
                );
                return Err(ScheduleError::Infeasible {
                    name: event.name.clone(),
                });
            };
            if days[di].conflicts(event.start, event.end) {
                return Err(ScheduleError::EventConflict {
                    name: event.name.clone(),
                });
            }
            days[di].add_fixed(event);
        }

        let mut placed_day = placed_day_index(&days);
        place_flex(
            &mut days,
            &dates,
            new_flex,
            &graph,
            result.strategy.strategy(),
            result.window_start,
            result.window_end,
            0,
            &mut placed_day,
            false,
        )?;

        restore_days(&mut result, days);
        result.graph = graph;
        Ok(result)
    }

    /// Re-places every not-yet-completed flexible block under `strategy`.
    ///
    /// Fixed events and breaks are untouched; completed flexible blocks
    /// keep their slots. The returned plan records the new strategy.
    pub fn switch_strategy(&self, plan: &Plan, strategy: StrategyKind) -> ScheduleResult<Plan> {
        let pending: Vec<String> = plan
            .iter_blocks()
            .filter(|b| b.kind == BlockKind::Flex && !b.completed)
            .map(|b| b.event_id.clone())
            .collect();
        debug!(
            "re-placing {} block(s) under {}",
            pending.len(),
            strategy.name()
        );

        let mut result = self.replant(plan, &pending, 0, strategy.strategy(), false)?;
        result.strategy = strategy;
        Ok(result)
    }

    /// Removes the given flexible blocks and re-runs placement for them
    /// over day indices `floor_idx..`, leaving everything else as it was.
    fn replant(
        &self,
        plan: &Plan,
        ids: &[String],
        floor_idx: usize,
        strategy: &dyn PlacementStrategy,
        relax_deadlines: bool,
    ) -> ScheduleResult<Plan> {
        let mut result = plan.clone();
        if ids.is_empty() {
            return Ok(result);
        }

        // Sources for the batch, in a stable order.
        let mut batch = Vec::with_capacity(ids.len());
        for id in ids {
            let source = self
                .flex
                .iter()
                .find(|e| &e.id == id)
                .cloned()
                .ok_or_else(|| ScheduleError::UnknownEvent { id: id.clone() })?;
            batch.push(source);
        }

        let (mut days, dates) = take_days(&mut result);
        for day in days.iter_mut() {
            for id in ids {
                day.remove_event(id);
            }
        }

        let mut placed_day = placed_day_index(&days);
        place_flex(
            &mut days,
            &dates,
            &batch,
            &self.graph,
            strategy,
            result.window_start,
            result.window_end,
            floor_idx,
            &mut placed_day,
            relax_deadlines,
        )?;

        restore_days(&mut result, days);
        Ok(result)
    }
}

/// Ids of flexible blocks dated before `today` and not completed.
fn missed_flex_ids(plan: &Plan, today: Date) -> Vec<String> {
    plan.iter_blocks()
        .filter(|b| b.kind == BlockKind::Flex && b.date < today && !b.completed)
        .map(|b| b.event_id.clone())
        .collect()
}

/// Index of the first day on or after `today`; one past the end when the
/// whole window is in the past.
fn floor_index(plan: &Plan, today: Date) -> usize {
    plan.iter_days()
        .position(|d| d.date >= today)
        .unwrap_or(plan.days.len())
}

/// Moves the day map out of the plan as an ordered vector.
fn take_days(plan: &mut Plan) -> (Vec<DayPlan>, Vec<Date>) {
    let days: Vec<DayPlan> = std::mem::take(&mut plan.days).into_values().collect();
    let dates: Vec<Date> = days.iter().map(|d| d.date).collect();
    (days, dates)
}

/// Puts the day vector back into the plan's ordered map.
fn restore_days(plan: &mut Plan, days: Vec<DayPlan>) {
    plan.days = days
        .into_iter()
        .map(|d| (d.date.sort_key(), d))
        .collect::<BTreeMap<_, _>>();
}

/// Day index of every placed non-break block, keyed by event id.
fn placed_day_index(days: &[DayPlan]) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (di, day) in days.iter().enumerate() {
        for block in day.iter_blocks() {
            if !block.is_break() {
                map.insert(block.event_id.clone(), di);
            }
        }
    }
    map
}
