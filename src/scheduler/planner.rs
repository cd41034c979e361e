//! Multi-day plan construction.
//!
//! # Algorithm
//!
//! 1. Validate inputs (structure + graph acyclicity).
//! 2. Create one `DayPlan` per date of the window.
//! 3. Seed daily break templates onto every day, one-off breaks onto theirs.
//! 4. Pre-validate and place fixed events (fixed/fixed and fixed/break
//!    overlap is a hard conflict).
//! 5. Place flexible events one at a time: among the events whose
//!    prerequisites are all placed, take the one the strategy orders first,
//!    and try the strategy's (day, slot) candidates until one commits.
//!
//! # Complexity
//! O(f² · d · b) worst case — f flexible events, d days, b blocks/day; the
//! eligibility scan dominates for dependency-heavy inputs.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::{debug, warn};

use crate::error::{ScheduleError, ScheduleResult};
use crate::graph::DependencyGraph;
use crate::models::{Break, ClockTime, Date, DayPlan, FixedEvent, FlexEvent, Plan};
use crate::strategy::{PlacementContext, PlacementStrategy, StrategyKind};
use crate::validation::validate_inputs;

/// Input container for a planning run.
#[derive(Debug, Clone)]
pub struct PlanRequest {
    /// Fixed-time obligations.
    pub fixed: Vec<FixedEvent>,
    /// Deadline-bound flexible obligations.
    pub flex: Vec<FlexEvent>,
    /// One-off breaks (each dated).
    pub breaks: Vec<Break>,
    /// Daily break templates applied to every day.
    pub daily_breaks: Vec<Break>,
    /// Prerequisite relation over the events above.
    pub graph: DependencyGraph,
    /// Placement heuristic.
    pub strategy: StrategyKind,
    /// Earliest clock time eligible for flexible placement.
    pub window_start: ClockTime,
    /// Latest clock time a flexible block may end.
    pub window_end: ClockTime,
    /// First date of the window.
    pub first_date: Date,
    /// Number of days.
    pub num_days: usize,
    /// Minimum gap (minutes) around flexible blocks.
    pub min_gap_min: u32,
    /// Daily non-break work ceiling (hours).
    pub capacity_hours: u32,
}

impl PlanRequest {
    /// Creates a request covering `num_days` days from `first_date`.
    ///
    /// Defaults are permissive: whole-day window, no gap, 24 h ceiling,
    /// earliest-fit strategy.
    pub fn new(first_date: Date, num_days: usize) -> Self {
        Self {
            fixed: Vec::new(),
            flex: Vec::new(),
            breaks: Vec::new(),
            daily_breaks: Vec::new(),
            graph: DependencyGraph::new(),
            strategy: StrategyKind::default(),
            window_start: ClockTime::MIDNIGHT,
            window_end: ClockTime::new(23, 59),
            first_date,
            num_days,
            min_gap_min: 0,
            capacity_hours: 24,
        }
    }

    /// Adds a fixed event.
    pub fn with_fixed(mut self, event: FixedEvent) -> Self {
        self.fixed.push(event);
        self
    }

    /// Adds a flexible event.
    pub fn with_flex(mut self, event: FlexEvent) -> Self {
        self.flex.push(event);
        self
    }

    /// Adds a one-off break.
    pub fn with_break(mut self, brk: Break) -> Self {
        self.breaks.push(brk);
        self
    }

    /// Adds a daily break template.
    pub fn with_daily_break(mut self, brk: Break) -> Self {
        self.daily_breaks.push(brk);
        self
    }

    /// Sets the dependency graph.
    pub fn with_graph(mut self, graph: DependencyGraph) -> Self {
        self.graph = graph;
        self
    }

    /// Sets the placement strategy.
    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the day-window for flexible placement.
    pub fn with_window(mut self, start: ClockTime, end: ClockTime) -> Self {
        self.window_start = start;
        self.window_end = end;
        self
    }

    /// Sets the minimum gap around flexible blocks.
    pub fn with_min_gap(mut self, minutes: u32) -> Self {
        self.min_gap_min = minutes;
        self
    }

    /// Sets the daily working-hours ceiling.
    pub fn with_capacity_hours(mut self, hours: u32) -> Self {
        self.capacity_hours = hours;
        self
    }
}

/// The placement engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct Planner;

impl Planner {
    /// Builds a conflict-free, capacity-respecting multi-day plan.
    ///
    /// Fails with `InvalidInput` on structural problems,
    /// `CircularDependency` on a cyclic graph, `EventConflict` when fixed
    /// events collide on a day, and `Infeasible` when a flexible event has
    /// no legal slot on or before its deadline.
    pub fn build(request: &PlanRequest) -> ScheduleResult<Plan> {
        request.graph.validate_acyclic()?;
        let all_breaks: Vec<Break> = request
            .breaks
            .iter()
            .chain(request.daily_breaks.iter())
            .cloned()
            .collect();
        validate_inputs(&request.fixed, &request.flex, &all_breaks, &request.graph)
            .map_err(ScheduleError::InvalidInput)?;

        // Day skeleton, in date order.
        let mut dates = Vec::with_capacity(request.num_days);
        let mut days = Vec::with_capacity(request.num_days);
        let mut date = request.first_date;
        for _ in 0..request.num_days {
            dates.push(date);
            days.push(DayPlan::new(
                date,
                request.min_gap_min,
                request.capacity_hours,
            ));
            date = date.succ();
        }

        // Breaks first: they are hard obstacles for everything placed later.
        for brk in &request.daily_breaks {
            for day in days.iter_mut() {
                day.add_break(brk);
            }
        }
        for brk in &request.breaks {
            match brk.date.and_then(|d| index_of(&dates, d)) {
                Some(di) => days[di].add_break(brk),
                None => warn!(
                    "one-off break {}-{} dated outside the window, skipped",
                    brk.start, brk.end
                ),
            }
        }

        // Fixed events, pre-validated against whatever their day already holds.
        for event in &request.fixed {
            let Some(di) = index_of(&dates, event.date) else {
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

        // Flexible placement under the dependency order and the strategy.
        let mut placed_day: HashMap<String, usize> = request
            .fixed
            .iter()
            .filter_map(|e| index_of(&dates, e.date).map(|di| (e.id.clone(), di)))
            .collect();
        place_flex(
            &mut days,
            &dates,
            &request.flex,
            &request.graph,
            request.strategy.strategy(),
            request.window_start,
            request.window_end,
            0,
            &mut placed_day,
            false,
        )?;

        let days_map: BTreeMap<u32, DayPlan> = days
            .into_iter()
            .map(|d| (d.date.sort_key(), d))
            .collect();
        Ok(Plan {
            num_days: request.num_days,
            first_date: request.first_date,
            first_weekday: request.first_date.weekday(),
            min_gap_min: request.min_gap_min,
            capacity_hours: request.capacity_hours,
            graph: request.graph.clone(),
            days: days_map,
            strategy: request.strategy,
            window_start: request.window_start,
            window_end: request.window_end,
        })
    }
}

fn index_of(dates: &[Date], date: Date) -> Option<usize> {
    dates.iter().position(|&d| d == date)
}

/// Places `flex` into `days`, honoring prerequisites and the strategy.
///
/// `placed_day` maps already-placed event ids to day indices (fixed events,
/// and in repair runs everything left untouched); it gains an entry per
/// placement. `floor_idx` is a global lower bound on candidate days (repair
/// uses it to exclude the past). With `relax_deadlines`, a deadline that
/// leaves no candidate day is stretched to the horizon instead of failing —
/// the missed-task operations need somewhere to put overdue work.
pub(crate) fn place_flex(
    days: &mut [DayPlan],
    dates: &[Date],
    flex: &[FlexEvent],
    graph: &DependencyGraph,
    strategy: &dyn PlacementStrategy,
    window_start: ClockTime,
    window_end: ClockTime,
    floor_idx: usize,
    placed_day: &mut HashMap<String, usize>,
    relax_deadlines: bool,
) -> ScheduleResult<()> {
    if flex.is_empty() {
        return Ok(());
    }
    let batch_ids: HashSet<&str> = flex.iter().map(|e| e.id.as_str()).collect();
    let mut remaining: Vec<usize> = (0..flex.len()).collect();

    while !remaining.is_empty() {
        // An event is eligible once every prerequisite is placed; batch
        // members still waiting block their dependents.
        let mut eligible: Vec<usize> = remaining
            .iter()
            .copied()
            .filter(|&i| {
                graph.prerequisites(&flex[i].id).all(|p| {
                    placed_day.contains_key(p) || !batch_ids.contains(p)
                })
            })
            .collect();
        if eligible.is_empty() {
            // Unreachable with a validated acyclic graph; kept as a guard.
            return Err(ScheduleError::Infeasible {
                name: flex[remaining[0]].name.clone(),
            });
        }
        eligible.sort_by_key(|&i| strategy.order_key(&flex[i], i));
        let idx = eligible[0];
        let event = &flex[idx];

        // Candidate days run from the latest-placed prerequisite (or the
        // global floor) to the deadline.
        let prereq_floor = graph
            .prerequisites(&event.id)
            .filter_map(|p| placed_day.get(p).copied())
            .max()
            .unwrap_or(0);
        let earliest = floor_idx.max(prereq_floor);
        let mut latest = match dates.iter().rposition(|d| *d <= event.deadline) {
            Some(i) => i,
            None if relax_deadlines => days.len() - 1,
            None => {
                warn!("'{}' has deadline {} before the window", event.name, event.deadline);
                return Err(ScheduleError::Infeasible {
                    name: event.name.clone(),
                });
            }
        };
        if relax_deadlines && latest < earliest {
            latest = days.len() - 1;
        }
        if latest < earliest {
            warn!("'{}' has no candidate days before {}", event.name, event.deadline);
            return Err(ScheduleError::Infeasible {
                name: event.name.clone(),
            });
        }

        let candidates = {
            let ctx = PlacementContext {
                days: &*days,
                earliest,
                latest,
                window_start,
                window_end,
            };
            strategy.candidates(event, &ctx)
        };

        let mut placed = None;
        for (di, start) in candidates {
            let end = start.add_minutes(event.duration_min);
            match days[di].add_flex(event, start, end) {
                Ok(()) => {
                    placed = Some(di);
                    break;
                }
                Err(err) if err.is_recoverable() => continue,
                Err(err) => return Err(err),
            }
        }

        match placed {
            Some(di) => {
                debug!(
                    "placed '{}' on {} via {}",
                    event.name,
                    dates[di],
                    strategy.name()
                );
                placed_day.insert(event.id.clone(), di);
                remaining.retain(|&i| i != idx);
            }
            None => {
                warn!(
                    "no feasible slot for '{}' on or before {}",
                    event.name, event.deadline
                );
                return Err(ScheduleError::Infeasible {
                    name: event.name.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BlockKind, Category, Priority};

    fn monday() -> Date {
        Date::new(2026, 8, 3)
    }

    fn fixed(id: &str, date: Date, start: u32, end: u32) -> FixedEvent {
        FixedEvent::new(
            id,
            id.to_uppercase(),
            date,
            ClockTime::from_encoded(start),
            ClockTime::from_encoded(end),
        )
        .with_category(Category::Meeting)
    }

    fn flex(id: &str, duration: u32, deadline: Date) -> FlexEvent {
        FlexEvent::new(id, id.to_uppercase(), duration, deadline).with_category(Category::Work)
    }

    fn base_request(num_days: usize) -> PlanRequest {
        PlanRequest::new(monday(), num_days)
            .with_window(ClockTime::new(8, 0), ClockTime::new(18, 0))
            .with_capacity_hours(8)
    }

    #[test]
    fn test_earliest_fit_takes_first_open_slot_around_fixed() {
        // Meeting 10:00-11:00 on day 1; "Review" (60 min, deadline day 2)
        // must land at 08:00 on day 1, never on day 2.
        let plan = Planner::build(
            &base_request(2)
                .with_fixed(fixed("m1", monday(), 1000, 1100))
                .with_flex(flex("review", 60, monday().succ())),
        )
        .unwrap();

        let block = plan.block_for("review").unwrap();
        assert_eq!(block.date, monday());
        assert_eq!(block.start, ClockTime::new(8, 0));
        assert_eq!(block.end, ClockTime::new(9, 0));
    }

    #[test]
    fn test_flex_overflows_to_next_day_when_first_is_full() {
        // Day 1 window is fully blocked by a fixed event.
        let plan = Planner::build(
            &base_request(2)
                .with_fixed(fixed("allday", monday(), 800, 1800))
                .with_flex(flex("review", 60, monday().succ())),
        )
        .unwrap();

        assert_eq!(plan.block_for("review").unwrap().date, monday().succ());
    }

    #[test]
    fn test_dependency_order_on_same_day() {
        // b depends on a; both fit on day 1, a must come first.
        let mut graph = DependencyGraph::new();
        graph.add_dependency("b", "a").unwrap();

        let plan = Planner::build(
            &base_request(1)
                .with_flex(flex("b", 60, monday()))
                .with_flex(flex("a", 60, monday()))
                .with_graph(graph),
        )
        .unwrap();

        let a = plan.block_for("a").unwrap();
        let b = plan.block_for("b").unwrap();
        assert_eq!(a.date, b.date);
        assert!(a.start < b.start);
    }

    #[test]
    fn test_dependent_never_before_prerequisite_across_days() {
        // Window fits one 60-min block per day; b waits for day 2.
        let mut graph = DependencyGraph::new();
        graph.add_dependency("b", "a").unwrap();

        let plan = Planner::build(
            &base_request(2)
                .with_window(ClockTime::new(8, 0), ClockTime::new(9, 0))
                .with_flex(flex("b", 60, monday().succ()))
                .with_flex(flex("a", 60, monday().succ()))
                .with_graph(graph),
        )
        .unwrap();

        assert_eq!(plan.block_for("a").unwrap().date, monday());
        assert_eq!(plan.block_for("b").unwrap().date, monday().succ());
    }

    #[test]
    fn test_dependent_infeasible_when_deadline_blocks_it() {
        // Same single-slot window, but b's deadline is day 1: hard failure.
        let mut graph = DependencyGraph::new();
        graph.add_dependency("b", "a").unwrap();

        let err = Planner::build(
            &base_request(2)
                .with_window(ClockTime::new(8, 0), ClockTime::new(9, 0))
                .with_flex(flex("b", 60, monday()))
                .with_flex(flex("a", 60, monday()))
                .with_graph(graph),
        )
        .unwrap_err();

        assert!(matches!(err, ScheduleError::Infeasible { .. }));
    }

    #[test]
    fn test_cyclic_graph_propagates() {
        let json = r#"{"edges":{"a":["b"],"b":["a"]}}"#;
        let graph: DependencyGraph = serde_json::from_str(json).unwrap();

        let err = Planner::build(
            &base_request(1)
                .with_flex(flex("a", 30, monday()))
                .with_flex(flex("b", 30, monday()))
                .with_graph(graph),
        )
        .unwrap_err();

        assert!(matches!(err, ScheduleError::CircularDependency { .. }));
    }

    #[test]
    fn test_fixed_fixed_overlap_is_hard_conflict() {
        let err = Planner::build(
            &base_request(1)
                .with_fixed(fixed("m1", monday(), 1000, 1100))
                .with_fixed(fixed("m2", monday(), 1030, 1130)),
        )
        .unwrap_err();

        assert!(matches!(err, ScheduleError::EventConflict { .. }));
    }

    #[test]
    fn test_breaks_block_flexible_placement() {
        let plan = Planner::build(
            &base_request(1)
                .with_daily_break(Break::daily(ClockTime::new(8, 0), ClockTime::new(9, 0)))
                .with_flex(flex("review", 60, monday())),
        )
        .unwrap();

        let block = plan.block_for("review").unwrap();
        assert_eq!(block.start, ClockTime::new(9, 0));
    }

    #[test]
    fn test_daily_break_on_every_day_one_off_on_its_day() {
        let plan = Planner::build(
            &base_request(3)
                .with_daily_break(Break::daily(ClockTime::new(12, 0), ClockTime::new(13, 0)))
                .with_break(Break::one_off(
                    monday().succ(),
                    ClockTime::new(15, 0),
                    ClockTime::new(16, 0),
                )),
        )
        .unwrap();

        let breaks_per_day: Vec<usize> = plan
            .iter_days()
            .map(|d| d.iter_blocks().filter(|b| b.is_break()).count())
            .collect();
        assert_eq!(breaks_per_day, vec![1, 2, 1]);
    }

    #[test]
    fn test_capacity_pushes_work_to_later_days() {
        // 3h ceiling: two 90-min tasks fill a day, the third spills over.
        let plan = Planner::build(
            &base_request(2)
                .with_capacity_hours(3)
                .with_flex(flex("a", 90, monday().succ()))
                .with_flex(flex("b", 90, monday().succ()))
                .with_flex(flex("c", 90, monday().succ())),
        )
        .unwrap();

        let day1 = plan.day(monday()).unwrap();
        assert!(day1.working_hours() <= 3);
        assert_eq!(plan.block_for("c").unwrap().date, monday().succ());
    }

    #[test]
    fn test_infeasible_when_no_capacity_before_deadline() {
        let err = Planner::build(
            &base_request(1)
                .with_capacity_hours(1)
                .with_flex(flex("a", 60, monday()))
                .with_flex(flex("b", 60, monday())),
        )
        .unwrap_err();

        assert!(matches!(err, ScheduleError::Infeasible { .. }));
    }

    #[test]
    fn test_balanced_work_spreads_load() {
        let plan = Planner::build(
            &base_request(3)
                .with_strategy(StrategyKind::BalancedWork)
                .with_flex(flex("a", 120, Date::new(2026, 8, 5)))
                .with_flex(flex("b", 120, Date::new(2026, 8, 5)))
                .with_flex(flex("c", 120, Date::new(2026, 8, 5))),
        )
        .unwrap();

        let loads: Vec<u32> = plan.iter_days().map(|d| d.working_minutes()).collect();
        assert_eq!(loads, vec![120, 120, 120]);
    }

    #[test]
    fn test_deadline_oriented_processes_urgent_first() {
        // Single slot per day; the tight-deadline event must win day 1.
        let plan = Planner::build(
            &base_request(2)
                .with_window(ClockTime::new(8, 0), ClockTime::new(9, 0))
                .with_strategy(StrategyKind::DeadlineOriented)
                .with_flex(flex("loose", 60, monday().succ()))
                .with_flex(flex("tight", 60, monday())),
        )
        .unwrap();

        assert_eq!(plan.block_for("tight").unwrap().date, monday());
        assert_eq!(plan.block_for("loose").unwrap().date, monday().succ());
    }

    #[test]
    fn test_deadline_oriented_places_late_in_day() {
        let plan = Planner::build(
            &base_request(1)
                .with_strategy(StrategyKind::DeadlineOriented)
                .with_flex(flex("a", 60, monday())),
        )
        .unwrap();

        let block = plan.block_for("a").unwrap();
        assert_eq!(block.end, ClockTime::new(18, 0));
    }

    #[test]
    fn test_deadline_oriented_priority_breaks_ties() {
        let plan = Planner::build(
            &base_request(2)
                .with_window(ClockTime::new(8, 0), ClockTime::new(9, 0))
                .with_strategy(StrategyKind::DeadlineOriented)
                .with_flex(flex("low", 60, monday().succ()).with_priority(Priority::Low))
                .with_flex(flex("high", 60, monday().succ()).with_priority(Priority::High)),
        )
        .unwrap();

        assert_eq!(plan.block_for("high").unwrap().date, monday());
        assert_eq!(plan.block_for("low").unwrap().date, monday().succ());
    }

    #[test]
    fn test_flex_respects_prereq_on_fixed_event() {
        // The prerequisite is a fixed event on day 2: the flexible
        // dependent may not land on day 1.
        let mut graph = DependencyGraph::new();
        graph.add_dependency("r", "m").unwrap();

        let plan = Planner::build(
            &base_request(3)
                .with_fixed(fixed("m", monday().succ(), 900, 1000))
                .with_flex(flex("r", 60, Date::new(2026, 8, 5)))
                .with_graph(graph),
        )
        .unwrap();

        assert!(plan.block_for("r").unwrap().date >= monday().succ());
    }

    #[test]
    fn test_min_gap_spaces_flexible_blocks() {
        let plan = Planner::build(
            &base_request(1)
                .with_min_gap(30)
                .with_flex(flex("a", 60, monday()))
                .with_flex(flex("b", 60, monday())),
        )
        .unwrap();

        let a = plan.block_for("a").unwrap();
        let b = plan.block_for("b").unwrap();
        assert!(a.end.minutes_until(b.start) >= 30);
    }

    #[test]
    fn test_mixed_day_invariants_hold() {
        let plan = Planner::build(
            &base_request(2)
                .with_min_gap(15)
                .with_capacity_hours(6)
                .with_fixed(fixed("m1", monday(), 900, 1000))
                .with_fixed(fixed("m2", monday().succ(), 1400, 1500))
                .with_daily_break(Break::daily(ClockTime::new(12, 0), ClockTime::new(13, 0)))
                .with_flex(flex("a", 90, monday().succ()))
                .with_flex(flex("b", 45, monday().succ()))
                .with_flex(flex("c", 120, monday().succ())),
        )
        .unwrap();

        for day in plan.iter_days() {
            let blocks: Vec<_> = day.iter_blocks().collect();
            for pair in blocks.windows(2) {
                // No overlap anywhere.
                assert!(pair[0].end <= pair[1].start, "overlap on {}", day.date);
                // Gap around every flexible block.
                if pair[0].kind == BlockKind::Flex || pair[1].kind == BlockKind::Flex {
                    assert!(pair[0].end.minutes_until(pair[1].start) >= 15);
                }
            }
            assert!(day.working_hours() <= 6);
        }
    }

    #[test]
    fn test_fixed_block_mirrors_declaration_exactly() {
        let event = fixed("m1", monday(), 1000, 1130);
        let plan = Planner::build(&base_request(1).with_fixed(event.clone())).unwrap();

        let block = plan.block_for("m1").unwrap();
        assert_eq!(block.date, event.date);
        assert_eq!(block.start, event.start);
        assert_eq!(block.end, event.end);
        assert_eq!(block.kind, BlockKind::Fixed);
    }

    #[test]
    fn test_plan_carries_settings() {
        let plan = Planner::build(
            &base_request(2)
                .with_min_gap(10)
                .with_strategy(StrategyKind::BalancedWork),
        )
        .unwrap();

        assert_eq!(plan.num_days, 2);
        assert_eq!(plan.min_gap_min, 10);
        assert_eq!(plan.strategy, StrategyKind::BalancedWork);
        assert_eq!(plan.first_weekday.label(), "Monday");
        assert_eq!(plan.days.len(), 2);
    }

    #[test]
    fn test_deadline_before_window_is_infeasible() {
        let err = Planner::build(
            &base_request(2).with_flex(flex("stale", 30, Date::new(2026, 8, 1))),
        )
        .unwrap_err();
        assert!(matches!(err, ScheduleError::Infeasible { .. }));
    }
}
