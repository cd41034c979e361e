//! One day's calendar.
//!
//! A `DayPlan` owns the blocks placed on a single date and enforces the
//! structural preconditions of the engine: interval intersection, minimum
//! gap around flexible placements, and the daily working-hours ceiling.
//! Nothing is committed when a precondition fails.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::error::{ScheduleError, ScheduleResult};

use super::block::{BlockKind, TimeBlock};
use super::event::{Break, Event, FixedEvent, FlexEvent};
use super::time::{ClockTime, Date};

/// A single day: placed sources, breaks, and the sorted block list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayPlan {
    /// The date this plan covers.
    pub date: Date,
    /// Source obligations placed on this day.
    pub events: Vec<Event>,
    /// Breaks placed on this day.
    pub breaks: Vec<Break>,
    /// Placed blocks in chronological order.
    pub blocks: Vec<TimeBlock>,
    /// Minimum separation (minutes) between a flexible block and any neighbor.
    pub min_gap_min: u32,
    /// Ceiling on non-break work, in whole hours.
    pub capacity_hours: u32,
}

impl DayPlan {
    /// Creates an empty day.
    pub fn new(date: Date, min_gap_min: u32, capacity_hours: u32) -> Self {
        Self {
            date,
            events: Vec::new(),
            breaks: Vec::new(),
            blocks: Vec::new(),
            min_gap_min,
            capacity_hours,
        }
    }

    /// Rebuilds a day from its placed blocks alone.
    ///
    /// Source events and breaks are reconstructed approximately from block
    /// fields; the block list itself is preserved as given.
    pub fn from_blocks(
        date: Date,
        blocks: Vec<TimeBlock>,
        min_gap_min: u32,
        capacity_hours: u32,
    ) -> Self {
        let mut day = Self::new(date, min_gap_min, capacity_hours);
        for block in &blocks {
            match block.kind {
                BlockKind::Break => {
                    if let Some(brk) = block.to_break() {
                        day.breaks.push(brk);
                    }
                }
                _ => {
                    if let Some(event) = block.to_event() {
                        day.events.push(event);
                    }
                }
            }
        }
        day.blocks = blocks;
        day.sort_blocks();
        day
    }

    /// Places a fixed event.
    ///
    /// No conflict check happens here: the planner validates fixed events
    /// against their day before calling this.
    pub fn add_fixed(&mut self, event: &FixedEvent) {
        self.events.push(Event::Fixed(event.clone()));
        self.blocks.push(TimeBlock::from_fixed(event));
        self.sort_blocks();
    }

    /// Places a flexible event at `[start, end)`.
    ///
    /// Fails with `EventConflict` when the interval, padded by the day's
    /// minimum gap, intersects any existing block; with
    /// `WorkingLimitExceeded` when the added duration would push the floored
    /// non-break hour total past the ceiling. The day is unchanged on error.
    pub fn add_flex(
        &mut self,
        event: &FlexEvent,
        start: ClockTime,
        end: ClockTime,
    ) -> ScheduleResult<()> {
        if self.conflicts_with_gap(start, end) {
            trace!(
                "day {}: '{}' at {start}-{end} rejected: conflict",
                self.date,
                event.name
            );
            return Err(ScheduleError::EventConflict {
                name: event.name.clone(),
            });
        }

        let added = start.minutes_until(end).max(0) as u32;
        if (self.working_minutes() + added) / 60 > self.capacity_hours {
            trace!(
                "day {}: '{}' rejected: would exceed {}h limit",
                self.date,
                event.name,
                self.capacity_hours
            );
            return Err(ScheduleError::WorkingLimitExceeded {
                date: self.date.sort_key(),
            });
        }

        let mut block = TimeBlock::from_flex(event, self.date, start);
        block.end = end;
        block.duration_min = added;
        self.events.push(Event::Flex(event.clone()));
        self.blocks.push(block);
        self.sort_blocks();
        Ok(())
    }

    /// Places a break. Same mechanics as a fixed event: breaks are seeded
    /// before any flexible placement so they act as hard obstacles.
    pub fn add_break(&mut self, brk: &Break) {
        self.breaks.push(brk.clone());
        self.blocks.push(TimeBlock::from_break(brk, self.date));
        self.sort_blocks();
    }

    /// Removes an event (and its block) by id. Returns whether one existed.
    pub fn remove_event(&mut self, id: &str) -> bool {
        let before = self.blocks.len();
        self.events.retain(|e| e.id() != id);
        self.blocks
            .retain(|b| b.kind == BlockKind::Break || b.event_id != id);
        self.blocks.len() != before
    }

    /// Removes an event by display name.
    ///
    /// Compatibility shim for callers that predate stable ids; prefer
    /// [`DayPlan::remove_event`].
    pub fn remove_event_by_name(&mut self, name: &str) -> bool {
        let before = self.blocks.len();
        self.events.retain(|e| e.name() != name);
        self.blocks
            .retain(|b| b.kind == BlockKind::Break || b.name != name);
        self.blocks.len() != before
    }

    /// Removes a break matched by its time range. Returns whether one existed.
    pub fn remove_break(&mut self, start: ClockTime, end: ClockTime) -> bool {
        let before = self.blocks.len();
        self.breaks.retain(|b| !(b.start == start && b.end == end));
        self.blocks
            .retain(|b| !(b.is_break() && b.start == start && b.end == end));
        self.blocks.len() != before
    }

    /// Marks the block for `id` completed. Returns whether one existed.
    pub fn mark_completed(&mut self, id: &str) -> bool {
        let mut found = false;
        for block in &mut self.blocks {
            if !block.is_break() && block.event_id == id {
                block.completed = true;
                found = true;
            }
        }
        found
    }

    /// The block placed for `id`, if any.
    pub fn block_for(&self, id: &str) -> Option<&TimeBlock> {
        self.blocks
            .iter()
            .find(|b| !b.is_break() && b.event_id == id)
    }

    /// Day-of-week label for this date.
    pub fn weekday(&self) -> super::time::Weekday {
        self.date.weekday()
    }

    /// Sum of non-break block durations, in minutes.
    pub fn working_minutes(&self) -> u32 {
        self.blocks
            .iter()
            .filter(|b| !b.is_break())
            .map(|b| b.duration_min)
            .sum()
    }

    /// Non-break work floored to whole hours.
    pub fn working_hours(&self) -> u32 {
        self.working_minutes() / 60
    }

    /// Stable chronological sort of the block list.
    pub fn sort_blocks(&mut self) {
        self.blocks.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then(a.end.cmp(&b.end))
                .then_with(|| a.event_id.cmp(&b.event_id))
        });
    }

    /// Chronological iteration over placed blocks.
    ///
    /// The iterator is finite and restartable; display and export consumers
    /// can each take their own.
    pub fn iter_blocks(&self) -> impl Iterator<Item = &TimeBlock> {
        self.blocks.iter()
    }

    /// Whether `[start, end)` intersects any existing block when padded by
    /// the day's minimum gap. With gap 0 this is the plain interval test.
    pub fn conflicts_with_gap(&self, start: ClockTime, end: ClockTime) -> bool {
        let padded_start = start.sub_minutes(self.min_gap_min);
        let padded_end = end.add_minutes(self.min_gap_min);
        self.blocks
            .iter()
            .any(|b| b.intersects(padded_start, padded_end))
    }

    /// Whether `[start, end)` intersects any existing block, unpadded.
    pub fn conflicts(&self, start: ClockTime, end: ClockTime) -> bool {
        self.blocks.iter().any(|b| b.intersects(start, end))
    }

    /// Earliest start inside `[window_start, window_end]` where a flexible
    /// block of `duration_min` fits with the day's gap to every neighbor.
    ///
    /// Cursor walk over the sorted block list: try to fit before each block,
    /// otherwise jump past it (plus gap).
    pub fn earliest_fit(
        &self,
        duration_min: u32,
        window_start: ClockTime,
        window_end: ClockTime,
    ) -> Option<ClockTime> {
        let gap = self.min_gap_min as i64;
        let duration = duration_min as i64;
        let mut cursor = window_start.total_minutes();
        let limit = window_end.total_minutes();

        for block in &self.blocks {
            let block_start = block.start.total_minutes();
            let block_end = block.end.total_minutes();
            if cursor + duration + gap <= block_start {
                break;
            }
            cursor = cursor.max(block_end + gap);
        }

        if cursor + duration <= limit {
            Some(ClockTime::MIDNIGHT.add_minutes(cursor as u32))
        } else {
            None
        }
    }

    /// Latest start inside the window where a flexible block fits, the
    /// mirror image of [`DayPlan::earliest_fit`].
    pub fn latest_fit(
        &self,
        duration_min: u32,
        window_start: ClockTime,
        window_end: ClockTime,
    ) -> Option<ClockTime> {
        let gap = self.min_gap_min as i64;
        let duration = duration_min as i64;
        let floor = window_start.total_minutes();
        let mut tail = window_end.total_minutes();

        for block in self.blocks.iter().rev() {
            let block_start = block.start.total_minutes();
            let block_end = block.end.total_minutes();
            if tail - duration - gap >= block_end {
                break;
            }
            tail = tail.min(block_start - gap);
        }

        if tail - duration >= floor {
            Some(ClockTime::MIDNIGHT.add_minutes((tail - duration) as u32))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::Category;

    fn sample_date() -> Date {
        Date::new(2026, 8, 6)
    }

    fn day(gap: u32, capacity: u32) -> DayPlan {
        DayPlan::new(sample_date(), gap, capacity)
    }

    fn fixed(id: &str, start: ClockTime, end: ClockTime) -> FixedEvent {
        FixedEvent::new(id, id.to_uppercase(), sample_date(), start, end)
    }

    fn flex(id: &str, duration: u32) -> FlexEvent {
        FlexEvent::new(id, id.to_uppercase(), duration, Date::new(2026, 8, 10))
    }

    #[test]
    fn test_add_flex_rejects_overlap() {
        let mut d = day(0, 8);
        d.add_fixed(&fixed("m1", ClockTime::new(10, 0), ClockTime::new(11, 0)));

        let err = d
            .add_flex(
                &flex("r1", 60),
                ClockTime::new(10, 30),
                ClockTime::new(11, 30),
            )
            .unwrap_err();
        assert!(matches!(err, ScheduleError::EventConflict { .. }));
        // Nothing committed.
        assert_eq!(d.blocks.len(), 1);
        assert_eq!(d.events.len(), 1);
    }

    #[test]
    fn test_add_flex_touching_interval_ok_with_zero_gap() {
        let mut d = day(0, 8);
        d.add_fixed(&fixed("m1", ClockTime::new(10, 0), ClockTime::new(11, 0)));

        d.add_flex(
            &flex("r1", 60),
            ClockTime::new(11, 0),
            ClockTime::new(12, 0),
        )
        .unwrap();
        assert_eq!(d.blocks.len(), 2);
    }

    #[test]
    fn test_add_flex_enforces_min_gap() {
        let mut d = day(15, 8);
        d.add_fixed(&fixed("m1", ClockTime::new(10, 0), ClockTime::new(11, 0)));

        // Touching is no longer enough: 15 min of separation required.
        let err = d
            .add_flex(
                &flex("r1", 60),
                ClockTime::new(11, 0),
                ClockTime::new(12, 0),
            )
            .unwrap_err();
        assert!(matches!(err, ScheduleError::EventConflict { .. }));

        d.add_flex(
            &flex("r1", 60),
            ClockTime::new(11, 15),
            ClockTime::new(12, 15),
        )
        .unwrap();
    }

    #[test]
    fn test_add_flex_enforces_capacity() {
        let mut d = day(0, 2);
        d.add_flex(
            &flex("a", 60),
            ClockTime::new(8, 0),
            ClockTime::new(9, 0),
        )
        .unwrap();
        d.add_flex(
            &flex("b", 60),
            ClockTime::new(9, 0),
            ClockTime::new(10, 0),
        )
        .unwrap();

        // 120 committed minutes; another hour would floor to 3 > 2.
        let err = d
            .add_flex(
                &flex("c", 60),
                ClockTime::new(10, 0),
                ClockTime::new(11, 0),
            )
            .unwrap_err();
        assert!(matches!(err, ScheduleError::WorkingLimitExceeded { .. }));
    }

    #[test]
    fn test_capacity_floors_partial_hours() {
        let mut d = day(0, 2);
        d.add_flex(
            &flex("a", 90),
            ClockTime::new(8, 0),
            ClockTime::new(9, 30),
        )
        .unwrap();
        // 90 + 80 = 170 min → floor 2h, still within a 2h ceiling.
        d.add_flex(
            &flex("b", 80),
            ClockTime::new(10, 0),
            ClockTime::new(11, 20),
        )
        .unwrap();
        assert_eq!(d.working_hours(), 2);
    }

    #[test]
    fn test_breaks_excluded_from_working_hours() {
        let mut d = day(0, 8);
        d.add_break(&Break::daily(ClockTime::new(12, 0), ClockTime::new(13, 0)));
        d.add_flex(
            &flex("a", 60),
            ClockTime::new(8, 0),
            ClockTime::new(9, 0),
        )
        .unwrap();

        assert_eq!(d.working_minutes(), 60);
        assert_eq!(d.working_hours(), 1);
    }

    #[test]
    fn test_blocks_sorted_chronologically() {
        let mut d = day(0, 8);
        d.add_fixed(&fixed("late", ClockTime::new(15, 0), ClockTime::new(16, 0)));
        d.add_fixed(&fixed("early", ClockTime::new(9, 0), ClockTime::new(10, 0)));
        d.add_break(&Break::daily(ClockTime::new(12, 0), ClockTime::new(13, 0)));

        let starts: Vec<u32> = d.iter_blocks().map(|b| b.start.encoded()).collect();
        assert_eq!(starts, vec![900, 1200, 1500]);
    }

    #[test]
    fn test_weekday_label() {
        let d = day(0, 8);
        assert_eq!(d.weekday().label(), "Thursday");
    }

    #[test]
    fn test_iteration_is_restartable() {
        let mut d = day(0, 8);
        d.add_fixed(&fixed("m1", ClockTime::new(9, 0), ClockTime::new(10, 0)));

        let first: Vec<_> = d.iter_blocks().collect();
        let second: Vec<_> = d.iter_blocks().collect();
        assert_eq!(first.len(), 1);
        assert_eq!(first, second);
    }

    #[test]
    fn test_remove_event_and_break() {
        let mut d = day(0, 8);
        d.add_fixed(&fixed("m1", ClockTime::new(9, 0), ClockTime::new(10, 0)));
        d.add_break(&Break::daily(ClockTime::new(12, 0), ClockTime::new(13, 0)));

        assert!(d.remove_event("m1"));
        assert!(!d.remove_event("m1"));
        assert!(d.remove_break(ClockTime::new(12, 0), ClockTime::new(13, 0)));
        assert!(d.blocks.is_empty());
        assert!(d.events.is_empty());
        assert!(d.breaks.is_empty());
    }

    #[test]
    fn test_remove_event_by_name_shim() {
        let mut d = day(0, 8);
        d.add_fixed(&fixed("m1", ClockTime::new(9, 0), ClockTime::new(10, 0)));
        assert!(d.remove_event_by_name("M1"));
        assert!(d.blocks.is_empty());
    }

    #[test]
    fn test_mark_completed() {
        let mut d = day(0, 8);
        d.add_flex(
            &flex("a", 60),
            ClockTime::new(8, 0),
            ClockTime::new(9, 0),
        )
        .unwrap();

        assert!(d.mark_completed("a"));
        assert!(d.block_for("a").unwrap().completed);
        assert!(!d.mark_completed("missing"));
    }

    #[test]
    fn test_earliest_fit_walks_past_blocks() {
        let mut d = day(0, 8);
        d.add_fixed(&fixed("m1", ClockTime::new(8, 0), ClockTime::new(9, 0)));
        d.add_fixed(&fixed("m2", ClockTime::new(9, 30), ClockTime::new(10, 0)));

        // 60 min does not fit in the 30 min hole at 9:00.
        let slot = d
            .earliest_fit(60, ClockTime::new(8, 0), ClockTime::new(18, 0))
            .unwrap();
        assert_eq!(slot, ClockTime::new(10, 0));

        // 30 min fits exactly in the hole.
        let slot2 = d
            .earliest_fit(30, ClockTime::new(8, 0), ClockTime::new(18, 0))
            .unwrap();
        assert_eq!(slot2, ClockTime::new(9, 0));
    }

    #[test]
    fn test_earliest_fit_respects_gap() {
        let mut d = day(15, 8);
        d.add_fixed(&fixed("m1", ClockTime::new(8, 0), ClockTime::new(9, 0)));

        let slot = d
            .earliest_fit(60, ClockTime::new(8, 0), ClockTime::new(18, 0))
            .unwrap();
        assert_eq!(slot, ClockTime::new(9, 15));
    }

    #[test]
    fn test_earliest_fit_none_when_window_full() {
        let mut d = day(0, 8);
        d.add_fixed(&fixed("m1", ClockTime::new(8, 0), ClockTime::new(10, 0)));

        assert_eq!(
            d.earliest_fit(60, ClockTime::new(8, 0), ClockTime::new(10, 30)),
            None
        );
    }

    #[test]
    fn test_latest_fit_mirrors_earliest() {
        let mut d = day(0, 8);
        d.add_fixed(&fixed("m1", ClockTime::new(16, 0), ClockTime::new(17, 0)));

        let slot = d
            .latest_fit(60, ClockTime::new(8, 0), ClockTime::new(18, 0))
            .unwrap();
        assert_eq!(slot, ClockTime::new(17, 0));

        let slot2 = d
            .latest_fit(120, ClockTime::new(8, 0), ClockTime::new(18, 0))
            .unwrap();
        assert_eq!(slot2, ClockTime::new(14, 0));
    }

    #[test]
    fn test_latest_fit_respects_gap() {
        let mut d = day(30, 8);
        d.add_fixed(&fixed("m1", ClockTime::new(16, 0), ClockTime::new(17, 30)));

        let slot = d
            .latest_fit(60, ClockTime::new(8, 0), ClockTime::new(18, 0))
            .unwrap();
        // 17:30 end + 30 gap leaves no room before 18:00; fall back before it.
        assert_eq!(slot, ClockTime::new(14, 30));
    }

    #[test]
    fn test_from_blocks_reconstruction() {
        let mut d = day(10, 6);
        d.add_fixed(
            &fixed("m1", ClockTime::new(10, 0), ClockTime::new(11, 0)).with_category(Category::Meeting),
        );
        d.add_break(&Break::daily(ClockTime::new(12, 0), ClockTime::new(13, 0)));
        d.add_flex(
            &flex("r1", 60),
            ClockTime::new(14, 0),
            ClockTime::new(15, 0),
        )
        .unwrap();

        let rebuilt = DayPlan::from_blocks(d.date, d.blocks.clone(), 10, 6);
        assert_eq!(rebuilt.events.len(), 2);
        assert_eq!(rebuilt.breaks.len(), 1);

        let original: Vec<_> = d
            .iter_blocks()
            .map(|b| (b.date, b.start, b.end, b.name.clone()))
            .collect();
        let recovered: Vec<_> = rebuilt
            .iter_blocks()
            .map(|b| (b.date, b.start, b.end, b.name.clone()))
            .collect();
        assert_eq!(original, recovered);
    }
}
