//! Placed time blocks.
//!
//! A `TimeBlock` is the concrete (date, start, end) record written into a
//! day once an obligation or break is placed. Blocks carry enough of their
//! source's fields that approximate source objects can be rebuilt from
//! blocks alone, which is what the persistence boundary relies on.

use serde::{Deserialize, Serialize};

use super::event::{Break, Category, Event, FixedEvent, FlexEvent, Priority};
use super::time::{ClockTime, Date};

/// What kind of source a block was placed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    Fixed,
    Flex,
    Break,
}

/// A placed block on one day's calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBlock {
    /// Source kind tag.
    pub kind: BlockKind,
    /// Source event id; empty for breaks.
    pub event_id: String,
    /// Display name; empty for breaks.
    pub name: String,
    /// The day this block occupies.
    pub date: Date,
    /// Start time.
    pub start: ClockTime,
    /// End time.
    pub end: ClockTime,
    /// Duration in minutes.
    pub duration_min: u32,
    /// Activity category; `Category::Break` for breaks.
    pub category: Category,
    /// Priority of the flexible source; `None` for fixed events and breaks.
    pub priority: Option<Priority>,
    /// Deadline of the flexible source; mirrors `date` for fixed and break.
    pub deadline: Date,
    /// Whether the obligation behind this block has been completed.
    pub completed: bool,
    /// Correlation id assigned by an external system (calendar export, push).
    pub external_id: Option<String>,
}

impl TimeBlock {
    /// Mirrors a fixed event into its placed block.
    pub fn from_fixed(event: &FixedEvent) -> Self {
        Self {
            kind: BlockKind::Fixed,
            event_id: event.id.clone(),
            name: event.name.clone(),
            date: event.date,
            start: event.start,
            end: event.end,
            duration_min: event.duration_min,
            category: event.category,
            priority: None,
            deadline: event.date,
            completed: false,
            external_id: None,
        }
    }

    /// Projects a flexible event onto the slot chosen by the planner.
    pub fn from_flex(event: &FlexEvent, date: Date, start: ClockTime) -> Self {
        Self {
            kind: BlockKind::Flex,
            event_id: event.id.clone(),
            name: event.name.clone(),
            date,
            start,
            end: start.add_minutes(event.duration_min),
            duration_min: event.duration_min,
            category: event.category,
            priority: Some(event.priority),
            deadline: event.deadline,
            completed: false,
            external_id: None,
        }
    }

    /// Mirrors a break into its placed block on the given day.
    pub fn from_break(brk: &Break, date: Date) -> Self {
        Self {
            kind: BlockKind::Break,
            event_id: String::new(),
            name: String::new(),
            date,
            start: brk.start,
            end: brk.end,
            duration_min: brk.duration_min,
            category: Category::Break,
            priority: None,
            deadline: date,
            completed: false,
            external_id: None,
        }
    }

    /// Attaches an external correlation id.
    pub fn with_external_id(mut self, id: impl Into<String>) -> Self {
        self.external_id = Some(id.into());
        self
    }

    /// Whether this block is a break (excluded from capacity accounting).
    #[inline]
    pub fn is_break(&self) -> bool {
        self.kind == BlockKind::Break
    }

    /// Whether `[start, end)` intersects this block's interval.
    #[inline]
    pub fn intersects(&self, start: ClockTime, end: ClockTime) -> bool {
        start < self.end && end > self.start
    }

    /// Rebuilds an approximate source event from this block alone.
    ///
    /// Returns `None` for breaks; use [`TimeBlock::to_break`] for those.
    pub fn to_event(&self) -> Option<Event> {
        match self.kind {
            BlockKind::Fixed => Some(Event::Fixed(
                FixedEvent::new(&self.event_id, &self.name, self.date, self.start, self.end)
                    .with_category(self.category),
            )),
            BlockKind::Flex => Some(Event::Flex(
                FlexEvent::new(&self.event_id, &self.name, self.duration_min, self.deadline)
                    .with_category(self.category)
                    .with_priority(self.priority.unwrap_or_default()),
            )),
            BlockKind::Break => None,
        }
    }

    /// Rebuilds an approximate one-off break from this block alone.
    pub fn to_break(&self) -> Option<Break> {
        match self.kind {
            BlockKind::Break => Some(Break::one_off(self.date, self.start, self.end)),
            _ => None,
        }
    }
}
