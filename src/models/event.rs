//! Obligation models: fixed and flexible events, and breaks.
//!
//! A fixed event owns its date and times; a flexible event owns only a
//! duration, priority, and deadline — the planner chooses where it lands.
//! Identity is the caller-assigned `id`; display names are not unique and
//! serve only presentation and the name-keyed wire shim.

use serde::{Deserialize, Serialize};

use super::time::{ClockTime, Date};

/// Activity category attached to every obligation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Personal,
    Meeting,
    Work,
    Event,
    Education,
    Travel,
    Recreational,
    Errand,
    Other,
    Break,
}

impl Default for Category {
    fn default() -> Self {
        Category::Other
    }
}

/// Scheduling priority of a flexible event.
///
/// Derived ordering is by urgency: `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

/// An obligation with a caller-fixed date, start, and end.
///
/// The engine never moves a fixed event; the planner only verifies it does
/// not collide with other fixed events or breaks on its day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedEvent {
    /// Caller-assigned stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Activity category.
    pub category: Category,
    /// Duration in minutes (end − start).
    pub duration_min: u32,
    /// The day this event occupies.
    pub date: Date,
    /// Fixed start time.
    pub start: ClockTime,
    /// Fixed end time (must be after `start`; checked by validation).
    pub end: ClockTime,
}

impl FixedEvent {
    /// Creates a fixed event. Duration is derived from the interval.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        date: Date,
        start: ClockTime,
        end: ClockTime,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: Category::default(),
            duration_min: start.minutes_until(end).max(0) as u32,
            date,
            start,
            end,
        }
    }

    /// Sets the category.
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }
}

/// An obligation with only a duration, priority, and deadline.
///
/// Date, start, and end are assigned by the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlexEvent {
    /// Caller-assigned stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Activity category.
    pub category: Category,
    /// Required duration in minutes.
    pub duration_min: u32,
    /// Scheduling priority.
    pub priority: Priority,
    /// Inclusive upper bound on the placement date.
    pub deadline: Date,
}

impl FlexEvent {
    /// Creates a flexible event with default category and priority.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        duration_min: u32,
        deadline: Date,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: Category::default(),
            duration_min,
            priority: Priority::default(),
            deadline,
        }
    }

    /// Sets the category.
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

/// An obligation, fixed or flexible.
///
/// Polymorphic call sites dispatch on the tag instead of virtual calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Fixed(FixedEvent),
    Flex(FlexEvent),
}

impl Event {
    /// Stable identifier.
    pub fn id(&self) -> &str {
        match self {
            Event::Fixed(e) => &e.id,
            Event::Flex(e) => &e.id,
        }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        match self {
            Event::Fixed(e) => &e.name,
            Event::Flex(e) => &e.name,
        }
    }

    /// Activity category.
    pub fn category(&self) -> Category {
        match self {
            Event::Fixed(e) => e.category,
            Event::Flex(e) => e.category,
        }
    }

    /// Duration in minutes.
    pub fn duration_min(&self) -> u32 {
        match self {
            Event::Fixed(e) => e.duration_min,
            Event::Flex(e) => e.duration_min,
        }
    }
}

/// A non-task interval that blocks flexible placement.
///
/// Breaks occupy time but are excluded from working-hours accounting.
/// `date: None` marks a daily template applied to every day of the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Break {
    /// Start time.
    pub start: ClockTime,
    /// End time.
    pub end: ClockTime,
    /// Duration in minutes (end − start).
    pub duration_min: u32,
    /// `Some` for a one-off break on a specific day, `None` for a daily
    /// template.
    pub date: Option<Date>,
}

impl Break {
    /// A break on one specific day.
    pub fn one_off(date: Date, start: ClockTime, end: ClockTime) -> Self {
        Self {
            start,
            end,
            duration_min: start.minutes_until(end).max(0) as u32,
            date: Some(date),
        }
    }

    /// A daily template repeated on every day of the planning window.
    pub fn daily(start: ClockTime, end: ClockTime) -> Self {
        Self {
            start,
            end,
            duration_min: start.minutes_until(end).max(0) as u32,
            date: None,
        }
    }

    /// Whether this break applies to the given day.
    pub fn applies_on(&self, date: Date) -> bool {
        match self.date {
            Some(d) => d == date,
            None => true,
        }
    }
}
