//! Input validation for planning requests.
//!
//! Checks structural integrity of events, breaks, and the dependency graph
//! before any placement work starts. All problems are collected into one
//! report rather than failing on the first, so a caller can fix a request
//! in a single round trip.

use std::collections::HashSet;

use crate::graph::DependencyGraph;
use crate::models::{Break, ClockTime, Date, FixedEvent, FlexEvent};

/// Validation outcome.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A single structural problem in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two events share the same id.
    DuplicateId,
    /// An event has an empty id.
    EmptyId,
    /// A fixed event or break ends at or before its start.
    InvalidInterval,
    /// A clock value is outside 0-23 hours / 0-59 minutes.
    InvalidClock,
    /// A date has an out-of-range month or day.
    InvalidDate,
    /// A flexible event has zero duration.
    ZeroDuration,
    /// The dependency graph references an id no event carries.
    UnknownDependency,
    /// The dependency graph contains a cycle.
    CyclicDependency,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a planning request's inputs.
///
/// Checks:
/// 1. No duplicate or empty event ids (across fixed and flexible events)
/// 2. Fixed intervals and break intervals are strictly positive
/// 3. All clock values are in range (hour 0-23, minute 0-59)
/// 4. All dates are well-formed
/// 5. Flexible durations are non-zero
/// 6. Every graph endpoint refers to a supplied event
/// 7. The graph is acyclic
///
/// Returns every detected problem, not just the first.
pub fn validate_inputs(
    fixed: &[FixedEvent],
    flex: &[FlexEvent],
    breaks: &[Break],
    graph: &DependencyGraph,
) -> ValidationResult {
    let mut errors = Vec::new();
    let mut ids: HashSet<&str> = HashSet::new();

    for event in fixed {
        check_id(&event.id, &mut ids, &mut errors);
        check_clock(&event.start, &event.id, &mut errors);
        check_clock(&event.end, &event.id, &mut errors);
        check_date(&event.date, &event.id, &mut errors);
        if event.end <= event.start {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidInterval,
                format!("fixed event '{}' ends at or before its start", event.id),
            ));
        }
    }

    for event in flex {
        check_id(&event.id, &mut ids, &mut errors);
        check_date(&event.deadline, &event.id, &mut errors);
        if event.duration_min == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::ZeroDuration,
                format!("flexible event '{}' has zero duration", event.id),
            ));
        }
    }

    for (i, brk) in breaks.iter().enumerate() {
        let label = format!("break #{i}");
        check_clock(&brk.start, &label, &mut errors);
        check_clock(&brk.end, &label, &mut errors);
        if let Some(date) = brk.date {
            check_date(&date, &label, &mut errors);
        }
        if brk.end <= brk.start {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidInterval,
                format!("{label} ends at or before its start"),
            ));
        }
    }

    // Graph endpoints must refer to supplied events.
    for id in &ids {
        for prereq in graph.prerequisites(id) {
            if !ids.contains(prereq) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownDependency,
                    format!("'{id}' depends on unknown event '{prereq}'"),
                ));
            }
        }
    }

    if graph.find_cycle().is_some() {
        errors.push(ValidationError::new(
            ValidationErrorKind::CyclicDependency,
            "dependency graph contains a cycle",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_id<'a>(id: &'a str, ids: &mut HashSet<&'a str>, errors: &mut Vec<ValidationError>) {
    if id.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyId,
            "event with empty id",
        ));
    } else if !ids.insert(id) {
        errors.push(ValidationError::new(
            ValidationErrorKind::DuplicateId,
            format!("duplicate event id: {id}"),
        ));
    }
}

fn check_clock(time: &ClockTime, owner: &str, errors: &mut Vec<ValidationError>) {
    if time.hour > 23 || time.minute > 59 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidClock,
            format!("'{owner}' has out-of-range clock value {}", time.encoded()),
        ));
    }
}

fn check_date(date: &Date, owner: &str, errors: &mut Vec<ValidationError>) {
    let valid = (1..=12).contains(&date.month)
        && date.day >= 1
        && date.day <= Date::days_in_month(date.year, date.month);
    if !valid {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidDate,
            format!("'{owner}' has invalid date {date}"),
        ));
    }
}
