//! Error types for planning and repair operations.
//!
//! Conflict and capacity errors are structural preconditions: when one fires,
//! the target day is left unchanged. The planner consumes `EventConflict` and
//! `WorkingLimitExceeded` internally while searching for a feasible slot;
//! `CircularDependency`, `Infeasible`, and `InvalidInput` always reach the
//! caller.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors raised by the planner, repairer, and day-level mutations.
#[derive(Debug, Clone, Error)]
pub enum ScheduleError {
    /// Adding this edge would close a cycle in the dependency graph.
    #[error("circular dependency: '{dependent}' cannot depend on '{prerequisite}'")]
    CircularDependency {
        /// The event that would gain a prerequisite.
        dependent: String,
        /// The prerequisite that already (transitively) depends on it.
        prerequisite: String,
    },

    /// A placement attempt overlaps an existing block on the target day.
    #[error("event '{name}' conflicts with an existing block")]
    EventConflict {
        /// Display name of the event that could not be placed.
        name: String,
    },

    /// A placement attempt would push a day past its working-hours ceiling.
    #[error("working limit exceeded on day {date}")]
    WorkingLimitExceeded {
        /// Sortable `YYYYMMDD` identifier of the day that is full.
        date: u32,
    },

    /// No day/slot satisfies the constraints before the obligation's deadline.
    #[error("no feasible slot for '{name}' before its deadline")]
    Infeasible {
        /// Display name of the unplaceable obligation.
        name: String,
    },

    /// An operation referenced an event id the plan does not contain.
    #[error("unknown event id '{id}'")]
    UnknownEvent {
        /// The id that failed to resolve.
        id: String,
    },

    /// Structural problems detected before scheduling started.
    #[error("invalid scheduling input ({} problem(s))", .0.len())]
    InvalidInput(Vec<ValidationError>),
}

/// Convenience alias used throughout the crate.
pub type ScheduleResult<T> = Result<T, ScheduleError>;

impl ScheduleError {
    /// Whether the planner may recover by trying another day or slot.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ScheduleError::EventConflict { .. } | ScheduleError::WorkingLimitExceeded { .. }
        )
    }
}
