//! Multi-day task placement and repair engine.
//!
//! Takes fixed-time obligations, deadline-bound flexible obligations,
//! one-off and daily breaks, and a prerequisite DAG, and produces a
//! conflict-free, capacity-respecting placement across a window of days.
//! A companion repair engine adjusts an existing plan — missed tasks, new
//! items, or a strategy switch — without disturbing settled work.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `Date`, `ClockTime`, `FixedEvent`,
//!   `FlexEvent`, `Break`, `TimeBlock`, `DayPlan`, `Plan`
//! - **`graph`**: The acyclic prerequisite relation between obligations
//! - **`strategy`**: Placement heuristics — earliest-fit, balanced-work,
//!   deadline-oriented
//! - **`scheduler`**: The planner, the repairer, and plan KPIs
//! - **`validation`**: Input integrity checks (duplicate ids, inverted
//!   intervals, dangling references, DAG cycles)
//! - **`error`**: Result and error types shared by every operation
//!
//! # Execution model
//!
//! Every operation is synchronous and runs to completion; the engine holds
//! no cross-invocation state. Given identical inputs, placement is fully
//! deterministic.
//!
//! # Example
//!
//! ```
//! use dayplan::models::{ClockTime, Date, FixedEvent, FlexEvent};
//! use dayplan::scheduler::{PlanRequest, Planner};
//!
//! let monday = Date::new(2026, 8, 3);
//! let request = PlanRequest::new(monday, 5)
//!     .with_window(ClockTime::new(8, 0), ClockTime::new(18, 0))
//!     .with_capacity_hours(8)
//!     .with_fixed(FixedEvent::new(
//!         "standup",
//!         "Standup",
//!         monday,
//!         ClockTime::new(9, 0),
//!         ClockTime::new(9, 30),
//!     ))
//!     .with_flex(FlexEvent::new("review", "Code review", 60, Date::new(2026, 8, 4)));
//!
//! let plan = Planner::build(&request).unwrap();
//! assert_eq!(plan.block_for("review").unwrap().date, monday);
//! ```

pub mod error;
pub mod graph;
pub mod models;
pub mod scheduler;
pub mod strategy;
pub mod validation;
