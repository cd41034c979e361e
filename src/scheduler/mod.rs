//! Plan construction, repair, and KPI evaluation.
//!
//! The planner builds a multi-day placement greedily: days are seeded with
//! breaks and fixed events, then flexible events are placed one at a time
//! in dependency order under the chosen strategy. It is not optimal, but it
//! is deterministic and fast.
//!
//! The repairer re-derives only an affected subset of an existing plan —
//! missed work, newly added items, or a strategy change — and leaves every
//! settled block untouched.
//!
//! # KPI
//!
//! `PlanKpi` computes aggregate metrics: total work, per-day load, peak
//! day, window utilization, and completion counts.

mod kpi;
mod planner;
mod repair;

pub use kpi::PlanKpi;
pub use planner::{PlanRequest, Planner};
pub use repair::Repairer;
