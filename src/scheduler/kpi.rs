//! Plan quality metrics.
//!
//! Aggregate indicators computed from a finished plan, for reporting and
//! comparison between strategies. Pure accounting; nothing here enforces a
//! constraint.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total work | Sum of non-break minutes across the window |
//! | Peak day | Day carrying the most non-break minutes |
//! | Hours by day | Floored working hours per date |
//! | Window utilization | Mean of (working minutes / window length) per day |
//! | Completed / pending | Non-break block counts by completion flag |

use std::collections::BTreeMap;

use crate::models::{Date, Plan};

/// Aggregate indicators for one plan.
#[derive(Debug, Clone)]
pub struct PlanKpi {
    /// Total non-break minutes placed across the window.
    pub total_work_min: u32,
    /// The busiest day, if any work is placed at all.
    pub peak_day: Option<Date>,
    /// Non-break minutes on the busiest day.
    pub peak_day_min: u32,
    /// Floored working hours per date.
    pub hours_by_day: BTreeMap<Date, u32>,
    /// Mean fraction of the day-window occupied by non-break work (0.0..1.0).
    pub avg_window_utilization: f64,
    /// Non-break blocks marked completed.
    pub completed_blocks: usize,
    /// Non-break blocks not yet completed.
    pub pending_blocks: usize,
}

impl PlanKpi {
    /// Computes KPIs from a plan.
    pub fn calculate(plan: &Plan) -> Self {
        let mut total: u32 = 0;
        let mut peak_day = None;
        let mut peak_min: u32 = 0;
        let mut hours_by_day = BTreeMap::new();
        let mut completed = 0;
        let mut pending = 0;

        let window_min = plan.window_start.minutes_until(plan.window_end).max(0) as f64;
        let mut utilization_sum = 0.0;

        for day in plan.iter_days() {
            let minutes = day.working_minutes();
            total += minutes;
            hours_by_day.insert(day.date, day.working_hours());
            if minutes > peak_min || (peak_day.is_none() && minutes > 0) {
                peak_min = minutes;
                peak_day = Some(day.date);
            }
            if window_min > 0.0 {
                utilization_sum += minutes as f64 / window_min;
            }
            for block in day.iter_blocks().filter(|b| !b.is_break()) {
                if block.completed {
                    completed += 1;
                } else {
                    pending += 1;
                }
            }
        }

        let day_count = plan.days.len();
        let avg_window_utilization = if day_count == 0 {
            0.0
        } else {
            utilization_sum / day_count as f64
        };

        Self {
            total_work_min: total,
            peak_day,
            peak_day_min: peak_min,
            hours_by_day,
            avg_window_utilization,
            completed_blocks: completed,
            pending_blocks: pending,
        }
    }
}
