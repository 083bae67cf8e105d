//! Counter arithmetic for compliance progress.
//!
//! Recompute is always a full tally over the task set, never a delta, so
//! concurrent recomputes over the same tasks converge on the same counters.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::TaskStatus;

/// Task counts for one compliance-progress record.
///
/// `blocked` tasks are included in `total` only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TaskCounts {
    pub total: u32,
    pub completed: u32,
    pub in_progress: u32,
    pub pending: u32,
}

impl TaskCounts {
    /// Tally a full set of task statuses.
    pub fn tally<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = TaskStatus>,
    {
        statuses.into_iter().fold(Self::default(), |mut acc, status| {
            acc.total += 1;
            match status {
                TaskStatus::Completed => acc.completed += 1,
                TaskStatus::InProgress => acc.in_progress += 1,
                TaskStatus::Pending => acc.pending += 1,
                TaskStatus::Blocked => {}
            }
            acc
        })
    }

    /// Tasks counted in `total` but in none of the three buckets.
    #[must_use]
    pub const fn blocked(&self) -> u32 {
        self.total
            .saturating_sub(self.completed + self.in_progress + self.pending)
    }

    /// Completion percentage derived from these counters.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        completion_percentage(self.completed, self.total)
    }
}

/// `completed / total * 100`, rounded half-up to two decimal places; `0` when
/// `total` is zero.
///
/// Computed in integer hundredths so that halves round up exactly instead of
/// depending on binary floating-point representation.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn completion_percentage(completed: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let completed = u64::from(completed);
    let total = u64::from(total);
    let hundredths = (completed * 10_000 * 2 + total) / (total * 2);
    hundredths as f64 / 100.0
}
