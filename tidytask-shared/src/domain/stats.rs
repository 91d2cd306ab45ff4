/// Task statistics
///
/// Pure aggregation over an already loaded task list. Every priority is
/// present in the distribution, zero counts included.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{Priority, Task, TaskStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    pub total_tasks: usize,
    pub pending_tasks: usize,
    pub in_progress_tasks: usize,
    pub completed_tasks: usize,
    pub overdue_tasks: usize,
    pub priority_distribution: BTreeMap<Priority, usize>,
}

impl TaskStats {
    pub fn compute(tasks: &[Task], now: NaiveDateTime) -> Self {
        let mut priority_distribution: BTreeMap<Priority, usize> =
            Priority::ALL.into_iter().map(|p| (p, 0)).collect();

        let mut stats = Self {
            total_tasks: tasks.len(),
            pending_tasks: 0,
            in_progress_tasks: 0,
            completed_tasks: 0,
            overdue_tasks: 0,
            priority_distribution: BTreeMap::new(),
        };

        for task in tasks {
            match task.status {
                TaskStatus::Pending => stats.pending_tasks += 1,
                TaskStatus::InProgress => stats.in_progress_tasks += 1,
                TaskStatus::Completed => stats.completed_tasks += 1,
            }
            if task.is_overdue(now) {
                stats.overdue_tasks += 1;
            }
            *priority_distribution.entry(task.priority).or_insert(0) += 1;
        }

        stats.priority_distribution = priority_distribution;
        stats
    }

    /// Share of completed tasks in percent, 0 for an empty list
    pub fn completion_rate(&self) -> u32 {
        if self.total_tasks == 0 {
            return 0;
        }
        ((self.completed_tasks * 100) / self.total_tasks) as u32
    }
}

/// Tasks past their due date that are not completed, in input order
pub fn overdue_tasks(tasks: &[Task], now: NaiveDateTime) -> Vec<&Task> {
    tasks.iter().filter(|t| t.is_overdue(now)).collect()
}
