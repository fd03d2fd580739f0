//! Deadline-monotonic priority assignment.

use crate::models::{RankedTask, Task};

/// Order tasks by ascending deadline and rank them `1..=n`.
///
/// The sort is stable: tasks with equal deadlines keep their input order,
/// which lets a task table express an intentional tie-break.
pub fn assign_priorities(mut tasks: Vec<Task>) -> Vec<RankedTask> {
    // Deadlines are finite and positive by construction, total_cmp never sees NaN here
    tasks.sort_by(|a, b| a.deadline.total_cmp(&b.deadline));

    tasks
        .into_iter()
        .enumerate()
        .map(|(idx, task)| RankedTask {
            task,
            priority: idx as u32 + 1,
        })
        .collect()
}
