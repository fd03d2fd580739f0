//! Per-task CPU utilization and total CPU load.

use crate::models::RankedTask;

/// Utilization of every task (in priority order) and their sum, all in percent.
#[derive(Clone, Debug, PartialEq)]
pub struct CpuLoad {
    pub per_task_percent: Vec<f64>,
    pub total_percent: f64,
}

/// Utilization of a single task: `wcet / period * 100`.
#[inline]
pub fn utilization_percent(wcet: f64, period: f64) -> f64 {
    wcet / period * 100.0
}

/// Compute the CPU load of a prioritized task set.
///
/// The total is accumulated in priority order so repeated runs are bit-identical.
pub fn cpu_load(tasks: &[RankedTask]) -> CpuLoad {
    let per_task_percent: Vec<f64> = tasks
        .iter()
        .map(|r| utilization_percent(r.task.wcet, r.task.period()))
        .collect();

    let mut total_percent = 0.0;
    for u in &per_task_percent {
        total_percent += u;
    }

    CpuLoad {
        per_task_percent,
        total_percent,
    }
}
