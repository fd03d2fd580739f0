//! WCRT of a cooperative dispatcher augmented with nested preemptive tasks.
//!
//! Steps:
//! 1. Split the priority-ordered set into preemptive tasks P and cooperative tasks C.
//! 2. Solve the response-time recurrence for each P[k] against P[..k].
//! 3. Solve R' for each cooperative task against all of P, as if it were the
//!    only cooperative task and appended below every preemptive task.
//! 4. Feed the R' values through the cooperative formula.
//! 5. Merge both subsets back into priority order.

use crate::config::AnalysisConfig;
use crate::log_tasks;
use crate::models::{RankedTask, SchedulingClass};

use super::cooperative::cooperative_wcrt;
use super::fixed_point::{solve_response_time, Interferer};
use super::{SolverStage, WcrtError};

/// A task with its final response time, tagged by how it was scheduled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SchedulableEntity {
    Preemptive { priority: u32, response_time: f64 },
    Cooperative { priority: u32, response_time: f64 },
}

impl SchedulableEntity {
    pub fn priority(&self) -> u32 {
        match self {
            Self::Preemptive { priority, .. } | Self::Cooperative { priority, .. } => *priority,
        }
    }

    pub fn response_time(&self) -> f64 {
        match self {
            Self::Preemptive { response_time, .. } | Self::Cooperative { response_time, .. } => {
                *response_time
            }
        }
    }
}

fn interferer(r: &RankedTask) -> Interferer {
    Interferer {
        wcet: r.task.wcet,
        period: r.task.period(),
    }
}

/// Final response times of the preemptive tasks, in their relative priority order.
fn preemptive_response_times(
    preemptive: &[&RankedTask],
    config: &AnalysisConfig,
) -> Result<Vec<f64>, WcrtError> {
    let interferers: Vec<Interferer> = preemptive.iter().map(|r| interferer(r)).collect();

    preemptive
        .iter()
        .enumerate()
        .map(|(k, r)| {
            let fp = solve_response_time(
                &r.task.name,
                SolverStage::Preemptive,
                r.task.wcet,
                &interferers[..k],
                config.convergence_limit,
                config.verbosity,
            )?;
            log_tasks!(
                config.verbosity,
                "  PE {}: WCRT = {} ({} iterations)",
                r.task.name,
                fp.response_time,
                fp.iterations
            );
            Ok(fp.response_time)
        })
        .collect()
}

/// R' of each cooperative task: its execution time inflated by every preemptive task.
///
/// Each task is solved independently; the first failure in priority order aborts.
fn cooperative_blocking_times(
    cooperative: &[&RankedTask],
    preemptive: &[&RankedTask],
    config: &AnalysisConfig,
) -> Result<Vec<f64>, WcrtError> {
    let interferers: Vec<Interferer> = preemptive.iter().map(|r| interferer(r)).collect();

    cooperative
        .iter()
        .map(|r| {
            let fp = solve_response_time(
                &r.task.name,
                SolverStage::CooperativeBlocking,
                r.task.wcet,
                &interferers,
                config.convergence_limit,
                config.verbosity,
            )?;
            log_tasks!(
                config.verbosity,
                "  CO {}: WCRT' = {} ({} iterations)",
                r.task.name,
                fp.response_time,
                fp.iterations
            );
            Ok(fp.response_time)
        })
        .collect()
}

/// WCRT of every task in a priority-ordered set containing both classes.
pub fn mixed_wcrt(tasks: &[RankedTask], config: &AnalysisConfig) -> Result<Vec<f64>, WcrtError> {
    let (preemptive, cooperative): (Vec<&RankedTask>, Vec<&RankedTask>) = tasks
        .iter()
        .partition(|r| r.task.scheduling_class == SchedulingClass::Preemptive);

    let pe_wcrt = preemptive_response_times(&preemptive, config)?;
    let co_prime = cooperative_blocking_times(&cooperative, &preemptive, config)?;
    let co_wcrt = cooperative_wcrt(&co_prime, config.time_tick);

    let mut entities: Vec<SchedulableEntity> = preemptive
        .iter()
        .zip(pe_wcrt)
        .map(|(r, response_time)| SchedulableEntity::Preemptive {
            priority: r.priority,
            response_time,
        })
        .chain(
            cooperative
                .iter()
                .zip(co_wcrt)
                .map(|(r, response_time)| SchedulableEntity::Cooperative {
                    priority: r.priority,
                    response_time,
                }),
        )
        .collect();
    entities.sort_by_key(|e| e.priority());

    Ok(entities.iter().map(|e| e.response_time()).collect())
}
