//! Worst-case response time (WCRT) engine.
//!
//! Two algorithms are available, selected by the scheduling classes present
//! in the task set:
//! - cooperative only: run-to-completion dispatcher, see [`cooperative_wcrt`]
//! - cooperative + preemptive: dispatcher augmented with nested interrupts,
//!   see [`mixed_wcrt`]
//!
//! Both expect tasks already ordered by deadline-monotonic priority.

mod cooperative;
mod fixed_point;
mod mixed;

use std::fmt;
use thiserror::Error;

use crate::config::AnalysisConfig;
use crate::log_summary;
use crate::models::{Algorithm, RankedTask, SchedulingClass};

pub use cooperative::cooperative_wcrt;
pub use fixed_point::{recurrence, solve_response_time, FixedPoint, Interferer};
pub use mixed::{mixed_wcrt, SchedulableEntity};

/// Which fixed-point computation failed to converge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolverStage {
    /// Response time of a preemptive task among higher-priority preemptive tasks.
    Preemptive,
    /// Preemption-inflated execution time (R') of a cooperative task.
    CooperativeBlocking,
}

impl fmt::Display for SolverStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preemptive => f.write_str("PE"),
            Self::CooperativeBlocking => f.write_str("CO"),
        }
    }
}

/// Errors that abort a WCRT computation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WcrtError {
    #[error(
        "Invalid mix of co/pe tasks ({cooperative} cooperative, {preemptive} preemptive): \
         at least one cooperative task is required"
    )]
    InvalidTaskMix {
        cooperative: usize,
        preemptive: usize,
    },
    #[error("No convergence in {stage} WCRT calc. for {task} after {iterations} iterations")]
    ConvergenceFailure {
        task: String,
        stage: SolverStage,
        iterations: u32,
    },
}

/// WCRT of every task, aligned with the priority-ordered input.
#[derive(Clone, Debug, PartialEq)]
pub struct WcrtOutcome {
    pub algorithm: Algorithm,
    pub wcrt: Vec<f64>,
}

/// Pick the algorithm for a task set from the scheduling classes it contains.
pub fn select_algorithm(tasks: &[RankedTask]) -> Result<Algorithm, WcrtError> {
    let preemptive = tasks
        .iter()
        .filter(|r| r.task.scheduling_class == SchedulingClass::Preemptive)
        .count();
    let cooperative = tasks.len() - preemptive;

    match (cooperative, preemptive) {
        (c, 0) if c > 0 => Ok(Algorithm::Cooperative),
        (c, p) if c > 0 && p > 0 => Ok(Algorithm::Mixed),
        (cooperative, preemptive) => Err(WcrtError::InvalidTaskMix {
            cooperative,
            preemptive,
        }),
    }
}

/// Compute the WCRT of every task in a priority-ordered task set.
pub fn compute_wcrt(
    tasks: &[RankedTask],
    config: &AnalysisConfig,
) -> Result<WcrtOutcome, WcrtError> {
    let algorithm = select_algorithm(tasks)?;
    let wcrt = match algorithm {
        Algorithm::Cooperative => {
            log_summary!(config.verbosity, "WCRT calc. for cooperative tasks ...");
            let wcets: Vec<f64> = tasks.iter().map(|r| r.task.wcet).collect();
            cooperative_wcrt(&wcets, config.time_tick)
        }
        Algorithm::Mixed => {
            log_summary!(
                config.verbosity,
                "WCRT calc. for cooperative and preemptive tasks (with priority; nested interrupts) ..."
            );
            mixed_wcrt(tasks, config)?
        }
    };
    Ok(WcrtOutcome { algorithm, wcrt })
}
