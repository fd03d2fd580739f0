//! Iterative response-time recurrence (Joseph & Pandya, 1986).
//!
//! ```text
//! R(0)   = C
//! R(m+1) = C + sum_j ceil(R(m) / T_j) * C_j
//! ```
//!
//! iterated until `R(m+1) == R(m)`.

use crate::log_iterations;

use super::{SolverStage, WcrtError};

/// A higher-priority task that can preempt the task under analysis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interferer {
    pub wcet: f64,
    pub period: f64,
}

/// A converged response time and the number of iterations it took.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedPoint {
    pub response_time: f64,
    pub iterations: u32,
}

/// One application of the recurrence to the current estimate `r`.
pub fn recurrence(wcet: f64, interferers: &[Interferer], r: f64) -> f64 {
    let mut next = wcet;
    for i in interferers {
        next += (r / i.period).ceil() * i.wcet;
    }
    next
}

/// Solve the recurrence for a task with execution time `wcet`.
///
/// Returns [`WcrtError::ConvergenceFailure`] once `limit` iterations have
/// been performed without two consecutive estimates being equal, or as soon
/// as an estimate overflows to infinity.
pub fn solve_response_time(
    task: &str,
    stage: SolverStage,
    wcet: f64,
    interferers: &[Interferer],
    limit: u32,
    verbosity: u8,
) -> Result<FixedPoint, WcrtError> {
    let mut current = wcet;
    for iteration in 1..=limit {
        let next = recurrence(wcet, interferers, current);
        log_iterations!(
            verbosity,
            "    {} {}: iteration {}: R = {} -> {}",
            stage,
            task,
            iteration,
            current,
            next
        );
        if !next.is_finite() {
            return Err(WcrtError::ConvergenceFailure {
                task: task.to_string(),
                stage,
                iterations: iteration,
            });
        }
        if next == current {
            return Ok(FixedPoint {
                response_time: next,
                iterations: iteration,
            });
        }
        current = next;
    }

    Err(WcrtError::ConvergenceFailure {
        task: task.to_string(),
        stage,
        iterations: limit,
    })
}
