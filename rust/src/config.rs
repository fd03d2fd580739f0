//! Configuration types for the schedulability analysis.

use pyo3::prelude::*;
use thiserror::Error;

/// Iteration limit after which a response-time recurrence is assumed not to converge.
pub const CONV_TRY_LIM: u32 = 50;

/// Accepted range for the time tick, in seconds.
pub const TIME_TICK_RANGE: (f64, f64) = (0.0, 10.0);

/// Accepted range for the CPU load limit, in percent.
pub const CPU_LOAD_LIMIT_RANGE: (f64, f64) = (0.0, 100.0);

/// Errors raised while validating an [`AnalysisConfig`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{parameter} must be in range [{min}..{max}], got {value}")]
    OutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("convergence limit must be at least 1")]
    ZeroConvergenceLimit,
}

/// Configuration for one analysis run.
#[pyclass]
#[derive(Clone, Debug)]
pub struct AnalysisConfig {
    /// Seconds corresponding to one scheduler time tick (0.0-10.0)
    #[pyo3(get, set)]
    pub time_tick: f64,
    /// CPU load limit in percent (0.0-100.0); no verdict is produced when unset
    #[pyo3(get, set)]
    pub cpu_load_limit: Option<f64>,
    /// Fixed-point iteration cap for the response-time solver
    #[pyo3(get, set)]
    pub convergence_limit: u32,
    /// Verbosity level: 0=silent, 1=summary, 2=tasks, 3=iterations.
    #[pyo3(get, set)]
    pub verbosity: u8,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            time_tick: 0.0,
            cpu_load_limit: None,
            convergence_limit: CONV_TRY_LIM,
            verbosity: 0,
        }
    }
}

fn check_range(
    parameter: &'static str,
    value: f64,
    range: (f64, f64),
) -> Result<(), ConfigError> {
    let (min, max) = range;
    // NaN fails both comparisons, so it must be rejected explicitly
    if value.is_nan() || value < min || value > max {
        return Err(ConfigError::OutOfRange {
            parameter,
            value,
            min,
            max,
        });
    }
    Ok(())
}

impl AnalysisConfig {
    /// Reject out-of-range values before any analysis work is done.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("time_tick", self.time_tick, TIME_TICK_RANGE)?;
        if let Some(limit) = self.cpu_load_limit {
            check_range("cpu_load_limit", limit, CPU_LOAD_LIMIT_RANGE)?;
        }
        if self.convergence_limit == 0 {
            return Err(ConfigError::ZeroConvergenceLimit);
        }
        Ok(())
    }
}

#[pymethods]
impl AnalysisConfig {
    #[new]
    #[pyo3(signature = (
        time_tick=None,
        cpu_load_limit=None,
        convergence_limit=None,
        verbosity=None
    ))]
    fn new(
        time_tick: Option<f64>,
        cpu_load_limit: Option<f64>,
        convergence_limit: Option<u32>,
        verbosity: Option<u8>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            time_tick: time_tick.unwrap_or(defaults.time_tick),
            cpu_load_limit,
            convergence_limit: convergence_limit.unwrap_or(defaults.convergence_limit),
            verbosity: verbosity.unwrap_or(defaults.verbosity),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "AnalysisConfig(time_tick={}, cpu_load_limit={:?}, convergence_limit={})",
            self.time_tick, self.cpu_load_limit, self.convergence_limit
        )
    }
}
