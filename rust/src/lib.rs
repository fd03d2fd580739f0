//! Schedulability analysis for deadline-monotonic task sets.
//!
//! Predicts, offline, whether a set of periodic tasks dispatched by a
//! cooperative (run-to-completion) scheduler, optionally augmented with
//! nested preemptive tasks, stays under a CPU load limit and meets every
//! deadline in the worst case.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use pyo3::prelude::*;
use std::path::PathBuf;

pub mod config;
pub mod cpu_load;
pub mod logging;
mod models;
pub mod priority;
pub mod report;
pub mod schedulability;
pub mod task_table;
pub mod wcrt;

pub use config::{AnalysisConfig, ConfigError, CONV_TRY_LIM};
pub use cpu_load::{cpu_load, CpuLoad};
pub use models::{
    validate_unique_names, Algorithm, AnalysisResult, PrioritizedTask, RankedTask,
    SchedulingClass, Task, TaskError, Verdict,
};
pub use priority::assign_priorities;
pub use report::{render_markdown_reports, write_markdown_reports, MarkdownReports};
pub use schedulability::{analyze, evaluate, exit_code, AnalysisError};
pub use task_table::{load_task_table, load_task_table_file, TaskTableError};
pub use wcrt::{
    compute_wcrt, cooperative_wcrt, mixed_wcrt, solve_response_time, SolverStage, WcrtError,
};

fn to_py_err(err: AnalysisError) -> PyErr {
    match err {
        AnalysisError::Wcrt(e @ WcrtError::ConvergenceFailure { .. }) => {
            pyo3::exceptions::PyRuntimeError::new_err(e.to_string())
        }
        AnalysisError::Io(e) => pyo3::exceptions::PyOSError::new_err(e.to_string()),
        other => pyo3::exceptions::PyValueError::new_err(other.to_string()),
    }
}

/// Run the schedulability analysis on a task set.
///
/// # Arguments
/// * `tasks` - Tasks in table order (priorities are assigned by deadline)
/// * `config` - Analysis configuration (defaults: no time tick, no CPU load limit)
///
/// # Returns
/// * AnalysisResult with per-task WCRT, utilization and the optional verdict
///
/// # Raises
/// * ValueError for out-of-range configuration or an invalid task mix
/// * RuntimeError if a response time does not converge
#[pyfunction]
#[pyo3(name = "analyze", signature = (tasks, config=None))]
fn py_analyze(tasks: Vec<Task>, config: Option<AnalysisConfig>) -> PyResult<AnalysisResult> {
    let config = config.unwrap_or_default();
    analyze(tasks, &config).map_err(to_py_err)
}

/// Parse a CSV timing table into tasks.
#[pyfunction]
#[pyo3(name = "load_task_table")]
fn py_load_task_table(text: &str) -> PyResult<Vec<Task>> {
    load_task_table(text).map_err(|e| to_py_err(e.into()))
}

/// Render the input, output and summary Markdown tables.
#[pyfunction]
#[pyo3(name = "render_markdown_reports")]
fn py_render_markdown_reports(result: PyRef<'_, AnalysisResult>) -> (String, String, String) {
    let reports = render_markdown_reports(&result);
    (reports.input, reports.output, reports.summary)
}

/// Write `<output_base>-in.md`, `-out.md` and `-res.md`; returns the paths written.
#[pyfunction]
#[pyo3(name = "write_markdown_reports")]
fn py_write_markdown_reports(
    result: PyRef<'_, AnalysisResult>,
    output_base: PathBuf,
) -> PyResult<Vec<PathBuf>> {
    write_markdown_reports(&result, output_base).map_err(|e| to_py_err(e.into()))
}

/// The dms_sched.rust Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Core data types
    m.add_class::<SchedulingClass>()?;
    m.add_class::<Task>()?;
    m.add_class::<PrioritizedTask>()?;
    m.add_class::<Verdict>()?;
    m.add_class::<Algorithm>()?;
    m.add_class::<AnalysisResult>()?;

    // Config types
    m.add_class::<AnalysisConfig>()?;

    // Analysis and reporting
    m.add_function(wrap_pyfunction!(py_analyze, m)?)?;
    m.add_function(wrap_pyfunction!(py_load_task_table, m)?)?;
    m.add_function(wrap_pyfunction!(py_render_markdown_reports, m)?)?;
    m.add_function(wrap_pyfunction!(py_write_markdown_reports, m)?)?;

    Ok(())
}
