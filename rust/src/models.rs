//! Core data types for the schedulability analysis.

use pyo3::prelude::*;
use rustc_hash::FxHashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while building tasks or task sets.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TaskError {
    #[error("Task {task:?}: {field} must be a positive number, got {value}")]
    NonPositive {
        task: String,
        field: &'static str,
        value: f64,
    },
    #[error("Unknown scheduling class {0:?} (expected \"co\" or \"pe\")")]
    UnknownSchedulingClass(String),
    #[error("Duplicate task name: {0}")]
    DuplicateName(String),
    #[error("Task name must not be empty")]
    EmptyName,
}

/// How the dispatcher runs a task.
#[pyclass(eq, eq_int)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SchedulingClass {
    /// Run-to-completion task dispatched by the cooperative scheduler.
    Cooperative,
    /// Interrupt-style task that preempts cooperative and lower-priority preemptive tasks.
    Preemptive,
}

impl SchedulingClass {
    /// Token used in task tables.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Cooperative => "co",
            Self::Preemptive => "pe",
        }
    }
}

impl FromStr for SchedulingClass {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "co" => Ok(Self::Cooperative),
            "pe" => Ok(Self::Preemptive),
            other => Err(TaskError::UnknownSchedulingClass(other.to_string())),
        }
    }
}

impl fmt::Display for SchedulingClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A periodic task to be analyzed. Immutable once built.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct Task {
    #[pyo3(get)]
    pub name: String,
    #[pyo3(get)]
    pub scheduling_class: SchedulingClass,
    /// Worst-case execution time in seconds
    #[pyo3(get)]
    pub wcet: f64,
    /// Relative deadline in seconds
    #[pyo3(get)]
    pub deadline: f64,
    /// Activation frequency in Hz
    #[pyo3(get)]
    pub frequency: f64,
}

fn require_positive(task: &str, field: &'static str, value: f64) -> Result<(), TaskError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TaskError::NonPositive {
            task: task.to_string(),
            field,
            value,
        })
    }
}

impl Task {
    /// Build a task, rejecting empty names and non-positive timing values.
    pub fn new(
        name: impl Into<String>,
        scheduling_class: SchedulingClass,
        wcet: f64,
        deadline: f64,
        frequency: f64,
    ) -> Result<Self, TaskError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TaskError::EmptyName);
        }
        require_positive(&name, "wcet", wcet)?;
        require_positive(&name, "deadline", deadline)?;
        require_positive(&name, "frequency", frequency)?;
        Ok(Self {
            name,
            scheduling_class,
            wcet,
            deadline,
            frequency,
        })
    }

    /// Activation period in seconds.
    #[inline]
    pub fn period(&self) -> f64 {
        1.0 / self.frequency
    }
}

#[pymethods]
impl Task {
    #[new]
    fn py_new(
        name: String,
        scheduling_class: &str,
        wcet: f64,
        deadline: f64,
        frequency: f64,
    ) -> PyResult<Self> {
        let class = scheduling_class
            .parse::<SchedulingClass>()
            .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))?;
        Task::new(name, class, wcet, deadline, frequency)
            .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
    }

    #[getter(period)]
    fn py_period(&self) -> f64 {
        self.period()
    }

    fn __repr__(&self) -> String {
        format!(
            "Task(name={:?}, sched={}, wcet={}, deadline={}, frequency={})",
            self.name, self.scheduling_class, self.wcet, self.deadline, self.frequency
        )
    }
}

/// Reject task sets in which two tasks share a name.
pub fn validate_unique_names(tasks: &[Task]) -> Result<(), TaskError> {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    for task in tasks {
        if !seen.insert(task.name.as_str()) {
            return Err(TaskError::DuplicateName(task.name.clone()));
        }
    }
    Ok(())
}

/// A task together with its deadline-monotonic priority (1 = highest).
#[derive(Clone, Debug, PartialEq)]
pub struct RankedTask {
    pub task: Task,
    pub priority: u32,
}

/// Schedulability verdict, only produced when a CPU load limit is configured.
#[pyclass(eq, eq_int)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Feasible,
    Unfeasible,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Feasible => f.write_str("Feasible"),
            Self::Unfeasible => f.write_str("Unfeasible"),
        }
    }
}

/// WCRT algorithm chosen for the task set.
#[pyclass(eq, eq_int)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Algorithm {
    /// Cooperative dispatcher only.
    Cooperative,
    /// Cooperative dispatcher augmented with nested preemptive tasks.
    Mixed,
}

/// A task with every derived analysis field attached.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct PrioritizedTask {
    #[pyo3(get)]
    pub name: String,
    #[pyo3(get)]
    pub priority: u32,
    #[pyo3(get)]
    pub scheduling_class: SchedulingClass,
    #[pyo3(get)]
    pub wcet: f64,
    #[pyo3(get)]
    pub deadline: f64,
    #[pyo3(get)]
    pub frequency: f64,
    #[pyo3(get)]
    pub period: f64,
    #[pyo3(get)]
    pub utilization_percent: f64,
    #[pyo3(get)]
    pub wcrt: f64,
    #[pyo3(get)]
    pub deadline_overrun: bool,
}

#[pymethods]
impl PrioritizedTask {
    fn __repr__(&self) -> String {
        format!(
            "PrioritizedTask(name={:?}, priority={}, wcrt={}, overrun={})",
            self.name, self.priority, self.wcrt, self.deadline_overrun
        )
    }
}

/// Outcome of one analysis run.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisResult {
    /// Tasks in priority order
    #[pyo3(get)]
    pub tasks: Vec<PrioritizedTask>,
    #[pyo3(get)]
    pub total_cpu_load_percent: f64,
    #[pyo3(get)]
    pub deadline_overrun_count: usize,
    #[pyo3(get)]
    pub verdict: Option<Verdict>,
    #[pyo3(get)]
    pub algorithm: Algorithm,
}

#[pymethods]
impl AnalysisResult {
    /// Process exit code for CI use: non-zero only for an Unfeasible verdict.
    pub fn exit_code(&self) -> i32 {
        match self.verdict {
            Some(Verdict::Unfeasible) => 1,
            Some(Verdict::Feasible) | None => 0,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "AnalysisResult(tasks={}, overruns={}, cpu_load={}, verdict={:?})",
            self.tasks.len(),
            self.deadline_overrun_count,
            self.total_cpu_load_percent,
            self.verdict
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduling_class_tokens() {
        assert_eq!(
            "co".parse::<SchedulingClass>(),
            Ok(SchedulingClass::Cooperative)
        );
        assert_eq!(
            " pe ".parse::<SchedulingClass>(),
            Ok(SchedulingClass::Preemptive)
        );
        assert_eq!(SchedulingClass::Preemptive.to_string(), "pe");
        assert!(matches!(
            "irq".parse::<SchedulingClass>(),
            Err(TaskError::UnknownSchedulingClass(s)) if s == "irq"
        ));
    }

    #[test]
    fn test_period_from_frequency() {
        let task = Task::new("t", SchedulingClass::Cooperative, 0.1, 1.0, 4.0).unwrap();
        assert!((task.period() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_non_positive_values_rejected() {
        let result = Task::new("t", SchedulingClass::Cooperative, 0.0, 1.0, 1.0);
        assert!(matches!(
            result,
            Err(TaskError::NonPositive { field: "wcet", .. })
        ));
        let result = Task::new("t", SchedulingClass::Cooperative, 0.1, -1.0, 1.0);
        assert!(matches!(
            result,
            Err(TaskError::NonPositive {
                field: "deadline",
                ..
            })
        ));
        let result = Task::new("t", SchedulingClass::Cooperative, 0.1, 1.0, f64::INFINITY);
        assert!(matches!(
            result,
            Err(TaskError::NonPositive {
                field: "frequency",
                ..
            })
        ));
    }

    #[test]
    fn test_empty_name_rejected() {
        let result = Task::new("  ", SchedulingClass::Cooperative, 0.1, 1.0, 1.0);
        assert_eq!(result, Err(TaskError::EmptyName));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let a = Task::new("a", SchedulingClass::Cooperative, 0.1, 1.0, 1.0).unwrap();
        let b = Task::new("b", SchedulingClass::Preemptive, 0.1, 1.0, 1.0).unwrap();
        assert!(validate_unique_names(&[a.clone(), b.clone()]).is_ok());
        assert_eq!(
            validate_unique_names(&[a.clone(), b, a]),
            Err(TaskError::DuplicateName("a".to_string()))
        );
    }
}
