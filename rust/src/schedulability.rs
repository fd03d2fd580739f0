//! Schedulability verdict and the end-to-end analysis pipeline.
//!
//! Two objectives decide feasibility:
//! 1. total CPU load stays at or below the configured limit,
//! 2. every task's WCRT is less than or equal to its deadline.

use thiserror::Error;

use crate::config::{AnalysisConfig, ConfigError};
use crate::cpu_load::{cpu_load, CpuLoad};
use crate::models::{
    validate_unique_names, AnalysisResult, PrioritizedTask, RankedTask, Task, TaskError, Verdict,
};
use crate::priority::assign_priorities;
use crate::report::{render_console_table, render_input_echo};
use crate::task_table::TaskTableError;
use crate::wcrt::{compute_wcrt, WcrtError, WcrtOutcome};
use crate::{log_summary, log_tasks};

/// Errors that can abort an analysis run.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid configuration: {0}")]
    InvalidInputRange(#[from] ConfigError),
    #[error("Invalid task set: {0}")]
    InvalidTask(#[from] TaskError),
    #[error("Invalid timing table: {0}")]
    TaskTable(#[from] TaskTableError),
    #[error(transparent)]
    Wcrt(#[from] WcrtError),
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// Process exit code for the outcome of a run, for CI integration.
///
/// 0 when analysis succeeded and either no limit was configured or the
/// verdict is Feasible; 1 for an Unfeasible verdict or any error.
pub fn exit_code(outcome: &Result<AnalysisResult, AnalysisError>) -> i32 {
    match outcome {
        Ok(result) => result.exit_code(),
        Err(_) => 1,
    }
}

/// Attach derived values to every task and decide the verdict.
pub fn evaluate(
    ranked: Vec<RankedTask>,
    load: &CpuLoad,
    wcrt: &WcrtOutcome,
    cpu_load_limit: Option<f64>,
) -> AnalysisResult {
    let tasks: Vec<PrioritizedTask> = ranked
        .into_iter()
        .zip(load.per_task_percent.iter())
        .zip(wcrt.wcrt.iter())
        .map(|((r, &utilization_percent), &wcrt)| {
            let period = r.task.period();
            PrioritizedTask {
                deadline_overrun: r.task.deadline < wcrt,
                name: r.task.name,
                priority: r.priority,
                scheduling_class: r.task.scheduling_class,
                wcet: r.task.wcet,
                deadline: r.task.deadline,
                frequency: r.task.frequency,
                period,
                utilization_percent,
                wcrt,
            }
        })
        .collect();

    let deadline_overrun_count = tasks.iter().filter(|t| t.deadline_overrun).count();
    let total_cpu_load_percent = load.total_percent;

    let verdict = cpu_load_limit.map(|limit| {
        if deadline_overrun_count == 0 && total_cpu_load_percent <= limit {
            Verdict::Feasible
        } else {
            Verdict::Unfeasible
        }
    });

    AnalysisResult {
        tasks,
        total_cpu_load_percent,
        deadline_overrun_count,
        verdict,
        algorithm: wcrt.algorithm,
    }
}

/// Run the full analysis on a task set.
///
/// Fails fast: an invalid configuration, an invalid task mix or a
/// non-converging response time aborts the run without a partial result.
pub fn analyze(tasks: Vec<Task>, config: &AnalysisConfig) -> Result<AnalysisResult, AnalysisError> {
    config.validate()?;
    validate_unique_names(&tasks)?;
    let verbosity = config.verbosity;

    log_summary!(verbosity, "Timing table ({} tasks):", tasks.len());
    log_summary!(verbosity, "{}", render_input_echo(&tasks));
    for task in &tasks {
        if task.wcet > task.period() {
            log_summary!(
                verbosity,
                "Warning: {} has WCET {} s longer than its period {} s",
                task.name,
                task.wcet,
                task.period()
            );
        }
    }

    let ranked = assign_priorities(tasks);
    for r in &ranked {
        log_tasks!(
            verbosity,
            "  Prio. {}: {} (deadline {} s)",
            r.priority,
            r.task.name,
            r.task.deadline
        );
    }

    let load = cpu_load(&ranked);
    let wcrt = compute_wcrt(&ranked, config)?;
    let result = evaluate(ranked, &load, &wcrt, config.cpu_load_limit);

    log_summary!(verbosity, "{}", render_console_table(&result));
    log_summary!(
        verbosity,
        "Deadline overruns: {}\nTotal CPU load: {} %",
        result.deadline_overrun_count,
        result.total_cpu_load_percent
    );
    match result.verdict {
        Some(Verdict::Feasible) => log_summary!(verbosity, "=> Schedulability seems feasible"),
        Some(Verdict::Unfeasible) => log_summary!(verbosity, "=> Schedulability unfeasible"),
        None => {}
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Algorithm, SchedulingClass};
    use crate::wcrt::SolverStage;

    fn co(name: &str, wcet: f64, deadline: f64, period: f64) -> Task {
        Task::new(name, SchedulingClass::Cooperative, wcet, deadline, 1.0 / period).unwrap()
    }

    fn pe(name: &str, wcet: f64, deadline: f64, period: f64) -> Task {
        Task::new(name, SchedulingClass::Preemptive, wcet, deadline, 1.0 / period).unwrap()
    }

    fn with_limit(limit: f64) -> AnalysisConfig {
        AnalysisConfig {
            cpu_load_limit: Some(limit),
            ..Default::default()
        }
    }

    #[test]
    fn test_pure_cooperative_scenario() {
        // Given out of order to exercise priority assignment
        let tasks = vec![co("T2", 0.2, 2.0, 1.0), co("T1", 0.1, 1.0, 0.5)];
        let result = analyze(tasks, &AnalysisConfig::default()).unwrap();

        assert_eq!(result.algorithm, Algorithm::Cooperative);
        assert_eq!(result.tasks[0].name, "T1");
        assert_eq!(result.tasks[0].priority, 1);
        assert_eq!(result.tasks[1].name, "T2");
        assert_eq!(result.tasks[1].priority, 2);
        assert!((result.tasks[0].wcrt - 0.3).abs() < 1e-9);
        assert!((result.tasks[1].wcrt - 0.3).abs() < 1e-9);
        assert!(!result.tasks[0].deadline_overrun);
        assert!(!result.tasks[1].deadline_overrun);
        assert_eq!(result.deadline_overrun_count, 0);
        assert!((result.total_cpu_load_percent - 40.0).abs() < 1e-9);
        assert_eq!(result.verdict, None);
        assert_eq!(result.exit_code(), 0);
    }

    #[test]
    fn test_preemptive_fixed_point_scenario() {
        let tasks = vec![
            pe("P0", 1.0, 4.0, 4.0),
            pe("P1", 1.0, 6.0, 6.0),
            co("C0", 1.0, 100.0, 100.0),
        ];
        let result = analyze(tasks, &AnalysisConfig::default()).unwrap();
        assert_eq!(result.algorithm, Algorithm::Mixed);
        assert_eq!(result.tasks[0].wcrt, 1.0);
        assert_eq!(result.tasks[1].wcrt, 2.0);
    }

    #[test]
    fn test_mixed_result_keeps_priority_order() {
        let tasks = vec![
            co("C_low", 0.01, 0.5, 0.5),
            pe("P_high", 0.001, 0.002, 0.01),
            co("C_high", 0.005, 0.05, 0.05),
            pe("P_low", 0.002, 0.1, 0.02),
        ];
        let result = analyze(tasks, &AnalysisConfig::default()).unwrap();
        let names: Vec<&str> = result.tasks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["P_high", "C_high", "P_low", "C_low"]);
        let priorities: Vec<u32> = result.tasks.iter().map(|t| t.priority).collect();
        assert_eq!(priorities, vec![1, 2, 3, 4]);
        assert_eq!(result.tasks[0].scheduling_class, SchedulingClass::Preemptive);
        assert_eq!(result.tasks[0].wcrt, 0.001);
    }

    #[test]
    fn test_deadline_overrun_detected() {
        // T1 is blocked by the long T2: 0.1 + 0.9 = 1.0 > 0.5
        let tasks = vec![co("T1", 0.1, 0.5, 1.0), co("T2", 0.9, 2.0, 10.0)];
        let result = analyze(tasks, &with_limit(100.0)).unwrap();
        assert!(result.tasks[0].deadline_overrun);
        assert!(!result.tasks[1].deadline_overrun);
        assert_eq!(result.deadline_overrun_count, 1);
        assert_eq!(result.verdict, Some(Verdict::Unfeasible));
        assert_eq!(result.exit_code(), 1);
    }

    #[test]
    fn test_wcrt_equal_to_deadline_is_not_an_overrun() {
        let tasks = vec![co("T1", 0.25, 0.5, 1.0), co("T2", 0.25, 2.0, 1.0)];
        let result = analyze(tasks, &AnalysisConfig::default()).unwrap();
        assert_eq!(result.tasks[0].wcrt, 0.5);
        assert!(!result.tasks[0].deadline_overrun);
    }

    #[test]
    fn test_cpu_load_limit_verdicts() {
        let tasks = || vec![co("T1", 0.1, 1.0, 0.5), co("T2", 0.2, 2.0, 1.0)];

        let feasible = analyze(tasks(), &with_limit(40.5)).unwrap();
        assert_eq!(feasible.verdict, Some(Verdict::Feasible));
        assert_eq!(feasible.exit_code(), 0);

        let unfeasible = analyze(tasks(), &with_limit(30.0)).unwrap();
        assert_eq!(unfeasible.verdict, Some(Verdict::Unfeasible));
        assert_eq!(unfeasible.exit_code(), 1);
    }

    #[test]
    fn test_convergence_failure_aborts_run() {
        let tasks = vec![pe("P0", 1.0, 1.0, 1.0), co("C0", 0.5, 10.0, 10.0)];
        let outcome = analyze(tasks, &AnalysisConfig::default());
        assert!(matches!(
            outcome,
            Err(AnalysisError::Wcrt(WcrtError::ConvergenceFailure {
                stage: SolverStage::CooperativeBlocking,
                iterations: 50,
                ..
            }))
        ));
        assert_eq!(exit_code(&outcome), 1);
    }

    #[test]
    fn test_overflowing_response_time_is_a_convergence_failure() {
        let tasks = vec![pe("P0", 1e300, 1.0, 1.0), co("C0", 1.0, 2.0, 2.0)];
        let outcome = analyze(tasks, &AnalysisConfig::default());
        assert!(matches!(
            outcome,
            Err(AnalysisError::Wcrt(WcrtError::ConvergenceFailure {
                stage: SolverStage::CooperativeBlocking,
                ..
            }))
        ));
        assert_eq!(exit_code(&outcome), 1);
    }

    #[test]
    fn test_coarse_time_tick_keeps_wcrt_above_wcet() {
        let tasks = vec![co("A", 0.0001, 0.01, 0.01), co("B", 0.0001, 0.02, 0.02)];
        let config = AnalysisConfig {
            time_tick: 0.001,
            verbosity: 1,
            ..Default::default()
        };
        let result = analyze(tasks, &config).unwrap();
        for t in &result.tasks {
            assert!(t.wcrt >= t.wcet, "{}: {} < {}", t.name, t.wcrt, t.wcet);
        }
        assert_eq!(result.tasks[0].wcrt, 0.0001);
    }

    #[test]
    fn test_preemptive_only_rejected() {
        let tasks = vec![pe("P0", 0.1, 1.0, 1.0)];
        assert!(matches!(
            analyze(tasks, &AnalysisConfig::default()),
            Err(AnalysisError::Wcrt(WcrtError::InvalidTaskMix { .. }))
        ));
    }

    #[test]
    fn test_invalid_config_rejected_before_analysis() {
        let config = AnalysisConfig {
            time_tick: 11.0,
            ..Default::default()
        };
        // An otherwise invalid task mix must not be reached
        assert!(matches!(
            analyze(Vec::new(), &config),
            Err(AnalysisError::InvalidInputRange(_))
        ));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let tasks = vec![co("T1", 0.1, 1.0, 1.0), co("T1", 0.1, 2.0, 1.0)];
        assert!(matches!(
            analyze(tasks, &AnalysisConfig::default()),
            Err(AnalysisError::InvalidTask(TaskError::DuplicateName(_)))
        ));
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let tasks = || {
            vec![
                pe("P0", 0.0003, 0.001, 0.001),
                co("C0", 0.002, 0.01, 0.01),
                co("C1", 0.004, 0.05, 0.02),
            ]
        };
        let first = analyze(tasks(), &AnalysisConfig::default()).unwrap();
        let second = analyze(tasks(), &AnalysisConfig::default()).unwrap();
        assert_eq!(first, second);
    }
}
