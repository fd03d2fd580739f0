//! Diagnostic output of a schedulability run, written to stderr.
//!
//! `AnalysisConfig::verbosity` selects how much of the pipeline is traced.
//! Each level includes everything below it:
//!
//! | level | constant               | printed                                         |
//! |-------|------------------------|-------------------------------------------------|
//! | 0     | `VERBOSITY_SILENT`     | nothing; failures only surface as `Err`         |
//! | 1     | `VERBOSITY_SUMMARY`    | input table, WCRT algorithm, timing table, verdict |
//! | 2     | `VERBOSITY_TASKS`      | DM priority, PE WCRT and CO R' per task         |
//! | 3     | `VERBOSITY_ITERATIONS` | every step `R(m) -> R(m+1)` of the recurrence   |
//!
//! The format arguments are not evaluated when the level is off.

pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_SUMMARY: u8 = 1;
pub const VERBOSITY_TASKS: u8 = 2;
pub const VERBOSITY_ITERATIONS: u8 = 3;

/// Whole-run output: the table as read, the chosen algorithm, the final
/// timing table, total CPU load and the verdict.
#[macro_export]
macro_rules! log_summary {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_SUMMARY {
            eprintln!($($arg)*);
        }
    };
}

/// One line per task: its DM priority, the WCRT of each PE task, and the
/// preemption-inflated cost R' each CO task feeds into the blocking stage.
#[macro_export]
macro_rules! log_tasks {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_TASKS {
            eprintln!($($arg)*);
        }
    };
}

/// Fixed-point solver trace. Noisy on large tables.
#[macro_export]
macro_rules! log_iterations {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_ITERATIONS {
            eprintln!($($arg)*);
        }
    };
}
