//! Loader for CSV timing tables.
//!
//! Expected format (comment lines start with `#`, whitespace after commas is ignored):
//!
//! ```text
//! Task, Sched., Deadline in s, Freq. in Hz, WCET in s
//! tick_isr, pe, 0.001, 1000, 0.00001
//! blink, co, 0.5, 2, 0.0001
//! "uart rx, ch#2", pe, 0.0005, 2000, 0.00002
//! ```
//!
//! Fields may be double-quoted to hold `,` or `#`; `""` inside quotes is a
//! literal `"`. An unquoted `#` starts a comment running to the end of the line.
//! Surrounding whitespace is trimmed from every field, quoted or not.

use std::path::Path;
use thiserror::Error;

use crate::models::{SchedulingClass, Task, TaskError};

pub const COLUMN_TASK: &str = "Task";
pub const COLUMN_SCHED: &str = "Sched.";
pub const COLUMN_WCET: &str = "WCET in s";
pub const COLUMN_DEADLINE: &str = "Deadline in s";
pub const COLUMN_FREQUENCY: &str = "Freq. in Hz";

/// Errors that can occur while loading a timing table.
#[derive(Error, Debug)]
pub enum TaskTableError {
    #[error("Failed to read timing table: {0}")]
    Io(#[from] std::io::Error),
    #[error("Timing table has no header line")]
    MissingHeader,
    #[error("Timing table is missing column {0:?}")]
    MissingColumn(&'static str),
    #[error("Line {line}: expected {expected} fields, found {found}")]
    ColumnCount {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("Line {line}: column {column:?} is not a number: {value:?}")]
    InvalidNumber {
        line: usize,
        column: &'static str,
        value: String,
    },
    #[error("Line {line}: unterminated quoted field")]
    UnterminatedQuote { line: usize },
    #[error("Line {line}: {source}")]
    Task { line: usize, source: TaskError },
}

/// Column positions of the required fields.
struct Header {
    width: usize,
    task: usize,
    sched: usize,
    wcet: usize,
    deadline: usize,
    frequency: usize,
}

impl Header {
    fn parse(fields: &[String]) -> Result<Self, TaskTableError> {
        let find = |name: &'static str| {
            fields
                .iter()
                .position(|f| *f == name)
                .ok_or(TaskTableError::MissingColumn(name))
        };
        Ok(Self {
            width: fields.len(),
            task: find(COLUMN_TASK)?,
            sched: find(COLUMN_SCHED)?,
            wcet: find(COLUMN_WCET)?,
            deadline: find(COLUMN_DEADLINE)?,
            frequency: find(COLUMN_FREQUENCY)?,
        })
    }
}

/// Split a row into trimmed fields, honoring double quotes and `#` comments.
fn split_fields(line: usize, row: &str) -> Result<Vec<String>, TaskTableError> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = row.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => fields.push(std::mem::take(&mut field).trim().to_string()),
                '#' => break,
                _ => field.push(c),
            }
        }
    }

    if in_quotes {
        return Err(TaskTableError::UnterminatedQuote { line });
    }
    fields.push(field.trim().to_string());
    Ok(fields)
}

fn parse_number(line: usize, column: &'static str, value: &str) -> Result<f64, TaskTableError> {
    value
        .parse::<f64>()
        .map_err(|_| TaskTableError::InvalidNumber {
            line,
            column,
            value: value.to_string(),
        })
}

/// Parse a timing table into tasks, in file order.
pub fn load_task_table(text: &str) -> Result<Vec<Task>, TaskTableError> {
    let mut rows = text
        .lines()
        .enumerate()
        .map(|(idx, raw)| (idx + 1, raw.trim()))
        .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'));

    let (header_no, header_line) = rows.next().ok_or(TaskTableError::MissingHeader)?;
    let columns = Header::parse(&split_fields(header_no, header_line)?)?;

    let mut tasks = Vec::new();
    for (line, row) in rows {
        let fields = split_fields(line, row)?;
        if fields.len() != columns.width {
            return Err(TaskTableError::ColumnCount {
                line,
                expected: columns.width,
                found: fields.len(),
            });
        }

        let class = fields[columns.sched]
            .parse::<SchedulingClass>()
            .map_err(|source| TaskTableError::Task { line, source })?;
        let wcet = parse_number(line, COLUMN_WCET, &fields[columns.wcet])?;
        let deadline = parse_number(line, COLUMN_DEADLINE, &fields[columns.deadline])?;
        let frequency = parse_number(line, COLUMN_FREQUENCY, &fields[columns.frequency])?;

        let task = Task::new(fields[columns.task].as_str(), class, wcet, deadline, frequency)
            .map_err(|source| TaskTableError::Task { line, source })?;
        tasks.push(task);
    }

    Ok(tasks)
}

/// Read and parse a timing table file.
pub fn load_task_table_file(path: impl AsRef<Path>) -> Result<Vec<Task>, TaskTableError> {
    let text = std::fs::read_to_string(path)?;
    load_task_table(&text)
}
