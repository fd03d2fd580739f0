//! Timing table rendering: Markdown report files and the console echo.

use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{AnalysisResult, Task};

/// The three Markdown tables written for one analysis run.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkdownReports {
    /// Input timing table in priority order.
    pub input: String,
    /// Derived per-task values.
    pub output: String,
    /// Objective summary and verdict.
    pub summary: String,
}

const INPUT_HEADER: [&str; 6] = [
    "Task",
    "Prio.",
    "Sched.",
    "Deadline in s",
    "Freq. in Hz",
    "WCET in s",
];

const OUTPUT_HEADER: [&str; 5] = [
    "Task",
    "Period in s",
    "CPU util. in %",
    "WCRT in s",
    "Deadline overrun?",
];

fn input_rows(result: &AnalysisResult) -> Vec<Vec<String>> {
    result
        .tasks
        .iter()
        .map(|t| {
            vec![
                t.name.clone(),
                t.priority.to_string(),
                t.scheduling_class.to_string(),
                t.deadline.to_string(),
                t.frequency.to_string(),
                t.wcet.to_string(),
            ]
        })
        .collect()
}

fn output_rows(result: &AnalysisResult) -> Vec<Vec<String>> {
    result
        .tasks
        .iter()
        .map(|t| {
            vec![
                t.name.clone(),
                t.period.to_string(),
                t.utilization_percent.to_string(),
                t.wcrt.to_string(),
                if t.deadline_overrun { "True" } else { "False" }.to_string(),
            ]
        })
        .collect()
}

fn summary_rows(result: &AnalysisResult) -> Vec<Vec<String>> {
    let mut rows = vec![
        vec![
            "Deadline overruns".to_string(),
            result.deadline_overrun_count.to_string(),
        ],
        vec![
            "Total CPU load".to_string(),
            format!("{} %", result.total_cpu_load_percent),
        ],
    ];
    if let Some(verdict) = result.verdict {
        rows.push(vec!["Schedulability".to_string(), verdict.to_string()]);
    }
    rows
}

fn markdown_table(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    out.push_str(&format!("| {} |\n", header.join(" | ")));
    out.push_str(&format!(
        "|{}|\n",
        header.iter().map(|_| "---").collect::<Vec<_>>().join("|")
    ));
    for row in rows {
        out.push_str(&format!("| {} |\n", row.join(" | ")));
    }
    out
}

/// Render the input, output and summary tables as Markdown.
pub fn render_markdown_reports(result: &AnalysisResult) -> MarkdownReports {
    MarkdownReports {
        input: markdown_table(&INPUT_HEADER, &input_rows(result)),
        output: markdown_table(&OUTPUT_HEADER, &output_rows(result)),
        summary: markdown_table(&["Objective", "Value"], &summary_rows(result)),
    }
}

fn with_suffix(output_base: &Path, suffix: &str) -> PathBuf {
    let mut name = output_base.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Write `<base>-in.md`, `<base>-out.md` and `<base>-res.md`.
///
/// Returns the paths written, in that order.
pub fn write_markdown_reports(
    result: &AnalysisResult,
    output_base: impl AsRef<Path>,
) -> std::io::Result<Vec<PathBuf>> {
    let base = output_base.as_ref();
    let reports = render_markdown_reports(result);
    let files = [
        (with_suffix(base, "-in.md"), reports.input),
        (with_suffix(base, "-out.md"), reports.output),
        (with_suffix(base, "-res.md"), reports.summary),
    ];

    let mut written = Vec::with_capacity(files.len());
    for (path, content) in files {
        fs::write(&path, content)?;
        written.push(path);
    }
    Ok(written)
}

/// Right-aligned plain-text table, columns separated by two spaces.
fn padded_table(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.len());
        }
    }

    let format_row = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:>w$}", c, w = *w))
            .collect::<Vec<_>>()
            .join("  ")
    };

    let mut lines = Vec::with_capacity(rows.len() + 1);
    let header_cells: Vec<String> = header.iter().map(|h| h.to_string()).collect();
    lines.push(format_row(&header_cells));
    for row in rows {
        lines.push(format_row(row));
    }
    lines.join("\n")
}

/// The task table as read, before priorities are assigned.
pub fn render_input_echo(tasks: &[Task]) -> String {
    let header: Vec<&str> = INPUT_HEADER
        .iter()
        .filter(|h| **h != "Prio.")
        .copied()
        .collect();
    let rows: Vec<Vec<String>> = tasks
        .iter()
        .map(|t| {
            vec![
                t.name.clone(),
                t.scheduling_class.to_string(),
                t.deadline.to_string(),
                t.frequency.to_string(),
                t.wcet.to_string(),
            ]
        })
        .collect();
    padded_table(&header, &rows)
}

/// Plain-text table of every task and its derived values, columns padded.
pub fn render_console_table(result: &AnalysisResult) -> String {
    let header: Vec<&str> = INPUT_HEADER
        .iter()
        .chain(OUTPUT_HEADER.iter().skip(1))
        .copied()
        .collect();
    let rows: Vec<Vec<String>> = input_rows(result)
        .into_iter()
        .zip(output_rows(result))
        .map(|(mut input, output)| {
            input.extend(output.into_iter().skip(1));
            input
        })
        .collect();
    padded_table(&header, &rows)
}
