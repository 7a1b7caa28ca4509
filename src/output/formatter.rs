use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::io::report::ExamReport;
use crate::roster::types::Exam;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format an optional mark for table display.
/// Absent entries render as "-"; whole numbers drop the decimals.
pub fn format_mark(mark: Option<f64>) -> String {
    match mark {
        None => "-".to_string(),
        Some(v) => {
            if v == v.trunc() {
                format!("{:.0}", v)
            } else {
                format!("{:.2}", v)
            }
        }
    }
}

fn format_rounded(mark: Option<i64>) -> String {
    match mark {
        None => "-".to_string(),
        Some(v) => v.to_string(),
    }
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format a per-exam report as a table with columns:
/// index, student id, name, raw, scaled, rounded.
/// Index is 1-based and right-aligned; mark columns are right-aligned.
pub fn format_exam_table(report: &ExamReport, use_colors: bool) -> String {
    if report.rows.is_empty() {
        return "No students on the roster.".to_string();
    }

    let id_width = report
        .rows
        .iter()
        .map(|r| r.student_id.chars().count())
        .max()
        .unwrap_or(2)
        .max(2);
    let mark_width = 8;
    let sep = "  ";

    // Name column: whatever the terminal leaves after the fixed columns,
    // capped so wide terminals don't stretch the table
    let fixed_width = 4 + id_width + sep.len() * 4 + mark_width * 3;
    let name_width = match get_terminal_width() {
        Some(width) if width > fixed_width + 10 => (width - fixed_width).min(24),
        _ => 24,
    };

    let header = format!(
        "{:>3} {:<id$}{sep}{:<name$}{sep}{:>mw$}{sep}{:>mw$}{sep}{:>mw$}",
        "#",
        "id",
        "name",
        "raw",
        "scaled",
        "rounded",
        id = id_width,
        name = name_width,
        mw = mark_width,
        sep = sep,
    );
    let header = if use_colors {
        header.dimmed().to_string()
    } else {
        header
    };

    let mut lines = vec![header];
    for (idx, row) in report.rows.iter().enumerate() {
        // Pad columns before styling so ANSI escapes don't skew the widths
        let index_str = format!("{:>2}.", idx + 1);
        let id_padded = format!("{:<width$}", row.student_id, width = id_width);
        let name_padded = format!(
            "{:<width$}",
            truncate_name(&row.name, name_width),
            width = name_width
        );
        let raw = format!("{:>width$}", format_mark(row.raw), width = mark_width);
        let scaled = format!("{:>width$}", format_mark(row.scaled), width = mark_width);
        let rounded = format!("{:>width$}", format_rounded(row.rounded), width = mark_width);

        let line = if use_colors {
            format!(
                "{} {}{sep}{}{sep}{}{sep}{}{sep}{}",
                index_str.dimmed(),
                id_padded.cyan(),
                name_padded,
                raw,
                scaled.bold(),
                rounded.bold(),
                sep = sep,
            )
        } else {
            format!(
                "{} {}{sep}{}{sep}{}{sep}{}{sep}{}",
                index_str, id_padded, name_padded, raw, scaled, rounded,
                sep = sep,
            )
        };
        lines.push(line);
    }

    lines.join("\n")
}

/// Format exam definitions, one line per exam:
/// "{id}  {name}  raw /{total} -> scaled /{value}  [{method}]"
pub fn format_exam_list(exams: &[Exam], use_colors: bool) -> String {
    if exams.is_empty() {
        return "No exams defined.".to_string();
    }

    exams
        .iter()
        .map(|exam| {
            let method = exam
                .scaling_method
                .map(|m| m.as_str())
                .unwrap_or("unscaled");
            if use_colors {
                format!(
                    "{}  {}  raw /{} -> scaled /{}  [{}]",
                    exam.id.cyan(),
                    exam.name.bold(),
                    format_mark(Some(exam.total_marks)),
                    format_mark(Some(exam.scaling_value)),
                    method.yellow(),
                )
            } else {
                format!(
                    "{}  {}  raw /{} -> scaled /{}  [{}]",
                    exam.id,
                    exam.name,
                    format_mark(Some(exam.total_marks)),
                    format_mark(Some(exam.scaling_value)),
                    method,
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
