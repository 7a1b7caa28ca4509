use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

use crate::roster::types::Roster;
use crate::scaling::ScalingMethod;

/// Per-exam report of the raw/scaled/rounded triad for every student on
/// the roster, in roster order. This is the record handed to downstream
/// consumers (CSV/JSON export).
#[derive(Debug, Serialize)]
pub struct ExamReport {
    pub exam_id: String,
    pub exam_name: String,
    pub total_marks: f64,
    pub scaling_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scaling_method: Option<ScalingMethod>,
    pub generated_at: DateTime<Utc>,
    pub rows: Vec<ReportRow>,
}

#[derive(Debug, Serialize)]
pub struct ReportRow {
    pub student_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scaled: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rounded: Option<i64>,
}

/// Build the report for one exam. Students without a mark for the exam
/// still appear, with empty cells.
pub fn exam_report(roster: &Roster, exam_id: &str) -> Result<ExamReport> {
    let exam = roster
        .exam(exam_id)
        .with_context(|| format!("No exam with id '{}'", exam_id))?;

    let rows = roster
        .students
        .iter()
        .map(|student| ReportRow {
            student_id: student.id.clone(),
            name: student.name.clone(),
            raw: student.raw_mark(exam_id),
            scaled: student.scaled_mark(exam_id),
            rounded: student.rounded_mark(exam_id),
        })
        .collect();

    Ok(ExamReport {
        exam_id: exam.id.clone(),
        exam_name: exam.name.clone(),
        total_marks: exam.total_marks,
        scaling_value: exam.scaling_value,
        scaling_method: exam.scaling_method,
        generated_at: Utc::now(),
        rows,
    })
}

/// Write a report as pretty-printed JSON
pub fn write_json(report: &ExamReport, mut writer: impl Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, report).context("Failed to serialize report")?;
    writer.write_all(b"\n").context("Failed to write report")?;
    Ok(())
}
