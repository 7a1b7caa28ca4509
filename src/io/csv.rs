use anyhow::{bail, Context, Result};
use std::collections::HashSet;
use std::io::{Read, Write};
use std::path::Path;

use super::report::ExamReport;
use crate::roster::types::{Roster, Student};

/// Outcome of a CSV import, for CLI reporting
#[derive(Debug, Default, PartialEq)]
pub struct ImportSummary {
    pub students_added: usize,
    pub students_updated: usize,
    pub marks_set: usize,
}

/// One parsed CSV row, staged until the whole file has validated
struct StagedRow {
    student_id: String,
    name: String,
    marks: Vec<(String, f64)>, // (exam id, raw mark)
}

/// Import students and raw marks from wide-format CSV.
///
/// Expected header: `student_id,name,<exam-id>,<exam-id>,...` where every
/// exam column names an exam already defined on the roster. Each row
/// upserts a student; blank cells mean the student has not taken that
/// exam. A newly imported raw mark replaces the student's whole record
/// for that exam, dropping stale scaled/rounded entries.
///
/// The import is all-or-nothing: every problem in the file is collected
/// and reported at once, and the roster is only modified when the whole
/// file is valid.
pub fn import_marks(roster: &mut Roster, reader: impl Read) -> Result<ImportSummary> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut errors: Vec<String> = Vec::new();

    let headers = csv_reader.headers().context("Failed to read CSV header")?;
    let columns: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();

    if columns.len() < 2
        || !columns[0].eq_ignore_ascii_case("student_id")
        || !columns[1].eq_ignore_ascii_case("name")
    {
        bail!("CSV header must start with 'student_id,name' (got '{}')", columns.join(","));
    }

    let exam_columns = &columns[2..];
    for exam_id in exam_columns {
        if roster.exam(exam_id).is_none() {
            errors.push(format!(
                "column '{}': no such exam on the roster (add it with 'add-exam' first)",
                exam_id
            ));
        }
    }

    let mut staged: Vec<StagedRow> = Vec::new();
    let mut seen_ids: HashSet<String> = HashSet::new();

    for (i, record) in csv_reader.records().enumerate() {
        let line = i + 2; // 1-based, after the header
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                errors.push(format!("line {}: {}", line, e));
                continue;
            }
        };

        let student_id = record.get(0).unwrap_or("").trim().to_string();
        if student_id.is_empty() {
            errors.push(format!("line {}: empty student_id", line));
            continue;
        }
        if !seen_ids.insert(student_id.clone()) {
            errors.push(format!("line {}: duplicate student_id '{}'", line, student_id));
            continue;
        }
        let name = record.get(1).unwrap_or("").trim().to_string();

        let mut marks = Vec::new();
        for (col, exam_id) in exam_columns.iter().enumerate() {
            let cell = record.get(col + 2).unwrap_or("").trim();
            if cell.is_empty() {
                continue; // exam not taken
            }
            let mark: f64 = match cell.parse() {
                Ok(v) => v,
                Err(_) => {
                    errors.push(format!(
                        "line {}, column '{}': '{}' is not a number",
                        line, exam_id, cell
                    ));
                    continue;
                }
            };
            if !mark.is_finite() {
                errors.push(format!(
                    "line {}, column '{}': mark must be finite",
                    line, exam_id
                ));
                continue;
            }
            if let Some(exam) = roster.exam(exam_id) {
                if mark < 0.0 || mark > exam.total_marks {
                    errors.push(format!(
                        "line {}, column '{}': mark {} outside 0..={}",
                        line, exam_id, mark, exam.total_marks
                    ));
                    continue;
                }
            }
            marks.push((exam_id.clone(), mark));
        }

        staged.push(StagedRow {
            student_id,
            name,
            marks,
        });
    }

    if !errors.is_empty() {
        bail!("CSV import failed:\n  {}", errors.join("\n  "));
    }

    let mut summary = ImportSummary::default();
    for row in staged {
        match roster.student_mut(&row.student_id) {
            Some(student) => {
                if !row.name.is_empty() {
                    student.name = row.name;
                }
                for (exam_id, mark) in row.marks {
                    student.set_raw_mark(exam_id, mark);
                    summary.marks_set += 1;
                }
                summary.students_updated += 1;
            }
            None => {
                let mut student = Student::new(row.student_id, row.name);
                for (exam_id, mark) in row.marks {
                    student.set_raw_mark(exam_id, mark);
                    summary.marks_set += 1;
                }
                roster.add_student(student);
                summary.students_added += 1;
            }
        }
    }

    Ok(summary)
}

/// Import from a file path (see [`import_marks`])
pub fn import_marks_from_path(roster: &mut Roster, path: &Path) -> Result<ImportSummary> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open CSV file at {}", path.display()))?;
    import_marks(roster, file)
}

/// Write a per-exam report as CSV: `student_id,name,raw,scaled,rounded`
/// with blank cells for absent entries.
pub fn write_exam_csv(report: &ExamReport, writer: impl Write) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(["student_id", "name", "raw", "scaled", "rounded"])
        .context("Failed to write CSV header")?;

    for row in &report.rows {
        csv_writer
            .write_record([
                row.student_id.as_str(),
                row.name.as_str(),
                &row.raw.map(|v| v.to_string()).unwrap_or_default(),
                &row.scaled.map(|v| v.to_string()).unwrap_or_default(),
                &row.rounded.map(|v| v.to_string()).unwrap_or_default(),
            ])
            .with_context(|| format!("Failed to write CSV row for {}", row.student_id))?;
    }

    csv_writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::report::exam_report;
    use crate::roster::types::{Exam, MarkRecord};

    fn roster_with_exams() -> Roster {
        let mut roster = Roster::new();
        roster.add_exam(Exam {
            id: "E1".to_string(),
            name: "Midterm".to_string(),
            total_marks: 100.0,
            scaling_value: 50.0,
            scaling_method: None,
        });
        roster.add_exam(Exam {
            id: "E2".to_string(),
            name: "Final".to_string(),
            total_marks: 60.0,
            scaling_value: 100.0,
            scaling_method: None,
        });
        roster
    }

    #[test]
    fn test_import_adds_students_and_marks() {
        let mut roster = roster_with_exams();
        let csv = "student_id,name,E1,E2\nS1,Ada,80,55\nS2,Ben,60,\n";

        let summary = import_marks(&mut roster, csv.as_bytes()).unwrap();

        assert_eq!(
            summary,
            ImportSummary {
                students_added: 2,
                students_updated: 0,
                marks_set: 3,
            }
        );
        assert_eq!(roster.student("S1").unwrap().raw_mark("E1"), Some(80.0));
        assert_eq!(roster.student("S1").unwrap().raw_mark("E2"), Some(55.0));
        assert_eq!(roster.student("S2").unwrap().raw_mark("E1"), Some(60.0));
        assert!(roster.student("S2").unwrap().raw_mark("E2").is_none());
    }

    #[test]
    fn test_import_updates_existing_student() {
        let mut roster = roster_with_exams();
        roster.add_student(Student::new("S1", "Ada"));

        let csv = "student_id,name,E1\nS1,Ada Lovelace,90\n";
        let summary = import_marks(&mut roster, csv.as_bytes()).unwrap();

        assert_eq!(summary.students_added, 0);
        assert_eq!(summary.students_updated, 1);
        assert_eq!(roster.student("S1").unwrap().name, "Ada Lovelace");
        assert_eq!(roster.student("S1").unwrap().raw_mark("E1"), Some(90.0));
    }

    #[test]
    fn test_import_replaces_record_dropping_derived_marks() {
        let mut roster = roster_with_exams();
        let mut student = Student::new("S1", "Ada");
        student.marks.insert(
            "E1".to_string(),
            MarkRecord {
                raw: 80.0,
                scaled: Some(40.0),
                rounded: Some(40),
            },
        );
        roster.add_student(student);

        import_marks(&mut roster, "student_id,name,E1\nS1,Ada,85\n".as_bytes()).unwrap();

        let record = roster.student("S1").unwrap().marks.get("E1").unwrap();
        assert_eq!(record.raw, 85.0);
        assert!(record.scaled.is_none());
        assert!(record.rounded.is_none());
    }

    #[test]
    fn test_import_unknown_exam_column_fails_whole_file() {
        let mut roster = roster_with_exams();
        let csv = "student_id,name,E9\nS1,Ada,80\n";

        let err = import_marks(&mut roster, csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("E9"));
        assert!(roster.students.is_empty());
    }

    #[test]
    fn test_import_bad_header_fails() {
        let mut roster = roster_with_exams();
        let err = import_marks(&mut roster, "id,who,E1\nS1,Ada,80\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("student_id"));
    }

    #[test]
    fn test_import_collects_all_errors_and_leaves_roster_untouched() {
        let mut roster = roster_with_exams();
        let csv = "student_id,name,E1\nS1,Ada,eighty\n,NoId,50\nS1,Dup,70\nS3,Cee,900\n";

        let err = import_marks(&mut roster, csv.as_bytes()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("line 2"), "{}", message);
        assert!(message.contains("empty student_id"), "{}", message);
        assert!(message.contains("duplicate student_id 'S1'"), "{}", message);
        assert!(message.contains("outside 0..=100"), "{}", message);
        assert!(roster.students.is_empty());
    }

    #[test]
    fn test_import_rejects_out_of_range_against_each_exam_ceiling() {
        let mut roster = roster_with_exams();
        // 70 is fine for E1 (/100) but over E2's ceiling of 60
        let err =
            import_marks(&mut roster, "student_id,name,E2\nS1,Ada,70\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("outside 0..=60"));
    }

    #[test]
    fn test_export_roundtrip_blank_cells() {
        let mut roster = roster_with_exams();
        let mut s1 = Student::new("S1", "Ada");
        s1.marks.insert(
            "E1".to_string(),
            MarkRecord {
                raw: 80.0,
                scaled: Some(40.5),
                rounded: Some(41),
            },
        );
        roster.add_student(s1);
        roster.add_student(Student::new("S2", "Ben"));

        let report = exam_report(&roster, "E1").unwrap();
        let mut buf = Vec::new();
        write_exam_csv(&report, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "student_id,name,raw,scaled,rounded");
        assert_eq!(lines[1], "S1,Ada,80,40.5,41");
        assert_eq!(lines[2], "S2,Ben,,,");
    }
}
