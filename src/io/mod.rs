pub mod csv;
pub mod report;

pub use self::csv::{import_marks, import_marks_from_path, write_exam_csv, ImportSummary};
pub use report::{exam_report, write_json, ExamReport, ReportRow};
