use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::scaling::ScalingMethod;

/// An exam definition. `total_marks` is the raw mark ceiling,
/// `scaling_value` the target ceiling after scaling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Exam {
    pub id: String,
    pub name: String,
    pub total_marks: f64,
    pub scaling_value: f64,
    /// Last scaling method applied to this exam, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaling_method: Option<ScalingMethod>,
}

/// Per-exam marks held by a student: the raw mark plus the derived
/// scaled/rounded entries, which exist only after the respective pass ran.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarkRecord {
    pub raw: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaled: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounded: Option<i64>,
}

impl MarkRecord {
    /// Create a record holding only a raw mark (no derived entries yet)
    pub fn raw(mark: f64) -> Self {
        Self {
            raw: mark,
            scaled: None,
            rounded: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Student {
    pub id: String,
    pub name: String,
    /// Sparse mapping from exam id to marks. Only exams the student has
    /// taken are present.
    #[serde(default)]
    pub marks: BTreeMap<String, MarkRecord>,
}

impl Student {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            marks: BTreeMap::new(),
        }
    }

    /// Raw mark for an exam, if the student has taken it
    pub fn raw_mark(&self, exam_id: &str) -> Option<f64> {
        self.marks.get(exam_id).map(|m| m.raw)
    }

    pub fn scaled_mark(&self, exam_id: &str) -> Option<f64> {
        self.marks.get(exam_id).and_then(|m| m.scaled)
    }

    pub fn rounded_mark(&self, exam_id: &str) -> Option<i64> {
        self.marks.get(exam_id).and_then(|m| m.rounded)
    }

    /// Record a raw mark for an exam. Replaces any existing record for that
    /// exam, dropping stale scaled/rounded entries derived from the old raw.
    pub fn set_raw_mark(&mut self, exam_id: impl Into<String>, mark: f64) {
        self.marks.insert(exam_id.into(), MarkRecord::raw(mark));
    }
}

/// The full roster: students in insertion order plus the exam definitions.
/// Serialized as one versioned JSON document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Roster {
    pub version: u32,
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub exams: Vec<Exam>,
    pub saved_at: DateTime<Utc>,
}

impl Default for Roster {
    fn default() -> Self {
        Self::new()
    }
}

impl Roster {
    /// Create a new empty roster with version 1
    pub fn new() -> Self {
        Self {
            version: 1,
            students: Vec::new(),
            exams: Vec::new(),
            saved_at: Utc::now(),
        }
    }

    pub fn exam(&self, exam_id: &str) -> Option<&Exam> {
        self.exams.iter().find(|e| e.id == exam_id)
    }

    pub fn exam_mut(&mut self, exam_id: &str) -> Option<&mut Exam> {
        self.exams.iter_mut().find(|e| e.id == exam_id)
    }

    pub fn student(&self, student_id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == student_id)
    }

    pub fn student_mut(&mut self, student_id: &str) -> Option<&mut Student> {
        self.students.iter_mut().find(|s| s.id == student_id)
    }

    /// Add an exam definition.
    /// Returns false (and leaves the roster unchanged) if the id is taken.
    pub fn add_exam(&mut self, exam: Exam) -> bool {
        if self.exam(&exam.id).is_some() {
            return false;
        }
        self.exams.push(exam);
        true
    }

    /// Add a student. Returns false if the id is taken.
    pub fn add_student(&mut self, student: Student) -> bool {
        if self.student(&student.id).is_some() {
            return false;
        }
        self.students.push(student);
        true
    }

    /// Number of students holding a raw mark for the given exam
    pub fn cohort_size(&self, exam_id: &str) -> usize {
        self.students
            .iter()
            .filter(|s| s.raw_mark(exam_id).is_some())
            .count()
    }
}
