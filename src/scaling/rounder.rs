use super::error::ScalingError;
use crate::roster::types::Student;

/// Convert scaled marks for one exam into whole-number rounded marks.
///
/// Rounds half away from zero (12.4 -> 12, 12.5 -> 13, -0.5 -> -1), which
/// is exactly `f64::round`. Students without a scaled mark for this exam
/// are left unchanged and get no rounded entry. Pure: the input slice is
/// never mutated, and no rounded entry is written when an error is
/// returned.
pub fn round(students: &[Student], exam_id: &str) -> Result<Vec<Student>, ScalingError> {
    // Fail fast so a poisoned scaled mark never becomes a rounded integer
    for student in students {
        if let Some(scaled) = student.scaled_mark(exam_id) {
            if !scaled.is_finite() {
                return Err(ScalingError::NonFinite {
                    student_id: student.id.clone(),
                    exam_id: exam_id.to_string(),
                });
            }
        }
    }

    let mut updated = students.to_vec();
    for student in &mut updated {
        if let Some(record) = student.marks.get_mut(exam_id) {
            if let Some(scaled) = record.scaled {
                record.rounded = Some(scaled.round() as i64);
            }
        }
    }

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::types::MarkRecord;

    fn student_with_scaled(id: &str, exam_id: &str, raw: f64, scaled: f64) -> Student {
        let mut student = Student::new(id, format!("Student {}", id));
        student.marks.insert(
            exam_id.to_string(),
            MarkRecord {
                raw,
                scaled: Some(scaled),
                rounded: None,
            },
        );
        student
    }

    fn rounded_of(students: &[Student], id: &str) -> Option<i64> {
        students
            .iter()
            .find(|s| s.id == id)
            .unwrap()
            .rounded_mark("E1")
    }

    #[test]
    fn test_rounds_half_away_from_zero() {
        let students = vec![
            student_with_scaled("S1", "E1", 80.0, 12.4),
            student_with_scaled("S2", "E1", 81.0, 12.5),
            student_with_scaled("S3", "E1", 82.0, 12.6),
            student_with_scaled("S4", "E1", 1.0, -0.5),
        ];
        let updated = round(&students, "E1").unwrap();
        assert_eq!(rounded_of(&updated, "S1"), Some(12));
        assert_eq!(rounded_of(&updated, "S2"), Some(13));
        assert_eq!(rounded_of(&updated, "S3"), Some(13));
        assert_eq!(rounded_of(&updated, "S4"), Some(-1));
    }

    #[test]
    fn test_idempotent_on_integer_scaled_marks() {
        let students = vec![student_with_scaled("S1", "E1", 80.0, 40.0)];
        let once = round(&students, "E1").unwrap();
        let twice = round(&once, "E1").unwrap();
        assert_eq!(rounded_of(&once, "S1"), Some(40));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_students_without_scaled_mark_unchanged() {
        let mut raw_only = Student::new("S1", "Ada");
        raw_only.set_raw_mark("E1", 80.0);
        let students = vec![raw_only, Student::new("S2", "Ben")];

        let updated = round(&students, "E1").unwrap();
        assert_eq!(updated, students);
        assert!(updated[0].rounded_mark("E1").is_none());
    }

    #[test]
    fn test_other_exam_entries_untouched() {
        let mut student = student_with_scaled("S1", "E1", 80.0, 40.2);
        student.marks.insert(
            "E2".to_string(),
            MarkRecord {
                raw: 10.0,
                scaled: Some(5.5),
                rounded: None,
            },
        );

        let updated = round(&[student], "E1").unwrap();
        assert_eq!(updated[0].rounded_mark("E1"), Some(40));
        assert!(updated[0].rounded_mark("E2").is_none());
    }

    #[test]
    fn test_non_finite_scaled_mark_rejected() {
        let students = vec![
            student_with_scaled("S1", "E1", 80.0, 40.0),
            student_with_scaled("S2", "E1", 81.0, f64::NAN),
        ];
        let err = round(&students, "E1").unwrap_err();
        assert_eq!(
            err,
            ScalingError::NonFinite {
                student_id: "S2".to_string(),
                exam_id: "E1".to_string(),
            }
        );
    }

    #[test]
    fn test_input_is_not_mutated() {
        let students = vec![student_with_scaled("S1", "E1", 80.0, 40.2)];
        let before = students.clone();
        let _ = round(&students, "E1").unwrap();
        assert_eq!(students, before);
    }
}
