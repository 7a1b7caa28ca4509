use thiserror::Error;

/// Errors surfaced by the scaling engine and the rounding pass.
/// Both passes are all-or-nothing: on error the caller's roster is
/// untouched and can be retried after fixing inputs.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScalingError {
    #[error("exam {exam_id}: total_marks must be positive to scale (got {total_marks})")]
    Configuration { exam_id: String, total_marks: f64 },

    #[error("student {student_id}: non-finite mark for exam {exam_id}")]
    NonFinite {
        student_id: String,
        exam_id: String,
    },
}
