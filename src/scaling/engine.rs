use super::error::ScalingError;
use super::method::ScalingMethod;
use super::stats;
use crate::roster::types::{Exam, Student};

/// Apply a scaling method to one exam across the roster.
///
/// For every student with a raw mark for `exam.id`, computes a new scaled
/// mark out of `exam.scaling_value`. Students without a raw mark for this
/// exam, and entries for every other exam, are carried through unchanged.
///
/// The input slice is never mutated; the result is a full new student
/// vector. An empty cohort is a valid no-op. Errors are all-or-nothing:
/// no student is updated when one is returned.
pub fn apply(
    students: &[Student],
    exam: &Exam,
    method: ScalingMethod,
) -> Result<Vec<Student>, ScalingError> {
    // Cohort: students holding a raw mark for this exam, in roster order
    let cohort: Vec<(usize, f64)> = students
        .iter()
        .enumerate()
        .filter_map(|(i, s)| s.raw_mark(&exam.id).map(|raw| (i, raw)))
        .collect();

    if cohort.is_empty() {
        return Ok(students.to_vec());
    }

    // Reject poisoned input before any statistic is computed. A single NaN
    // mean would corrupt every student in the cohort.
    for (i, raw) in &cohort {
        if !raw.is_finite() {
            return Err(ScalingError::NonFinite {
                student_id: students[*i].id.clone(),
                exam_id: exam.id.clone(),
            });
        }
    }

    let raws: Vec<f64> = cohort.iter().map(|(_, raw)| *raw).collect();
    let scaled = match method {
        ScalingMethod::BellCurve => bell_curve(&raws, exam.scaling_value),
        ScalingMethod::LinearNormalization => linear(&raws, exam)?,
        ScalingMethod::MinMaxNormalization => min_max(&raws, exam.scaling_value),
        ScalingMethod::Percentile => percentile(&raws, exam.scaling_value),
    };

    let mut updated = students.to_vec();
    for ((index, _), value) in cohort.iter().zip(scaled) {
        if let Some(record) = updated[*index].marks.get_mut(&exam.id) {
            record.scaled = Some(value);
        }
    }

    Ok(updated)
}

/// Center the cohort at `scaling_value / 2` with one standard deviation
/// spanning `scaling_value / 6`, i.e. roughly ±3σ across the target range.
/// Not clamped: extreme raw marks can scale outside [0, scaling_value] so
/// outliers stay visible to the caller.
fn bell_curve(raws: &[f64], scaling_value: f64) -> Vec<f64> {
    let mu = stats::mean(raws);
    let sigma = stats::population_std_dev(raws);

    raws.iter()
        .map(|raw| {
            // All marks equal: z is 0 for everyone
            let z = if sigma == 0.0 { 0.0 } else { (raw - mu) / sigma };
            scaling_value / 2.0 + z * scaling_value / 6.0
        })
        .collect()
}

/// Pure per-student ratio of raw to the exam's raw ceiling.
fn linear(raws: &[f64], exam: &Exam) -> Result<Vec<f64>, ScalingError> {
    if exam.total_marks <= 0.0 {
        return Err(ScalingError::Configuration {
            exam_id: exam.id.clone(),
            total_marks: exam.total_marks,
        });
    }

    Ok(raws
        .iter()
        .map(|raw| raw / exam.total_marks * exam.scaling_value)
        .collect())
}

/// Stretch the cohort so its minimum lands on 0 and its maximum on
/// `scaling_value`. An all-equal cohort gets full scaling credit.
fn min_max(raws: &[f64], scaling_value: f64) -> Vec<f64> {
    let (min, max) = match stats::min_max(raws) {
        Some(pair) => pair,
        None => return Vec::new(),
    };

    if max == min {
        return vec![scaling_value; raws.len()];
    }

    raws.iter()
        .map(|raw| (raw - min) / (max - min) * scaling_value)
        .collect()
}

/// Rank-based scaling: the highest raw mark maps to `scaling_value`, the
/// lowest to 0, evenly spaced by descending rank. Tied marks share the
/// rank of their first occurrence in descending order.
fn percentile(raws: &[f64], scaling_value: f64) -> Vec<f64> {
    let n = raws.len();
    if n == 1 {
        // No meaningful spread for a single student
        return vec![scaling_value];
    }

    stats::rank_positions(raws)
        .into_iter()
        .map(|rank| (n - 1 - rank) as f64 / (n - 1) as f64 * scaling_value)
        .collect()
}
