//! Exam score prediction: 60% prior-exam average, 40% attendance-scaled
//! score. Only students who attended the exam-day session are predicted.

use std::collections::{HashMap, HashSet};

use crate::models::{AttendanceFact, Exam, ExamPrediction};

const PRIOR_WEIGHT: f64 = 0.6;
const ATTENDANCE_WEIGHT: f64 = 0.4;
const DEFAULT_MAX_SCORE: f64 = 100.0;

/// Predict scores for `exam_id`. An unknown exam id yields an empty map.
pub fn predict_exam(
    exam_id: &str,
    exams: &[Exam],
    facts: &[AttendanceFact],
) -> HashMap<String, ExamPrediction> {
    let exam = match exams.iter().find(|e| e.id == exam_id) {
        Some(exam) => exam,
        None => return HashMap::new(),
    };

    let group_facts: Vec<&AttendanceFact> = facts
        .iter()
        .filter(|f| f.group_id == exam.group_id)
        .collect();
    let session_count = group_facts
        .iter()
        .map(|f| f.date.as_str())
        .collect::<HashSet<_>>()
        .len();

    // Exam-day gate: enrolled students absent on exam day get no prediction.
    let attendees: HashSet<&str> = group_facts
        .iter()
        .filter(|f| f.date == exam.date)
        .map(|f| f.student_id.as_str())
        .collect();

    let max_score = if exam.score > 0.0 {
        exam.score
    } else {
        DEFAULT_MAX_SCORE
    };

    let mut predictions = HashMap::new();

    for student_id in attendees {
        let attended = group_facts
            .iter()
            .filter(|f| f.student_id == student_id)
            .count();
        let rate = if session_count > 0 {
            attended as f64 / session_count as f64
        } else {
            1.0
        };
        let attendance_score = rate * max_score;

        let prev = prior_scores(student_id, exam, exams);
        let predicted = if prev.is_empty() {
            attendance_score
        } else {
            let prev_avg = prev.iter().sum::<f64>() / prev.len() as f64;
            PRIOR_WEIGHT * prev_avg + ATTENDANCE_WEIGHT * attendance_score
        };

        predictions.insert(
            student_id.to_string(),
            ExamPrediction {
                predicted: round_to_cents(predicted),
                // Risk is judged on the unrounded value.
                at_risk: predicted < 0.5 * max_score,
            },
        );
    }

    predictions
}

/// Recorded scores for `student_id` in every other exam of the same group.
/// Matching is by `group_id` alone; `grade_id` is deliberately ignored,
/// matching the historical behavior of the score-entry screens.
fn prior_scores(student_id: &str, exam: &Exam, exams: &[Exam]) -> Vec<f64> {
    exams
        .iter()
        .filter(|other| other.id != exam.id && other.group_id == exam.group_id)
        .filter_map(|other| {
            other
                .students
                .iter()
                .find(|entry| entry.id == student_id)
                .and_then(|entry| entry.score)
        })
        .collect()
}

/// Half-up rounding at the hundredths digit.
fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExamEntry;

    fn fact(group: &str, student: &str, date: &str) -> AttendanceFact {
        AttendanceFact {
            group_id: group.to_string(),
            student_id: student.to_string(),
            date: date.to_string(),
        }
    }

    fn exam(id: &str, group: &str, date: &str, score: f64, entries: &[(&str, Option<f64>)]) -> Exam {
        Exam {
            id: id.to_string(),
            group_id: group.to_string(),
            grade_id: "grade-1".to_string(),
            date: date.to_string(),
            score,
            students: entries
                .iter()
                .map(|(sid, s)| ExamEntry {
                    id: sid.to_string(),
                    score: *s,
                })
                .collect(),
        }
    }

    #[test]
    fn only_exam_day_attendees_are_predicted() {
        let exams = vec![exam("e1", "g", "2024-01-08", 100.0, &[])];
        let facts = vec![
            fact("g", "s1", "2024-01-01"),
            fact("g", "s1", "2024-01-08"),
            fact("g", "s2", "2024-01-01"),
        ];

        let predictions = predict_exam("e1", &exams, &facts);
        assert!(predictions.contains_key("s1"));
        assert!(!predictions.contains_key("s2"));
        assert_eq!(predictions.len(), 1);
    }

    #[test]
    fn no_prior_scores_falls_back_to_attendance_score() {
        let exams = vec![exam("e1", "g", "2024-01-08", 100.0, &[])];
        let facts = vec![
            fact("g", "s1", "2024-01-01"),
            fact("g", "s1", "2024-01-08"),
        ];

        let predictions = predict_exam("e1", &exams, &facts);
        // Full attendance, max 100: predicted == attendance score exactly.
        assert_eq!(predictions["s1"].predicted, 100.0);
        assert!(!predictions["s1"].at_risk);
    }

    #[test]
    fn blends_prior_average_with_attendance() {
        let exams = vec![
            exam("e1", "g", "2024-01-08", 100.0, &[]),
            exam("e0", "g", "2024-01-01", 100.0, &[("s1", Some(80.0)), ("s1-other", Some(10.0))]),
        ];
        let facts = vec![
            fact("g", "s1", "2024-01-01"),
            fact("g", "s1", "2024-01-08"),
        ];

        let predictions = predict_exam("e1", &exams, &facts);
        // 0.6 * 80 + 0.4 * (1.0 * 100) = 88
        assert_eq!(predictions["s1"].predicted, 88.0);
    }

    #[test]
    fn prior_match_ignores_grade_id() {
        let mut other = exam("e0", "g", "2024-01-01", 100.0, &[("s1", Some(40.0))]);
        other.grade_id = "grade-9".to_string();
        let exams = vec![exam("e1", "g", "2024-01-08", 100.0, &[]), other];
        let facts = vec![fact("g", "s1", "2024-01-08")];

        let predictions = predict_exam("e1", &exams, &facts);
        // Rate 1/1; 0.6 * 40 + 0.4 * 100 = 64. The grade mismatch does not
        // exclude the prior exam.
        assert_eq!(predictions["s1"].predicted, 64.0);
    }

    #[test]
    fn prior_exams_from_other_groups_are_excluded() {
        let exams = vec![
            exam("e1", "g", "2024-01-08", 100.0, &[]),
            exam("e0", "other-group", "2024-01-01", 100.0, &[("s1", Some(5.0))]),
        ];
        let facts = vec![fact("g", "s1", "2024-01-08")];

        let predictions = predict_exam("e1", &exams, &facts);
        assert_eq!(predictions["s1"].predicted, 100.0);
    }

    #[test]
    fn unscored_entries_do_not_count_as_priors() {
        let exams = vec![
            exam("e1", "g", "2024-01-08", 100.0, &[]),
            exam("e0", "g", "2024-01-01", 100.0, &[("s1", None)]),
        ];
        let facts = vec![fact("g", "s1", "2024-01-08")];

        let predictions = predict_exam("e1", &exams, &facts);
        assert_eq!(predictions["s1"].predicted, 100.0);
    }

    #[test]
    fn unknown_exam_yields_empty_result() {
        let exams = vec![exam("e1", "g", "2024-01-08", 100.0, &[])];
        assert!(predict_exam("missing", &exams, &[]).is_empty());
    }

    #[test]
    fn zero_max_score_falls_back_to_one_hundred() {
        let exams = vec![exam("e1", "g", "2024-01-08", 0.0, &[])];
        let facts = vec![
            fact("g", "s1", "2024-01-08"),
            fact("g", "s2", "2024-01-01"),
        ];

        let predictions = predict_exam("e1", &exams, &facts);
        // s1 attended 1 of 2 sessions: 0.5 * 100 = 50, not below half.
        assert_eq!(predictions["s1"].predicted, 50.0);
        assert!(!predictions["s1"].at_risk);
    }

    #[test]
    fn flags_predictions_below_half_of_max() {
        let exams = vec![
            exam("e1", "g", "2024-01-08", 50.0, &[]),
            exam("e0", "g", "2024-01-01", 50.0, &[("s1", Some(10.0))]),
        ];
        let facts = vec![
            fact("g", "s1", "2024-01-08"),
            fact("g", "s2", "2024-01-01"),
        ];

        let predictions = predict_exam("e1", &exams, &facts);
        // Rate 0.5, attendance score 25: 0.6 * 10 + 0.4 * 25 = 16 < 25.
        assert_eq!(predictions["s1"].predicted, 16.0);
        assert!(predictions["s1"].at_risk);
    }

    #[test]
    fn rounds_to_two_decimals() {
        // Two of three sessions attended, no priors: 2/3 * 100 = 66.666...
        let exams = vec![exam("e1", "g", "2024-01-08", 100.0, &[])];
        let facts = vec![
            fact("g", "s1", "2024-01-01"),
            fact("g", "s1", "2024-01-08"),
            fact("g", "s2", "2024-01-04"),
        ];

        let predictions = predict_exam("e1", &exams, &facts);
        assert_eq!(predictions["s1"].predicted, 66.67);
        assert_eq!(round_to_cents(66.664), 66.66);
    }
}
