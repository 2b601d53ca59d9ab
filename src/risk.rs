//! Attendance-based risk flags for one group.

use std::collections::HashSet;

use crate::models::{AttendanceFact, RiskAssessment, RiskReason};

const RATE_FLOOR: f64 = 0.7;

/// Flag members whose attendance rate falls below 70%, or failing that,
/// more than one standard deviation below the group average. Students who
/// clear both thresholds are left out of the result entirely.
///
/// A group with no attended sessions produces no assessments at all.
pub fn assess_group(
    members: &[String],
    facts: &[AttendanceFact],
    group_id: &str,
) -> Vec<RiskAssessment> {
    let group_facts: Vec<&AttendanceFact> =
        facts.iter().filter(|f| f.group_id == group_id).collect();
    let total_sessions = group_facts
        .iter()
        .map(|f| f.date.as_str())
        .collect::<HashSet<_>>()
        .len();

    if total_sessions == 0 || members.is_empty() {
        return Vec::new();
    }

    let rates: Vec<f64> = members
        .iter()
        .map(|member| {
            let attended = group_facts
                .iter()
                .filter(|f| f.student_id == *member)
                .count();
            attended as f64 / total_sessions as f64
        })
        .collect();

    // Population statistics over every member, denominator N.
    let group_avg = rates.iter().sum::<f64>() / rates.len() as f64;
    let variance = rates
        .iter()
        .map(|rate| (rate - group_avg).powi(2))
        .sum::<f64>()
        / rates.len() as f64;
    let group_std = variance.sqrt();

    members
        .iter()
        .zip(&rates)
        .filter_map(|(member, &rate)| {
            let reason = if rate < RATE_FLOOR {
                RiskReason::BelowSeventyPercent
            } else if rate < group_avg - group_std {
                RiskReason::BelowGroupAverage
            } else {
                return None;
            };
            Some(RiskAssessment {
                student_id: member.clone(),
                attendance_rate: rate,
                group_avg,
                group_std,
                reason,
            })
        })
        .collect()
}
