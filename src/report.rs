use std::fmt::Write;

use chrono::Utc;

use crate::attendance;
use crate::models::{Exam, RiskAssessment, Student};
use crate::predict;
use crate::risk;
use crate::store::Snapshot;

pub fn student_name<'a>(students: &'a [Student], id: &'a str) -> &'a str {
    students
        .iter()
        .find(|s| s.id == id)
        .map(|s| s.name.as_str())
        .unwrap_or(id)
}

/// Worst attendance first.
pub fn sort_by_rate(assessments: &mut [RiskAssessment]) {
    assessments.sort_by(|a, b| {
        a.attendance_rate
            .partial_cmp(&b.attendance_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

pub fn build_report(snapshot: &Snapshot, group_id: &str) -> String {
    let members = attendance::member_ids(&snapshot.student_groups, group_id);
    let grouped = attendance::grouped_attendance(&snapshot.attendance, group_id);
    let mut assessments = risk::assess_group(&members, &snapshot.attendance, group_id);
    sort_by_rate(&mut assessments);

    let mut output = String::new();

    let _ = writeln!(output, "# Group Report: {group_id}");
    let _ = writeln!(
        output,
        "Generated {} ({} members, {} sessions)",
        Utc::now().date_naive(),
        members.len(),
        grouped.session_count()
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Session Attendance");

    if grouped.by_date.is_empty() {
        let _ = writeln!(output, "No sessions recorded for this group.");
    } else {
        for date in grouped.by_date.keys() {
            let attended = grouped.attended_ids(date).len();
            let _ = writeln!(
                output,
                "- {}: attended {}, unattended {}",
                date,
                attended,
                grouped.unattended_count(date, &members)
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## At-Risk Students");

    if assessments.is_empty() {
        let _ = writeln!(output, "No students flagged in this group.");
    } else {
        for assessment in &assessments {
            let _ = writeln!(
                output,
                "- {} attendance {:.0}% (group avg {:.0}%, std {:.0}%): {}",
                student_name(&snapshot.students, &assessment.student_id),
                assessment.attendance_rate * 100.0,
                assessment.group_avg * 100.0,
                assessment.group_std * 100.0,
                assessment.reason.label()
            );
        }
    }

    let group_exams: Vec<&Exam> = snapshot
        .exams
        .iter()
        .filter(|e| e.group_id == group_id)
        .collect();

    let _ = writeln!(output);
    let _ = writeln!(output, "## Exam Predictions");

    if group_exams.is_empty() {
        let _ = writeln!(output, "No exams recorded for this group.");
    }

    for exam in group_exams {
        let _ = writeln!(output);
        let _ = writeln!(output, "### Exam {} ({})", exam.id, exam.date);

        let predictions = predict::predict_exam(&exam.id, &snapshot.exams, &snapshot.attendance);
        if predictions.is_empty() {
            let _ = writeln!(output, "No students attended on the exam date.");
            continue;
        }

        let mut rows: Vec<_> = predictions.into_iter().collect();
        rows.sort_by(|a, b| {
            student_name(&snapshot.students, &a.0).cmp(student_name(&snapshot.students, &b.0))
        });

        for (student_id, prediction) in rows {
            let _ = writeln!(
                output,
                "- {}: predicted {:.2}{}",
                student_name(&snapshot.students, &student_id),
                prediction.predicted,
                if prediction.at_risk { " (At Risk)" } else { "" }
            );
        }
    }

    output
}
