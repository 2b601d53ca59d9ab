use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::models::{AttendanceFact, Exam, ExamEntry, Group, Student, StudentGroup};

/// A full export of the center's collections, as one JSON document. The
/// real backing store is an external document database; this tool only ever
/// sees a snapshot of it. Missing collections deserialize as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub students: Vec<Student>,
    pub groups: Vec<Group>,
    pub student_groups: Vec<StudentGroup>,
    pub attendance: Vec<AttendanceFact>,
    pub exams: Vec<Exam>,
}

impl Snapshot {
    pub fn load(path: &Path) -> anyhow::Result<Snapshot> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read snapshot {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse snapshot {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)
            .with_context(|| format!("failed to write snapshot {}", path.display()))
    }
}

/// Merge attendance facts from CSV (`groupId,studentId,date` headers) into
/// the snapshot. Facts already present are skipped; returns the number
/// actually inserted.
pub fn import_attendance<R: Read>(snapshot: &mut Snapshot, reader: R) -> anyhow::Result<usize> {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct CsvRow {
        group_id: String,
        student_id: String,
        date: String,
    }

    let mut existing: HashSet<(String, String, String)> = snapshot
        .attendance
        .iter()
        .map(|f| (f.group_id.clone(), f.student_id.clone(), f.date.clone()))
        .collect();

    let mut reader = csv::Reader::from_reader(reader);
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result.context("malformed attendance CSV row")?;
        let key = (row.group_id.clone(), row.student_id.clone(), row.date.clone());
        if !existing.insert(key) {
            continue;
        }
        snapshot.attendance.push(AttendanceFact {
            group_id: row.group_id,
            student_id: row.student_id,
            date: row.date,
        });
        inserted += 1;
    }

    Ok(inserted)
}

/// Small realistic snapshot for trying the tool out.
pub fn seed() -> Snapshot {
    let students = vec![
        student("stu-001", "Avery Lee", "grade-10"),
        student("stu-002", "Jules Moreno", "grade-10"),
        student("stu-003", "Kiara Patel", "grade-10"),
        student("stu-004", "Omar Haddad", "grade-11"),
        student("stu-005", "Lena Fischer", "grade-11"),
    ];

    let groups = vec![
        Group {
            id: "grp-alg-a".to_string(),
            grade_id: "grade-10".to_string(),
            day: Some("Monday".to_string()),
            time: Some("16:00".to_string()),
        },
        Group {
            id: "grp-phy-b".to_string(),
            grade_id: "grade-11".to_string(),
            day: Some("Wednesday".to_string()),
            time: Some("18:00".to_string()),
        },
    ];

    let student_groups = vec![
        membership("grp-alg-a", "stu-001"),
        membership("grp-alg-a", "stu-002"),
        membership("grp-alg-a", "stu-003"),
        membership("grp-phy-b", "stu-004"),
        membership("grp-phy-b", "stu-005"),
    ];

    let mut attendance = Vec::new();
    for date in ["2026-02-02", "2026-02-09", "2026-02-16"] {
        attendance.push(present("grp-alg-a", "stu-001", date));
        attendance.push(present("grp-alg-a", "stu-002", date));
    }
    attendance.push(present("grp-alg-a", "stu-003", "2026-02-02"));
    attendance.push(present("grp-phy-b", "stu-004", "2026-02-04"));
    attendance.push(present("grp-phy-b", "stu-005", "2026-02-04"));
    attendance.push(present("grp-phy-b", "stu-004", "2026-02-11"));

    let exams = vec![
        Exam {
            id: "exam-alg-1".to_string(),
            group_id: "grp-alg-a".to_string(),
            grade_id: "grade-10".to_string(),
            date: "2026-02-09".to_string(),
            score: 50.0,
            students: vec![
                ExamEntry {
                    id: "stu-001".to_string(),
                    score: Some(42.0),
                },
                ExamEntry {
                    id: "stu-002".to_string(),
                    score: Some(21.0),
                },
            ],
        },
        Exam {
            id: "exam-alg-2".to_string(),
            group_id: "grp-alg-a".to_string(),
            grade_id: "grade-10".to_string(),
            date: "2026-02-16".to_string(),
            score: 50.0,
            students: Vec::new(),
        },
    ];

    Snapshot {
        students,
        groups,
        student_groups,
        attendance,
        exams,
    }
}

fn student(id: &str, name: &str, grade: &str) -> Student {
    Student {
        id: id.to_string(),
        name: name.to_string(),
        grade: grade.to_string(),
        student_phone: None,
        parent_phone: None,
    }
}

fn membership(group: &str, student: &str) -> StudentGroup {
    StudentGroup {
        group_id: group.to_string(),
        student_id: student.to_string(),
    }
}

fn present(group: &str, student: &str, date: &str) -> AttendanceFact {
    AttendanceFact {
        group_id: group.to_string(),
        student_id: student.to_string(),
        date: date.to_string(),
    }
}
