use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub grade: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub grade_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

/// Membership edge between a student and a group. Duplicate pairs are
/// tolerated as weak references, never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentGroup {
    pub group_id: String,
    pub student_id: String,
}

/// One presence fact: the student attended this group's session on this
/// date. Absence is never recorded. The date is an opaque calendar-day
/// string and is only ever compared for exact equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceFact {
    pub group_id: String,
    pub student_id: String,
    pub date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    pub id: String,
    pub group_id: String,
    pub grade_id: String,
    pub date: String,
    /// Maximum attainable points. Zero or missing falls back to 100 when
    /// predicting.
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub students: Vec<ExamEntry>,
}

/// Earned score for one student in one exam sitting. `score` stays `None`
/// until entered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamEntry {
    pub id: String,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct RiskAssessment {
    pub student_id: String,
    pub attendance_rate: f64,
    pub group_avg: f64,
    pub group_std: f64,
    pub reason: RiskReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskReason {
    BelowSeventyPercent,
    BelowGroupAverage,
}

impl RiskReason {
    pub fn label(&self) -> &'static str {
        match self {
            RiskReason::BelowSeventyPercent => "Below 70%",
            RiskReason::BelowGroupAverage => "Below group average",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExamPrediction {
    pub predicted: f64,
    pub at_risk: bool,
}
