use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::submissions::entities::SubmissionStatus;

// 作业状态
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub enum AssignmentStatus {
    Draft,
    Published,
    Closed,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Draft => "draft",
            AssignmentStatus::Published => "published",
            AssignmentStatus::Closed => "closed",
        }
    }
}

impl<'de> Deserialize<'de> for AssignmentStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<AssignmentStatus>().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的作业状态: '{s}'. 支持的状态: draft, published, closed"
            ))
        })
    }
}

impl std::fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AssignmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(AssignmentStatus::Draft),
            "published" => Ok(AssignmentStatus::Published),
            "closed" => Ok(AssignmentStatus::Closed),
            _ => Err(format!("Invalid assignment status: {s}")),
        }
    }
}

// 作业实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct Assignment {
    pub id: i64,
    pub course_id: i64,
    pub created_by: i64,
    pub title: String,
    pub description: Option<String>,
    pub max_points: f64,
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
    /// 迟交扣分百分比
    pub late_penalty: f64,
    pub status: AssignmentStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 作业提交
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct AssignmentSubmission {
    pub id: i64,
    pub assignment_id: i64,
    pub student_id: i64,
    pub content: Option<String>,
    /// 扣分前的人工评分
    pub raw_grade: Option<f64>,
    /// 最终人工评分
    pub grade: Option<f64>,
    /// 自动评分（已扣分）
    pub auto_grade: Option<f64>,
    pub status: SubmissionStatus,
    pub is_late: bool,
    pub feedback: Option<String>,
    pub time_spent: i64,
    pub graded_by: Option<i64>,
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub graded_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl AssignmentSubmission {
    /// 计分：人工评分优先，其次自动评分，都没有时为 0
    pub fn effective_score(&self) -> f64 {
        self.grade.or(self.auto_grade).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_score() {
        let now = chrono::Utc::now();
        let mut submission = AssignmentSubmission {
            id: 1,
            assignment_id: 1,
            student_id: 2,
            content: Some("essay".into()),
            raw_grade: None,
            grade: None,
            auto_grade: None,
            status: SubmissionStatus::Submitted,
            is_late: false,
            feedback: None,
            time_spent: 0,
            graded_by: None,
            submitted_at: Some(now),
            graded_at: None,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(submission.effective_score(), 0.0);
        submission.auto_grade = Some(70.0);
        assert_eq!(submission.effective_score(), 70.0);
        submission.grade = Some(85.0);
        assert_eq!(submission.effective_score(), 85.0);
    }
}
