use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::grading::{Badge, ImprovementTrend, ItemKind, LetterGrade, TimeWindow};
use crate::models::submissions::entities::SubmissionStatus;
use crate::models::users::entities::UserSummary;

/// 排行榜为空时的提示
pub const EMPTY_LEADERBOARD_MESSAGE: &str = "No assessments or assignments have been completed yet. The leaderboard will populate once students start submitting their work.";

// 单条成绩
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct StudentGrade {
    /// 提交 ID
    pub id: i64,
    pub item_type: ItemKind,
    pub item_id: i64,
    pub title: String,
    pub course_id: i64,
    pub course_title: String,
    pub student: UserSummary,
    pub score: f64,
    pub max_score: f64,
    pub percentage: i64,
    pub letter_grade: LetterGrade,
    pub status: SubmissionStatus,
    pub is_late: bool,
    pub feedback: Option<String>,
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub graded_at: Option<chrono::DateTime<chrono::Utc>>,
}

// 成绩列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct GradeListResponse {
    pub grades: Vec<StudentGrade>,
    pub total: usize,
    /// 已评分条目的总体百分比，没有已评分条目时为 None
    pub average_percentage: Option<i64>,
}

// 排行榜条目明细
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct LeaderboardItemDetail {
    pub item_type: ItemKind,
    pub item_id: i64,
    pub title: String,
    pub course_id: i64,
    pub score: f64,
    pub max_score: f64,
    pub percentage: i64,
    pub letter_grade: LetterGrade,
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
}

// 排行榜条目
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub student: UserSummary,
    pub total_points: f64,
    pub average_score: i64,
    pub completed_assessments: usize,
    pub completed_assignments: usize,
    pub streak: usize,
    pub improvement: i64,
    pub badges: Vec<Badge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<LeaderboardItemDetail>>,
}

// 排行榜响应
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct LeaderboardResponse {
    pub entries: Vec<LeaderboardEntry>,
    /// 截断前上榜学生数
    pub total_students: usize,
    pub time_filter: TimeWindow,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LeaderboardResponse {
    pub fn new(entries: Vec<LeaderboardEntry>, total_students: usize, time_filter: TimeWindow) -> Self {
        let message = if entries.is_empty() {
            Some(EMPTY_LEADERBOARD_MESSAGE.to_string())
        } else {
            None
        };
        Self {
            entries,
            total_students,
            time_filter,
            message,
        }
    }
}

// 学生统计
#[derive(Debug, Clone, Serialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct CourseStats {
    pub total_assessments: i64,
    pub completed_assessments: i64,
    pub total_assignments: i64,
    pub completed_assignments: i64,
    pub average_grade: i64,
    /// 未上榜时为 0
    pub current_rank: usize,
    pub total_students: usize,
    pub improvement_trend: ImprovementTrend,
    pub strong_subjects: Vec<String>,
    pub improvement_areas: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_leaderboard_carries_message() {
        let response = LeaderboardResponse::new(vec![], 0, TimeWindow::All);
        assert_eq!(response.message.as_deref(), Some(EMPTY_LEADERBOARD_MESSAGE));

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["message"], EMPTY_LEADERBOARD_MESSAGE);
        assert_eq!(json["total_students"], 0);
    }
}
