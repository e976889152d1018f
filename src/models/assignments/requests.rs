use serde::Deserialize;
use ts_rs::TS;

use super::entities::AssignmentStatus;
use crate::models::common::PaginationQuery;

// 创建作业请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct CreateAssignmentRequest {
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub max_points: Option<f64>,
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
    pub late_penalty: Option<f64>,
    pub status: Option<AssignmentStatus>,
}

// 更新作业请求
#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct UpdateAssignmentRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub max_points: Option<f64>,
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
    pub late_penalty: Option<f64>,
    pub status: Option<AssignmentStatus>,
}

// 作业列表查询参数
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct AssignmentListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "crate::models::common::query::deserialize_optional_id")]
    pub course_id: Option<i64>,
    pub status: Option<AssignmentStatus>,
}

// 作业列表查询（存储层）
#[derive(Debug, Clone, Default)]
pub struct AssignmentListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub course_ids: Option<Vec<i64>>,
    pub status: Option<AssignmentStatus>,
    /// 学生视图不列出草稿
    pub exclude_drafts: bool,
}

// 提交作业请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct SubmitAssignmentRequest {
    pub content: Option<String>,
    #[serde(default)]
    pub time_spent: i64,
    #[serde(default)]
    pub is_draft: bool,
}

// 新建作业提交（存储层）
#[derive(Debug, Clone)]
pub struct NewAssignmentSubmission {
    pub assignment_id: i64,
    pub student_id: i64,
    pub content: Option<String>,
    pub status: crate::models::submissions::entities::SubmissionStatus,
    pub is_late: bool,
    pub time_spent: i64,
    pub submitted_at: Option<i64>,
}

// 作业评分更新（存储层）
#[derive(Debug, Clone)]
pub struct AssignmentGradeUpdate {
    /// 人工评分：原始分与最终分
    pub manual: Option<(f64, f64)>,
    /// 自动评分（已扣分）
    pub auto_grade: Option<f64>,
    pub feedback: Option<String>,
    pub graded_by: i64,
    pub graded_at: i64,
}
