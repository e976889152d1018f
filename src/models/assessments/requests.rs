use serde::Deserialize;
use ts_rs::TS;

use super::entities::{AssessmentType, Question};
use crate::models::common::PaginationQuery;
use crate::models::submissions::entities::SubmittedAnswer;

// 创建测评请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct CreateAssessmentRequest {
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub assessment_type: AssessmentType,
    #[serde(default)]
    pub questions: Vec<Question>,
    /// 缺省时为各题分值之和
    pub total_points: Option<f64>,
    pub passing_score: Option<f64>,
    pub attempts: Option<i32>,
    pub late_penalty: Option<f64>,
    pub available_from: Option<chrono::DateTime<chrono::Utc>>,
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
}

// 更新测评请求
#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct UpdateAssessmentRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assessment_type: Option<AssessmentType>,
    pub questions: Option<Vec<Question>>,
    pub total_points: Option<f64>,
    pub passing_score: Option<f64>,
    pub attempts: Option<i32>,
    pub late_penalty: Option<f64>,
    pub available_from: Option<chrono::DateTime<chrono::Utc>>,
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
    pub is_archived: Option<bool>,
}

// 测评列表查询参数
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct AssessmentListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "crate::models::common::query::deserialize_optional_id")]
    pub course_id: Option<i64>,
    pub assessment_type: Option<AssessmentType>,
    #[serde(default, deserialize_with = "crate::models::common::query::deserialize_lenient_bool")]
    pub include_archived: bool,
}

// 测评列表查询（存储层）
#[derive(Debug, Clone, Default)]
pub struct AssessmentListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub course_ids: Option<Vec<i64>>,
    pub assessment_type: Option<AssessmentType>,
    pub include_archived: bool,
}

// 提交测评请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct SubmitAssessmentRequest {
    pub answers: Vec<SubmittedAnswer>,
    #[serde(default)]
    pub time_spent: i64,
    /// 保存为草稿，不计入尝试次数
    #[serde(default)]
    pub is_draft: bool,
}

// 新建测评提交（存储层）
#[derive(Debug, Clone)]
pub struct NewAssessmentSubmission {
    pub assessment_id: i64,
    pub course_id: i64,
    pub student_id: i64,
    pub attempt_number: i32,
    pub answers: Vec<crate::models::submissions::entities::GradedAnswer>,
    /// 自动判分得到的原始分
    pub raw_score: Option<f64>,
    /// 无需人工评分时直接给出最终分
    pub score: Option<f64>,
    pub status: crate::models::submissions::entities::SubmissionStatus,
    pub is_late: bool,
    pub time_spent: i64,
    pub submitted_at: Option<i64>,
}

// 测评评分更新（存储层）
#[derive(Debug, Clone)]
pub struct AssessmentGradeUpdate {
    pub raw_score: f64,
    pub score: f64,
    pub feedback: Option<String>,
    pub graded_by: i64,
    pub graded_at: i64,
}
