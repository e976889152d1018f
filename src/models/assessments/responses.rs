use serde::Serialize;
use ts_rs::TS;

use super::entities::{Assessment, AssessmentSubmission};
use crate::models::common::PaginationInfo;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct AssessmentListResponse {
    pub items: Vec<Assessment>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct AssessmentSubmissionListResponse {
    pub items: Vec<AssessmentSubmission>,
}

// 提交结果
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct SubmitAssessmentResponse {
    pub submission: AssessmentSubmission,
    /// 仍有主观题待人工评分
    pub needs_manual_grading: bool,
    pub remaining_attempts: i32,
}
