use serde::Serialize;
use ts_rs::TS;

use super::entities::{Assignment, AssignmentSubmission};
use crate::models::common::PaginationInfo;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct AssignmentListResponse {
    pub items: Vec<Assignment>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct AssignmentSubmissionListResponse {
    pub items: Vec<AssignmentSubmission>,
}
