pub mod create;
pub mod get;
pub mod grade;
pub mod list;
pub mod return_submission;
pub mod submissions;
pub mod submit;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::{
    ErrorCode,
    assignments::{
        entities::{Assignment, AssignmentSubmission},
        requests::{
            AssignmentListParams, CreateAssignmentRequest, SubmitAssignmentRequest,
            UpdateAssignmentRequest,
        },
    },
    submissions::requests::GradeSubmissionRequest,
};
use crate::services::{internal_error, not_found};
use crate::storage::Storage;

pub struct AssignmentService {
    storage: Option<Arc<dyn Storage>>,
}

impl AssignmentService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    // 创建作业
    pub async fn create_assignment(
        &self,
        assignment_data: CreateAssignmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_assignment(self, assignment_data, request).await
    }

    // 作业列表
    pub async fn list_assignments(
        &self,
        query: AssignmentListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_assignments(self, query, request).await
    }

    // 作业详情
    pub async fn get_assignment(
        &self,
        assignment_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        get::get_assignment(self, assignment_id, request).await
    }

    // 更新作业
    pub async fn update_assignment(
        &self,
        assignment_id: i64,
        update_data: UpdateAssignmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_assignment(self, assignment_id, update_data, request).await
    }

    // 学生提交作业
    pub async fn submit_assignment(
        &self,
        assignment_id: i64,
        submit_data: SubmitAssignmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        submit::submit_assignment(self, assignment_id, submit_data, request).await
    }

    // 作业提交列表
    pub async fn list_submissions(
        &self,
        assignment_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        submissions::list_submissions(self, assignment_id, request).await
    }

    // 评分
    pub async fn grade_submission(
        &self,
        submission_id: i64,
        grade_data: GradeSubmissionRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        grade::grade_submission(self, submission_id, grade_data, request).await
    }

    // 发还
    pub async fn return_submission(
        &self,
        submission_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        return_submission::return_submission(self, submission_id, request).await
    }
}

pub(crate) async fn load_assignment(
    storage: &dyn Storage,
    assignment_id: i64,
) -> Result<Assignment, HttpResponse> {
    match storage.get_assignment_by_id(assignment_id).await {
        Ok(Some(assignment)) => Ok(assignment),
        Ok(None) => Err(not_found(
            ErrorCode::AssignmentNotFound,
            "Assignment not found",
        )),
        Err(e) => Err(internal_error("Failed to load assignment", e)),
    }
}

/// 提交及其所属作业
pub(crate) async fn load_submission(
    storage: &dyn Storage,
    submission_id: i64,
) -> Result<(AssignmentSubmission, Assignment), HttpResponse> {
    let submission = match storage.get_assignment_submission_by_id(submission_id).await {
        Ok(Some(submission)) => submission,
        Ok(None) => {
            return Err(not_found(
                ErrorCode::AssignmentSubmissionNotFound,
                "Assignment submission not found",
            ));
        }
        Err(e) => return Err(internal_error("Failed to load assignment submission", e)),
    };
    let assignment = load_assignment(storage, submission.assignment_id).await?;
    Ok((submission, assignment))
}
