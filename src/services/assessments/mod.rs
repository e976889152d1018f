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
    assessments::{
        entities::{Assessment, AssessmentSubmission},
        requests::{
            AssessmentListParams, CreateAssessmentRequest, SubmitAssessmentRequest,
            UpdateAssessmentRequest,
        },
    },
    submissions::requests::GradeSubmissionRequest,
};
use crate::services::{internal_error, not_found};
use crate::storage::Storage;

pub struct AssessmentService {
    storage: Option<Arc<dyn Storage>>,
}

impl AssessmentService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    // 创建测评
    pub async fn create_assessment(
        &self,
        assessment_data: CreateAssessmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_assessment(self, assessment_data, request).await
    }

    // 测评列表
    pub async fn list_assessments(
        &self,
        query: AssessmentListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_assessments(self, query, request).await
    }

    // 测评详情
    pub async fn get_assessment(
        &self,
        assessment_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        get::get_assessment(self, assessment_id, request).await
    }

    // 更新测评
    pub async fn update_assessment(
        &self,
        assessment_id: i64,
        update_data: UpdateAssessmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_assessment(self, assessment_id, update_data, request).await
    }

    // 学生提交测评
    pub async fn submit_assessment(
        &self,
        assessment_id: i64,
        submit_data: SubmitAssessmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        submit::submit_assessment(self, assessment_id, submit_data, request).await
    }

    // 测评提交列表
    pub async fn list_submissions(
        &self,
        assessment_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        submissions::list_submissions(self, assessment_id, request).await
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

pub(crate) async fn load_assessment(
    storage: &dyn Storage,
    assessment_id: i64,
) -> Result<Assessment, HttpResponse> {
    match storage.get_assessment_by_id(assessment_id).await {
        Ok(Some(assessment)) => Ok(assessment),
        Ok(None) => Err(not_found(
            ErrorCode::AssessmentNotFound,
            "Assessment not found",
        )),
        Err(e) => Err(internal_error("Failed to load assessment", e)),
    }
}

/// 提交及其所属测评
pub(crate) async fn load_submission(
    storage: &dyn Storage,
    submission_id: i64,
) -> Result<(AssessmentSubmission, Assessment), HttpResponse> {
    let submission = match storage.get_assessment_submission_by_id(submission_id).await {
        Ok(Some(submission)) => submission,
        Ok(None) => {
            return Err(not_found(
                ErrorCode::AssessmentSubmissionNotFound,
                "Assessment submission not found",
            ));
        }
        Err(e) => return Err(internal_error("Failed to load assessment submission", e)),
    };
    let assessment = load_assessment(storage, submission.assessment_id).await?;
    Ok((submission, assessment))
}
