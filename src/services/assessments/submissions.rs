use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AssessmentService, load_assessment};
use crate::models::{ApiResponse, assessments::responses::AssessmentSubmissionListResponse};
use crate::services::courses::{CourseAccess, course_for_view};
use crate::services::{current_user, internal_error};

pub async fn list_submissions(
    service: &AssessmentService,
    assessment_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    let assessment = match load_assessment(storage.as_ref(), assessment_id).await {
        Ok(assessment) => assessment,
        Err(resp) => return Ok(resp),
    };
    let course = match course_for_view(storage.as_ref(), &user, assessment.course_id).await {
        Ok(course) => course,
        Err(resp) => return Ok(resp),
    };

    // 学生只能看到自己的提交
    let student_filter = (!CourseAccess::can_manage(&user, &course)).then_some(user.id);

    match storage
        .list_assessment_submissions(assessment_id, student_filter)
        .await
    {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            AssessmentSubmissionListResponse { items },
            "Submissions retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to retrieve submissions", e)),
    }
}
