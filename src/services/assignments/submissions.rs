use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AssignmentService, load_assignment};
use crate::models::{ApiResponse, assignments::responses::AssignmentSubmissionListResponse};
use crate::services::courses::{CourseAccess, course_for_view};
use crate::services::{current_user, internal_error};

pub async fn list_submissions(
    service: &AssignmentService,
    assignment_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    let assignment = match load_assignment(storage.as_ref(), assignment_id).await {
        Ok(assignment) => assignment,
        Err(resp) => return Ok(resp),
    };
    let course = match course_for_view(storage.as_ref(), &user, assignment.course_id).await {
        Ok(course) => course,
        Err(resp) => return Ok(resp),
    };

    let student_filter = (!CourseAccess::can_manage(&user, &course)).then_some(user.id);

    match storage
        .list_assignment_submissions(assignment_id, student_filter)
        .await
    {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            AssignmentSubmissionListResponse { items },
            "Submissions retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to retrieve submissions", e)),
    }
}
