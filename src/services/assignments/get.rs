use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AssignmentService, load_assignment};
use crate::models::{
    ApiResponse, ErrorCode, assignments::entities::AssignmentStatus, users::entities::UserRole,
};
use crate::services::courses::course_for_view;
use crate::services::{current_user, not_found};

pub async fn get_assignment(
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
    // 草稿对学生不可见
    if user.role == UserRole::Student && assignment.status == AssignmentStatus::Draft {
        return Ok(not_found(
            ErrorCode::AssignmentNotFound,
            "Assignment not found",
        ));
    }
    if let Err(resp) = course_for_view(storage.as_ref(), &user, assignment.course_id).await {
        return Ok(resp);
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        assignment,
        "Assignment retrieved successfully",
    )))
}
