use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::create::validate_settings;
use super::{AssignmentService, load_assignment};
use crate::models::{ApiResponse, ErrorCode, assignments::requests::UpdateAssignmentRequest};
use crate::services::courses::course_for_manage;
use crate::services::grades::bump_leaderboard_generation;
use crate::services::{bad_request, current_user, internal_error, not_found};
use crate::utils::validate::validate_title;

pub async fn update_assignment(
    service: &AssignmentService,
    assignment_id: i64,
    mut update_data: UpdateAssignmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    let existing = match load_assignment(storage.as_ref(), assignment_id).await {
        Ok(assignment) => assignment,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = course_for_manage(storage.as_ref(), &user, existing.course_id).await {
        return Ok(resp);
    }

    if let Some(title) = update_data.title.as_deref() {
        if let Err(msg) = validate_title(title) {
            return Ok(bad_request(ErrorCode::BadRequest, msg));
        }
        update_data.title = Some(title.trim().to_string());
    }
    if let Err(msg) = validate_settings(update_data.max_points, update_data.late_penalty) {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }

    match storage.update_assignment(assignment_id, update_data).await {
        Ok(Some(assignment)) => {
            info!("Assignment {} updated by user {}", assignment_id, user.id);
            bump_leaderboard_generation(request).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                assignment,
                "Assignment updated successfully",
            )))
        }
        Ok(None) => Ok(not_found(
            ErrorCode::AssignmentNotFound,
            "Assignment not found",
        )),
        Err(e) => Ok(internal_error("Assignment update failed", e)),
    }
}
