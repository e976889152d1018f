use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AssignmentService;
use crate::models::{ApiResponse, ErrorCode, assignments::requests::CreateAssignmentRequest};
use crate::services::courses::course_for_manage;
use crate::services::{bad_request, current_user, internal_error};
use crate::utils::validate::{validate_percent, validate_title};

pub(super) fn validate_settings(
    max_points: Option<f64>,
    late_penalty: Option<f64>,
) -> Result<(), String> {
    if let Some(max) = max_points
        && (!max.is_finite() || max <= 0.0)
    {
        return Err("max_points must be greater than 0".to_string());
    }
    if let Some(penalty) = late_penalty {
        validate_percent("late_penalty", penalty)?;
    }
    Ok(())
}

pub async fn create_assignment(
    service: &AssignmentService,
    mut assignment_data: CreateAssignmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    if let Err(msg) = validate_title(&assignment_data.title) {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }
    assignment_data.title = assignment_data.title.trim().to_string();
    if let Err(msg) = validate_settings(assignment_data.max_points, assignment_data.late_penalty) {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }

    let storage = service.get_storage(request)?;
    if let Err(resp) = course_for_manage(storage.as_ref(), &user, assignment_data.course_id).await
    {
        return Ok(resp);
    }

    match storage.create_assignment(user.id, assignment_data).await {
        Ok(assignment) => {
            info!(
                "Assignment {} created in course {} by user {}",
                assignment.id, assignment.course_id, user.id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                assignment,
                "Assignment created successfully",
            )))
        }
        Err(e) => Ok(internal_error("Assignment creation failed", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_validation() {
        assert!(validate_settings(None, None).is_ok());
        assert!(validate_settings(Some(20.0), Some(15.0)).is_ok());
        assert!(validate_settings(Some(0.0), None).is_err());
        assert!(validate_settings(Some(f64::INFINITY), None).is_err());
        assert!(validate_settings(None, Some(150.0)).is_err());
    }
}
