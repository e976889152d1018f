use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AssessmentService, load_assessment};
use crate::models::{ApiResponse, users::entities::UserRole};
use crate::services::courses::course_for_view;
use crate::services::current_user;

pub async fn get_assessment(
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
    if let Err(resp) = course_for_view(storage.as_ref(), &user, assessment.course_id).await {
        return Ok(resp);
    }

    let assessment = if user.role == UserRole::Student {
        assessment.for_student()
    } else {
        assessment
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        assessment,
        "Assessment retrieved successfully",
    )))
}
