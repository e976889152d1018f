use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AssessmentService;
use crate::models::{
    ApiResponse,
    assessments::requests::{AssessmentListParams, AssessmentListQuery},
    users::entities::UserRole,
};
use crate::services::courses::{narrow_course_ids, visible_course_ids};
use crate::services::{current_user, internal_error};

pub async fn list_assessments(
    service: &AssessmentService,
    query: AssessmentListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    let visible = match visible_course_ids(storage.as_ref(), &user).await {
        Ok(visible) => visible,
        Err(e) => return Ok(internal_error("Failed to load courses", e)),
    };
    let course_ids = match narrow_course_ids(visible, query.course_id) {
        Ok(course_ids) => course_ids,
        Err(resp) => return Ok(resp),
    };

    let is_student = user.role == UserRole::Student;
    let list_query = AssessmentListQuery {
        page: Some(query.pagination.page),
        size: Some(query.pagination.size),
        course_ids,
        assessment_type: query.assessment_type,
        // 学生看不到已归档的测评
        include_archived: query.include_archived && !is_student,
    };

    match storage.list_assessments_with_pagination(list_query).await {
        Ok(mut response) => {
            if is_student {
                response.items = response.items.into_iter().map(|a| a.for_student()).collect();
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                response,
                "Assessment list retrieved successfully",
            )))
        }
        Err(e) => Ok(internal_error("Failed to retrieve assessment list", e)),
    }
}
