use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use crate::models::{
    ApiResponse,
    courses::requests::{CourseListParams, CourseListQuery},
    users::entities::UserRole,
};
use crate::services::{current_user, internal_error};

pub async fn list_courses(
    service: &CourseService,
    query: CourseListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    let mut list_query = CourseListQuery {
        page: Some(query.pagination.page),
        size: Some(query.pagination.size),
        search: query.search,
        ..Default::default()
    };
    match user.role {
        UserRole::Student => list_query.student_id = Some(user.id),
        UserRole::Teacher => list_query.instructor_id = Some(user.id),
        UserRole::Admin => {}
    }

    match storage.list_courses_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Course list retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to retrieve course list", e)),
    }
}
