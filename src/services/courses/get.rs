use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{CourseService, course_for_view};
use crate::models::ApiResponse;
use crate::services::current_user;

pub async fn get_course(
    service: &CourseService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    match course_for_view(storage.as_ref(), &user, course_id).await {
        Ok(course) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            course,
            "Course information retrieved successfully",
        ))),
        Err(resp) => Ok(resp),
    }
}
