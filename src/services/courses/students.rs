use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{CourseService, course_for_manage};
use crate::models::{
    ApiResponse,
    courses::responses::CourseStudentsResponse,
    users::entities::UserSummary,
};
use crate::services::{current_user, internal_error};

pub async fn list_students(
    service: &CourseService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    if let Err(resp) = course_for_manage(storage.as_ref(), &user, course_id).await {
        return Ok(resp);
    }

    match storage.list_course_students(course_id).await {
        Ok(students) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            CourseStudentsResponse {
                course_id,
                students: students.iter().map(UserSummary::from).collect(),
            },
            "Course students retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to retrieve course students", e)),
    }
}
