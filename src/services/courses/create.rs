use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::CourseService;
use crate::models::{
    ApiResponse, ErrorCode,
    courses::requests::CreateCourseRequest,
    users::entities::UserRole,
};
use crate::services::{bad_request, current_user, internal_error};
use crate::utils::validate::validate_title;

pub async fn create_course(
    service: &CourseService,
    mut course_data: CreateCourseRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    if let Err(msg) = validate_title(&course_data.title) {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }
    course_data.title = course_data.title.trim().to_string();

    let storage = service.get_storage(request)?;

    // 教师只能为自己创建课程；管理员可以指定教师
    let instructor_id = match (user.role, course_data.instructor_id) {
        (UserRole::Admin, Some(instructor_id)) => {
            match storage.get_user_by_id(instructor_id).await {
                Ok(Some(instructor)) if instructor.role != UserRole::Student => instructor.id,
                Ok(Some(_)) => {
                    return Ok(bad_request(
                        ErrorCode::BadRequest,
                        "Instructor must be a teacher or admin",
                    ));
                }
                Ok(None) => {
                    return Ok(bad_request(ErrorCode::UserNotFound, "Instructor not found"));
                }
                Err(e) => return Ok(internal_error("Failed to load instructor", e)),
            }
        }
        _ => user.id,
    };

    match storage.create_course(instructor_id, course_data).await {
        Ok(course) => {
            info!("Course {} created by user {}", course.id, user.id);
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(course, "Course created successfully")))
        }
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::CourseCreationFailed,
                format!("Course creation failed: {e}"),
            )),
        ),
    }
}
