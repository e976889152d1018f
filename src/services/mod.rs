pub mod assessments;
pub mod assignments;
pub mod auth;
pub mod courses;
pub mod grades;
pub mod users;

pub use assessments::AssessmentService;
pub use assignments::AssignmentService;
pub use auth::AuthService;
pub use courses::CourseService;
pub use grades::GradeService;
pub use users::UserService;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;
use tracing::error;

use crate::cache::ObjectCache;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode, users::entities::User};
use crate::storage::Storage;

/// 从 app data 中取出存储，未注册时返回 500
pub(crate) fn storage_from_request(request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
    request
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| {
            error!("Storage not found in app data");
            actix_web::error::ErrorInternalServerError("Storage not configured")
        })
}

pub(crate) fn cache_from_request(request: &HttpRequest) -> Option<Arc<dyn ObjectCache>> {
    request
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .map(|data| data.get_ref().clone())
}

/// 记录错误并返回 500 信封
pub(crate) fn internal_error(context: &str, e: impl std::fmt::Display) -> HttpResponse {
    let msg = format!("{context}: {e}");
    error!("{}", msg);
    HttpResponse::InternalServerError()
        .json(ApiResponse::error_empty(ErrorCode::InternalServerError, msg))
}

/// 当前登录用户，路由未挂 RequireJWT 时返回 401
pub(crate) fn current_user(request: &HttpRequest) -> Result<User, HttpResponse> {
    RequireJWT::extract_user_claims(request).ok_or_else(|| {
        HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Authentication required",
        ))
    })
}

pub(crate) fn bad_request(code: ErrorCode, msg: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(code, msg))
}

pub(crate) fn not_found(code: ErrorCode, msg: impl Into<String>) -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(code, msg))
}

pub(crate) fn forbidden(code: ErrorCode, msg: impl Into<String>) -> HttpResponse {
    HttpResponse::Forbidden().json(ApiResponse::error_empty(code, msg))
}

pub(crate) fn conflict(code: ErrorCode, msg: impl Into<String>) -> HttpResponse {
    HttpResponse::Conflict().json(ApiResponse::error_empty(code, msg))
}

#[cfg(test)]
pub(crate) mod test_support {
    use actix_web::{HttpMessage, HttpRequest, HttpResponse, http::StatusCode, test as actix_test, web};
    use std::sync::Arc;

    use crate::models::courses::requests::CreateCourseRequest;
    use crate::models::users::entities::{User, UserRole};
    use crate::storage::Storage;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::storage::sea_orm_storage::test_support::{create_user, memory_storage};

    /// 一门课程：一名任课教师与一名已选课学生
    pub struct Classroom {
        pub storage: Arc<SeaOrmStorage>,
        pub course_id: i64,
        pub teacher: User,
        pub student: User,
    }

    pub async fn classroom() -> Classroom {
        let storage = memory_storage().await;
        let teacher = create_user(&storage, "teacher", UserRole::Teacher).await;
        let student = create_user(&storage, "student", UserRole::Student).await;
        let course = storage
            .create_course_impl(
                teacher.id,
                CreateCourseRequest {
                    title: "Physics".into(),
                    description: None,
                    instructor_id: None,
                },
            )
            .await
            .unwrap();
        storage
            .enroll_student_impl(course.id, student.id)
            .await
            .unwrap();
        Classroom {
            storage: Arc::new(storage),
            course_id: course.id,
            teacher,
            student,
        }
    }

    impl Classroom {
        /// 与 RequireJWT 通过后的请求等价：存储挂在 app data，用户在扩展里
        pub fn request_as(&self, user: &User) -> HttpRequest {
            let storage: Arc<dyn Storage> = self.storage.clone();
            let request = actix_test::TestRequest::default()
                .app_data(web::Data::new(storage))
                .to_http_request();
            request.extensions_mut().insert(user.clone());
            request
        }
    }

    /// HTTP 状态与信封中的业务码
    pub async fn status_and_code(response: HttpResponse) -> (StatusCode, i64) {
        let status = response.status();
        let body = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        (status, json["code"].as_i64().unwrap())
    }
}
