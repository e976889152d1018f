use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::courses::requests::{
    CourseListParams, CreateCourseRequest, EnrollStudentsRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::CourseService;
use crate::utils::SafeIDI64;

// 懒加载的全局 CourseService 实例
static COURSE_SERVICE: Lazy<CourseService> = Lazy::new(CourseService::new_lazy);

// 列出课程
pub async fn list_courses(
    req: HttpRequest,
    query: web::Query<CourseListParams>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.list_courses(query.into_inner(), &req).await
}

// 创建课程
pub async fn create_course(
    req: HttpRequest,
    body: web::Json<CreateCourseRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.create_course(body.into_inner(), &req).await
}

// 课程详情
pub async fn get_course(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.get_course(path.0, &req).await
}

// 选课
pub async fn enroll_students(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<EnrollStudentsRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .enroll_students(path.0, body.into_inner(), &req)
        .await
}

// 课程学生名单
pub async fn list_students(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.list_students(path.0, &req).await
}

// 配置路由
pub fn configure_course_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/courses")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    // 列表按角色过滤
                    .route(web::get().to(list_courses))
                    .route(
                        web::post()
                            .to(create_course)
                            .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                    ),
            )
            .service(web::resource("/{id}").route(web::get().to(get_course)))
            .service(
                web::resource("/{id}/enrollments").route(
                    web::post()
                        .to(enroll_students)
                        .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                ),
            )
            .service(
                web::resource("/{id}/students").route(
                    web::get()
                        .to(list_students)
                        .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                ),
            ),
    );
}
