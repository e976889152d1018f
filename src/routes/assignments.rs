use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::assignments::requests::{
    AssignmentListParams, CreateAssignmentRequest, SubmitAssignmentRequest,
    UpdateAssignmentRequest,
};
use crate::models::submissions::requests::GradeSubmissionRequest;
use crate::models::users::entities::UserRole;
use crate::services::AssignmentService;
use crate::utils::SafeIDI64;

// 懒加载的全局 AssignmentService 实例
static ASSIGNMENT_SERVICE: Lazy<AssignmentService> = Lazy::new(AssignmentService::new_lazy);

// 列出作业
pub async fn list_assignments(
    req: HttpRequest,
    query: web::Query<AssignmentListParams>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .list_assignments(query.into_inner(), &req)
        .await
}

// 创建作业
pub async fn create_assignment(
    req: HttpRequest,
    body: web::Json<CreateAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .create_assignment(body.into_inner(), &req)
        .await
}

pub async fn get_assignment(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.get_assignment(path.0, &req).await
}

pub async fn update_assignment(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<UpdateAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .update_assignment(path.0, body.into_inner(), &req)
        .await
}

// 学生提交
pub async fn submit_assignment(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<SubmitAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .submit_assignment(path.0, body.into_inner(), &req)
        .await
}

pub async fn list_submissions(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.list_submissions(path.0, &req).await
}

// 评分
pub async fn grade_submission(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<GradeSubmissionRequest>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .grade_submission(path.0, body.into_inner(), &req)
        .await
}

// 发还
pub async fn return_submission(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.return_submission(path.0, &req).await
}

// 配置路由
pub fn configure_assignment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/assignments")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    // 学生看不到草稿
                    .route(web::get().to(list_assignments))
                    .route(
                        web::post()
                            .to(create_assignment)
                            .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                    ),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_assignment))
                    .route(
                        web::put()
                            .to(update_assignment)
                            .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                    ),
            )
            .service(
                web::resource("/{id}/submissions")
                    // 学生只能看到自己的提交
                    .route(web::get().to(list_submissions))
                    .route(
                        web::post()
                            .to(submit_assignment)
                            .wrap(middlewares::RequireRole::new_any(UserRole::student_roles())),
                    ),
            ),
    );
    cfg.service(
        web::scope("/api/v1/assignment-submissions")
            .wrap(middlewares::RequireJWT)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles()))
                    .route("/{id}/grade", web::put().to(grade_submission))
                    .route("/{id}/return", web::post().to(return_submission)),
            ),
    );
}
