use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::assessments::requests::{
    AssessmentListParams, CreateAssessmentRequest, SubmitAssessmentRequest,
    UpdateAssessmentRequest,
};
use crate::models::submissions::requests::GradeSubmissionRequest;
use crate::models::users::entities::UserRole;
use crate::services::AssessmentService;
use crate::utils::SafeIDI64;

// 懒加载的全局 AssessmentService 实例
static ASSESSMENT_SERVICE: Lazy<AssessmentService> = Lazy::new(AssessmentService::new_lazy);

// 列出测评
pub async fn list_assessments(
    req: HttpRequest,
    query: web::Query<AssessmentListParams>,
) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE
        .list_assessments(query.into_inner(), &req)
        .await
}

// 创建测评
pub async fn create_assessment(
    req: HttpRequest,
    body: web::Json<CreateAssessmentRequest>,
) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE
        .create_assessment(body.into_inner(), &req)
        .await
}

pub async fn get_assessment(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE.get_assessment(path.0, &req).await
}

pub async fn update_assessment(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<UpdateAssessmentRequest>,
) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE
        .update_assessment(path.0, body.into_inner(), &req)
        .await
}

// 学生提交
pub async fn submit_assessment(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<SubmitAssessmentRequest>,
) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE
        .submit_assessment(path.0, body.into_inner(), &req)
        .await
}

pub async fn list_submissions(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE.list_submissions(path.0, &req).await
}

// 评分
pub async fn grade_submission(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<GradeSubmissionRequest>,
) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE
        .grade_submission(path.0, body.into_inner(), &req)
        .await
}

// 发还
pub async fn return_submission(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE.return_submission(path.0, &req).await
}

// 配置路由
pub fn configure_assessment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/assessments")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    // 列表按角色与选课过滤
                    .route(web::get().to(list_assessments))
                    .route(
                        web::post()
                            .to(create_assessment)
                            .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                    ),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_assessment))
                    .route(
                        web::put()
                            .to(update_assessment)
                            .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                    ),
            )
            .service(
                web::resource("/{id}/submissions")
                    // 学生只能看到自己的提交
                    .route(web::get().to(list_submissions))
                    .route(
                        web::post()
                            .to(submit_assessment)
                            .wrap(middlewares::RequireRole::new_any(UserRole::student_roles())),
                    ),
            ),
    );
    cfg.service(
        web::scope("/api/v1/assessment-submissions")
            .wrap(middlewares::RequireJWT)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles()))
                    .route("/{id}/grade", web::put().to(grade_submission))
                    .route("/{id}/return", web::post().to(return_submission)),
            ),
    );
}
