use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::grades::requests::{GradeListParams, LeaderboardParams, StatsParams};
use crate::models::users::entities::UserRole;
use crate::services::GradeService;
use crate::services::grades::{BoardRequest, GradeScope};
use crate::utils::SafeIDI64;

// 懒加载的全局 GradeService 实例
static GRADE_SERVICE: Lazy<GradeService> = Lazy::new(GradeService::new_lazy);

// 学生成绩
pub async fn student_grades(
    req: HttpRequest,
    query: web::Query<GradeListParams>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE
        .list_grades(GradeScope::Student, query.into_inner(), &req)
        .await
}

pub async fn student_course_grades(
    req: HttpRequest,
    path: SafeIDI64,
    query: web::Query<GradeListParams>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE
        .list_grades(GradeScope::StudentCourse(path.0), query.into_inner(), &req)
        .await
}

// 教师视角成绩
pub async fn teacher_grades(
    req: HttpRequest,
    query: web::Query<GradeListParams>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE
        .list_grades(GradeScope::Teacher, query.into_inner(), &req)
        .await
}

pub async fn teacher_course_grades(
    req: HttpRequest,
    path: SafeIDI64,
    query: web::Query<GradeListParams>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE
        .list_grades(GradeScope::TeacherCourse(path.0), query.into_inner(), &req)
        .await
}

// 管理员成绩总览
pub async fn admin_grades(
    req: HttpRequest,
    query: web::Query<GradeListParams>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE
        .list_grades(GradeScope::Admin, query.into_inner(), &req)
        .await
}

// 排行榜：按查询参数选择范围
pub async fn leaderboard(
    req: HttpRequest,
    query: web::Query<LeaderboardParams>,
) -> ActixResult<HttpResponse> {
    let params = query.into_inner();
    let board = BoardRequest::from_params(&params);
    GRADE_SERVICE.leaderboard(board, params, &req).await
}

pub async fn course_leaderboard(
    req: HttpRequest,
    path: SafeIDI64,
    query: web::Query<LeaderboardParams>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE
        .leaderboard(BoardRequest::Course(path.0), query.into_inner(), &req)
        .await
}

pub async fn assessment_leaderboard(
    req: HttpRequest,
    path: SafeIDI64,
    query: web::Query<LeaderboardParams>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE
        .leaderboard(BoardRequest::Assessment(path.0), query.into_inner(), &req)
        .await
}

pub async fn assignment_leaderboard(
    req: HttpRequest,
    path: SafeIDI64,
    query: web::Query<LeaderboardParams>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE
        .leaderboard(BoardRequest::Assignment(path.0), query.into_inner(), &req)
        .await
}

pub async fn admin_leaderboard(
    req: HttpRequest,
    query: web::Query<LeaderboardParams>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE
        .admin_leaderboard(query.into_inner(), &req)
        .await
}

// 学生统计
pub async fn stats(
    req: HttpRequest,
    query: web::Query<StatsParams>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE.stats(query.into_inner(), &req).await
}

pub async fn course_stats(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    GRADE_SERVICE.course_stats(path.0, &req).await
}

// 配置路由
pub fn configure_grade_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/grades")
            .wrap(middlewares::RequireJWT)
            // 排行榜对所有登录用户开放，范围权限在业务层检查
            .service(
                web::scope("/leaderboard")
                    .route("", web::get().to(leaderboard))
                    .route("/course/{id}", web::get().to(course_leaderboard))
                    .route("/assessment/{id}", web::get().to(assessment_leaderboard))
                    .route("/assignment/{id}", web::get().to(assignment_leaderboard)),
            )
            .service(
                web::scope("/student")
                    .wrap(middlewares::RequireRole::new_any(UserRole::student_roles()))
                    .route("", web::get().to(student_grades))
                    .route("/course/{id}", web::get().to(student_course_grades)),
            )
            .service(
                web::scope("/stats")
                    .wrap(middlewares::RequireRole::new_any(UserRole::student_roles()))
                    .route("", web::get().to(stats))
                    .route("/course/{id}", web::get().to(course_stats)),
            )
            .service(
                web::scope("/teacher")
                    .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles()))
                    .route("", web::get().to(teacher_grades))
                    .route("/course/{id}", web::get().to(teacher_course_grades)),
            )
            .service(
                web::scope("/admin")
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
                    .route("", web::get().to(admin_grades))
                    .route("/leaderboard", web::get().to(admin_leaderboard)),
            ),
    );
}
