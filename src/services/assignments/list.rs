use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AssignmentService;
use crate::models::{
    ApiResponse,
    assignments::{
        entities::AssignmentStatus,
        requests::{AssignmentListParams, AssignmentListQuery},
        responses::AssignmentListResponse,
    },
    users::entities::UserRole,
    PaginationInfo,
};
use crate::services::courses::{narrow_course_ids, visible_course_ids};
use crate::services::{current_user, internal_error};

pub async fn list_assignments(
    service: &AssignmentService,
    query: AssignmentListParams,
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
    // 学生请求草稿时直接返回空列表
    if is_student && query.status == Some(AssignmentStatus::Draft) {
        return Ok(HttpResponse::Ok().json(ApiResponse::success(
            AssignmentListResponse {
                items: Vec::new(),
                pagination: PaginationInfo {
                    page: query.pagination.page,
                    page_size: query.pagination.size,
                    total: 0,
                    total_pages: 0,
                },
            },
            "Assignment list retrieved successfully",
        )));
    }

    let list_query = AssignmentListQuery {
        page: Some(query.pagination.page),
        size: Some(query.pagination.size),
        course_ids,
        status: query.status,
        exclude_drafts: is_student,
    };

    match storage.list_assignments_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Assignment list retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to retrieve assignment list", e)),
    }
}
