use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::{BTreeSet, HashMap};
use tracing::info;

use super::{CourseService, course_for_manage};
use crate::models::{
    ApiResponse, ErrorCode,
    courses::{requests::EnrollStudentsRequest, responses::EnrollStudentsResponse},
    users::entities::UserRole,
};
use crate::services::{bad_request, current_user, internal_error};

pub async fn enroll_students(
    service: &CourseService,
    course_id: i64,
    enroll_data: EnrollStudentsRequest,
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

    // 去重并保持顺序稳定
    let student_ids: Vec<i64> = enroll_data
        .student_ids
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if student_ids.is_empty() {
        return Ok(bad_request(ErrorCode::BadRequest, "student_ids must not be empty"));
    }

    let users: HashMap<i64, UserRole> = match storage.get_users_by_ids(&student_ids).await {
        Ok(users) => users.into_iter().map(|u| (u.id, u.role)).collect(),
        Err(e) => return Ok(internal_error("Failed to load students", e)),
    };

    let mut enrolled = Vec::new();
    let mut skipped = Vec::new();
    for student_id in student_ids {
        // 不存在或非学生的用户跳过
        if users.get(&student_id) != Some(&UserRole::Student) {
            skipped.push(student_id);
            continue;
        }
        match storage.enroll_student(course_id, student_id).await {
            Ok(Some(enrollment)) => enrolled.push(enrollment),
            Ok(None) => skipped.push(student_id),
            Err(e) => return Ok(internal_error("Failed to enroll student", e)),
        }
    }

    info!(
        "Course {}: enrolled {} students, skipped {}",
        course_id,
        enrolled.len(),
        skipped.len()
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        EnrollStudentsResponse { enrolled, skipped },
        "Students enrolled successfully",
    )))
}
