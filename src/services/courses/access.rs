//! 课程级权限判断
//!
//! 管理：课程教师或管理员。查看：另加已选课的学生。
//! 失败时直接返回可用的错误响应，调用方用 `match` 提前返回。

use actix_web::HttpResponse;

use crate::models::{
    ErrorCode,
    courses::entities::Course,
    users::entities::{User, UserRole},
};
use crate::services::{forbidden, internal_error, not_found};
use crate::storage::Storage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseAccess {
    Manage,
    View,
}

impl CourseAccess {
    pub fn can_manage(user: &User, course: &Course) -> bool {
        user.is_admin() || course.instructor_id == user.id
    }
}

async fn load_course(
    storage: &dyn Storage,
    user: &User,
    course_id: i64,
    access: CourseAccess,
) -> Result<Course, HttpResponse> {
    let course = match storage.get_course_by_id(course_id).await {
        Ok(Some(course)) => course,
        Ok(None) => return Err(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => return Err(internal_error("Failed to load course", e)),
    };

    if CourseAccess::can_manage(user, &course) {
        return Ok(course);
    }

    if access == CourseAccess::View && user.role == UserRole::Student {
        match storage.is_enrolled(course_id, user.id).await {
            Ok(true) => return Ok(course),
            Ok(false) => {
                return Err(forbidden(
                    ErrorCode::NotEnrolled,
                    "You are not enrolled in this course",
                ));
            }
            Err(e) => return Err(internal_error("Failed to check enrollment", e)),
        }
    }

    Err(forbidden(
        ErrorCode::CoursePermissionDenied,
        "You do not have permission to access this course",
    ))
}

pub async fn course_for_manage(
    storage: &dyn Storage,
    user: &User,
    course_id: i64,
) -> Result<Course, HttpResponse> {
    load_course(storage, user, course_id, CourseAccess::Manage).await
}

pub async fn course_for_view(
    storage: &dyn Storage,
    user: &User,
    course_id: i64,
) -> Result<Course, HttpResponse> {
    load_course(storage, user, course_id, CourseAccess::View).await
}

/// 当前用户可见的课程范围，管理员为 None（不限）
pub async fn visible_course_ids(
    storage: &dyn Storage,
    user: &User,
) -> crate::errors::Result<Option<Vec<i64>>> {
    match user.role {
        UserRole::Admin => Ok(None),
        UserRole::Teacher => storage.list_course_ids_by_instructor(user.id).await.map(Some),
        UserRole::Student => storage.list_course_ids_by_student(user.id).await.map(Some),
    }
}

/// 在可见范围内按请求的课程收窄；请求了不可见的课程时返回 403
pub fn narrow_course_ids(
    visible: Option<Vec<i64>>,
    requested: Option<i64>,
) -> Result<Option<Vec<i64>>, HttpResponse> {
    match (visible, requested) {
        (None, requested) => Ok(requested.map(|id| vec![id])),
        (Some(ids), Some(requested)) if ids.contains(&requested) => Ok(Some(vec![requested])),
        (Some(_), Some(_)) => Err(forbidden(
            ErrorCode::CoursePermissionDenied,
            "You do not have permission to access this course",
        )),
        (Some(ids), None) => Ok(Some(ids)),
    }
}
