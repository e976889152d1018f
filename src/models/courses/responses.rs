use serde::Serialize;
use ts_rs::TS;

use super::entities::{Course, Enrollment};
use crate::models::common::PaginationInfo;
use crate::models::users::entities::UserSummary;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CourseListResponse {
    pub items: Vec<Course>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct EnrollStudentsResponse {
    /// 新增的选课记录（已选课的学生不会重复添加）
    pub enrolled: Vec<Enrollment>,
    pub skipped: Vec<i64>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CourseStudentsResponse {
    pub course_id: i64,
    pub students: Vec<UserSummary>,
}
