use serde::Deserialize;
use ts_rs::TS;

use crate::models::common::PaginationQuery;

// 创建课程请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: Option<String>,
    /// 管理员可为其他教师创建课程
    pub instructor_id: Option<i64>,
}

// 添加选课学生请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct EnrollStudentsRequest {
    pub student_ids: Vec<i64>,
}

// 课程列表查询参数
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CourseListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
}

// 课程列表查询（存储层）
#[derive(Debug, Clone, Default)]
pub struct CourseListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub search: Option<String>,
    /// 仅列出该教师的课程
    pub instructor_id: Option<i64>,
    /// 仅列出该学生选修的课程
    pub student_id: Option<i64>,
}
