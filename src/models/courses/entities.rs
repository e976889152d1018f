use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 课程实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct Course {
    pub id: i64,
    pub instructor_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 选课记录
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct Enrollment {
    pub id: i64,
    pub course_id: i64,
    pub student_id: i64,
    pub enrolled_at: chrono::DateTime<chrono::Utc>,
}
