//! 数据模型
//!
//! 与数据库实体分离的业务实体、请求与响应结构。
//! 所有对外结构通过 ts-rs 导出 TypeScript 类型。

pub mod assessments;
pub mod assignments;
pub mod auth;
pub mod common;
pub mod courses;
pub mod grades;
pub mod submissions;
pub mod users;

pub use common::{ApiResponse, PaginatedResponse, PaginationInfo, PaginationQuery};

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 业务错误码
///
/// 0 为成功；1xxx 通用错误；2xxx 认证；3xxx 用户；4xxx 课程；
/// 5xxx 测评；6xxx 作业；7xxx 成绩。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1009,
    InternalServerError = 1500,

    AuthFailed = 2000,

    UserNotFound = 3000,
    UserAlreadyExists = 3001,
    UserNameInvalid = 3002,
    UserEmailInvalid = 3003,
    UserPasswordInvalid = 3004,
    UserCreationFailed = 3005,

    CourseNotFound = 4000,
    CoursePermissionDenied = 4001,
    CourseCreationFailed = 4002,
    NotEnrolled = 4003,

    AssessmentNotFound = 5000,
    FinalAssessmentExists = 5001,
    AttemptLimitReached = 5002,
    AssessmentNotAvailable = 5003,
    AssessmentSubmissionNotFound = 5004,

    AssignmentNotFound = 6000,
    AssignmentSubmissionNotFound = 6001,
    AssignmentClosed = 6002,

    InvalidSubmissionState = 7000,
    InvalidScore = 7001,
}
