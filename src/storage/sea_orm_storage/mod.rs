//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod assessments;
mod assignments;
mod courses;
mod grades;
mod users;

use crate::config::AppConfig;
use crate::errors::{EHubError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| EHubError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// 基于已有连接创建实例并执行迁移
    pub async fn from_connection(db: DatabaseConnection) -> Result<Self> {
        Migrator::up(&db, None)
            .await
            .map_err(|e| EHubError::database_operation(format!("数据库迁移失败: {e}")))?;
        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| EHubError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| EHubError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| EHubError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(EHubError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
use crate::models::{
    assessments::{
        entities::{Assessment, AssessmentSubmission},
        requests::{
            AssessmentGradeUpdate, AssessmentListQuery, CreateAssessmentRequest,
            NewAssessmentSubmission, UpdateAssessmentRequest,
        },
        responses::AssessmentListResponse,
    },
    assignments::{
        entities::{Assignment, AssignmentSubmission},
        requests::{
            AssignmentGradeUpdate, AssignmentListQuery, CreateAssignmentRequest,
            NewAssignmentSubmission, UpdateAssignmentRequest,
        },
        responses::AssignmentListResponse,
    },
    courses::{
        entities::{Course, Enrollment},
        requests::{CourseListQuery, CreateCourseRequest},
        responses::CourseListResponse,
    },
    grades::entities::{GradeRecord, GradeRecordQuery},
    submissions::entities::SubmissionStatus,
    users::{
        entities::User,
        requests::{CreateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        self.get_user_by_username_or_email_impl(identifier).await
    }

    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>> {
        self.get_users_by_ids_impl(ids).await
    }

    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse> {
        self.list_users_with_pagination_impl(query).await
    }

    async fn list_students(&self) -> Result<Vec<User>> {
        self.list_students_impl().await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    // 课程模块
    async fn create_course(
        &self,
        instructor_id: i64,
        course: CreateCourseRequest,
    ) -> Result<Course> {
        self.create_course_impl(instructor_id, course).await
    }

    async fn get_course_by_id(&self, course_id: i64) -> Result<Option<Course>> {
        self.get_course_by_id_impl(course_id).await
    }

    async fn list_courses_with_pagination(
        &self,
        query: CourseListQuery,
    ) -> Result<CourseListResponse> {
        self.list_courses_with_pagination_impl(query).await
    }

    async fn list_course_ids_by_instructor(&self, instructor_id: i64) -> Result<Vec<i64>> {
        self.list_course_ids_by_instructor_impl(instructor_id).await
    }

    async fn list_course_ids_by_student(&self, student_id: i64) -> Result<Vec<i64>> {
        self.list_course_ids_by_student_impl(student_id).await
    }

    async fn get_courses_by_ids(&self, ids: &[i64]) -> Result<Vec<Course>> {
        self.get_courses_by_ids_impl(ids).await
    }

    async fn enroll_student(&self, course_id: i64, student_id: i64) -> Result<Option<Enrollment>> {
        self.enroll_student_impl(course_id, student_id).await
    }

    async fn is_enrolled(&self, course_id: i64, student_id: i64) -> Result<bool> {
        self.is_enrolled_impl(course_id, student_id).await
    }

    async fn list_course_students(&self, course_id: i64) -> Result<Vec<User>> {
        self.list_course_students_impl(course_id).await
    }

    // 测评模块
    async fn create_assessment(
        &self,
        created_by: i64,
        assessment: CreateAssessmentRequest,
    ) -> Result<Assessment> {
        self.create_assessment_impl(created_by, assessment).await
    }

    async fn get_assessment_by_id(&self, id: i64) -> Result<Option<Assessment>> {
        self.get_assessment_by_id_impl(id).await
    }

    async fn list_assessments_with_pagination(
        &self,
        query: AssessmentListQuery,
    ) -> Result<AssessmentListResponse> {
        self.list_assessments_with_pagination_impl(query).await
    }

    async fn update_assessment(
        &self,
        id: i64,
        update: UpdateAssessmentRequest,
    ) -> Result<Option<Assessment>> {
        self.update_assessment_impl(id, update).await
    }

    async fn find_active_final_assessment(
        &self,
        course_id: i64,
        exclude_id: Option<i64>,
    ) -> Result<Option<Assessment>> {
        self.find_active_final_assessment_impl(course_id, exclude_id)
            .await
    }

    async fn count_assessments(&self, course_ids: Option<Vec<i64>>) -> Result<u64> {
        self.count_assessments_impl(course_ids).await
    }

    async fn count_assessment_attempts(&self, assessment_id: i64, student_id: i64) -> Result<u64> {
        self.count_assessment_attempts_impl(assessment_id, student_id)
            .await
    }

    async fn find_assessment_draft(
        &self,
        assessment_id: i64,
        student_id: i64,
    ) -> Result<Option<AssessmentSubmission>> {
        self.find_assessment_draft_impl(assessment_id, student_id)
            .await
    }

    async fn create_assessment_submission(
        &self,
        submission: NewAssessmentSubmission,
    ) -> Result<AssessmentSubmission> {
        self.create_assessment_submission_impl(submission).await
    }

    async fn replace_assessment_draft(
        &self,
        draft_id: i64,
        submission: NewAssessmentSubmission,
    ) -> Result<Option<AssessmentSubmission>> {
        self.replace_assessment_draft_impl(draft_id, submission)
            .await
    }

    async fn get_assessment_submission_by_id(
        &self,
        id: i64,
    ) -> Result<Option<AssessmentSubmission>> {
        self.get_assessment_submission_by_id_impl(id).await
    }

    async fn list_assessment_submissions(
        &self,
        assessment_id: i64,
        student_id: Option<i64>,
    ) -> Result<Vec<AssessmentSubmission>> {
        self.list_assessment_submissions_impl(assessment_id, student_id)
            .await
    }

    async fn grade_assessment_submission(
        &self,
        id: i64,
        update: AssessmentGradeUpdate,
    ) -> Result<Option<AssessmentSubmission>> {
        self.grade_assessment_submission_impl(id, update).await
    }

    async fn set_assessment_submission_status(
        &self,
        id: i64,
        status: SubmissionStatus,
    ) -> Result<Option<AssessmentSubmission>> {
        self.set_assessment_submission_status_impl(id, status).await
    }

    // 作业模块
    async fn create_assignment(
        &self,
        created_by: i64,
        assignment: CreateAssignmentRequest,
    ) -> Result<Assignment> {
        self.create_assignment_impl(created_by, assignment).await
    }

    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>> {
        self.get_assignment_by_id_impl(id).await
    }

    async fn list_assignments_with_pagination(
        &self,
        query: AssignmentListQuery,
    ) -> Result<AssignmentListResponse> {
        self.list_assignments_with_pagination_impl(query).await
    }

    async fn update_assignment(
        &self,
        id: i64,
        update: UpdateAssignmentRequest,
    ) -> Result<Option<Assignment>> {
        self.update_assignment_impl(id, update).await
    }

    async fn count_assignments(&self, course_ids: Option<Vec<i64>>) -> Result<u64> {
        self.count_assignments_impl(course_ids).await
    }

    async fn find_assignment_submission(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<AssignmentSubmission>> {
        self.find_assignment_submission_impl(assignment_id, student_id)
            .await
    }

    async fn create_assignment_submission(
        &self,
        submission: NewAssignmentSubmission,
    ) -> Result<AssignmentSubmission> {
        self.create_assignment_submission_impl(submission).await
    }

    async fn replace_assignment_submission(
        &self,
        id: i64,
        submission: NewAssignmentSubmission,
    ) -> Result<Option<AssignmentSubmission>> {
        self.replace_assignment_submission_impl(id, submission)
            .await
    }

    async fn get_assignment_submission_by_id(
        &self,
        id: i64,
    ) -> Result<Option<AssignmentSubmission>> {
        self.get_assignment_submission_by_id_impl(id).await
    }

    async fn list_assignment_submissions(
        &self,
        assignment_id: i64,
        student_id: Option<i64>,
    ) -> Result<Vec<AssignmentSubmission>> {
        self.list_assignment_submissions_impl(assignment_id, student_id)
            .await
    }

    async fn grade_assignment_submission(
        &self,
        id: i64,
        update: AssignmentGradeUpdate,
    ) -> Result<Option<AssignmentSubmission>> {
        self.grade_assignment_submission_impl(id, update).await
    }

    async fn set_assignment_submission_status(
        &self,
        id: i64,
        status: SubmissionStatus,
    ) -> Result<Option<AssignmentSubmission>> {
        self.set_assignment_submission_status_impl(id, status).await
    }

    // 成绩模块
    async fn list_grade_records(&self, query: GradeRecordQuery) -> Result<Vec<GradeRecord>> {
        self.list_grade_records_impl(query).await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::SeaOrmStorage;
    use crate::models::users::{entities::{User, UserRole}, requests::CreateUserRequest};
    use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use sea_orm::SqlxSqliteConnector;
    use std::str::FromStr;

    /// 内存 SQLite，单连接保证所有查询落在同一个库上
    pub async fn memory_storage() -> SeaOrmStorage {
        let opt = SqliteConnectOptions::from_str("sqlite::memory:").unwrap();
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opt)
            .await
            .unwrap();
        SeaOrmStorage::from_connection(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
            .await
            .unwrap()
    }

    pub async fn create_user(storage: &SeaOrmStorage, username: &str, role: UserRole) -> User {
        storage
            .create_user_impl(CreateUserRequest {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password: "hash".to_string(),
                role,
                first_name: username.to_string(),
                last_name: String::new(),
                avatar_url: None,
            })
            .await
            .unwrap()
    }
}
