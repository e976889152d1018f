use std::sync::Arc;

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

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户（password 字段为已哈希的密码）
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过用户名或邮箱获取用户信息
    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;
    // 批量获取用户
    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>>;
    // 列出用户
    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse>;
    // 列出全部活跃学生
    async fn list_students(&self) -> Result<Vec<User>>;
    // 用户总数
    async fn count_users(&self) -> Result<u64>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;

    /// 课程管理方法
    // 创建课程
    async fn create_course(&self, instructor_id: i64, course: CreateCourseRequest)
    -> Result<Course>;
    // 通过ID获取课程
    async fn get_course_by_id(&self, course_id: i64) -> Result<Option<Course>>;
    // 列出课程
    async fn list_courses_with_pagination(
        &self,
        query: CourseListQuery,
    ) -> Result<CourseListResponse>;
    // 教师授课的课程ID
    async fn list_course_ids_by_instructor(&self, instructor_id: i64) -> Result<Vec<i64>>;
    // 学生选修的课程ID
    async fn list_course_ids_by_student(&self, student_id: i64) -> Result<Vec<i64>>;
    // 批量获取课程
    async fn get_courses_by_ids(&self, ids: &[i64]) -> Result<Vec<Course>>;
    // 选课，已选时返回 None
    async fn enroll_student(&self, course_id: i64, student_id: i64) -> Result<Option<Enrollment>>;
    // 是否已选课
    async fn is_enrolled(&self, course_id: i64, student_id: i64) -> Result<bool>;
    // 课程学生
    async fn list_course_students(&self, course_id: i64) -> Result<Vec<User>>;

    /// 测评管理方法
    // 创建测评
    async fn create_assessment(
        &self,
        created_by: i64,
        assessment: CreateAssessmentRequest,
    ) -> Result<Assessment>;
    // 通过ID获取测评
    async fn get_assessment_by_id(&self, id: i64) -> Result<Option<Assessment>>;
    // 列出测评
    async fn list_assessments_with_pagination(
        &self,
        query: AssessmentListQuery,
    ) -> Result<AssessmentListResponse>;
    // 更新测评
    async fn update_assessment(
        &self,
        id: i64,
        update: UpdateAssessmentRequest,
    ) -> Result<Option<Assessment>>;
    // 课程中未归档的期末测评
    async fn find_active_final_assessment(
        &self,
        course_id: i64,
        exclude_id: Option<i64>,
    ) -> Result<Option<Assessment>>;
    // 统计未归档测评数量
    async fn count_assessments(&self, course_ids: Option<Vec<i64>>) -> Result<u64>;

    /// 测评提交方法
    // 非草稿提交次数
    async fn count_assessment_attempts(&self, assessment_id: i64, student_id: i64) -> Result<u64>;
    // 学生的草稿
    async fn find_assessment_draft(
        &self,
        assessment_id: i64,
        student_id: i64,
    ) -> Result<Option<AssessmentSubmission>>;
    // 新建提交
    async fn create_assessment_submission(
        &self,
        submission: NewAssessmentSubmission,
    ) -> Result<AssessmentSubmission>;
    // 覆盖已有草稿
    async fn replace_assessment_draft(
        &self,
        draft_id: i64,
        submission: NewAssessmentSubmission,
    ) -> Result<Option<AssessmentSubmission>>;
    // 通过ID获取提交
    async fn get_assessment_submission_by_id(
        &self,
        id: i64,
    ) -> Result<Option<AssessmentSubmission>>;
    // 列出提交
    async fn list_assessment_submissions(
        &self,
        assessment_id: i64,
        student_id: Option<i64>,
    ) -> Result<Vec<AssessmentSubmission>>;
    // 评分
    async fn grade_assessment_submission(
        &self,
        id: i64,
        update: AssessmentGradeUpdate,
    ) -> Result<Option<AssessmentSubmission>>;
    // 更新提交状态
    async fn set_assessment_submission_status(
        &self,
        id: i64,
        status: SubmissionStatus,
    ) -> Result<Option<AssessmentSubmission>>;

    /// 作业管理方法
    // 创建作业
    async fn create_assignment(
        &self,
        created_by: i64,
        assignment: CreateAssignmentRequest,
    ) -> Result<Assignment>;
    // 通过ID获取作业
    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>>;
    // 列出作业
    async fn list_assignments_with_pagination(
        &self,
        query: AssignmentListQuery,
    ) -> Result<AssignmentListResponse>;
    // 更新作业
    async fn update_assignment(
        &self,
        id: i64,
        update: UpdateAssignmentRequest,
    ) -> Result<Option<Assignment>>;
    // 统计已发布作业数量
    async fn count_assignments(&self, course_ids: Option<Vec<i64>>) -> Result<u64>;

    /// 作业提交方法
    // 学生对某作业的最新提交
    async fn find_assignment_submission(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<AssignmentSubmission>>;
    // 新建提交
    async fn create_assignment_submission(
        &self,
        submission: NewAssignmentSubmission,
    ) -> Result<AssignmentSubmission>;
    // 覆盖未评分的提交
    async fn replace_assignment_submission(
        &self,
        id: i64,
        submission: NewAssignmentSubmission,
    ) -> Result<Option<AssignmentSubmission>>;
    // 通过ID获取提交
    async fn get_assignment_submission_by_id(
        &self,
        id: i64,
    ) -> Result<Option<AssignmentSubmission>>;
    // 列出提交
    async fn list_assignment_submissions(
        &self,
        assignment_id: i64,
        student_id: Option<i64>,
    ) -> Result<Vec<AssignmentSubmission>>;
    // 评分
    async fn grade_assignment_submission(
        &self,
        id: i64,
        update: AssignmentGradeUpdate,
    ) -> Result<Option<AssignmentSubmission>>;
    // 更新提交状态
    async fn set_assignment_submission_status(
        &self,
        id: i64,
        status: SubmissionStatus,
    ) -> Result<Option<AssignmentSubmission>>;

    /// 成绩方法
    // 成绩来源记录（测评与作业合并）
    async fn list_grade_records(&self, query: GradeRecordQuery) -> Result<Vec<GradeRecord>>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
