//! 作业与作业提交存储操作

use super::SeaOrmStorage;
use crate::entity::assignment_submissions::{
    ActiveModel as SubmissionActiveModel, Column as SubmissionColumn,
    Entity as AssignmentSubmissions,
};
use crate::entity::assignments::{ActiveModel, Column, Entity as Assignments};
use crate::errors::{EHubError, Result};
use crate::grading::DEFAULT_MAX_SCORE;
use crate::models::{
    PaginationInfo,
    assignments::{
        entities::{Assignment, AssignmentStatus, AssignmentSubmission},
        requests::{
            AssignmentGradeUpdate, AssignmentListQuery, CreateAssignmentRequest,
            NewAssignmentSubmission, UpdateAssignmentRequest,
        },
        responses::AssignmentListResponse,
    },
    submissions::entities::SubmissionStatus,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 创建作业
    pub async fn create_assignment_impl(
        &self,
        created_by: i64,
        req: CreateAssignmentRequest,
    ) -> Result<Assignment> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            course_id: Set(req.course_id),
            created_by: Set(created_by),
            title: Set(req.title),
            description: Set(req.description),
            max_points: Set(req
                .max_points
                .filter(|p| *p > 0.0)
                .unwrap_or(DEFAULT_MAX_SCORE)),
            due_date: Set(req.due_date.map(|d| d.timestamp())),
            late_penalty: Set(req.late_penalty.unwrap_or(0.0)),
            status: Set(req
                .status
                .unwrap_or(AssignmentStatus::Published)
                .to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("创建作业失败: {e}")))?;

        Ok(result.into_assignment())
    }

    /// 通过 ID 获取作业
    pub async fn get_assignment_by_id_impl(&self, id: i64) -> Result<Option<Assignment>> {
        let result = Assignments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("查询作业失败: {e}")))?;

        Ok(result.map(|m| m.into_assignment()))
    }

    /// 分页列出作业
    pub async fn list_assignments_with_pagination_impl(
        &self,
        query: AssignmentListQuery,
    ) -> Result<AssignmentListResponse> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(10).clamp(1, 100) as u64;

        let mut select = Assignments::find();

        if let Some(course_ids) = query.course_ids {
            select = select.filter(Column::CourseId.is_in(course_ids));
        }

        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }

        if query.exclude_drafts {
            select = select.filter(Column::Status.ne(AssignmentStatus::Draft.to_string()));
        }

        select = select.order_by_desc(Column::CreatedAt);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| EHubError::database_operation(format!("查询作业总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| EHubError::database_operation(format!("查询作业页数失败: {e}")))?;

        let items = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| EHubError::database_operation(format!("查询作业列表失败: {e}")))?;

        Ok(AssignmentListResponse {
            items: items.into_iter().map(|m| m.into_assignment()).collect(),
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }

    /// 更新作业
    pub async fn update_assignment_impl(
        &self,
        id: i64,
        update: UpdateAssignmentRequest,
    ) -> Result<Option<Assignment>> {
        let existing = Assignments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("查询作业失败: {e}")))?;
        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        model.updated_at = Set(chrono::Utc::now().timestamp());

        if let Some(title) = update.title {
            model.title = Set(title);
        }
        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }
        if let Some(max_points) = update.max_points.filter(|p| *p > 0.0) {
            model.max_points = Set(max_points);
        }
        if let Some(due_date) = update.due_date {
            model.due_date = Set(Some(due_date.timestamp()));
        }
        if let Some(late_penalty) = update.late_penalty {
            model.late_penalty = Set(late_penalty);
        }
        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("更新作业失败: {e}")))?;

        Ok(Some(result.into_assignment()))
    }

    /// 统计非草稿作业数量
    pub async fn count_assignments_impl(&self, course_ids: Option<Vec<i64>>) -> Result<u64> {
        let mut select =
            Assignments::find().filter(Column::Status.ne(AssignmentStatus::Draft.to_string()));
        if let Some(course_ids) = course_ids {
            select = select.filter(Column::CourseId.is_in(course_ids));
        }

        select
            .count(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("统计作业数量失败: {e}")))
    }

    /// 学生对某作业的最新提交
    pub async fn find_assignment_submission_impl(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<AssignmentSubmission>> {
        let result = AssignmentSubmissions::find()
            .filter(SubmissionColumn::AssignmentId.eq(assignment_id))
            .filter(SubmissionColumn::StudentId.eq(student_id))
            .order_by_desc(SubmissionColumn::Id)
            .one(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("查询作业提交失败: {e}")))?;

        Ok(result.map(|m| m.into_submission()))
    }

    /// 新建作业提交
    pub async fn create_assignment_submission_impl(
        &self,
        submission: NewAssignmentSubmission,
    ) -> Result<AssignmentSubmission> {
        let now = chrono::Utc::now().timestamp();

        let model = SubmissionActiveModel {
            assignment_id: Set(submission.assignment_id),
            student_id: Set(submission.student_id),
            content: Set(submission.content),
            raw_grade: Set(None),
            grade: Set(None),
            auto_grade: Set(None),
            status: Set(submission.status.to_string()),
            is_late: Set(submission.is_late),
            feedback: Set(None),
            time_spent: Set(submission.time_spent),
            graded_by: Set(None),
            submitted_at: Set(submission.submitted_at),
            graded_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("创建作业提交失败: {e}")))?;

        Ok(result.into_submission())
    }

    /// 覆盖未评分的提交
    pub async fn replace_assignment_submission_impl(
        &self,
        id: i64,
        submission: NewAssignmentSubmission,
    ) -> Result<Option<AssignmentSubmission>> {
        let existing = AssignmentSubmissions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("查询作业提交失败: {e}")))?;
        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut model: SubmissionActiveModel = existing.into();
        model.content = Set(submission.content);
        model.status = Set(submission.status.to_string());
        model.is_late = Set(submission.is_late);
        model.time_spent = Set(submission.time_spent);
        model.submitted_at = Set(submission.submitted_at);
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("更新作业提交失败: {e}")))?;

        Ok(Some(result.into_submission()))
    }

    /// 通过 ID 获取提交
    pub async fn get_assignment_submission_by_id_impl(
        &self,
        id: i64,
    ) -> Result<Option<AssignmentSubmission>> {
        let result = AssignmentSubmissions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("查询作业提交失败: {e}")))?;

        Ok(result.map(|m| m.into_submission()))
    }

    /// 列出提交
    pub async fn list_assignment_submissions_impl(
        &self,
        assignment_id: i64,
        student_id: Option<i64>,
    ) -> Result<Vec<AssignmentSubmission>> {
        let mut select =
            AssignmentSubmissions::find().filter(SubmissionColumn::AssignmentId.eq(assignment_id));

        if let Some(student_id) = student_id {
            select = select.filter(SubmissionColumn::StudentId.eq(student_id));
        }

        let items = select
            .order_by_asc(SubmissionColumn::StudentId)
            .order_by_asc(SubmissionColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("查询作业提交列表失败: {e}")))?;

        Ok(items.into_iter().map(|m| m.into_submission()).collect())
    }

    /// 评分
    pub async fn grade_assignment_submission_impl(
        &self,
        id: i64,
        update: AssignmentGradeUpdate,
    ) -> Result<Option<AssignmentSubmission>> {
        let existing = AssignmentSubmissions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("查询作业提交失败: {e}")))?;
        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut model: SubmissionActiveModel = existing.into();
        if let Some((raw_grade, grade)) = update.manual {
            model.raw_grade = Set(Some(raw_grade));
            model.grade = Set(Some(grade));
        }
        if let Some(auto_grade) = update.auto_grade {
            model.auto_grade = Set(Some(auto_grade));
        }
        if let Some(feedback) = update.feedback {
            model.feedback = Set(Some(feedback));
        }
        model.status = Set(SubmissionStatus::Graded.to_string());
        model.graded_by = Set(Some(update.graded_by));
        model.graded_at = Set(Some(update.graded_at));
        model.updated_at = Set(update.graded_at);

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("更新作业评分失败: {e}")))?;

        Ok(Some(result.into_submission()))
    }

    /// 更新提交状态
    pub async fn set_assignment_submission_status_impl(
        &self,
        id: i64,
        status: SubmissionStatus,
    ) -> Result<Option<AssignmentSubmission>> {
        let existing = AssignmentSubmissions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("查询作业提交失败: {e}")))?;
        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut model: SubmissionActiveModel = existing.into();
        model.status = Set(status.to_string());
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("更新提交状态失败: {e}")))?;

        Ok(Some(result.into_submission()))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{create_user, memory_storage};
    use super::*;
    use crate::models::courses::requests::CreateCourseRequest;
    use crate::models::users::entities::UserRole;

    async fn setup() -> (SeaOrmStorage, Assignment, i64) {
        let storage = memory_storage().await;
        let teacher = create_user(&storage, "teacher", UserRole::Teacher).await;
        let student = create_user(&storage, "student", UserRole::Student).await;
        let course = storage
            .create_course_impl(
                teacher.id,
                CreateCourseRequest {
                    title: "Literature".into(),
                    description: None,
                    instructor_id: None,
                },
            )
            .await
            .unwrap();
        let assignment = storage
            .create_assignment_impl(
                teacher.id,
                CreateAssignmentRequest {
                    course_id: course.id,
                    title: "Essay".into(),
                    description: None,
                    max_points: None,
                    due_date: None,
                    late_penalty: Some(10.0),
                    status: None,
                },
            )
            .await
            .unwrap();
        (storage, assignment, student.id)
    }

    fn new_submission(assignment_id: i64, student_id: i64) -> NewAssignmentSubmission {
        NewAssignmentSubmission {
            assignment_id,
            student_id,
            content: Some("my essay".into()),
            status: SubmissionStatus::Submitted,
            is_late: false,
            time_spent: 120,
            submitted_at: Some(chrono::Utc::now().timestamp()),
        }
    }

    #[tokio::test]
    async fn test_create_assignment_defaults() {
        let (storage, assignment, _) = setup().await;
        assert_eq!(assignment.max_points, DEFAULT_MAX_SCORE);
        assert_eq!(assignment.status, AssignmentStatus::Published);
        assert_eq!(
            storage
                .count_assignments_impl(Some(vec![assignment.course_id]))
                .await
                .unwrap(),
            1
        );

        storage
            .update_assignment_impl(
                assignment.id,
                UpdateAssignmentRequest {
                    status: Some(AssignmentStatus::Draft),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(storage.count_assignments_impl(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_manual_grade_keeps_auto_grade() {
        let (storage, assignment, student_id) = setup().await;
        let submission = storage
            .create_assignment_submission_impl(new_submission(assignment.id, student_id))
            .await
            .unwrap();

        let auto = storage
            .grade_assignment_submission_impl(
                submission.id,
                AssignmentGradeUpdate {
                    manual: None,
                    auto_grade: Some(70.0),
                    feedback: None,
                    graded_by: 1,
                    graded_at: chrono::Utc::now().timestamp(),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(auto.auto_grade, Some(70.0));
        assert_eq!(auto.grade, None);
        assert_eq!(auto.effective_score(), 70.0);

        let manual = storage
            .grade_assignment_submission_impl(
                submission.id,
                AssignmentGradeUpdate {
                    manual: Some((90.0, 81.0)),
                    auto_grade: None,
                    feedback: Some("nice".into()),
                    graded_by: 1,
                    graded_at: chrono::Utc::now().timestamp(),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(manual.raw_grade, Some(90.0));
        assert_eq!(manual.grade, Some(81.0));
        assert_eq!(manual.auto_grade, Some(70.0));
        assert_eq!(manual.effective_score(), 81.0);
        assert_eq!(manual.status, SubmissionStatus::Graded);
    }

    #[tokio::test]
    async fn test_find_latest_submission() {
        let (storage, assignment, student_id) = setup().await;
        assert!(
            storage
                .find_assignment_submission_impl(assignment.id, student_id)
                .await
                .unwrap()
                .is_none()
        );

        let first = storage
            .create_assignment_submission_impl(new_submission(assignment.id, student_id))
            .await
            .unwrap();
        let mut resubmit = new_submission(assignment.id, student_id);
        resubmit.content = Some("revised".into());
        let replaced = storage
            .replace_assignment_submission_impl(first.id, resubmit)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(replaced.id, first.id);
        assert_eq!(replaced.content.as_deref(), Some("revised"));

        let listed = storage
            .list_assignment_submissions_impl(assignment.id, None)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
    }
}
