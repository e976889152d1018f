//! 测评与测评提交存储操作

use super::SeaOrmStorage;
use crate::entity::assessment_submissions::{
    ActiveModel as SubmissionActiveModel, Column as SubmissionColumn,
    Entity as AssessmentSubmissions,
};
use crate::entity::assessments::{ActiveModel, Column, Entity as Assessments};
use crate::errors::{EHubError, Result};
use crate::grading::DEFAULT_MAX_SCORE;
use crate::models::{
    PaginationInfo,
    assessments::{
        entities::{Assessment, AssessmentSubmission, AssessmentType},
        requests::{
            AssessmentGradeUpdate, AssessmentListQuery, CreateAssessmentRequest,
            NewAssessmentSubmission, UpdateAssessmentRequest,
        },
        responses::AssessmentListResponse,
    },
    submissions::entities::SubmissionStatus,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

// 未指定总分时取各题分值之和
fn resolve_total_points(req: &CreateAssessmentRequest) -> f64 {
    match req.total_points {
        Some(total) if total > 0.0 => total,
        _ => {
            let sum: f64 = req.questions.iter().map(|q| q.points.max(0.0)).sum();
            if sum > 0.0 { sum } else { DEFAULT_MAX_SCORE }
        }
    }
}

impl SeaOrmStorage {
    /// 创建测评
    pub async fn create_assessment_impl(
        &self,
        created_by: i64,
        req: CreateAssessmentRequest,
    ) -> Result<Assessment> {
        let now = chrono::Utc::now().timestamp();
        let total_points = resolve_total_points(&req);
        let questions = serde_json::to_string(&req.questions)?;

        let model = ActiveModel {
            course_id: Set(req.course_id),
            created_by: Set(created_by),
            title: Set(req.title),
            description: Set(req.description),
            assessment_type: Set(req.assessment_type.to_string()),
            questions: Set(questions),
            total_points: Set(total_points),
            passing_score: Set(req.passing_score.unwrap_or(60.0)),
            attempts: Set(req.attempts.unwrap_or(1)),
            late_penalty: Set(req.late_penalty.unwrap_or(0.0)),
            available_from: Set(req.available_from.map(|d| d.timestamp())),
            due_date: Set(req.due_date.map(|d| d.timestamp())),
            is_archived: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("创建测评失败: {e}")))?;

        Ok(result.into_assessment())
    }

    /// 通过 ID 获取测评
    pub async fn get_assessment_by_id_impl(&self, id: i64) -> Result<Option<Assessment>> {
        let result = Assessments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("查询测评失败: {e}")))?;

        Ok(result.map(|m| m.into_assessment()))
    }

    /// 分页列出测评
    pub async fn list_assessments_with_pagination_impl(
        &self,
        query: AssessmentListQuery,
    ) -> Result<AssessmentListResponse> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(10).clamp(1, 100) as u64;

        let mut select = Assessments::find();

        if let Some(course_ids) = query.course_ids {
            select = select.filter(Column::CourseId.is_in(course_ids));
        }

        if let Some(assessment_type) = query.assessment_type {
            select = select.filter(Column::AssessmentType.eq(assessment_type.to_string()));
        }

        if !query.include_archived {
            select = select.filter(Column::IsArchived.eq(false));
        }

        select = select.order_by_desc(Column::CreatedAt);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| EHubError::database_operation(format!("查询测评总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| EHubError::database_operation(format!("查询测评页数失败: {e}")))?;

        let items = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| EHubError::database_operation(format!("查询测评列表失败: {e}")))?;

        Ok(AssessmentListResponse {
            items: items.into_iter().map(|m| m.into_assessment()).collect(),
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }

    /// 更新测评
    pub async fn update_assessment_impl(
        &self,
        id: i64,
        update: UpdateAssessmentRequest,
    ) -> Result<Option<Assessment>> {
        let existing = Assessments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("查询测评失败: {e}")))?;
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
        if let Some(assessment_type) = update.assessment_type {
            model.assessment_type = Set(assessment_type.to_string());
        }
        if let Some(questions) = update.questions {
            if update.total_points.is_none() {
                let sum: f64 = questions.iter().map(|q| q.points.max(0.0)).sum();
                if sum > 0.0 {
                    model.total_points = Set(sum);
                }
            }
            model.questions = Set(serde_json::to_string(&questions)?);
        }
        if let Some(total_points) = update.total_points.filter(|t| *t > 0.0) {
            model.total_points = Set(total_points);
        }
        if let Some(passing_score) = update.passing_score {
            model.passing_score = Set(passing_score);
        }
        if let Some(attempts) = update.attempts {
            model.attempts = Set(attempts);
        }
        if let Some(late_penalty) = update.late_penalty {
            model.late_penalty = Set(late_penalty);
        }
        if let Some(available_from) = update.available_from {
            model.available_from = Set(Some(available_from.timestamp()));
        }
        if let Some(due_date) = update.due_date {
            model.due_date = Set(Some(due_date.timestamp()));
        }
        if let Some(is_archived) = update.is_archived {
            model.is_archived = Set(is_archived);
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("更新测评失败: {e}")))?;

        Ok(Some(result.into_assessment()))
    }

    /// 课程中未归档的期末测评
    pub async fn find_active_final_assessment_impl(
        &self,
        course_id: i64,
        exclude_id: Option<i64>,
    ) -> Result<Option<Assessment>> {
        let mut select = Assessments::find()
            .filter(Column::CourseId.eq(course_id))
            .filter(Column::AssessmentType.eq(AssessmentType::Final.to_string()))
            .filter(Column::IsArchived.eq(false));

        if let Some(exclude_id) = exclude_id {
            select = select.filter(Column::Id.ne(exclude_id));
        }

        let result = select
            .one(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("查询期末测评失败: {e}")))?;

        Ok(result.map(|m| m.into_assessment()))
    }

    /// 统计未归档测评数量
    pub async fn count_assessments_impl(&self, course_ids: Option<Vec<i64>>) -> Result<u64> {
        let mut select = Assessments::find().filter(Column::IsArchived.eq(false));
        if let Some(course_ids) = course_ids {
            select = select.filter(Column::CourseId.is_in(course_ids));
        }

        select
            .count(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("统计测评数量失败: {e}")))
    }

    /// 非草稿提交次数
    pub async fn count_assessment_attempts_impl(
        &self,
        assessment_id: i64,
        student_id: i64,
    ) -> Result<u64> {
        AssessmentSubmissions::find()
            .filter(SubmissionColumn::AssessmentId.eq(assessment_id))
            .filter(SubmissionColumn::StudentId.eq(student_id))
            .filter(SubmissionColumn::Status.ne(SubmissionStatus::DRAFT))
            .count(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("统计提交次数失败: {e}")))
    }

    /// 学生的草稿
    pub async fn find_assessment_draft_impl(
        &self,
        assessment_id: i64,
        student_id: i64,
    ) -> Result<Option<AssessmentSubmission>> {
        let result = AssessmentSubmissions::find()
            .filter(SubmissionColumn::AssessmentId.eq(assessment_id))
            .filter(SubmissionColumn::StudentId.eq(student_id))
            .filter(SubmissionColumn::Status.eq(SubmissionStatus::DRAFT))
            .order_by_desc(SubmissionColumn::UpdatedAt)
            .one(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("查询草稿失败: {e}")))?;

        Ok(result.map(|m| m.into_submission()))
    }

    /// 新建测评提交
    pub async fn create_assessment_submission_impl(
        &self,
        submission: NewAssessmentSubmission,
    ) -> Result<AssessmentSubmission> {
        let now = chrono::Utc::now().timestamp();

        let model = SubmissionActiveModel {
            assessment_id: Set(submission.assessment_id),
            course_id: Set(submission.course_id),
            student_id: Set(submission.student_id),
            attempt_number: Set(submission.attempt_number),
            answers: Set(serde_json::to_string(&submission.answers)?),
            raw_score: Set(submission.raw_score),
            score: Set(submission.score),
            status: Set(submission.status.to_string()),
            is_late: Set(submission.is_late),
            feedback: Set(None),
            time_spent: Set(submission.time_spent),
            graded_by: Set(None),
            submitted_at: Set(submission.submitted_at),
            graded_at: Set(submission.score.and(submission.submitted_at)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("创建测评提交失败: {e}")))?;

        Ok(result.into_submission())
    }

    /// 覆盖已有草稿
    pub async fn replace_assessment_draft_impl(
        &self,
        draft_id: i64,
        submission: NewAssessmentSubmission,
    ) -> Result<Option<AssessmentSubmission>> {
        let existing = AssessmentSubmissions::find_by_id(draft_id)
            .one(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("查询草稿失败: {e}")))?;
        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut model: SubmissionActiveModel = existing.into();
        model.attempt_number = Set(submission.attempt_number);
        model.answers = Set(serde_json::to_string(&submission.answers)?);
        model.raw_score = Set(submission.raw_score);
        model.score = Set(submission.score);
        model.status = Set(submission.status.to_string());
        model.is_late = Set(submission.is_late);
        model.time_spent = Set(submission.time_spent);
        model.submitted_at = Set(submission.submitted_at);
        model.graded_at = Set(submission.score.and(submission.submitted_at));
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("更新草稿失败: {e}")))?;

        Ok(Some(result.into_submission()))
    }

    /// 通过 ID 获取提交
    pub async fn get_assessment_submission_by_id_impl(
        &self,
        id: i64,
    ) -> Result<Option<AssessmentSubmission>> {
        let result = AssessmentSubmissions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("查询测评提交失败: {e}")))?;

        Ok(result.map(|m| m.into_submission()))
    }

    /// 列出提交
    pub async fn list_assessment_submissions_impl(
        &self,
        assessment_id: i64,
        student_id: Option<i64>,
    ) -> Result<Vec<AssessmentSubmission>> {
        let mut select =
            AssessmentSubmissions::find().filter(SubmissionColumn::AssessmentId.eq(assessment_id));

        if let Some(student_id) = student_id {
            select = select.filter(SubmissionColumn::StudentId.eq(student_id));
        }

        let items = select
            .order_by_asc(SubmissionColumn::StudentId)
            .order_by_asc(SubmissionColumn::AttemptNumber)
            .all(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("查询测评提交列表失败: {e}")))?;

        Ok(items.into_iter().map(|m| m.into_submission()).collect())
    }

    /// 评分
    pub async fn grade_assessment_submission_impl(
        &self,
        id: i64,
        update: AssessmentGradeUpdate,
    ) -> Result<Option<AssessmentSubmission>> {
        let existing = AssessmentSubmissions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("查询测评提交失败: {e}")))?;
        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut model: SubmissionActiveModel = existing.into();
        model.raw_score = Set(Some(update.raw_score));
        model.score = Set(Some(update.score));
        model.status = Set(SubmissionStatus::Graded.to_string());
        if let Some(feedback) = update.feedback {
            model.feedback = Set(Some(feedback));
        }
        model.graded_by = Set(Some(update.graded_by));
        model.graded_at = Set(Some(update.graded_at));
        model.updated_at = Set(update.graded_at);

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("更新测评评分失败: {e}")))?;

        Ok(Some(result.into_submission()))
    }

    /// 更新提交状态
    pub async fn set_assessment_submission_status_impl(
        &self,
        id: i64,
        status: SubmissionStatus,
    ) -> Result<Option<AssessmentSubmission>> {
        let existing = AssessmentSubmissions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("查询测评提交失败: {e}")))?;
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
    use crate::models::assessments::entities::{Question, QuestionType};
    use crate::models::courses::requests::CreateCourseRequest;
    use crate::models::submissions::entities::AnswerValue;
    use crate::models::users::entities::UserRole;

    fn question(id: &str, points: f64) -> Question {
        Question {
            id: id.to_string(),
            question_type: QuestionType::MultipleChoice,
            question: format!("question {id}"),
            options: vec!["a".into(), "b".into()],
            correct_answer: Some(AnswerValue::Single("a".into())),
            points,
            tolerance: None,
            explanation: None,
        }
    }

    fn assessment_request(course_id: i64, assessment_type: AssessmentType) -> CreateAssessmentRequest {
        CreateAssessmentRequest {
            course_id,
            title: "Unit test".to_string(),
            description: None,
            assessment_type,
            questions: vec![question("q1", 4.0), question("q2", 6.0)],
            total_points: None,
            passing_score: None,
            attempts: Some(2),
            late_penalty: None,
            available_from: None,
            due_date: None,
        }
    }

    fn new_submission(assessment: &Assessment, student_id: i64, status: SubmissionStatus) -> NewAssessmentSubmission {
        NewAssessmentSubmission {
            assessment_id: assessment.id,
            course_id: assessment.course_id,
            student_id,
            attempt_number: 1,
            answers: Vec::new(),
            raw_score: None,
            score: None,
            status,
            is_late: false,
            time_spent: 30,
            submitted_at: (status != SubmissionStatus::Draft)
                .then(|| chrono::Utc::now().timestamp()),
        }
    }

    async fn setup() -> (SeaOrmStorage, i64, i64) {
        let storage = memory_storage().await;
        let teacher = create_user(&storage, "teacher", UserRole::Teacher).await;
        let student = create_user(&storage, "student", UserRole::Student).await;
        let course = storage
            .create_course_impl(
                teacher.id,
                CreateCourseRequest {
                    title: "Chemistry".into(),
                    description: None,
                    instructor_id: None,
                },
            )
            .await
            .unwrap();
        (storage, course.id, student.id)
    }

    #[tokio::test]
    async fn test_total_points_defaults_to_question_sum() {
        let (storage, course_id, _) = setup().await;
        let assessment = storage
            .create_assessment_impl(1, assessment_request(course_id, AssessmentType::Quiz))
            .await
            .unwrap();
        assert_eq!(assessment.total_points, 10.0);
        assert_eq!(assessment.questions.len(), 2);
        assert_eq!(assessment.attempts, 2);
        assert!(!assessment.is_archived);
    }

    #[tokio::test]
    async fn test_active_final_assessment_lookup() {
        let (storage, course_id, _) = setup().await;
        let final_exam = storage
            .create_assessment_impl(1, assessment_request(course_id, AssessmentType::Final))
            .await
            .unwrap();

        let found = storage
            .find_active_final_assessment_impl(course_id, None)
            .await
            .unwrap();
        assert_eq!(found.map(|a| a.id), Some(final_exam.id));

        // 排除自身
        assert!(
            storage
                .find_active_final_assessment_impl(course_id, Some(final_exam.id))
                .await
                .unwrap()
                .is_none()
        );

        // 归档后不再占用
        storage
            .update_assessment_impl(
                final_exam.id,
                UpdateAssessmentRequest {
                    is_archived: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(
            storage
                .find_active_final_assessment_impl(course_id, None)
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(storage.count_assessments_impl(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_attempts_ignore_drafts() {
        let (storage, course_id, student_id) = setup().await;
        let assessment = storage
            .create_assessment_impl(1, assessment_request(course_id, AssessmentType::Quiz))
            .await
            .unwrap();

        let draft = storage
            .create_assessment_submission_impl(new_submission(
                &assessment,
                student_id,
                SubmissionStatus::Draft,
            ))
            .await
            .unwrap();
        assert_eq!(
            storage
                .count_assessment_attempts_impl(assessment.id, student_id)
                .await
                .unwrap(),
            0
        );

        let found = storage
            .find_assessment_draft_impl(assessment.id, student_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, draft.id);

        let submitted = storage
            .replace_assessment_draft_impl(
                draft.id,
                new_submission(&assessment, student_id, SubmissionStatus::Submitted),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(submitted.id, draft.id);
        assert_eq!(submitted.status, SubmissionStatus::Submitted);
        assert_eq!(
            storage
                .count_assessment_attempts_impl(assessment.id, student_id)
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_grade_and_return_submission() {
        let (storage, course_id, student_id) = setup().await;
        let assessment = storage
            .create_assessment_impl(1, assessment_request(course_id, AssessmentType::Quiz))
            .await
            .unwrap();
        let submission = storage
            .create_assessment_submission_impl(new_submission(
                &assessment,
                student_id,
                SubmissionStatus::Submitted,
            ))
            .await
            .unwrap();

        let graded = storage
            .grade_assessment_submission_impl(
                submission.id,
                AssessmentGradeUpdate {
                    raw_score: 8.0,
                    score: 7.2,
                    feedback: Some("good".into()),
                    graded_by: 1,
                    graded_at: chrono::Utc::now().timestamp(),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(graded.status, SubmissionStatus::Graded);
        assert_eq!(graded.raw_score, Some(8.0));
        assert_eq!(graded.score, Some(7.2));
        assert_eq!(graded.feedback.as_deref(), Some("good"));

        let returned = storage
            .set_assessment_submission_status_impl(submission.id, SubmissionStatus::Returned)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(returned.status, SubmissionStatus::Returned);

        let listed = storage
            .list_assessment_submissions_impl(assessment.id, Some(student_id))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert!(
            storage
                .grade_assessment_submission_impl(
                    999,
                    AssessmentGradeUpdate {
                        raw_score: 1.0,
                        score: 1.0,
                        feedback: None,
                        graded_by: 1,
                        graded_at: 0,
                    },
                )
                .await
                .unwrap()
                .is_none()
        );
    }
}
