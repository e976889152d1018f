use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::{BTreeSet, HashMap};

use super::GradeService;
use super::leaderboard::{BoardScope, rank_of};
use crate::config::AppConfig;
use crate::errors::Result;
use crate::grading::{ItemKind, ScoredItem, StatsInput, course_stats};
use crate::models::{
    ApiResponse,
    grades::{
        entities::{GradeRecord, GradeRecordQuery},
        responses::CourseStats,
    },
    users::entities::User,
};
use crate::services::courses::course_for_view;
use crate::services::{current_user, internal_error};
use crate::storage::Storage;

/// 提交过（非草稿）的不同条目数
fn completed_items(records: &[GradeRecord], kind: ItemKind) -> i64 {
    records
        .iter()
        .filter(|r| r.kind == kind)
        .map(|r| r.item_id)
        .collect::<BTreeSet<_>>()
        .len() as i64
}

async fn compute_stats(
    storage: &dyn Storage,
    student: &User,
    course_id: Option<i64>,
    passing_percentage: i64,
) -> Result<CourseStats> {
    let course_ids = match course_id {
        Some(id) => vec![id],
        None => storage.list_course_ids_by_student(student.id).await?,
    };

    let total_assessments = storage.count_assessments(Some(course_ids.clone())).await? as i64;
    let total_assignments = storage.count_assignments(Some(course_ids.clone())).await? as i64;

    let records = storage
        .list_grade_records(GradeRecordQuery {
            student_ids: Some(vec![student.id]),
            course_ids: Some(course_ids.clone()),
            ..Default::default()
        })
        .await?;
    // 完成数与总数口径一致：不计已归档测评与草稿作业
    let active_records = storage
        .list_grade_records(GradeRecordQuery {
            student_ids: Some(vec![student.id]),
            course_ids: Some(course_ids.clone()),
            active_items_only: true,
            ..Default::default()
        })
        .await?;

    let graded_items: Vec<ScoredItem> = records
        .iter()
        .filter(|r| r.status.is_scored())
        .map(GradeRecord::to_scored_item)
        .collect();

    let course_titles: HashMap<i64, String> = storage
        .get_courses_by_ids(&course_ids)
        .await?
        .into_iter()
        .map(|c| (c.id, c.title))
        .collect();

    // 名次取自榜单，总人数按选课（或全部学生）计
    let (scope, total_students) = match course_id {
        Some(id) => (
            BoardScope::Course(id),
            storage.list_course_students(id).await?.len(),
        ),
        None => (BoardScope::Overall, storage.list_students().await?.len()),
    };
    let current_rank = rank_of(storage, scope, student.id, passing_percentage).await?;

    Ok(course_stats(StatsInput {
        total_assessments,
        completed_assessments: completed_items(&active_records, ItemKind::Assessment),
        total_assignments,
        completed_assignments: completed_items(&active_records, ItemKind::Assignment),
        graded_items: &graded_items,
        course_titles: &course_titles,
        current_rank,
        total_students,
    }))
}

pub async fn student_stats(
    service: &GradeService,
    course_id: Option<i64>,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    if let Some(course_id) = course_id
        && let Err(resp) = course_for_view(storage.as_ref(), &user, course_id).await
    {
        return Ok(resp);
    }

    let passing_percentage = AppConfig::get().grading.passing_percentage;
    match compute_stats(storage.as_ref(), &user, course_id, passing_percentage).await {
        Ok(stats) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            stats,
            "Statistics retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to compute statistics", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assessments::entities::AssessmentType;
    use crate::models::assessments::requests::{
        AssessmentGradeUpdate, CreateAssessmentRequest, NewAssessmentSubmission,
        UpdateAssessmentRequest,
    };
    use crate::models::courses::requests::CreateCourseRequest;
    use crate::models::submissions::entities::SubmissionStatus;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::storage::sea_orm_storage::test_support::{create_user, memory_storage};

    fn record(kind: ItemKind, item_id: i64) -> GradeRecord {
        GradeRecord {
            submission_id: item_id,
            kind,
            item_id,
            title: "item".into(),
            course_id: 1,
            student_id: 2,
            score: None,
            max_score: 10.0,
            status: SubmissionStatus::Submitted,
            is_late: false,
            feedback: None,
            submitted_at: None,
            graded_at: None,
        }
    }

    #[test]
    fn test_completed_items_are_distinct() {
        let records = vec![
            record(ItemKind::Assessment, 1),
            record(ItemKind::Assessment, 1),
            record(ItemKind::Assessment, 2),
            record(ItemKind::Assignment, 1),
        ];
        assert_eq!(completed_items(&records, ItemKind::Assessment), 2);
        assert_eq!(completed_items(&records, ItemKind::Assignment), 1);
    }

    async fn graded_quiz(
        storage: &SeaOrmStorage,
        course_id: i64,
        student_id: i64,
        score: f64,
    ) -> i64 {
        let assessment = storage
            .create_assessment_impl(
                1,
                CreateAssessmentRequest {
                    course_id,
                    title: format!("Quiz {score}"),
                    description: None,
                    assessment_type: AssessmentType::Quiz,
                    questions: Vec::new(),
                    total_points: Some(50.0),
                    passing_score: None,
                    attempts: None,
                    late_penalty: None,
                    available_from: None,
                    due_date: None,
                },
            )
            .await
            .unwrap();
        let submission = storage
            .create_assessment_submission_impl(NewAssessmentSubmission {
                assessment_id: assessment.id,
                course_id,
                student_id,
                attempt_number: 1,
                answers: Vec::new(),
                raw_score: None,
                score: None,
                status: SubmissionStatus::Submitted,
                is_late: false,
                time_spent: 0,
                submitted_at: Some(1_000),
            })
            .await
            .unwrap();
        storage
            .grade_assessment_submission_impl(
                submission.id,
                AssessmentGradeUpdate {
                    raw_score: score,
                    score,
                    feedback: None,
                    graded_by: 1,
                    graded_at: 2_000,
                },
            )
            .await
            .unwrap();
        assessment.id
    }

    #[tokio::test]
    async fn test_total_students_counts_enrollment_not_board() {
        let storage = memory_storage().await;
        let teacher = create_user(&storage, "teacher", UserRole::Teacher).await;
        let course = storage
            .create_course_impl(
                teacher.id,
                CreateCourseRequest {
                    title: "Biology".into(),
                    description: None,
                    instructor_id: None,
                },
            )
            .await
            .unwrap();
        let alice = create_user(&storage, "alice", UserRole::Student).await;
        let bob = create_user(&storage, "bob", UserRole::Student).await;
        let carol = create_user(&storage, "carol", UserRole::Student).await;
        for student in [&alice, &bob, &carol] {
            storage
                .enroll_student_impl(course.id, student.id)
                .await
                .unwrap();
        }
        graded_quiz(&storage, course.id, alice.id, 40.0).await;

        let stats = compute_stats(&storage, &alice, Some(course.id), 60)
            .await
            .unwrap();
        assert_eq!(stats.current_rank, 1);
        assert_eq!(stats.total_students, 3);

        let stats = compute_stats(&storage, &bob, Some(course.id), 60)
            .await
            .unwrap();
        assert_eq!(stats.current_rank, 0);
        assert_eq!(stats.total_students, 3);

        let stats = compute_stats(&storage, &carol, None, 60).await.unwrap();
        assert_eq!(stats.total_students, 3);
    }

    #[tokio::test]
    async fn test_archived_items_not_counted_as_completed() {
        let storage = memory_storage().await;
        let teacher = create_user(&storage, "teacher", UserRole::Teacher).await;
        let course = storage
            .create_course_impl(
                teacher.id,
                CreateCourseRequest {
                    title: "History".into(),
                    description: None,
                    instructor_id: None,
                },
            )
            .await
            .unwrap();
        let alice = create_user(&storage, "alice", UserRole::Student).await;
        storage
            .enroll_student_impl(course.id, alice.id)
            .await
            .unwrap();
        let archived = graded_quiz(&storage, course.id, alice.id, 40.0).await;
        graded_quiz(&storage, course.id, alice.id, 30.0).await;
        storage
            .update_assessment_impl(
                archived,
                UpdateAssessmentRequest {
                    is_archived: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let stats = compute_stats(&storage, &alice, Some(course.id), 60)
            .await
            .unwrap();
        assert_eq!(stats.total_assessments, 1);
        assert_eq!(stats.completed_assessments, 1);
        // 平均分仍计入已归档测评
        assert_eq!(stats.average_grade, 70);
    }
}
