use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{AssessmentService, load_submission};
use crate::grading::{apply_late_penalty, round_score};
use crate::models::{
    ApiResponse, ErrorCode,
    assessments::requests::AssessmentGradeUpdate,
    submissions::{entities::SubmissionStatus, requests::GradeSubmissionRequest},
};
use crate::services::courses::course_for_manage;
use crate::services::grades::bump_leaderboard_generation;
use crate::services::{bad_request, conflict, current_user, internal_error, not_found};
use crate::utils::validate::validate_score;

pub async fn grade_submission(
    service: &AssessmentService,
    submission_id: i64,
    grade_data: GradeSubmissionRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    let (submission, assessment) = match load_submission(storage.as_ref(), submission_id).await {
        Ok(loaded) => loaded,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = course_for_manage(storage.as_ref(), &user, assessment.course_id).await {
        return Ok(resp);
    }

    if submission.status == SubmissionStatus::Draft {
        return Ok(conflict(
            ErrorCode::InvalidSubmissionState,
            "Draft submissions cannot be graded",
        ));
    }

    // 未给分时沿用自动判分的原始分
    let Some(raw) = grade_data.score.or(submission.raw_score) else {
        return Ok(bad_request(
            ErrorCode::InvalidScore,
            "A score is required for this submission",
        ));
    };
    if let Err(msg) = validate_score(raw, assessment.total_points) {
        return Ok(bad_request(ErrorCode::InvalidScore, msg));
    }

    // 扣分总是从原始分计算，重复评分不会叠加
    let update = AssessmentGradeUpdate {
        raw_score: round_score(raw),
        score: apply_late_penalty(raw, assessment.late_penalty, submission.is_late),
        feedback: grade_data.feedback,
        graded_by: user.id,
        graded_at: chrono::Utc::now().timestamp(),
    };

    match storage
        .grade_assessment_submission(submission_id, update)
        .await
    {
        Ok(Some(graded)) => {
            info!(
                "Assessment submission {} graded by {}: {:?}",
                submission_id, user.id, graded.score
            );
            bump_leaderboard_generation(request).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                graded,
                "Submission graded successfully",
            )))
        }
        Ok(None) => Ok(not_found(
            ErrorCode::AssessmentSubmissionNotFound,
            "Assessment submission not found",
        )),
        Err(e) => Ok(internal_error("Failed to grade submission", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assessments::entities::AssessmentType;
    use crate::models::assessments::requests::{CreateAssessmentRequest, NewAssessmentSubmission};
    use crate::services::test_support::{Classroom, classroom, status_and_code};
    use actix_web::http::StatusCode;

    async fn seeded_submission(room: &Classroom, status: SubmissionStatus) -> i64 {
        let quiz = room
            .storage
            .create_assessment_impl(
                room.teacher.id,
                CreateAssessmentRequest {
                    course_id: room.course_id,
                    title: "Essay quiz".into(),
                    description: None,
                    assessment_type: AssessmentType::Quiz,
                    questions: Vec::new(),
                    total_points: Some(20.0),
                    passing_score: None,
                    attempts: Some(3),
                    late_penalty: None,
                    available_from: None,
                    due_date: None,
                },
            )
            .await
            .unwrap();
        let is_draft = status == SubmissionStatus::Draft;
        room.storage
            .create_assessment_submission_impl(NewAssessmentSubmission {
                assessment_id: quiz.id,
                course_id: room.course_id,
                student_id: room.student.id,
                attempt_number: 1,
                answers: Vec::new(),
                raw_score: None,
                score: None,
                status,
                is_late: false,
                time_spent: 0,
                submitted_at: (!is_draft).then_some(1_000),
            })
            .await
            .unwrap()
            .id
    }

    #[actix_web::test]
    async fn test_draft_cannot_be_graded() {
        let room = classroom().await;
        let submission_id = seeded_submission(&room, SubmissionStatus::Draft).await;
        let response = AssessmentService::new_lazy()
            .grade_submission(
                submission_id,
                GradeSubmissionRequest {
                    score: Some(15.0),
                    feedback: None,
                    auto_graded: false,
                },
                &room.request_as(&room.teacher),
            )
            .await
            .unwrap();
        let (status, code) = status_and_code(response).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(code, ErrorCode::InvalidSubmissionState as i64);
    }

    #[actix_web::test]
    async fn test_submitted_work_is_graded() {
        let room = classroom().await;
        let submission_id = seeded_submission(&room, SubmissionStatus::Submitted).await;
        let response = AssessmentService::new_lazy()
            .grade_submission(
                submission_id,
                GradeSubmissionRequest {
                    score: Some(15.0),
                    feedback: Some("Good".into()),
                    auto_graded: false,
                },
                &room.request_as(&room.teacher),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let graded = room
            .storage
            .get_assessment_submission_by_id_impl(submission_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(graded.status, SubmissionStatus::Graded);
        assert_eq!(graded.score, Some(15.0));
    }
}
