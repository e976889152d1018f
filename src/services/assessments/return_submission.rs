use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AssessmentService, load_submission};
use crate::models::{ApiResponse, ErrorCode, submissions::entities::SubmissionStatus};
use crate::services::courses::course_for_manage;
use crate::services::grades::bump_leaderboard_generation;
use crate::services::{conflict, current_user, internal_error, not_found};

pub async fn return_submission(
    service: &AssessmentService,
    submission_id: i64,
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

    if submission.status != SubmissionStatus::Graded {
        return Ok(conflict(
            ErrorCode::InvalidSubmissionState,
            format!(
                "Only graded submissions can be returned (current status: {})",
                submission.status
            ),
        ));
    }

    match storage
        .set_assessment_submission_status(submission_id, SubmissionStatus::Returned)
        .await
    {
        Ok(Some(returned)) => {
            bump_leaderboard_generation(request).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                returned,
                "Submission returned successfully",
            )))
        }
        Ok(None) => Ok(not_found(
            ErrorCode::AssessmentSubmissionNotFound,
            "Assessment submission not found",
        )),
        Err(e) => Ok(internal_error("Failed to return submission", e)),
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
    async fn test_only_graded_work_can_be_returned() {
        let room = classroom().await;
        let service = AssessmentService::new_lazy();
        let request = room.request_as(&room.teacher);

        let submitted = seeded_submission(&room, SubmissionStatus::Submitted).await;
        let response = service
            .return_submission(submitted, &request)
            .await
            .unwrap();
        let (status, code) = status_and_code(response).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(code, ErrorCode::InvalidSubmissionState as i64);

        let graded = seeded_submission(&room, SubmissionStatus::Graded).await;
        let response = service.return_submission(graded, &request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
