use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AssignmentService, load_submission};
use crate::models::{ApiResponse, ErrorCode, submissions::entities::SubmissionStatus};
use crate::services::courses::course_for_manage;
use crate::services::grades::bump_leaderboard_generation;
use crate::services::{conflict, current_user, internal_error, not_found};

pub async fn return_submission(
    service: &AssignmentService,
    submission_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    let (submission, assignment) = match load_submission(storage.as_ref(), submission_id).await {
        Ok(loaded) => loaded,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = course_for_manage(storage.as_ref(), &user, assignment.course_id).await {
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
        .set_assignment_submission_status(submission_id, SubmissionStatus::Returned)
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
            ErrorCode::AssignmentSubmissionNotFound,
            "Assignment submission not found",
        )),
        Err(e) => Ok(internal_error("Failed to return submission", e)),
    }
}
