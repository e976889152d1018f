use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{AssignmentService, load_assignment};
use crate::errors::EHubError;
use crate::models::{
    ApiResponse, ErrorCode,
    assignments::{
        entities::{Assignment, AssignmentStatus},
        requests::{NewAssignmentSubmission, SubmitAssignmentRequest},
    },
    submissions::entities::SubmissionStatus,
};
use crate::services::courses::course_for_view;
use crate::services::{conflict, current_user, internal_error, not_found};

pub(crate) fn build_submission(
    assignment: &Assignment,
    student_id: i64,
    submit_data: SubmitAssignmentRequest,
    now: chrono::DateTime<chrono::Utc>,
) -> NewAssignmentSubmission {
    let is_draft = submit_data.is_draft;
    NewAssignmentSubmission {
        assignment_id: assignment.id,
        student_id,
        content: submit_data.content,
        status: if is_draft {
            SubmissionStatus::Draft
        } else {
            SubmissionStatus::Submitted
        },
        is_late: !is_draft && assignment.due_date.is_some_and(|due| now > due),
        time_spent: submit_data.time_spent.max(0),
        submitted_at: (!is_draft).then(|| now.timestamp()),
    }
}

pub async fn submit_assignment(
    service: &AssignmentService,
    assignment_id: i64,
    submit_data: SubmitAssignmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    let assignment = match load_assignment(storage.as_ref(), assignment_id).await {
        Ok(assignment) => assignment,
        Err(resp) => return Ok(resp),
    };
    match assignment.status {
        AssignmentStatus::Draft => {
            return Ok(not_found(
                ErrorCode::AssignmentNotFound,
                "Assignment not found",
            ));
        }
        AssignmentStatus::Closed => {
            return Ok(conflict(
                ErrorCode::AssignmentClosed,
                "Assignment is closed for submissions",
            ));
        }
        AssignmentStatus::Published => {}
    }
    if let Err(resp) = course_for_view(storage.as_ref(), &user, assignment.course_id).await {
        return Ok(resp);
    }

    let existing = match storage
        .find_assignment_submission(assignment_id, user.id)
        .await
    {
        Ok(existing) => existing,
        Err(e) => return Ok(internal_error("Failed to load submission", e)),
    };
    // 已评分的提交不能再覆盖
    if let Some(ref existing) = existing
        && existing.status.is_scored()
    {
        return Ok(conflict(
            ErrorCode::InvalidSubmissionState,
            format!(
                "Submission has already been graded (status: {})",
                existing.status
            ),
        ));
    }

    let is_draft = submit_data.is_draft;
    let new_submission = build_submission(&assignment, user.id, submit_data, chrono::Utc::now());
    let saved = match existing {
        Some(existing) => storage
            .replace_assignment_submission(existing.id, new_submission)
            .await
            .and_then(|s| {
                s.ok_or_else(|| {
                    EHubError::not_found(format!("Submission {} disappeared", existing.id))
                })
            }),
        None => storage.create_assignment_submission(new_submission).await,
    };

    match saved {
        Ok(submission) => {
            info!(
                "Assignment {} submitted by {} (status: {}, late: {})",
                assignment_id, user.id, submission.status, submission.is_late
            );
            let message = if is_draft {
                "Draft saved successfully"
            } else {
                "Assignment submitted successfully"
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success(submission, message)))
        }
        Err(e) => Ok(internal_error("Failed to save submission", e)),
    }
}
