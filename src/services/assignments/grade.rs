use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{AssignmentService, load_submission};
use crate::grading::{apply_late_penalty, round_score};
use crate::models::{
    ApiResponse, ErrorCode,
    assignments::{
        entities::{Assignment, AssignmentSubmission},
        requests::AssignmentGradeUpdate,
    },
    submissions::{entities::SubmissionStatus, requests::GradeSubmissionRequest},
};
use crate::services::courses::course_for_manage;
use crate::services::grades::bump_leaderboard_generation;
use crate::services::{bad_request, conflict, current_user, internal_error, not_found};
use crate::utils::validate::validate_score;

/// 评分结果写入人工评分或自动评分字段
pub(crate) fn grade_update(
    assignment: &Assignment,
    submission: &AssignmentSubmission,
    raw: f64,
    auto_graded: bool,
    feedback: Option<String>,
    graded_by: i64,
    now: chrono::DateTime<chrono::Utc>,
) -> AssignmentGradeUpdate {
    let penalized = apply_late_penalty(raw, assignment.late_penalty, submission.is_late);
    let (manual, auto_grade) = if auto_graded {
        (None, Some(penalized))
    } else {
        (Some((round_score(raw), penalized)), None)
    };
    AssignmentGradeUpdate {
        manual,
        auto_grade,
        feedback,
        graded_by,
        graded_at: now.timestamp(),
    }
}

pub async fn grade_submission(
    service: &AssignmentService,
    submission_id: i64,
    grade_data: GradeSubmissionRequest,
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

    if submission.status == SubmissionStatus::Draft {
        return Ok(conflict(
            ErrorCode::InvalidSubmissionState,
            "Draft submissions cannot be graded",
        ));
    }
    let Some(raw) = grade_data.score else {
        return Ok(bad_request(ErrorCode::InvalidScore, "A score is required"));
    };
    if let Err(msg) = validate_score(raw, assignment.max_points) {
        return Ok(bad_request(ErrorCode::InvalidScore, msg));
    }

    let update = grade_update(
        &assignment,
        &submission,
        raw,
        grade_data.auto_graded,
        grade_data.feedback,
        user.id,
        chrono::Utc::now(),
    );

    match storage
        .grade_assignment_submission(submission_id, update)
        .await
    {
        Ok(Some(graded)) => {
            info!(
                "Assignment submission {} graded by {}: {}",
                submission_id,
                user.id,
                graded.effective_score()
            );
            bump_leaderboard_generation(request).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                graded,
                "Submission graded successfully",
            )))
        }
        Ok(None) => Ok(not_found(
            ErrorCode::AssignmentSubmissionNotFound,
            "Assignment submission not found",
        )),
        Err(e) => Ok(internal_error("Failed to grade submission", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assignments::entities::AssignmentStatus;
    use chrono::Utc;

    fn fixtures(is_late: bool) -> (Assignment, AssignmentSubmission) {
        let now = Utc::now();
        let assignment = Assignment {
            id: 3,
            course_id: 1,
            created_by: 9,
            title: "Essay".into(),
            description: None,
            max_points: 100.0,
            due_date: None,
            late_penalty: 10.0,
            status: AssignmentStatus::Published,
            created_at: now,
            updated_at: now,
        };
        let submission = AssignmentSubmission {
            id: 5,
            assignment_id: 3,
            student_id: 2,
            content: None,
            raw_grade: None,
            grade: None,
            auto_grade: None,
            status: SubmissionStatus::Submitted,
            is_late,
            feedback: None,
            time_spent: 0,
            graded_by: None,
            submitted_at: Some(now),
            graded_at: None,
            created_at: now,
            updated_at: now,
        };
        (assignment, submission)
    }

    #[test]
    fn test_manual_grade_applies_late_penalty() {
        let (assignment, submission) = fixtures(true);
        let update = grade_update(&assignment, &submission, 80.0, false, None, 9, Utc::now());
        assert_eq!(update.manual, Some((80.0, 72.0)));
        assert_eq!(update.auto_grade, None);
    }

    #[test]
    fn test_auto_grade_goes_to_auto_field() {
        let (assignment, submission) = fixtures(false);
        let update = grade_update(&assignment, &submission, 65.0, true, None, 9, Utc::now());
        assert_eq!(update.manual, None);
        assert_eq!(update.auto_grade, Some(65.0));
    }
}
