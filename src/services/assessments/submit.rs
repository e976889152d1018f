use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use super::{AssessmentService, load_assessment};
use crate::errors::EHubError;
use crate::grading::{ObjectiveScore, apply_late_penalty, round_score, score_objective_answers};
use crate::models::{
    ApiResponse, ErrorCode,
    assessments::{
        entities::Assessment,
        requests::{NewAssessmentSubmission, SubmitAssessmentRequest},
        responses::SubmitAssessmentResponse,
    },
    submissions::entities::{GradedAnswer, SubmissionStatus},
};
use crate::services::courses::course_for_view;
use crate::services::grades::bump_leaderboard_generation;
use crate::services::{conflict, current_user, forbidden, internal_error, not_found};

/// 客观题得分按测评满分折算
pub(crate) fn scale_to_total(earned: f64, possible: f64, total_points: f64) -> f64 {
    if possible > 0.0 && total_points > 0.0 {
        round_score(earned / possible * total_points)
    } else {
        earned
    }
}

/// 草稿只保存作答，不暴露判分结果
fn draft_answers(scoring: &ObjectiveScore) -> Vec<GradedAnswer> {
    scoring
        .answers
        .iter()
        .map(|a| GradedAnswer {
            question_id: a.question_id.clone(),
            answer: a.answer.clone(),
            is_correct: None,
            points_earned: None,
            feedback: None,
        })
        .collect()
}

/// 由自动判分结果构造提交
pub(crate) fn build_submission(
    assessment: &Assessment,
    student_id: i64,
    attempt_number: i32,
    scoring: &ObjectiveScore,
    is_draft: bool,
    time_spent: i64,
    now: chrono::DateTime<chrono::Utc>,
) -> NewAssessmentSubmission {
    let is_late = !is_draft && assessment.due_date.is_some_and(|due| now > due);
    let raw = scale_to_total(scoring.earned, scoring.possible, assessment.total_points);

    let (answers, raw_score, score, status) = if is_draft {
        (draft_answers(scoring), None, None, SubmissionStatus::Draft)
    } else if scoring.needs_manual_grading {
        // 客观题部分分先记为原始分，等待人工评分
        (
            scoring.answers.clone(),
            Some(raw),
            None,
            SubmissionStatus::Submitted,
        )
    } else {
        let score = apply_late_penalty(raw, assessment.late_penalty, is_late);
        (
            scoring.answers.clone(),
            Some(raw),
            Some(score),
            SubmissionStatus::Graded,
        )
    };

    NewAssessmentSubmission {
        assessment_id: assessment.id,
        course_id: assessment.course_id,
        student_id,
        attempt_number,
        answers,
        raw_score,
        score,
        status,
        is_late,
        time_spent: time_spent.max(0),
        submitted_at: (!is_draft).then(|| now.timestamp()),
    }
}

pub async fn submit_assessment(
    service: &AssessmentService,
    assessment_id: i64,
    submit_data: SubmitAssessmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    let assessment = match load_assessment(storage.as_ref(), assessment_id).await {
        Ok(assessment) => assessment,
        Err(resp) => return Ok(resp),
    };
    if assessment.is_archived {
        return Ok(not_found(
            ErrorCode::AssessmentNotFound,
            "Assessment not found",
        ));
    }
    if let Err(resp) = course_for_view(storage.as_ref(), &user, assessment.course_id).await {
        return Ok(resp);
    }

    let now = chrono::Utc::now();
    if assessment.available_from.is_some_and(|from| now < from) {
        return Ok(forbidden(
            ErrorCode::AssessmentNotAvailable,
            "Assessment is not available yet",
        ));
    }

    // 1. 尝试次数：草稿不计入
    let used = match storage
        .count_assessment_attempts(assessment_id, user.id)
        .await
    {
        Ok(count) => i32::try_from(count).unwrap_or(i32::MAX),
        Err(e) => return Ok(internal_error("Failed to count attempts", e)),
    };
    if !submit_data.is_draft && used >= assessment.attempts {
        return Ok(conflict(
            ErrorCode::AttemptLimitReached,
            format!(
                "Maximum number of attempts ({}) reached",
                assessment.attempts
            ),
        ));
    }

    // 2. 自动判分
    let scoring = score_objective_answers(&assessment.questions, &submit_data.answers);
    let new_submission = build_submission(
        &assessment,
        user.id,
        used.saturating_add(1),
        &scoring,
        submit_data.is_draft,
        submit_data.time_spent,
        now,
    );
    let auto_graded = new_submission.status == SubmissionStatus::Graded;

    // 3. 有草稿时覆盖草稿，否则新建
    let draft = match storage.find_assessment_draft(assessment_id, user.id).await {
        Ok(draft) => draft,
        Err(e) => return Ok(internal_error("Failed to load draft", e)),
    };
    let saved = match draft {
        Some(draft) => storage
            .replace_assessment_draft(draft.id, new_submission)
            .await
            .and_then(|s| {
                s.ok_or_else(|| EHubError::not_found(format!("Draft {} disappeared", draft.id)))
            }),
        None => storage.create_assessment_submission(new_submission).await,
    };
    let submission = match saved {
        Ok(submission) => submission,
        Err(e) => {
            warn!(
                "Failed to save submission for assessment {} by {}: {}",
                assessment_id, user.id, e
            );
            return Ok(internal_error("Failed to save submission", e));
        }
    };

    if auto_graded {
        bump_leaderboard_generation(request).await;
    }

    let counted = if submit_data.is_draft { used } else { used + 1 };
    info!(
        "Assessment {} submitted by {} (status: {}, attempt {})",
        assessment_id, user.id, submission.status, submission.attempt_number
    );

    let response = SubmitAssessmentResponse {
        needs_manual_grading: scoring.needs_manual_grading && !submit_data.is_draft,
        remaining_attempts: (assessment.attempts - counted).max(0),
        submission,
    };
    let message = if submit_data.is_draft {
        "Draft saved successfully"
    } else {
        "Assessment submitted successfully"
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(response, message)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assessments::entities::{AssessmentType, Question, QuestionType};
    use crate::models::assessments::requests::CreateAssessmentRequest;
    use crate::models::submissions::entities::{AnswerValue, SubmittedAnswer};
    use crate::services::test_support::{classroom, status_and_code};
    use actix_web::http::StatusCode;

    fn assessment(due_in_days: Option<i64>, late_penalty: f64) -> Assessment {
        let now = chrono::Utc::now();
        Assessment {
            id: 3,
            course_id: 1,
            created_by: 1,
            title: "Quiz".into(),
            description: None,
            assessment_type: AssessmentType::Quiz,
            questions: vec![
                Question {
                    id: "q1".into(),
                    question_type: QuestionType::MultipleChoice,
                    question: "2 + 2".into(),
                    options: vec!["3".into(), "4".into()],
                    correct_answer: Some(AnswerValue::Single("4".into())),
                    points: 5.0,
                    tolerance: None,
                    explanation: None,
                },
                Question {
                    id: "q2".into(),
                    question_type: QuestionType::TrueFalse,
                    question: "Sky is blue".into(),
                    options: Vec::new(),
                    correct_answer: Some(AnswerValue::Single("true".into())),
                    points: 5.0,
                    tolerance: None,
                    explanation: None,
                },
            ],
            total_points: 20.0,
            passing_score: 60.0,
            attempts: 2,
            late_penalty,
            available_from: None,
            due_date: due_in_days.map(|d| now + chrono::Duration::days(d)),
            is_archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn answers(q1: &str, q2: &str) -> Vec<SubmittedAnswer> {
        vec![
            SubmittedAnswer {
                question_id: "q1".into(),
                answer: AnswerValue::Single(q1.into()),
                time_spent: None,
            },
            SubmittedAnswer {
                question_id: "q2".into(),
                answer: AnswerValue::Single(q2.into()),
                time_spent: None,
            },
        ]
    }

    #[test]
    fn test_scale_to_total() {
        assert_eq!(scale_to_total(5.0, 10.0, 20.0), 10.0);
        assert_eq!(scale_to_total(3.0, 0.0, 20.0), 3.0);
    }

    #[test]
    fn test_objective_submission_is_graded_immediately() {
        let a = assessment(Some(1), 10.0);
        let scoring = score_objective_answers(&a.questions, &answers("4", "false"));
        let s = build_submission(&a, 7, 1, &scoring, false, 30, chrono::Utc::now());
        assert_eq!(s.status, SubmissionStatus::Graded);
        assert!(!s.is_late);
        assert_eq!(s.raw_score, Some(10.0));
        assert_eq!(s.score, Some(10.0));
        assert!(s.submitted_at.is_some());
    }

    #[test]
    fn test_late_penalty_applied_once() {
        let a = assessment(Some(-1), 10.0);
        let scoring = score_objective_answers(&a.questions, &answers("4", "true"));
        let s = build_submission(&a, 7, 1, &scoring, false, 0, chrono::Utc::now());
        assert!(s.is_late);
        assert_eq!(s.raw_score, Some(20.0));
        assert_eq!(s.score, Some(18.0));
    }

    #[test]
    fn test_draft_hides_scoring() {
        let a = assessment(Some(-1), 10.0);
        let scoring = score_objective_answers(&a.questions, &answers("4", "true"));
        let s = build_submission(&a, 7, 1, &scoring, true, 0, chrono::Utc::now());
        assert_eq!(s.status, SubmissionStatus::Draft);
        assert!(!s.is_late);
        assert_eq!(s.score, None);
        assert_eq!(s.submitted_at, None);
        assert!(s.answers.iter().all(|a| a.is_correct.is_none()));
    }

    #[actix_web::test]
    async fn test_submit_beyond_attempt_limit_is_conflict() {
        let room = classroom().await;
        let quiz = room
            .storage
            .create_assessment_impl(
                room.teacher.id,
                CreateAssessmentRequest {
                    course_id: room.course_id,
                    title: "One shot".into(),
                    description: None,
                    assessment_type: AssessmentType::Quiz,
                    questions: Vec::new(),
                    total_points: Some(10.0),
                    passing_score: None,
                    attempts: Some(1),
                    late_penalty: None,
                    available_from: None,
                    due_date: None,
                },
            )
            .await
            .unwrap();
        let service = AssessmentService::new_lazy();
        let request = room.request_as(&room.student);
        let submit = || SubmitAssessmentRequest {
            answers: Vec::new(),
            time_spent: 10,
            is_draft: false,
        };

        let first = service
            .submit_assessment(quiz.id, submit(), &request)
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = service
            .submit_assessment(quiz.id, submit(), &request)
            .await
            .unwrap();
        let (status, code) = status_and_code(second).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(code, ErrorCode::AttemptLimitReached as i64);
    }
}
