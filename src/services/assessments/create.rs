use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashSet;
use tracing::info;

use super::AssessmentService;
use crate::models::{
    ApiResponse, ErrorCode,
    assessments::{
        entities::{AssessmentType, Question},
        requests::CreateAssessmentRequest,
    },
};
use crate::services::courses::course_for_manage;
use crate::services::{bad_request, conflict, current_user, internal_error};
use crate::storage::Storage;
use crate::utils::validate::{validate_percent, validate_title};

/// 题目 ID 非空且唯一，分值非负
pub(super) fn validate_questions(questions: &[Question]) -> Result<(), String> {
    let mut seen = HashSet::new();
    for question in questions {
        if question.id.trim().is_empty() {
            return Err("Question id must not be empty".to_string());
        }
        if !seen.insert(question.id.as_str()) {
            return Err(format!("Duplicate question id: {}", question.id));
        }
        if !question.points.is_finite() || question.points < 0.0 {
            return Err(format!(
                "Question {} must have non-negative points",
                question.id
            ));
        }
    }
    Ok(())
}

/// 数值类设置的公共校验
pub(super) fn validate_settings(
    total_points: Option<f64>,
    passing_score: Option<f64>,
    attempts: Option<i32>,
    late_penalty: Option<f64>,
    available_from: Option<chrono::DateTime<chrono::Utc>>,
    due_date: Option<chrono::DateTime<chrono::Utc>>,
) -> Result<(), String> {
    if let Some(total) = total_points
        && (!total.is_finite() || total <= 0.0)
    {
        return Err("total_points must be greater than 0".to_string());
    }
    if let Some(passing) = passing_score {
        validate_percent("passing_score", passing)?;
    }
    if let Some(penalty) = late_penalty {
        validate_percent("late_penalty", penalty)?;
    }
    if let Some(attempts) = attempts
        && attempts < 1
    {
        return Err("attempts must be at least 1".to_string());
    }
    if let (Some(from), Some(due)) = (available_from, due_date)
        && due < from
    {
        return Err("due_date must not be earlier than available_from".to_string());
    }
    Ok(())
}

/// 课程中已有未归档的期末测评时返回冲突响应
pub(super) async fn ensure_single_final(
    storage: &dyn Storage,
    course_id: i64,
    exclude_id: Option<i64>,
) -> Result<(), HttpResponse> {
    match storage
        .find_active_final_assessment(course_id, exclude_id)
        .await
    {
        Ok(Some(existing)) => Err(conflict(
            ErrorCode::FinalAssessmentExists,
            format!(
                "Course already has an active final assessment (id {})",
                existing.id
            ),
        )),
        Ok(None) => Ok(()),
        Err(e) => Err(internal_error("Failed to check final assessment", e)),
    }
}

pub async fn create_assessment(
    service: &AssessmentService,
    mut assessment_data: CreateAssessmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    if let Err(msg) = validate_title(&assessment_data.title) {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }
    assessment_data.title = assessment_data.title.trim().to_string();

    if let Err(msg) = validate_questions(&assessment_data.questions).and_then(|_| {
        validate_settings(
            assessment_data.total_points,
            assessment_data.passing_score,
            assessment_data.attempts,
            assessment_data.late_penalty,
            assessment_data.available_from,
            assessment_data.due_date,
        )
    }) {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }

    let storage = service.get_storage(request)?;

    if let Err(resp) = course_for_manage(storage.as_ref(), &user, assessment_data.course_id).await
    {
        return Ok(resp);
    }

    if assessment_data.assessment_type == AssessmentType::Final
        && let Err(resp) =
            ensure_single_final(storage.as_ref(), assessment_data.course_id, None).await
    {
        return Ok(resp);
    }

    match storage.create_assessment(user.id, assessment_data).await {
        Ok(assessment) => {
            info!(
                "Assessment {} created in course {} by user {}",
                assessment.id, assessment.course_id, user.id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                assessment,
                "Assessment created successfully",
            )))
        }
        Err(e) => Ok(internal_error("Assessment creation failed", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assessments::entities::QuestionType;
    use crate::services::test_support::{classroom, status_and_code};
    use actix_web::http::StatusCode;

    fn final_exam(course_id: i64) -> CreateAssessmentRequest {
        CreateAssessmentRequest {
            course_id,
            title: "Final exam".into(),
            description: None,
            assessment_type: AssessmentType::Final,
            questions: Vec::new(),
            total_points: Some(100.0),
            passing_score: None,
            attempts: None,
            late_penalty: None,
            available_from: None,
            due_date: None,
        }
    }

    fn question(id: &str, points: f64) -> Question {
        Question {
            id: id.into(),
            question_type: QuestionType::TrueFalse,
            question: "?".into(),
            options: Vec::new(),
            correct_answer: None,
            points,
            tolerance: None,
            explanation: None,
        }
    }

    #[test]
    fn test_question_validation() {
        assert!(validate_questions(&[question("q1", 1.0), question("q2", 2.0)]).is_ok());
        assert!(validate_questions(&[question("q1", 1.0), question("q1", 2.0)]).is_err());
        assert!(validate_questions(&[question(" ", 1.0)]).is_err());
        assert!(validate_questions(&[question("q1", -1.0)]).is_err());
    }

    #[test]
    fn test_settings_validation() {
        let now = chrono::Utc::now();
        assert!(validate_settings(Some(50.0), Some(60.0), Some(3), Some(10.0), None, None).is_ok());
        assert!(validate_settings(Some(0.0), None, None, None, None, None).is_err());
        assert!(validate_settings(None, Some(101.0), None, None, None, None).is_err());
        assert!(validate_settings(None, None, Some(0), None, None, None).is_err());
        assert!(validate_settings(None, None, None, Some(-5.0), None, None).is_err());
        assert!(
            validate_settings(
                None,
                None,
                None,
                None,
                Some(now),
                Some(now - chrono::Duration::days(1))
            )
            .is_err()
        );
    }

    #[actix_web::test]
    async fn test_second_final_is_conflict() {
        let room = classroom().await;
        let service = AssessmentService::new_lazy();
        let request = room.request_as(&room.teacher);

        let first = service
            .create_assessment(final_exam(room.course_id), &request)
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = service
            .create_assessment(final_exam(room.course_id), &request)
            .await
            .unwrap();
        let (status, code) = status_and_code(second).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(code, ErrorCode::FinalAssessmentExists as i64);
    }
}
