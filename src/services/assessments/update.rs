use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::create::{ensure_single_final, validate_questions, validate_settings};
use super::{AssessmentService, load_assessment};
use crate::models::{
    ApiResponse, ErrorCode,
    assessments::{entities::AssessmentType, requests::UpdateAssessmentRequest},
};
use crate::services::courses::course_for_manage;
use crate::services::grades::bump_leaderboard_generation;
use crate::services::{bad_request, current_user, internal_error, not_found};
use crate::utils::validate::validate_title;

pub async fn update_assessment(
    service: &AssessmentService,
    assessment_id: i64,
    mut update_data: UpdateAssessmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    let existing = match load_assessment(storage.as_ref(), assessment_id).await {
        Ok(assessment) => assessment,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = course_for_manage(storage.as_ref(), &user, existing.course_id).await {
        return Ok(resp);
    }

    if let Some(title) = update_data.title.as_deref() {
        if let Err(msg) = validate_title(title) {
            return Ok(bad_request(ErrorCode::BadRequest, msg));
        }
        update_data.title = Some(title.trim().to_string());
    }
    if let Some(questions) = update_data.questions.as_deref()
        && let Err(msg) = validate_questions(questions)
    {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }
    if let Err(msg) = validate_settings(
        update_data.total_points,
        update_data.passing_score,
        update_data.attempts,
        update_data.late_penalty,
        update_data.available_from.or(existing.available_from),
        update_data.due_date.or(existing.due_date),
    ) {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }

    // 更新后仍是未归档的期末测评时，课程内不能有另一个
    let becomes_final =
        update_data.assessment_type.unwrap_or(existing.assessment_type) == AssessmentType::Final;
    let stays_active = !update_data.is_archived.unwrap_or(existing.is_archived);
    if becomes_final
        && stays_active
        && let Err(resp) =
            ensure_single_final(storage.as_ref(), existing.course_id, Some(assessment_id)).await
    {
        return Ok(resp);
    }

    match storage.update_assessment(assessment_id, update_data).await {
        Ok(Some(assessment)) => {
            info!("Assessment {} updated by user {}", assessment_id, user.id);
            // 满分或归档状态可能改变，排行榜需要重算
            bump_leaderboard_generation(request).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                assessment,
                "Assessment updated successfully",
            )))
        }
        Ok(None) => Ok(not_found(
            ErrorCode::AssessmentNotFound,
            "Assessment not found",
        )),
        Err(e) => Ok(internal_error("Assessment update failed", e)),
    }
}
