use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::{BTreeSet, HashMap};

use super::GradeService;
use crate::errors::Result;
use crate::grading::{LetterGrade, percentage, round_score};
use crate::models::{
    ApiResponse, ErrorCode,
    grades::{
        entities::{GradeRecord, GradeRecordQuery},
        requests::GradeListParams,
        responses::{GradeListResponse, StudentGrade},
    },
    users::entities::{User, UserRole, UserSummary},
};
use crate::services::courses::{
    course_for_manage, course_for_view, narrow_course_ids, visible_course_ids,
};
use crate::services::{current_user, forbidden, internal_error};
use crate::storage::Storage;

/// 成绩列表的查询范围
pub enum GradeScope {
    /// 当前学生的全部成绩
    Student,
    StudentCourse(i64),
    /// 当前教师授课的课程，管理员为全部
    Teacher,
    TeacherCourse(i64),
    Admin,
}

fn placeholder_student(id: i64) -> UserSummary {
    UserSummary {
        id,
        username: String::new(),
        name: format!("Student {id}"),
        email: String::new(),
        avatar_url: None,
    }
}

fn to_student_grade(
    record: GradeRecord,
    student: UserSummary,
    course_title: String,
) -> StudentGrade {
    let score = round_score(record.score.unwrap_or(0.0));
    let pct = percentage(score, Some(record.max_score));
    StudentGrade {
        id: record.submission_id,
        item_type: record.kind,
        item_id: record.item_id,
        title: record.title,
        course_id: record.course_id,
        course_title,
        student,
        score,
        max_score: record.max_score,
        percentage: pct,
        letter_grade: LetterGrade::from_percentage(pct),
        status: record.status,
        is_late: record.is_late,
        feedback: record.feedback,
        submitted_at: record.submitted_at,
        graded_at: record.graded_at,
    }
}

/// 已评分条目的总体百分比（分数和 / 满分和）
pub fn average_percentage(records: &[GradeRecord]) -> Option<i64> {
    let scored: Vec<&GradeRecord> = records.iter().filter(|r| r.status.is_scored()).collect();
    if scored.is_empty() {
        return None;
    }
    let total: f64 = scored.iter().map(|r| r.score.unwrap_or(0.0).max(0.0)).sum();
    let max: f64 = scored
        .iter()
        .map(|r| crate::grading::effective_max_score(Some(r.max_score)))
        .sum();
    Some(percentage(total, Some(max)))
}

/// 取数并拼装成绩列表
pub async fn build_grade_list(
    storage: &dyn Storage,
    query: GradeRecordQuery,
) -> Result<GradeListResponse> {
    let records = storage.list_grade_records(query).await?;
    let average = average_percentage(&records);

    let student_ids: Vec<i64> = records
        .iter()
        .map(|r| r.student_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let course_ids: Vec<i64> = records
        .iter()
        .map(|r| r.course_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let students: HashMap<i64, UserSummary> = storage
        .get_users_by_ids(&student_ids)
        .await?
        .iter()
        .map(|u| (u.id, UserSummary::from(u)))
        .collect();
    let course_titles: HashMap<i64, String> = storage
        .get_courses_by_ids(&course_ids)
        .await?
        .into_iter()
        .map(|c| (c.id, c.title))
        .collect();

    let grades: Vec<StudentGrade> = records
        .into_iter()
        .map(|record| {
            let student = students
                .get(&record.student_id)
                .cloned()
                .unwrap_or_else(|| placeholder_student(record.student_id));
            let course_title = course_titles
                .get(&record.course_id)
                .cloned()
                .unwrap_or_else(|| format!("Course {}", record.course_id));
            to_student_grade(record, student, course_title)
        })
        .collect();

    Ok(GradeListResponse {
        total: grades.len(),
        grades,
        average_percentage: average,
    })
}

/// 把范围与查询参数转换为存储层查询；无权访问时返回错误响应
async fn scoped_query(
    storage: &dyn Storage,
    user: &User,
    scope: GradeScope,
    params: &GradeListParams,
) -> std::result::Result<GradeRecordQuery, HttpResponse> {
    let mut query = GradeRecordQuery {
        include_assessments: params.item_type.includes_assessments(),
        include_assignments: params.item_type.includes_assignments(),
        statuses: params.status.statuses(),
        submitted_after: params
            .time_filter
            .cutoff(chrono::Utc::now())
            .map(|cutoff| cutoff.timestamp()),
        ..Default::default()
    };

    match scope {
        GradeScope::Student => {
            query.student_ids = Some(vec![user.id]);
            query.course_ids = params.course_id.map(|id| vec![id]);
        }
        GradeScope::StudentCourse(course_id) => {
            course_for_view(storage, user, course_id).await?;
            query.student_ids = Some(vec![user.id]);
            query.course_ids = Some(vec![course_id]);
        }
        GradeScope::Teacher => {
            let visible = visible_course_ids(storage, user)
                .await
                .map_err(|e| internal_error("Failed to load courses", e))?;
            query.course_ids = narrow_course_ids(visible, params.course_id)?;
        }
        GradeScope::TeacherCourse(course_id) => {
            course_for_manage(storage, user, course_id).await?;
            query.course_ids = Some(vec![course_id]);
        }
        GradeScope::Admin => {
            if user.role != UserRole::Admin {
                return Err(forbidden(ErrorCode::Forbidden, "Access denied."));
            }
            query.course_ids = params.course_id.map(|id| vec![id]);
        }
    }

    Ok(query)
}

pub async fn list_grades(
    service: &GradeService,
    scope: GradeScope,
    params: GradeListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    let query = match scoped_query(storage.as_ref(), &user, scope, &params).await {
        Ok(query) => query,
        Err(resp) => return Ok(resp),
    };

    match build_grade_list(storage.as_ref(), query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Grades retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to retrieve grades", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::ItemKind;
    use crate::models::submissions::entities::SubmissionStatus;

    fn record(status: SubmissionStatus, score: Option<f64>, max: f64) -> GradeRecord {
        GradeRecord {
            submission_id: 1,
            kind: ItemKind::Assessment,
            item_id: 1,
            title: "Quiz".into(),
            course_id: 1,
            student_id: 2,
            score,
            max_score: max,
            status,
            is_late: false,
            feedback: None,
            submitted_at: None,
            graded_at: None,
        }
    }

    #[test]
    fn test_average_counts_scored_only() {
        let records = vec![
            record(SubmissionStatus::Graded, Some(45.0), 50.0),
            record(SubmissionStatus::Returned, Some(30.0), 50.0),
            record(SubmissionStatus::Submitted, None, 100.0),
        ];
        assert_eq!(average_percentage(&records), Some(75));
        assert_eq!(
            average_percentage(&[record(SubmissionStatus::Submitted, Some(10.0), 10.0)]),
            None
        );
    }

    #[test]
    fn test_student_grade_letter() {
        let grade = to_student_grade(
            record(SubmissionStatus::Graded, Some(46.5), 50.0),
            placeholder_student(2),
            "Algebra".into(),
        );
        assert_eq!(grade.percentage, 93);
        assert_eq!(grade.letter_grade, LetterGrade::A);
        assert_eq!(grade.course_title, "Algebra");
    }
}
