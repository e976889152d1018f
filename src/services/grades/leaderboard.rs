use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::debug;

use super::GradeService;
use super::cache::LeaderboardCache;
use crate::config::AppConfig;
use crate::errors::Result;
use crate::grading::{
    LeaderboardOptions, ScoredItem, TimeWindow, build_item_leaderboard, build_leaderboard,
};
use crate::models::{
    ApiResponse, ErrorCode,
    grades::{
        entities::GradeRecordQuery,
        requests::{LeaderboardParams, LeaderboardType},
        responses::{LeaderboardEntry, LeaderboardResponse},
    },
    submissions::entities::SubmissionStatus,
    users::entities::{User, UserSummary},
};
use crate::services::courses::course_for_view;
use crate::services::{current_user, internal_error, not_found};
use crate::storage::Storage;

/// 榜单范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardScope {
    /// 全部活跃学生
    Overall,
    /// 课程内已选课学生
    Course(i64),
    Assessment { id: i64, course_id: i64 },
    Assignment { id: i64, course_id: i64 },
}

impl BoardScope {
    fn cache_segment(&self) -> String {
        match self {
            BoardScope::Overall => "overall".to_string(),
            BoardScope::Course(id) => format!("course:{id}"),
            BoardScope::Assessment { id, .. } => format!("assessment:{id}"),
            BoardScope::Assignment { id, .. } => format!("assignment:{id}"),
        }
    }

    fn course_id(&self) -> Option<i64> {
        match self {
            BoardScope::Overall => None,
            BoardScope::Course(course_id)
            | BoardScope::Assessment { course_id, .. }
            | BoardScope::Assignment { course_id, .. } => Some(*course_id),
        }
    }
}

/// 请求中指定的榜单，ID 尚未校验
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardRequest {
    Overall,
    Course(i64),
    Assessment(i64),
    Assignment(i64),
}

impl BoardRequest {
    /// 通用入口的查询参数：单项 ID 优先于课程
    pub fn from_params(params: &LeaderboardParams) -> Self {
        if let Some(id) = params.assessment_id {
            BoardRequest::Assessment(id)
        } else if let Some(id) = params.assignment_id {
            BoardRequest::Assignment(id)
        } else if let Some(id) = params.course_id {
            BoardRequest::Course(id)
        } else {
            BoardRequest::Overall
        }
    }
}

/// 默认条数，超出上限时截断
pub fn effective_limit(requested: Option<usize>, default_limit: usize, max_limit: usize) -> usize {
    requested
        .filter(|limit| *limit > 0)
        .unwrap_or(default_limit)
        .min(max_limit.max(1))
}

/// 校验榜单 ID 与访问权限
async fn resolve_scope(
    storage: &dyn Storage,
    user: &User,
    board: BoardRequest,
) -> std::result::Result<BoardScope, HttpResponse> {
    let scope = match board {
        BoardRequest::Overall => return Ok(BoardScope::Overall),
        BoardRequest::Course(id) => BoardScope::Course(id),
        BoardRequest::Assessment(id) => match storage.get_assessment_by_id(id).await {
            Ok(Some(assessment)) => BoardScope::Assessment {
                id,
                course_id: assessment.course_id,
            },
            Ok(None) => {
                return Err(not_found(
                    ErrorCode::AssessmentNotFound,
                    "Assessment not found",
                ));
            }
            Err(e) => return Err(internal_error("Failed to load assessment", e)),
        },
        BoardRequest::Assignment(id) => match storage.get_assignment_by_id(id).await {
            Ok(Some(assignment)) => BoardScope::Assignment {
                id,
                course_id: assignment.course_id,
            },
            Ok(None) => {
                return Err(not_found(
                    ErrorCode::AssignmentNotFound,
                    "Assignment not found",
                ));
            }
            Err(e) => return Err(internal_error("Failed to load assignment", e)),
        },
    };

    if let Some(course_id) = scope.course_id() {
        course_for_view(storage, user, course_id).await?;
    }
    Ok(scope)
}

/// 计算榜单：只统计已评分或已发还的提交
pub async fn compute_board(
    storage: &dyn Storage,
    scope: BoardScope,
    board_type: LeaderboardType,
    options: &LeaderboardOptions,
) -> Result<(Vec<LeaderboardEntry>, usize)> {
    let now = chrono::Utc::now();
    let mut query = GradeRecordQuery {
        statuses: SubmissionStatus::scored_statuses().to_vec(),
        include_assessments: board_type != LeaderboardType::Assignment,
        include_assignments: board_type != LeaderboardType::Assessment,
        submitted_after: options.window.cutoff(now).map(|cutoff| cutoff.timestamp()),
        ..Default::default()
    };

    let students = match scope {
        BoardScope::Overall => storage.list_students().await?,
        BoardScope::Course(course_id) => {
            query.course_ids = Some(vec![course_id]);
            storage.list_course_students(course_id).await?
        }
        BoardScope::Assessment { id, course_id } => {
            query.assessment_id = Some(id);
            query.include_assessments = true;
            query.include_assignments = false;
            storage.list_course_students(course_id).await?
        }
        BoardScope::Assignment { id, course_id } => {
            query.assignment_id = Some(id);
            query.include_assessments = false;
            query.include_assignments = true;
            storage.list_course_students(course_id).await?
        }
    };
    let students: Vec<UserSummary> = students.iter().map(UserSummary::from).collect();

    let items: Vec<ScoredItem> = storage
        .list_grade_records(query)
        .await?
        .iter()
        .map(|record| record.to_scored_item())
        .collect();

    debug!(
        "Computing {:?} leaderboard over {} students and {} items",
        scope,
        students.len(),
        items.len()
    );

    Ok(match scope {
        BoardScope::Assessment { .. } | BoardScope::Assignment { .. } => {
            build_item_leaderboard(&students, &items, options, now)
        }
        _ => build_leaderboard(&students, &items, options, now),
    })
}

pub async fn leaderboard(
    service: &GradeService,
    board: BoardRequest,
    params: LeaderboardParams,
    default_limit: usize,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    let scope = match resolve_scope(storage.as_ref(), &user, board).await {
        Ok(scope) => scope,
        Err(resp) => return Ok(resp),
    };

    let grading = &AppConfig::get().grading;
    let options = LeaderboardOptions {
        limit: effective_limit(params.limit, default_limit, grading.leaderboard_max_limit),
        passing_percentage: grading.passing_percentage,
        include_details: params.details,
        window: params.time_filter,
    };

    let variant = format!(
        "{}:{:?}:{}:{}:{}",
        scope.cache_segment(),
        params.board_type,
        options.window.as_str(),
        options.limit,
        options.include_details
    );
    let cache = LeaderboardCache::open(request, &variant).await;
    if let Some(ref cache) = cache
        && let Some(response) = cache.get().await
    {
        return Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Leaderboard retrieved successfully",
        )));
    }

    match compute_board(storage.as_ref(), scope, params.board_type, &options).await {
        Ok((entries, total)) => {
            let response = LeaderboardResponse::new(entries, total, options.window);
            if let Some(cache) = cache {
                cache.put(&response).await;
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                response,
                "Leaderboard retrieved successfully",
            )))
        }
        Err(e) => Ok(internal_error("Failed to compute leaderboard", e)),
    }
}

/// 统计中的排名：全量榜单中当前学生的位置，未上榜为 0
pub async fn rank_of(
    storage: &dyn Storage,
    scope: BoardScope,
    student_id: i64,
    passing_percentage: i64,
) -> Result<usize> {
    let options = LeaderboardOptions {
        limit: usize::MAX,
        passing_percentage,
        include_details: false,
        window: TimeWindow::All,
    };
    let (entries, _) = compute_board(storage, scope, LeaderboardType::Overall, &options).await?;
    Ok(entries
        .iter()
        .find(|entry| entry.student.id == student_id)
        .map(|entry| entry.rank)
        .unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_limit() {
        assert_eq!(effective_limit(None, 50, 500), 50);
        assert_eq!(effective_limit(Some(0), 50, 500), 50);
        assert_eq!(effective_limit(Some(20), 50, 500), 20);
        assert_eq!(effective_limit(Some(10_000), 100, 500), 500);
    }

    #[test]
    fn test_board_request_priority() {
        let params = LeaderboardParams {
            course_id: Some(3),
            assessment_id: Some(9),
            ..Default::default()
        };
        assert_eq!(BoardRequest::from_params(&params), BoardRequest::Assessment(9));

        let params = LeaderboardParams {
            course_id: Some(3),
            ..Default::default()
        };
        assert_eq!(BoardRequest::from_params(&params), BoardRequest::Course(3));
        assert_eq!(
            BoardRequest::from_params(&LeaderboardParams::default()),
            BoardRequest::Overall
        );
    }

    #[tokio::test]
    async fn test_course_board_ranks_enrolled_students_only() {
        use crate::models::assessments::{
            entities::AssessmentType,
            requests::{CreateAssessmentRequest, NewAssessmentSubmission},
        };
        use crate::models::courses::requests::CreateCourseRequest;
        use crate::models::users::entities::UserRole;
        use crate::storage::sea_orm_storage::test_support::{create_user, memory_storage};

        let storage = memory_storage().await;
        let teacher = create_user(&storage, "teacher", UserRole::Teacher).await;
        let alice = create_user(&storage, "alice", UserRole::Student).await;
        let bob = create_user(&storage, "bob", UserRole::Student).await;
        let carol = create_user(&storage, "carol", UserRole::Student).await;

        let course = storage
            .create_course(
                teacher.id,
                CreateCourseRequest {
                    title: "Algebra".into(),
                    description: None,
                    instructor_id: None,
                },
            )
            .await
            .unwrap();
        storage.enroll_student(course.id, alice.id).await.unwrap();
        storage.enroll_student(course.id, bob.id).await.unwrap();

        let assessment = storage
            .create_assessment(
                teacher.id,
                CreateAssessmentRequest {
                    course_id: course.id,
                    title: "Quiz 1".into(),
                    description: None,
                    assessment_type: AssessmentType::Quiz,
                    questions: Vec::new(),
                    total_points: Some(50.0),
                    passing_score: None,
                    attempts: Some(3),
                    late_penalty: None,
                    available_from: None,
                    due_date: None,
                },
            )
            .await
            .unwrap();

        let now = chrono::Utc::now().timestamp();
        for (student_id, score) in [(alice.id, 45.0), (bob.id, 30.0), (carol.id, 50.0)] {
            storage
                .create_assessment_submission(NewAssessmentSubmission {
                    assessment_id: assessment.id,
                    course_id: course.id,
                    student_id,
                    attempt_number: 1,
                    answers: Vec::new(),
                    raw_score: Some(score),
                    score: Some(score),
                    status: SubmissionStatus::Graded,
                    is_late: false,
                    time_spent: 0,
                    submitted_at: Some(now),
                })
                .await
                .unwrap();
        }

        let (entries, total) = compute_board(
            &storage,
            BoardScope::Course(course.id),
            LeaderboardType::Overall,
            &LeaderboardOptions::default(),
        )
        .await
        .unwrap();
        assert_eq!(total, 2);
        assert_eq!(entries[0].student.id, alice.id);
        assert_eq!(entries[0].average_score, 90);
        assert_eq!(entries[1].student.id, bob.id);
        assert_eq!(entries[1].rank, 2);

        let (overall, total) = compute_board(
            &storage,
            BoardScope::Overall,
            LeaderboardType::Overall,
            &LeaderboardOptions::default(),
        )
        .await
        .unwrap();
        assert_eq!(total, 3);
        assert_eq!(overall[0].student.id, carol.id);

        let (assignments_only, total) = compute_board(
            &storage,
            BoardScope::Overall,
            LeaderboardType::Assignment,
            &LeaderboardOptions::default(),
        )
        .await
        .unwrap();
        assert!(assignments_only.is_empty());
        assert_eq!(total, 0);
    }
}
