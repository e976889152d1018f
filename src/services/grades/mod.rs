//! 成绩服务：成绩列表、排行榜与学生统计
//!
//! 所有结果都在读取时由提交记录计算，不落库。

pub mod cache;
pub mod leaderboard;
pub mod list;
pub mod stats;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::models::grades::requests::{GradeListParams, LeaderboardParams, StatsParams};
use crate::storage::Storage;

pub use cache::bump_leaderboard_generation;
pub use leaderboard::BoardRequest;
pub use list::GradeScope;

pub struct GradeService {
    storage: Option<Arc<dyn Storage>>,
}

impl GradeService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    // 成绩列表
    pub async fn list_grades(
        &self,
        scope: GradeScope,
        params: GradeListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_grades(self, scope, params, request).await
    }

    // 排行榜
    pub async fn leaderboard(
        &self,
        board: BoardRequest,
        params: LeaderboardParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let default_limit = AppConfig::get().grading.leaderboard_default_limit;
        leaderboard::leaderboard(self, board, params, default_limit, request).await
    }

    // 管理员排行榜，默认条数更多
    pub async fn admin_leaderboard(
        &self,
        params: LeaderboardParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let default_limit = AppConfig::get().grading.admin_leaderboard_default_limit;
        let board = BoardRequest::from_params(&params);
        leaderboard::leaderboard(self, board, params, default_limit, request).await
    }

    // 学生统计
    pub async fn stats(
        &self,
        params: StatsParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        stats::student_stats(self, params.course_id, request).await
    }

    pub async fn course_stats(
        &self,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        stats::student_stats(self, Some(course_id), request).await
    }
}
