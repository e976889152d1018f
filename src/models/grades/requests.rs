use serde::Deserialize;
use ts_rs::TS;

use crate::grading::TimeWindow;
use crate::models::common::query::{
    deserialize_lenient_bool, deserialize_optional_id, deserialize_optional_usize,
};
use crate::models::submissions::entities::SubmissionStatus;

// 成绩条目类型过滤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub enum GradeItemFilter {
    #[default]
    All,
    Assessment,
    Assignment,
}

impl GradeItemFilter {
    pub fn includes_assessments(&self) -> bool {
        matches!(self, GradeItemFilter::All | GradeItemFilter::Assessment)
    }

    pub fn includes_assignments(&self) -> bool {
        matches!(self, GradeItemFilter::All | GradeItemFilter::Assignment)
    }
}

// 成绩状态过滤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub enum GradeStatusFilter {
    /// 已提交、已评分、已发还
    #[default]
    All,
    Submitted,
    Graded,
    Returned,
}

impl GradeStatusFilter {
    pub fn statuses(&self) -> Vec<SubmissionStatus> {
        match self {
            GradeStatusFilter::All => SubmissionStatus::visible_statuses().to_vec(),
            GradeStatusFilter::Submitted => vec![SubmissionStatus::Submitted],
            GradeStatusFilter::Graded => vec![SubmissionStatus::Graded],
            GradeStatusFilter::Returned => vec![SubmissionStatus::Returned],
        }
    }
}

// 成绩列表查询参数
#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct GradeListParams {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub course_id: Option<i64>,
    #[serde(default, rename = "type")]
    pub item_type: GradeItemFilter,
    #[serde(default)]
    pub time_filter: TimeWindow,
    #[serde(default)]
    pub status: GradeStatusFilter,
}

// 排行榜类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub enum LeaderboardType {
    #[default]
    Overall,
    Assessment,
    Assignment,
}

// 排行榜查询参数
#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct LeaderboardParams {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub course_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub assessment_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub assignment_id: Option<i64>,
    #[serde(default, rename = "type")]
    pub board_type: LeaderboardType,
    #[serde(default)]
    pub time_filter: TimeWindow,
    #[serde(default, deserialize_with = "deserialize_optional_usize")]
    pub limit: Option<usize>,
    #[serde(default, deserialize_with = "deserialize_lenient_bool")]
    pub details: bool,
}

// 统计查询参数
#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct StatsParams {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub course_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::TimeWindow;

    #[test]
    fn test_grade_params_defaults() {
        let params: GradeListParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.course_id, None);
        assert_eq!(params.item_type, GradeItemFilter::All);
        assert_eq!(params.time_filter, TimeWindow::All);
        assert_eq!(params.status.statuses().len(), 3);
    }

    #[test]
    fn test_leaderboard_params() {
        let params: LeaderboardParams = serde_json::from_str(
            r#"{"course_id":"all","type":"assessment","time_filter":"month","limit":"20","details":"true"}"#,
        )
        .unwrap();
        assert_eq!(params.course_id, None);
        assert_eq!(params.board_type, LeaderboardType::Assessment);
        assert_eq!(params.time_filter, TimeWindow::Month);
        assert_eq!(params.limit, Some(20));
        assert!(params.details);
    }

    #[test]
    fn test_unparsable_limit_falls_back_to_default() {
        let params =
            actix_web::web::Query::<LeaderboardParams>::from_query("limit=abc&time_filter=week")
                .unwrap()
                .into_inner();
        assert_eq!(params.limit, None);
        assert_eq!(params.time_filter, TimeWindow::Week);
    }

    #[test]
    fn test_item_filter() {
        assert!(GradeItemFilter::All.includes_assessments());
        assert!(GradeItemFilter::All.includes_assignments());
        assert!(!GradeItemFilter::Assessment.includes_assignments());
        assert!(!GradeItemFilter::Assignment.includes_assessments());
    }
}
