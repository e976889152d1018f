use crate::grading::{ItemKind, ScoredItem};
use crate::models::submissions::entities::SubmissionStatus;

/// 成绩来源记录：一次提交及其所属测评/作业的信息
#[derive(Debug, Clone, PartialEq)]
pub struct GradeRecord {
    pub submission_id: i64,
    pub kind: ItemKind,
    pub item_id: i64,
    pub title: String,
    pub course_id: i64,
    pub student_id: i64,
    /// 最终得分；作业为人工评分、自动评分或 0
    pub score: Option<f64>,
    pub max_score: f64,
    pub status: SubmissionStatus,
    pub is_late: bool,
    pub feedback: Option<String>,
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub graded_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl GradeRecord {
    pub fn to_scored_item(&self) -> ScoredItem {
        ScoredItem {
            student_id: self.student_id,
            kind: self.kind,
            item_id: self.item_id,
            title: self.title.clone(),
            course_id: self.course_id,
            score: self.score.unwrap_or(0.0),
            max_score: Some(self.max_score),
            submitted_at: self.submitted_at,
        }
    }
}

/// 成绩来源查询（存储层）
#[derive(Debug, Clone)]
pub struct GradeRecordQuery {
    pub student_ids: Option<Vec<i64>>,
    pub course_ids: Option<Vec<i64>>,
    pub assessment_id: Option<i64>,
    pub assignment_id: Option<i64>,
    pub include_assessments: bool,
    pub include_assignments: bool,
    pub statuses: Vec<SubmissionStatus>,
    /// Unix 秒，提交时间下界
    pub submitted_after: Option<i64>,
    /// 只保留未归档的测评与非草稿的作业
    pub active_items_only: bool,
}

impl Default for GradeRecordQuery {
    fn default() -> Self {
        Self {
            student_ids: None,
            course_ids: None,
            assessment_id: None,
            assignment_id: None,
            include_assessments: true,
            include_assignments: true,
            statuses: SubmissionStatus::visible_statuses().to_vec(),
            submitted_after: None,
            active_items_only: false,
        }
    }
}
