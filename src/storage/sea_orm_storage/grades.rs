//! 成绩来源查询
//!
//! 将测评提交与作业提交统一转换为 `GradeRecord`，供成绩列表、排行榜和统计使用。

use super::SeaOrmStorage;
use crate::entity::assessment_submissions::{
    Column as AssessmentSubmissionColumn, Entity as AssessmentSubmissions,
};
use crate::entity::assessments::{Column as AssessmentColumn, Entity as Assessments};
use crate::entity::assignment_submissions::{
    Column as AssignmentSubmissionColumn, Entity as AssignmentSubmissions,
};
use crate::entity::assignments::{Column as AssignmentColumn, Entity as Assignments};
use crate::entity::from_timestamp;
use crate::errors::{EHubError, Result};
use crate::grading::ItemKind;
use crate::models::assignments::entities::AssignmentStatus;
use crate::models::grades::entities::{GradeRecord, GradeRecordQuery};
use crate::models::submissions::entities::SubmissionStatus;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

impl SeaOrmStorage {
    /// 列出成绩来源记录，按提交时间倒序
    pub async fn list_grade_records_impl(&self, query: GradeRecordQuery) -> Result<Vec<GradeRecord>> {
        if query.student_ids.as_ref().is_some_and(|ids| ids.is_empty())
            || query.course_ids.as_ref().is_some_and(|ids| ids.is_empty())
            || query.statuses.is_empty()
        {
            return Ok(Vec::new());
        }

        let statuses: Vec<&'static str> = query.statuses.iter().map(|s| s.as_str()).collect();
        let mut records = Vec::new();

        // 指定了作业时不查测评，反之亦然
        let want_assessments = query.include_assessments && query.assignment_id.is_none();
        let want_assignments = query.include_assignments && query.assessment_id.is_none();

        if want_assessments {
            let mut select = AssessmentSubmissions::find()
                .find_also_related(Assessments)
                .filter(AssessmentSubmissionColumn::Status.is_in(statuses.clone()));

            if let Some(ref student_ids) = query.student_ids {
                select = select
                    .filter(AssessmentSubmissionColumn::StudentId.is_in(student_ids.clone()));
            }
            if let Some(ref course_ids) = query.course_ids {
                select =
                    select.filter(AssessmentSubmissionColumn::CourseId.is_in(course_ids.clone()));
            }
            if let Some(assessment_id) = query.assessment_id {
                select = select.filter(AssessmentSubmissionColumn::AssessmentId.eq(assessment_id));
            }
            if let Some(after) = query.submitted_after {
                select = select.filter(AssessmentSubmissionColumn::SubmittedAt.gte(after));
            }
            if query.active_items_only {
                select = select.filter(AssessmentColumn::IsArchived.eq(false));
            }

            let rows = select
                .order_by_desc(AssessmentSubmissionColumn::SubmittedAt)
                .all(&self.db)
                .await
                .map_err(|e| EHubError::database_operation(format!("查询测评成绩失败: {e}")))?;

            for (submission, assessment) in rows {
                let Some(assessment) = assessment else {
                    continue;
                };
                records.push(GradeRecord {
                    submission_id: submission.id,
                    kind: ItemKind::Assessment,
                    item_id: assessment.id,
                    title: assessment.title,
                    course_id: assessment.course_id,
                    student_id: submission.student_id,
                    score: submission.score,
                    max_score: assessment.total_points,
                    status: parse_status(&submission.status),
                    is_late: submission.is_late,
                    feedback: submission.feedback,
                    submitted_at: submission.submitted_at.map(from_timestamp),
                    graded_at: submission.graded_at.map(from_timestamp),
                });
            }
        }

        if want_assignments {
            let mut select = AssignmentSubmissions::find()
                .find_also_related(Assignments)
                .filter(AssignmentSubmissionColumn::Status.is_in(statuses));

            if let Some(ref student_ids) = query.student_ids {
                select = select
                    .filter(AssignmentSubmissionColumn::StudentId.is_in(student_ids.clone()));
            }
            if let Some(ref course_ids) = query.course_ids {
                select = select.filter(AssignmentColumn::CourseId.is_in(course_ids.clone()));
            }
            if let Some(assignment_id) = query.assignment_id {
                select = select.filter(AssignmentSubmissionColumn::AssignmentId.eq(assignment_id));
            }
            if let Some(after) = query.submitted_after {
                select = select.filter(AssignmentSubmissionColumn::SubmittedAt.gte(after));
            }
            if query.active_items_only {
                select = select
                    .filter(AssignmentColumn::Status.ne(AssignmentStatus::Draft.to_string()));
            }

            let rows = select
                .order_by_desc(AssignmentSubmissionColumn::SubmittedAt)
                .all(&self.db)
                .await
                .map_err(|e| EHubError::database_operation(format!("查询作业成绩失败: {e}")))?;

            for (submission, assignment) in rows {
                let Some(assignment) = assignment else {
                    continue;
                };
                records.push(GradeRecord {
                    submission_id: submission.id,
                    kind: ItemKind::Assignment,
                    item_id: assignment.id,
                    title: assignment.title,
                    course_id: assignment.course_id,
                    student_id: submission.student_id,
                    score: submission.grade.or(submission.auto_grade),
                    max_score: assignment.max_points,
                    status: parse_status(&submission.status),
                    is_late: submission.is_late,
                    feedback: submission.feedback,
                    submitted_at: submission.submitted_at.map(from_timestamp),
                    graded_at: submission.graded_at.map(from_timestamp),
                });
            }
        }

        // 合并后统一按提交时间倒序，未提交时间的排在最后
        records.sort_by(|a, b| {
            b.submitted_at
                .cmp(&a.submitted_at)
                .then_with(|| b.submission_id.cmp(&a.submission_id))
        });

        Ok(records)
    }
}

fn parse_status(status: &str) -> SubmissionStatus {
    status
        .parse::<SubmissionStatus>()
        .unwrap_or(SubmissionStatus::Submitted)
}
