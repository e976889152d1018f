//! 测评提交实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "assessment_submissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub assessment_id: i64,
    pub course_id: i64,
    pub student_id: i64,
    pub attempt_number: i32,
    /// 答案列表 JSON
    #[sea_orm(column_type = "Text")]
    pub answers: String,
    pub raw_score: Option<f64>,
    pub score: Option<f64>,
    pub status: String,
    pub is_late: bool,
    #[sea_orm(column_type = "Text", nullable)]
    pub feedback: Option<String>,
    pub time_spent: i64,
    pub graded_by: Option<i64>,
    pub submitted_at: Option<i64>,
    pub graded_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assessments::Entity",
        from = "Column::AssessmentId",
        to = "super::assessments::Column::Id"
    )]
    Assessment,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::StudentId",
        to = "super::users::Column::Id"
    )]
    Student,
}

impl Related<super::assessments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assessment.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_submission(self) -> crate::models::assessments::entities::AssessmentSubmission {
        use crate::models::assessments::entities::AssessmentSubmission;
        use crate::models::submissions::entities::SubmissionStatus;

        let answers = serde_json::from_str(&self.answers).unwrap_or_else(|e| {
            tracing::warn!("Invalid answers JSON in submission {}: {}", self.id, e);
            Vec::new()
        });

        AssessmentSubmission {
            id: self.id,
            assessment_id: self.assessment_id,
            course_id: self.course_id,
            student_id: self.student_id,
            attempt_number: self.attempt_number,
            answers,
            raw_score: self.raw_score,
            score: self.score,
            status: self
                .status
                .parse::<SubmissionStatus>()
                .unwrap_or(SubmissionStatus::Submitted),
            is_late: self.is_late,
            feedback: self.feedback,
            time_spent: self.time_spent,
            graded_by: self.graded_by,
            submitted_at: self.submitted_at.map(super::from_timestamp),
            graded_at: self.graded_at.map(super::from_timestamp),
            created_at: super::from_timestamp(self.created_at),
            updated_at: super::from_timestamp(self.updated_at),
        }
    }
}
