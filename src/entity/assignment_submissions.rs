//! 作业提交实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "assignment_submissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub assignment_id: i64,
    pub student_id: i64,
    #[sea_orm(column_type = "Text", nullable)]
    pub content: Option<String>,
    pub raw_grade: Option<f64>,
    pub grade: Option<f64>,
    pub auto_grade: Option<f64>,
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
        belongs_to = "super::assignments::Entity",
        from = "Column::AssignmentId",
        to = "super::assignments::Column::Id"
    )]
    Assignment,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::StudentId",
        to = "super::users::Column::Id"
    )]
    Student,
}

impl Related<super::assignments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignment.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_submission(self) -> crate::models::assignments::entities::AssignmentSubmission {
        use crate::models::assignments::entities::AssignmentSubmission;
        use crate::models::submissions::entities::SubmissionStatus;

        AssignmentSubmission {
            id: self.id,
            assignment_id: self.assignment_id,
            student_id: self.student_id,
            content: self.content,
            raw_grade: self.raw_grade,
            grade: self.grade,
            auto_grade: self.auto_grade,
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
