//! 测评实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "assessments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_id: i64,
    pub created_by: i64,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub assessment_type: String,
    /// 题目列表 JSON
    #[sea_orm(column_type = "Text")]
    pub questions: String,
    pub total_points: f64,
    pub passing_score: f64,
    pub attempts: i32,
    pub late_penalty: f64,
    pub available_from: Option<i64>,
    pub due_date: Option<i64>,
    pub is_archived: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseId",
        to = "super::courses::Column::Id"
    )]
    Course,
    #[sea_orm(has_many = "super::assessment_submissions::Entity")]
    Submissions,
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::assessment_submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submissions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_assessment(self) -> crate::models::assessments::entities::Assessment {
        use crate::models::assessments::entities::{Assessment, AssessmentType};

        let questions = serde_json::from_str(&self.questions).unwrap_or_else(|e| {
            tracing::warn!("Invalid questions JSON in assessment {}: {}", self.id, e);
            Vec::new()
        });

        Assessment {
            id: self.id,
            course_id: self.course_id,
            created_by: self.created_by,
            title: self.title,
            description: self.description,
            assessment_type: self
                .assessment_type
                .parse::<AssessmentType>()
                .unwrap_or(AssessmentType::Quiz),
            questions,
            total_points: self.total_points,
            passing_score: self.passing_score,
            attempts: self.attempts,
            late_penalty: self.late_penalty,
            available_from: self.available_from.map(super::from_timestamp),
            due_date: self.due_date.map(super::from_timestamp),
            is_archived: self.is_archived,
            created_at: super::from_timestamp(self.created_at),
            updated_at: super::from_timestamp(self.updated_at),
        }
    }
}
