use sea_orm_migration::prelude::*;

use crate::m20250301_000001_create_tables::{
    AssessmentSubmissions, Assessments, AssignmentSubmissions, Assignments,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ==================== 排行榜聚合查询索引 ====================
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_assessment_submissions_student_status")
                    .table(AssessmentSubmissions::Table)
                    .col(AssessmentSubmissions::StudentId)
                    .col(AssessmentSubmissions::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_assessment_submissions_assessment")
                    .table(AssessmentSubmissions::Table)
                    .col(AssessmentSubmissions::AssessmentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_assessment_submissions_submitted_at")
                    .table(AssessmentSubmissions::Table)
                    .col(AssessmentSubmissions::SubmittedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_assignment_submissions_student_status")
                    .table(AssignmentSubmissions::Table)
                    .col(AssignmentSubmissions::StudentId)
                    .col(AssignmentSubmissions::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_assignment_submissions_assignment")
                    .table(AssignmentSubmissions::Table)
                    .col(AssignmentSubmissions::AssignmentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_assignment_submissions_submitted_at")
                    .table(AssignmentSubmissions::Table)
                    .col(AssignmentSubmissions::SubmittedAt)
                    .to_owned(),
            )
            .await?;

        // ==================== 课程内容索引 ====================
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_assessments_course_type")
                    .table(Assessments::Table)
                    .col(Assessments::CourseId)
                    .col(Assessments::AssessmentType)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_assignments_course")
                    .table(Assignments::Table)
                    .col(Assignments::CourseId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_assessment_submissions_student_status",
            "idx_assessment_submissions_assessment",
            "idx_assessment_submissions_submitted_at",
        ] {
            manager
                .drop_index(
                    Index::drop()
                        .name(name)
                        .table(AssessmentSubmissions::Table)
                        .to_owned(),
                )
                .await?;
        }

        for name in [
            "idx_assignment_submissions_student_status",
            "idx_assignment_submissions_assignment",
            "idx_assignment_submissions_submitted_at",
        ] {
            manager
                .drop_index(
                    Index::drop()
                        .name(name)
                        .table(AssignmentSubmissions::Table)
                        .to_owned(),
                )
                .await?;
        }

        manager
            .drop_index(
                Index::drop()
                    .name("idx_assessments_course_type")
                    .table(Assessments::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_assignments_course")
                    .table(Assignments::Table)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
