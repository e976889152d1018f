use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建用户表
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .col(ColumnDef::new(Users::Status).string().not_null())
                    .col(ColumnDef::new(Users::FirstName).string().not_null())
                    .col(ColumnDef::new(Users::LastName).string().not_null())
                    .col(ColumnDef::new(Users::AvatarUrl).string().null())
                    .col(ColumnDef::new(Users::LastLogin).big_integer().null())
                    .col(ColumnDef::new(Users::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建课程表
        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Courses::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Courses::InstructorId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Courses::Title).string().not_null())
                    .col(ColumnDef::new(Courses::Description).text().null())
                    .col(ColumnDef::new(Courses::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Courses::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Courses::Table, Courses::InstructorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建选课表
        manager
            .create_table(
                Table::create()
                    .table(Enrollments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Enrollments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Enrollments::CourseId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Enrollments::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Enrollments::EnrolledAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Enrollments::Table, Enrollments::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Enrollments::Table, Enrollments::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建测评表
        manager
            .create_table(
                Table::create()
                    .table(Assessments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Assessments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Assessments::CourseId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Assessments::CreatedBy)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Assessments::Title).string().not_null())
                    .col(ColumnDef::new(Assessments::Description).text().null())
                    .col(
                        ColumnDef::new(Assessments::AssessmentType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Assessments::Questions).text().not_null())
                    .col(
                        ColumnDef::new(Assessments::TotalPoints)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Assessments::PassingScore)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Assessments::Attempts)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Assessments::LatePenalty)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Assessments::AvailableFrom)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(Assessments::DueDate).big_integer().null())
                    .col(
                        ColumnDef::new(Assessments::IsArchived)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Assessments::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Assessments::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Assessments::Table, Assessments::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Assessments::Table, Assessments::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建测评提交表
        manager
            .create_table(
                Table::create()
                    .table(AssessmentSubmissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AssessmentSubmissions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AssessmentSubmissions::AssessmentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AssessmentSubmissions::CourseId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AssessmentSubmissions::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AssessmentSubmissions::AttemptNumber)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AssessmentSubmissions::Answers)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AssessmentSubmissions::RawScore)
                            .double()
                            .null(),
                    )
                    .col(ColumnDef::new(AssessmentSubmissions::Score).double().null())
                    .col(
                        ColumnDef::new(AssessmentSubmissions::Status)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AssessmentSubmissions::IsLate)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(AssessmentSubmissions::Feedback).text().null())
                    .col(
                        ColumnDef::new(AssessmentSubmissions::TimeSpent)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AssessmentSubmissions::GradedBy)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AssessmentSubmissions::SubmittedAt)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AssessmentSubmissions::GradedAt)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AssessmentSubmissions::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AssessmentSubmissions::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                AssessmentSubmissions::Table,
                                AssessmentSubmissions::AssessmentId,
                            )
                            .to(Assessments::Table, Assessments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                AssessmentSubmissions::Table,
                                AssessmentSubmissions::StudentId,
                            )
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建作业表
        manager
            .create_table(
                Table::create()
                    .table(Assignments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Assignments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Assignments::CourseId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Assignments::CreatedBy)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Assignments::Title).string().not_null())
                    .col(ColumnDef::new(Assignments::Description).text().null())
                    .col(ColumnDef::new(Assignments::MaxPoints).double().not_null())
                    .col(ColumnDef::new(Assignments::DueDate).big_integer().null())
                    .col(
                        ColumnDef::new(Assignments::LatePenalty)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(Assignments::Status).string().not_null())
                    .col(
                        ColumnDef::new(Assignments::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Assignments::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Assignments::Table, Assignments::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Assignments::Table, Assignments::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建作业提交表
        manager
            .create_table(
                Table::create()
                    .table(AssignmentSubmissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AssignmentSubmissions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AssignmentSubmissions::AssignmentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AssignmentSubmissions::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AssignmentSubmissions::Content).text().null())
                    .col(
                        ColumnDef::new(AssignmentSubmissions::RawGrade)
                            .double()
                            .null(),
                    )
                    .col(ColumnDef::new(AssignmentSubmissions::Grade).double().null())
                    .col(
                        ColumnDef::new(AssignmentSubmissions::AutoGrade)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AssignmentSubmissions::Status)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AssignmentSubmissions::IsLate)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(AssignmentSubmissions::Feedback).text().null())
                    .col(
                        ColumnDef::new(AssignmentSubmissions::TimeSpent)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AssignmentSubmissions::GradedBy)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AssignmentSubmissions::SubmittedAt)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AssignmentSubmissions::GradedAt)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AssignmentSubmissions::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AssignmentSubmissions::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                AssignmentSubmissions::Table,
                                AssignmentSubmissions::AssignmentId,
                            )
                            .to(Assignments::Table, Assignments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                AssignmentSubmissions::Table,
                                AssignmentSubmissions::StudentId,
                            )
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 用户表索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_role")
                    .table(Users::Table)
                    .col(Users::Role)
                    .to_owned(),
            )
            .await?;

        // 课程表索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_courses_instructor_id")
                    .table(Courses::Table)
                    .col(Courses::InstructorId)
                    .to_owned(),
            )
            .await?;

        // 选课唯一约束
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_enrollments_course_student")
                    .table(Enrollments::Table)
                    .col(Enrollments::CourseId)
                    .col(Enrollments::StudentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 按照创建的相反顺序删除
        manager
            .drop_table(Table::drop().table(AssignmentSubmissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Assignments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AssessmentSubmissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Assessments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Enrollments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Users {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    Role,
    Status,
    FirstName,
    LastName,
    AvatarUrl,
    LastLogin,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Courses {
    #[sea_orm(iden = "courses")]
    Table,
    Id,
    InstructorId,
    Title,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Enrollments {
    #[sea_orm(iden = "enrollments")]
    Table,
    Id,
    CourseId,
    StudentId,
    EnrolledAt,
}

#[derive(DeriveIden)]
pub(crate) enum Assessments {
    #[sea_orm(iden = "assessments")]
    Table,
    Id,
    CourseId,
    CreatedBy,
    Title,
    Description,
    AssessmentType,
    Questions,
    TotalPoints,
    PassingScore,
    Attempts,
    LatePenalty,
    AvailableFrom,
    DueDate,
    IsArchived,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum AssessmentSubmissions {
    #[sea_orm(iden = "assessment_submissions")]
    Table,
    Id,
    AssessmentId,
    CourseId,
    StudentId,
    AttemptNumber,
    Answers,
    RawScore,
    Score,
    Status,
    IsLate,
    Feedback,
    TimeSpent,
    GradedBy,
    SubmittedAt,
    GradedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Assignments {
    #[sea_orm(iden = "assignments")]
    Table,
    Id,
    CourseId,
    CreatedBy,
    Title,
    Description,
    MaxPoints,
    DueDate,
    LatePenalty,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum AssignmentSubmissions {
    #[sea_orm(iden = "assignment_submissions")]
    Table,
    Id,
    AssignmentId,
    StudentId,
    Content,
    RawGrade,
    Grade,
    AutoGrade,
    Status,
    IsLate,
    Feedback,
    TimeSpent,
    GradedBy,
    SubmittedAt,
    GradedAt,
    CreatedAt,
    UpdatedAt,
}
