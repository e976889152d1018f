//! 预导入模块，方便使用

pub use super::assessment_submissions::{
    ActiveModel as AssessmentSubmissionActiveModel, Entity as AssessmentSubmissions,
    Model as AssessmentSubmissionModel,
};
pub use super::assessments::{
    ActiveModel as AssessmentActiveModel, Entity as Assessments, Model as AssessmentModel,
};
pub use super::assignment_submissions::{
    ActiveModel as AssignmentSubmissionActiveModel, Entity as AssignmentSubmissions,
    Model as AssignmentSubmissionModel,
};
pub use super::assignments::{
    ActiveModel as AssignmentActiveModel, Entity as Assignments, Model as AssignmentModel,
};
pub use super::courses::{ActiveModel as CourseActiveModel, Entity as Courses, Model as CourseModel};
pub use super::enrollments::{
    ActiveModel as EnrollmentActiveModel, Entity as Enrollments, Model as EnrollmentModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
