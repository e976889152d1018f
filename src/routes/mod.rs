pub mod assessments;

pub mod assignments;

pub mod auth;

pub mod courses;

pub mod grades;

pub mod users;

pub use assessments::configure_assessment_routes;
pub use assignments::configure_assignment_routes;
pub use auth::configure_auth_routes;
pub use courses::configure_course_routes;
pub use grades::configure_grade_routes;
pub use users::configure_user_routes;
