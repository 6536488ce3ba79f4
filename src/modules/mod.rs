pub mod academic_years;
pub mod activity;
pub mod auth;
pub mod courses;
pub mod dashboard;
pub mod enrollments;
pub mod exams;
pub mod formations;
pub mod navigation;
pub mod profiles;
pub mod scholarships;
pub mod students;
pub mod teachers;
pub mod universities;
