use mesrs_auth::Role;
use mesrs_core::{Language, PaginationMeta};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::academic_years::model::{
    AcademicYear, CreateAcademicYearDto, UpdateAcademicYearDto,
};
use crate::modules::activity::model::{ActivityAction, ActivityLog, LogActivityDto, ResourceType};
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::auth::model::{
    AccessTokenResponse, AuthResponse, ChangePasswordRequest, ForgotPasswordRequest,
    MessageResponse, ProfileResponse, RefreshTokenRequest, ResetPasswordRequest, RoleCheckResponse,
    SignInRequest, SignUpRequest,
};
use crate::modules::courses::model::{Course, CreateCourseDto, UpdateCourseDto};
use crate::modules::dashboard::model::{
    ChartPoint, DashboardStats, EnrollmentTrendPoint, FormationPerformance, MonthlyGrowth,
    RecentActivity, StatCard, SuccessRate, UniversityStat,
};
use crate::modules::enrollments::model::{
    CreateEnrollmentDto, Enrollment, EnrollmentDecisionDto, EnrollmentStatus, UpdateEnrollmentDto,
};
use crate::modules::exams::model::{
    CreateExamDto, CreateExamResultDto, Exam, ExamResult, ExamSession, UpdateExamDto,
    UpdateExamResultDto,
};
use crate::modules::formations::model::{
    CreateFormationDto, Formation, StudyLevel, UpdateFormationDto,
};
use crate::modules::navigation::model::{MenuItem, MenuResponse, RouteDecision};
use crate::modules::profiles::model::{
    AdminUpdateProfileDto, CreateProfileDto, Profile, UpdateProfileDto,
};
use crate::modules::scholarships::model::{
    ApplicationDecisionDto, ApplicationStatus, CreateApplicationDto, CreateScholarshipDto,
    Scholarship, ScholarshipApplication, ScholarshipType, UpdateScholarshipDto,
};
use crate::modules::students::model::{CreateStudentDto, Student, UpdateStudentDto};
use crate::modules::teachers::model::{CreateTeacherDto, Teacher, UpdateTeacherDto};
use crate::modules::universities::model::{
    CreateUniversityDto, University, UniversityWithStats, UpdateUniversityDto,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::sign_up,
        crate::modules::auth::controller::sign_in,
        crate::modules::auth::controller::refresh,
        crate::modules::auth::controller::sign_out,
        crate::modules::auth::controller::get_session,
        crate::modules::auth::controller::get_role,
        crate::modules::auth::controller::forgot_password,
        crate::modules::auth::controller::reset_password,
        crate::modules::auth::controller::get_profile,
        crate::modules::auth::controller::update_profile,
        crate::modules::auth::controller::change_password,
        crate::modules::profiles::controller::create_profile,
        crate::modules::profiles::controller::list_profiles,
        crate::modules::profiles::controller::get_profile,
        crate::modules::profiles::controller::update_profile,
        crate::modules::profiles::controller::delete_profile,
        crate::modules::universities::controller::create_university,
        crate::modules::universities::controller::list_universities,
        crate::modules::universities::controller::get_university,
        crate::modules::universities::controller::update_university,
        crate::modules::universities::controller::delete_university,
        crate::modules::academic_years::controller::create_academic_year,
        crate::modules::academic_years::controller::list_academic_years,
        crate::modules::academic_years::controller::get_academic_year,
        crate::modules::academic_years::controller::get_current_academic_year,
        crate::modules::academic_years::controller::update_academic_year,
        crate::modules::academic_years::controller::delete_academic_year,
        crate::modules::academic_years::controller::set_current_academic_year,
        crate::modules::formations::controller::create_formation,
        crate::modules::formations::controller::list_formations,
        crate::modules::formations::controller::get_formation,
        crate::modules::formations::controller::update_formation,
        crate::modules::formations::controller::delete_formation,
        crate::modules::courses::controller::create_course,
        crate::modules::courses::controller::list_courses,
        crate::modules::courses::controller::get_course,
        crate::modules::courses::controller::update_course,
        crate::modules::courses::controller::delete_course,
        crate::modules::students::controller::create_student,
        crate::modules::students::controller::list_students,
        crate::modules::students::controller::get_student,
        crate::modules::students::controller::get_my_student,
        crate::modules::students::controller::update_student,
        crate::modules::students::controller::delete_student,
        crate::modules::teachers::controller::create_teacher,
        crate::modules::teachers::controller::list_teachers,
        crate::modules::teachers::controller::get_teacher,
        crate::modules::teachers::controller::update_teacher,
        crate::modules::teachers::controller::delete_teacher,
        crate::modules::enrollments::controller::create_enrollment,
        crate::modules::enrollments::controller::list_enrollments,
        crate::modules::enrollments::controller::get_enrollment,
        crate::modules::enrollments::controller::update_enrollment,
        crate::modules::enrollments::controller::delete_enrollment,
        crate::modules::enrollments::controller::validate_enrollment,
        crate::modules::enrollments::controller::reject_enrollment,
        crate::modules::enrollments::controller::activate_enrollment,
        crate::modules::enrollments::controller::complete_enrollment,
        crate::modules::exams::controller::create_exam,
        crate::modules::exams::controller::list_exams,
        crate::modules::exams::controller::get_exam,
        crate::modules::exams::controller::update_exam,
        crate::modules::exams::controller::delete_exam,
        crate::modules::exams::controller::list_exam_results,
        crate::modules::exams::controller::create_exam_result,
        crate::modules::exams::controller::update_exam_result,
        crate::modules::exams::controller::delete_exam_result,
        crate::modules::scholarships::controller::create_scholarship,
        crate::modules::scholarships::controller::list_scholarships,
        crate::modules::scholarships::controller::get_scholarship,
        crate::modules::scholarships::controller::update_scholarship,
        crate::modules::scholarships::controller::delete_scholarship,
        crate::modules::scholarships::controller::create_application,
        crate::modules::scholarships::controller::list_applications,
        crate::modules::scholarships::controller::get_application,
        crate::modules::scholarships::controller::decide_application,
        crate::modules::activity::controller::log_activity,
        crate::modules::activity::controller::list_activities,
        crate::modules::dashboard::controller::get_dashboard_stats,
        crate::modules::dashboard::controller::get_stat_cards,
        crate::modules::dashboard::controller::get_enrollment_trends,
        crate::modules::dashboard::controller::get_enrollment_stats_by_formation,
        crate::modules::dashboard::controller::get_university_stats,
        crate::modules::dashboard::controller::get_recent_activities,
        crate::modules::dashboard::controller::get_formation_performance,
        crate::modules::dashboard::controller::get_monthly_growth,
        crate::modules::dashboard::controller::get_success_rate,
        crate::modules::navigation::controller::resolve_route,
        crate::modules::navigation::controller::get_menu,
    ),
    components(schemas(
        ErrorResponse,
        PaginationMeta,
        Role,
        Language,
        AcademicYear,
        CreateAcademicYearDto,
        UpdateAcademicYearDto,
        ActivityAction,
        ResourceType,
        ActivityLog,
        LogActivityDto,
        SignUpRequest,
        SignInRequest,
        AuthResponse,
        ProfileResponse,
        AccessTokenResponse,
        RefreshTokenRequest,
        ForgotPasswordRequest,
        ResetPasswordRequest,
        ChangePasswordRequest,
        MessageResponse,
        RoleCheckResponse,
        Course,
        CreateCourseDto,
        UpdateCourseDto,
        DashboardStats,
        StatCard,
        ChartPoint,
        EnrollmentTrendPoint,
        UniversityStat,
        RecentActivity,
        FormationPerformance,
        MonthlyGrowth,
        SuccessRate,
        EnrollmentStatus,
        Enrollment,
        CreateEnrollmentDto,
        UpdateEnrollmentDto,
        EnrollmentDecisionDto,
        ExamSession,
        Exam,
        CreateExamDto,
        UpdateExamDto,
        ExamResult,
        CreateExamResultDto,
        UpdateExamResultDto,
        StudyLevel,
        Formation,
        CreateFormationDto,
        UpdateFormationDto,
        RouteDecision,
        MenuItem,
        MenuResponse,
        Profile,
        CreateProfileDto,
        UpdateProfileDto,
        AdminUpdateProfileDto,
        ScholarshipType,
        ApplicationStatus,
        Scholarship,
        CreateScholarshipDto,
        UpdateScholarshipDto,
        ScholarshipApplication,
        CreateApplicationDto,
        ApplicationDecisionDto,
        Student,
        CreateStudentDto,
        UpdateStudentDto,
        Teacher,
        CreateTeacherDto,
        UpdateTeacherDto,
        University,
        UniversityWithStats,
        CreateUniversityDto,
        UpdateUniversityDto
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Sign-in, tokens, password reset and own profile"),
        (name = "Profiles", description = "Account management (admin)"),
        (name = "Universities", description = "Universities and their headcounts"),
        (name = "Academic Years", description = "Academic years and the current year"),
        (name = "Formations", description = "Degree programs"),
        (name = "Courses", description = "Courses of a formation"),
        (name = "Students", description = "Student records"),
        (name = "Teachers", description = "Teaching staff"),
        (name = "Enrollments", description = "Enrollments and their validation workflow"),
        (name = "Exams", description = "Exams and results"),
        (name = "Scholarships", description = "Scholarship programs and applications"),
        (name = "Activities", description = "Audit log"),
        (name = "Dashboard", description = "Statistics and chart series"),
        (name = "Navigation", description = "Client route guard and sidebar")
    ),
    info(
        title = "MESRS Dashboard API",
        version = "0.1.0",
        description = "Bilingual (Arabic/French) administrative dashboard of the Ministry of Higher Education and Scientific Research.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_module_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/signin",
            "/api/students/{id}",
            "/api/enrollments/{id}/validate",
            "/api/exam-results/{id}",
            "/api/scholarship-applications/{id}/decision",
            "/api/dashboard/enrollment-trends",
            "/api/navigation/resolve",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} missing");
        }
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
