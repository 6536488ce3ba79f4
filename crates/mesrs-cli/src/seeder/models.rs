//! Seed rows and the configuration that sizes a seeding run.

use chrono::NaiveDate;
use mesrs_models::Role;
use mesrs_models::formations::StudyLevel;
use uuid::Uuid;

/// Seed data for creating a university.
pub struct UniversitySeed {
    pub code: String,
    pub name: String,
    pub address: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub rector_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

pub struct AcademicYearSeed {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_current: bool,
}

pub struct FormationSeed {
    pub code: String,
    pub name: String,
    pub university_id: Uuid,
    pub level: StudyLevel,
    pub duration_years: i32,
    pub credits: i32,
    pub capacity: i32,
}

/// Seed data for a sign-in profile. Teachers and students get a second row
/// pointing back at it.
pub struct ProfileSeed {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub phone: String,
    pub preferred_language: &'static str,
}

#[derive(Debug, Clone)]
pub struct SeededUniversity {
    pub id: Uuid,
    pub code: String,
}

#[derive(Debug, Clone)]
pub struct SeededFormation {
    pub id: Uuid,
    pub code: String,
    pub university_id: Uuid,
    pub level: StudyLevel,
}

#[derive(Debug, Clone)]
pub struct SeededTeacher {
    pub id: Uuid,
    pub university_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct SeededCourse {
    pub id: Uuid,
    pub formation_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct SeededStudent {
    pub id: Uuid,
    pub formation_id: Uuid,
    pub enrollment_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct SeededExam {
    pub id: Uuid,
    pub formation_id: Uuid,
    pub max_score: f64,
}

#[derive(Debug, Clone)]
pub struct SeededScholarship {
    pub id: Uuid,
    pub max_recipients: i32,
}

/// Complete configuration for database seeding.
#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub num_universities: usize,
    pub formations_per_university: usize,
    pub courses_per_formation: usize,
    pub teachers_per_university: usize,
    pub students_per_formation: usize,
    pub staff: usize,
    pub scholarships: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            num_universities: 5,
            formations_per_university: 4,
            courses_per_formation: 4,
            teachers_per_university: 6,
            students_per_formation: 20,
            staff: 3,
            scholarships: 4,
        }
    }
}

impl SeedConfig {
    pub fn new(num_universities: usize) -> Self {
        Self {
            num_universities,
            ..Default::default()
        }
    }

    pub fn with_formations(mut self, per_university: usize, courses_per_formation: usize) -> Self {
        self.formations_per_university = per_university;
        self.courses_per_formation = courses_per_formation;
        self
    }

    pub fn with_teachers(mut self, per_university: usize) -> Self {
        self.teachers_per_university = per_university;
        self
    }

    pub fn with_students(mut self, per_formation: usize) -> Self {
        self.students_per_formation = per_formation;
        self
    }

    pub fn with_staff(mut self, staff: usize) -> Self {
        self.staff = staff;
        self
    }

    pub fn with_scholarships(mut self, scholarships: usize) -> Self {
        self.scholarships = scholarships;
        self
    }

    pub fn total_formations(&self) -> usize {
        self.num_universities * self.formations_per_university
    }

    pub fn total_students(&self) -> usize {
        self.total_formations() * self.students_per_formation
    }

    /// Every profile the run creates: staff, teachers and students.
    pub fn total_profiles(&self) -> usize {
        self.staff + self.num_universities * self.teachers_per_university + self.total_students()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_follow_the_configuration() {
        let config = SeedConfig::new(2)
            .with_formations(3, 2)
            .with_teachers(4)
            .with_students(10)
            .with_staff(1);

        assert_eq!(config.total_formations(), 6);
        assert_eq!(config.total_students(), 60);
        assert_eq!(config.total_profiles(), 1 + 8 + 60);
    }
}
