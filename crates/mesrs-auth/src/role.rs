//! User roles.
//!
//! Hierarchy, highest first: admin, staff, teacher, student.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type,
)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
    Teacher,
    Student,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Staff, Role::Teacher, Role::Student];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }

    /// Higher is more privileged.
    pub fn level(self) -> u8 {
        match self {
            Role::Admin => 4,
            Role::Staff => 3,
            Role::Teacher => 2,
            Role::Student => 1,
        }
    }

    pub fn at_least(self, other: Role) -> bool {
        self.level() >= other.level()
    }

    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }

    pub fn is_teacher(self) -> bool {
        self == Role::Teacher
    }

    pub fn is_student(self) -> bool {
        self == Role::Student
    }

    pub fn is_any_of(self, roles: &[Role]) -> bool {
        roles.contains(&self)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "staff" => Ok(Role::Staff),
            "teacher" => Ok(Role::Teacher),
            "student" => Ok(Role::Student),
            other => Err(format!("Unknown role: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hierarchy() {
        assert!(Role::Admin.at_least(Role::Staff));
        assert!(Role::Staff.at_least(Role::Teacher));
        assert!(Role::Teacher.at_least(Role::Student));
        assert!(!Role::Student.at_least(Role::Teacher));
        assert!(Role::Teacher.at_least(Role::Teacher));
    }

    #[test]
    fn test_parse() {
        assert_eq!("ADMIN".parse::<Role>(), Ok(Role::Admin));
        assert_eq!(" staff ".parse::<Role>(), Ok(Role::Staff));
        assert!("rector".parse::<Role>().is_err());
    }

    #[test]
    fn test_predicates() {
        assert!(Role::Admin.is_admin());
        assert!(Role::Teacher.is_teacher());
        assert!(Role::Student.is_student());
        assert!(Role::Staff.is_any_of(&[Role::Admin, Role::Staff]));
        assert!(!Role::Student.is_any_of(&[Role::Admin, Role::Staff]));
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Staff).unwrap(), r#""staff""#);
        let role: Role = serde_json::from_str(r#""teacher""#).unwrap();
        assert_eq!(role, Role::Teacher);
    }
}
