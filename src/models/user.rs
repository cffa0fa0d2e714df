// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Role designation used for authorization decisions.
///
/// Stored as lowercase text in the users table. Anything unrecognized parses
/// as `Student`, matching the most restrictive set of permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "teacher" => Role::Teacher,
            "admin" => Role::Admin,
            _ => Role::Student,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
        }
    }

    /// Teachers and admins may see correct answers and analytics.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Teacher | Role::Admin)
    }
}

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Unique email address, used as the login identifier.
    pub email: String,

    pub name: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    /// Role: 'student', 'teacher' or 'admin'.
    pub role: String,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for creating a new user (Registration).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "A valid email address is required."))]
    #[validate(length(max = 255))]
    pub email: String,
    #[validate(length(
        min = 6,
        max = 128,
        message = "Password length must be between 6 and 128 characters."
    ))]
    pub password: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Self-registration only covers students and teachers; admins are seeded.
    #[validate(custom(function = validate_registration_role))]
    pub role: String,
}

fn validate_registration_role(role: &str) -> Result<(), validator::ValidationError> {
    match role {
        "student" | "teacher" => Ok(()),
        _ => Err(validator::ValidationError::new("role_must_be_student_or_teacher")),
    }
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}
