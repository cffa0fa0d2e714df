// src/models/course.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Course row joined with instructor info and a live enrollment count.
/// The 'name' column is exposed as 'title' to API clients.
#[derive(Debug, Serialize, FromRow)]
pub struct CourseSummary {
    pub id: i64,
    pub title: String,
    pub code: Option<String>,
    pub description: Option<String>,
    pub semester: Option<String>,
    pub credits: Option<i32>,
    pub instructor_id: Option<i64>,
    pub instructor_name: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub enrollment_count: i64,
}

/// Single-course view, including the instructor's contact email.
#[derive(Debug, Serialize, FromRow)]
pub struct CourseDetail {
    pub id: i64,
    pub title: String,
    pub code: Option<String>,
    pub description: Option<String>,
    pub semester: Option<String>,
    pub credits: Option<i32>,
    pub instructor_id: Option<i64>,
    pub instructor_name: Option<String>,
    pub instructor_email: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for creating a course (admin only).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: Option<String>,
    #[validate(length(max = 50))]
    pub code: Option<String>,
    #[validate(length(max = 50))]
    pub semester: Option<String>,
    #[validate(range(min = 0, max = 30))]
    pub credits: Option<i32>,
    /// Admins may assign the course to a specific teacher.
    pub instructor_id: Option<i64>,
}

/// DTO for partially updating a course. Absent fields stay untouched.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCourseRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(length(max = 50))]
    pub code: Option<String>,
    #[validate(length(max = 50))]
    pub semester: Option<String>,
    #[validate(range(min = 0, max = 30))]
    pub credits: Option<i32>,
}

impl UpdateCourseRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.code.is_none()
            && self.semester.is_none()
            && self.credits.is_none()
    }
}
