// src/models/enrollment.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Enrollment status stored in the database.
///
/// Historical rows may carry NULL in the status column; those are treated as
/// active. Modeled explicitly instead of null-coalescing at every call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Active,
    Inactive,
}

impl EnrollmentStatus {
    pub fn from_db(raw: Option<&str>) -> Self {
        match raw {
            Some("inactive") => EnrollmentStatus::Inactive,
            _ => EnrollmentStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, EnrollmentStatus::Active)
    }
}

/// Raw enrollment row joined with course and instructor columns.
#[derive(Debug, FromRow)]
pub struct EnrollmentCourseRow {
    pub id: i64,
    pub course_id: i64,
    pub student_id: i64,
    pub status: Option<String>,
    pub enrolled_at: Option<chrono::DateTime<chrono::Utc>>,
    pub progress_percentage: f64,
    pub completed: bool,
    pub title: String,
    pub code: Option<String>,
    pub description: Option<String>,
    pub semester: Option<String>,
    pub credits: Option<i32>,
    pub instructor_name: Option<String>,
    pub instructor_email: Option<String>,
}

/// API shape for an enrolled course, with the status normalized.
#[derive(Debug, Serialize)]
pub struct EnrollmentCourse {
    pub id: i64,
    pub course_id: i64,
    pub student_id: i64,
    pub status: EnrollmentStatus,
    pub enrolled_at: Option<chrono::DateTime<chrono::Utc>>,
    pub progress_percentage: f64,
    pub completed: bool,
    pub title: String,
    pub code: Option<String>,
    pub description: Option<String>,
    pub semester: Option<String>,
    pub credits: Option<i32>,
    pub instructor_name: Option<String>,
    pub instructor_email: Option<String>,
}

impl From<EnrollmentCourseRow> for EnrollmentCourse {
    fn from(row: EnrollmentCourseRow) -> Self {
        EnrollmentCourse {
            status: EnrollmentStatus::from_db(row.status.as_deref()),
            id: row.id,
            course_id: row.course_id,
            student_id: row.student_id,
            enrolled_at: row.enrolled_at,
            progress_percentage: row.progress_percentage,
            completed: row.completed,
            title: row.title,
            code: row.code,
            description: row.description,
            semester: row.semester,
            credits: row.credits,
            instructor_name: row.instructor_name,
            instructor_email: row.instructor_email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_status_defaults_to_active() {
        assert_eq!(EnrollmentStatus::from_db(None), EnrollmentStatus::Active);
        assert!(EnrollmentStatus::from_db(None).is_active());
    }

    #[test]
    fn inactive_is_recognized() {
        assert_eq!(
            EnrollmentStatus::from_db(Some("inactive")),
            EnrollmentStatus::Inactive
        );
    }

    #[test]
    fn unknown_status_defaults_to_active() {
        assert_eq!(
            EnrollmentStatus::from_db(Some("archived")),
            EnrollmentStatus::Active
        );
    }
}
