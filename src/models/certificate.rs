// src/models/certificate.rs

use serde::Serialize;
use sqlx::FromRow;

/// Certificate row joined with the course title.
#[derive(Debug, Serialize, FromRow)]
pub struct Certificate {
    pub id: i64,
    pub course_id: i64,
    pub student_id: i64,
    pub certificate_number: String,
    pub issued_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub course_title: String,
}
