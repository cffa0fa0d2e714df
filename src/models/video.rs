// src/models/video.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'video_content' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VideoContent {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub youtube_url: String,
    pub youtube_id: String,
    /// Watch time (minutes) required before the video counts as completed.
    pub min_watch_time_minutes: i32,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Represents the 'video_watch_progress' table in the database.
/// One row per (video, student); watch time only moves forward.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WatchProgress {
    pub id: i64,
    pub video_content_id: i64,
    pub student_id: i64,
    pub watch_time_seconds: i32,
    pub is_completed: bool,
    pub last_watched_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Watch progress joined with the video title, for per-course progress lists.
#[derive(Debug, Serialize, FromRow)]
pub struct WatchProgressWithTitle {
    pub id: i64,
    pub video_content_id: i64,
    pub student_id: i64,
    pub watch_time_seconds: i32,
    pub is_completed: bool,
    pub last_watched_at: Option<chrono::DateTime<chrono::Utc>>,
    pub video_title: String,
}

/// Per-student row in the teacher-facing analytics view.
#[derive(Debug, Serialize, FromRow)]
pub struct VideoAnalyticsEntry {
    pub id: i64,
    pub student_id: i64,
    pub student_name: String,
    pub student_email: String,
    pub watch_time_seconds: i32,
    pub is_completed: bool,
    pub last_watched_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Aggregates over a video's watch progress rows.
#[derive(Debug, Serialize)]
pub struct VideoStatistics {
    pub total_students_watched: i64,
    pub completed_students: i64,
    pub total_watch_time_seconds: i64,
    pub average_watch_time_seconds: i64,
    /// Share of watchers who completed, rounded to 2 decimal places.
    pub completion_rate: f64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateVideoRequest {
    pub course_id: i64,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub youtube_url: String,
    #[validate(range(min = 1, max = 60))]
    pub min_watch_time_minutes: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct WatchProgressRequest {
    #[validate(range(min = 0))]
    pub watch_time_seconds: i32,
}
