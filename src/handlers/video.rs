// src/handlers/video.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::DEFAULT_MIN_WATCH_MINUTES,
    error::AppError,
    models::{
        user::Role,
        video::{
            CreateVideoRequest, VideoAnalyticsEntry, VideoContent, VideoStatistics,
            WatchProgress, WatchProgressRequest, WatchProgressWithTitle,
        },
    },
    utils::{
        jwt::CurrentUser,
        text::{format_description, format_title},
        video::extract_youtube_id,
    },
};

/// Creates video content for a course.
///
/// Teachers only, and only for their own courses. The YouTube id is extracted
/// from the submitted URL; title and description are normalized to Title Case.
pub async fn create_video(
    State(pool): State<PgPool>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<CreateVideoRequest>,
) -> Result<impl IntoResponse, AppError> {
    if current.role != Role::Teacher {
        return Err(AppError::Forbidden(
            "Only teachers can create video content".to_string(),
        ));
    }

    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let youtube_id = extract_youtube_id(&payload.youtube_url)
        .ok_or(AppError::BadRequest("Invalid YouTube URL".to_string()))?;

    let owner_id: Option<i64> = sqlx::query_scalar("SELECT teacher_id FROM courses WHERE id = $1")
        .bind(payload.course_id)
        .fetch_optional(&pool)
        .await?;

    if owner_id != Some(current.id) {
        return Err(AppError::Forbidden(
            "You can only create video content for your own courses".to_string(),
        ));
    }

    let title = format_title(&payload.title);
    let description = payload.description.as_deref().map(format_description);

    let video = sqlx::query_as::<_, VideoContent>(
        r#"
        INSERT INTO video_content
            (course_id, title, description, youtube_url, youtube_id, min_watch_time_minutes)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, course_id, title, description, youtube_url, youtube_id,
                  min_watch_time_minutes, created_at
        "#,
    )
    .bind(payload.course_id)
    .bind(&title)
    .bind(&description)
    .bind(&payload.youtube_url)
    .bind(&youtube_id)
    .bind(payload.min_watch_time_minutes.unwrap_or(DEFAULT_MIN_WATCH_MINUTES))
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create video content: {:?}", e);
        AppError::from(e)
    })?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Video content created successfully",
            "video": video
        })),
    ))
}

/// Lists a course's videos, newest first.
pub async fn list_videos_by_course(
    State(pool): State<PgPool>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let videos = sqlx::query_as::<_, VideoContent>(
        r#"
        SELECT id, course_id, title, description, youtube_url, youtube_id,
               min_watch_time_minutes, created_at
        FROM video_content
        WHERE course_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(course_id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch videos: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(serde_json::json!({ "videos": videos })))
}

/// Gets a single video; students also get their own watch progress.
pub async fn get_video(
    State(pool): State<PgPool>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let video = fetch_video(&pool, id).await?;

    let watch_progress = if current.role == Role::Student {
        sqlx::query_as::<_, WatchProgress>(
            r#"
            SELECT id, video_content_id, student_id, watch_time_seconds,
                   is_completed, last_watched_at, created_at
            FROM video_watch_progress
            WHERE video_content_id = $1 AND student_id = $2
            "#,
        )
        .bind(id)
        .bind(current.id)
        .fetch_optional(&pool)
        .await?
    } else {
        None
    };

    Ok(Json(serde_json::json!({
        "video": video,
        "watch_progress": watch_progress
    })))
}

/// Records a student's watch progress.
///
/// Watch time never decreases and completion latches: once the minimum watch
/// time has been reached the video stays completed.
pub async fn update_watch_progress(
    State(pool): State<PgPool>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<WatchProgressRequest>,
) -> Result<impl IntoResponse, AppError> {
    if current.role != Role::Student {
        return Err(AppError::Forbidden(
            "Only students can update watch progress".to_string(),
        ));
    }

    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let video = fetch_video(&pool, id).await?;

    let min_watch_seconds = video.min_watch_time_minutes * 60;
    let is_completed = payload.watch_time_seconds >= min_watch_seconds;

    let watch_progress = sqlx::query_as::<_, WatchProgress>(
        r#"
        INSERT INTO video_watch_progress
            (video_content_id, student_id, watch_time_seconds, is_completed, last_watched_at)
        VALUES ($1, $2, $3, $4, NOW())
        ON CONFLICT (video_content_id, student_id) DO UPDATE SET
            watch_time_seconds = GREATEST(video_watch_progress.watch_time_seconds, EXCLUDED.watch_time_seconds),
            is_completed = video_watch_progress.is_completed OR EXCLUDED.is_completed,
            last_watched_at = NOW()
        RETURNING id, video_content_id, student_id, watch_time_seconds,
                  is_completed, last_watched_at, created_at
        "#,
    )
    .bind(id)
    .bind(current.id)
    .bind(payload.watch_time_seconds)
    .bind(is_completed)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to upsert watch progress: {:?}", e);
        AppError::from(e)
    })?;

    let is_completed = watch_progress.is_completed;

    Ok(Json(serde_json::json!({
        "message": "Watch progress updated",
        "watch_progress": watch_progress,
        "is_completed": is_completed
    })))
}

/// Lists the current student's watch progress for a course's videos.
pub async fn get_student_progress(
    State(pool): State<PgPool>,
    Extension(current): Extension<CurrentUser>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if current.role != Role::Student {
        return Err(AppError::Forbidden(
            "Only students can view their progress".to_string(),
        ));
    }

    let progress = sqlx::query_as::<_, WatchProgressWithTitle>(
        r#"
        SELECT
            vwp.id, vwp.video_content_id, vwp.student_id, vwp.watch_time_seconds,
            vwp.is_completed, vwp.last_watched_at, vc.title AS video_title
        FROM video_watch_progress vwp
        JOIN video_content vc ON vwp.video_content_id = vc.id
        WHERE vc.course_id = $1 AND vwp.student_id = $2
        "#,
    )
    .bind(course_id)
    .bind(current.id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(serde_json::json!({ "progress": progress })))
}

/// Per-student watch statistics for one video.
///
/// Admins see any video; teachers only videos in their own courses.
pub async fn get_video_analytics(
    State(pool): State<PgPool>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !current.role.is_staff() {
        return Err(AppError::Forbidden(
            "Only teachers and admins can view video analytics".to_string(),
        ));
    }

    let video = fetch_video(&pool, id).await?;

    if current.role == Role::Teacher {
        let owner_id: Option<i64> =
            sqlx::query_scalar("SELECT teacher_id FROM courses WHERE id = $1")
                .bind(video.course_id)
                .fetch_optional(&pool)
                .await?;

        if owner_id != Some(current.id) {
            return Err(AppError::Forbidden(
                "You can only view analytics for your own courses".to_string(),
            ));
        }
    }

    let watch_progress = sqlx::query_as::<_, VideoAnalyticsEntry>(
        r#"
        SELECT
            vwp.id, vwp.student_id, u.name AS student_name, u.email AS student_email,
            vwp.watch_time_seconds, vwp.is_completed, vwp.last_watched_at, vwp.created_at
        FROM video_watch_progress vwp
        JOIN users u ON vwp.student_id = u.id
        WHERE vwp.video_content_id = $1
        ORDER BY vwp.watch_time_seconds DESC
        "#,
    )
    .bind(id)
    .fetch_all(&pool)
    .await?;

    let statistics = summarize_watch_progress(&watch_progress);

    Ok(Json(serde_json::json!({
        "video": video,
        "statistics": statistics,
        "watch_progress": watch_progress
    })))
}

fn summarize_watch_progress(entries: &[VideoAnalyticsEntry]) -> VideoStatistics {
    let total_students_watched = entries.len() as i64;
    let completed_students = entries.iter().filter(|e| e.is_completed).count() as i64;
    let total_watch_time_seconds: i64 = entries.iter().map(|e| e.watch_time_seconds as i64).sum();

    let average_watch_time_seconds = if total_students_watched > 0 {
        (total_watch_time_seconds as f64 / total_students_watched as f64).round() as i64
    } else {
        0
    };

    let completion_rate = if total_students_watched > 0 {
        let rate = completed_students as f64 / total_students_watched as f64 * 100.0;
        (rate * 100.0).round() / 100.0
    } else {
        0.0
    };

    VideoStatistics {
        total_students_watched,
        completed_students,
        total_watch_time_seconds,
        average_watch_time_seconds,
        completion_rate,
    }
}

async fn fetch_video(pool: &PgPool, id: i64) -> Result<VideoContent, AppError> {
    sqlx::query_as::<_, VideoContent>(
        r#"
        SELECT id, course_id, title, description, youtube_url, youtube_id,
               min_watch_time_minutes, created_at
        FROM video_content
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Video not found".to_string()))
}
