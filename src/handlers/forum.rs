// src/handlers/forum.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::forum::{CreateReplyRequest, CreateTopicRequest, ForumReply, ForumTopic},
    utils::{html::sanitize_content, jwt::CurrentUser},
};

/// Lists a course's forum topics, newest first, with reply counts.
pub async fn list_topics(
    State(pool): State<PgPool>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let topics = sqlx::query_as::<_, ForumTopic>(
        r#"
        SELECT
            ft.id, ft.title, ft.content, ft.course_id, ft.author_id,
            u.name AS author_name, ft.created_at,
            (SELECT COUNT(*) FROM forum_replies fr WHERE fr.topic_id = ft.id) AS reply_count
        FROM forum_topics ft
        LEFT JOIN users u ON ft.author_id = u.id
        WHERE ft.course_id = $1
        ORDER BY ft.created_at DESC
        "#,
    )
    .bind(course_id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch forum topics: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(serde_json::json!({ "topics": topics })))
}

/// Gets a topic with its replies in chronological order.
pub async fn get_topic(
    State(pool): State<PgPool>,
    Path(topic_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let topic = sqlx::query_as::<_, ForumTopic>(
        r#"
        SELECT
            ft.id, ft.title, ft.content, ft.course_id, ft.author_id,
            u.name AS author_name, ft.created_at,
            (SELECT COUNT(*) FROM forum_replies fr WHERE fr.topic_id = ft.id) AS reply_count
        FROM forum_topics ft
        LEFT JOIN users u ON ft.author_id = u.id
        WHERE ft.id = $1
        "#,
    )
    .bind(topic_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Topic not found".to_string()))?;

    let replies = sqlx::query_as::<_, ForumReply>(
        r#"
        SELECT
            fr.id, fr.content, fr.topic_id, fr.author_id,
            u.name AS author_name, fr.created_at
        FROM forum_replies fr
        LEFT JOIN users u ON fr.author_id = u.id
        WHERE fr.topic_id = $1
        ORDER BY fr.created_at ASC
        "#,
    )
    .bind(topic_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(serde_json::json!({
        "topic": topic,
        "replies": replies
    })))
}

/// Creates a topic. Open to any authenticated user of the course's forum.
/// Content is sanitized before storage.
pub async fn create_topic(
    State(pool): State<PgPool>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<CreateTopicRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let course_exists: Option<i64> = sqlx::query_scalar("SELECT id FROM courses WHERE id = $1")
        .bind(payload.course_id)
        .fetch_optional(&pool)
        .await?;

    if course_exists.is_none() {
        return Err(AppError::NotFound("Course not found".to_string()));
    }

    let content = sanitize_content(&payload.content);

    let topic = sqlx::query_as::<_, ForumTopic>(
        r#"
        WITH inserted AS (
            INSERT INTO forum_topics (course_id, author_id, title, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, content, course_id, author_id, created_at
        )
        SELECT
            i.id, i.title, i.content, i.course_id, i.author_id,
            u.name AS author_name, i.created_at,
            0::BIGINT AS reply_count
        FROM inserted i
        LEFT JOIN users u ON i.author_id = u.id
        "#,
    )
    .bind(payload.course_id)
    .bind(current.id)
    .bind(&payload.title)
    .bind(&content)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create forum topic: {:?}", e);
        AppError::from(e)
    })?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Topic created successfully",
            "topic": topic
        })),
    ))
}

/// Posts a reply to a topic. Content is sanitized before storage.
pub async fn create_reply(
    State(pool): State<PgPool>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<CreateReplyRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let topic_exists: Option<i64> = sqlx::query_scalar("SELECT id FROM forum_topics WHERE id = $1")
        .bind(payload.topic_id)
        .fetch_optional(&pool)
        .await?;

    if topic_exists.is_none() {
        return Err(AppError::NotFound("Topic not found".to_string()));
    }

    let content = sanitize_content(&payload.content);

    let reply = sqlx::query_as::<_, ForumReply>(
        r#"
        WITH inserted AS (
            INSERT INTO forum_replies (topic_id, author_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, content, topic_id, author_id, created_at
        )
        SELECT
            i.id, i.content, i.topic_id, i.author_id,
            u.name AS author_name, i.created_at
        FROM inserted i
        LEFT JOIN users u ON i.author_id = u.id
        "#,
    )
    .bind(payload.topic_id)
    .bind(current.id)
    .bind(&content)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create forum reply: {:?}", e);
        AppError::from(e)
    })?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Reply posted successfully",
            "reply": reply
        })),
    ))
}
