// src/handlers/dashboard.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde::Serialize;
use sqlx::PgPool;

use crate::{error::AppError, models::user::Role, utils::jwt::CurrentUser};

/// Counters shown on the landing dashboard. Fields irrelevant to the caller's
/// role are zero so the frontend can bind one shape for everyone.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardStats {
    enrollments: i64,
    certificates: i64,
    quiz_attempts: i64,
    my_courses: i64,
    total_students: i64,
    quizzes: i64,
}

/// Role-dependent dashboard statistics.
pub async fn stats(
    State(pool): State<PgPool>,
    Extension(current): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let stats = match current.role {
        Role::Student => student_stats(&pool, current.id).await?,
        Role::Teacher => teacher_stats(&pool, current.id).await?,
        Role::Admin => admin_stats(&pool).await?,
    };

    tracing::info!(
        user_id = current.id,
        role = current.role.as_str(),
        "Dashboard stats computed"
    );

    Ok(Json(stats))
}

async fn student_stats(pool: &PgPool, user_id: i64) -> Result<DashboardStats, AppError> {
    let enrollments: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM enrollments
        WHERE student_id = $1 AND (status = 'active' OR status IS NULL)
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    let certificates: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM certificates WHERE student_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

    let quiz_attempts: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM quiz_attempts WHERE student_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

    Ok(DashboardStats {
        enrollments,
        certificates,
        quiz_attempts,
        ..Default::default()
    })
}

async fn teacher_stats(pool: &PgPool, user_id: i64) -> Result<DashboardStats, AppError> {
    let my_courses: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM courses WHERE teacher_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

    let total_students: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(DISTINCT e.student_id)
        FROM enrollments e
        JOIN courses c ON e.course_id = c.id
        WHERE c.teacher_id = $1 AND (e.status = 'active' OR e.status IS NULL)
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    let quizzes: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM quizzes q
        JOIN courses c ON q.course_id = c.id
        WHERE c.teacher_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(DashboardStats {
        my_courses,
        total_students,
        quizzes,
        ..Default::default()
    })
}

async fn admin_stats(pool: &PgPool) -> Result<DashboardStats, AppError> {
    let my_courses: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses")
        .fetch_one(pool)
        .await?;

    let total_students: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'student'")
            .fetch_one(pool)
            .await?;

    let quizzes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quizzes")
        .fetch_one(pool)
        .await?;

    Ok(DashboardStats {
        my_courses,
        total_students,
        quizzes,
        ..Default::default()
    })
}
