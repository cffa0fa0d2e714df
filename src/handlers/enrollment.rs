// src/handlers/enrollment.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::{
        enrollment::{EnrollmentCourse, EnrollmentCourseRow},
        user::Role,
    },
    utils::jwt::CurrentUser,
};

const ENROLLMENT_SELECT: &str = r#"
    SELECT
        e.id, e.course_id, e.student_id, e.status,
        COALESCE(e.enrolled_at, e.created_at) AS enrolled_at,
        COALESCE(e.progress_percentage, 0) AS progress_percentage,
        COALESCE(e.completed, FALSE) AS completed,
        c.name AS title, c.code, c.description, c.semester, c.credits,
        u.name AS instructor_name, u.email AS instructor_email
    FROM enrollments e
    JOIN courses c ON e.course_id = c.id
    LEFT JOIN users u ON c.teacher_id = u.id
"#;

/// Lists the current student's active enrollments with course details.
pub async fn my_courses(
    State(pool): State<PgPool>,
    Extension(current): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let rows = sqlx::query_as::<_, EnrollmentCourseRow>(&format!(
        r#"
        {ENROLLMENT_SELECT}
        WHERE e.student_id = $1
          AND (e.status = 'active' OR e.status IS NULL)
        ORDER BY COALESCE(e.enrolled_at, e.created_at) DESC
        "#
    ))
    .bind(current.id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch enrollments: {:?}", e);
        AppError::from(e)
    })?;

    tracing::info!(user_id = current.id, count = rows.len(), "Enrollments listed");

    let enrollments: Vec<EnrollmentCourse> = rows.into_iter().map(EnrollmentCourse::from).collect();

    Ok(Json(serde_json::json!({ "enrollments": enrollments })))
}

/// Enrolls the current student in a course.
pub async fn enroll(
    State(pool): State<PgPool>,
    Extension(current): Extension<CurrentUser>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if current.role != Role::Student {
        return Err(AppError::Forbidden(
            "Only students can enroll in courses".to_string(),
        ));
    }

    let course_exists: Option<i64> = sqlx::query_scalar("SELECT id FROM courses WHERE id = $1")
        .bind(course_id)
        .fetch_optional(&pool)
        .await?;

    if course_exists.is_none() {
        return Err(AppError::NotFound("Course not found".to_string()));
    }

    let already_enrolled: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM enrollments WHERE student_id = $1 AND course_id = $2",
    )
    .bind(current.id)
    .bind(course_id)
    .fetch_optional(&pool)
    .await?;

    if already_enrolled.is_some() {
        return Err(AppError::BadRequest(
            "Already enrolled in this course".to_string(),
        ));
    }

    let enrollment_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO enrollments (student_id, course_id, status, progress_percentage, completed, enrolled_at)
        VALUES ($1, $2, 'active', 0, FALSE, NOW())
        RETURNING id
        "#,
    )
    .bind(current.id)
    .bind(course_id)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to enroll: {:?}", e);
        AppError::from(e)
    })?;

    let row = sqlx::query_as::<_, EnrollmentCourseRow>(&format!(
        "{ENROLLMENT_SELECT} WHERE e.id = $1"
    ))
    .bind(enrollment_id)
    .fetch_one(&pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Enrolled successfully",
            "enrollment": EnrollmentCourse::from(row)
        })),
    ))
}
