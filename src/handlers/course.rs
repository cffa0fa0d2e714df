// src/handlers/course.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::{PgPool, Postgres};
use validator::Validate;

use crate::{
    config::DEFAULT_COURSE_CREDITS,
    error::AppError,
    models::{
        course::{CourseDetail, CourseSummary, CreateCourseRequest, UpdateCourseRequest},
        user::Role,
    },
    utils::jwt::CurrentUser,
};

/// Lists courses, scoped by role: teachers see their own courses, students
/// see courses they are actively enrolled in, admins see everything.
pub async fn list_courses(
    State(pool): State<PgPool>,
    Extension(current): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let courses = match current.role {
        Role::Teacher => {
            sqlx::query_as::<_, CourseSummary>(
                r#"
                SELECT
                    c.id, c.name AS title, c.code, c.description, c.semester, c.credits,
                    c.teacher_id AS instructor_id, u.name AS instructor_name, c.created_at,
                    (SELECT COUNT(*) FROM enrollments e
                     WHERE e.course_id = c.id AND (e.status = 'active' OR e.status IS NULL))
                        AS enrollment_count
                FROM courses c
                LEFT JOIN users u ON c.teacher_id = u.id
                WHERE c.teacher_id = $1
                ORDER BY c.created_at DESC
                "#,
            )
            .bind(current.id)
            .fetch_all(&pool)
            .await?
        }
        Role::Student => {
            sqlx::query_as::<_, CourseSummary>(
                r#"
                SELECT
                    c.id, c.name AS title, c.code, c.description, c.semester, c.credits,
                    c.teacher_id AS instructor_id, u.name AS instructor_name, c.created_at,
                    (SELECT COUNT(*) FROM enrollments e
                     WHERE e.course_id = c.id AND (e.status = 'active' OR e.status IS NULL))
                        AS enrollment_count
                FROM courses c
                LEFT JOIN users u ON c.teacher_id = u.id
                JOIN enrollments me ON c.id = me.course_id
                    AND me.student_id = $1
                    AND (me.status = 'active' OR me.status IS NULL)
                ORDER BY c.created_at DESC
                "#,
            )
            .bind(current.id)
            .fetch_all(&pool)
            .await?
        }
        Role::Admin => {
            sqlx::query_as::<_, CourseSummary>(
                r#"
                SELECT
                    c.id, c.name AS title, c.code, c.description, c.semester, c.credits,
                    c.teacher_id AS instructor_id, u.name AS instructor_name, c.created_at,
                    (SELECT COUNT(*) FROM enrollments e
                     WHERE e.course_id = c.id AND (e.status = 'active' OR e.status IS NULL))
                        AS enrollment_count
                FROM courses c
                LEFT JOIN users u ON c.teacher_id = u.id
                ORDER BY c.created_at DESC
                "#,
            )
            .fetch_all(&pool)
            .await?
        }
    };

    tracing::info!(
        user_id = current.id,
        role = current.role.as_str(),
        count = courses.len(),
        "Courses listed"
    );

    Ok(Json(serde_json::json!({ "courses": courses })))
}

/// Gets a single course with instructor contact info.
pub async fn get_course(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let course = sqlx::query_as::<_, CourseDetail>(
        r#"
        SELECT
            c.id, c.name AS title, c.code, c.description, c.semester, c.credits,
            c.teacher_id AS instructor_id, u.name AS instructor_name,
            u.email AS instructor_email, c.created_at
        FROM courses c
        LEFT JOIN users u ON c.teacher_id = u.id
        WHERE c.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Course not found".to_string()))?;

    Ok(Json(serde_json::json!({ "course": course })))
}

/// Creates a course. Admins only; the course can be assigned to any teacher.
pub async fn create_course(
    State(pool): State<PgPool>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<CreateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    if current.role != Role::Admin {
        return Err(AppError::Forbidden(
            "Only admins can create courses".to_string(),
        ));
    }

    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let teacher_id = payload.instructor_id.unwrap_or(current.id);
    let code = payload
        .code
        .clone()
        .unwrap_or_else(|| format!("COURSE{}", chrono::Utc::now().timestamp()));

    let course = sqlx::query_as::<_, CourseDetail>(
        r#"
        WITH inserted AS (
            INSERT INTO courses (name, code, description, semester, credits, teacher_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, code, description, semester, credits, teacher_id, created_at
        )
        SELECT
            i.id, i.name AS title, i.code, i.description, i.semester, i.credits,
            i.teacher_id AS instructor_id, u.name AS instructor_name,
            u.email AS instructor_email, i.created_at
        FROM inserted i
        LEFT JOIN users u ON i.teacher_id = u.id
        "#,
    )
    .bind(&payload.title)
    .bind(&code)
    .bind(&payload.description)
    .bind(&payload.semester)
    .bind(payload.credits.unwrap_or(DEFAULT_COURSE_CREDITS))
    .bind(teacher_id)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create course: {:?}", e);
        AppError::from(e)
    })?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Course created successfully",
            "course": course
        })),
    ))
}

/// Partially updates a course. The owning teacher or an admin only.
pub async fn update_course(
    State(pool): State<PgPool>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    check_course_ownership(&pool, id, &current).await?;

    if payload.is_empty() {
        return Err(AppError::BadRequest("No fields to update".to_string()));
    }

    // Dynamic SET clause: only the provided fields change.
    let mut query_builder = sqlx::QueryBuilder::<Postgres>::new("UPDATE courses SET ");
    let mut separated = query_builder.separated(", ");
    if let Some(title) = &payload.title {
        separated.push("name = ").push_bind_unseparated(title);
    }
    if let Some(description) = &payload.description {
        separated
            .push("description = ")
            .push_bind_unseparated(description);
    }
    if let Some(code) = &payload.code {
        separated.push("code = ").push_bind_unseparated(code);
    }
    if let Some(semester) = &payload.semester {
        separated.push("semester = ").push_bind_unseparated(semester);
    }
    if let Some(credits) = payload.credits {
        separated.push("credits = ").push_bind_unseparated(credits);
    }
    separated.push("updated_at = NOW()");
    query_builder.push(" WHERE id = ").push_bind(id);

    query_builder.build().execute(&pool).await.map_err(|e| {
        tracing::error!("Failed to update course: {:?}", e);
        AppError::from(e)
    })?;

    let course = sqlx::query_as::<_, CourseDetail>(
        r#"
        SELECT
            c.id, c.name AS title, c.code, c.description, c.semester, c.credits,
            c.teacher_id AS instructor_id, u.name AS instructor_name,
            u.email AS instructor_email, c.created_at
        FROM courses c
        LEFT JOIN users u ON c.teacher_id = u.id
        WHERE c.id = $1
        "#,
    )
    .bind(id)
    .fetch_one(&pool)
    .await?;

    Ok(Json(serde_json::json!({
        "message": "Course updated successfully",
        "course": course
    })))
}

/// Deletes a course. The owning teacher or an admin only.
pub async fn delete_course(
    State(pool): State<PgPool>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    check_course_ownership(&pool, id, &current).await?;

    sqlx::query("DELETE FROM courses WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete course: {:?}", e);
            AppError::from(e)
        })?;

    Ok(Json(serde_json::json!({
        "message": "Course deleted successfully"
    })))
}

/// 404 if the course is missing, 403 unless the caller owns it or is admin.
async fn check_course_ownership(
    pool: &PgPool,
    course_id: i64,
    current: &CurrentUser,
) -> Result<(), AppError> {
    let teacher_id: Option<Option<i64>> =
        sqlx::query_scalar("SELECT teacher_id FROM courses WHERE id = $1")
            .bind(course_id)
            .fetch_optional(pool)
            .await?;

    let teacher_id = teacher_id.ok_or(AppError::NotFound("Course not found".to_string()))?;

    if current.role != Role::Admin && teacher_id != Some(current.id) {
        return Err(AppError::Forbidden("Permission denied".to_string()));
    }

    Ok(())
}
