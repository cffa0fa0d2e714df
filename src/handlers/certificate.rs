// src/handlers/certificate.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::{certificate::Certificate, user::Role},
    utils::jwt::CurrentUser,
};

/// Lists the current student's certificates, most recently issued first.
pub async fn my_certificates(
    State(pool): State<PgPool>,
    Extension(current): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    if current.role != Role::Student {
        return Err(AppError::Forbidden(
            "Only students can view certificates".to_string(),
        ));
    }

    let certificates = sqlx::query_as::<_, Certificate>(
        r#"
        SELECT
            c.id, c.course_id, c.student_id, c.certificate_number,
            c.issued_at, c.created_at, co.name AS course_title
        FROM certificates c
        JOIN courses co ON c.course_id = co.id
        WHERE c.student_id = $1
        ORDER BY c.issued_at DESC
        "#,
    )
    .bind(current.id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch certificates: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(serde_json::json!({ "certificates": certificates })))
}
