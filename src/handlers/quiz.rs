// src/handlers/quiz.rs

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::Value;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::quiz::{
        AttemptSummary, CreateQuizRequest, GradeResult, PublicQuizQuestion, Quiz, QuizQuestion,
        SubmitQuizRequest,
    },
    models::user::Role,
    utils::{
        jwt::CurrentUser,
        text::{format_description, format_title},
    },
};

/// Grades one submission against the quiz's canonical question sequence.
///
/// `answers` is a JSON object keyed by zero-based position (array form also
/// accepted); positions align with the id-ascending question order. Every
/// question contributes its points to the total; a question scores iff its
/// entry normalizes to the correct option index. Malformed entries count as
/// wrong. Pure: no I/O, no logging.
fn grade(questions: &[QuizQuestion], answers: &Value) -> GradeResult {
    let mut score = 0;
    let mut total_points = 0;

    for (position, question) in questions.iter().enumerate() {
        total_points += question.points;

        if let Some(selected) = selected_option(answers, position) {
            if selected == question.correct_answer as i64 {
                score += question.points;
            }
        }
    }

    let percentage = if total_points > 0 {
        round2(score as f64 / total_points as f64 * 100.0)
    } else {
        0.0
    };

    GradeResult {
        score,
        total_points,
        percentage,
    }
}

/// Looks up the answer for a question position and normalizes it to an option
/// index. Numbers and numeric strings are accepted, including integral floats
/// like `1.0`; anything else is `None`.
fn selected_option(answers: &Value, position: usize) -> Option<i64> {
    let raw = match answers {
        Value::Array(items) => items.get(position),
        Value::Object(map) => map.get(&position.to_string()),
        _ => None,
    }?;

    match raw {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    }
}

fn integral(value: f64) -> Option<i64> {
    (value.fract() == 0.0 && value.is_finite()).then_some(value as i64)
}

/// Round half away from zero to 2 decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Creates a quiz with its questions.
///
/// Teachers only, and only for their own courses. Title and description are
/// normalized to Title Case before storage. The quiz and its questions are
/// inserted in one transaction.
pub async fn create_quiz(
    State(pool): State<PgPool>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if current.role != Role::Teacher {
        return Err(AppError::Forbidden(
            "Only teachers can create quizzes".to_string(),
        ));
    }

    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let owner_id: Option<i64> =
        sqlx::query_scalar("SELECT teacher_id FROM courses WHERE id = $1")
            .bind(payload.course_id)
            .fetch_optional(&pool)
            .await?;

    if owner_id != Some(current.id) {
        return Err(AppError::Forbidden(
            "You can only create quizzes for your own courses".to_string(),
        ));
    }

    let title = format_title(&payload.title);
    let description = payload.description.as_deref().map(format_description);

    let mut tx = pool.begin().await?;

    let quiz = sqlx::query_as::<_, Quiz>(
        r#"
        INSERT INTO quizzes (course_id, title, description)
        VALUES ($1, $2, $3)
        RETURNING id, course_id, title, description, created_at
        "#,
    )
    .bind(payload.course_id)
    .bind(&title)
    .bind(&description)
    .fetch_one(&mut *tx)
    .await?;

    for question in &payload.questions {
        sqlx::query(
            r#"
            INSERT INTO quiz_questions (quiz_id, question, options, correct_answer, points)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(quiz.id)
        .bind(&question.question)
        .bind(sqlx::types::Json(&question.options))
        .bind(question.correct_answer)
        .bind(question.points)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await.map_err(|e| {
        tracing::error!("Failed to create quiz: {:?}", e);
        AppError::from(e)
    })?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Quiz created successfully",
            "quiz": quiz
        })),
    ))
}

/// Lists a course's quizzes. Students also get their latest attempt per quiz,
/// keyed by quiz id.
pub async fn list_quizzes_by_course(
    State(pool): State<PgPool>,
    Extension(current): Extension<CurrentUser>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quizzes = sqlx::query_as::<_, Quiz>(
        r#"
        SELECT id, course_id, title, description, created_at
        FROM quizzes
        WHERE course_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(course_id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch quizzes: {:?}", e);
        AppError::from(e)
    })?;

    let mut attempts: HashMap<String, AttemptSummary> = HashMap::new();
    if current.role == Role::Student && !quizzes.is_empty() {
        let rows = sqlx::query_as::<_, AttemptSummary>(
            r#"
            SELECT DISTINCT ON (quiz_id)
                quiz_id, score, total_points, percentage, completed_at
            FROM quiz_attempts
            WHERE student_id = $1
              AND quiz_id IN (SELECT id FROM quizzes WHERE course_id = $2)
            ORDER BY quiz_id, completed_at DESC
            "#,
        )
        .bind(current.id)
        .bind(course_id)
        .fetch_all(&pool)
        .await?;

        for row in rows {
            attempts.insert(row.quiz_id.to_string(), row);
        }
    }

    Ok(Json(serde_json::json!({
        "quizzes": quizzes,
        "attempts": attempts
    })))
}

/// Gets a single quiz with its questions in canonical order.
/// The correct answers are only included for teachers and admins.
pub async fn get_quiz(
    State(pool): State<PgPool>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = sqlx::query_as::<_, Quiz>(
        "SELECT id, course_id, title, description, created_at FROM quizzes WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| {
        tracing::warn!("Quiz not found: {}", id);
        AppError::NotFound("Quiz not found".to_string())
    })?;

    let questions = fetch_questions(&pool, id).await?;

    tracing::info!(
        quiz_id = id,
        questions_count = questions.len(),
        includes_answers = current.role.is_staff(),
        "Quiz loaded"
    );

    if current.role.is_staff() {
        Ok(Json(serde_json::json!({
            "quiz": quiz,
            "questions": questions
        })))
    } else {
        let public: Vec<PublicQuizQuestion> =
            questions.into_iter().map(PublicQuizQuestion::from).collect();
        Ok(Json(serde_json::json!({
            "quiz": quiz,
            "questions": public
        })))
    }
}

/// Submits quiz answers, grades them and records the attempt.
///
/// Students only. The grading itself never fails: precondition errors (missing
/// quiz, empty question list, wrong role) are reported here before grading.
pub async fn submit_quiz(
    State(pool): State<PgPool>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if current.role != Role::Student {
        return Err(AppError::Forbidden(
            "Only students can submit quizzes".to_string(),
        ));
    }

    if !payload.answers.is_object() && !payload.answers.is_array() {
        return Err(AppError::BadRequest(
            "answers must be an object keyed by question position".to_string(),
        ));
    }

    let quiz_exists: Option<i64> = sqlx::query_scalar("SELECT id FROM quizzes WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?;

    if quiz_exists.is_none() {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }

    let questions = fetch_questions(&pool, id).await?;

    if questions.is_empty() {
        return Err(AppError::BadRequest("Quiz has no questions".to_string()));
    }

    let result = grade(&questions, &payload.answers);

    sqlx::query(
        r#"
        INSERT INTO quiz_attempts
            (quiz_id, student_id, score, total_points, percentage, answers, completed_at)
        VALUES ($1, $2, $3, $4, $5, $6, NOW())
        "#,
    )
    .bind(id)
    .bind(current.id)
    .bind(result.score)
    .bind(result.total_points)
    .bind(result.percentage)
    .bind(sqlx::types::Json(&payload.answers))
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to record quiz attempt: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(serde_json::json!({
        "message": "Quiz submitted successfully",
        "result": result
    })))
}

async fn fetch_questions(pool: &PgPool, quiz_id: i64) -> Result<Vec<QuizQuestion>, AppError> {
    let questions = sqlx::query_as::<_, QuizQuestion>(
        r#"
        SELECT id, quiz_id, question, options, correct_answer, points, created_at
        FROM quiz_questions
        WHERE quiz_id = $1
        ORDER BY id ASC
        "#,
    )
    .bind(quiz_id)
    .fetch_all(pool)
    .await?;

    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sqlx::types::Json;

    fn question(id: i64, correct: i32, points: i32) -> QuizQuestion {
        QuizQuestion {
            id,
            quiz_id: 1,
            question: format!("Question {}", id),
            options: Json(vec!["A".into(), "B".into(), "C".into()]),
            correct_answer: correct,
            points,
            created_at: None,
        }
    }

    #[test]
    fn grades_mixed_answers() {
        let questions = vec![question(1, 0, 1), question(2, 1, 2), question(3, 2, 3)];
        let answers = json!({"0": 0, "1": 1, "2": 0});

        let result = grade(&questions, &answers);
        assert_eq!(result.score, 3);
        assert_eq!(result.total_points, 6);
        assert_eq!(result.percentage, 50.0);
    }

    #[test]
    fn unanswered_positions_count_as_wrong() {
        let questions = vec![question(1, 0, 1), question(2, 1, 2), question(3, 2, 3)];
        let answers = json!({"0": 0});

        let result = grade(&questions, &answers);
        assert_eq!(result.score, 1);
        assert_eq!(result.total_points, 6);
        assert_eq!(result.percentage, 16.67);
    }

    #[test]
    fn zero_correct_is_not_a_division_error() {
        let questions = vec![question(1, 0, 5), question(2, 1, 5)];
        let answers = json!({"0": 2, "1": 0});

        let result = grade(&questions, &answers);
        assert_eq!(result.score, 0);
        assert_eq!(result.percentage, 0.0);
    }

    #[test]
    fn numeric_strings_are_normalized() {
        let questions = vec![question(1, 1, 4)];
        let answers = json!({"0": "1"});

        let result = grade(&questions, &answers);
        assert_eq!(result.score, 4);
        assert_eq!(result.percentage, 100.0);
    }

    #[test]
    fn integral_float_answers_are_normalized() {
        let questions = vec![question(1, 1, 4)];

        let result = grade(&questions, &json!({"0": 1.0}));
        assert_eq!(result.score, 4);

        let result = grade(&questions, &json!({"0": "1.0"}));
        assert_eq!(result.score, 4);
    }

    #[test]
    fn fractional_answers_count_as_wrong() {
        let questions = vec![question(1, 1, 4)];

        let result = grade(&questions, &json!({"0": 1.5}));
        assert_eq!(result.score, 0);

        let result = grade(&questions, &json!({"0": "0.9"}));
        assert_eq!(result.score, 0);
    }

    #[test]
    fn malformed_entries_count_as_wrong() {
        let questions = vec![question(1, 0, 1), question(2, 1, 1), question(3, 2, 1)];
        // Non-numeric string, null, and a nested object: all wrong, no error.
        let answers = json!({"0": "first", "1": null, "2": {"selected": 2}});

        let result = grade(&questions, &answers);
        assert_eq!(result.score, 0);
        assert_eq!(result.total_points, 3);
    }

    #[test]
    fn array_payloads_align_by_position() {
        let questions = vec![question(1, 0, 1), question(2, 1, 2)];
        let answers = json!([0, 1]);

        let result = grade(&questions, &answers);
        assert_eq!(result.score, 3);
        assert_eq!(result.percentage, 100.0);
    }

    #[test]
    fn out_of_range_index_is_wrong_not_an_error() {
        let questions = vec![question(1, 0, 2)];
        let answers = json!({"0": 99});

        let result = grade(&questions, &answers);
        assert_eq!(result.score, 0);
        assert_eq!(result.total_points, 2);
    }

    #[test]
    fn percentage_rounds_half_up_to_two_places() {
        // 7 of 8 points -> 87.5 stays 87.5
        let questions = vec![question(1, 0, 7), question(2, 1, 1)];
        let answers = json!({"0": 0});
        assert_eq!(grade(&questions, &answers).percentage, 87.5);

        // 1 of 3 points -> 33.333... -> 33.33
        let questions = vec![question(1, 0, 1), question(2, 1, 2)];
        let answers = json!({"0": 0});
        assert_eq!(grade(&questions, &answers).percentage, 33.33);
    }
}
