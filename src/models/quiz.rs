// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

/// Represents the 'quizzes' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Represents the 'quiz_questions' table in the database.
///
/// The id-ascending order of a quiz's questions is the canonical sequence:
/// both display and grading index questions by their position in it.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: i64,
    pub quiz_id: i64,
    pub question: String,

    /// Option texts, stored as a JSON array in the database.
    pub options: Json<Vec<String>>,

    /// Zero-based index into `options`.
    pub correct_answer: i32,

    pub points: i32,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for sending a question to students (excludes the correct answer).
#[derive(Debug, Serialize)]
pub struct PublicQuizQuestion {
    pub id: i64,
    pub question: String,
    pub options: Json<Vec<String>>,
    pub points: i32,
}

impl From<QuizQuestion> for PublicQuizQuestion {
    fn from(q: QuizQuestion) -> Self {
        PublicQuizQuestion {
            id: q.id,
            question: q.question,
            options: q.options,
            points: q.points,
        }
    }
}

/// DTO for creating a quiz with its questions in one request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuizRequest {
    pub course_id: i64,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: Option<String>,
    #[validate(length(min = 1, message = "A quiz needs at least one question."))]
    #[validate(nested)]
    pub questions: Vec<QuestionInput>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[validate(schema(function = validate_correct_answer))]
pub struct QuestionInput {
    #[validate(length(min = 1, max = 2000))]
    pub question: String,
    #[validate(custom(function = validate_options))]
    pub options: Vec<String>,
    #[validate(range(min = 0))]
    pub correct_answer: i32,
    #[validate(range(min = 1))]
    pub points: i32,
}

fn validate_options(options: &Vec<String>) -> Result<(), validator::ValidationError> {
    if options.len() < 2 {
        return Err(validator::ValidationError::new("at_least_two_options_required"));
    }
    for opt in options {
        if opt.trim().is_empty() {
            return Err(validator::ValidationError::new("option_cannot_be_empty"));
        }
        if opt.len() > 500 {
            return Err(validator::ValidationError::new("option_too_long"));
        }
    }
    Ok(())
}

fn validate_correct_answer(input: &QuestionInput) -> Result<(), validator::ValidationError> {
    if (input.correct_answer as usize) >= input.options.len() {
        return Err(validator::ValidationError::new(
            "correct_answer_out_of_range",
        ));
    }
    Ok(())
}

/// DTO for submitting a quiz attempt.
///
/// `answers` is a JSON object keyed by zero-based question position (an array
/// works too); values are selected option indexes. Missing or malformed
/// entries are graded as wrong, never rejected.
#[derive(Debug, Deserialize)]
pub struct SubmitQuizRequest {
    pub answers: serde_json::Value,
}

/// Attempt columns surfaced alongside a course's quiz list.
#[derive(Debug, Serialize, FromRow)]
pub struct AttemptSummary {
    pub quiz_id: i64,
    pub score: i32,
    pub total_points: i32,
    pub percentage: f64,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Result of grading one submission.
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeResult {
    pub score: i32,
    pub total_points: i32,
    pub percentage: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question_input(correct_answer: i32) -> QuestionInput {
        QuestionInput {
            question: "Which option is right?".to_string(),
            options: vec!["a".to_string(), "b".to_string()],
            correct_answer,
            points: 1,
        }
    }

    #[test]
    fn well_formed_quiz_passes_validation() {
        let request = CreateQuizRequest {
            course_id: 1,
            title: "Basics".to_string(),
            description: None,
            questions: vec![question_input(0)],
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn quiz_without_questions_fails_validation() {
        let request = CreateQuizRequest {
            course_id: 1,
            title: "Basics".to_string(),
            description: None,
            questions: vec![],
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn correct_answer_must_index_an_option() {
        assert!(question_input(2).validate().is_err());
        assert!(question_input(1).validate().is_ok());
    }

    #[test]
    fn options_need_at_least_two_nonempty_entries() {
        let mut input = question_input(0);
        input.options = vec!["only one".to_string()];
        assert!(input.validate().is_err());

        let mut input = question_input(0);
        input.options = vec!["a".to_string(), "   ".to_string()];
        assert!(input.validate().is_err());
    }
}
