// tests/api_tests.rs

use lms_backend::{config::Config, routes, state::AppState};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;

/// Spawns the app on a random port for testing.
/// Returns the base URL and a pool for seeding, or `None` when no test
/// database is configured (the test is then skipped).
async fn spawn_app() -> Option<(String, PgPool)> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("skipping: DATABASE_URL not set");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: database_url.clone(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        admin_email: None,
        admin_password: None,
    };

    let state = AppState {
        pool: pool.clone(),
        config,
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    Some((address, pool))
}

fn unique_email(prefix: &str) -> String {
    format!("{}_{}@example.com", prefix, &uuid::Uuid::new_v4().to_string()[..8])
}

/// Registers a user and returns (token, user_id).
async fn register_user(
    client: &reqwest::Client,
    address: &str,
    email: &str,
    role: &str,
) -> (String, i64) {
    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "email": email,
            "password": "password123",
            "name": "Test User",
            "role": role
        }))
        .send()
        .await
        .expect("Register failed");

    assert_eq!(response.status().as_u16(), 201);

    let body: serde_json::Value = response.json().await.unwrap();
    let token = body["token"].as_str().expect("token missing").to_string();
    let user_id = body["user"]["id"].as_i64().expect("user id missing");
    (token, user_id)
}

async fn seed_course(pool: &PgPool, teacher_id: i64) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO courses (name, code, teacher_id) VALUES ('Test Course', 'T101', $1) RETURNING id",
    )
    .bind(teacher_id)
    .fetch_one(pool)
    .await
    .expect("Failed to seed course")
}

#[tokio::test]
async fn health_check_works() {
    let Some((address, _pool)) = spawn_app().await else { return };
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/health", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "OK");
}

#[tokio::test]
async fn protected_routes_require_token() {
    let Some((address, _pool)) = spawn_app().await else { return };
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/courses", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn register_and_login_work() {
    let Some((address, _pool)) = spawn_app().await else { return };
    let client = reqwest::Client::new();
    let email = unique_email("login");

    let (_, _) = register_user(&client, &address, &email, "student").await;

    let response = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({
            "email": email,
            "password": "password123"
        }))
        .send()
        .await
        .expect("Login failed");

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["user"]["role"], "student");
}

#[tokio::test]
async fn register_rejects_invalid_payload() {
    let Some((address, _pool)) = spawn_app().await else { return };
    let client = reqwest::Client::new();

    // Password too short, role not allowed for self-registration.
    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "email": "not-an-email",
            "password": "abc",
            "name": "X",
            "role": "admin"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn quiz_flow_creates_formats_and_grades() {
    let Some((address, pool)) = spawn_app().await else { return };
    let client = reqwest::Client::new();

    let (teacher_token, teacher_id) =
        register_user(&client, &address, &unique_email("teacher"), "teacher").await;
    let (student_token, student_id) =
        register_user(&client, &address, &unique_email("student"), "student").await;

    let course_id = seed_course(&pool, teacher_id).await;

    // Student must be enrolled to see the course in listings.
    sqlx::query("INSERT INTO enrollments (student_id, course_id, status) VALUES ($1, $2, 'active')")
        .bind(student_id)
        .bind(course_id)
        .execute(&pool)
        .await
        .unwrap();

    // 1. Teacher creates a quiz; title and description get Title Cased.
    let create_resp = client
        .post(format!("{}/api/quizzes", address))
        .header("Authorization", format!("Bearer {}", teacher_token))
        .json(&serde_json::json!({
            "course_id": course_id,
            "title": "  rust   BASICS quiz ",
            "description": "this is great! really cool.",
            "questions": [
                {"question": "Q1", "options": ["a", "b", "c"], "correct_answer": 0, "points": 1},
                {"question": "Q2", "options": ["a", "b", "c"], "correct_answer": 1, "points": 2},
                {"question": "Q3", "options": ["a", "b", "c"], "correct_answer": 2, "points": 3}
            ]
        }))
        .send()
        .await
        .expect("Quiz creation failed");

    assert_eq!(create_resp.status().as_u16(), 201);
    let created: serde_json::Value = create_resp.json().await.unwrap();
    assert_eq!(created["quiz"]["title"], "Rust Basics Quiz");
    assert_eq!(created["quiz"]["description"], "This Is Great! Really Cool.");
    let quiz_id = created["quiz"]["id"].as_i64().unwrap();

    // 2. Student fetches the quiz: no correct answers leak.
    let quiz_resp = client
        .get(format!("{}/api/quizzes/{}", address, quiz_id))
        .header("Authorization", format!("Bearer {}", student_token))
        .send()
        .await
        .expect("Quiz fetch failed");

    assert_eq!(quiz_resp.status().as_u16(), 200);
    let quiz_body: serde_json::Value = quiz_resp.json().await.unwrap();
    let questions = quiz_body["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 3);
    assert!(questions[0].get("correct_answer").is_none());

    // 3. Teacher sees the answer key.
    let teacher_view: serde_json::Value = client
        .get(format!("{}/api/quizzes/{}", address, quiz_id))
        .header("Authorization", format!("Bearer {}", teacher_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(teacher_view["questions"][0]["correct_answer"], 0);

    // 4. Teacher cannot submit.
    let forbidden = client
        .post(format!("{}/api/quizzes/{}/submit", address, quiz_id))
        .header("Authorization", format!("Bearer {}", teacher_token))
        .json(&serde_json::json!({ "answers": {"0": 0} }))
        .send()
        .await
        .unwrap();
    assert_eq!(forbidden.status().as_u16(), 403);

    // 5. Student submits: two of three correct (positions 0 and 1).
    let submit_resp = client
        .post(format!("{}/api/quizzes/{}/submit", address, quiz_id))
        .header("Authorization", format!("Bearer {}", student_token))
        .json(&serde_json::json!({ "answers": {"0": 0, "1": 1, "2": 0} }))
        .send()
        .await
        .expect("Submit failed");

    assert_eq!(submit_resp.status().as_u16(), 200);
    let result: serde_json::Value = submit_resp.json().await.unwrap();
    assert_eq!(result["result"]["score"], 3);
    assert_eq!(result["result"]["totalPoints"], 6);
    assert_eq!(result["result"]["percentage"], 50.0);

    // 6. The attempt shows up in the student's quiz list for the course.
    let list_body: serde_json::Value = client
        .get(format!("{}/api/quizzes/course/{}", address, course_id))
        .header("Authorization", format!("Bearer {}", student_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let attempt = &list_body["attempts"][quiz_id.to_string()];
    assert_eq!(attempt["score"], 3);
    assert_eq!(attempt["percentage"], 50.0);
}

#[tokio::test]
async fn submitting_empty_quiz_is_rejected_before_grading() {
    let Some((address, pool)) = spawn_app().await else { return };
    let client = reqwest::Client::new();

    let (_, teacher_id) =
        register_user(&client, &address, &unique_email("teacher"), "teacher").await;
    let (student_token, _) =
        register_user(&client, &address, &unique_email("student"), "student").await;

    let course_id = seed_course(&pool, teacher_id).await;

    // Quiz without questions, seeded directly.
    let quiz_id: i64 = sqlx::query_scalar(
        "INSERT INTO quizzes (course_id, title) VALUES ($1, 'Empty Quiz') RETURNING id",
    )
    .bind(course_id)
    .fetch_one(&pool)
    .await
    .unwrap();

    let response = client
        .post(format!("{}/api/quizzes/{}/submit", address, quiz_id))
        .header("Authorization", format!("Bearer {}", student_token))
        .json(&serde_json::json!({ "answers": {} }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Quiz has no questions");
}

#[tokio::test]
async fn enrollment_flow_and_dashboard_counts() {
    let Some((address, pool)) = spawn_app().await else { return };
    let client = reqwest::Client::new();

    let (_, teacher_id) =
        register_user(&client, &address, &unique_email("teacher"), "teacher").await;
    let (student_token, _) =
        register_user(&client, &address, &unique_email("student"), "student").await;

    let course_id = seed_course(&pool, teacher_id).await;

    let enroll_resp = client
        .post(format!("{}/api/enrollments/{}", address, course_id))
        .header("Authorization", format!("Bearer {}", student_token))
        .send()
        .await
        .expect("Enroll failed");
    assert_eq!(enroll_resp.status().as_u16(), 201);
    let enrolled: serde_json::Value = enroll_resp.json().await.unwrap();
    assert_eq!(enrolled["enrollment"]["status"], "active");

    // Enrolling twice is a client error.
    let again = client
        .post(format!("{}/api/enrollments/{}", address, course_id))
        .header("Authorization", format!("Bearer {}", student_token))
        .send()
        .await
        .unwrap();
    assert_eq!(again.status().as_u16(), 400);

    let my_courses: serde_json::Value = client
        .get(format!("{}/api/enrollments/my-courses", address))
        .header("Authorization", format!("Bearer {}", student_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(my_courses["enrollments"].as_array().unwrap().len(), 1);

    let stats: serde_json::Value = client
        .get(format!("{}/api/dashboard/stats", address))
        .header("Authorization", format!("Bearer {}", student_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["enrollments"], 1);
    assert_eq!(stats["quizAttempts"], 0);
}

#[tokio::test]
async fn video_flow_tracks_watch_progress() {
    let Some((address, pool)) = spawn_app().await else { return };
    let client = reqwest::Client::new();

    let (teacher_token, teacher_id) =
        register_user(&client, &address, &unique_email("teacher"), "teacher").await;
    let (student_token, _) =
        register_user(&client, &address, &unique_email("student"), "student").await;

    let course_id = seed_course(&pool, teacher_id).await;

    let create_resp = client
        .post(format!("{}/api/videos", address))
        .header("Authorization", format!("Bearer {}", teacher_token))
        .json(&serde_json::json!({
            "course_id": course_id,
            "title": "intro   LECTURE",
            "youtube_url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "min_watch_time_minutes": 1
        }))
        .send()
        .await
        .expect("Video creation failed");

    assert_eq!(create_resp.status().as_u16(), 201);
    let created: serde_json::Value = create_resp.json().await.unwrap();
    assert_eq!(created["video"]["title"], "Intro Lecture");
    assert_eq!(created["video"]["youtube_id"], "dQw4w9WgXcQ");
    let video_id = created["video"]["id"].as_i64().unwrap();

    // A bad URL is rejected outright.
    let bad = client
        .post(format!("{}/api/videos", address))
        .header("Authorization", format!("Bearer {}", teacher_token))
        .json(&serde_json::json!({
            "course_id": course_id,
            "title": "Broken",
            "youtube_url": "https://example.com/watch?v=nope"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad.status().as_u16(), 400);

    // 30s watched: below the 60s minimum.
    let progress: serde_json::Value = client
        .post(format!("{}/api/videos/{}/watch-progress", address, video_id))
        .header("Authorization", format!("Bearer {}", student_token))
        .json(&serde_json::json!({ "watch_time_seconds": 30 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(progress["is_completed"], false);

    // 90s watched: completed, and watch time moved forward.
    let progress: serde_json::Value = client
        .post(format!("{}/api/videos/{}/watch-progress", address, video_id))
        .header("Authorization", format!("Bearer {}", student_token))
        .json(&serde_json::json!({ "watch_time_seconds": 90 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(progress["is_completed"], true);

    // A lower report later never regresses progress.
    let progress: serde_json::Value = client
        .post(format!("{}/api/videos/{}/watch-progress", address, video_id))
        .header("Authorization", format!("Bearer {}", student_token))
        .json(&serde_json::json!({ "watch_time_seconds": 10 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(progress["watch_progress"]["watch_time_seconds"], 90);
    assert_eq!(progress["is_completed"], true);

    // Teacher-facing analytics sees the one watcher.
    let analytics: serde_json::Value = client
        .get(format!("{}/api/videos/{}/analytics", address, video_id))
        .header("Authorization", format!("Bearer {}", teacher_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(analytics["statistics"]["total_students_watched"], 1);
    assert_eq!(analytics["statistics"]["completed_students"], 1);
    assert_eq!(analytics["statistics"]["completion_rate"], 100.0);
}

#[tokio::test]
async fn forum_topics_and_replies() {
    let Some((address, pool)) = spawn_app().await else { return };
    let client = reqwest::Client::new();

    let (_, teacher_id) =
        register_user(&client, &address, &unique_email("teacher"), "teacher").await;
    let (student_token, _) =
        register_user(&client, &address, &unique_email("student"), "student").await;

    let course_id = seed_course(&pool, teacher_id).await;

    let topic_resp = client
        .post(format!("{}/api/forums/topics", address))
        .header("Authorization", format!("Bearer {}", student_token))
        .json(&serde_json::json!({
            "course_id": course_id,
            "title": "Week 1 question",
            "content": "How do I <script>alert(1)</script> get started?"
        }))
        .send()
        .await
        .expect("Topic creation failed");

    assert_eq!(topic_resp.status().as_u16(), 201);
    let topic: serde_json::Value = topic_resp.json().await.unwrap();
    let topic_id = topic["topic"]["id"].as_i64().unwrap();
    // Script tags never reach storage.
    assert!(!topic["topic"]["content"].as_str().unwrap().contains("<script>"));

    let reply_resp = client
        .post(format!("{}/api/forums/replies", address))
        .header("Authorization", format!("Bearer {}", student_token))
        .json(&serde_json::json!({
            "topic_id": topic_id,
            "content": "Start with the first video."
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(reply_resp.status().as_u16(), 201);

    let detail: serde_json::Value = client
        .get(format!("{}/api/forums/topics/{}", address, topic_id))
        .header("Authorization", format!("Bearer {}", student_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["replies"].as_array().unwrap().len(), 1);
    assert_eq!(detail["topic"]["reply_count"], 1);
}
