// src/routes.rs

use std::sync::Arc;

use axum::{
    Json, Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
};
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, certificate, course, dashboard, enrollment, forum, quiz, video},
    state::AppState,
    utils::jwt::auth_middleware,
};

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "OK",
        "message": "LMS API is running"
    }))
}

/// Assembles the main application router.
///
/// * Public: health check plus register/login (rate limited).
/// * Everything else sits behind the auth middleware, which injects the
///   caller's identity and database-derived role.
/// * Global middleware: Trace, CORS.
pub fn create_router(state: AppState) -> Router {
    let origins: [HeaderValue; 2] = [
        "http://localhost:5173".parse().unwrap(),
        "http://localhost:5177".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    // Generous limits: this only needs to blunt credential stuffing.
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(50)
            .finish()
            .unwrap(),
    );

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(GovernorLayer::new(governor_conf))
        .merge(
            Router::new()
                .route("/me", get(auth::me))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        );

    let dashboard_routes = Router::new().route("/stats", get(dashboard::stats));

    let course_routes = Router::new()
        .route("/", get(course::list_courses).post(course::create_course))
        .route(
            "/{id}",
            get(course::get_course)
                .put(course::update_course)
                .delete(course::delete_course),
        );

    let enrollment_routes = Router::new()
        .route("/my-courses", get(enrollment::my_courses))
        .route("/{course_id}", post(enrollment::enroll));

    let forum_routes = Router::new()
        .route("/course/{course_id}/topics", get(forum::list_topics))
        .route("/topics/{topic_id}", get(forum::get_topic))
        .route("/topics", post(forum::create_topic))
        .route("/replies", post(forum::create_reply));

    let quiz_routes = Router::new()
        .route("/", post(quiz::create_quiz))
        .route("/course/{course_id}", get(quiz::list_quizzes_by_course))
        .route("/{id}", get(quiz::get_quiz))
        .route("/{id}/submit", post(quiz::submit_quiz));

    let certificate_routes =
        Router::new().route("/my-certificates", get(certificate::my_certificates));

    let video_routes = Router::new()
        .route("/", post(video::create_video))
        .route("/course/{course_id}", get(video::list_videos_by_course))
        .route(
            "/course/{course_id}/progress",
            get(video::get_student_progress),
        )
        .route("/{id}", get(video::get_video))
        .route("/{id}/analytics", get(video::get_video_analytics))
        .route("/{id}/watch-progress", post(video::update_watch_progress));

    let protected = Router::new()
        .nest("/dashboard", dashboard_routes)
        .nest("/courses", course_routes)
        .nest("/enrollments", enrollment_routes)
        .nest("/forums", forum_routes)
        .nest("/quizzes", quiz_routes)
        .nest("/certificates", certificate_routes)
        .nest("/videos", video_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/api/health", get(health))
        .nest("/api/auth", auth_routes)
        .nest("/api", protected)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
