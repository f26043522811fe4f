// src/routes.rs

use axum::{
    Router, http::Method, middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{assessment, enrollment, progress},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (courses, assessments, enrollments).
/// * Applies global middleware (Auth, Trace, CORS).
/// * Injects global state (collaborator stores).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let course_routes = Router::new()
        .route(
            "/{course_id}/enroll",
            post(enrollment::enroll).delete(enrollment::unenroll),
        )
        .route("/{course_id}/progress", get(progress::get_progress))
        .route(
            "/{course_id}/content/{content_id}/complete",
            post(progress::complete_content),
        );

    let assessment_routes = Router::new()
        .route("/{assessment_id}", get(assessment::get_assessment))
        .route(
            "/{assessment_id}/submit",
            post(assessment::submit_assessment),
        );

    let enrollment_routes = Router::new()
        .route("/{enrollment_id}", get(enrollment::get_enrollment))
        .route("/{enrollment_id}/status", put(enrollment::update_status))
        .route("/{enrollment_id}/progress", put(progress::override_progress));

    Router::new()
        .nest("/api/courses", course_routes)
        .nest("/api/assessments", assessment_routes)
        .nest("/api/enrollments", enrollment_routes)
        // Every route requires a valid token; role checks happen in
        // the handlers.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
