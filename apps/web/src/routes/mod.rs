pub mod health;
pub mod sessions;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Sessions & document
        .route("/api/v1/sessions", post(sessions::handle_open_session))
        .route("/api/v1/sessions/:id", get(sessions::handle_get_document))
        .route(
            "/api/v1/sessions/:id/nodes/:node",
            delete(sessions::handle_dismiss),
        )
        // AI interactions
        .route("/api/v1/sessions/:id/cv", post(sessions::handle_upload_cv))
        .route(
            "/api/v1/sessions/:id/cv/optimize",
            post(sessions::handle_optimize_cv),
        )
        .route(
            "/api/v1/sessions/:id/cover-letter",
            post(sessions::handle_cover_letter),
        )
        .route(
            "/api/v1/sessions/:id/cover-letter/regenerate",
            post(sessions::handle_regenerate_cover_letter),
        )
        .route("/api/v1/sessions/:id/job-scan", post(sessions::handle_job_scan))
        // Platform
        .route(
            "/api/v1/sessions/:id/jobs/search",
            post(sessions::handle_search_jobs),
        )
        .route(
            "/api/v1/sessions/:id/jobs/:job_id/apply",
            post(sessions::handle_apply),
        )
        .route(
            "/api/v1/sessions/:id/jobs/:job_id/save",
            post(sessions::handle_save),
        )
        .route(
            "/api/v1/sessions/:id/registration",
            post(sessions::handle_show_registration).delete(sessions::handle_close_registration),
        )
        .route("/api/v1/sessions/:id/register", post(sessions::handle_register))
        .route(
            "/api/v1/sessions/:id/plans/:plan",
            post(sessions::handle_select_plan),
        )
        .route(
            "/api/v1/sessions/:id/province",
            put(sessions::handle_select_province),
        )
        .route("/api/v1/sessions/:id/scroll", post(sessions::handle_scroll))
        .with_state(state)
}
