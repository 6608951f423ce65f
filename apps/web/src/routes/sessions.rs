//! Session endpoints. Every action runs to completion and answers with the
//! re-rendered document, so the page the client shows is always the server's.

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::Html,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::ai::interactions::CoverLetterOptions;
use crate::errors::AppError;
use crate::matching_client::types::{JobScanRequest, LetterLength, OptimizationTargets, Tone};
use crate::models::user::Plan;
use crate::platform::jobs::SearchCriteria;
use crate::platform::registration::RegistrationForm;
use crate::session::Session;
use crate::state::AppState;
use crate::ui::dom::NodeId;

#[derive(Serialize)]
pub struct SessionCreated {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct CoverLetterForm {
    pub job_description: String,
    #[serde(default)]
    pub cv_data: Value,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default)]
    pub length: LetterLength,
}

#[derive(Deserialize)]
pub struct ProvinceSelection {
    pub province: String,
}

#[derive(Deserialize)]
pub struct ScrollEvent {
    pub offset: f64,
}

fn session(state: &AppState, id: Uuid) -> Result<Arc<Session>, AppError> {
    state
        .sessions
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

fn render(session: &Session) -> Html<String> {
    Html(session.to_html())
}

/// POST /api/v1/sessions
pub async fn handle_open_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionCreated>) {
    let session = state.open_session();
    info!(session_id = %session.id, open = state.sessions.count(), "Session created");
    (
        StatusCode::CREATED,
        Json(SessionCreated {
            session_id: session.id,
            created_at: session.created_at,
        }),
    )
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let session = session(&state, id)?;
    Ok(render(&session))
}

/// DELETE /api/v1/sessions/:id/nodes/:node
pub async fn handle_dismiss(
    State(state): State<AppState>,
    Path((id, node)): Path<(Uuid, u64)>,
) -> Result<Html<String>, AppError> {
    let session = session(&state, id)?;
    if !session.dismiss(NodeId::from(node)) {
        debug!(session_id = %id, node, "Dismiss ignored: not a transient node");
    }
    Ok(render(&session))
}

// ────────────────────────────────────────────────────────────────────────────
// AI interactions
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions/:id/cv
/// Multipart form with a single `cv` file field.
pub async fn handle_upload_cv(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Html<String>, AppError> {
    let session = session(&state, id)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("cv") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("unknown").to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read file: {e}")))?;

        debug!(session_id = %id, file = %file_name, size = data.len(), "CV received");
        session
            .interactions
            .select_cv(&file_name, content_type.as_deref(), data)
            .await;
        return Ok(render(&session));
    }

    Err(AppError::Validation("Missing 'cv' file field".into()))
}

/// POST /api/v1/sessions/:id/cv/optimize
pub async fn handle_optimize_cv(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(targets): Json<OptimizationTargets>,
) -> Result<Html<String>, AppError> {
    let session = session(&state, id)?;
    session.interactions.optimize_cv(targets).await;
    Ok(render(&session))
}

/// POST /api/v1/sessions/:id/cover-letter
pub async fn handle_cover_letter(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(form): Json<CoverLetterForm>,
) -> Result<Html<String>, AppError> {
    let session = session(&state, id)?;
    let options = CoverLetterOptions {
        tone: form.tone,
        length: form.length,
    };
    session
        .interactions
        .generate_cover_letter(&form.job_description, form.cv_data, options)
        .await;
    Ok(render(&session))
}

/// POST /api/v1/sessions/:id/cover-letter/regenerate
pub async fn handle_regenerate_cover_letter(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let session = session(&state, id)?;
    session.interactions.regenerate_cover_letter().await;
    Ok(render(&session))
}

/// POST /api/v1/sessions/:id/job-scan
pub async fn handle_job_scan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(profile): Json<JobScanRequest>,
) -> Result<Html<String>, AppError> {
    let session = session(&state, id)?;
    session.interactions.scan_job_opportunities(&profile).await;
    Ok(render(&session))
}

// ────────────────────────────────────────────────────────────────────────────
// Platform
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions/:id/jobs/search
pub async fn handle_search_jobs(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(criteria): Json<SearchCriteria>,
) -> Result<Html<String>, AppError> {
    let session = session(&state, id)?;
    session.platform.search_jobs(&criteria).await;
    Ok(render(&session))
}

/// POST /api/v1/sessions/:id/jobs/:job_id/apply
pub async fn handle_apply(
    State(state): State<AppState>,
    Path((id, job_id)): Path<(Uuid, u32)>,
) -> Result<Html<String>, AppError> {
    let session = session(&state, id)?;
    let outcome = session.platform.apply_to_job(job_id).await;
    debug!(session_id = %id, job_id, ?outcome, "Apply handled");
    Ok(render(&session))
}

/// POST /api/v1/sessions/:id/jobs/:job_id/save
pub async fn handle_save(
    State(state): State<AppState>,
    Path((id, job_id)): Path<(Uuid, u32)>,
) -> Result<Html<String>, AppError> {
    let session = session(&state, id)?;
    if session.platform.save_job(job_id).is_none() {
        return Err(AppError::NotFound(format!("Job {job_id} not found")));
    }
    Ok(render(&session))
}

/// POST /api/v1/sessions/:id/registration
pub async fn handle_show_registration(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let session = session(&state, id)?;
    session.platform.show_registration_modal();
    Ok(render(&session))
}

/// DELETE /api/v1/sessions/:id/registration
/// Close button and backdrop click.
pub async fn handle_close_registration(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let session = session(&state, id)?;
    session.platform.close_registration_modal();
    Ok(render(&session))
}

/// POST /api/v1/sessions/:id/register
pub async fn handle_register(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(form): Json<RegistrationForm>,
) -> Result<Html<String>, AppError> {
    let session = session(&state, id)?;
    session.platform.handle_registration(&form).await;
    Ok(render(&session))
}

/// POST /api/v1/sessions/:id/plans/:plan
pub async fn handle_select_plan(
    State(state): State<AppState>,
    Path((id, plan)): Path<(Uuid, String)>,
) -> Result<Html<String>, AppError> {
    let session = session(&state, id)?;
    let plan = plan
        .parse::<Plan>()
        .map_err(|_| AppError::Validation(format!("Unknown plan '{plan}'")))?;
    session.platform.select_plan(plan);
    Ok(render(&session))
}

/// PUT /api/v1/sessions/:id/province
pub async fn handle_select_province(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(selection): Json<ProvinceSelection>,
) -> Result<Html<String>, AppError> {
    let session = session(&state, id)?;
    session.platform.update_city_options(&selection.province);
    Ok(render(&session))
}

/// POST /api/v1/sessions/:id/scroll
pub async fn handle_scroll(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(event): Json<ScrollEvent>,
) -> Result<Html<String>, AppError> {
    let session = session(&state, id)?;
    session.platform.handle_scroll(event.offset);
    Ok(render(&session))
}
