use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::questionnaire::session::{
    apply_action, generate_for_session, lock_session, FlowAction, PanelEvent, SessionHandle,
    SessionView,
};
use crate::state::AppState;

const INVALID_BODY: &str = "Invalid JSON body";

#[derive(Deserialize)]
pub struct ContinueRequest {
    #[serde(default)]
    pub answer: Option<String>,
}

#[derive(Deserialize)]
pub struct RevisitRequest {
    #[serde(default)]
    pub question_id: Option<String>,
}

#[derive(Deserialize)]
pub struct SuggestionsQuery {
    #[serde(default)]
    pub input: Option<String>,
}

#[derive(Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<&'static str>,
}

/// Malformed ids are indistinguishable from unknown ones.
fn find_session(state: &AppState, id: &str) -> Result<SessionHandle, AppError> {
    Uuid::parse_str(id)
        .ok()
        .and_then(|id| state.sessions.get(id))
        .ok_or_else(|| AppError::NotFound("Session not found".to_string()))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(req)| req)
        .map_err(|_| AppError::Validation(INVALID_BODY.to_string()))
}

/// POST /api/v1/sessions
pub async fn handle_create_session(State(state): State<AppState>) -> Json<SessionView> {
    let handle = state.sessions.create();
    let view = lock_session(&handle).view(None);
    Json(view)
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    let handle = find_session(&state, &id)?;
    let view = lock_session(&handle).view(None);
    Ok(Json(view))
}

/// POST /api/v1/sessions/:id/continue
pub async fn handle_continue(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<ContinueRequest>, JsonRejection>,
) -> Result<Json<SessionView>, AppError> {
    let handle = find_session(&state, &id)?;
    let answer = json_body(body)?
        .answer
        .ok_or_else(|| AppError::Validation("Missing answer".to_string()))?;
    Ok(Json(apply_action(&handle, &FlowAction::Continue(answer))?))
}

/// POST /api/v1/sessions/:id/skip
pub async fn handle_skip(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    let handle = find_session(&state, &id)?;
    Ok(Json(apply_action(&handle, &FlowAction::Skip)?))
}

/// POST /api/v1/sessions/:id/revisit
pub async fn handle_revisit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<RevisitRequest>, JsonRejection>,
) -> Result<Json<SessionView>, AppError> {
    let handle = find_session(&state, &id)?;
    let question_id = json_body(body)?
        .question_id
        .ok_or_else(|| AppError::Validation("Missing question_id".to_string()))?;
    Ok(Json(apply_action(&handle, &FlowAction::Revisit(question_id))?))
}

/// POST /api/v1/sessions/:id/panel
///
/// Body is a tagged event, e.g. `{"event":"type","value":"fin"}` or `{"event":"enter"}`.
pub async fn handle_panel_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<PanelEvent>, JsonRejection>,
) -> Result<Json<SessionView>, AppError> {
    let handle = find_session(&state, &id)?;
    let event = json_body(body)?;
    Ok(Json(apply_action(&handle, &FlowAction::Panel(event))?))
}

/// GET /api/v1/sessions/:id/suggestions?input=
pub async fn handle_suggestions(
    State(state): State<AppState>,
    Path(id): Path<String>,
    params: Result<Query<SuggestionsQuery>, QueryRejection>,
) -> Result<Json<SuggestionsResponse>, AppError> {
    let handle = find_session(&state, &id)?;
    let Query(params) =
        params.map_err(|_| AppError::Validation("Invalid query string".to_string()))?;
    let input = params.input.unwrap_or_default();
    let suggestions = lock_session(&handle).suggestions(&input);
    Ok(Json(SuggestionsResponse { suggestions }))
}

/// POST /api/v1/sessions/:id/generate
pub async fn handle_generate_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    let generator = state
        .generator
        .clone()
        .ok_or(AppError::MissingCredential("ANTHROPIC_API_KEY"))?;
    let handle = find_session(&state, &id)?;
    let view = generate_for_session(handle, generator, state.shares.clone()).await?;
    Ok(Json(view))
}
