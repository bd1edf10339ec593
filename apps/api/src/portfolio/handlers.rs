use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::portfolio::models::Generation;
use crate::portfolio::pipeline::generate_portfolio;
use crate::questionnaire::Answers;
use crate::share::save_share;
use crate::state::AppState;

const INVALID_BODY: &str = "Invalid JSON body";

#[derive(Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub answers: Option<Answers>,
}

#[derive(Serialize)]
pub struct GenerateResponse {
    pub ok: bool,
    pub data: Generation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct SaveRequest {
    #[serde(default)]
    pub data: Option<Generation>,
}

#[derive(Serialize)]
pub struct SaveResponse {
    pub ok: bool,
    pub id: String,
}

/// POST /api/v1/generate
///
/// The credential check runs before the body is looked at. A failed model call
/// still carries the fallback copy in `data`, under a 500.
pub async fn handle_generate(
    State(state): State<AppState>,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<GenerateResponse>), AppError> {
    let generator = state
        .generator
        .clone()
        .ok_or(AppError::MissingCredential("ANTHROPIC_API_KEY"))?;
    let Json(req) = body.map_err(|_| AppError::Validation(INVALID_BODY.to_string()))?;
    let answers = req.answers.unwrap_or_default();

    let outcome = generate_portfolio(generator.as_ref(), &answers).await;
    let status = if outcome.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    Ok((
        status,
        Json(GenerateResponse {
            ok: outcome.is_ok(),
            data: outcome.data,
            raw: outcome.raw,
            error: outcome.error,
        }),
    ))
}

/// POST /api/v1/save
pub async fn handle_save(
    State(state): State<AppState>,
    body: Result<Json<SaveRequest>, JsonRejection>,
) -> Result<Json<SaveResponse>, AppError> {
    let Json(req) = body.map_err(|_| AppError::Validation(INVALID_BODY.to_string()))?;
    let data = req
        .data
        .ok_or_else(|| AppError::Validation("Missing data".to_string()))?;
    let id = save_share(state.shares.as_ref(), &data).await?;
    Ok(Json(SaveResponse { ok: true, id }))
}

/// GET /api/v1/previews/:id
pub async fn handle_get_preview(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Generation>, AppError> {
    state
        .shares
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Preview not found".to_string()))
}
