pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::portfolio::handlers as portfolio;
use crate::questionnaire::handlers as sessions;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Generation & sharing
        .route("/api/v1/generate", post(portfolio::handle_generate))
        .route("/api/v1/save", post(portfolio::handle_save))
        .route("/api/v1/previews/:id", get(portfolio::handle_get_preview))
        // Questionnaire sessions
        .route("/api/v1/sessions", post(sessions::handle_create_session))
        .route("/api/v1/sessions/:id", get(sessions::handle_get_session))
        .route(
            "/api/v1/sessions/:id/continue",
            post(sessions::handle_continue),
        )
        .route("/api/v1/sessions/:id/skip", post(sessions::handle_skip))
        .route(
            "/api/v1/sessions/:id/revisit",
            post(sessions::handle_revisit),
        )
        .route(
            "/api/v1/sessions/:id/panel",
            post(sessions::handle_panel_event),
        )
        .route(
            "/api/v1/sessions/:id/suggestions",
            get(sessions::handle_suggestions),
        )
        .route(
            "/api/v1/sessions/:id/generate",
            post(sessions::handle_generate_session),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    #[tokio::test]
    async fn test_health() {
        let app = build_router(AppState::in_memory(None));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "buildfolio-api");
    }
}
