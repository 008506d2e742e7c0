use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{FromRequestParts, State},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use ootd_core::{Garment, Preference, ResolvedOptionSet, UserId};
use ootd_suggest::{SuggestionEngine, SuggestionRequest};
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

/// Header set by the upstream auth gateway once the session is verified.
pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SuggestionEngine>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ootd", post(suggest_outfits))
        .route("/wardrobe", get(list_wardrobe))
        .route("/wardrobe-details", get(wardrobe_details))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn serve(state: AppState, bind: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}

/// The caller's user id, taken from `X-User-Id`.
pub struct AuthUser(pub UserId);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<UserId>().ok())
            .map(AuthUser)
            .ok_or(ApiError::Unauthorized)
    }
}

#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    NotFound(&'static str),
    Internal(&'static str),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "No user identity provided"),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

const WARDROBE_NOT_FOUND: &str = "Wardrobe details not found";

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "build": env!("OOTD_BUILD_SHA"),
    }))
}

async fn suggest_outfits(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(preferences): Json<Vec<Preference>>,
) -> Result<Json<ResolvedOptionSet>, ApiError> {
    let req = SuggestionRequest::new(user_id, preferences);
    match state.engine.generate_suggestions(&req).await {
        Ok(set) => Ok(Json(set)),
        Err(e) if e.is_not_found() => {
            info!(user_id, "{e}");
            Err(ApiError::NotFound(WARDROBE_NOT_FOUND))
        }
        Err(e) => {
            error!(user_id, "Failed to generate outfit suggestions: {e}");
            Err(ApiError::Internal("Failed to generate outfit suggestions"))
        }
    }
}

async fn list_wardrobe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Garment>>, ApiError> {
    state.engine.wardrobe(user_id).await.map(Json).map_err(|e| {
        error!(user_id, "Failed to list wardrobe: {e}");
        ApiError::Internal("Failed to load wardrobe")
    })
}

async fn wardrobe_details(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    match state.engine.wardrobe_snapshot(user_id).await {
        Ok(Some(snapshot)) => Ok(Json(json!({ "prompt": snapshot.text }))),
        Ok(None) => Err(ApiError::NotFound(WARDROBE_NOT_FOUND)),
        Err(e) => {
            error!(user_id, "Failed to build wardrobe details: {e}");
            Err(ApiError::Internal("Failed to load wardrobe"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use ootd_suggest::{
        EngineSettings, GenerationParams, MemoryStore, ModelError, SuggestionLedger, TextModel,
    };
    use tower::ServiceExt;

    struct FixedModel(Option<&'static str>);

    #[async_trait]
    impl TextModel for FixedModel {
        async fn generate(&self, _prompt: &str, _params: GenerationParams) -> Result<String, ModelError> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| ModelError::Transport("connection refused".to_string()))
        }
    }

    const REPLY: &str = "OUTFIT OPTION 1:\n- Top: Item 17\n- Bottom: Item 19\n- Footwear: white sneakers\n";

    fn app(reply: Option<&'static str>) -> Router {
        let store = Arc::new(
            MemoryStore::with_garments([
                Garment::new(31, 1).with_category("Shoes"),
                Garment::new(40, 1).with_category("Outerwear"),
                Garment::new(17, 1).with_category("Tops").with_tags("navy linen shirt"),
                Garment::new(50, 1).with_category("Accessories"),
                Garment::new(19, 1).with_category("Bottoms").with_tags("khaki chinos"),
            ])
            .without_shuffle(),
        );
        let engine = SuggestionEngine::new(
            store.clone(),
            store,
            Arc::new(FixedModel(reply)),
            Arc::new(SuggestionLedger::default()),
            EngineSettings::default(),
        );
        create_router(AppState {
            engine: Arc::new(engine),
        })
    }

    fn post_ootd(user: Option<&str>, body: &str) -> Request<Body> {
        let mut b = Request::builder()
            .method("POST")
            .uri("/ootd")
            .header("content-type", "application/json");
        if let Some(u) = user {
            b = b.header(USER_ID_HEADER, u);
        }
        b.body(Body::from(body.to_string())).unwrap()
    }

    fn get(uri: &str, user: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(USER_ID_HEADER, user)
            .body(Body::empty())
            .unwrap()
    }

    async fn json_body(resp: Response) -> serde_json::Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_suggest_returns_resolved_options() {
        let resp = app(Some(REPLY))
            .oneshot(post_ootd(Some("1"), r#"[{"category":"Color","tag":"Blue"}]"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let v = json_body(resp).await;
        let slots = v["Option 1"].as_array().unwrap();
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0]["key"], "Top");
        assert_eq!(slots[0]["clothId"]["id"], 17);
        assert_eq!(slots[2]["suggestion"], "white sneakers");
    }

    #[tokio::test]
    async fn test_missing_identity_is_401() {
        let resp = app(Some(REPLY)).oneshot(post_ootd(None, "[]")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(resp).await["error"], "No user identity provided");

        let resp = app(Some(REPLY))
            .oneshot(post_ootd(Some("not-a-number"), "[]"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_empty_wardrobe_is_404() {
        let resp = app(Some(REPLY)).oneshot(post_ootd(Some("2"), "[]")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(resp).await["error"], "Wardrobe details not found");
    }

    #[tokio::test]
    async fn test_model_failure_is_500() {
        let resp = app(None).oneshot(post_ootd(Some("1"), "[]")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(resp).await["error"],
            "Failed to generate outfit suggestions"
        );
    }

    #[tokio::test]
    async fn test_wardrobe_details() {
        let resp = app(None).oneshot(get("/wardrobe-details", "1")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let prompt = json_body(resp).await["prompt"].as_str().unwrap().to_string();
        assert!(prompt.starts_with("Wardrobe Details:\n"));
        assert!(prompt.contains("Item 17\n"));

        let resp = app(None).oneshot(get("/wardrobe-details", "2")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_wardrobe_is_in_organizer_order() {
        let resp = app(None).oneshot(get("/wardrobe", "1")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let v = json_body(resp).await;
        let ids: Vec<i64> = v
            .as_array()
            .unwrap()
            .iter()
            .map(|g| g["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![17, 19, 31, 50, 40]);
    }
}
