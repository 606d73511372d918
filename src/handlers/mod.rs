/// HTTP route handlers for the marketing agent API
pub mod chat;
pub mod health;
pub mod summary;

#[cfg(test)]
mod test_handlers;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::ApiError;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub config: Arc<Config>,
}

fn data_routes() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat::chat))
        .route("/summary", get(summary::summary))
        .route("/keywords", get(summary::keywords))
}

/// Build the full router. Data routes are served at the root and under `/api`.
pub fn router(state: AppState) -> Router {
    let mut router = Router::new()
        .merge(data_routes())
        .nest("/api", data_routes());

    if let Some(expected) = state.config.server.bearer_token.clone() {
        router = router.layer(middleware::from_fn_with_state(
            Arc::new(expected),
            require_bearer,
        ));
    }

    router
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn require_bearer(
    State(expected): State<Arc<String>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let headers: &HeaderMap = req.headers();
    let authorized = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", expected.as_str()))
        || {
            // Fallback: allow token via query parameter for clients that cannot set headers
            // Accepted keys: access_token, token
            req.uri().query().is_some_and(|q| {
                q.split('&').any(|pair| {
                    pair.split_once('=').is_some_and(|(k, v)| {
                        (k == "access_token" || k == "token") && v == expected.as_str()
                    })
                })
            })
        };
    if !authorized {
        tracing::warn!(path = %req.uri().path(), "Rejected unauthenticated request");
        return ApiError::Unauthorized.into_response();
    }
    next.run(req).await
}
