use axum::{Json, extract::State};
use serde_json::{Value, json};

use super::AppState;

pub async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": "Marketing Agent API is running",
        "name": state.config.server.name,
        "version": state.config.server.version,
        "endpoints": {
            "chat": "/api/chat",
            "summary": "/api/summary",
            "keywords": "/api/keywords",
            "health": "/health"
        }
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
