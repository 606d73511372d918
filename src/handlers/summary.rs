use axum::{Json, extract::State};

use super::AppState;
use crate::models::{KeywordRow, PerformanceSummary};

/// `GET /summary`: weekly totals for the dashboard overview widgets.
pub async fn summary(State(state): State<AppState>) -> Json<PerformanceSummary> {
    Json(state.dispatcher.summary().await)
}

/// `GET /keywords`: top Google Ads keywords by impressions.
pub async fn keywords(State(state): State<AppState>) -> Json<Vec<KeywordRow>> {
    Json(state.dispatcher.keywords().await)
}
