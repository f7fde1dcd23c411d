//! HTTP surface for tips: capture, preview, listing, edits, notifications,
//! and URL metadata lookup.

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth;
use crate::errors::AppError;
use crate::models::tip::{Tip, TipPatch};
use crate::state::AppState;
use crate::tips::assembler::Submission;

/// How far ahead a dated tip counts as "upcoming".
pub const NOTIFICATION_HORIZON_DAYS: i64 = 7;
const NOTIFICATION_SNIPPET_CHARS: usize = 50;

#[derive(Debug, Serialize)]
pub struct TipListResponse {
    pub tips: Vec<Tip>,
    pub count: usize,
}

/// GET /api/v1/tips
pub async fn list_tips(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TipListResponse>, AppError> {
    let identity = auth::resolve(&headers);
    let tips = state.tips.list(&identity).await?;
    let count = tips.len();
    Ok(Json(TipListResponse { tips, count }))
}

/// POST /api/v1/tips — the capture endpoint. Classification failures do
/// not fail the request; only storage errors do.
pub async fn create_tips(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(submission): Json<Submission>,
) -> Result<Json<Value>, AppError> {
    if submission.content.trim().is_empty() && submission.url.as_deref().map_or(true, |u| u.trim().is_empty()) {
        return Err(AppError::Validation(
            "content or url is required".to_string(),
        ));
    }

    let identity = auth::resolve(&headers);
    let outcome = state.pipeline.submit(&identity, &submission).await?;
    info!(
        count = outcome.count,
        failed = outcome.failed,
        ai_processed = outcome.ai_processed,
        "Tips captured"
    );
    Ok(Json(json!({
        "tips": outcome.tips,
        "count": outcome.count,
        "aiProcessed": outcome.ai_processed,
    })))
}

/// POST /api/v1/tips/preview — same assembly, nothing persisted.
pub async fn preview_tips(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(submission): Json<Submission>,
) -> Result<Json<Value>, AppError> {
    let identity = auth::resolve(&headers);
    let tips = state.pipeline.preview(&identity, &submission).await;
    Ok(Json(json!({ "tips": tips })))
}

/// PATCH /api/v1/tips/:id
pub async fn update_tip(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(patch): Json<TipPatch>,
) -> Result<Json<Tip>, AppError> {
    let identity = auth::resolve(&headers);
    let updated = state.tips.update(&identity, id, patch).await?;
    updated
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("tip {id} not found")))
}

/// DELETE /api/v1/tips/:id
pub async fn delete_tip(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let identity = auth::resolve(&headers);
    if state.tips.delete(&identity, id).await? {
        Ok(Json(json!({ "success": true })))
    } else {
        Err(AppError::NotFound(format!("tip {id} not found")))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: &'static str,
    pub message: String,
    pub relevance_date: chrono::NaiveDate,
    pub tip_id: Uuid,
}

/// Unprocessed tips whose relevance date falls within the horizon, today
/// included, mapped to notification objects.
fn upcoming_notifications(tips: Vec<Tip>, today: chrono::NaiveDate) -> Vec<Notification> {
    tips.into_iter()
        .filter(|tip| !tip.is_processed)
        .filter_map(|tip| {
            let date = tip.relevance_date?;
            let days_out = (date - today).num_days();
            if !(0..=NOTIFICATION_HORIZON_DAYS).contains(&days_out) {
                return None;
            }
            let snippet: String = tip.content.chars().take(NOTIFICATION_SNIPPET_CHARS).collect();
            Some(Notification {
                id: tip.id,
                kind: "urgent_tip",
                title: "Tip needs attention",
                message: format!("Tip \"{snippet}...\" is relevant on {date}"),
                relevance_date: date,
                tip_id: tip.id,
            })
        })
        .collect()
}

/// GET /api/v1/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let identity = auth::resolve(&headers);
    let tips = state.tips.list(&identity).await?;
    let notifications = upcoming_notifications(tips, Utc::now().date_naive());
    let count = notifications.len();
    Ok(Json(json!({ "notifications": notifications, "count": count })))
}

#[derive(Debug, Deserialize)]
pub struct MetadataQuery {
    pub url: String,
}

/// GET /api/v1/url-metadata?url=…
pub async fn url_metadata(
    State(state): State<AppState>,
    Query(query): Query<MetadataQuery>,
) -> Result<Json<crate::crawler::PageContent>, AppError> {
    if query.url.trim().is_empty() {
        return Err(AppError::Validation("url is required".to_string()));
    }
    state
        .crawler
        .fetch(query.url.trim())
        .await
        .map(Json)
        .ok_or_else(|| AppError::Crawl(format!("could not fetch {}", query.url)))
}
