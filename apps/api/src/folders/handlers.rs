//! HTTP surface for folder management.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth;
use crate::errors::AppError;
use crate::folders::registry;
use crate::models::folder::{Folder, FolderPatch, NewFolder};
use crate::state::AppState;

/// GET /api/v1/folders — folder records only; for the union with
/// classifier-assigned names see [`available`].
pub async fn list_folders(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let identity = auth::resolve(&headers);
    let folders = state.folders.list(&identity).await?;
    Ok(Json(json!({ "folders": folders })))
}

/// POST /api/v1/folders
pub async fn create_folder(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(mut new_folder): Json<NewFolder>,
) -> Result<Json<Folder>, AppError> {
    new_folder.name = new_folder.name.trim().to_string();
    if new_folder.name.is_empty() {
        return Err(AppError::Validation("folder name is required".to_string()));
    }

    let identity = auth::resolve(&headers);
    let folder = state.folders.create(&identity, new_folder).await?;
    Ok(Json(folder))
}

/// PUT /api/v1/folders/:id
pub async fn update_folder(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(patch): Json<FolderPatch>,
) -> Result<Json<Folder>, AppError> {
    let identity = auth::resolve(&headers);
    let updated = state.folders.update(&identity, id, patch).await?;
    updated
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("folder {id} not found")))
}

/// DELETE /api/v1/folders/:id — tips keep their folder name; deleting the
/// record only removes it from the managed list.
pub async fn delete_folder(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let identity = auth::resolve(&headers);
    if state.folders.delete(&identity, id).await? {
        Ok(Json(json!({ "success": true })))
    } else {
        Err(AppError::NotFound(format!("folder {id} not found")))
    }
}

/// GET /api/v1/folders/available — the classification vocabulary: folder
/// records unioned with every distinct folder value on stored tips.
pub async fn available(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<registry::AvailableFolders>, AppError> {
    let identity = auth::resolve(&headers);
    let breakdown =
        registry::available_folders(state.tips.as_ref(), state.folders.as_ref(), &identity)
            .await?;
    Ok(Json(breakdown))
}
