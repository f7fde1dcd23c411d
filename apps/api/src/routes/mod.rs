pub mod health;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::folders::handlers as folder_handlers;
use crate::state::AppState;
use crate::tips::handlers as tip_handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Tips API
        .route(
            "/api/v1/tips",
            get(tip_handlers::list_tips).post(tip_handlers::create_tips),
        )
        .route("/api/v1/tips/preview", post(tip_handlers::preview_tips))
        .route(
            "/api/v1/tips/:id",
            patch(tip_handlers::update_tip).delete(tip_handlers::delete_tip),
        )
        // Folders API
        .route(
            "/api/v1/folders",
            get(folder_handlers::list_folders).post(folder_handlers::create_folder),
        )
        .route(
            "/api/v1/folders/available",
            get(folder_handlers::available),
        )
        .route(
            "/api/v1/folders/:id",
            put(folder_handlers::update_folder).delete(folder_handlers::delete_folder),
        )
        // Upcoming-tip notifications
        .route(
            "/api/v1/notifications",
            get(tip_handlers::list_notifications),
        )
        // Page metadata lookup for the capture form
        .route("/api/v1/url-metadata", get(tip_handlers::url_metadata))
        .with_state(state)
}
