use std::sync::Arc;

use crate::crawler::PageCrawler;
use crate::storage::{FolderStore, TipStore};
use crate::tips::assembler::TipPipeline;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Stores and crawler are trait objects so the Postgres and in-memory
/// backends (and the test doubles) slot in without touching handlers.
#[derive(Clone)]
pub struct AppState {
    pub tips: Arc<dyn TipStore>,
    pub folders: Arc<dyn FolderStore>,
    pub crawler: Arc<dyn PageCrawler>,
    pub pipeline: Arc<TipPipeline>,
}
