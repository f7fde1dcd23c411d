//! Storage collaborators.
//!
//! The pipeline only needs a key-value-style contract, namespaced by
//! identity. Exactly one implementation is chosen at startup (`postgres`
//! or `memory`); there is no per-request backend branching and no silent
//! fallback between backends — a backend failure surfaces as a failed
//! operation.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::Identity;
use crate::models::folder::{Folder, FolderPatch, NewFolder};
use crate::models::tip::{NewTip, Tip, TipPatch};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// CRUD over persisted tips, scoped per identity.
#[async_trait]
pub trait TipStore: Send + Sync {
    /// Newest first.
    async fn list(&self, identity: &Identity) -> Result<Vec<Tip>, StoreError>;
    async fn create(&self, identity: &Identity, tip: NewTip) -> Result<Tip, StoreError>;
    /// `None` when no tip with that id exists under the identity.
    async fn update(
        &self,
        identity: &Identity,
        id: Uuid,
        patch: TipPatch,
    ) -> Result<Option<Tip>, StoreError>;
    /// `false` when no tip with that id exists under the identity.
    async fn delete(&self, identity: &Identity, id: Uuid) -> Result<bool, StoreError>;
}

/// CRUD over user-declared folder records, scoped per identity.
/// Deleting a record does not touch tips that reference its name.
#[async_trait]
pub trait FolderStore: Send + Sync {
    async fn list(&self, identity: &Identity) -> Result<Vec<Folder>, StoreError>;
    async fn create(&self, identity: &Identity, folder: NewFolder) -> Result<Folder, StoreError>;
    async fn update(
        &self,
        identity: &Identity,
        id: Uuid,
        patch: FolderPatch,
    ) -> Result<Option<Folder>, StoreError>;
    async fn delete(&self, identity: &Identity, id: Uuid) -> Result<bool, StoreError>;
}
