//! In-process store behind an explicit handle.
//!
//! This is the demo-mode backend (`STORAGE_BACKEND=memory`) and the test
//! double. State lives inside the struct, never in a module-level static,
//! so concurrent requests share exactly one synchronized handle.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::Identity;
use crate::models::folder::{Folder, FolderPatch, NewFolder, DEFAULT_FOLDER_COLOR};
use crate::models::tip::{NewTip, Tip, TipPatch};
use crate::storage::{FolderStore, StoreError, TipStore};

#[derive(Default)]
pub struct MemoryStore {
    tips: RwLock<HashMap<String, Vec<Tip>>>,
    folders: RwLock<HashMap<String, Vec<Folder>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TipStore for MemoryStore {
    async fn list(&self, identity: &Identity) -> Result<Vec<Tip>, StoreError> {
        let tips = self.tips.read().await;
        let mut out = tips.get(identity.as_str()).cloned().unwrap_or_default();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn create(&self, identity: &Identity, tip: NewTip) -> Result<Tip, StoreError> {
        let tip = Tip {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            content: tip.content,
            url: tip.url,
            title: tip.title,
            relevance_date: tip.relevance_date,
            relevance_event: tip.relevance_event,
            folder: tip.folder,
            priority: tip.priority,
            summary: tip.summary,
            tags: tip.tags,
            urgency_level: tip.urgency_level,
            action_required: tip.action_required,
            estimated_time: tip.estimated_time,
            is_processed: tip.is_processed,
            ai_processed: tip.ai_processed,
            ai_error: tip.ai_error,
            user_context: tip.user_context,
            needs_more_info: tip.needs_more_info,
        };
        let mut tips = self.tips.write().await;
        tips.entry(identity.as_str().to_string())
            .or_default()
            .push(tip.clone());
        Ok(tip)
    }

    async fn update(
        &self,
        identity: &Identity,
        id: Uuid,
        patch: TipPatch,
    ) -> Result<Option<Tip>, StoreError> {
        let mut tips = self.tips.write().await;
        let Some(scoped) = tips.get_mut(identity.as_str()) else {
            return Ok(None);
        };
        let Some(tip) = scoped.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        patch.apply(tip);
        Ok(Some(tip.clone()))
    }

    async fn delete(&self, identity: &Identity, id: Uuid) -> Result<bool, StoreError> {
        let mut tips = self.tips.write().await;
        let Some(scoped) = tips.get_mut(identity.as_str()) else {
            return Ok(false);
        };
        let before = scoped.len();
        scoped.retain(|t| t.id != id);
        Ok(scoped.len() < before)
    }
}

#[async_trait]
impl FolderStore for MemoryStore {
    async fn list(&self, identity: &Identity) -> Result<Vec<Folder>, StoreError> {
        let folders = self.folders.read().await;
        let mut out = folders.get(identity.as_str()).cloned().unwrap_or_default();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn create(&self, identity: &Identity, folder: NewFolder) -> Result<Folder, StoreError> {
        let now = Utc::now();
        let folder = Folder {
            id: Uuid::new_v4(),
            name: folder.name.trim().to_string(),
            description: folder.description,
            color: folder
                .color
                .unwrap_or_else(|| DEFAULT_FOLDER_COLOR.to_string()),
            created_at: now,
            updated_at: now,
        };
        let mut folders = self.folders.write().await;
        folders
            .entry(identity.as_str().to_string())
            .or_default()
            .push(folder.clone());
        Ok(folder)
    }

    async fn update(
        &self,
        identity: &Identity,
        id: Uuid,
        patch: FolderPatch,
    ) -> Result<Option<Folder>, StoreError> {
        let mut folders = self.folders.write().await;
        let Some(scoped) = folders.get_mut(identity.as_str()) else {
            return Ok(None);
        };
        let Some(folder) = scoped.iter_mut().find(|f| f.id == id) else {
            return Ok(None);
        };
        patch.apply(folder);
        folder.updated_at = Utc::now();
        Ok(Some(folder.clone()))
    }

    async fn delete(&self, identity: &Identity, id: Uuid) -> Result<bool, StoreError> {
        let mut folders = self.folders.write().await;
        let Some(scoped) = folders.get_mut(identity.as_str()) else {
            return Ok(false);
        };
        let before = scoped.len();
        scoped.retain(|f| f.id != id);
        Ok(scoped.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tips_are_scoped_per_identity() {
        let store = MemoryStore::new();
        let alice = Identity::new("alice");
        let bob = Identity::new("bob");

        TipStore::create(&store, &alice, NewTip::bare("alice's tip"))
            .await
            .unwrap();

        assert_eq!(TipStore::list(&store, &alice).await.unwrap().len(), 1);
        assert!(TipStore::list(&store, &bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_tip_is_none() {
        let store = MemoryStore::new();
        let identity = Identity::anonymous();
        let result = TipStore::update(&store, &identity, Uuid::new_v4(), TipPatch::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_reports_whether_found() {
        let store = MemoryStore::new();
        let identity = Identity::anonymous();
        let tip = TipStore::create(&store, &identity, NewTip::bare("x"))
            .await
            .unwrap();
        assert!(TipStore::delete(&store, &identity, tip.id).await.unwrap());
        assert!(!TipStore::delete(&store, &identity, tip.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_folder_create_applies_default_color() {
        let store = MemoryStore::new();
        let identity = Identity::anonymous();
        let folder = FolderStore::create(
            &store,
            &identity,
            NewFolder {
                name: "  Reading  ".into(),
                description: None,
                color: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(folder.name, "Reading");
        assert_eq!(folder.color, DEFAULT_FOLDER_COLOR);
    }
}
