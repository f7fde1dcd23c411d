//! Folder Registry — the set of folder names known for an identity.
//!
//! The usable set is the union of explicitly created Folder records and
//! every distinct `folder` value across the identity's tips: a name the
//! classifier invented is a valid folder even when the user never
//! formalized it. Deduplicated, case-sensitive, sorted so prompt
//! construction is deterministic.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::auth::Identity;
use crate::storage::{FolderStore, StoreError, TipStore};

/// The union view, sorted. This snapshot feeds the classification prompt;
/// it may be stale relative to folders created by a concurrent request.
/// The model treats it as advisory context, not a constraint.
pub async fn available_folder_names(
    tips: &dyn TipStore,
    folders: &dyn FolderStore,
    identity: &Identity,
) -> Result<Vec<String>, StoreError> {
    let records = folders.list(identity).await?;
    let stored_tips = tips.list(identity).await?;

    let mut names: BTreeSet<String> = records
        .into_iter()
        .map(|f| f.name.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect();
    names.extend(
        stored_tips
            .into_iter()
            .map(|t| t.folder.trim().to_string())
            .filter(|n| !n.is_empty()),
    );

    Ok(names.into_iter().collect())
}

/// The breakdown served by GET /api/v1/folders/available: the full union
/// plus which names are user records and which only exist on tips.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableFolders {
    pub folders: Vec<String>,
    pub user_folders: Vec<String>,
    pub ai_generated_folders: Vec<String>,
}

pub async fn available_folders(
    tips: &dyn TipStore,
    folders: &dyn FolderStore,
    identity: &Identity,
) -> Result<AvailableFolders, StoreError> {
    let records = folders.list(identity).await?;
    let stored_tips = tips.list(identity).await?;

    let user_folders: BTreeSet<String> = records
        .into_iter()
        .map(|f| f.name.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect();

    let ai_generated: BTreeSet<String> = stored_tips
        .into_iter()
        .map(|t| t.folder.trim().to_string())
        .filter(|n| !n.is_empty() && !user_folders.contains(n))
        .collect();

    let mut all: BTreeSet<String> = user_folders.clone();
    all.extend(ai_generated.iter().cloned());

    Ok(AvailableFolders {
        folders: all.into_iter().collect(),
        user_folders: user_folders.into_iter().collect(),
        ai_generated_folders: ai_generated.into_iter().collect(),
    })
}
