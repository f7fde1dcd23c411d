use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default folder color when the client does not pick one.
pub const DEFAULT_FOLDER_COLOR: &str = "#3B82F6";

/// A user-declared organizational bucket. Exists independently of whether
/// any tip currently references its name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFolder {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

/// Partial update for PUT /api/v1/folders/:id.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FolderPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

impl FolderPatch {
    /// Applies the patch in place; a blank name is ignored. The caller is
    /// responsible for bumping `updated_at`.
    pub fn apply(self, folder: &mut Folder) {
        if let Some(name) = self.name {
            if !name.trim().is_empty() {
                folder.name = name.trim().to_string();
            }
        }
        if let Some(description) = self.description {
            folder.description = Some(description);
        }
        if let Some(color) = self.color {
            folder.color = color;
        }
    }
}
