use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default folder assigned when classification fails or the model omits one.
/// A stored tip never has an empty folder.
pub const DEFAULT_FOLDER: &str = "General Tips";
/// Mid-scale priority default ("1" highest .. "10" lowest, advisory only).
pub const DEFAULT_PRIORITY: &str = "5";
/// Summary substituted when the model produced nothing usable.
pub const DEFAULT_SUMMARY: &str = "\u{2022} Tip saved for future reference\n\
\u{2022} Content requires manual review\n\
\u{2022} Consider organizing into relevant category";

/// Coarse urgency bucket. Drives sort order in the review views, nothing else.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UrgencyLevel {
    #[serde(rename = "Immediate")]
    Immediate,
    #[serde(rename = "This Week")]
    ThisWeek,
    /// The degradation default — a failed classification must not promote
    /// a tip into the urgent views.
    #[default]
    #[serde(rename = "This Month")]
    ThisMonth,
    #[serde(rename = "Later")]
    Later,
}

impl UrgencyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyLevel::Immediate => "Immediate",
            UrgencyLevel::ThisWeek => "This Week",
            UrgencyLevel::ThisMonth => "This Month",
            UrgencyLevel::Later => "Later",
        }
    }

    /// Lenient parse of a model- or store-provided label. Unknown labels
    /// map to `None` so the caller can substitute the default.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "immediate" => Some(UrgencyLevel::Immediate),
            "this week" => Some(UrgencyLevel::ThisWeek),
            "this month" => Some(UrgencyLevel::ThisMonth),
            "later" => Some(UrgencyLevel::Later),
            _ => None,
        }
    }
}

/// Coarse time-to-act estimate, advisory only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EstimatedTime {
    Quick,
    #[default]
    Medium,
    Long,
}

impl EstimatedTime {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstimatedTime::Quick => "Quick",
            EstimatedTime::Medium => "Medium",
            EstimatedTime::Long => "Long",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "quick" => Some(EstimatedTime::Quick),
            "medium" => Some(EstimatedTime::Medium),
            "long" => Some(EstimatedTime::Long),
            _ => None,
        }
    }
}

/// One captured item: free text or a URL plus the classification metadata
/// derived for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tip {
    pub id: Uuid,
    pub content: String,
    pub url: Option<String>,
    pub title: Option<String>,
    pub relevance_date: Option<NaiveDate>,
    pub relevance_event: Option<String>,
    /// Never empty in a stored record; defaults to `DEFAULT_FOLDER`.
    pub folder: String,
    pub priority: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub urgency_level: UrgencyLevel,
    pub action_required: bool,
    pub estimated_time: EstimatedTime,
    /// Set true when the user dismisses/completes the tip; such records
    /// drop out of the active views but are retained.
    pub is_processed: bool,
    /// Provenance: whether classification succeeded, and if not, why.
    pub ai_processed: bool,
    pub ai_error: Option<String>,
    pub user_context: Option<String>,
    pub needs_more_info: bool,
    pub created_at: DateTime<Utc>,
}

/// A tip as produced by the assembler, before the store assigns an id and
/// creation timestamp. Also the preview payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTip {
    pub content: String,
    pub url: Option<String>,
    pub title: Option<String>,
    pub relevance_date: Option<NaiveDate>,
    pub relevance_event: Option<String>,
    pub folder: String,
    pub priority: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub urgency_level: UrgencyLevel,
    pub action_required: bool,
    pub estimated_time: EstimatedTime,
    pub is_processed: bool,
    pub ai_processed: bool,
    pub ai_error: Option<String>,
    pub user_context: Option<String>,
    pub needs_more_info: bool,
}

impl NewTip {
    /// A bare tip with every advisory field at its fixed default.
    /// Starting point for both the explicit-folder path and the
    /// total-failure fallback.
    pub fn bare(content: impl Into<String>) -> Self {
        NewTip {
            content: content.into(),
            url: None,
            title: None,
            relevance_date: None,
            relevance_event: None,
            folder: DEFAULT_FOLDER.to_string(),
            priority: DEFAULT_PRIORITY.to_string(),
            summary: DEFAULT_SUMMARY.to_string(),
            tags: Vec::new(),
            urgency_level: UrgencyLevel::default(),
            action_required: false,
            estimated_time: EstimatedTime::default(),
            is_processed: false,
            ai_processed: false,
            ai_error: None,
            user_context: None,
            needs_more_info: false,
        }
    }
}

/// Partial update applied via PATCH /api/v1/tips/:id.
/// Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TipPatch {
    pub content: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub relevance_date: Option<NaiveDate>,
    pub relevance_event: Option<String>,
    pub folder: Option<String>,
    pub priority: Option<String>,
    pub summary: Option<String>,
    pub tags: Option<Vec<String>>,
    pub urgency_level: Option<UrgencyLevel>,
    pub action_required: Option<bool>,
    pub estimated_time: Option<EstimatedTime>,
    pub is_processed: Option<bool>,
    pub user_context: Option<String>,
    pub needs_more_info: Option<bool>,
}

impl TipPatch {
    /// Applies the patch in place. An empty `folder` is ignored rather than
    /// stored — the non-empty-folder invariant holds across updates too.
    pub fn apply(self, tip: &mut Tip) {
        if let Some(v) = self.content {
            tip.content = v;
        }
        if let Some(v) = self.url {
            tip.url = Some(v);
        }
        if let Some(v) = self.title {
            tip.title = Some(v);
        }
        if let Some(v) = self.relevance_date {
            tip.relevance_date = Some(v);
        }
        if let Some(v) = self.relevance_event {
            tip.relevance_event = Some(v);
        }
        if let Some(v) = self.folder {
            if !v.trim().is_empty() {
                tip.folder = v;
            }
        }
        if let Some(v) = self.priority {
            tip.priority = v;
        }
        if let Some(v) = self.summary {
            tip.summary = v;
        }
        if let Some(v) = self.tags {
            tip.tags = v;
        }
        if let Some(v) = self.urgency_level {
            tip.urgency_level = v;
        }
        if let Some(v) = self.action_required {
            tip.action_required = v;
        }
        if let Some(v) = self.estimated_time {
            tip.estimated_time = v;
        }
        if let Some(v) = self.is_processed {
            tip.is_processed = v;
        }
        if let Some(v) = self.user_context {
            tip.user_context = Some(v);
        }
        if let Some(v) = self.needs_more_info {
            tip.needs_more_info = v;
        }
    }
}
