//! Classification Invoker — builds the prompt, makes exactly one model
//! round trip, and recovers a structured reply via the extractor.
//!
//! Failures come back as values (`ClassifyError`), never panics; the
//! assembler turns them into default-classified tips.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::crawler::PageContent;
use crate::llm_client::{CompletionParams, LlmError, ModelClient};
use crate::tips::extract::{extract_json, ExtractError};
use crate::tips::prompts::{
    folder_context, CLASSIFY_BATCH_PROMPT, CLASSIFY_SINGLE_PROMPT, CLASSIFY_SYSTEM,
};

/// Deterministic-leaning sampling for classification.
pub const CLASSIFY_TEMPERATURE: f32 = 0.3;
/// Output budget: the batch reply carries several items.
pub const BATCH_MAX_TOKENS: u32 = 1000;
pub const SINGLE_MAX_TOKENS: u32 = 500;

#[derive(Debug, Error)]
pub enum ClassifyError {
    /// Transport/auth/timeout talking to the model.
    #[error("model unavailable: {0}")]
    Unavailable(#[from] LlmError),

    /// The model replied but no structure could be recovered.
    #[error("{0}")]
    Malformed(#[from] ExtractError),
}

/// One classified item as the model reports it. Every field is optional —
/// the assembler substitutes fixed defaults for anything missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClassifiedItem {
    pub content: Option<String>,
    pub title: Option<String>,
    pub category: Option<String>,
    pub urgency: Option<String>,
    /// The model emits a number or a string; both are accepted.
    pub priority: Option<Value>,
    pub summary: Option<String>,
    pub tags: Option<Vec<String>>,
    pub action_required: Option<bool>,
    pub estimated_time: Option<String>,
    pub relevance_date: Option<String>,
    pub relevance_event: Option<String>,
    pub url: Option<String>,
}

impl ClassifiedItem {
    /// Priority normalized to the numeric-as-string form, when present.
    pub fn priority_string(&self) -> Option<String> {
        match self.priority.as_ref()? {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct BatchReply {
    #[serde(default)]
    tips: Vec<ClassifiedItem>,
}

/// Segments and classifies a whole submission in one model call.
pub async fn classify_batch(
    model: &dyn ModelClient,
    content: &str,
    folder_names: &[String],
) -> Result<Vec<ClassifiedItem>, ClassifyError> {
    let prompt = batch_prompt(content, folder_names);
    let raw = model
        .complete(
            CLASSIFY_SYSTEM,
            &prompt,
            CompletionParams {
                temperature: CLASSIFY_TEMPERATURE,
                max_tokens: BATCH_MAX_TOKENS,
            },
        )
        .await?;
    let reply: BatchReply = extract_json(&raw)?;
    Ok(reply.tips)
}

/// Classifies one item, optionally with crawled page context.
pub async fn classify_single(
    model: &dyn ModelClient,
    content: &str,
    url: Option<&str>,
    page: Option<&PageContent>,
    folder_names: &[String],
) -> Result<ClassifiedItem, ClassifyError> {
    let prompt = single_prompt(content, url, page, folder_names);
    let raw = model
        .complete(
            CLASSIFY_SYSTEM,
            &prompt,
            CompletionParams {
                temperature: CLASSIFY_TEMPERATURE,
                max_tokens: SINGLE_MAX_TOKENS,
            },
        )
        .await?;
    let item: ClassifiedItem = extract_json(&raw)?;
    Ok(item)
}

fn batch_prompt(content: &str, folder_names: &[String]) -> String {
    CLASSIFY_BATCH_PROMPT
        .replace("{content}", content)
        .replace("{folder_list}", &folder_context(folder_names))
}

fn single_prompt(
    content: &str,
    url: Option<&str>,
    page: Option<&PageContent>,
    folder_names: &[String],
) -> String {
    let url_line = url.map(|u| format!("URL: {u}")).unwrap_or_default();
    let page_block = page
        .filter(|p| !p.excerpt.is_empty())
        .map(|p| format!("Webpage content: {}", p.excerpt))
        .unwrap_or_default();
    CLASSIFY_SINGLE_PROMPT
        .replace("{content}", content)
        .replace("{url_line}", &url_line)
        .replace("{page_block}", &page_block)
        .replace("{folder_list}", &folder_context(folder_names))
}
