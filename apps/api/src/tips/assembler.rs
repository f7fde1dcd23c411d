//! Tip Assembler — turns one user submission into finished tip records and
//! persists them.
//!
//! The contract that shapes everything here: a submission never fails
//! because the model, the crawler, or the date parser failed. Those stages
//! are advisory; their failures are absorbed into fixed defaults plus a
//! provenance flag (`aiProcessed=false`, `aiError=<cause>`). Only the
//! mandatory stage — persistence — propagates an error.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::auth::Identity;
use crate::crawler::{PageCrawler, PageContent};
use crate::folders::registry;
use crate::llm_client::ModelClient;
use crate::models::tip::{
    EstimatedTime, NewTip, Tip, UrgencyLevel, DEFAULT_FOLDER,
};
use crate::storage::{FolderStore, StoreError, TipStore};
use crate::tips::classify::{classify_batch, classify_single, ClassifiedItem};
use crate::tips::dates::resolve_relative_date;
use crate::tips::title::{derive_title, truncate_label, TITLE_TRUNCATE_CHARS};

/// One incoming capture request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Submission {
    pub content: String,
    /// Explicit folder override — skips classification entirely.
    #[serde(alias = "selectedFolder")]
    pub folder: Option<String>,
    pub url: Option<String>,
}

/// What a persisted submission reports back. Partial failure across a
/// batch is acceptable; the caller gets counts, not a transaction.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOutcome {
    pub tips: Vec<Tip>,
    pub count: usize,
    pub failed: usize,
    pub ai_processed: bool,
}

/// The orchestration core. Collaborators are explicit handles injected at
/// construction — no module-level state.
pub struct TipPipeline {
    model: Arc<dyn ModelClient>,
    crawler: Arc<dyn PageCrawler>,
    tips: Arc<dyn TipStore>,
    folders: Arc<dyn FolderStore>,
}

impl TipPipeline {
    pub fn new(
        model: Arc<dyn ModelClient>,
        crawler: Arc<dyn PageCrawler>,
        tips: Arc<dyn TipStore>,
        folders: Arc<dyn FolderStore>,
    ) -> Self {
        Self {
            model,
            crawler,
            tips,
            folders,
        }
    }

    /// Classifies without persisting — the preview surface.
    pub async fn preview(&self, identity: &Identity, submission: &Submission) -> Vec<NewTip> {
        self.build_tips(identity, submission, Utc::now()).await
    }

    /// Classifies and persists. Returns how many records made it; only a
    /// total persistence failure surfaces as an error.
    pub async fn submit(
        &self,
        identity: &Identity,
        submission: &Submission,
    ) -> Result<SubmitOutcome, StoreError> {
        let new_tips = self.build_tips(identity, submission, Utc::now()).await;
        let ai_processed = new_tips.iter().all(|t| t.ai_processed) && !new_tips.is_empty();

        let mut saved = Vec::with_capacity(new_tips.len());
        let mut failed = 0usize;
        let mut last_error = None;
        for tip in new_tips {
            match self.tips.create(identity, tip).await {
                Ok(tip) => saved.push(tip),
                Err(e) => {
                    warn!("Failed to persist tip: {e}");
                    failed += 1;
                    last_error = Some(e);
                }
            }
        }

        // Nothing persisted at all: the caller must not believe anything
        // was saved.
        if saved.is_empty() {
            if let Some(e) = last_error {
                return Err(e);
            }
        }

        Ok(SubmitOutcome {
            count: saved.len(),
            failed,
            ai_processed,
            tips: saved,
        })
    }

    /// The assembly algorithm. `now` is explicit so date resolution is
    /// reproducible under test.
    async fn build_tips(
        &self,
        identity: &Identity,
        submission: &Submission,
        now: DateTime<Utc>,
    ) -> Vec<NewTip> {
        let today = now.date_naive();
        let content = submission.content.trim();
        let url = submission
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty());

        if content.is_empty() && url.is_none() {
            return Vec::new();
        }

        // Explicit folder override: user intent is unambiguous, so no
        // model call is spent. One bare tip per fragment.
        if let Some(folder) = submission
            .folder
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
        {
            let mut tips: Vec<NewTip> = split_items(content)
                .into_iter()
                .map(|item| {
                    let mut tip = NewTip::bare(item.as_str());
                    tip.title = Some(truncate_label(&item, TITLE_TRUNCATE_CHARS));
                    tip.folder = folder.to_string();
                    tip.url = url.map(String::from);
                    tip
                })
                .collect();
            // URL-only capture: no text to split, but the submission still
            // stands as one tip carrying the URL.
            if tips.is_empty() {
                if let Some(url) = url {
                    let mut tip = NewTip::bare(content);
                    tip.title = Some(derive_title(None, Some(url), content));
                    tip.folder = folder.to_string();
                    tip.url = Some(url.to_string());
                    tips.push(tip);
                }
            }
            return tips;
        }

        // Folder snapshot for prompt context. Advisory: a read failure
        // here must not block classification, unlike persistence below.
        let folder_names = match registry::available_folder_names(
            self.tips.as_ref(),
            self.folders.as_ref(),
            identity,
        )
        .await
        {
            Ok(names) => names,
            Err(e) => {
                warn!("Folder list unavailable for prompt context: {e}");
                Vec::new()
            }
        };

        // A submission carrying its own URL is a single item: crawl first,
        // then classify with the page as context.
        if let Some(url) = url {
            return vec![self.build_single(content, url, &folder_names, today).await];
        }

        // Batch shape: one model call both segments and classifies.
        match classify_batch(self.model.as_ref(), content, &folder_names).await {
            Ok(items) if !items.is_empty() => {
                let mut tips = Vec::with_capacity(items.len());
                for item in items {
                    tips.push(self.finish_item(content, item, today).await);
                }
                tips
            }
            Ok(_) => {
                warn!("Model returned an empty tip list; keeping the submission as one tip");
                vec![self.fallback_tip(content, None, today, "model returned no items")]
            }
            Err(e) => {
                warn!("Classification failed, degrading to defaults: {e}");
                vec![self.fallback_tip(content, None, today, &e.to_string())]
            }
        }
    }

    /// Single-item shape with a prior page crawl.
    async fn build_single(
        &self,
        content: &str,
        url: &str,
        folder_names: &[String],
        today: NaiveDate,
    ) -> NewTip {
        let page = self.crawler.fetch(url).await;

        match classify_single(self.model.as_ref(), content, Some(url), page.as_ref(), folder_names)
            .await
        {
            Ok(item) => {
                let mut tip = self.materialize(content, &item, today);
                tip.url = Some(url.to_string());
                tip.title = Some(preferred_title(page.as_ref(), &item, Some(url), content));
                tip
            }
            Err(e) => {
                warn!("Single-item classification failed, degrading to defaults: {e}");
                let mut tip = self.fallback_tip(content, Some(url), today, &e.to_string());
                if let Some(page_title) = page.as_ref().and_then(|p| p.title.as_deref()) {
                    tip.title = Some(page_title.to_string());
                }
                tip
            }
        }
    }

    /// Finishes one batch item: per-item crawl for title preference, then
    /// field materialization with defaults.
    async fn finish_item(
        &self,
        submission_content: &str,
        item: ClassifiedItem,
        today: NaiveDate,
    ) -> NewTip {
        let url = item
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(String::from);

        let page = match &url {
            Some(u) => self.crawler.fetch(u).await,
            None => None,
        };

        let content = item
            .content
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(submission_content);

        let mut tip = self.materialize(content, &item, today);
        tip.title = Some(preferred_title(page.as_ref(), &item, url.as_deref(), content));
        tip.url = url;
        tip
    }

    /// Structured reply → record fields, substituting a fixed default for
    /// anything the model omitted. A field is never left unset.
    fn materialize(&self, content: &str, item: &ClassifiedItem, today: NaiveDate) -> NewTip {
        let mut tip = NewTip::bare(content);
        tip.ai_processed = true;

        if let Some(category) = item
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
        {
            tip.folder = category.to_string();
        }
        if let Some(priority) = item.priority_string() {
            tip.priority = priority;
        }
        if let Some(summary) = item
            .summary
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            tip.summary = summary.to_string();
        }
        if let Some(tags) = &item.tags {
            tip.tags = tags.clone();
        }
        tip.urgency_level = item
            .urgency
            .as_deref()
            .and_then(UrgencyLevel::parse)
            .unwrap_or_default();
        tip.estimated_time = item
            .estimated_time
            .as_deref()
            .and_then(EstimatedTime::parse)
            .unwrap_or_default();
        tip.action_required = item.action_required.unwrap_or(false);

        // Model-extracted date first, then a relative phrase in the raw
        // content, else none.
        tip.relevance_date = item
            .relevance_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
            .or_else(|| resolve_relative_date(content, today));
        tip.relevance_event = item
            .relevance_event
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(String::from);

        tip
    }

    /// Total model failure still produces a record: fixed safe defaults,
    /// provenance flags set, date resolution still applied (it is pure).
    fn fallback_tip(
        &self,
        content: &str,
        url: Option<&str>,
        today: NaiveDate,
        cause: &str,
    ) -> NewTip {
        let mut tip = NewTip::bare(content);
        tip.url = url.map(String::from);
        tip.title = Some(derive_title(None, url, content));
        tip.folder = DEFAULT_FOLDER.to_string();
        tip.relevance_date = resolve_relative_date(content, today);
        tip.ai_processed = false;
        tip.ai_error = Some(cause.to_string());
        tip
    }
}

/// Item Splitter — the model-free segmentation heuristic: commas and
/// newlines, trimmed, empties dropped.
pub fn split_items(content: &str) -> Vec<String> {
    content
        .split([',', '\n'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

fn preferred_title(
    page: Option<&PageContent>,
    item: &ClassifiedItem,
    url: Option<&str>,
    content: &str,
) -> String {
    let crawled = page.and_then(|p| p.title.as_deref());
    if let Some(title) = crawled.map(str::trim).filter(|t| !t.is_empty()) {
        return title.to_string();
    }
    if let Some(title) = item
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        return title.to_string();
    }
    derive_title(None, url, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::testing::StubCrawler;
    use crate::llm_client::testing::StubModel;
    use crate::models::tip::{DEFAULT_PRIORITY, DEFAULT_SUMMARY};
    use crate::storage::memory::MemoryStore;

    fn pipeline(model: Arc<StubModel>, crawler: StubCrawler) -> (TipPipeline, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let pipeline = TipPipeline::new(
            model,
            Arc::new(crawler),
            store.clone(),
            store.clone(),
        );
        (pipeline, store)
    }

    fn submission(content: &str) -> Submission {
        Submission {
            content: content.to_string(),
            folder: None,
            url: None,
        }
    }

    #[test]
    fn test_split_items() {
        assert_eq!(
            split_items("buy milk, walk dog\n , water plants,"),
            vec!["buy milk", "walk dog", "water plants"]
        );
        assert!(split_items("  ").is_empty());
    }

    #[tokio::test]
    async fn test_empty_submission_produces_zero_tips() {
        let model = Arc::new(StubModel::replying("{}"));
        let (pipeline, _) = pipeline(model.clone(), StubCrawler::unreachable());
        let outcome = pipeline
            .submit(&Identity::anonymous(), &submission("   "))
            .await
            .unwrap();
        assert_eq!(outcome.count, 0);
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_explicit_folder_skips_the_model() {
        let model = Arc::new(StubModel::replying("{}"));
        let (pipeline, _) = pipeline(model.clone(), StubCrawler::unreachable());

        let outcome = pipeline
            .submit(
                &Identity::anonymous(),
                &Submission {
                    content: "buy milk, walk dog".to_string(),
                    folder: Some("Errands".to_string()),
                    url: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(outcome.count, 2);
        assert!(outcome.tips.iter().all(|t| t.folder == "Errands"));
        assert!(outcome.tips.iter().all(|t| !t.ai_processed));
        assert_eq!(outcome.tips[0].title.as_deref(), Some("buy milk"));
        assert_eq!(model.call_count(), 0, "no model call may be spent");
    }

    #[tokio::test]
    async fn test_url_only_submission_with_folder_override_persists_one_tip() {
        let model = Arc::new(StubModel::replying("{}"));
        let (pipeline, store) = pipeline(model.clone(), StubCrawler::unreachable());
        let identity = Identity::anonymous();

        let outcome = pipeline
            .submit(
                &identity,
                &Submission {
                    content: "".to_string(),
                    folder: Some("Reading".to_string()),
                    url: Some("https://example.com/article".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(outcome.count, 1);
        let tip = &outcome.tips[0];
        assert_eq!(tip.folder, "Reading");
        assert_eq!(tip.url.as_deref(), Some("https://example.com/article"));
        assert_eq!(tip.title.as_deref(), Some("example.com"));
        assert_eq!(model.call_count(), 0);
        assert_eq!(
            TipStore::list(store.as_ref(), &identity).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_batch_reply_materializes_every_field() {
        let reply = r#"```json
        {"tips": [
          {"content": "book flights", "title": "Book Flights", "category": "Travel",
           "urgency": "This Week", "priority": 2, "summary": "• a\n• b\n• c",
           "tags": ["trip"], "action_required": true, "estimated_time": "Quick",
           "relevance_date": "2024-07-01", "relevance_event": "vacation", "url": ""},
          {"content": "ramen place"}
        ]}
        ```"#;
        let model = Arc::new(StubModel::replying(reply));
        let (pipeline, _) = pipeline(model.clone(), StubCrawler::unreachable());

        let outcome = pipeline
            .submit(
                &Identity::anonymous(),
                &submission("book flights and that ramen place"),
            )
            .await
            .unwrap();

        assert_eq!(outcome.count, 2);
        assert_eq!(model.call_count(), 1, "batch is one model round trip");

        let flights = &outcome.tips[0];
        assert_eq!(flights.folder, "Travel");
        assert_eq!(flights.priority, "2");
        assert_eq!(flights.urgency_level, UrgencyLevel::ThisWeek);
        assert_eq!(flights.estimated_time, EstimatedTime::Quick);
        assert!(flights.action_required);
        assert_eq!(
            flights.relevance_date,
            NaiveDate::from_ymd_opt(2024, 7, 1)
        );
        assert_eq!(flights.relevance_event.as_deref(), Some("vacation"));
        assert!(flights.ai_processed);

        // The sparse item falls back per-field, never left unset
        let ramen = &outcome.tips[1];
        assert_eq!(ramen.folder, DEFAULT_FOLDER);
        assert_eq!(ramen.priority, DEFAULT_PRIORITY);
        assert_eq!(ramen.summary, DEFAULT_SUMMARY);
        assert_eq!(ramen.urgency_level, UrgencyLevel::ThisMonth);
        assert!(ramen.ai_processed);
    }

    #[tokio::test]
    async fn test_model_failure_still_persists_one_tip() {
        let model = Arc::new(StubModel::unavailable());
        let (pipeline, store) = pipeline(model, StubCrawler::unreachable());
        let identity = Identity::anonymous();

        let outcome = pipeline
            .submit(&identity, &submission("some content"))
            .await
            .unwrap();

        assert_eq!(outcome.count, 1);
        assert!(!outcome.ai_processed);
        let tip = &outcome.tips[0];
        assert!(!tip.ai_processed);
        assert!(tip.ai_error.as_deref().is_some_and(|e| !e.is_empty()));
        assert_eq!(tip.folder, DEFAULT_FOLDER);

        let stored = TipStore::list(store.as_ref(), &identity).await.unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_reply_degrades_like_unavailability() {
        let model = Arc::new(StubModel::replying("Sorry, I cannot produce JSON today."));
        let (pipeline, _) = pipeline(model, StubCrawler::unreachable());

        let outcome = pipeline
            .submit(&Identity::anonymous(), &submission("remember the dentist tomorrow"))
            .await
            .unwrap();

        assert_eq!(outcome.count, 1);
        let tip = &outcome.tips[0];
        assert!(!tip.ai_processed);
        assert_eq!(tip.folder, DEFAULT_FOLDER);
        // Date resolution is pure and survives model failure
        assert!(tip.relevance_date.is_some());
    }

    #[tokio::test]
    async fn test_relative_date_fills_in_when_model_gives_none() {
        let reply = r#"{"tips": [{"content": "dentist tomorrow", "category": "Health"}]}"#;
        let model = Arc::new(StubModel::replying(reply));
        let (pipeline, _) = pipeline(model, StubCrawler::unreachable());

        let outcome = pipeline
            .submit(&Identity::anonymous(), &submission("dentist tomorrow"))
            .await
            .unwrap();

        let tip = &outcome.tips[0];
        assert_eq!(tip.folder, "Health");
        let expected = Utc::now().date_naive() + chrono::Duration::days(1);
        assert_eq!(tip.relevance_date, Some(expected));
    }

    #[tokio::test]
    async fn test_url_submission_prefers_crawled_title() {
        let reply = r#"{"category": "Reading", "priority": 4}"#;
        let model = Arc::new(StubModel::replying(reply));
        let crawler = StubCrawler::with_page("Rust in Production", "Teams ship faster.");
        let (pipeline, _) = pipeline(model.clone(), crawler);

        let outcome = pipeline
            .submit(
                &Identity::anonymous(),
                &Submission {
                    content: "read this".to_string(),
                    folder: None,
                    url: Some("https://example.com/article".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(outcome.count, 1);
        let tip = &outcome.tips[0];
        assert_eq!(tip.title.as_deref(), Some("Rust in Production"));
        assert_eq!(tip.folder, "Reading");
        assert_eq!(tip.url.as_deref(), Some("https://example.com/article"));
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn test_url_submission_with_unreachable_page_uses_hostname() {
        let reply = r#"{"category": "Reading"}"#;
        let model = Arc::new(StubModel::replying(reply));
        let (pipeline, _) = pipeline(model, StubCrawler::unreachable());

        let outcome = pipeline
            .submit(
                &Identity::anonymous(),
                &Submission {
                    content: "".to_string(),
                    folder: None,
                    url: Some("https://www.example.com/post".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(outcome.tips[0].title.as_deref(), Some("example.com"));
    }

    #[tokio::test]
    async fn test_preview_persists_nothing() {
        let reply = r#"{"tips": [{"content": "a", "category": "X"}]}"#;
        let model = Arc::new(StubModel::replying(reply));
        let (pipeline, store) = pipeline(model, StubCrawler::unreachable());
        let identity = Identity::anonymous();

        let previews = pipeline.preview(&identity, &submission("a")).await;
        assert_eq!(previews.len(), 1);
        assert!(TipStore::list(store.as_ref(), &identity)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_folder_is_never_empty() {
        // Blank category in the reply must still yield the default folder
        let reply = r#"{"tips": [{"content": "x", "category": "  "}]}"#;
        let model = Arc::new(StubModel::replying(reply));
        let (pipeline, _) = pipeline(model, StubCrawler::unreachable());

        let outcome = pipeline
            .submit(&Identity::anonymous(), &submission("x"))
            .await
            .unwrap();
        assert_eq!(outcome.tips[0].folder, DEFAULT_FOLDER);
    }
}
