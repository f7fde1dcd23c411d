//! Page crawler — best-effort fetch of a URL's title, description, and a
//! text excerpt for prompt context.
//!
//! Deliberately a fetch-and-regex utility, not an HTML parser. It never
//! errors: any failure (timeout, non-2xx, bad URL) degrades to `None` and
//! the submission proceeds without crawled content.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

/// How much page text is carried into the classification prompt.
pub const EXCERPT_MAX_CHARS: usize = 2000;
/// Default bound on one crawl; configurable via `CRAWL_TIMEOUT_SECS`.
pub const DEFAULT_CRAWL_TIMEOUT_SECS: u64 = 10;

static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("title regex"));
static META_DESC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<meta[^>]+(?:name|property)=["'](?:description|og:description)["'][^>]*content=["']([^"']*)["']"#)
        .expect("meta description regex")
});
/// Elements whose contents are noise rather than page text.
const NOISE_TAGS: &[&str] = &["script", "style", "nav", "header", "footer", "aside"];

static DROP_BLOCKS_RE: Lazy<Regex> = Lazy::new(|| {
    let alternation = NOISE_TAGS
        .iter()
        .map(|tag| format!(r"<{tag}[^>]*>.*?</{tag}\s*>"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?is){alternation}")).expect("drop blocks regex")
});
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("tag regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// What a successful crawl yields.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PageContent {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub excerpt: String,
}

/// The crawl collaborator. Carried in `AppState` as `Arc<dyn PageCrawler>`.
#[async_trait]
pub trait PageCrawler: Send + Sync {
    /// Fetches the page, bounded by the crawler's timeout. `None` on any
    /// failure — callers must treat crawled content as optional.
    async fn fetch(&self, url: &str) -> Option<PageContent>;
}

/// Production crawler over reqwest.
#[derive(Clone)]
pub struct HttpCrawler {
    client: reqwest::Client,
}

impl HttpCrawler {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .user_agent("Mozilla/5.0 (compatible; TipStash/0.1)")
                .build()
                .expect("Failed to build HTTP client"),
        }
    }
}

#[async_trait]
impl PageCrawler for HttpCrawler {
    async fn fetch(&self, url: &str) -> Option<PageContent> {
        let url = normalize_url(url);

        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("Crawl failed for {url}: {e}");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!("Crawl of {url} returned {}", response.status());
            return None;
        }

        let html = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Crawl of {url} failed reading body: {e}");
                return None;
            }
        };

        Some(extract_page_content(&url, &html))
    }
}

/// Prepends `https://` when the scheme is missing.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

/// Pulls title, meta description, and a tag-stripped text excerpt out of
/// raw HTML. Pure so it is testable without a network.
pub fn extract_page_content(url: &str, html: &str) -> PageContent {
    let title = TITLE_RE
        .captures(html)
        .map(|c| clean_text(&c[1]))
        .filter(|t| !t.is_empty());

    let description = META_DESC_RE
        .captures(html)
        .map(|c| clean_text(&c[1]))
        .filter(|d| !d.is_empty());

    let body = DROP_BLOCKS_RE.replace_all(html, " ");
    let text = TAG_RE.replace_all(&body, " ");
    let mut excerpt = clean_text(&text);
    if excerpt.chars().count() > EXCERPT_MAX_CHARS {
        excerpt = excerpt.chars().take(EXCERPT_MAX_CHARS).collect();
    }

    PageContent {
        url: url.to_string(),
        title,
        description,
        excerpt,
    }
}

fn clean_text(raw: &str) -> String {
    WHITESPACE_RE.replace_all(raw.trim(), " ").to_string()
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Crawler stub returning a fixed page (or nothing).
    pub struct StubCrawler {
        page: Option<PageContent>,
    }

    impl StubCrawler {
        pub fn with_page(title: &str, excerpt: &str) -> Self {
            StubCrawler {
                page: Some(PageContent {
                    url: "https://example.com".to_string(),
                    title: Some(title.to_string()),
                    description: None,
                    excerpt: excerpt.to_string(),
                }),
            }
        }

        pub fn unreachable() -> Self {
            StubCrawler { page: None }
        }
    }

    #[async_trait]
    impl PageCrawler for StubCrawler {
        async fn fetch(&self, _url: &str) -> Option<PageContent> {
            self.page.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<html><head>
        <title> Rust in Production </title>
        <meta name="description" content="Case studies of Rust at scale">
        <style>body { color: red; }</style>
        </head><body>
        <nav><a href="/">home</a></nav>
        <script>console.log("noise")</script>
        <main><h1>Rust in Production</h1><p>Teams ship faster.</p></main>
        </body></html>"#;

    #[test]
    fn test_extracts_title_and_description() {
        let page = extract_page_content("https://example.com", SAMPLE);
        assert_eq!(page.title.as_deref(), Some("Rust in Production"));
        assert_eq!(
            page.description.as_deref(),
            Some("Case studies of Rust at scale")
        );
    }

    #[test]
    fn test_excerpt_strips_scripts_and_tags() {
        let page = extract_page_content("https://example.com", SAMPLE);
        assert!(page.excerpt.contains("Teams ship faster."));
        assert!(!page.excerpt.contains("console.log"));
        assert!(!page.excerpt.contains("color: red"));
        assert!(!page.excerpt.contains('<'));
    }

    #[test]
    fn test_excerpt_is_capped() {
        let huge = format!("<body>{}</body>", "word ".repeat(3000));
        let page = extract_page_content("https://example.com", &huge);
        assert!(page.excerpt.chars().count() <= EXCERPT_MAX_CHARS);
    }

    #[test]
    fn test_missing_title_is_none() {
        let page = extract_page_content("https://example.com", "<body>hello</body>");
        assert!(page.title.is_none());
    }

    #[test]
    fn test_normalize_url_adds_scheme() {
        assert_eq!(normalize_url("example.com"), "https://example.com");
        assert_eq!(normalize_url("http://a.io"), "http://a.io");
    }
}
