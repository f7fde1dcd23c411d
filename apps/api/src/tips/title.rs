//! Title derivation — a deterministic, best-effort label for a tip.
//!
//! Priority order: crawled page title, else URL hostname (leading `www.`
//! stripped), else a short label built from the content itself. The content
//! label is a heuristic, not NLP: strip known filler lead-ins and trailing
//! phrases, then take the first few non-stopword tokens, capitalized. It
//! only has to be stable for the same input, not "correct".

pub const TITLE_TRUNCATE_CHARS: usize = 30;
/// How many content tokens make up a derived label.
const LABEL_TOKENS: usize = 3;

/// Lead-in phrases that carry intent but no subject. Extend the table, not
/// the control flow.
const LEAD_IN_FILLERS: &[&str] = &[
    "remember to",
    "don't forget to",
    "dont forget to",
    "make sure to",
    "check out",
    "take a look at",
    "look into",
    "look at",
    "sign up for",
    "register for",
    "learn about",
    "read about",
    "listen to",
    "go to",
    "visit",
    "try",
    "read",
    "watch",
    "buy",
    "get",
    "pick up",
    "order",
    "book",
    "download",
    "install",
    "review",
    "research",
    "explore",
    "call",
    "email",
    "schedule",
];

/// Trailing phrases that describe circumstance, not subject.
const TRAILING_FILLERS: &[&str] = &[
    "on my way to",
    "on the way to",
    "heading to",
    "when i get a chance",
    "when i get home",
    "when i have time",
    "at some point",
    "sometime soon",
    "before i forget",
    "after work",
    "if possible",
];

const STOPWORDS: &[&str] = &[
    "a", "an", "the", "to", "for", "of", "in", "on", "at", "my", "your", "our", "his", "her",
    "this", "that", "it", "is", "are", "be", "and", "or", "with", "from", "about", "some", "new",
];

/// Shared helper used by the assembler and the review surface.
pub fn derive_title(crawled_title: Option<&str>, url: Option<&str>, content: &str) -> String {
    if let Some(title) = crawled_title.map(str::trim).filter(|t| !t.is_empty()) {
        return title.to_string();
    }

    if let Some(host) = url.and_then(hostname) {
        return host;
    }

    let content = content.trim();
    if content.is_empty() {
        return "Untitled".to_string();
    }

    let label = short_label(content);
    if label.is_empty() {
        truncate_label(content, TITLE_TRUNCATE_CHARS)
    } else {
        label
    }
}

/// Hostname with a leading `www.` stripped, or `None` for unparseable URLs.
pub fn hostname(url: &str) -> Option<String> {
    let url = crate::crawler::normalize_url(url);
    let parsed = reqwest::Url::parse(&url).ok()?;
    let host = parsed.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_string())
}

/// Plain prefix truncation with an ellipsis suffix, used by the
/// explicit-folder path. Char-based so multi-byte content cannot panic.
pub fn truncate_label(content: &str, max_chars: usize) -> String {
    let content = content.trim();
    if content.chars().count() <= max_chars {
        content.to_string()
    } else {
        let prefix: String = content.chars().take(max_chars).collect();
        format!("{prefix}...")
    }
}

/// First few non-stopword tokens of the de-filled content, capitalized.
fn short_label(content: &str) -> String {
    let mut text = content.trim().to_lowercase();

    // Lead-ins can stack ("remember to check out ..."), so strip repeatedly
    loop {
        let mut stripped = false;
        for filler in LEAD_IN_FILLERS {
            if let Some(rest) = text.strip_prefix(filler) {
                if rest.is_empty() || rest.starts_with(' ') {
                    text = rest.trim_start().to_string();
                    stripped = true;
                }
            }
        }
        if !stripped {
            break;
        }
    }

    for filler in TRAILING_FILLERS {
        if let Some(idx) = text.find(filler) {
            text.truncate(idx);
        }
    }

    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|token| !token.is_empty() && !STOPWORDS.contains(token))
        .take(LABEL_TOKENS)
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crawled_title_wins() {
        let title = derive_title(Some(" Ferris's Blog "), Some("https://example.com"), "stuff");
        assert_eq!(title, "Ferris's Blog");
    }

    #[test]
    fn test_hostname_strips_www() {
        let title = derive_title(None, Some("https://www.rust-lang.org/learn"), "content");
        assert_eq!(title, "rust-lang.org");
    }

    #[test]
    fn test_hostname_without_scheme() {
        assert_eq!(hostname("news.ycombinator.com/item?id=1"), Some("news.ycombinator.com".into()));
    }

    #[test]
    fn test_content_label_strips_fillers_and_stopwords() {
        let title = derive_title(None, None, "check out the new ramen place on my way to work");
        assert_eq!(title, "Ramen Place");
    }

    #[test]
    fn test_stacked_lead_ins() {
        let title = derive_title(None, None, "remember to visit grandma");
        assert_eq!(title, "Grandma");
    }

    #[test]
    fn test_empty_content_is_untitled() {
        assert_eq!(derive_title(None, None, "   "), "Untitled");
    }

    #[test]
    fn test_derivation_is_idempotent() {
        let first = derive_title(None, None, "check out the jazz bar downtown");
        let second = derive_title(None, None, "check out the jazz bar downtown");
        assert_eq!(first, second);
    }

    #[test]
    fn test_truncate_label_short_input_unchanged() {
        assert_eq!(truncate_label("buy milk", 30), "buy milk");
    }

    #[test]
    fn test_truncate_label_adds_ellipsis() {
        let long = "a very long piece of content that keeps going";
        let label = truncate_label(long, 30);
        assert_eq!(label.chars().count(), 33);
        assert!(label.ends_with("..."));
    }
}
