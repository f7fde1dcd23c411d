// Classification prompt templates.
// All prompts used by the tip pipeline are defined here.

pub const CLASSIFY_SYSTEM: &str = "\
You are a helpful assistant that parses free-form notes into tips and \
categorizes them. You MUST respond with valid JSON only — no markdown \
fences, no explanations, no surrounding prose.";

/// One submission, one model call: the model both segments the batch and
/// classifies every item. `{content}` and `{folder_list}` are substituted.
pub const CLASSIFY_BATCH_PROMPT: &str = r#"Parse this content into multiple separate tips and categorize them appropriately.

Content: {content}

{folder_list}

Provide a JSON response with exactly this structure:
{
  "tips": [
    {
      "content": "individual tip content",
      "title": "short descriptive title",
      "category": "folder name (use existing custom folders when appropriate, or create meaningful new ones)",
      "urgency": "one of: Immediate, This Week, This Month, Later",
      "priority": 1-10,
      "summary": "exactly 3 bullet points summarizing this tip, each starting with • and being a complete sentence",
      "tags": ["short", "labels"],
      "action_required": true or false,
      "estimated_time": "one of: Quick, Medium, Long",
      "relevance_date": "YYYY-MM-DD if the tip mentions an explicit date, otherwise null",
      "relevance_event": "what happens on that date, otherwise null",
      "url": "extract any URL from the content if present, otherwise empty string"
    }
  ]
}

Guidelines:
- Split content by commas, "and", "or", or other logical separators
- Each tip should be a distinct item or location
- Group related tips under the same folder name
- Use existing custom folders when content fits well
- Create meaningful folder names for new categories
- Each tip must have its own summary with exactly 3 bullet points
- Extract URLs from content and include them in the url field
- Return ONLY the JSON object — nothing else"#;

/// One item, optionally with crawled page context. `{content}`,
/// `{url_line}`, `{page_block}`, and `{folder_list}` are substituted.
pub const CLASSIFY_SINGLE_PROMPT: &str = r#"Analyze this tip and categorize it appropriately.

Tip content: {content}
{url_line}
{page_block}
{folder_list}

Provide a JSON response with exactly this structure:
{
  "category": "specific folder name based on content. If the content fits well with one of the available custom folders, use that folder name. Otherwise, create a new meaningful folder name (e.g., 'Design Resources', 'Programming Tips', 'Business Strategy')",
  "urgency": "one of: Immediate, This Week, This Month, Later",
  "priority": 1-10,
  "summary": "exactly 3 bullet points summarizing the webpage content, each starting with • and being a complete sentence. If no webpage content, summarize the tip content itself",
  "tags": ["short", "labels"],
  "action_required": true or false,
  "estimated_time": "one of: Quick, Medium, Long",
  "relevance_date": "YYYY-MM-DD if the tip mentions an explicit date, otherwise null",
  "relevance_event": "what happens on that date, otherwise null"
}

Focus on using existing custom folders when the content fits well, or creating meaningful, specific folder names that group related content together. Return ONLY the JSON object — nothing else."#;

/// Renders the current folder snapshot for prompt context, so the model
/// prefers reusing existing folders over inventing near-duplicates.
pub fn folder_context(names: &[String]) -> String {
    if names.is_empty() {
        "No custom folders available".to_string()
    } else {
        format!("Available custom folders: {}", names.join(", "))
    }
}
