//! Literature-review paragraph generation.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::LlmError;
use crate::providers::ModelProvider;

static BOILERPLATE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:certainly!|sure!|here.*?:)\s*").expect("boilerplate pattern is valid")
});

/// The generation prompt for a paper summary.
pub fn review_prompt(summary: &str) -> String {
    format!(
        "Based on this research paper summary, write a sample literature review \
         paragraph for an academic thesis:\n\n{}",
        summary
    )
}

/// Trim `text` and drop a leading "Certainly!", "Sure!" or "Here ...:" opener.
pub fn strip_boilerplate(text: &str) -> String {
    BOILERPLATE_PREFIX.replace(text.trim(), "").into_owned()
}

/// Generate a literature-review paragraph from a paper summary.
pub async fn generate_lit_review(
    provider: &dyn ModelProvider,
    summary: &str,
) -> Result<String, LlmError> {
    let raw = provider.generate(&review_prompt(summary)).await?;
    Ok(strip_boilerplate(&raw))
}
