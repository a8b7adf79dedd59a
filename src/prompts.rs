//! Prompt template for chunk classification.
//!
//! Callers can override the default via
//! [`crate::config::ClassificationConfig::prompt_template`]; the constant here
//! is used only when no override is provided.

use crate::topic::Topic;

/// Placeholder replaced by the comma-separated label set.
pub const LABELS_PLACEHOLDER: &str = "{labels}";

/// Placeholder replaced by the chunk text. Required in every template.
pub const TEXT_PLACEHOLDER: &str = "{text}";

/// Default single-turn classification prompt.
pub const DEFAULT_CLASSIFICATION_PROMPT: &str = "You're a helpful assistant. \
Classify the following text into one of these topics: {labels}.\n\n\
Text: {text}\n\n\
Topic:";

/// Fill a template with the label set and the chunk text.
///
/// The text is substituted last so braces inside the document are never
/// interpreted as placeholders.
pub fn render_prompt(template: &str, labels: &[Topic], text: &str) -> String {
    template
        .replace(LABELS_PLACEHOLDER, &Topic::join(labels))
        .replace(TEXT_PLACEHOLDER, text)
}
