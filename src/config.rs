//! Configuration types for chunk classification.
//!
//! All classification behaviour is controlled through [`ClassificationConfig`],
//! built via its [`ClassificationConfigBuilder`]. Segmentation has no knobs;
//! its threshold is derived from the document itself.

use crate::error::{ClassificationFailure, PdfTopicsError};
use crate::progress::ProgressCallback;
use crate::prompts::TEXT_PLACEHOLDER;
use crate::topic::Topic;
use edgequake_llm::LLMProvider;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Model used when neither the config nor the environment names one.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Configuration for classifying the chunks of one document.
///
/// # Example
/// ```rust
/// use pdf_topics::{ClassificationConfig, LabelPolicy};
///
/// let config = ClassificationConfig::builder()
///     .provider_name("openai")
///     .model("gpt-4o-mini")
///     .label_policy(LabelPolicy::Verbatim)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ClassificationConfig {
    /// LLM model identifier, e.g. "gpt-4o-mini". If None, uses [`DEFAULT_MODEL`].
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// If None along with `provider`, the provider is resolved from the environment.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature. Default: 0.0.
    pub temperature: f32,

    /// Maximum tokens the model may generate per chunk. Default: 16.
    ///
    /// A label is a single word; the cap keeps chatty models from billing
    /// an explanation for every chunk.
    pub max_tokens: usize,

    /// Per-request timeout in seconds. Default: None (the client's own timeout).
    pub api_timeout_secs: Option<u64>,

    /// How raw service responses become labels. Default: [`LabelPolicy::ClosedSet`].
    pub label_policy: LabelPolicy,

    /// Custom prompt template containing `{text}` (and optionally `{labels}`).
    /// If None, uses [`crate::prompts::DEFAULT_CLASSIFICATION_PROMPT`].
    pub prompt_template: Option<String>,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Receives per-chunk events. Default: None.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.0,
            max_tokens: 16,
            api_timeout_secs: None,
            label_policy: LabelPolicy::default(),
            prompt_template: None,
            password: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ClassificationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassificationConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("label_policy", &self.label_policy)
            .field("prompt_template", &self.prompt_template.as_ref().map(|t| t.len()))
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn callback>"),
            )
            .finish()
    }
}

impl ClassificationConfig {
    /// Create a new builder for `ClassificationConfig`.
    pub fn builder() -> ClassificationConfigBuilder {
        ClassificationConfigBuilder {
            config: Self::default(),
        }
    }

    /// The model to request, falling back to [`DEFAULT_MODEL`].
    pub fn model_or_default(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }
}

/// Builder for [`ClassificationConfig`].
pub struct ClassificationConfigBuilder {
    config: ClassificationConfig,
}

impl fmt::Debug for ClassificationConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassificationConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl ClassificationConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = Some(secs);
        self
    }

    pub fn label_policy(mut self, policy: LabelPolicy) -> Self {
        self.config.label_policy = policy;
        self
    }

    pub fn prompt_template(mut self, template: impl Into<String>) -> Self {
        self.config.prompt_template = Some(template.into());
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClassificationConfig, PdfTopicsError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(PdfTopicsError::configuration("max_tokens must be ≥ 1"));
        }
        if c.api_timeout_secs == Some(0) {
            return Err(PdfTopicsError::configuration(
                "API timeout must be ≥ 1 second",
            ));
        }
        if let Some(ref t) = c.prompt_template {
            if !t.contains(TEXT_PLACEHOLDER) {
                return Err(PdfTopicsError::configuration(format!(
                    "prompt template must contain the {TEXT_PLACEHOLDER} placeholder"
                )));
            }
        }
        if matches!(c.provider_name.as_deref(), Some(n) if n.trim().is_empty()) {
            return Err(PdfTopicsError::configuration("provider name is empty"));
        }
        Ok(self.config)
    }
}

// ── Label policy ─────────────────────────────────────────────────────────

/// How a raw service response is turned into the value of the `topic` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LabelPolicy {
    /// Accept only responses naming one of the allowed topics, after
    /// stripping quotes, trailing punctuation and a leading `Topic:`.
    /// Anything else is recorded as `Error`. (default)
    #[default]
    ClosedSet,
    /// Use the trimmed response as the label, whatever it says.
    Verbatim,
}

static RE_LABEL_WRAPPING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)^[\s"'`*]*(?:topic\s*:\s*)?[\s"'`*]*(.*?)[\s"'`*.!]*$"#).unwrap()
});

impl LabelPolicy {
    /// Resolve a raw response against `labels`.
    ///
    /// `chunk` is only used to attribute the failure.
    pub fn resolve(
        &self,
        raw: &str,
        labels: &[Topic],
        chunk: usize,
    ) -> Result<String, ClassificationFailure> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ClassificationFailure::EmptyResponse { chunk });
        }
        match self {
            LabelPolicy::Verbatim => Ok(trimmed.to_string()),
            LabelPolicy::ClosedSet => {
                let core = RE_LABEL_WRAPPING
                    .captures(trimmed)
                    .and_then(|c| c.get(1))
                    .map_or(trimmed, |m| m.as_str());
                Topic::from_label(core)
                    .filter(|t| labels.contains(t))
                    .map(|t| t.as_str().to_string())
                    .ok_or_else(|| ClassificationFailure::UnrecognisedLabel {
                        chunk,
                        response: trimmed.to_string(),
                    })
            }
        }
    }
}
