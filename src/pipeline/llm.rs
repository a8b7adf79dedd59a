//! Classification: send one chunk to the LLM and read back a label.
//!
//! [`TopicClassifier`] is the seam between the pipeline and the service.
//! The pipeline only ever sees `classify(text, labels)`, so tests drive it
//! with deterministic stubs and [`LlmTopicClassifier`] is the one
//! implementation that talks to a network.
//!
//! Each call is a single request: no retries, no conversation history.
//! Prompt wording lives in [`crate::prompts`].

use crate::config::ClassificationConfig;
use crate::error::{ClassificationFailure, PdfTopicsError};
use crate::prompts::{render_prompt, DEFAULT_CLASSIFICATION_PROMPT};
use crate::topic::Topic;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Something that can assign one of `labels` to a text.
///
/// Implementations return the service's raw answer; the pipeline applies
/// the configured [`crate::config::LabelPolicy`]. Failures carry `chunk: 0`
/// and are re-attributed by the caller.
#[async_trait]
pub trait TopicClassifier: Send + Sync {
    async fn classify(&self, text: &str, labels: &[Topic]) -> Result<String, ClassificationFailure>;
}

/// [`TopicClassifier`] backed by an `edgequake-llm` chat provider.
pub struct LlmTopicClassifier {
    provider: Arc<dyn LLMProvider>,
    template: String,
    options: CompletionOptions,
    timeout: Option<Duration>,
}

impl LlmTopicClassifier {
    /// Wrap an already-configured provider.
    pub fn new(provider: Arc<dyn LLMProvider>, config: &ClassificationConfig) -> Self {
        Self {
            provider,
            template: config
                .prompt_template
                .clone()
                .unwrap_or_else(|| DEFAULT_CLASSIFICATION_PROMPT.to_string()),
            options: build_options(config),
            timeout: config.api_timeout_secs.map(Duration::from_secs),
        }
    }

    /// Resolve the provider described by `config` and wrap it.
    ///
    /// Fails with [`PdfTopicsError::Configuration`] when the credential the
    /// provider needs is not set.
    pub fn from_config(config: &ClassificationConfig) -> Result<Self, PdfTopicsError> {
        let provider = resolve_provider(config)?;
        Ok(Self::new(provider, config))
    }
}

#[async_trait]
impl TopicClassifier for LlmTopicClassifier {
    async fn classify(&self, text: &str, labels: &[Topic]) -> Result<String, ClassificationFailure> {
        let messages = vec![ChatMessage::user(render_prompt(&self.template, labels, text))];
        let request = self.provider.chat(&messages, Some(&self.options));

        let response = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, request).await.map_err(|_| {
                ClassificationFailure::Timeout {
                    chunk: 0,
                    secs: limit.as_secs(),
                }
            })?,
            None => request.await,
        }
        .map_err(|e| ClassificationFailure::Service {
            chunk: 0,
            detail: e.to_string(),
        })?;

        debug!(
            "{} input tokens, {} output tokens",
            response.prompt_tokens, response.completion_tokens
        );
        Ok(response.content.trim().to_string())
    }
}

/// Build `CompletionOptions` from the classification config.
fn build_options(config: &ClassificationConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

/// Environment variables any one of which satisfies a named provider.
///
/// Empty for providers that run locally without a key, and for gemini,
/// which can also authenticate through VertexAI and `gcloud`.
pub fn credential_env_vars(provider: &str) -> &'static [&'static str] {
    match provider.to_lowercase().as_str() {
        "openai" => &["OPENAI_API_KEY"],
        "anthropic" => &["ANTHROPIC_API_KEY"],
        "azure" => &["AZURE_OPENAI_CONTENTGEN_API_KEY", "AZURE_OPENAI_API_KEY"],
        "mistral" => &["MISTRAL_API_KEY"],
        "openrouter" => &["OPENROUTER_API_KEY"],
        "xai" => &["XAI_API_KEY"],
        _ => &[],
    }
}

/// Fail fast when none of the keys `provider` accepts is set.
pub fn require_credential(provider: &str) -> Result<(), PdfTopicsError> {
    let vars = credential_env_vars(provider);
    if vars.is_empty() {
        return Ok(());
    }
    let present = vars
        .iter()
        .any(|var| matches!(std::env::var(var), Ok(v) if !v.trim().is_empty()));
    if present {
        Ok(())
    } else {
        Err(PdfTopicsError::configuration(format!(
            "{} is not set.\nExport it before running: export {}=...",
            vars.join(" or "),
            vars[vars.len() - 1]
        )))
    }
}

/// Whether the user selected the mock provider through the environment.
fn mock_requested() -> bool {
    std::env::var("EDGEQUAKE_LLM_PROVIDER").is_ok_and(|p| p.trim().eq_ignore_ascii_case("mock"))
}

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, PdfTopicsError> {
    require_credential(provider_name)?;
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        PdfTopicsError::configuration(format!(
            "LLM provider '{provider_name}' could not be created: {e}"
        ))
    })
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`), used as-is.
/// 2. **Named provider** (`config.provider_name`) with `config.model`.
/// 3. **Environment pair** `EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`.
/// 4. **OpenAI** when `OPENAI_API_KEY` is set.
/// 5. **Auto-detection** via [`ProviderFactory::from_env`].
///
/// Auto-detection falls back to a mock provider when it finds no
/// credential. That fallback is rejected unless `EDGEQUAKE_LLM_PROVIDER=mock`
/// asked for it; `provider_name("mock")` goes through step 2 and is honoured.
pub fn resolve_provider(config: &ClassificationConfig) -> Result<Arc<dyn LLMProvider>, PdfTopicsError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        return create_provider(name, config.model_or_default());
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            return create_provider("openai", config.model_or_default());
        }
    }

    let (llm_provider, _embedding) = ProviderFactory::from_env().map_err(|e| {
        PdfTopicsError::configuration(format!(
            "No LLM provider could be auto-detected from environment.\n\
             Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or pass --provider.\n\
             Error: {e}"
        ))
    })?;

    if llm_provider.name() == "mock" && !mock_requested() {
        return Err(PdfTopicsError::configuration(
            "No LLM credential found in the environment.\n\
             Set OPENAI_API_KEY, ANTHROPIC_API_KEY, GEMINI_API_KEY, or pass --provider.",
        ));
    }

    Ok(llm_provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_options_defaults() {
        let config = ClassificationConfig::default();
        let opts = build_options(&config);
        assert_eq!(opts.temperature, Some(0.0));
        assert_eq!(opts.max_tokens, Some(16));
    }

    #[test]
    fn credential_vars_are_known_for_hosted_providers() {
        assert_eq!(credential_env_vars("openai"), ["OPENAI_API_KEY"]);
        assert_eq!(credential_env_vars("Anthropic"), ["ANTHROPIC_API_KEY"]);
        assert!(credential_env_vars("ollama").is_empty());
    }

    #[test]
    fn gemini_is_not_pre_checked() {
        // GOOGLE_API_KEY and VertexAI logins are valid too.
        assert!(credential_env_vars("gemini").is_empty());
        assert!(require_credential("gemini").is_ok());
    }

    #[test]
    fn azure_accepts_either_key() {
        std::env::remove_var("AZURE_OPENAI_API_KEY");
        std::env::set_var("AZURE_OPENAI_CONTENTGEN_API_KEY", "k");
        let result = require_credential("azure");
        std::env::remove_var("AZURE_OPENAI_CONTENTGEN_API_KEY");
        assert!(result.is_ok());

        let err = require_credential("azure").unwrap_err();
        assert!(err.to_string().contains("AZURE_OPENAI_API_KEY"), "got: {err}");
    }

    #[test]
    fn explicit_mock_provider_is_honoured() {
        let config = ClassificationConfig::builder()
            .provider_name("mock")
            .build()
            .unwrap();
        let provider = resolve_provider(&config).unwrap();
        assert_eq!(provider.name(), "mock");
    }

    #[test]
    fn missing_credential_is_a_configuration_error() {
        // A provider name the tests never export a key for.
        std::env::remove_var("OPENROUTER_API_KEY");
        let err = require_credential("openrouter").unwrap_err();
        assert!(matches!(err, PdfTopicsError::Configuration { .. }));
        assert!(err.to_string().contains("OPENROUTER_API_KEY"));
    }

    #[test]
    fn local_providers_need_no_credential() {
        assert!(require_credential("ollama").is_ok());
    }

    #[test]
    fn named_provider_without_key_fails_fast() {
        std::env::remove_var("MISTRAL_API_KEY");
        let config = ClassificationConfig::builder()
            .provider_name("mistral")
            .build()
            .unwrap();
        assert!(matches!(
            LlmTopicClassifier::from_config(&config),
            Err(PdfTopicsError::Configuration { .. })
        ));
    }
}
