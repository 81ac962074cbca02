//! papermeta-llm — LLM backend abstraction layer.
//! Implements the LlmBackend trait, the concrete chat-completion backends,
//! per-call audit logging and a scripted mock for tests.

pub mod audit;
pub mod backend;
pub mod mock;

use std::sync::Arc;
use std::time::Duration;

use papermeta_common::{config::LlmConfig, LlmProvider};
use secrecy::SecretString;

pub use backend::{LlmBackend, LlmError, LlmRequest, LlmResponse, Message};

/// Build the backend described by `config`.
///
/// Returns `Ok(None)` when the provider needs a credential and none was
/// supplied; extraction then records a configuration error per document.
pub fn build_backend(
    config: &LlmConfig,
    api_key: Option<SecretString>,
) -> Result<Option<Arc<dyn LlmBackend>>, LlmError> {
    let timeout = Duration::from_secs(config.timeout_secs);

    let backend: Arc<dyn LlmBackend> = match config.provider {
        LlmProvider::OpenAi => {
            let Some(key) = api_key else {
                tracing::warn!(
                    env = %config.api_key_env,
                    "API key not found in environment; metadata extraction will fail until it is set"
                );
                return Ok(None);
            };
            Arc::new(
                backend::OpenAiBackend::new(key, &config.model)
                    .with_base_url(config.base_url())
                    .with_timeout(timeout)?,
            )
        }
        LlmProvider::OpenAiCompatible => Arc::new(
            backend::OpenAiCompatibleBackend::new(config.base_url(), &config.model, api_key)
                .with_timeout(timeout)?,
        ),
        LlmProvider::Ollama => Arc::new(
            backend::OpenAiCompatibleBackend::new(config.base_url(), &config.model, None)
                .local()
                .with_timeout(timeout)?,
        ),
    };

    tracing::info!(
        model = backend.model_id(),
        is_local = backend.is_local(),
        "LLM backend configured"
    );
    Ok(Some(backend))
}
