use futures::future::BoxFuture;
use log::{debug, warn};
use std::fmt;
use std::sync::Arc;

use crate::error::{InvoiceAssistantError, Result};

/// What a text generation service hands back before the client reads it.
///
/// Some SDKs expose the generated text directly, others behind an accessor that has to be
/// called. Anything else is kept for diagnostics and reported as unreadable.
pub enum RawResponse {
    Text(String),
    Accessor(Box<dyn FnOnce() -> Option<String> + Send>),
    Unrecognized(serde_json::Value),
}

impl RawResponse {
    pub fn accessor<F>(f: F) -> Self
    where
        F: FnOnce() -> Option<String> + Send + 'static,
    {
        RawResponse::Accessor(Box::new(f))
    }

    /// Reads the generated text out of whichever shape the service used.
    pub fn into_text(self) -> Result<String> {
        match self {
            RawResponse::Text(text) => Ok(text),
            RawResponse::Accessor(read) => read().ok_or_else(|| {
                InvoiceAssistantError::UnreadableResponse(
                    "text accessor yielded no value".to_string(),
                )
            }),
            RawResponse::Unrecognized(value) => Err(InvoiceAssistantError::UnreadableResponse(
                crate::utils::preview(&value.to_string(), 200),
            )),
        }
    }
}

impl fmt::Debug for RawResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawResponse::Text(text) => f.debug_tuple("Text").field(text).finish(),
            RawResponse::Accessor(_) => f.write_str("Accessor(..)"),
            RawResponse::Unrecognized(value) => {
                f.debug_tuple("Unrecognized").field(value).finish()
            }
        }
    }
}

/// A remote text-completion backend: one prompt in, one response out.
///
/// Transport and service faults must come back as [`InvoiceAssistantError::Upstream`]
/// (or `Http` with the `gemini` feature).
pub trait TextGenerationService: Send + Sync {
    fn submit<'a>(&'a self, model: &'a str, prompt: &'a str) -> BoxFuture<'a, Result<RawResponse>>;
}

/// Sends prompts with a fixed model id and returns plain text.
///
/// Each call is a single round trip: no retries, no caching, nothing kept between calls.
#[derive(Clone)]
pub struct GenerationClient {
    service: Arc<dyn TextGenerationService>,
    model: String,
}

impl GenerationClient {
    pub fn new(service: Arc<dyn TextGenerationService>, model: impl Into<String>) -> Self {
        Self {
            service,
            model: model.into(),
        }
    }

    /// Client backed by the Gemini REST API.
    #[cfg(feature = "gemini")]
    pub fn gemini(config: &crate::config::AssistantConfig) -> Result<Self> {
        config.validate()?;
        let service = crate::llm::gemini::GeminiService::new(config);
        Ok(Self::new(Arc::new(service), config.model_path()))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(
            "Submitting prompt to {} ({} chars)",
            self.model,
            prompt.chars().count()
        );

        let raw = self.service.submit(&self.model, prompt).await?;
        let text = raw.into_text().inspect_err(|e| {
            warn!("Unreadable response from {}: {}", self.model, e);
        })?;

        debug!("Received {} chars from {}", text.chars().count(), self.model);
        Ok(text)
    }
}

impl fmt::Debug for GenerationClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationClient")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}
