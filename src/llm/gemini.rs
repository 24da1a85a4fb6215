use futures::future::{BoxFuture, FutureExt};
use log::{debug, warn};
use reqwest::{Client, StatusCode};

use crate::config::AssistantConfig;
use crate::error::{InvoiceAssistantError, Result};
use crate::llm::client::{RawResponse, TextGenerationService};
use crate::llm::types::{Content, GenerateContentRequest, GenerateContentResponse};
use crate::utils::preview;

/// `generateContent` over HTTPS with an API key.
#[derive(Clone)]
pub struct GeminiService {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiService {
    pub fn new(config: &AssistantConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn generate_content(&self, model: &str, prompt: &str) -> Result<RawResponse> {
        let url = format!("{}/{}:generateContent", self.base_url, model);
        let payload = GenerateContentRequest {
            contents: vec![Content::user(prompt)],
        };

        let res = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .await?;
        let status = res.status();
        let body = res.text().await?;
        into_raw(model, status, &body)
    }
}

/// Maps a `generateContent` HTTP reply onto a [`RawResponse`].
fn into_raw(model: &str, status: StatusCode, body: &str) -> Result<RawResponse> {
    if !status.is_success() {
        return Err(InvoiceAssistantError::Upstream(format!(
            "Gemini API Error (status {}): {}",
            status, body
        )));
    }

    let parsed: GenerateContentResponse = serde_json::from_str(body).map_err(|e| {
        InvoiceAssistantError::UnreadableResponse(format!("{}: {}", e, preview(body, 200)))
    })?;
    match parsed.first_text() {
        Some(text) => Ok(RawResponse::Text(text)),
        None => {
            warn!("Gemini response for {} carried no text part", model);
            Ok(RawResponse::Unrecognized(serde_json::to_value(&parsed)?))
        }
    }
}

impl TextGenerationService for GeminiService {
    fn submit<'a>(&'a self, model: &'a str, prompt: &'a str) -> BoxFuture<'a, Result<RawResponse>> {
        debug!("POST {}/{}:generateContent", self.base_url, model);
        self.generate_content(model, prompt).boxed()
    }
}
