//! Generation service configuration.
//!
//! Built once at process start and handed to the client explicitly. Can be loaded from
//! `GEMINI_API_KEY`, `GEMINI_MODEL` and `GEMINI_BASE_URL`.

use serde::Deserialize;
use std::env;
use std::fmt;

use crate::error::{InvoiceAssistantError, Result};

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-001";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const MODEL_VAR: &str = "GEMINI_MODEL";
pub const BASE_URL_VAR: &str = "GEMINI_BASE_URL";

/// Deserialize-only so the API key is never written back out.
#[derive(Clone, Deserialize)]
pub struct AssistantConfig {
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl AssistantConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: default_model(),
            base_url: default_base_url(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_empty(API_KEY_VAR)
            .ok_or_else(|| InvoiceAssistantError::Config(format!("{} is not set", API_KEY_VAR)))?;

        let config = Self::new(api_key)
            .with_model(non_empty(MODEL_VAR).unwrap_or_else(default_model))
            .with_base_url(non_empty(BASE_URL_VAR).unwrap_or_else(default_base_url));
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(InvoiceAssistantError::Config("API key is empty".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(InvoiceAssistantError::Config("Model identifier is empty".to_string()));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(InvoiceAssistantError::Config(format!(
                "Base URL must be http(s): {}",
                self.base_url
            )));
        }
        Ok(())
    }

    /// Model path segment as the REST API expects it (`models/<id>`).
    pub fn model_path(&self) -> String {
        if self.model.starts_with("models/") {
            self.model.clone()
        } else {
            format!("models/{}", self.model)
        }
    }
}

impl fmt::Debug for AssistantConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssistantConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}
