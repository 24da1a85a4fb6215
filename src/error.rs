use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InvoiceAssistantError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Generation service returned a response with no readable text: {0}")]
    UnreadableResponse(String),

    #[error("Model output is not valid JSON: {message} (payload: {preview})")]
    Parse { message: String, preview: String },

    #[error("Generation service call failed: {0}")]
    Upstream(String),

    #[cfg(feature = "gemini")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invoice store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Coarse classification a request layer can map onto response statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Input,
    NotFound,
    UnreadableResponse,
    Parse,
    Upstream,
    Internal,
}

impl InvoiceAssistantError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::Input,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::UnreadableResponse(_) => ErrorKind::UnreadableResponse,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::Upstream(_) => ErrorKind::Upstream,
            #[cfg(feature = "gemini")]
            Self::Http(_) => ErrorKind::Upstream,
            Self::Store(_) | Self::Config(_) | Self::SerializationError(_) => ErrorKind::Internal,
        }
    }

    /// True for failures rejected before any external call was attempted.
    pub fn is_client_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::Input | ErrorKind::NotFound)
    }
}

pub type Result<T> = std::result::Result<T, InvoiceAssistantError>;

/// The request flow an error surfaced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flow {
    Extraction,
    Reminder,
    Insight,
}

impl Flow {
    fn failure_message(self) -> &'static str {
        match self {
            Flow::Extraction => "Failed to parse invoice data from text.",
            Flow::Reminder => "Failed to generate reminder email.",
            Flow::Insight => "Failed to generate dashboard insights.",
        }
    }
}

/// Generic failure body handed back to callers: `{ "message": ..., "details": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorPayload {
    pub fn from_error(flow: Flow, err: &InvoiceAssistantError) -> Self {
        match err {
            InvoiceAssistantError::InvalidInput(msg) => Self {
                message: msg.clone(),
                details: None,
            },
            InvoiceAssistantError::NotFound { entity, .. } => Self {
                message: format!("{} not found", entity),
                details: None,
            },
            other => Self {
                message: flow.failure_message().to_string(),
                details: Some(other.to_string()),
            },
        }
    }
}
