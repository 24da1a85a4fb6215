//! # Invoice Assistant
//!
//! AI-assisted invoicing for small businesses: turn free text into a structured invoice,
//! draft payment reminders, and get short insights about an invoice portfolio.
//!
//! ## Pipeline
//!
//! - **Prompts** ([`prompts`]): fixed templates for extraction, reminders and insights
//! - **Generation client** ([`llm::GenerationClient`]): one round trip to a text
//!   generation service, whatever shape its response comes in
//! - **Normalizer** ([`normalizer`]): strips markdown code fences and parses JSON strictly
//! - **Aggregator** ([`aggregator`]): line totals, invoice totals and portfolio roll-ups
//!
//! Model output is only checked for being parseable JSON. Field types and values are
//! whatever the model returned.
//!
//! ## Example
//!
//! ```rust,ignore
//! use invoice_assistant::*;
//!
//! let config = AssistantConfig::from_env()?;
//! let assistant = InvoiceAssistant::new(GenerationClient::gemini(&config)?);
//!
//! let draft = assistant
//!     .extract_invoice(&ExtractionRequest::new(
//!         "Bill Jane Doe (jane@example.com) for 3 hours of tutoring at $40/h",
//!     ))
//!     .await?;
//! println!("{}", serde_json::to_string_pretty(&draft)?);
//!
//! let summary = portfolio_summary(&invoices);
//! println!("Outstanding: {}", format_amount(summary.total_outstanding));
//! ```

pub mod aggregator;
pub mod config;
pub mod error;
pub mod llm;
pub mod normalizer;
pub mod prompts;
pub mod schema;
pub mod store;
pub mod utils;

pub use aggregator::{
    invoice_totals, line_total, portfolio_summary, recent_invoices, InvoiceTotals,
    PortfolioSummary, RECENT_INVOICE_LIMIT,
};
pub use config::AssistantConfig;
pub use error::{ErrorKind, ErrorPayload, Flow, InvoiceAssistantError, Result};
pub use llm::{
    GenerationClient, InvoiceAssistant, RawResponse, TextGenerationService, NO_DATA_INSIGHT,
};
pub use normalizer::{normalize, strip_code_fences};
pub use prompts::{PromptKind, PromptRequest};
pub use schema::*;
pub use store::{InvoiceStore, MemoryInvoiceStore};
pub use utils::{format_amount, format_local_date};
