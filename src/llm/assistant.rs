use log::{debug, info, warn};
use serde_json::{json, Value};

use crate::aggregator::portfolio_summary;
use crate::error::{InvoiceAssistantError, Result};
use crate::llm::client::GenerationClient;
use crate::normalizer::normalize;
use crate::prompts::PromptRequest;
use crate::schema::{ExtractionRequest, Invoice};
use crate::store::InvoiceStore;

/// Returned in place of model insights when there is nothing to analyse.
pub const NO_DATA_INSIGHT: &str = "No invoice data to generate insights";

/// Runs the extraction, reminder and insight flows against a generation client.
///
/// Input problems are rejected before anything is sent. Every flow either returns a
/// complete result or an error; nothing partial is handed back.
#[derive(Debug, Clone)]
pub struct InvoiceAssistant {
    client: GenerationClient,
}

impl InvoiceAssistant {
    pub fn new(client: GenerationClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &GenerationClient {
        &self.client
    }

    /// Free text to invoice JSON. The parsed object is returned as the model produced it;
    /// see [`crate::schema::ExtractedInvoiceDraft`] for a typed view.
    pub async fn extract_invoice(&self, request: &ExtractionRequest) -> Result<Value> {
        request.validate()?;
        info!("Extracting invoice from {} chars of text", request.text.chars().count());

        let prompt = PromptRequest::Extraction {
            text: &request.text,
        }
        .render();
        let raw = self.client.generate(&prompt).await?;
        normalize(&raw)
    }

    /// Drafts a payment reminder. The text is expected to open with `Subject:`.
    pub async fn reminder_email(&self, invoice: &Invoice) -> Result<String> {
        if !invoice.needs_reminder() {
            debug!("Reminder requested for paid invoice {}", invoice.invoice_number);
        }
        info!("Drafting reminder for invoice {}", invoice.invoice_number);

        let prompt = PromptRequest::Reminder { invoice }.render();
        let text = self.client.generate(&prompt).await?;
        let text = text.trim().to_string();

        if !text.starts_with("Subject:") {
            warn!(
                "Reminder for invoice {} does not start with a Subject line",
                invoice.invoice_number
            );
        }
        Ok(text)
    }

    /// Looks the invoice up first; a missing id or unknown invoice never reaches the model.
    pub async fn reminder_for(&self, store: &dyn InvoiceStore, invoice_id: &str) -> Result<String> {
        if invoice_id.trim().is_empty() {
            return Err(InvoiceAssistantError::InvalidInput(
                "Invoice ID is required".to_string(),
            ));
        }

        let invoice = store
            .find_invoice(invoice_id)
            .await?
            .ok_or_else(|| InvoiceAssistantError::NotFound {
                entity: "Invoice",
                id: invoice_id.to_string(),
            })?;

        self.reminder_email(&invoice).await
    }

    /// Portfolio insights as `{"insights": [...]}`.
    pub async fn portfolio_insights(&self, invoices: &[Invoice]) -> Result<Value> {
        if invoices.is_empty() {
            return Ok(json!({ "insights": [NO_DATA_INSIGHT] }));
        }

        let summary = portfolio_summary(invoices);
        info!(
            "Requesting insights for {} invoices ({} unpaid)",
            summary.total_invoices, summary.unpaid_invoices
        );

        let prompt = PromptRequest::Insight { summary: &summary }.render();
        let raw = self.client.generate(&prompt).await?;
        normalize(&raw)
    }

    pub async fn insights_for_owner(
        &self,
        store: &dyn InvoiceStore,
        owner_id: &str,
    ) -> Result<Value> {
        let invoices = store.invoices_for_owner(owner_id).await?;
        self.portfolio_insights(&invoices).await
    }
}
