use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::aggregator::{invoice_totals, line_total, InvoiceTotals};
use crate::error::{InvoiceAssistantError, Result};

/// Free text submitted for extraction. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionRequest {
    #[serde(default)]
    pub text: String,
}

impl ExtractionRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(InvoiceAssistantError::InvalidInput(
                "Text is required".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub name: String,
    pub quantity: f64,
    pub unit_price: f64,
    #[serde(default)]
    pub tax_percent: f64,
}

impl LineItem {
    pub fn new(name: impl Into<String>, quantity: f64, unit_price: f64, tax_percent: f64) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit_price,
            tax_percent,
        }
    }

    /// `quantity * unit_price * (1 + tax_percent / 100)`, unrounded.
    pub fn total(&self) -> f64 {
        line_total(self)
    }
}

/// Line item as proposed by the model. Same shape as [`LineItem`]; the model is not asked
/// for tax, so `tax_percent` is usually absent and defaults to 0.
pub type LineItemDraft = LineItem;

/// Structured invoice proposed by the model from free text.
///
/// The extraction flow itself returns the parsed JSON untouched. This type is for callers
/// that decide to keep the draft and seed an invoice from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedInvoiceDraft {
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub items: Vec<LineItemDraft>,
}

impl ExtractedInvoiceDraft {
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn client(&self) -> ClientParty {
        ClientParty {
            client_name: self.client_name.clone(),
            email: self.email.clone(),
            address: self.address.clone(),
            phone: None,
        }
    }

    pub fn into_line_items(self) -> Vec<LineItem> {
        self.items
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessParty {
    #[serde(default)]
    pub business_name: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientParty {
    #[serde(default)]
    pub client_name: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// Payment status label. The label set is owned by the store; anything other than the
/// three well-known values is carried through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InvoiceStatus {
    Paid,
    #[default]
    Pending,
    Overdue,
    Other(String),
}

impl InvoiceStatus {
    pub fn is_paid(&self) -> bool {
        matches!(self, InvoiceStatus::Paid)
    }

    pub fn as_str(&self) -> &str {
        match self {
            InvoiceStatus::Paid => "Paid",
            InvoiceStatus::Pending => "Pending",
            InvoiceStatus::Overdue => "Overdue",
            InvoiceStatus::Other(label) => label,
        }
    }
}

impl From<String> for InvoiceStatus {
    fn from(label: String) -> Self {
        match label.as_str() {
            "Paid" => InvoiceStatus::Paid,
            "Pending" => InvoiceStatus::Pending,
            "Overdue" => InvoiceStatus::Overdue,
            _ => InvoiceStatus::Other(label),
        }
    }
}

impl From<&str> for InvoiceStatus {
    fn from(label: &str) -> Self {
        Self::from(label.to_string())
    }
}

impl From<InvoiceStatus> for String {
    fn from(status: InvoiceStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted invoice as handed over by the store.
///
/// `subtotal`, `tax_total` and `total` are derived from `items` and can only change
/// through [`Invoice::set_items`] or [`Invoice::refresh_totals`]. Totals carried by a
/// stored record are ignored on read and recomputed from its items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "InvoiceRecord")]
pub struct Invoice {
    #[serde(default)]
    pub id: String,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub bill_from: BusinessParty,
    #[serde(default)]
    pub bill_to: ClientParty,
    items: Vec<LineItem>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub payment_terms: Option<String>,
    #[serde(default)]
    pub status: InvoiceStatus,
    subtotal: f64,
    tax_total: f64,
    total: f64,
}

/// Stored shape of an [`Invoice`], without the derived fields.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvoiceRecord {
    #[serde(default)]
    id: String,
    invoice_number: String,
    invoice_date: NaiveDate,
    due_date: NaiveDate,
    #[serde(default)]
    bill_from: BusinessParty,
    #[serde(default)]
    bill_to: ClientParty,
    #[serde(default)]
    items: Vec<LineItem>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    payment_terms: Option<String>,
    #[serde(default)]
    status: InvoiceStatus,
}

impl From<InvoiceRecord> for Invoice {
    fn from(record: InvoiceRecord) -> Self {
        let mut invoice = Invoice::new(
            record.id,
            record.invoice_number,
            record.invoice_date,
            record.due_date,
            record.items,
        );
        invoice.bill_from = record.bill_from;
        invoice.bill_to = record.bill_to;
        invoice.notes = record.notes;
        invoice.payment_terms = record.payment_terms;
        invoice.status = record.status;
        invoice
    }
}

impl Invoice {
    pub fn new(
        id: impl Into<String>,
        invoice_number: impl Into<String>,
        invoice_date: NaiveDate,
        due_date: NaiveDate,
        items: Vec<LineItem>,
    ) -> Self {
        let mut invoice = Self {
            id: id.into(),
            invoice_number: invoice_number.into(),
            invoice_date,
            due_date,
            bill_from: BusinessParty::default(),
            bill_to: ClientParty::default(),
            items: Vec::new(),
            notes: None,
            payment_terms: None,
            status: InvoiceStatus::default(),
            subtotal: 0.0,
            tax_total: 0.0,
            total: 0.0,
        };
        invoice.set_items(items);
        invoice
    }

    /// Seeds an unsaved invoice from an accepted extraction draft.
    pub fn from_draft(
        draft: ExtractedInvoiceDraft,
        invoice_number: impl Into<String>,
        invoice_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Self {
        let bill_to = draft.client();
        Self::new(
            String::new(),
            invoice_number,
            invoice_date,
            due_date,
            draft.into_line_items(),
        )
        .with_bill_to(bill_to)
    }

    pub fn with_status(mut self, status: impl Into<InvoiceStatus>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_bill_from(mut self, bill_from: BusinessParty) -> Self {
        self.bill_from = bill_from;
        self
    }

    pub fn with_bill_to(mut self, bill_to: ClientParty) -> Self {
        self.bill_to = bill_to;
        self
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn set_items(&mut self, items: Vec<LineItem>) {
        self.items = items;
        self.refresh_totals();
    }

    /// Recomputes the derived fields from the current items.
    pub fn refresh_totals(&mut self) {
        let InvoiceTotals {
            subtotal,
            tax_total,
            total,
        } = invoice_totals(&self.items);
        self.subtotal = subtotal;
        self.tax_total = tax_total;
        self.total = total;
    }

    pub fn totals(&self) -> InvoiceTotals {
        InvoiceTotals {
            subtotal: self.subtotal,
            tax_total: self.tax_total,
            total: self.total,
        }
    }

    pub fn subtotal(&self) -> f64 {
        self.subtotal
    }

    pub fn tax_total(&self) -> f64 {
        self.tax_total
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    /// Reminders are only offered for invoices that are still owed.
    pub fn needs_reminder(&self) -> bool {
        !self.status.is_paid()
    }
}
