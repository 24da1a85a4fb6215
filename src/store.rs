//! Read access to persisted invoices.
//!
//! Storage is owned by the host application. The assistant only reads through
//! [`InvoiceStore`]; it never creates or updates records.

use futures::future::{self, BoxFuture, FutureExt};

use crate::error::Result;
use crate::schema::Invoice;

pub trait InvoiceStore: Send + Sync {
    fn find_invoice<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Option<Invoice>>>;

    /// All invoices belonging to `owner_id`, in retrieval order.
    fn invoices_for_owner<'a>(&'a self, owner_id: &'a str) -> BoxFuture<'a, Result<Vec<Invoice>>>;
}

/// Fixed snapshot of invoices held in memory, mainly for tests and demos.
#[derive(Debug, Clone, Default)]
pub struct MemoryInvoiceStore {
    records: Vec<(String, Invoice)>,
}

impl MemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_invoice(mut self, owner_id: impl Into<String>, invoice: Invoice) -> Self {
        self.records.push((owner_id.into(), invoice));
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl InvoiceStore for MemoryInvoiceStore {
    fn find_invoice<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Option<Invoice>>> {
        let found = self
            .records
            .iter()
            .find(|(_, inv)| inv.id == id)
            .map(|(_, inv)| inv.clone());
        future::ready(Ok(found)).boxed()
    }

    fn invoices_for_owner<'a>(&'a self, owner_id: &'a str) -> BoxFuture<'a, Result<Vec<Invoice>>> {
        let owned = self
            .records
            .iter()
            .filter(|(owner, _)| owner == owner_id)
            .map(|(_, inv)| inv.clone())
            .collect();
        future::ready(Ok(owned)).boxed()
    }
}
