//! Pure invoice arithmetic and portfolio roll-ups.
//!
//! Everything here operates on records the caller already fetched. Values are never rounded;
//! use [`crate::utils::format_amount`] when rendering.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::schema::{Invoice, LineItem};

/// Number of invoices kept in [`PortfolioSummary::recent_invoices`].
pub const RECENT_INVOICE_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    pub subtotal: f64,
    pub tax_total: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_invoices: usize,
    pub paid_invoices: usize,
    pub unpaid_invoices: usize,
    /// Sum of `total` over paid invoices.
    pub total_revenue: f64,
    /// Sum of `total` over everything not paid.
    pub total_outstanding: f64,
    /// Newest first by invoice date; equal dates keep retrieval order.
    pub recent_invoices: Vec<Invoice>,
}

impl PortfolioSummary {
    pub fn is_empty(&self) -> bool {
        self.total_invoices == 0
    }
}

pub fn line_total(item: &LineItem) -> f64 {
    item.quantity * item.unit_price * (1.0 + item.tax_percent / 100.0)
}

pub fn invoice_totals(items: &[LineItem]) -> InvoiceTotals {
    let mut subtotal = 0.0;
    let mut tax_total = 0.0;

    for item in items {
        let net = item.quantity * item.unit_price;
        subtotal += net;
        tax_total += net * item.tax_percent / 100.0;
    }

    InvoiceTotals {
        subtotal,
        tax_total,
        total: subtotal + tax_total,
    }
}

pub fn portfolio_summary(invoices: &[Invoice]) -> PortfolioSummary {
    let (paid, unpaid): (Vec<&Invoice>, Vec<&Invoice>) =
        invoices.iter().partition(|inv| inv.status.is_paid());

    let total_revenue = paid.iter().map(|inv| inv.total()).sum();
    let total_outstanding = unpaid.iter().map(|inv| inv.total()).sum();

    debug!(
        "Summarised {} invoices: {} paid, {} unpaid",
        invoices.len(),
        paid.len(),
        unpaid.len()
    );

    PortfolioSummary {
        total_invoices: invoices.len(),
        paid_invoices: paid.len(),
        unpaid_invoices: unpaid.len(),
        total_revenue,
        total_outstanding,
        recent_invoices: recent_invoices(invoices, RECENT_INVOICE_LIMIT),
    }
}

/// Most recent `limit` invoices by `invoice_date`. `sort_by` is stable, so invoices sharing
/// a date stay in the order they were retrieved.
pub fn recent_invoices(invoices: &[Invoice], limit: usize) -> Vec<Invoice> {
    let mut ordered: Vec<&Invoice> = invoices.iter().collect();
    ordered.sort_by(|a, b| b.invoice_date.cmp(&a.invoice_date));
    ordered.into_iter().take(limit).cloned().collect()
}
