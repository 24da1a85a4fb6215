use chrono::NaiveDate;
use futures::future::{self, BoxFuture, FutureExt};
use invoice_assistant::*;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone, Copy)]
enum Reply {
    Text(&'static str),
    Accessor(&'static str),
    Unrecognized,
    Fail,
}

struct ScriptedService {
    reply: Reply,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedService {
    fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

impl TextGenerationService for ScriptedService {
    fn submit<'a>(&'a self, _model: &'a str, prompt: &'a str) -> BoxFuture<'a, Result<RawResponse>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());

        let response = match self.reply {
            Reply::Text(text) => Ok(RawResponse::Text(text.to_string())),
            Reply::Accessor(text) => Ok(RawResponse::accessor(move || Some(text.to_string()))),
            Reply::Unrecognized => Ok(RawResponse::Unrecognized(json!({ "candidates": [] }))),
            Reply::Fail => Err(InvoiceAssistantError::Upstream(
                "service unavailable".to_string(),
            )),
        };
        future::ready(response).boxed()
    }
}

fn assistant(service: &Arc<ScriptedService>) -> InvoiceAssistant {
    InvoiceAssistant::new(GenerationClient::new(
        service.clone(),
        "models/gemini-2.0-flash-001",
    ))
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn invoice(id: &str, total: f64, status: &str, invoice_date: NaiveDate) -> Invoice {
    Invoice::new(
        id,
        format!("INV-{}", id),
        invoice_date,
        date(2024, 2, 15),
        vec![LineItem::new("Services", 1.0, total, 0.0)],
    )
    .with_bill_to(ClientParty {
        client_name: "Globex Corporation".to_string(),
        email: Some("ap@globex.test".to_string()),
        ..Default::default()
    })
    .with_status(status)
}

#[tokio::test]
async fn test_extraction_with_fenced_response() {
    let service = ScriptedService::new(Reply::Text(
        "```json\n{\"clientName\":\"Jane Doe\",\"email\":\"jane@example.com\",\"address\":\"\",\"items\":[{\"name\":\"Tutoring\",\"quantity\":3,\"unitPrice\":40}]}\n```",
    ));
    let text = "Bill Jane Doe (jane@example.com) for 3 hours of tutoring at $40/h";

    let parsed = assistant(&service)
        .extract_invoice(&ExtractionRequest::new(text))
        .await
        .unwrap();

    assert_eq!(parsed["clientName"], "Jane Doe");
    assert_eq!(parsed["items"][0]["quantity"], 3);
    assert!(service.last_prompt().contains(text));
    assert_eq!(service.calls(), 1);

    let draft = ExtractedInvoiceDraft::from_value(parsed).unwrap();
    let invoice = Invoice::from_draft(draft, "INV-100", date(2024, 6, 1), date(2024, 6, 30));
    assert_eq!(invoice.total(), 120.0);
}

#[tokio::test]
async fn test_extraction_returns_unexpected_shape_untouched() {
    // Parse, don't validate: a well-formed but off-schema object is passed through.
    let service = ScriptedService::new(Reply::Text("{\"customer\":\"ACME\",\"items\":\"none\"}"));
    let parsed = assistant(&service)
        .extract_invoice(&ExtractionRequest::new("ACME owes us"))
        .await
        .unwrap();
    assert_eq!(parsed, json!({ "customer": "ACME", "items": "none" }));
}

#[tokio::test]
async fn test_extraction_rejects_empty_text_without_calling_service() {
    let service = ScriptedService::new(Reply::Text("{}"));
    let err = assistant(&service)
        .extract_invoice(&ExtractionRequest::new(""))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Input);
    assert_eq!(service.calls(), 0);
    let payload = ErrorPayload::from_error(Flow::Extraction, &err);
    assert_eq!(payload.message, "Text is required");
}

#[tokio::test]
async fn test_extraction_non_json_surfaces_failure_payload() {
    let service = ScriptedService::new(Reply::Text("not json at all"));
    let err = assistant(&service)
        .extract_invoice(&ExtractionRequest::new("some invoice text"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Parse);
    let payload = ErrorPayload::from_error(Flow::Extraction, &err);
    assert_eq!(payload.message, "Failed to parse invoice data from text.");
    assert!(payload.details.unwrap().contains("not json at all"));
}

#[tokio::test]
async fn test_accessor_response_is_read() {
    let service = ScriptedService::new(Reply::Accessor("{\"insights\":[\"a\",\"b\"]}"));
    let invoices = vec![invoice("1", 10.0, "Pending", date(2024, 1, 1))];
    let insights = assistant(&service).portfolio_insights(&invoices).await.unwrap();
    assert_eq!(insights, json!({ "insights": ["a", "b"] }));
}

#[tokio::test]
async fn test_unrecognized_response_is_unreadable() {
    let service = ScriptedService::new(Reply::Unrecognized);
    let err = assistant(&service)
        .extract_invoice(&ExtractionRequest::new("text"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnreadableResponse);
}

#[tokio::test]
async fn test_upstream_failure_is_propagated_once() {
    let service = ScriptedService::new(Reply::Fail);
    let err = assistant(&service)
        .reminder_email(&invoice("1", 10.0, "Overdue", date(2024, 1, 1)))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Upstream);
    assert_eq!(service.calls(), 1, "failed calls must not be retried");
    let payload = ErrorPayload::from_error(Flow::Reminder, &err);
    assert_eq!(payload.message, "Failed to generate reminder email.");
}

#[tokio::test]
async fn test_reminder_from_store() {
    let service = ScriptedService::new(Reply::Text(
        "\nSubject: Friendly reminder for INV-42\n\nHi Globex Corporation, ...\n",
    ));
    let store = MemoryInvoiceStore::new()
        .with_invoice("user-1", invoice("42", 1234.5, "Overdue", date(2024, 1, 10)));

    let text = assistant(&service).reminder_for(&store, "42").await.unwrap();

    assert!(text.starts_with("Subject:"));
    let prompt = service.last_prompt();
    assert!(prompt.contains("Client Name: Globex Corporation"));
    assert!(prompt.contains("Invoice Number: INV-42"));
    assert!(prompt.contains("Amount Due: 1234.50"));
    assert!(prompt.contains("Due Date: 2/15/2024"));
}

#[tokio::test]
async fn test_reminder_input_and_not_found_errors_skip_service() {
    let service = ScriptedService::new(Reply::Text("Subject: hi"));
    let store = MemoryInvoiceStore::new();
    let assistant = assistant(&service);

    let err = assistant.reminder_for(&store, "").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Input);
    assert_eq!(
        ErrorPayload::from_error(Flow::Reminder, &err).message,
        "Invoice ID is required"
    );

    let err = assistant.reminder_for(&store, "missing").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(
        ErrorPayload::from_error(Flow::Reminder, &err).message,
        "Invoice not found"
    );

    assert_eq!(service.calls(), 0);
}

#[tokio::test]
async fn test_concurrent_reminders_are_independent() {
    let service = ScriptedService::new(Reply::Text("Subject: Reminder"));
    let assistant = assistant(&service);
    let inv = invoice("7", 99.0, "Pending", date(2024, 1, 1));

    let (a, b) = tokio::join!(assistant.reminder_email(&inv), assistant.reminder_email(&inv));
    assert_eq!(a.unwrap(), "Subject: Reminder");
    assert_eq!(b.unwrap(), "Subject: Reminder");
    assert_eq!(service.calls(), 2);
}

#[tokio::test]
async fn test_insights_for_owner() {
    let service = ScriptedService::new(Reply::Text(
        "```json\n{\"insights\":[\"Revenue is strong\",\"Send reminders for pending invoices\"]}\n```",
    ));
    let store = MemoryInvoiceStore::new()
        .with_invoice("owner", invoice("1", 100.0, "Paid", date(2024, 1, 1)))
        .with_invoice("owner", invoice("2", 50.0, "Pending", date(2024, 1, 2)))
        .with_invoice("someone-else", invoice("x", 999.0, "Pending", date(2024, 1, 3)))
        .with_invoice("owner", invoice("3", 25.0, "Paid", date(2024, 1, 3)));

    let insights = assistant(&service)
        .insights_for_owner(&store, "owner")
        .await
        .unwrap();
    assert_eq!(insights["insights"].as_array().unwrap().len(), 2);

    let prompt = service.last_prompt();
    assert!(prompt.contains("Total number of invoices: 3"));
    assert!(prompt.contains("Total revenue from paid invoices: 125.00"));
    assert!(prompt.contains("Total outstanding amount from unpaid/pending invoices: 50.00"));
    assert!(!prompt.contains("999.00"));
}

#[tokio::test]
async fn test_insights_for_empty_portfolio_skip_service() {
    let service = ScriptedService::new(Reply::Text("{}"));
    let insights = assistant(&service)
        .insights_for_owner(&MemoryInvoiceStore::new(), "nobody")
        .await
        .unwrap();

    assert_eq!(insights, json!({ "insights": [NO_DATA_INSIGHT] }));
    assert_eq!(service.calls(), 0);
}

#[test]
fn test_portfolio_scenario_totals() {
    let invoices = vec![
        invoice("1", 100.0, "Paid", date(2024, 1, 1)),
        invoice("2", 50.0, "Pending", date(2024, 1, 2)),
        invoice("3", 25.0, "Paid", date(2024, 1, 3)),
    ];
    let summary = portfolio_summary(&invoices);
    assert_eq!(summary.total_revenue, 125.0);
    assert_eq!(summary.total_outstanding, 50.0);
    assert_eq!(summary.total_invoices, 3);
}

#[test]
fn test_recent_invoices_scenario() {
    let invoices = vec![
        invoice("d05", 1.0, "Paid", date(2024, 1, 5)),
        invoice("d04a", 1.0, "Paid", date(2024, 1, 4)),
        invoice("d04b", 1.0, "Pending", date(2024, 1, 4)),
        invoice("d03", 1.0, "Paid", date(2024, 1, 3)),
        invoice("d02", 1.0, "Overdue", date(2024, 1, 2)),
    ];
    let summary = portfolio_summary(&invoices);
    let ids: Vec<&str> = summary.recent_invoices.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["d05", "d04a", "d04b", "d03", "d02"]);
}

#[test]
fn test_totals_hold_across_item_edits() {
    let mut invoice = Invoice::new(
        "e1",
        "INV-E1",
        date(2024, 7, 1),
        date(2024, 7, 31),
        vec![
            LineItem::new("Design", 12.5, 85.0, 20.0),
            LineItem::new("Hosting", 1.0, 19.99, 0.0),
        ],
    );
    let totals = invoice.totals();
    assert_eq!(totals.total, totals.subtotal + totals.tax_total);

    let mut items = invoice.items().to_vec();
    items.push(LineItem::new("Domain", 2.0, 12.0, 7.0));
    invoice.set_items(items);

    let totals = invoice.totals();
    assert_eq!(totals, invoice_totals(invoice.items()));
    assert_eq!(totals.total, totals.subtotal + totals.tax_total);
    println!(
        "Subtotal {} / Tax {} / Total {}",
        format_amount(totals.subtotal),
        format_amount(totals.tax_total),
        format_amount(totals.total)
    );
}

/// Hits the real Gemini API. Run with `cargo test -- --ignored` and `GEMINI_API_KEY` set.
#[tokio::test]
#[ignore]
async fn test_live_extraction() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let config = AssistantConfig::from_env()?;
    let assistant = InvoiceAssistant::new(GenerationClient::gemini(&config)?);

    let parsed = assistant
        .extract_invoice(&ExtractionRequest::new(
            "Please invoice Initech, 4120 Freidrich Lane, Austin TX, for 2 website audits at $450 each \
             and 10 hours of support at $80/hour. Contact: billing@initech.test",
        ))
        .await?;
    println!("{}", serde_json::to_string_pretty(&parsed)?);
    assert!(parsed.get("items").is_some());
    Ok(())
}
