use chrono::{Datelike, NaiveDate};

/// Renders a money amount with two decimals. Presentation only; stored values stay unrounded.
pub fn format_amount(value: f64) -> String {
    format!("{:.2}", value)
}

/// Short US-style date (`3/7/2024`), the form used in reminder emails.
pub fn format_local_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.month(), date.day(), date.year())
}

/// First `max_chars` characters of `text`, with an ellipsis when something was cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}
