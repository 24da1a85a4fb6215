//! Turns raw model output into JSON.
//!
//! Models often wrap JSON in markdown code fences even when told not to. The normalizer
//! removes the fences, trims, and parses strictly. It never repairs or defaults: text that
//! is not valid JSON after stripping is reported as [`InvoiceAssistantError::Parse`].

use log::debug;
use serde_json::Value;

use crate::error::{InvoiceAssistantError, Result};
use crate::utils::preview;

const FENCE: &str = "```";
const PREVIEW_CHARS: usize = 120;

fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '+' | '_' | '.')
}

/// Drops a language tag at the start of `s`. A tag must be followed by whitespace or end of
/// input, so a payload sitting right after the fence (```` ```true``` ````) is kept.
fn skip_language_tag(s: &str) -> &str {
    let tag_len = s.find(|c: char| !is_tag_char(c)).unwrap_or(s.len());
    let after = &s[tag_len..];
    if after.chars().next().map_or(true, char::is_whitespace) {
        after
    } else {
        s
    }
}

/// Removes every code fence (and the language tag after an opening fence) and trims the
/// result.
pub fn strip_code_fences(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    let mut opening = true;

    while let Some(pos) = rest.find(FENCE) {
        out.push_str(&rest[..pos]);
        rest = rest[pos..].trim_start_matches('`');
        if opening {
            rest = skip_language_tag(rest);
        }
        opening = !opening;
    }
    out.push_str(rest);

    out.trim().to_string()
}

pub fn normalize(raw: &str) -> Result<Value> {
    let cleaned = strip_code_fences(raw);
    if cleaned.len() != raw.trim().len() {
        debug!(
            "Stripped code fences from model output ({} -> {} bytes)",
            raw.len(),
            cleaned.len()
        );
    }

    serde_json::from_str(&cleaned).map_err(|e| InvoiceAssistantError::Parse {
        message: e.to_string(),
        preview: preview(&cleaned, PREVIEW_CHARS),
    })
}
