//! PDF document reader
//!
//! Best-effort scan of the document-information dictionary (the classic
//! `/Producer (…)` entries) plus the XMP packet. No object-graph parsing:
//! the Info keys are located textually, which is sufficient for the flat
//! record this stage needs and tolerant of damaged files.

use super::scan_xmp;
use crate::types::{ContainerReader, MetadataValue, ReaderError};

/// Info-dictionary keys carried into the record
const INFO_KEYS: [&str; 6] = [
    "Producer",
    "Creator",
    "Title",
    "Author",
    "CreationDate",
    "ModDate",
];

pub struct PdfReader;

impl ContainerReader for PdfReader {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn read(&self, bytes: &[u8]) -> Result<Vec<(String, MetadataValue)>, ReaderError> {
        let text = String::from_utf8_lossy(bytes);
        if !text.starts_with("%PDF-") {
            return Err(ReaderError::Malformed("missing %PDF header".into()));
        }

        let mut entries = Vec::new();

        let version: String = text[5..]
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        if !version.is_empty() {
            entries.push(("PdfVersion".into(), MetadataValue::String(version)));
        }

        for key in INFO_KEYS {
            if let Some(value) = find_info_literal(&text, key) {
                entries.push((key.to_string(), MetadataValue::String(value)));
            }
        }

        entries.extend(scan_xmp(bytes));
        Ok(entries)
    }
}

/// Find `/Key (literal)` and decode the literal string
fn find_info_literal(text: &str, key: &str) -> Option<String> {
    let needle = format!("/{}", key);
    let mut search_from = 0;

    while let Some(found) = text[search_from..].find(&needle) {
        let after = search_from + found + needle.len();
        // Key must end here, not be a prefix of a longer name
        let rest = text[after..].trim_start();
        if let Some(stripped) = rest.strip_prefix('(') {
            if let Some(value) = read_literal(stripped) {
                if !value.is_empty() {
                    return Some(value);
                }
            }
        }
        search_from = after;
    }
    None
}

/// Decode a PDF literal string body up to its balancing `)`
fn read_literal(rest: &str) -> Option<String> {
    let mut out = String::new();
    let mut depth = 1usize;
    let mut chars = rest.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    match escaped {
                        'n' => out.push('\n'),
                        'r' => out.push('\r'),
                        't' => out.push('\t'),
                        other => out.push(other),
                    }
                }
            }
            '(' => {
                depth += 1;
                out.push(ch);
            }
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(out.trim().to_string());
                }
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    None // unterminated literal
}
