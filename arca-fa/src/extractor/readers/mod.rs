//! Container-format readers
//!
//! One reader per container family, selected by sniffed MIME type (never by
//! filename). Readers emit raw key/value entries; normalization happens in
//! the extractor afterwards. All readers are best-effort: they pull what
//! they can recognize and stop quietly at anything else.

pub mod generic;
pub mod image;
pub mod media;
pub mod pdf;

pub use generic::GenericReader;
pub use image::ImageReader;
pub use media::MediaReader;
pub use pdf::PdfReader;

use crate::types::{ContainerReader, MetadataValue};

/// Select the reader for a sniffed MIME type
pub fn reader_for(mime: &str) -> &'static dyn ContainerReader {
    static IMAGE: ImageReader = ImageReader;
    static PDF: PdfReader = PdfReader;
    static MEDIA: MediaReader = MediaReader;
    static GENERIC: GenericReader = GenericReader;

    if mime.starts_with("image/") {
        &IMAGE
    } else if mime == "application/pdf" {
        &PDF
    } else if mime.starts_with("audio/") || mime.starts_with("video/") {
        &MEDIA
    } else {
        &GENERIC
    }
}

/// XMP keys worth carrying into the record, with their qualified spellings
const XMP_KEYS: [(&str, [&str; 2]); 4] = [
    ("CreatorTool", ["xmp:CreatorTool", "xap:CreatorTool"]),
    ("CreateDate", ["xmp:CreateDate", "xap:CreateDate"]),
    ("ModifyDate", ["xmp:ModifyDate", "xap:ModifyDate"]),
    ("MetadataDate", ["xmp:MetadataDate", "xap:MetadataDate"]),
];

/// Best-effort scan for an embedded XMP packet
///
/// XMP packets are plain XML embedded in otherwise binary containers, so a
/// lossy text scan finds them regardless of the host format. Handles both
/// the attribute (`xmp:CreatorTool="…"`) and element
/// (`<xmp:CreatorTool>…</…>`) serializations.
pub(crate) fn scan_xmp(bytes: &[u8]) -> Vec<(String, MetadataValue)> {
    let text = String::from_utf8_lossy(bytes);
    if !text.contains("x:xmpmeta") && !text.contains("adobe:ns:meta") {
        return Vec::new();
    }

    let mut entries = Vec::new();
    for (raw_key, qualified_names) in XMP_KEYS {
        for qualified in qualified_names {
            if let Some(value) = find_xml_value(&text, qualified) {
                entries.push((raw_key.to_string(), MetadataValue::String(value)));
                break;
            }
        }
    }
    entries
}

/// Find a value serialized as an XML attribute or a simple element
fn find_xml_value(text: &str, qualified: &str) -> Option<String> {
    // Attribute form: qualified="value"
    let attr = format!("{}=\"", qualified);
    if let Some(pos) = text.find(&attr) {
        let rest = &text[pos + attr.len()..];
        if let Some(end) = rest.find('"') {
            let value = rest[..end].trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }

    // Element form: <qualified>value</qualified>
    let open = format!("<{}>", qualified);
    if let Some(pos) = text.find(&open) {
        let rest = &text[pos + open.len()..];
        if let Some(end) = rest.find("</") {
            let value = rest[..end].trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }

    None
}
