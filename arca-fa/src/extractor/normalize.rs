//! Metadata key normalization
//!
//! Raw container keys arrive in whatever casing and punctuation the format
//! uses ("CreatorTool", "XMP:CreateDate", "/Producer"). Normalization
//! lowercases, collapses non-alphanumeric runs to a single underscore, then
//! maps well-known variants onto stable canonical keys. Unknown keys pass
//! through with the derived name.

use crate::types::MetadataValue;
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashMap};

/// Well-known key variants (post-collapse) → canonical key
static CANONICAL_KEYS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut map = HashMap::new();

    // Software identity
    map.insert("software", "software");
    map.insert("creator_tool", "creator_tool");
    map.insert("creatortool", "creator_tool");
    map.insert("xmp_creatortool", "creator_tool");
    map.insert("creator", "creator_tool");
    map.insert("application", "application");
    map.insert("encoder", "application");
    map.insert("encoder_software", "application");
    map.insert("encodersoftware", "application");
    map.insert("encoded_by", "application");
    map.insert("encodedby", "application");
    map.insert("producer", "processing_software");
    map.insert("processing_software", "processing_software");
    map.insert("processingsoftware", "processing_software");

    // Dates
    map.insert("datetimeoriginal", "date_time_original");
    map.insert("date_time_original", "date_time_original");
    map.insert("createdate", "create_date");
    map.insert("create_date", "create_date");
    map.insert("creationdate", "create_date");
    map.insert("creation_date", "create_date");
    map.insert("datecreated", "create_date");
    map.insert("date_created", "create_date");
    map.insert("year", "create_date");
    map.insert("modifydate", "modify_date");
    map.insert("modify_date", "modify_date");
    map.insert("moddate", "modify_date");
    map.insert("mod_date", "modify_date");
    map.insert("datemodified", "modify_date");
    map.insert("date_modified", "modify_date");
    map.insert("metadatadate", "metadata_date");
    map.insert("metadata_date", "metadata_date");

    // Container properties
    map.insert("filetype", "file_type");
    map.insert("file_type", "file_type");
    map.insert("colorspace", "color_space");
    map.insert("color_space", "color_space");
    map.insert("colortype", "color_space");
    map.insert("color_type", "color_space");
    map.insert("resolution", "resolution");
    map.insert("imagesize", "resolution");
    map.insert("image_size", "resolution");
    map.insert("width", "image_width");
    map.insert("imagewidth", "image_width");
    map.insert("image_width", "image_width");
    map.insert("height", "image_height");
    map.insert("imageheight", "image_height");
    map.insert("image_height", "image_height");
    map.insert("mimetype", "mime_type");
    map.insert("bytelength", "byte_length");
    map.insert("pdfversion", "pdf_version");
    map.insert("durationseconds", "duration_seconds");
    map.insert("samplerate", "sample_rate");

    map
});

/// Collapse a raw key: lowercase, non-alphanumeric runs become one `_`
pub fn collapse_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}

/// Normalize a raw key to its canonical form
pub fn canonical_key(raw: &str) -> String {
    let collapsed = collapse_key(raw);
    match CANONICAL_KEYS.get(collapsed.as_str()) {
        Some(canonical) => (*canonical).to_string(),
        None => collapsed,
    }
}

/// Normalize raw reader entries into a canonical field map
///
/// The first non-empty value for a canonical key wins; later duplicates
/// (e.g. both "Creator" and "CreatorTool" mapping to `creator_tool`) are
/// dropped rather than overwriting.
pub fn normalize_entries(
    entries: Vec<(String, MetadataValue)>,
) -> BTreeMap<String, MetadataValue> {
    let mut fields = BTreeMap::new();
    for (raw_key, value) in entries {
        let key = canonical_key(&raw_key);
        if key.is_empty() || value.is_empty() {
            continue;
        }
        fields.entry(key).or_insert(value);
    }
    fields
}
