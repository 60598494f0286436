//! Generic fallback reader
//!
//! Used when no family-specific reader applies. Records the artifact size
//! and whatever an XMP scan turns up; a container we cannot classify can
//! still carry a perfectly readable XMP packet.

use super::scan_xmp;
use crate::types::{ContainerReader, MetadataValue, ReaderError};

pub struct GenericReader;

impl ContainerReader for GenericReader {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn read(&self, bytes: &[u8]) -> Result<Vec<(String, MetadataValue)>, ReaderError> {
        let mut entries = vec![(
            "ByteLength".to_string(),
            MetadataValue::Integer(bytes.len() as i64),
        )];
        entries.extend(scan_xmp(bytes));
        Ok(entries)
    }
}
