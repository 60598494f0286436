//! Image container reader
//!
//! PNG: walks chunks for IHDR geometry plus tEXt/iTXt textual entries
//! (where generator pipelines leave their "Software" and "parameters"
//! keys). JPEG: walks markers for frame geometry and component layout.
//! Everything else in the image family gets the XMP scan only.

use tracing::trace;

use super::scan_xmp;
use crate::types::{ContainerReader, MetadataValue, ReaderError};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

pub struct ImageReader;

impl ContainerReader for ImageReader {
    fn name(&self) -> &'static str {
        "image"
    }

    fn read(&self, bytes: &[u8]) -> Result<Vec<(String, MetadataValue)>, ReaderError> {
        let mut entries = if bytes.starts_with(&PNG_SIGNATURE) {
            read_png(bytes)?
        } else if bytes.starts_with(&[0xFF, 0xD8]) {
            read_jpeg(bytes)
        } else {
            Vec::new()
        };
        entries.extend(scan_xmp(bytes));
        Ok(entries)
    }
}

/// Walk PNG chunks, collecting IHDR geometry and textual entries
fn read_png(bytes: &[u8]) -> Result<Vec<(String, MetadataValue)>, ReaderError> {
    if bytes.len() < PNG_SIGNATURE.len() + 12 {
        return Err(ReaderError::Malformed("PNG shorter than one chunk".into()));
    }

    let mut entries = Vec::new();
    let mut pos = PNG_SIGNATURE.len();

    while pos + 8 <= bytes.len() {
        let length =
            u32::from_be_bytes([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]])
                as usize;
        let chunk_type = &bytes[pos + 4..pos + 8];
        let data_start = pos + 8;
        let data_end = match data_start.checked_add(length) {
            Some(end) if end + 4 <= bytes.len() => end,
            // Truncated chunk: stop here with what we have
            _ => break,
        };
        let data = &bytes[data_start..data_end];

        match chunk_type {
            b"IHDR" if length >= 13 => {
                let width = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
                let height = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
                entries.push(("ImageWidth".into(), MetadataValue::Integer(width as i64)));
                entries.push(("ImageHeight".into(), MetadataValue::Integer(height as i64)));
                entries.push((
                    "Resolution".into(),
                    MetadataValue::String(format!("{}x{}", width, height)),
                ));
                if let Some(color_space) = png_color_space(data[9]) {
                    entries.push(("ColorType".into(), MetadataValue::from(color_space)));
                }
            }
            b"tEXt" => {
                if let Some((keyword, text)) = split_text_chunk(data) {
                    trace!(keyword = %keyword, "PNG tEXt entry");
                    entries.push((keyword, MetadataValue::String(text)));
                }
            }
            b"iTXt" => {
                if let Some((keyword, text)) = split_itxt_chunk(data) {
                    entries.push((keyword, MetadataValue::String(text)));
                }
            }
            b"IEND" => break,
            _ => {}
        }

        pos = data_end + 4; // skip CRC
    }

    Ok(entries)
}

/// tEXt: keyword NUL latin-1-text
fn split_text_chunk(data: &[u8]) -> Option<(String, String)> {
    let nul = data.iter().position(|&b| b == 0)?;
    let keyword: String = data[..nul].iter().map(|&b| b as char).collect();
    let text: String = data[nul + 1..].iter().map(|&b| b as char).collect();
    if keyword.is_empty() || text.is_empty() {
        return None;
    }
    Some((keyword, text))
}

/// iTXt: keyword NUL compression-flag compression-method language NUL
/// translated-keyword NUL utf8-text — compressed payloads are skipped.
fn split_itxt_chunk(data: &[u8]) -> Option<(String, String)> {
    let nul = data.iter().position(|&b| b == 0)?;
    let keyword: String = data[..nul].iter().map(|&b| b as char).collect();
    let rest = data.get(nul + 1..)?;
    let (&compression_flag, rest) = rest.split_first()?;
    let (_, rest) = rest.split_first()?; // compression method
    if compression_flag != 0 {
        return None;
    }
    let lang_nul = rest.iter().position(|&b| b == 0)?;
    let rest = rest.get(lang_nul + 1..)?;
    let translated_nul = rest.iter().position(|&b| b == 0)?;
    let text = String::from_utf8_lossy(rest.get(translated_nul + 1..)?).into_owned();
    if keyword.is_empty() || text.is_empty() {
        return None;
    }
    Some((keyword, text))
}

fn png_color_space(color_type: u8) -> Option<&'static str> {
    match color_type {
        0 => Some("Grayscale"),
        2 => Some("RGB"),
        3 => Some("Indexed"),
        4 => Some("GrayscaleAlpha"),
        6 => Some("RGBA"),
        _ => None,
    }
}

/// Walk JPEG segments for the first frame header
fn read_jpeg(bytes: &[u8]) -> Vec<(String, MetadataValue)> {
    let mut entries = Vec::new();
    let mut pos = 2;

    while pos + 4 <= bytes.len() {
        if bytes[pos] != 0xFF {
            break;
        }
        let marker = bytes[pos + 1];
        // Standalone markers without a length field
        if (0xD0..=0xD9).contains(&marker) || marker == 0x01 {
            pos += 2;
            continue;
        }
        if marker == 0xDA {
            break; // start of scan: no more headers
        }
        let segment_len = u16::from_be_bytes([bytes[pos + 2], bytes[pos + 3]]) as usize;
        if segment_len < 2 || pos + 2 + segment_len > bytes.len() {
            break;
        }
        let data = &bytes[pos + 4..pos + 2 + segment_len];

        if is_sof_marker(marker) && data.len() >= 6 {
            let height = u16::from_be_bytes([data[1], data[2]]);
            let width = u16::from_be_bytes([data[3], data[4]]);
            let components = data[5];
            entries.push(("ImageWidth".into(), MetadataValue::Integer(width as i64)));
            entries.push(("ImageHeight".into(), MetadataValue::Integer(height as i64)));
            entries.push((
                "Resolution".into(),
                MetadataValue::String(format!("{}x{}", width, height)),
            ));
            let color_space = match components {
                1 => Some("Grayscale"),
                3 => Some("YCbCr"),
                4 => Some("CMYK"),
                _ => None,
            };
            if let Some(cs) = color_space {
                entries.push(("ColorSpace".into(), MetadataValue::from(cs)));
            }
            break;
        }

        pos += 2 + segment_len;
    }

    entries
}

fn is_sof_marker(marker: u8) -> bool {
    matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC)
}
