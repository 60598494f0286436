//! Audio/video container reader
//!
//! Probes the byte stream with lofty and carries tag fields plus stream
//! properties into the record. Which tag standard the container uses
//! (ID3v2, Vorbis comments, MP4 ilst) is lofty's concern, not ours.

use lofty::file::TaggedFileExt;
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::ItemKey;
use std::io::Cursor;

use crate::types::{ContainerReader, MetadataValue, ReaderError};

pub struct MediaReader;

impl ContainerReader for MediaReader {
    fn name(&self) -> &'static str {
        "media"
    }

    fn read(&self, bytes: &[u8]) -> Result<Vec<(String, MetadataValue)>, ReaderError> {
        let tagged_file = Probe::new(Cursor::new(bytes))
            .guess_file_type()
            .map_err(|e| ReaderError::Malformed(e.to_string()))?
            .read()
            .map_err(|e| ReaderError::Malformed(e.to_string()))?;

        let mut entries = Vec::new();

        let properties = tagged_file.properties();
        entries.push((
            "DurationSeconds".into(),
            MetadataValue::Float(properties.duration().as_secs_f64()),
        ));
        if let Some(sample_rate) = properties.sample_rate() {
            entries.push(("SampleRate".into(), MetadataValue::Integer(sample_rate as i64)));
        }
        if let Some(channels) = properties.channels() {
            entries.push(("Channels".into(), MetadataValue::Integer(channels as i64)));
        }
        if let Some(bitrate) = properties.audio_bitrate() {
            entries.push(("Bitrate".into(), MetadataValue::Integer(bitrate as i64)));
        }

        let tag = tagged_file.primary_tag().or_else(|| tagged_file.first_tag());
        if let Some(tag) = tag {
            if let Some(artist) = tag.artist() {
                entries.push(("Artist".into(), MetadataValue::String(artist.to_string())));
            }
            if let Some(title) = tag.title() {
                entries.push(("Title".into(), MetadataValue::String(title.to_string())));
            }
            if let Some(album) = tag.album() {
                entries.push(("Album".into(), MetadataValue::String(album.to_string())));
            }
            if let Some(year) = tag.year() {
                entries.push(("Year".into(), MetadataValue::String(year.to_string())));
            }
            if let Some(encoder) = tag.get_string(&ItemKey::EncoderSoftware) {
                entries.push((
                    "EncoderSoftware".into(),
                    MetadataValue::String(encoder.to_string()),
                ));
            }
            if let Some(encoder_settings) = tag.get_string(&ItemKey::EncoderSettings) {
                entries.push((
                    "EncoderSettings".into(),
                    MetadataValue::String(encoder_settings.to_string()),
                ));
            }
        }

        Ok(entries)
    }
}
