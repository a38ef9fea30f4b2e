//! Length-prefixed, tag-identified records.
//!
//! Payloads, game-data messages and announcement payloads all share one
//! framing: `length: u16 LE`, `tag: u8`, then `length` body bytes. The body is
//! decoded inside a region scoped to the declared length and the parent cursor
//! is then moved to the declared end whatever the body decoder consumed, so a
//! misunderstood record never desynchronizes its siblings.

use tracing::debug;

use super::error::{DecodeError, Warning};
use super::fields::{FieldReader, Fields};
use super::names::LabelTable;
use crate::AnnotatedField;

/// Naming of one framing level.
#[derive(Debug, Clone, Copy)]
pub struct Envelope {
    /// Group name of each record, e.g. `"Payload"`.
    pub name: &'static str,
    pub description: &'static str,
    /// Name of the tag field, e.g. `"Payload tag"`.
    pub tag: &'static str,
    pub tag_description: &'static str,
    pub tags: &'static LabelTable,
}

/// Decode one framed record, delegating its body to `body`.
///
/// `body` receives the scoped reader, the raw tag and the record's fields
/// (already holding the length and tag).
pub fn read_record<'a, F>(
    reader: &mut FieldReader<'a>,
    envelope: &Envelope,
    body: F,
) -> Result<AnnotatedField, DecodeError>
where
    F: FnOnce(&mut FieldReader<'a>, u8, &mut Fields) -> Result<(), DecodeError>,
{
    let start = reader.position();
    let mut fields = Fields::new();

    let length = reader.u16_le("Length", "Declared body length in bytes.")?;
    let declared = length.value.as_u64().unwrap_or_default() as usize;
    fields.push(length);

    let tag = reader
        .u8(envelope.tag, envelope.tag_description)?
        .with_table(envelope.tags);
    let tag_value = tag.value.as_u64().unwrap_or_default() as u8;
    let label = tag
        .label
        .clone()
        .unwrap_or_else(|| format!("Unknown (0x{tag_value:02x})"));
    fields.push(tag);

    let (mut scoped, clamped) = reader.scoped(declared);
    fields.warn_opt(clamped);
    body(&mut scoped, tag_value, &mut fields)?;

    let consumed = scoped.consumed();
    if consumed != scoped.region_len() {
        debug!(
            record = envelope.name,
            tag = tag_value,
            declared,
            consumed,
            "record length mismatch"
        );
        fields.warn(Warning::length_mismatch(
            &envelope.name.to_ascii_lowercase(),
            start,
            declared,
            consumed,
        ));
    }
    reader.advance_past(&scoped);

    Ok(reader
        .group(envelope.name, envelope.description, start, fields)
        .with_label(label))
}

/// Decode framed records until the reader is exhausted.
pub fn read_records<'a, F>(
    reader: &mut FieldReader<'a>,
    envelope: &Envelope,
    mut body: F,
) -> Result<Vec<AnnotatedField>, DecodeError>
where
    F: FnMut(&mut FieldReader<'a>, u8, &mut Fields) -> Result<(), DecodeError>,
{
    let mut records = Vec::new();
    while reader.has_remaining() {
        records.push(read_record(reader, envelope, &mut body)?);
    }
    Ok(records)
}

/// Keep an unrecognized body as raw bytes and flag the tag.
pub fn unknown_body(
    reader: &mut FieldReader<'_>,
    fields: &mut Fields,
    what: &str,
    tag: u8,
) -> Result<(), DecodeError> {
    let offset = reader.position();
    debug!(what, tag, offset, "unknown tag, keeping raw bytes");
    fields.push(reader.rest("Data", "Undecoded body bytes.")?);
    fields.warn(Warning::unknown_tag(what, offset, u64::from(tag)));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocols::common::error::WarningKind;

    static TAGS: LabelTable = LabelTable::new("test tag", &[(0x01, "One")]);

    const RECORD: Envelope = Envelope {
        name: "Record",
        description: "",
        tag: "Record tag",
        tag_description: "",
        tags: &TAGS,
    };

    #[test]
    fn under_consumed_record_warns_and_resyncs() {
        // two records: the first declares 2 body bytes but only 1 is read
        let data = [0x02, 0x00, 0x01, 0xaa, 0xbb, 0x01, 0x00, 0x01, 0xcc];
        let mut reader = FieldReader::new(&data);
        let records = read_records(&mut reader, &RECORD, |r, _, f| {
            f.push(r.u8("Value", "")?);
            Ok(())
        })
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].warnings.len(), 1);
        assert_eq!(records[0].warnings[0].kind, WarningKind::LengthMismatch);
        assert_eq!(records[0].range.size, 5);
        assert_eq!(records[0].label.as_deref(), Some("One"));
        assert!(records[1].warnings.is_empty());
        assert_eq!(
            records[1].child("Value").and_then(|f| f.value.as_u64()),
            Some(0xcc)
        );
    }

    #[test]
    fn oversized_length_is_clamped() {
        let data = [0x09, 0x00, 0x07, 0xaa];
        let mut reader = FieldReader::new(&data);
        let record = read_record(&mut reader, &RECORD, |r, tag, f| {
            unknown_body(r, f, "test tag", tag)
        })
        .unwrap();
        let kinds: Vec<_> = record.warnings.iter().map(|w| w.kind).collect();
        assert_eq!(kinds, vec![WarningKind::ClampedLength, WarningKind::UnknownTag]);
        assert_eq!(record.label.as_deref(), Some("Unknown (0x07)"));
        assert_eq!(record.child("Data").map(|f| f.raw.clone()), Some(vec![0xaa]));
        assert!(!reader.has_remaining());
    }

    #[test]
    fn over_read_inside_record_is_fatal() {
        let data = [0x01, 0x00, 0x01, 0xaa, 0xbb];
        let mut reader = FieldReader::new(&data);
        let err = read_record(&mut reader, &RECORD, |r, _, f| {
            f.push(r.u16_le("Wide", "")?);
            Ok(())
        })
        .unwrap_err();
        assert_eq!(err.field(), Some("Wide"));
        assert_eq!(err.offset(), Some(3));
    }
}
