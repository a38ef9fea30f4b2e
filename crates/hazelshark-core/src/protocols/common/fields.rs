//! Annotated field reader.
//!
//! Wraps a [`ByteRegion`] and returns self-describing [`AnnotatedField`]s
//! instead of bare values. The byte range and raw slice of every field are
//! taken from the cursor positions before and after the read, so they always
//! match what was consumed.

use super::cursor::ByteRegion;
use super::error::{DecodeError, Warning, WarningKind};
use crate::{AnnotatedField, ByteRange, Endianness, FieldKind, FieldValue};

/// Reader that records where every value came from.
///
/// # Examples
/// ```
/// use hazelshark_core::{FieldReader, Fields};
///
/// let data = [0x00, 0x01, 0x02, b'h', b'i'];
/// let mut reader = FieldReader::new(&data);
/// let mut fields = Fields::new();
/// fields.push(reader.u16_be("Sequence", "")?);
/// fields.push(reader.string("Name", "")?);
/// let group = reader.group("Header", "", 0, fields);
/// assert_eq!(group.range.size, data.len());
/// assert_eq!(group.child("Name").and_then(|f| f.value.as_str()), Some("hi"));
/// # Ok::<(), hazelshark_core::DecodeError>(())
/// ```
pub struct FieldReader<'a> {
    region: ByteRegion<'a>,
}

/// Children and warnings collected while decoding one node.
///
/// Owned by a single decoder call; turned into a group field once complete.
#[derive(Debug, Default)]
pub struct Fields {
    pub children: Vec<AnnotatedField>,
    pub warnings: Vec<Warning>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: AnnotatedField) {
        self.children.push(field);
    }

    pub fn warn(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    pub fn warn_opt(&mut self, warning: Option<Warning>) {
        self.warnings.extend(warning);
    }

    /// Value of the most recent direct child with this name.
    #[cfg(test)]
    pub fn value_of(&self, name: &str) -> Option<&FieldValue> {
        self.children
            .iter()
            .rev()
            .find(|child| child.name == name)
            .map(|child| &child.value)
    }
}

impl<'a> FieldReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            region: ByteRegion::new(data),
        }
    }

    pub fn position(&self) -> usize {
        self.region.position()
    }

    pub fn remaining(&self) -> usize {
        self.region.remaining()
    }

    pub fn has_remaining(&self) -> bool {
        self.region.has_remaining()
    }

    /// Bytes consumed since the region start.
    pub fn consumed(&self) -> usize {
        self.region.offset()
    }

    pub fn region_len(&self) -> usize {
        self.region.len()
    }

    /// Child reader over the next `length` bytes (clamped), without consuming them.
    pub fn scoped(&self, length: usize) -> (FieldReader<'a>, Option<Warning>) {
        let (region, warning) = self.region.slice(0, Some(length));
        (FieldReader { region }, warning)
    }

    /// Force the cursor to the end of a child created by [`FieldReader::scoped`].
    pub fn advance_past(&mut self, child: &FieldReader<'_>) {
        self.region.advance_past(&child.region);
    }

    fn capture(
        &mut self,
        name: &'static str,
        description: &'static str,
        kind: FieldKind,
        endianness: Endianness,
        read: impl FnOnce(&mut ByteRegion<'a>) -> Result<FieldValue, DecodeError>,
    ) -> Result<AnnotatedField, DecodeError> {
        let start = self.region.position();
        let value = read(&mut self.region).map_err(|err| err.describe(description))?;
        let end = self.region.position();
        Ok(AnnotatedField {
            name,
            description,
            kind,
            endianness,
            value,
            label: None,
            range: ByteRange {
                start,
                size: end - start,
            },
            raw: self.region.absolute(start, end).to_vec(),
            hint: None,
            warnings: Vec::new(),
            children: Vec::new(),
        })
    }

    fn unsigned(
        &mut self,
        name: &'static str,
        description: &'static str,
        kind: FieldKind,
        width: usize,
        endianness: Endianness,
    ) -> Result<AnnotatedField, DecodeError> {
        self.capture(name, description, kind, endianness, |r| {
            r.read_uint(width, endianness, name).map(FieldValue::Unsigned)
        })
    }

    fn signed(
        &mut self,
        name: &'static str,
        description: &'static str,
        kind: FieldKind,
        width: usize,
        endianness: Endianness,
    ) -> Result<AnnotatedField, DecodeError> {
        self.capture(name, description, kind, endianness, |r| {
            r.read_int(width, endianness, name).map(FieldValue::Signed)
        })
    }

    pub fn u8(
        &mut self,
        name: &'static str,
        description: &'static str,
    ) -> Result<AnnotatedField, DecodeError> {
        self.unsigned(name, description, FieldKind::U8, 1, Endianness::None)
    }

    pub fn i8(
        &mut self,
        name: &'static str,
        description: &'static str,
    ) -> Result<AnnotatedField, DecodeError> {
        self.signed(name, description, FieldKind::I8, 1, Endianness::None)
    }

    pub fn u16_le(
        &mut self,
        name: &'static str,
        description: &'static str,
    ) -> Result<AnnotatedField, DecodeError> {
        self.unsigned(name, description, FieldKind::U16, 2, Endianness::Little)
    }

    pub fn u16_be(
        &mut self,
        name: &'static str,
        description: &'static str,
    ) -> Result<AnnotatedField, DecodeError> {
        self.unsigned(name, description, FieldKind::U16, 2, Endianness::Big)
    }

    pub fn i16_le(
        &mut self,
        name: &'static str,
        description: &'static str,
    ) -> Result<AnnotatedField, DecodeError> {
        self.signed(name, description, FieldKind::I16, 2, Endianness::Little)
    }

    pub fn u32_le(
        &mut self,
        name: &'static str,
        description: &'static str,
    ) -> Result<AnnotatedField, DecodeError> {
        self.unsigned(name, description, FieldKind::U32, 4, Endianness::Little)
    }

    pub fn u32_be(
        &mut self,
        name: &'static str,
        description: &'static str,
    ) -> Result<AnnotatedField, DecodeError> {
        self.unsigned(name, description, FieldKind::U32, 4, Endianness::Big)
    }

    pub fn i32_le(
        &mut self,
        name: &'static str,
        description: &'static str,
    ) -> Result<AnnotatedField, DecodeError> {
        self.signed(name, description, FieldKind::I32, 4, Endianness::Little)
    }

    pub fn i32_be(
        &mut self,
        name: &'static str,
        description: &'static str,
    ) -> Result<AnnotatedField, DecodeError> {
        self.signed(name, description, FieldKind::I32, 4, Endianness::Big)
    }

    pub fn f32_le(
        &mut self,
        name: &'static str,
        description: &'static str,
    ) -> Result<AnnotatedField, DecodeError> {
        self.capture(name, description, FieldKind::F32, Endianness::Little, |r| {
            r.read_f32(Endianness::Little, name)
                .map(|v| FieldValue::Float(f64::from(v)))
        })
    }

    pub fn f32_be(
        &mut self,
        name: &'static str,
        description: &'static str,
    ) -> Result<AnnotatedField, DecodeError> {
        self.capture(name, description, FieldKind::F32, Endianness::Big, |r| {
            r.read_f32(Endianness::Big, name)
                .map(|v| FieldValue::Float(f64::from(v)))
        })
    }

    pub fn f64_le(
        &mut self,
        name: &'static str,
        description: &'static str,
    ) -> Result<AnnotatedField, DecodeError> {
        self.capture(name, description, FieldKind::F64, Endianness::Little, |r| {
            r.read_f64(Endianness::Little, name).map(FieldValue::Float)
        })
    }

    pub fn f64_be(
        &mut self,
        name: &'static str,
        description: &'static str,
    ) -> Result<AnnotatedField, DecodeError> {
        self.capture(name, description, FieldKind::F64, Endianness::Big, |r| {
            r.read_f64(Endianness::Big, name).map(FieldValue::Float)
        })
    }

    pub fn bool(
        &mut self,
        name: &'static str,
        description: &'static str,
    ) -> Result<AnnotatedField, DecodeError> {
        self.capture(name, description, FieldKind::Bool, Endianness::None, |r| {
            r.read_bool(name).map(FieldValue::Bool)
        })
    }

    pub fn bitfield(
        &mut self,
        name: &'static str,
        description: &'static str,
    ) -> Result<AnnotatedField, DecodeError> {
        self.unsigned(name, description, FieldKind::Bitfield, 1, Endianness::None)
    }

    /// Packed integer; overflow or hitting the group cap adds a `Truncated` warning.
    pub fn packed(
        &mut self,
        name: &'static str,
        description: &'static str,
    ) -> Result<AnnotatedField, DecodeError> {
        let mut truncated = false;
        let field = self.capture(name, description, FieldKind::Packed, Endianness::None, |r| {
            let packed = r.read_packed(name)?;
            truncated = packed.truncated;
            Ok(FieldValue::Unsigned(u64::from(packed.value)))
        })?;
        if truncated {
            let offset = field.range.start;
            return Ok(field.with_warning(Warning::new(
                WarningKind::Truncated,
                offset,
                format!("packed integer {name} exceeds 32 bits or the maximum group count"),
            )));
        }
        Ok(field)
    }

    /// Packed-length string; malformed UTF-8 adds an `InvalidEncoding` warning.
    pub fn string(
        &mut self,
        name: &'static str,
        description: &'static str,
    ) -> Result<AnnotatedField, DecodeError> {
        let mut lossy = false;
        let field = self.capture(name, description, FieldKind::String, Endianness::None, |r| {
            let decoded = r.read_string(name)?;
            lossy = decoded.lossy;
            Ok(FieldValue::Text(decoded.text))
        })?;
        if lossy {
            let offset = field.range.start;
            return Ok(field.with_warning(Warning::new(
                WarningKind::InvalidEncoding,
                offset,
                format!("{name} contains invalid UTF-8; undecodable bytes were replaced"),
            )));
        }
        Ok(field)
    }

    pub fn bytes(
        &mut self,
        n: usize,
        name: &'static str,
        description: &'static str,
    ) -> Result<AnnotatedField, DecodeError> {
        self.capture(name, description, FieldKind::Bytes, Endianness::None, |r| {
            r.read_bytes(n, name).map(|b| FieldValue::Bytes(b.to_vec()))
        })
    }

    /// Every remaining byte as one raw field.
    pub fn rest(
        &mut self,
        name: &'static str,
        description: &'static str,
    ) -> Result<AnnotatedField, DecodeError> {
        let n = self.remaining();
        self.bytes(n, name, description)
    }

    /// Four bytes rendered as a dotted IPv4 address.
    pub fn ipv4(
        &mut self,
        name: &'static str,
        description: &'static str,
    ) -> Result<AnnotatedField, DecodeError> {
        let field = self.bytes(4, name, description)?;
        let label = field
            .raw
            .iter()
            .map(|b| b.to_string())
            .collect::<Vec<_>>()
            .join(".");
        Ok(field.with_label(label))
    }

    /// Close a structural node that started at absolute offset `start`.
    pub fn group(
        &self,
        name: &'static str,
        description: &'static str,
        start: usize,
        fields: Fields,
    ) -> AnnotatedField {
        let end = self.position().max(start);
        AnnotatedField {
            name,
            description,
            kind: FieldKind::Group,
            endianness: Endianness::None,
            value: FieldValue::None,
            label: None,
            range: ByteRange {
                start,
                size: end - start,
            },
            raw: self.region.absolute(start, end).to_vec(),
            hint: None,
            warnings: fields.warnings,
            children: fields.children,
        }
    }
}
