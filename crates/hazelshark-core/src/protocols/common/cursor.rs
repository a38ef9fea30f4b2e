use std::borrow::Cow;

use super::error::{DecodeError, Warning, WarningKind};
use crate::Endianness;
use crate::codec::varint::{self, PackedInt};

/// Bounds-checked sequential reader over a window of a shared buffer.
///
/// `base` and `end` are absolute offsets into the original capture, so every
/// error and warning reports positions that stay meaningful across nesting.
#[derive(Debug, Clone)]
pub struct ByteRegion<'a> {
    data: &'a [u8],
    base: usize,
    offset: usize,
    end: usize,
}

/// A length-prefixed string and whether its bytes were valid UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedString {
    pub text: String,
    pub lossy: bool,
}

impl<'a> ByteRegion<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            base: 0,
            offset: 0,
            end: data.len(),
        }
    }

    /// Absolute offset of this region's first byte.
    pub fn base(&self) -> usize {
        self.base
    }

    /// Absolute offset one past this region's last byte.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Cursor position relative to the region start.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Absolute cursor position.
    pub fn position(&self) -> usize {
        self.base + self.offset
    }

    pub fn len(&self) -> usize {
        self.end - self.base
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn remaining(&self) -> usize {
        self.len() - self.offset
    }

    pub fn has_remaining(&self) -> bool {
        self.remaining() > 0
    }

    /// Move the cursor to `offset` (relative), clamped to the region end.
    pub fn seek(&mut self, offset: usize) {
        self.offset = offset.min(self.len());
    }

    /// Advance by `n` bytes; fails when fewer remain.
    pub fn skip(&mut self, n: usize, field: &str) -> Result<(), DecodeError> {
        self.require(n, field)?;
        self.offset += n;
        Ok(())
    }

    /// Bytes between two absolute offsets of the underlying buffer.
    pub fn absolute(&self, start: usize, end: usize) -> &'a [u8] {
        let end = end.min(self.data.len());
        let start = start.min(end);
        &self.data[start..end]
    }

    /// Unread bytes of this region.
    pub fn rest(&self) -> &'a [u8] {
        self.absolute(self.position(), self.end)
    }

    pub fn require(&self, needed: usize, field: &str) -> Result<(), DecodeError> {
        if self.remaining() < needed {
            return Err(DecodeError::underrun(
                field,
                self.position(),
                needed,
                self.remaining(),
            ));
        }
        Ok(())
    }

    /// Child region over `[start, start + length)` relative to the cursor.
    ///
    /// Missing `length` means "everything after `start`". A length larger than
    /// what remains is clamped and reported as a `ClampedLength` warning.
    pub fn slice(&self, start: usize, length: Option<usize>) -> (ByteRegion<'a>, Option<Warning>) {
        let start = start.min(self.remaining());
        let available = self.remaining() - start;
        let child_base = self.position() + start;
        let (length, warning) = match length {
            Some(length) if length > available => (
                available,
                Some(Warning::new(
                    WarningKind::ClampedLength,
                    child_base,
                    format!("declared length {length} exceeds remaining {available} bytes"),
                )),
            ),
            Some(length) => (length, None),
            None => (available, None),
        };
        let child = ByteRegion {
            data: self.data,
            base: child_base,
            offset: 0,
            end: child_base + length,
        };
        (child, warning)
    }

    /// Move the cursor to the absolute end of a child region.
    pub fn advance_past(&mut self, child: &ByteRegion<'_>) {
        self.seek(child.end.saturating_sub(self.base));
    }

    fn take<const N: usize>(&mut self, field: &str) -> Result<[u8; N], DecodeError> {
        self.require(N, field)?;
        let start = self.position();
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[start..start + N]);
        self.offset += N;
        Ok(out)
    }

    pub fn read_u8(&mut self, field: &str) -> Result<u8, DecodeError> {
        Ok(self.take::<1>(field)?[0])
    }

    /// Read an unsigned integer of 1, 2, 4 or 8 bytes.
    pub fn read_uint(
        &mut self,
        width: usize,
        endianness: Endianness,
        field: &str,
    ) -> Result<u64, DecodeError> {
        self.require(width, field)?;
        let start = self.position();
        let bytes = &self.data[start..start + width];
        let value = match endianness {
            Endianness::Big => bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)),
            Endianness::Little | Endianness::None => bytes
                .iter()
                .rev()
                .fold(0u64, |acc, b| (acc << 8) | u64::from(*b)),
        };
        self.offset += width;
        Ok(value)
    }

    /// Read a two's-complement signed integer of 1, 2, 4 or 8 bytes.
    pub fn read_int(
        &mut self,
        width: usize,
        endianness: Endianness,
        field: &str,
    ) -> Result<i64, DecodeError> {
        let raw = self.read_uint(width, endianness, field)?;
        let shift = 64 - 8 * width as u32;
        Ok(((raw << shift) as i64) >> shift)
    }

    pub fn read_f32(&mut self, endianness: Endianness, field: &str) -> Result<f32, DecodeError> {
        let bytes = self.take::<4>(field)?;
        Ok(match endianness {
            Endianness::Big => f32::from_be_bytes(bytes),
            Endianness::Little | Endianness::None => f32::from_le_bytes(bytes),
        })
    }

    pub fn read_f64(&mut self, endianness: Endianness, field: &str) -> Result<f64, DecodeError> {
        let bytes = self.take::<8>(field)?;
        Ok(match endianness {
            Endianness::Big => f64::from_be_bytes(bytes),
            Endianness::Little | Endianness::None => f64::from_le_bytes(bytes),
        })
    }

    pub fn read_bool(&mut self, field: &str) -> Result<bool, DecodeError> {
        Ok(self.read_u8(field)? == 0x01)
    }

    pub fn read_bytes(&mut self, n: usize, field: &str) -> Result<&'a [u8], DecodeError> {
        self.require(n, field)?;
        let start = self.position();
        self.offset += n;
        Ok(&self.data[start..start + n])
    }

    /// Read a packed integer, consuming at most `MAX_PACKED_GROUPS` bytes.
    pub fn read_packed(&mut self, field: &str) -> Result<PackedInt, DecodeError> {
        self.require(1, field)?;
        let rest = self.rest();
        match varint::decode_packed(rest) {
            Some(packed) => {
                self.offset += packed.len;
                Ok(packed)
            }
            None => Err(DecodeError::underrun(
                field,
                self.position() + rest.len(),
                1,
                0,
            )),
        }
    }

    /// Read a packed length followed by that many bytes of UTF-8.
    ///
    /// Invalid sequences are replaced rather than rejected.
    pub fn read_string(&mut self, field: &str) -> Result<DecodedString, DecodeError> {
        let length = self.read_packed(field)?.value as usize;
        let bytes = self.read_bytes(length, field)?;
        Ok(match String::from_utf8_lossy(bytes) {
            Cow::Borrowed(text) => DecodedString {
                text: text.to_string(),
                lossy: false,
            },
            Cow::Owned(text) => DecodedString { text, lossy: true },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::ByteRegion;
    use crate::protocols::common::error::{DecodeError, WarningKind};
    use crate::Endianness;

    #[test]
    fn fixed_reads_respect_endianness() {
        let data = [0x12, 0x34, 0x12, 0x34];
        let mut region = ByteRegion::new(&data);
        assert_eq!(region.read_uint(2, Endianness::Big, "be").unwrap(), 0x1234);
        assert_eq!(region.read_uint(2, Endianness::Little, "le").unwrap(), 0x3412);
        assert_eq!(region.remaining(), 0);
    }

    #[test]
    fn signed_reads_sign_extend() {
        let data = [0xfe, 0xff, 0xff, 0xff];
        let mut region = ByteRegion::new(&data);
        assert_eq!(region.read_int(4, Endianness::Little, "v").unwrap(), -2);
    }

    #[test]
    fn underrun_reports_field_and_absolute_offset() {
        let data = [0u8; 5];
        let region = ByteRegion::new(&data);
        let (mut child, warning) = region.slice(2, Some(2));
        assert!(warning.is_none());
        assert_eq!(child.base(), 2);
        child.read_u8("first").unwrap();
        let err = child.read_uint(2, Endianness::Little, "second").unwrap_err();
        assert_eq!(
            err,
            DecodeError::underrun("second", 3, 2, 1)
        );
    }

    #[test]
    fn slice_clamps_oversized_length() {
        let data = [0u8; 4];
        let mut region = ByteRegion::new(&data);
        region.read_u8("skip").unwrap();
        let (child, warning) = region.slice(0, Some(10));
        assert_eq!(child.len(), 3);
        let warning = warning.expect("clamp warning");
        assert_eq!(warning.kind, WarningKind::ClampedLength);
        assert_eq!(warning.offset, 1);
    }

    #[test]
    fn advance_past_moves_parent_to_child_end() {
        let data = [0u8; 8];
        let mut region = ByteRegion::new(&data);
        region.read_u8("a").unwrap();
        let (child, _) = region.slice(0, Some(4));
        region.advance_past(&child);
        assert_eq!(region.position(), 5);
    }

    #[test]
    fn string_reads_replace_invalid_utf8() {
        let data = [0x03, b'a', 0xff, b'b'];
        let mut region = ByteRegion::new(&data);
        let decoded = region.read_string("name").unwrap();
        assert!(decoded.lossy);
        assert_eq!(decoded.text, "a\u{fffd}b");
    }

    #[test]
    fn string_longer_than_buffer_is_fatal() {
        let data = [0x05, b'a'];
        let mut region = ByteRegion::new(&data);
        let err = region.read_string("name").unwrap_err();
        assert_eq!(err.offset(), Some(1));
    }

    #[test]
    fn packed_without_terminator_is_fatal() {
        let data = [0x80, 0x80];
        let mut region = ByteRegion::new(&data);
        assert!(region.read_packed("count").is_err());
    }

    #[test]
    fn big_and_little_endian_floats() {
        let mut data = 1.5f32.to_be_bytes().to_vec();
        data.extend_from_slice(&1.5f32.to_le_bytes());
        data.extend_from_slice(&(-2.25f64).to_be_bytes());
        data.extend_from_slice(&(-2.25f64).to_le_bytes());
        let mut region = ByteRegion::new(&data);
        assert_eq!(region.read_f32(Endianness::Big, "a").unwrap(), 1.5);
        assert_eq!(region.read_f32(Endianness::Little, "b").unwrap(), 1.5);
        assert_eq!(region.read_f64(Endianness::Big, "c").unwrap(), -2.25);
        assert_eq!(region.read_f64(Endianness::Little, "d").unwrap(), -2.25);
        assert!(!region.has_remaining());
    }

    #[test]
    fn big_and_little_endian_32_bit_integers() {
        let data = [0xff, 0xff, 0xff, 0xfe, 0x78, 0x56, 0x34, 0x12];
        let mut region = ByteRegion::new(&data);
        assert_eq!(region.read_int(4, Endianness::Big, "be").unwrap(), -2);
        assert_eq!(region.read_uint(4, Endianness::Little, "le").unwrap(), 0x1234_5678);
    }

    #[test]
    fn skip_past_end_is_fatal_and_does_not_move() {
        let data = [0u8; 3];
        let mut region = ByteRegion::new(&data);
        region.skip(2, "padding").unwrap();
        let err = region.skip(2, "padding").unwrap_err();
        assert_eq!(err, DecodeError::underrun("padding", 2, 2, 1));
        assert_eq!(region.offset(), 2);
    }

    #[test]
    fn empty_region_reports_bounds() {
        let mut region = ByteRegion::new(&[]);
        assert!(region.is_empty());
        assert_eq!(region.end(), 0);
        assert!(region.read_u8("Opcode").is_err());
    }

    #[test]
    fn seek_is_clamped() {
        let data = [0u8; 3];
        let mut region = ByteRegion::new(&data);
        region.seek(10);
        assert_eq!(region.remaining(), 0);
    }
}
