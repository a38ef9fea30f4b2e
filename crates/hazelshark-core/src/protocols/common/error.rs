use serde::Serialize;
use thiserror::Error;

/// Fatal decoding errors. Any of these aborts the whole decode call.
///
/// # Examples
/// ```
/// use hazelshark_core::{DecodeError, Direction, decode};
///
/// let err = decode(&[], Direction::Serverbound).unwrap_err();
/// assert!(matches!(err, DecodeError::BufferUnderrun { offset: 0, .. }));
/// assert!(err.to_string().contains("Opcode"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error(
        "buffer underrun reading {field} at offset {offset}: need {needed} bytes, {available} available"
    )]
    BufferUnderrun {
        field: String,
        /// Description of the field being read, when known.
        description: Option<&'static str>,
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("invalid hex input at character {position}: {reason}")]
    InvalidHex { position: usize, reason: &'static str },
}

impl DecodeError {
    pub(crate) fn underrun(field: &str, offset: usize, needed: usize, available: usize) -> Self {
        DecodeError::BufferUnderrun {
            field: field.to_string(),
            description: None,
            offset,
            needed,
            available,
        }
    }

    /// Attach the field description to an underrun that lacks one.
    pub(crate) fn describe(self, text: &'static str) -> Self {
        match self {
            DecodeError::BufferUnderrun {
                field,
                description: None,
                offset,
                needed,
                available,
            } => DecodeError::BufferUnderrun {
                field,
                description: (!text.is_empty()).then_some(text),
                offset,
                needed,
                available,
            },
            other => other,
        }
    }

    /// Name of the field whose read failed, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            DecodeError::BufferUnderrun { field, .. } => Some(field),
            DecodeError::InvalidHex { .. } => None,
        }
    }

    /// Absolute byte offset at which decoding failed.
    pub fn offset(&self) -> Option<usize> {
        match self {
            DecodeError::BufferUnderrun { offset, .. } => Some(*offset),
            DecodeError::InvalidHex { .. } => None,
        }
    }
}

/// Category of a recoverable anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Declared record length differs from the bytes actually consumed.
    LengthMismatch,
    /// Declared length exceeded the remaining buffer and was truncated.
    ClampedLength,
    /// Dispatch value with no known variant; bytes kept raw.
    UnknownTag,
    /// Malformed UTF-8 replaced during string decoding.
    InvalidEncoding,
    /// A protocol constant did not hold its expected value.
    UnexpectedValue,
    /// Packed integer overflowed 32 bits or exceeded the maximum group count.
    Truncated,
}

/// A non-fatal anomaly attached to a field or packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    /// Absolute byte offset the anomaly refers to.
    pub offset: usize,
    pub message: String,
}

impl Warning {
    pub fn new(kind: WarningKind, offset: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            offset,
            message: message.into(),
        }
    }

    pub(crate) fn length_mismatch(
        what: &str,
        offset: usize,
        declared: usize,
        consumed: usize,
    ) -> Self {
        Self::new(
            WarningKind::LengthMismatch,
            offset,
            format!(
                "invalid length of {what} at byte {offset}: declared {declared}, decoded {consumed}"
            ),
        )
    }

    pub(crate) fn unknown_tag(what: &str, offset: usize, value: u64) -> Self {
        Self::new(
            WarningKind::UnknownTag,
            offset,
            format!("invalid or unsupported {what} 0x{value:02x}"),
        )
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (byte {})", self.message, self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn underrun_message_names_field_and_offset() {
        let err = DecodeError::underrun("Payload tag", 12, 1, 0);
        let msg = err.to_string();
        assert!(msg.contains("Payload tag"));
        assert!(msg.contains("offset 12"));
        assert_eq!(err.field(), Some("Payload tag"));
        assert_eq!(err.offset(), Some(12));
    }

    #[test]
    fn describe_fills_missing_description_once() {
        let err = DecodeError::underrun("Nonce", 1, 2, 1)
            .describe("first")
            .describe("second");
        assert!(matches!(
            err,
            DecodeError::BufferUnderrun {
                description: Some("first"),
                ..
            }
        ));
    }

    #[test]
    fn warning_serializes_kind_in_snake_case() {
        let warning = Warning::length_mismatch("payload", 3, 6, 4);
        let value = serde_json::to_value(&warning).unwrap();
        assert_eq!(value["kind"], "length_mismatch");
        assert_eq!(value["offset"], 3);
        assert!(warning.message.contains("declared 6"));
    }
}
