//! HazelShark core library for offline dissection of Hazel game traffic.
//!
//! This crate turns raw datagrams of the game's UDP transport into a tree of
//! annotated fields: every decoded value keeps its name, kind, byte range and
//! raw bytes, plus any anomalies noticed while reading it. Decoding is
//! byte-oriented and side-effect free; all file I/O is isolated in `source`
//! and `workspace`.
//!
//! Three decoders share the same primitives (layout/reader/parser):
//! - [`decode`]: game-server packets (opcode → payload → message → RPC/spawn).
//! - [`decode_announcement`]: announcement-server packets.
//! - [`decode_region_info`]: region descriptor files.
//!
//! The primitives are public too: [`ByteRegion`] is the bounds-checked cursor
//! and [`FieldReader`] wraps it to produce annotated fields, so other layouts
//! can be dissected the same way.
//!
//! Invariants:
//! - A field's `range.size` always equals the number of bytes its read consumed.
//! - Recoverable anomalies become [`Warning`]s on the nearest node; only a
//!   mandatory read past the end of the buffer is fatal ([`DecodeError`]).
//! - Nothing is shared between decode calls except static lookup tables.
//!
//! # Examples
//! ```
//! use hazelshark_core::{Direction, decode};
//!
//! let bytes = [0x0c, 0x00, 0x2a];
//! let packet = decode(&bytes, Direction::Clientbound)?;
//! assert_eq!(packet.opcode, 0x0c);
//! assert_eq!(packet.field("Nonce").and_then(|f| f.value.as_u64()), Some(42));
//! # Ok::<(), hazelshark_core::DecodeError>(())
//! ```

use serde::{Deserialize, Serialize, Serializer};

mod capture;
pub mod codec;
mod protocols;
mod source;
mod workspace;

pub use capture::{
    CaptureConfig, CaptureEntry, CaptureError, CaptureReport, decode_capture, decode_source,
};
pub use protocols::announcement::decode_announcement;
pub use protocols::common::cursor::{ByteRegion, DecodedString};
pub use protocols::common::error::{DecodeError, Warning, WarningKind};
pub use protocols::common::fields::{FieldReader, Fields};
pub use protocols::common::hex::{format_hex, parse_hex};
pub use protocols::common::names::{self, LabelTable};
pub use protocols::hazel::bitfields::{PlayerFlags, VoteState, VoteTarget};
pub use protocols::hazel::decode;
pub use protocols::region::decode_region_info;
pub use source::{CaptureFrame, FrameSource, PcapFileSource, SourceError};
pub use workspace::{PacketKind, PacketRecord, RecordDecode, Workspace, WorkspaceError};

/// Which side of the connection sent a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Client to server.
    Serverbound,
    /// Server to client.
    Clientbound,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Serverbound => "serverbound",
            Direction::Clientbound => "clientbound",
        }
    }
}

/// Wire kind of an annotated field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
    F64,
    Bool,
    Bitfield,
    Packed,
    String,
    Bytes,
    /// Structural node (payload, message, record) holding child fields.
    Group,
}

/// Byte order of a multi-byte field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    Big,
    Little,
    None,
}

/// Decoded value of a field, typed by its [`FieldKind`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    #[serde(serialize_with = "serialize_hex")]
    Bytes(Vec<u8>),
    None,
}

impl FieldValue {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            FieldValue::Unsigned(value) => Some(*value),
            FieldValue::Signed(value) => u64::try_from(*value).ok(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Unsigned(value) => i64::try_from(*value).ok(),
            FieldValue::Signed(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            FieldValue::Bytes(value) => Some(value),
            _ => None,
        }
    }
}

/// Absolute position of a field inside the original buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ByteRange {
    pub start: usize,
    pub size: usize,
}

impl ByteRange {
    pub fn end(&self) -> usize {
        self.start + self.size
    }
}

/// How a renderer turns a raw value into a label.
///
/// Hints are pure: a static table lookup or a formatting function.
#[derive(Clone, Copy)]
pub enum DisplayHint {
    Table(&'static LabelTable),
    Format(fn(&FieldValue) -> Option<String>),
}

impl DisplayHint {
    pub fn label(&self, value: &FieldValue) -> Option<String> {
        match self {
            DisplayHint::Table(table) => value
                .as_u64()
                .and_then(|key| table.lookup(key))
                .map(str::to_string),
            DisplayHint::Format(format) => format(value),
        }
    }
}

impl std::fmt::Debug for DisplayHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayHint::Table(table) => write!(f, "Table({})", table.name),
            DisplayHint::Format(_) => write!(f, "Format(..)"),
        }
    }
}

/// One decoded value (or structural node) with full provenance.
///
/// # Examples
/// ```
/// use hazelshark_core::{Direction, FieldKind, decode};
///
/// let packet = decode(&[0x0c, 0x00, 0x01], Direction::Serverbound)?;
/// let nonce = packet.field("Nonce").unwrap();
/// assert_eq!(nonce.kind, FieldKind::U16);
/// assert_eq!(nonce.range.start, 1);
/// assert_eq!(nonce.range.size, 2);
/// assert_eq!(nonce.raw, vec![0x00, 0x01]);
/// # Ok::<(), hazelshark_core::DecodeError>(())
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct AnnotatedField {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: FieldKind,
    pub endianness: Endianness,
    pub value: FieldValue,
    /// Label resolved from `hint` at construction time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub range: ByteRange,
    #[serde(serialize_with = "serialize_hex")]
    pub raw: Vec<u8>,
    #[serde(skip)]
    pub hint: Option<DisplayHint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<AnnotatedField>,
}

impl AnnotatedField {
    /// Attach a display hint and resolve its label.
    pub fn with_hint(mut self, hint: DisplayHint) -> Self {
        self.label = hint.label(&self.value);
        self.hint = Some(hint);
        self
    }

    /// Attach a static lookup table as display hint.
    pub fn with_table(self, table: &'static LabelTable) -> Self {
        self.with_hint(DisplayHint::Table(table))
    }

    /// Attach a formatting function as display hint.
    pub fn with_format(self, format: fn(&FieldValue) -> Option<String>) -> Self {
        self.with_hint(DisplayHint::Format(format))
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_warning(mut self, warning: Warning) -> Self {
        self.warnings.push(warning);
        self
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&AnnotatedField> {
        self.children.iter().find(|child| child.name == name)
    }

    /// All direct children with the given name, in order.
    pub fn children_named<'s>(
        &'s self,
        name: &'s str,
    ) -> impl Iterator<Item = &'s AnnotatedField> + 's {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Follow a path of child names, e.g. `["Payload", "Game code"]`.
    pub fn path(&self, names: &[&str]) -> Option<&AnnotatedField> {
        names
            .iter()
            .try_fold(self, |field, name| field.child(name))
    }

    /// Visit this field and all of its descendants depth-first.
    pub fn walk<'s>(&'s self, visit: &mut impl FnMut(&'s AnnotatedField)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// Result of [`decode`]: a game-server packet.
#[derive(Debug, Clone, Serialize)]
pub struct DecodedPacket {
    pub direction: Direction,
    pub opcode: u8,
    pub fields: Vec<AnnotatedField>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

/// Result of [`decode_announcement`].
#[derive(Debug, Clone, Serialize)]
pub struct AnnouncementPacket {
    pub opcode: u8,
    pub fields: Vec<AnnotatedField>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

/// Result of [`decode_region_info`].
#[derive(Debug, Clone, Serialize)]
pub struct RegionInfo {
    pub fields: Vec<AnnotatedField>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

/// Shared read access to a decoded field tree.
pub trait FieldTree {
    fn fields(&self) -> &[AnnotatedField];
    fn packet_warnings(&self) -> &[Warning];

    /// First top-level field with the given name.
    fn field(&self, name: &str) -> Option<&AnnotatedField> {
        self.fields().iter().find(|field| field.name == name)
    }

    /// Packet warnings followed by every field warning, depth-first.
    fn all_warnings(&self) -> Vec<&Warning> {
        let mut out: Vec<&Warning> = self.packet_warnings().iter().collect();
        for field in self.fields() {
            field.walk(&mut |node| out.extend(node.warnings.iter()));
        }
        out
    }
}

macro_rules! impl_field_tree {
    ($($ty:ty),*) => {
        $(impl FieldTree for $ty {
            fn fields(&self) -> &[AnnotatedField] {
                &self.fields
            }

            fn packet_warnings(&self) -> &[Warning] {
                &self.warnings
            }
        })*
    };
}

impl_field_tree!(DecodedPacket, AnnouncementPacket, RegionInfo);

impl DecodedPacket {
    pub fn field(&self, name: &str) -> Option<&AnnotatedField> {
        FieldTree::field(self, name)
    }

    pub fn all_warnings(&self) -> Vec<&Warning> {
        FieldTree::all_warnings(self)
    }
}

fn serialize_hex<S, B>(bytes: B, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    B: AsRef<[u8]>,
{
    serializer.serialize_str(&format_hex(bytes.as_ref()))
}
