//! Saved packets.
//!
//! Only the raw bytes and the metadata needed to decode them again are
//! persisted; the decoded tree is always rebuilt from `data`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::{
    AnnouncementPacket, DecodeError, DecodedPacket, Direction, FieldTree, RegionInfo,
    decode, decode_announcement, decode_region_info, format_hex, parse_hex,
};

/// Which decoder a saved packet belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacketKind {
    GameServer,
    AnnouncementServer,
    RegionInfo,
}

impl PacketKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PacketKind::GameServer => "game_server",
            PacketKind::AnnouncementServer => "announcement_server",
            PacketKind::RegionInfo => "region_info",
        }
    }
}

/// A named packet as stored in a workspace file.
///
/// # Examples
/// ```
/// use hazelshark_core::{Direction, PacketKind, PacketRecord, RecordDecode};
///
/// let record = PacketRecord {
///     name: "Ping".to_string(),
///     data: vec![0x0c, 0x00, 0x07],
///     direction: Direction::Clientbound,
///     kind: PacketKind::GameServer,
/// };
/// let json = serde_json::to_string(&record)?;
/// assert!(json.contains("\"0c 00 07\""));
/// assert!(matches!(record.decode(), Ok(RecordDecode::Game(_))));
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketRecord {
    pub name: String,
    #[serde(serialize_with = "bytes_as_hex", deserialize_with = "bytes_from_hex_or_list")]
    pub data: Vec<u8>,
    pub direction: Direction,
    pub kind: PacketKind,
}

/// Decoded form of a [`PacketRecord`].
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RecordDecode {
    Game(DecodedPacket),
    Announcement(AnnouncementPacket),
    Region(RegionInfo),
}

impl RecordDecode {
    pub fn tree(&self) -> &dyn FieldTree {
        match self {
            RecordDecode::Game(packet) => packet,
            RecordDecode::Announcement(packet) => packet,
            RecordDecode::Region(info) => info,
        }
    }
}

impl PacketRecord {
    pub fn new(name: impl Into<String>, data: Vec<u8>, direction: Direction, kind: PacketKind) -> Self {
        Self {
            name: name.into(),
            data,
            direction,
            kind,
        }
    }

    /// Run the decoder matching `kind` over the stored bytes.
    pub fn decode(&self) -> Result<RecordDecode, DecodeError> {
        Ok(match self.kind {
            PacketKind::GameServer => RecordDecode::Game(decode(&self.data, self.direction)?),
            PacketKind::AnnouncementServer => {
                RecordDecode::Announcement(decode_announcement(&self.data)?)
            }
            PacketKind::RegionInfo => RecordDecode::Region(decode_region_info(&self.data)?),
        })
    }
}

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("failed to read workspace {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write workspace {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid workspace JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// An ordered collection of saved packets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub packets: Vec<PacketRecord>,
}

impl Workspace {
    pub fn load(path: &Path) -> Result<Self, WorkspaceError> {
        let text = fs::read_to_string(path).map_err(|source| WorkspaceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, WorkspaceError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, WorkspaceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), WorkspaceError> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|source| WorkspaceError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Record by name; the first one wins when names repeat.
    pub fn get(&self, name: &str) -> Option<&PacketRecord> {
        self.packets.iter().find(|record| record.name == name)
    }

    /// Two captured packets: a client hello and a master server list.
    pub fn sample() -> Self {
        Self {
            packets: vec![
                PacketRecord::new(
                    "Hello",
                    SAMPLE_HELLO.to_vec(),
                    Direction::Serverbound,
                    PacketKind::GameServer,
                ),
                PacketRecord::new(
                    "Master server list",
                    SAMPLE_MASTER_SERVERS.to_vec(),
                    Direction::Clientbound,
                    PacketKind::GameServer,
                ),
            ],
        }
    }
}

const SAMPLE_HELLO: &[u8] = &[
    8, 0, 1, 0, 70, 210, 2, 3, 8, 119, 101, 97, 107, 101, 121, 101, 115,
];

const SAMPLE_MASTER_SERVERS: &[u8] = &[
    0, 121, 0, 14, 1, 6, 17, 0, 0, 8, 77, 97, 115, 116, 101, 114, 45, 53, 198, 58, 99, 71, 7,
    86, 233, 49, 17, 0, 0, 8, 77, 97, 115, 116, 101, 114, 45, 54, 45, 79, 5, 6, 7, 86, 220, 52,
    16, 0, 0, 8, 77, 97, 115, 116, 101, 114, 45, 52, 45, 79, 40, 75, 7, 86, 44, 17, 0, 0, 8, 77,
    97, 115, 116, 101, 114, 45, 51, 45, 79, 40, 75, 7, 86, 218, 93, 17, 0, 0, 8, 77, 97, 115,
    116, 101, 114, 45, 50, 104, 237, 135, 186, 7, 86, 141, 57, 17, 0, 0, 8, 77, 97, 115, 116,
    101, 114, 45, 49, 104, 237, 135, 186, 7, 86, 146, 2,
];

fn bytes_as_hex<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_hex(bytes))
}

/// Accept hex text or a plain array of byte values.
fn bytes_from_hex_or_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Bytes {
        Hex(String),
        List(Vec<u8>),
    }

    match Bytes::deserialize(deserializer)? {
        Bytes::Hex(text) => parse_hex(&text).map_err(serde::de::Error::custom),
        Bytes::List(bytes) => Ok(bytes),
    }
}
