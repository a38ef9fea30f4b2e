//! Dispatch values and wire constants of the game-server protocol.
//!
//! Every dispatch level is a closed set with an `Unknown` variant that keeps
//! the raw value; decoders never fail on an unrecognized tag.

/// Top-level packet kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Unreliable,
    Reliable,
    Hello,
    Disconnect,
    Acknowledge,
    Ping,
    Unknown(u8),
}

impl Opcode {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0x00 => Opcode::Unreliable,
            0x01 => Opcode::Reliable,
            0x08 => Opcode::Hello,
            0x09 => Opcode::Disconnect,
            0x0a => Opcode::Acknowledge,
            0x0c => Opcode::Ping,
            other => Opcode::Unknown(other),
        }
    }
}

/// Root message tag inside a reliable or unreliable packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadTag {
    HostGame,
    JoinGame,
    StartGame,
    RemoveGame,
    RemovePlayer,
    GameData,
    GameDataTo,
    JoinedGame,
    EndGame,
    GetGameListLegacy,
    AlterGame,
    KickPlayer,
    WaitForHost,
    Redirect,
    MasterServerList,
    GetGameList,
    ReportPlayer,
    Unknown(u8),
}

impl PayloadTag {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0x00 => PayloadTag::HostGame,
            0x01 => PayloadTag::JoinGame,
            0x02 => PayloadTag::StartGame,
            0x03 => PayloadTag::RemoveGame,
            0x04 => PayloadTag::RemovePlayer,
            0x05 => PayloadTag::GameData,
            0x06 => PayloadTag::GameDataTo,
            0x07 => PayloadTag::JoinedGame,
            0x08 => PayloadTag::EndGame,
            0x09 => PayloadTag::GetGameListLegacy,
            0x0a => PayloadTag::AlterGame,
            0x0b => PayloadTag::KickPlayer,
            0x0c => PayloadTag::WaitForHost,
            0x0d => PayloadTag::Redirect,
            0x0e => PayloadTag::MasterServerList,
            0x10 => PayloadTag::GetGameList,
            0x11 => PayloadTag::ReportPlayer,
            other => PayloadTag::Unknown(other),
        }
    }
}

/// Game-data message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Data,
    Rpc,
    Spawn,
    Despawn,
    SceneChange,
    Ready,
    ChangeSettings,
    Unknown(u8),
}

impl MessageType {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0x01 => MessageType::Data,
            0x02 => MessageType::Rpc,
            0x04 => MessageType::Spawn,
            0x05 => MessageType::Despawn,
            0x06 => MessageType::SceneChange,
            0x07 => MessageType::Ready,
            0x08 => MessageType::ChangeSettings,
            other => MessageType::Unknown(other),
        }
    }
}

/// Networked object kinds created by a spawn message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnType {
    ShipStatus,
    MeetingHud,
    LobbyBehaviour,
    GameData,
    Player,
    Headquarters,
    PlanetMap,
    AprilShipStatus,
    Unknown(u64),
}

impl SpawnType {
    pub fn from_u64(value: u64) -> Self {
        match value {
            0 => SpawnType::ShipStatus,
            1 => SpawnType::MeetingHud,
            2 => SpawnType::LobbyBehaviour,
            3 => SpawnType::GameData,
            4 => SpawnType::Player,
            5 => SpawnType::Headquarters,
            6 => SpawnType::PlanetMap,
            7 => SpawnType::AprilShipStatus,
            other => SpawnType::Unknown(other),
        }
    }
}

/// A clientbound join-game body at least this long is a success reply.
pub const JOIN_SUCCESS_MIN_LEN: usize = 12;

/// Disconnect reason followed by a free-text message.
pub const DISCONNECT_REASON_CUSTOM: u64 = 0x08;

/// Trailing byte of an acknowledgement.
pub const ACK_TRAILER: u64 = 0xff;

/// Dead-body report target meaning the emergency button was pressed.
pub const EMERGENCY_BUTTON: u64 = 0xff;
