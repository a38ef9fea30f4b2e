//! Packed flag bytes and the formatting hints attached to encoded values.

use std::fmt;

use serde::Serialize;

use crate::FieldValue;
use crate::codec::{ClientVersion, decode_coordinate, int_to_code};
use crate::protocols::common::names;

const VOTE_DEAD: u8 = 0x80;
const VOTE_VOTED: u8 = 0x40;
const VOTE_REPORTED: u8 = 0x20;
const VOTE_TARGET_MASK: u8 = 0x0f;
const VOTE_SKIPPED: u8 = 0x00;
const VOTE_NONE: u8 = 0x0f;

const PLAYER_DISCONNECTED: u8 = 0x01;
const PLAYER_IMPOSTOR: u8 = 0x02;
const PLAYER_DEAD: u8 = 0x04;

/// Who a meeting participant voted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteTarget {
    NoVote,
    Skipped,
    Player(u8),
}

/// One player's state in the meeting vote display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteState {
    pub target: VoteTarget,
    pub reported: bool,
    pub voted: bool,
    pub dead: bool,
}

impl VoteState {
    pub fn from_byte(byte: u8) -> Self {
        let target = match byte & VOTE_TARGET_MASK {
            VOTE_NONE => VoteTarget::NoVote,
            VOTE_SKIPPED => VoteTarget::Skipped,
            nibble => VoteTarget::Player(nibble - 1),
        };
        Self {
            target,
            reported: byte & VOTE_REPORTED != 0,
            voted: byte & VOTE_VOTED != 0,
            dead: byte & VOTE_DEAD != 0,
        }
    }
}

impl fmt::Display for VoteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target {
            VoteTarget::NoVote => f.write_str("no vote")?,
            VoteTarget::Skipped => f.write_str("skipped")?,
            VoteTarget::Player(id) => write!(f, "voted for player {id}")?,
        }
        let flags: Vec<&str> = [
            (self.reported, "reported"),
            (self.voted, "voted"),
            (self.dead, "dead"),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
        .collect();
        if !flags.is_empty() {
            write!(f, " ({})", flags.join(", "))?;
        }
        Ok(())
    }
}

/// Status flags of a player-info record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlayerFlags {
    pub disconnected: bool,
    pub impostor: bool,
    pub dead: bool,
}

impl PlayerFlags {
    pub fn from_byte(byte: u8) -> Self {
        Self {
            disconnected: byte & PLAYER_DISCONNECTED != 0,
            impostor: byte & PLAYER_IMPOSTOR != 0,
            dead: byte & PLAYER_DEAD != 0,
        }
    }
}

impl fmt::Display for PlayerFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let set: Vec<&str> = [
            (self.disconnected, "Disconnected"),
            (self.impostor, "Impostor"),
            (self.dead, "Dead"),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
        .collect();
        if set.is_empty() {
            f.write_str("None")
        } else {
            f.write_str(&set.join(" | "))
        }
    }
}

fn byte_of(value: &FieldValue) -> Option<u8> {
    value.as_u64().and_then(|v| u8::try_from(v).ok())
}

pub fn vote_state_label(value: &FieldValue) -> Option<String> {
    byte_of(value).map(|b| VoteState::from_byte(b).to_string())
}

pub fn player_flags_label(value: &FieldValue) -> Option<String> {
    byte_of(value).map(|b| PlayerFlags::from_byte(b).to_string())
}

pub fn game_code_label(value: &FieldValue) -> Option<String> {
    value
        .as_i64()
        .and_then(|v| i32::try_from(v).ok())
        .map(int_to_code)
}

pub fn client_version_label(value: &FieldValue) -> Option<String> {
    value
        .as_i64()
        .and_then(|v| i32::try_from(v).ok())
        .map(|v| ClientVersion::decode(v).to_string())
}

pub fn coordinate_label(value: &FieldValue) -> Option<String> {
    value
        .as_u64()
        .and_then(|v| u16::try_from(v).ok())
        .map(|raw| format!("{:.3}", decode_coordinate(raw)))
}

/// Language keyword mask; zero means any language.
pub fn language_label(value: &FieldValue) -> Option<String> {
    let mask = value.as_u64()?;
    if mask == 0 {
        return names::LANGUAGES.lookup(0).map(str::to_string);
    }
    let set: Vec<&str> = names::LANGUAGES
        .entries
        .iter()
        .filter(|(bit, _)| *bit != 0 && mask & bit == *bit)
        .map(|(_, name)| *name)
        .collect();
    (!set.is_empty()).then(|| set.join(" | "))
}

/// One bit per owned map, indexed by map id.
pub fn map_ownership_label(value: &FieldValue) -> Option<String> {
    let mask = value.as_u64()?;
    let owned: Vec<&str> = names::MAPS
        .entries
        .iter()
        .filter(|(id, _)| mask & (1 << id) != 0)
        .map(|(_, name)| *name)
        .collect();
    Some(if owned.is_empty() {
        "None".to_string()
    } else {
        owned.join(" | ")
    })
}

/// Player id of a dead-body report, where `0xff` is the emergency button.
pub fn report_target_label(value: &FieldValue) -> Option<String> {
    match value.as_u64()? {
        super::layout::EMERGENCY_BUTTON => Some("Emergency button".to_string()),
        id => Some(format!("Player {id}")),
    }
}
