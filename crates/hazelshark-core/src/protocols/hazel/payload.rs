//! Root messages of reliable and unreliable packets.
//!
//! Several tags have a different body depending on who sent the packet, so
//! every reader receives the packet direction.

use super::bitfields;
use super::layout::{DISCONNECT_REASON_CUSTOM, JOIN_SUCCESS_MIN_LEN, PayloadTag};
use super::message::read_messages;
use super::options::read_game_options;
use crate::protocols::common::envelope::{Envelope, read_records, unknown_body};
use crate::protocols::common::error::{DecodeError, Warning};
use crate::protocols::common::fields::{FieldReader, Fields};
use crate::protocols::common::names;
use crate::{AnnotatedField, Direction};

pub const PAYLOAD: Envelope = Envelope {
    name: "Payload",
    description: "Root message of a reliable or unreliable packet.",
    tag: "Payload tag",
    tag_description: "Kind of root message.",
    tags: &names::PAYLOAD_TAGS,
};

/// Decode framed payloads until the packet ends.
pub fn read_payloads(
    reader: &mut FieldReader<'_>,
    direction: Direction,
) -> Result<Vec<AnnotatedField>, DecodeError> {
    read_records(reader, &PAYLOAD, |r, tag, f| read_payload_body(r, tag, direction, f))
}

fn read_payload_body(
    r: &mut FieldReader<'_>,
    tag: u8,
    direction: Direction,
    f: &mut Fields,
) -> Result<(), DecodeError> {
    let clientbound = direction == Direction::Clientbound;
    match PayloadTag::from_u8(tag) {
        PayloadTag::HostGame if clientbound => f.push(game_code(r)?),
        PayloadTag::HostGame => f.push(read_game_options(r)?),
        PayloadTag::JoinGame if clientbound => join_game_reply(r, f)?,
        PayloadTag::JoinGame => {
            f.push(game_code(r)?);
            f.push(
                r.bitfield("Map ownership", "Maps owned by the joining client.")?
                    .with_format(bitfields::map_ownership_label),
            );
        }
        PayloadTag::StartGame => f.push(game_code(r)?),
        PayloadTag::RemoveGame => {}
        PayloadTag::RemovePlayer => {
            f.push(game_code(r)?);
            f.push(r.u32_le("Client ID", "Client that left.")?);
            f.push(r.u32_le("Host ID", "Client now hosting.")?);
            if r.has_remaining() {
                disconnect_reason(r, f)?;
            }
        }
        PayloadTag::GameData => {
            f.push(game_code(r)?);
            f.children.extend(read_messages(r)?);
        }
        PayloadTag::GameDataTo => {
            f.push(game_code(r)?);
            f.push(r.packed("Recipient", "Client the messages are addressed to.")?);
            f.children.extend(read_messages(r)?);
        }
        PayloadTag::JoinedGame => {
            f.push(game_code(r)?);
            f.push(r.u32_le("Client ID", "The joining client.")?);
            f.push(r.u32_le("Host ID", "Client hosting the game.")?);
            let count = r.packed("Client count", "Number of other clients.")?;
            let declared = count.value.as_u64().unwrap_or_default();
            f.push(count);
            for _ in 0..declared {
                f.push(r.packed("Other client", "Client already in the game.")?);
            }
        }
        PayloadTag::EndGame => {
            f.push(game_code(r)?);
            f.push(
                r.u8("Reason", "Why the game ended.")?
                    .with_table(&names::END_GAME_REASONS),
            );
            f.push(r.bool("Show ad", "Whether an advert is shown.")?);
        }
        PayloadTag::GetGameListLegacy => {
            if r.has_remaining() {
                f.push(r.rest("Data", "Legacy game list request or reply.")?);
            }
        }
        PayloadTag::AlterGame => {
            f.push(game_code(r)?);
            f.push(r.u8("Alter tag", "Setting being changed.")?.with_table(&names::ALTER_TAGS));
            f.push(r.bool("Is public", "Whether the game is listed.")?);
        }
        PayloadTag::KickPlayer => {
            if clientbound {
                f.push(game_code(r)?);
            }
            f.push(r.packed("Client ID", "Client being kicked.")?);
            f.push(r.bool("Banned", "Whether the client is banned.")?);
        }
        PayloadTag::WaitForHost => {
            f.push(game_code(r)?);
            f.push(r.u32_le("Client ID", "Client waiting for the host.")?);
        }
        PayloadTag::Redirect => {
            f.push(r.ipv4("IP", "Server to reconnect to.")?);
            f.push(r.u16_le("Port", "")?);
        }
        PayloadTag::MasterServerList => master_server_list(r, f)?,
        PayloadTag::GetGameList if clientbound => game_list(r, f)?,
        PayloadTag::GetGameList => {
            f.push(r.u8("Flag", "Game list request flag.")?);
            f.push(read_game_options(r)?);
        }
        PayloadTag::ReportPlayer if clientbound => {
            f.push(r.packed("Client ID", "Reported client.")?);
            f.push(r.u8("Reason", "")?.with_table(&names::REPORT_REASONS));
            f.push(r.u8("Outcome", "")?.with_table(&names::REPORT_OUTCOMES));
            f.push(r.string("Name", "Name of the reported player.")?);
        }
        PayloadTag::ReportPlayer => {
            f.push(game_code(r)?);
            f.push(r.packed("Client ID", "Client being reported.")?);
            f.push(r.u8("Reason", "")?.with_table(&names::REPORT_REASONS));
        }
        PayloadTag::Unknown(tag) => unknown_body(r, f, "payload tag", tag)?,
    }
    Ok(())
}

/// Game code as a signed integer with its textual form as label.
pub(super) fn game_code(r: &mut FieldReader<'_>) -> Result<AnnotatedField, DecodeError> {
    Ok(r
        .i32_le("Game code", "Game session code.")?
        .with_format(bitfields::game_code_label))
}

/// Disconnect reason, plus the free-text message of a custom reason.
pub(crate) fn disconnect_reason(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    let reason = r
        .u8("Reason", "Disconnect reason.")?
        .with_table(&names::DISCONNECT_REASONS);
    let custom = reason.value.as_u64() == Some(DISCONNECT_REASON_CUSTOM);
    f.push(reason);
    if custom && r.has_remaining() {
        f.push(r.string("Message", "Custom disconnect message.")?);
    }
    Ok(())
}

fn join_game_reply(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    if r.region_len() >= JOIN_SUCCESS_MIN_LEN {
        f.push(game_code(r)?);
        f.push(r.u32_le("Client ID", "The joining client.")?);
        f.push(r.u32_le("Host ID", "Client hosting the game.")?);
    } else {
        disconnect_reason(r, f)?;
    }
    Ok(())
}

fn master_server_list(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    f.push(r.u8("Flag", "Server list flag.")?);
    let count = r.u8("Server count", "Number of servers.")?;
    let declared = count.value.as_u64().unwrap_or_default();
    f.push(count);
    for _ in 0..declared {
        let start = r.position();
        let mut server = Fields::new();
        let length = r.u16_le("Length", "Bytes after the entry header.")?;
        let expected = length.value.as_u64().unwrap_or_default() as usize;
        server.push(length);
        server.push(r.u8("Flag", "Server entry flag.")?);
        let body_start = r.position();
        server.push(r.string("Name", "Server name.")?);
        server.push(r.ipv4("IP", "Server address.")?);
        server.push(r.u16_le("Port", "")?);
        server.push(r.packed("Players", "Connected players.")?);
        let consumed = r.position() - body_start;
        if consumed != expected {
            server.warn(Warning::length_mismatch("master server", start, expected, consumed));
        }
        let entry = r.group("Server", "Master server entry.", start, server);
        let label = entry.child("Name").and_then(|f| f.value.as_str()).map(str::to_string);
        f.push(match label {
            Some(label) => entry.with_label(label),
            None => entry,
        });
    }
    Ok(())
}

fn game_list(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    let length = r.u16_le("Length", "Bytes of game listings.")?;
    let declared = length.value.as_u64().unwrap_or_default() as usize;
    f.push(length);
    f.push(r.u8("Flag", "Game list flag.")?);
    let (mut list, clamped) = r.scoped(declared);
    f.warn_opt(clamped);
    while list.has_remaining() {
        let start = list.position();
        let mut game = Fields::new();
        let length = list.u16_le("Length", "Bytes after the listing header.")?;
        let expected = length.value.as_u64().unwrap_or_default() as usize;
        game.push(length);
        game.push(list.u8("Flag", "Listing flag.")?);
        let body_start = list.position();
        game.push(list.ipv4("IP", "Server hosting the game.")?);
        game.push(list.u16_le("Port", "")?);
        game.push(game_code(&mut list)?);
        game.push(list.string("Name", "Host name.")?);
        game.push(list.u8("Players", "Players in the game.")?);
        game.push(list.packed("Age", "Seconds since the game was created.")?);
        game.push(list.u8("Map", "")?.with_table(&names::MAPS));
        game.push(list.u8("Impostors", "")?);
        game.push(list.u8("Max players", "")?);
        let consumed = list.position() - body_start;
        if consumed != expected {
            game.warn(Warning::length_mismatch("game listing", start, expected, consumed));
        }
        f.push(list.group("Game", "Game listing.", start, game));
    }
    r.advance_past(&list);
    Ok(())
}
