//! Remote procedure call bodies.
//!
//! One reader per RPC id, looked up in a static dispatch table. Ids without a
//! reader keep their body raw and raise an `UnknownTag` warning.

use super::bitfields;
use super::options::read_game_options;
use super::spawn::{read_player_info, read_vote_state};
use crate::protocols::common::envelope::unknown_body;
use crate::protocols::common::error::{DecodeError, Warning};
use crate::protocols::common::fields::{FieldReader, Fields};
use crate::protocols::common::names;

type RpcReader = fn(&mut FieldReader<'_>, &mut Fields) -> Result<(), DecodeError>;

static RPC_READERS: &[(u8, RpcReader)] = &[
    (0x00, play_animation),
    (0x01, complete_task),
    (0x02, sync_settings),
    (0x03, set_infected),
    (0x04, empty),
    (0x05, name),
    (0x06, name),
    (0x07, color),
    (0x08, color),
    (0x09, hat),
    (0x0a, skin),
    (0x0b, report_dead_body),
    (0x0c, murder_player),
    (0x0d, send_chat),
    (0x0e, start_meeting),
    (0x0f, set_scanner),
    (0x10, send_chat_note),
    (0x11, pet),
    (0x12, set_start_counter),
    (0x13, enter_vent),
    (0x14, exit_vent),
    (0x15, snap_to),
    (0x16, empty),
    (0x17, voting_complete),
    (0x18, cast_vote),
    (0x19, empty),
    (0x1a, add_vote),
    (0x1b, close_doors),
    (0x1c, repair_system),
    (0x1d, set_tasks),
    (0x1e, update_game_data),
];

fn reader_for(id: u8) -> Option<RpcReader> {
    RPC_READERS
        .iter()
        .find(|(key, _)| *key == id)
        .map(|(_, reader)| *reader)
}

/// Body of an RPC message: target net id, RPC id, then the call arguments.
pub fn read_rpc(reader: &mut FieldReader<'_>, fields: &mut Fields) -> Result<(), DecodeError> {
    fields.push(reader.packed("Net ID", "Object handling the call.")?);
    let id = reader.u8("RPC ID", "Remote call id.")?.with_table(&names::RPC_IDS);
    let id_value = id.value.as_u64().unwrap_or_default() as u8;
    fields.push(id);
    match reader_for(id_value) {
        Some(read) => read(reader, fields),
        None => unknown_body(reader, fields, "rpc", id_value),
    }
}

fn empty(_: &mut FieldReader<'_>, _: &mut Fields) -> Result<(), DecodeError> {
    Ok(())
}

fn play_animation(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    f.push(r.u8("Animation", "Task animation id.")?.with_table(&names::TASK_TYPES));
    Ok(())
}

fn complete_task(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    f.push(r.packed("Task index", "Index into the player's task list.")?);
    Ok(())
}

fn sync_settings(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    f.push(read_game_options(r)?);
    Ok(())
}

fn set_infected(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    let count = r.packed("Impostor count", "Number of impostors.")?;
    let declared = count.value.as_u64().unwrap_or_default();
    f.push(count);
    for _ in 0..declared {
        f.push(r.u8("Impostor", "Player id of an impostor.")?);
    }
    Ok(())
}

fn name(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    f.push(r.string("Name", "Requested player name.")?);
    Ok(())
}

fn color(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    f.push(r.u8("Color", "")?.with_table(&names::COLORS));
    Ok(())
}

fn hat(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    f.push(r.packed("Hat", "")?.with_table(&names::HATS));
    Ok(())
}

fn skin(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    f.push(r.packed("Skin", "")?.with_table(&names::SKINS));
    Ok(())
}

fn pet(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    f.push(r.packed("Pet", "")?.with_table(&names::PETS));
    Ok(())
}

fn report_dead_body(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    f.push(
        r.u8("Target", "Player id of the body, or the emergency button.")?
            .with_format(bitfields::report_target_label),
    );
    Ok(())
}

fn murder_player(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    f.push(r.packed("Target net ID", "Player control of the victim.")?);
    Ok(())
}

fn send_chat(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    f.push(r.string("Message", "Chat text.")?);
    Ok(())
}

fn start_meeting(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    f.push(
        r.u8("Target", "Reported body, or the emergency button.")?
            .with_format(bitfields::report_target_label),
    );
    Ok(())
}

fn set_scanner(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    f.push(r.bool("Scanning", "Whether the medbay scan is running.")?);
    f.push(r.u8("Sequence", "")?);
    Ok(())
}

fn send_chat_note(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    f.push(r.u8("Player ID", "")?);
    f.push(r.u8("Note type", "")?.with_table(&names::NOTE_TYPES));
    Ok(())
}

fn set_start_counter(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    f.push(r.packed("Sequence", "")?);
    f.push(r.i8("Seconds", "Countdown value, negative to cancel.")?);
    Ok(())
}

fn enter_vent(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    f.push(r.packed("Sequence", "Vent sequence number.")?);
    f.push(r.packed("Vent ID", "")?);
    Ok(())
}

fn exit_vent(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    f.push(r.packed("Vent ID", "")?);
    Ok(())
}

fn snap_to(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    f.push(
        r.u16_le("Position X", "Horizontal position.")?
            .with_format(bitfields::coordinate_label),
    );
    f.push(
        r.u16_le("Position Y", "Vertical position.")?
            .with_format(bitfields::coordinate_label),
    );
    if r.has_remaining() {
        f.push(r.u16_le("Sequence", "Movement sequence number.")?);
    }
    Ok(())
}

fn voting_complete(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    let count = r.packed("State count", "Number of vote states.")?;
    let declared = count.value.as_u64().unwrap_or_default();
    f.push(count);
    for _ in 0..declared {
        f.push(read_vote_state(r)?);
    }
    f.push(r.u8("Exiled", "Player id of the ejected player, 0xff for none.")?);
    f.push(r.bool("Tie", "Whether the vote was tied.")?);
    Ok(())
}

fn cast_vote(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    f.push(r.u8("Voter", "Player id of the voter.")?);
    f.push(r.u8("Suspect", "Player id voted for.")?);
    Ok(())
}

fn add_vote(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    f.push(r.i32_le("Voting client", "Client id casting the kick vote.")?);
    f.push(r.i32_le("Target client", "Client id voted against.")?);
    Ok(())
}

fn close_doors(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    f.push(r.u8("System", "")?.with_table(&names::SYSTEM_TYPES));
    Ok(())
}

fn repair_system(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    f.push(r.u8("System", "")?.with_table(&names::SYSTEM_TYPES));
    f.push(r.packed("Player net ID", "Player control doing the repair.")?);
    f.push(r.u8("Amount", "System specific repair value.")?);
    Ok(())
}

fn set_tasks(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    f.push(r.u8("Player ID", "")?);
    let count = r.packed("Task count", "")?;
    let declared = count.value.as_u64().unwrap_or_default();
    f.push(count);
    for _ in 0..declared {
        f.push(r.u8("Task type", "")?.with_table(&names::TASK_TYPES));
    }
    Ok(())
}

fn update_game_data(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    while r.has_remaining() {
        let start = r.position();
        let mut player = Fields::new();
        let length = r.u16_le("Length", "Bytes after the player id.")?;
        let declared = length.value.as_u64().unwrap_or_default() as usize;
        player.push(length);
        player.push(r.u8("Player ID", "")?);
        let (mut info, clamped) = r.scoped(declared);
        player.warn_opt(clamped);
        read_player_info(&mut info, &mut player)?;
        let consumed = info.consumed();
        if consumed != info.region_len() {
            player.warn(Warning::length_mismatch("player data", start, declared, consumed));
        }
        r.advance_past(&info);
        f.push(r.group("Player", "Player record.", start, player));
    }
    Ok(())
}
