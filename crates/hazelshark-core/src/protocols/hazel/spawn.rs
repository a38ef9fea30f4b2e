//! Spawn messages and the replicated state of their components.
//!
//! Component bodies are positional: the spawn type and the component's index
//! select the decoder. Anything without a decoder keeps its raw bytes.

use tracing::debug;

use super::bitfields;
use super::layout::SpawnType;
use crate::AnnotatedField;
use crate::protocols::common::error::{DecodeError, Warning};
use crate::protocols::common::fields::{FieldReader, Fields};
use crate::protocols::common::names;

/// Component kinds with a known body layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    ShipStatus,
    MeetingHud,
    LobbyBehaviour,
    GameData,
    VoteBanSystem,
    PlayerControl,
    PlayerPhysics,
    CustomNetworkTransform,
}

type ComponentReader = fn(&mut FieldReader<'_>, &mut Fields) -> Result<(), DecodeError>;

impl Component {
    /// Component at `index` of an object of kind `spawn`.
    pub fn at(spawn: SpawnType, index: usize) -> Option<Self> {
        use Component::*;
        let layout: &[Component] = match spawn {
            SpawnType::ShipStatus
            | SpawnType::Headquarters
            | SpawnType::PlanetMap
            | SpawnType::AprilShipStatus => &[ShipStatus],
            SpawnType::MeetingHud => &[MeetingHud],
            SpawnType::LobbyBehaviour => &[LobbyBehaviour],
            SpawnType::GameData => &[GameData, VoteBanSystem],
            SpawnType::Player => &[PlayerControl, PlayerPhysics, CustomNetworkTransform],
            SpawnType::Unknown(_) => &[],
        };
        layout.get(index).copied()
    }

    fn reader(self) -> ComponentReader {
        match self {
            Component::ShipStatus => read_raw_state,
            Component::MeetingHud => read_meeting_hud,
            Component::LobbyBehaviour | Component::PlayerPhysics => read_empty,
            Component::GameData => read_game_data,
            Component::VoteBanSystem => read_vote_bans,
            Component::PlayerControl => read_player_control,
            Component::CustomNetworkTransform => read_network_transform,
        }
    }
}

/// Body of a spawn message.
pub fn read_spawn(reader: &mut FieldReader<'_>, fields: &mut Fields) -> Result<(), DecodeError> {
    let spawn = reader
        .packed("Spawn type", "Kind of object being created.")?
        .with_table(&names::SPAWN_TYPES);
    let spawn_value = spawn.value.as_u64().unwrap_or_default();
    let spawn_type = SpawnType::from_u64(spawn_value);
    fields.push(spawn);
    fields.push(reader.packed("Owner ID", "Client that owns the object.")?);
    fields.push(reader.bitfield("Spawn flags", "Object creation flags.")?);

    let count = reader.packed("Component count", "Number of components that follow.")?;
    let declared = count.value.as_u64().unwrap_or_default();
    fields.push(count);

    for index in 0..declared {
        if !reader.has_remaining() {
            fields.warn(Warning::new(
                crate::WarningKind::ClampedLength,
                reader.position(),
                format!("spawn declares {declared} components, only {index} present"),
            ));
            break;
        }
        fields.push(read_component(reader, spawn_type, spawn_value, index as usize)?);
    }
    Ok(())
}

fn read_component(
    reader: &mut FieldReader<'_>,
    spawn: SpawnType,
    spawn_value: u64,
    index: usize,
) -> Result<AnnotatedField, DecodeError> {
    let start = reader.position();
    let mut fields = Fields::new();
    fields.push(reader.packed("Net ID", "Network id of the component.")?);
    let length = reader.u16_le("Length", "Declared component data length.")?;
    let declared = length.value.as_u64().unwrap_or_default() as usize;
    fields.push(length);
    fields.push(reader.u8("Component tag", "Serialization tag of the component data.")?);

    let (mut body, clamped) = reader.scoped(declared);
    fields.warn_opt(clamped);
    let component = Component::at(spawn, index);
    match component {
        Some(component) => (component.reader())(&mut body, &mut fields)?,
        None => {
            let offset = body.position();
            debug!(spawn = spawn_value, index, "no decoder for spawn component");
            fields.push(body.rest("Data", "Undecoded component data.")?);
            fields.warn(Warning::unknown_tag("spawn component", offset, index as u64));
        }
    }
    let consumed = body.consumed();
    if consumed != body.region_len() {
        fields.warn(Warning::length_mismatch("component", start, declared, consumed));
    }
    reader.advance_past(&body);

    let group = reader.group("Component", "One replicated component.", start, fields);
    Ok(match names::component_name(spawn_value, index) {
        Some(name) if component.is_some() => group.with_label(name),
        _ => group.with_label(format!("Unknown component {index}")),
    })
}

fn read_empty(_: &mut FieldReader<'_>, _: &mut Fields) -> Result<(), DecodeError> {
    Ok(())
}

fn read_raw_state(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    if r.has_remaining() {
        f.push(r.rest("State", "Serialized ship systems.")?);
    }
    Ok(())
}

fn read_meeting_hud(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    while r.has_remaining() {
        f.push(read_vote_state(r)?);
    }
    Ok(())
}

pub(super) fn read_vote_state(r: &mut FieldReader<'_>) -> Result<AnnotatedField, DecodeError> {
    Ok(r
        .bitfield("Vote state", "Vote target and meeting flags of one player.")?
        .with_format(bitfields::vote_state_label))
}

fn read_game_data(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    let count = r.packed("Player count", "Number of player records.")?;
    let declared = count.value.as_u64().unwrap_or_default();
    f.push(count);
    for index in 0..declared {
        if !r.has_remaining() {
            f.warn(Warning::new(
                crate::WarningKind::ClampedLength,
                r.position(),
                format!("game data declares {declared} players, only {index} present"),
            ));
            break;
        }
        let start = r.position();
        let mut player = Fields::new();
        player.push(r.u8("Player ID", "")?);
        read_player_info(r, &mut player)?;
        f.push(r.group("Player", "Player record.", start, player));
    }
    Ok(())
}

fn read_vote_bans(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    let count = r.u8("Ban count", "Number of clients with kick votes.")?;
    let declared = count.value.as_u64().unwrap_or_default();
    f.push(count);
    for _ in 0..declared {
        let start = r.position();
        let mut entry = Fields::new();
        entry.push(r.i32_le("Client ID", "Client voted against.")?);
        for _ in 0..3 {
            entry.push(r.packed("Voter", "Client that voted to kick.")?);
        }
        f.push(r.group("Vote ban", "Kick votes against one client.", start, entry));
    }
    Ok(())
}

fn read_player_control(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    f.push(r.bool("Is new", "Whether the player just joined.")?);
    f.push(r.u8("Player ID", "")?);
    Ok(())
}

fn read_network_transform(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    f.push(r.u16_le("Sequence", "Movement sequence number.")?);
    for (name, description) in [
        ("Position X", "Horizontal position."),
        ("Position Y", "Vertical position."),
        ("Velocity X", "Horizontal velocity."),
        ("Velocity Y", "Vertical velocity."),
    ] {
        f.push(r.u16_le(name, description)?.with_format(bitfields::coordinate_label));
    }
    Ok(())
}

/// Player info shared by spawn game data and the game-data update RPC.
pub(super) fn read_player_info(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    f.push(r.string("Name", "Player name.")?);
    f.push(r.u8("Color", "")?.with_table(&names::COLORS));
    f.push(r.packed("Hat", "")?.with_table(&names::HATS));
    f.push(r.packed("Pet", "")?.with_table(&names::PETS));
    f.push(r.packed("Skin", "")?.with_table(&names::SKINS));
    f.push(
        r.bitfield("Flags", "Disconnected, impostor and dead flags.")?
            .with_format(bitfields::player_flags_label),
    );
    let count = r.u8("Task count", "")?;
    let tasks = count.value.as_u64().unwrap_or_default();
    f.push(count);
    for _ in 0..tasks {
        let start = r.position();
        let mut task = Fields::new();
        task.push(r.packed("Task ID", "")?);
        task.push(r.bool("Completed", "")?);
        f.push(r.group("Task", "Task progress.", start, task));
    }
    Ok(())
}
