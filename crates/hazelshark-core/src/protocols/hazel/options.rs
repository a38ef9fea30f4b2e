//! Game options record.
//!
//! A packed length, a fixed base record and then ordered extensions, each
//! gated on the leading `version` byte and on its bytes fitting inside the
//! declared length. The base record is always read in full, even past a short
//! declared length. Trailing bytes are skipped; any difference between the
//! declared and decoded length is reported, never fatal.

use tracing::debug;

use super::bitfields;
use crate::AnnotatedField;
use crate::protocols::common::error::{DecodeError, Warning};
use crate::protocols::common::fields::{FieldReader, Fields};
use crate::protocols::common::names;

type ExtensionReader = fn(&mut FieldReader<'_>, &mut Fields) -> Result<(), DecodeError>;

/// Versioned tail of the record, in wire order.
struct Extension {
    min_version: u64,
    size: usize,
    read: ExtensionReader,
}

const EXTENSIONS: &[Extension] = &[
    Extension {
        min_version: 1,
        size: 1,
        read: read_emergency_cooldown,
    },
    Extension {
        min_version: 2,
        size: 2,
        read: read_eject_flags,
    },
    Extension {
        min_version: 3,
        size: 2,
        read: read_vote_flags,
    },
];

fn read_emergency_cooldown(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    f.push(r.u8("Emergency cooldown", "Seconds between emergency meetings.")?);
    Ok(())
}

fn read_eject_flags(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    f.push(r.bool("Confirm ejects", "Whether ejections reveal the role.")?);
    f.push(r.bool("Visual tasks", "Whether visual tasks are shown.")?);
    Ok(())
}

fn read_vote_flags(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    f.push(r.bool("Anonymous votes", "Whether votes are anonymous.")?);
    f.push(
        r.u8("Task bar updates", "When the task bar is refreshed.")?
            .with_table(&names::TASK_BAR_UPDATES),
    );
    Ok(())
}

/// Decode a length-prefixed game options record into a `"Game options"` group.
pub fn read_game_options(reader: &mut FieldReader<'_>) -> Result<AnnotatedField, DecodeError> {
    let start = reader.position();
    let mut fields = Fields::new();

    let length = reader.packed("Options length", "Declared length of the options record.")?;
    let declared = length.value.as_u64().unwrap_or_default() as usize;
    fields.push(length);

    let body_start = reader.position();
    let version = reader.u8("Version", "Options record version.")?;
    let version_value = version.value.as_u64().unwrap_or_default();
    fields.push(version);
    read_base(reader, &mut fields)?;

    for extension in EXTENSIONS {
        let consumed = reader.position() - body_start;
        if version_value < extension.min_version
            || consumed + extension.size > declared
            || reader.remaining() < extension.size
        {
            break;
        }
        (extension.read)(reader, &mut fields)?;
    }

    let consumed = reader.position() - body_start;
    if consumed != declared {
        debug!(declared, consumed, version = version_value, "game options length mismatch");
        fields.warn(Warning::length_mismatch("game options", start, declared, consumed));
    }
    if consumed < declared {
        let (tail, clamped) = reader.scoped(declared - consumed);
        fields.warn_opt(clamped);
        reader.advance_past(&tail);
    }

    Ok(reader.group("Game options", "Lobby settings.", start, fields))
}

fn read_base(r: &mut FieldReader<'_>, f: &mut Fields) -> Result<(), DecodeError> {
    f.push(r.u8("Max players", "Player limit.")?);
    f.push(
        r.u32_le("Language", "Chat language keyword mask.")?
            .with_format(bitfields::language_label),
    );
    f.push(r.u8("Map", "Map id.")?.with_table(&names::MAPS));
    f.push(r.f32_le("Player speed", "Movement speed multiplier.")?);
    f.push(r.f32_le("Crew vision", "Crewmate light radius multiplier.")?);
    f.push(r.f32_le("Impostor vision", "Impostor light radius multiplier.")?);
    f.push(r.f32_le("Kill cooldown", "Seconds between kills.")?);
    f.push(r.u8("Common tasks", "")?);
    f.push(r.u8("Long tasks", "")?);
    f.push(r.u8("Short tasks", "")?);
    f.push(r.i32_le("Emergency meetings", "Meetings each player may call.")?);
    f.push(r.u8("Impostors", "Impostor count.")?);
    f.push(
        r.u8("Kill distance", "Kill range setting.")?
            .with_table(&names::KILL_DISTANCES),
    );
    f.push(r.i32_le("Discussion time", "Seconds of discussion.")?);
    f.push(r.i32_le("Voting time", "Seconds of voting.")?);
    f.push(r.bool("Is default", "Whether these are the default options.")?);
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::read_game_options;
    use crate::protocols::common::error::WarningKind;
    use crate::protocols::common::fields::FieldReader;

    /// Version byte plus the fixed fields.
    const BASE_LEN: usize = 41;

    /// Options record of `version` with every extension it supports.
    pub(crate) fn options_bytes(version: u8) -> Vec<u8> {
        let mut body = vec![version, 10];
        body.extend_from_slice(&0x100u32.to_le_bytes());
        body.push(2);
        for value in [1.0f32, 0.75, 1.5, 25.0] {
            body.extend_from_slice(&value.to_le_bytes());
        }
        body.extend_from_slice(&[1, 2, 3]);
        body.extend_from_slice(&1i32.to_le_bytes());
        body.extend_from_slice(&[2, 1]);
        body.extend_from_slice(&15i32.to_le_bytes());
        body.extend_from_slice(&120i32.to_le_bytes());
        body.push(0);
        if version >= 1 {
            body.push(15);
        }
        if version >= 2 {
            body.extend_from_slice(&[1, 0]);
        }
        if version >= 3 {
            body.extend_from_slice(&[1, 2]);
        }
        let mut out = vec![body.len() as u8];
        out.extend(body);
        out
    }

    #[test]
    fn base_record_has_fixed_size() {
        let bytes = options_bytes(0);
        assert_eq!(bytes.len(), 1 + BASE_LEN);
        let mut reader = FieldReader::new(&bytes);
        let group = read_game_options(&mut reader).unwrap();
        assert!(group.warnings.is_empty());
        assert_eq!(group.range.size, bytes.len());
        assert_eq!(group.child("Map").and_then(|f| f.label.as_deref()), Some("Polus"));
        assert!(group.child("Emergency cooldown").is_none());
    }

    #[test]
    fn extensions_follow_version() {
        let bytes = options_bytes(3);
        let mut reader = FieldReader::new(&bytes);
        let group = read_game_options(&mut reader).unwrap();
        assert!(group.warnings.is_empty());
        assert_eq!(
            group.child("Emergency cooldown").and_then(|f| f.value.as_u64()),
            Some(15)
        );
        assert_eq!(
            group.child("Confirm ejects").and_then(|f| f.value.as_bool()),
            Some(true)
        );
        assert_eq!(
            group.child("Task bar updates").and_then(|f| f.label.as_deref()),
            Some("Never")
        );
        assert_eq!(
            group.child("Language").and_then(|f| f.label.as_deref()),
            Some("English")
        );
    }

    #[test]
    fn extension_missing_from_declared_length_is_skipped() {
        // version 2 claims confirm ejects/visual tasks but the record stops early
        let mut bytes = options_bytes(1);
        bytes[1] = 2;
        let mut reader = FieldReader::new(&bytes);
        let group = read_game_options(&mut reader).unwrap();
        assert!(group.child("Confirm ejects").is_none());
        assert!(group.warnings.is_empty());
    }

    #[test]
    fn trailing_bytes_produce_length_mismatch() {
        let mut bytes = options_bytes(0);
        bytes[0] += 2;
        bytes.extend_from_slice(&[0xaa, 0xbb, 0xcc]);
        let mut reader = FieldReader::new(&bytes);
        let group = read_game_options(&mut reader).unwrap();
        assert_eq!(group.warnings.len(), 1);
        assert_eq!(group.warnings[0].kind, WarningKind::LengthMismatch);
        assert_eq!(reader.remaining(), 1);
    }

    #[test]
    fn short_declared_length_is_not_fatal() {
        let mut bytes = options_bytes(0);
        bytes[0] -= 1;
        bytes.push(0xee);
        let mut reader = FieldReader::new(&bytes);
        let group = read_game_options(&mut reader).unwrap();
        assert_eq!(group.warnings.len(), 1);
        assert_eq!(group.warnings[0].kind, WarningKind::LengthMismatch);
        assert_eq!(
            group.child("Is default").and_then(|f| f.value.as_bool()),
            Some(false)
        );
        assert_eq!(reader.remaining(), 1);
    }

    #[test]
    fn truncated_base_record_is_fatal() {
        let bytes = options_bytes(0);
        let mut reader = FieldReader::new(&bytes[..20]);
        let err = read_game_options(&mut reader).unwrap_err();
        assert!(err.field().is_some());
    }
}
