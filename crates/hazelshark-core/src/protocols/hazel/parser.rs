use tracing::{debug, trace};

use super::bitfields;
use super::layout::{ACK_TRAILER, Opcode};
use super::payload::{disconnect_reason, read_payloads};
use crate::protocols::common::error::{DecodeError, Warning, WarningKind};
use crate::protocols::common::fields::{FieldReader, Fields};
use crate::protocols::common::names;
use crate::{DecodedPacket, Direction};

/// Decode one game-server datagram.
///
/// `direction` selects the body layout of direction-dependent payloads. A
/// hello packet is always serverbound and overrides it.
///
/// # Examples
/// ```
/// use hazelshark_core::{Direction, decode};
///
/// let bytes = [
///     8, 0, 1, 0, 70, 210, 2, 3, 8, 119, 101, 97, 107, 101, 121, 101, 115,
/// ];
/// let packet = decode(&bytes, Direction::Serverbound)?;
/// let username = packet.field("Username").and_then(|f| f.value.as_str());
/// assert_eq!(username, Some("weakeyes"));
/// # Ok::<(), hazelshark_core::DecodeError>(())
/// ```
pub fn decode(buffer: &[u8], direction: Direction) -> Result<DecodedPacket, DecodeError> {
    trace!(len = buffer.len(), direction = direction.as_str(), "decoding packet");
    let mut reader = FieldReader::new(buffer);
    let mut fields = Fields::new();
    let mut direction = direction;

    let opcode = reader
        .u8("Opcode", "Transport packet kind.")?
        .with_table(&names::OPCODES);
    let opcode_value = opcode.value.as_u64().unwrap_or_default() as u8;
    fields.push(opcode);

    match Opcode::from_u8(opcode_value) {
        Opcode::Unreliable => {
            fields.children.extend(read_payloads(&mut reader, direction)?);
        }
        Opcode::Reliable => {
            fields.push(nonce(&mut reader)?);
            fields.children.extend(read_payloads(&mut reader, direction)?);
        }
        Opcode::Hello => {
            direction = Direction::Serverbound;
            fields.push(nonce(&mut reader)?);
            fields.push(reader.u8("Hazel version", "Transport protocol version.")?);
            fields.push(
                reader
                    .i32_le("Client version", "Encoded game version.")?
                    .with_format(bitfields::client_version_label),
            );
            fields.push(reader.string("Username", "Name the player connects with.")?);
        }
        Opcode::Disconnect => {
            if reader.has_remaining() {
                disconnect_reason(&mut reader, &mut fields)?;
            }
        }
        Opcode::Acknowledge => {
            fields.push(nonce(&mut reader)?);
            let offset = reader.position();
            if reader.has_remaining() {
                let trailer = reader.u8("Trailer", "Constant 0xff after the nonce.")?;
                if trailer.value.as_u64() != Some(ACK_TRAILER) {
                    let got = trailer.value.as_u64().unwrap_or_default();
                    fields.warn(Warning::new(
                        WarningKind::UnexpectedValue,
                        offset,
                        format!("expected 0xff after byte {offset}, got 0x{got:02x}"),
                    ));
                }
                fields.push(trailer);
            } else {
                fields.warn(Warning::new(
                    WarningKind::UnexpectedValue,
                    offset,
                    format!("expected 0xff after byte {offset}"),
                ));
            }
        }
        Opcode::Ping => fields.push(nonce(&mut reader)?),
        Opcode::Unknown(value) => {
            debug!(opcode = value, "unknown opcode");
            fields.push(reader.rest("Data", "Undecoded packet body.")?);
            fields.warn(Warning::unknown_tag("opcode", 0, u64::from(value)));
        }
    }

    if reader.has_remaining() {
        let offset = reader.position();
        let trailing = reader.remaining();
        debug!(offset, trailing, "trailing bytes after packet body");
        fields.push(reader.rest("Trailing data", "Bytes after the packet body.")?);
        fields.warn(Warning::new(
            WarningKind::LengthMismatch,
            offset,
            format!("{trailing} unexpected bytes after the packet body"),
        ));
    }

    Ok(DecodedPacket {
        direction,
        opcode: opcode_value,
        fields: fields.children,
        warnings: fields.warnings,
    })
}

fn nonce(reader: &mut FieldReader<'_>) -> Result<crate::AnnotatedField, DecodeError> {
    reader.u16_be("Nonce", "Reliable packet sequence number.")
}

#[cfg(test)]
mod tests {
    use super::decode;
    use crate::{DecodeError, Direction, WarningKind};

    #[test]
    fn hello_forces_serverbound() {
        let bytes = [8, 0, 1, 0, 70, 210, 2, 3, 8, 119, 101, 97, 107, 101, 121, 101, 115];
        let packet = decode(&bytes, Direction::Clientbound).unwrap();
        assert_eq!(packet.direction, Direction::Serverbound);
        assert_eq!(
            packet.field("Client version").and_then(|f| f.label.as_deref()),
            Some("2020.9.7.0")
        );
    }

    #[test]
    fn ping_keeps_direction() {
        let packet = decode(&[0x0c, 0x00, 0x05], Direction::Serverbound).unwrap();
        assert_eq!(packet.direction, Direction::Serverbound);
        assert!(packet.all_warnings().is_empty());
    }

    #[test]
    fn ack_trailer_is_checked() {
        let ok = decode(&[0x0a, 0x00, 0x01, 0xff], Direction::Clientbound).unwrap();
        assert!(ok.warnings.is_empty());
        let wrong = decode(&[0x0a, 0x00, 0x01, 0x10], Direction::Clientbound).unwrap();
        assert_eq!(wrong.warnings[0].kind, WarningKind::UnexpectedValue);
        let missing = decode(&[0x0a, 0x00, 0x01], Direction::Clientbound).unwrap();
        assert_eq!(missing.warnings[0].offset, 3);
    }

    #[test]
    fn disconnect_without_reason() {
        let packet = decode(&[0x09], Direction::Clientbound).unwrap();
        assert_eq!(packet.fields.len(), 1);
        let custom = decode(&[0x09, 0x08, 0x02, b'n', b'o'], Direction::Clientbound).unwrap();
        assert_eq!(
            custom.field("Message").and_then(|f| f.value.as_str()),
            Some("no")
        );
    }

    #[test]
    fn unknown_opcode_keeps_body() {
        let packet = decode(&[0x05, 0x01, 0x02], Direction::Serverbound).unwrap();
        assert_eq!(packet.warnings[0].kind, WarningKind::UnknownTag);
        assert_eq!(packet.field("Data").map(|f| f.raw.clone()), Some(vec![1, 2]));
    }

    #[test]
    fn trailing_bytes_are_reported() {
        let packet = decode(&[0x0c, 0x00, 0x05, 0xaa], Direction::Clientbound).unwrap();
        assert_eq!(packet.warnings[0].kind, WarningKind::LengthMismatch);
        assert_eq!(packet.warnings[0].offset, 3);
    }

    #[test]
    fn reliable_without_nonce_is_fatal() {
        let err = decode(&[0x01, 0x00], Direction::Serverbound).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::BufferUnderrun { offset: 1, needed: 2, available: 1, .. }
        ));
        assert_eq!(err.field(), Some("Nonce"));
    }
}
