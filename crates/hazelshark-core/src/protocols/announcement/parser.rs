use tracing::{debug, trace};

use super::layout::{AnnouncementTag, HELLO_SEND_OPTION};
use crate::AnnouncementPacket;
use crate::protocols::common::envelope::{Envelope, read_records, unknown_body};
use crate::protocols::common::error::{DecodeError, Warning, WarningKind};
use crate::protocols::common::fields::{FieldReader, Fields};
use crate::protocols::common::names;
use crate::protocols::hazel::disconnect_reason;
use crate::protocols::hazel::layout::Opcode;

const PAYLOAD: Envelope = Envelope {
    name: "Payload",
    description: "Announcement payload.",
    tag: "Payload tag",
    tag_description: "Kind of announcement payload.",
    tags: &names::ANNOUNCEMENT_TAGS,
};

/// Decode one announcement-server datagram.
///
/// # Examples
/// ```
/// use hazelshark_core::decode_announcement;
///
/// // reliable, nonce 1, one "free weekend" payload announcing Polus
/// let bytes = [0x01, 0x00, 0x01, 0x01, 0x00, 0x02, 0x02];
/// let packet = decode_announcement(&bytes)?;
/// let payload = packet.fields.iter().find(|f| f.name == "Payload").unwrap();
/// let state = payload.child("Free weekend").and_then(|f| f.label.as_deref());
/// assert_eq!(state, Some("Polus"));
/// # Ok::<(), hazelshark_core::DecodeError>(())
/// ```
pub fn decode_announcement(buffer: &[u8]) -> Result<AnnouncementPacket, DecodeError> {
    trace!(len = buffer.len(), "decoding announcement packet");
    let mut reader = FieldReader::new(buffer);
    let mut fields = Fields::new();

    let opcode = reader
        .u8("Opcode", "Transport packet kind.")?
        .with_table(&names::OPCODES);
    let opcode_value = opcode.value.as_u64().unwrap_or_default() as u8;
    fields.push(opcode);

    match Opcode::from_u8(opcode_value) {
        Opcode::Unreliable => {
            fields
                .children
                .extend(read_records(&mut reader, &PAYLOAD, read_payload_body)?);
        }
        Opcode::Reliable => {
            fields.push(nonce(&mut reader)?);
            fields
                .children
                .extend(read_records(&mut reader, &PAYLOAD, read_payload_body)?);
        }
        Opcode::Hello => {
            fields.push(nonce(&mut reader)?);
            let option = reader.u8("Send option", "Hello send option, always zero.")?;
            if option.value.as_u64() != Some(HELLO_SEND_OPTION) {
                let offset = option.range.start;
                fields.warn(Warning::new(
                    WarningKind::UnexpectedValue,
                    offset,
                    "send option is always 0",
                ));
            }
            fields.push(option);
            fields.push(reader.packed("Protocol version", "Announcement protocol version.")?);
            fields.push(reader.packed(
                "Announcement ID",
                "Last announcement seen, to decide between cache and new data.",
            )?);
            fields.push(
                reader
                    .packed("Language", "Client language.")?
                    .with_table(&names::LANGUAGES),
            );
        }
        Opcode::Disconnect => {
            if reader.has_remaining() {
                disconnect_reason(&mut reader, &mut fields)?;
            }
        }
        Opcode::Acknowledge => {
            fields.push(nonce(&mut reader)?);
            fields.push(reader.bitfield(
                "Received",
                "Acknowledgement state of the last eight packets.",
            )?);
        }
        Opcode::Ping => fields.push(nonce(&mut reader)?),
        Opcode::Unknown(value) => {
            debug!(opcode = value, "unknown announcement opcode");
            fields.push(reader.rest("Data", "Undecoded packet body.")?);
            fields.warn(Warning::unknown_tag("opcode", 0, u64::from(value)));
        }
    }

    if reader.has_remaining() {
        let offset = reader.position();
        let trailing = reader.remaining();
        fields.push(reader.rest("Trailing data", "Bytes after the packet body.")?);
        fields.warn(Warning::new(
            WarningKind::LengthMismatch,
            offset,
            format!("{trailing} unexpected bytes after the packet body"),
        ));
    }

    Ok(AnnouncementPacket {
        opcode: opcode_value,
        fields: fields.children,
        warnings: fields.warnings,
    })
}

fn read_payload_body(
    r: &mut FieldReader<'_>,
    tag: u8,
    f: &mut Fields,
) -> Result<(), DecodeError> {
    match AnnouncementTag::from_u8(tag) {
        AnnouncementTag::Cache => {}
        AnnouncementTag::Data => {
            f.push(r.packed("Announcement ID", "Id of this announcement.")?);
            f.push(r.string("Message", "Announcement text.")?);
        }
        AnnouncementTag::FreeWeekend => {
            f.push(
                r.u8("Free weekend", "Which maps are free to play.")?
                    .with_table(&names::FREE_WEEKEND_STATES),
            );
        }
        AnnouncementTag::Unknown(tag) => unknown_body(r, f, "announcement tag", tag)?,
    }
    Ok(())
}

fn nonce(reader: &mut FieldReader<'_>) -> Result<crate::AnnotatedField, DecodeError> {
    reader.u16_be("Nonce", "Reliable packet sequence number.")
}

#[cfg(test)]
mod tests {
    use super::decode_announcement;
    use crate::{FieldTree, WarningKind};

    #[test]
    fn hello_reads_language() {
        let bytes = [0x08, 0x00, 0x01, 0x00, 0x01, 0x05, 0x80, 0x02];
        let packet = decode_announcement(&bytes).unwrap();
        assert!(packet.warnings.is_empty());
        assert_eq!(
            packet.field("Language").and_then(|f| f.label.as_deref()),
            Some("English")
        );
        assert_eq!(
            packet.field("Announcement ID").and_then(|f| f.value.as_u64()),
            Some(5)
        );
    }

    #[test]
    fn hello_send_option_must_be_zero() {
        let bytes = [0x08, 0x00, 0x01, 0x01, 0x01, 0x05, 0x00];
        let packet = decode_announcement(&bytes).unwrap();
        assert_eq!(packet.warnings[0].kind, WarningKind::UnexpectedValue);
    }

    #[test]
    fn data_payload_carries_message() {
        let mut bytes = vec![0x01, 0x00, 0x02];
        let body = [0x07, 0x02, b'h', b'i'];
        bytes.extend_from_slice(&(body.len() as u16).to_le_bytes());
        bytes.push(0x01);
        bytes.extend_from_slice(&body);
        let packet = decode_announcement(&bytes).unwrap();
        let payload = packet.field("Payload").unwrap();
        assert_eq!(payload.label.as_deref(), Some("Data"));
        assert_eq!(payload.child("Message").and_then(|f| f.value.as_str()), Some("hi"));
        assert!(packet.all_warnings().is_empty());
    }

    #[test]
    fn unknown_tag_is_kept_raw() {
        let bytes = [0x00, 0x01, 0x00, 0x09, 0xee];
        let packet = decode_announcement(&bytes).unwrap();
        let warnings = packet.all_warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::UnknownTag);
    }

    #[test]
    fn ack_reads_received_bitfield() {
        let packet = decode_announcement(&[0x0a, 0x00, 0x03, 0xff]).unwrap();
        assert_eq!(
            packet.field("Received").and_then(|f| f.value.as_u64()),
            Some(0xff)
        );
    }

    #[test]
    fn truncated_hello_is_fatal() {
        let err = decode_announcement(&[0x08, 0x00, 0x01]).unwrap_err();
        assert_eq!(err.field(), Some("Send option"));
    }
}
