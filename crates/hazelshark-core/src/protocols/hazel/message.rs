//! Game-data messages carried by the game data payloads.

use super::layout::MessageType;
use super::rpc::read_rpc;
use super::spawn::read_spawn;
use crate::AnnotatedField;
use crate::protocols::common::envelope::{Envelope, read_records, unknown_body};
use crate::protocols::common::error::DecodeError;
use crate::protocols::common::fields::{FieldReader, Fields};
use crate::protocols::common::names;

pub const MESSAGE: Envelope = Envelope {
    name: "Message",
    description: "Game data message.",
    tag: "Message type",
    tag_description: "Kind of game data message.",
    tags: &names::MESSAGE_TYPES,
};

/// Decode framed messages until the enclosing payload ends.
pub fn read_messages(reader: &mut FieldReader<'_>) -> Result<Vec<AnnotatedField>, DecodeError> {
    read_records(reader, &MESSAGE, read_message_body)
}

fn read_message_body(
    reader: &mut FieldReader<'_>,
    tag: u8,
    fields: &mut Fields,
) -> Result<(), DecodeError> {
    match MessageType::from_u8(tag) {
        MessageType::Data => {
            fields.push(reader.packed("Net ID", "Object whose state follows.")?);
            if reader.has_remaining() {
                fields.push(reader.rest("Data", "Serialized object state.")?);
            }
        }
        MessageType::Rpc => read_rpc(reader, fields)?,
        MessageType::Spawn => read_spawn(reader, fields)?,
        MessageType::Despawn => {
            fields.push(reader.packed("Net ID", "Object being destroyed.")?);
        }
        MessageType::SceneChange => {
            fields.push(reader.packed("Client ID", "Client changing scene.")?);
            fields.push(reader.string("Scene", "Name of the loaded scene.")?);
        }
        MessageType::Ready => {
            fields.push(reader.packed("Client ID", "Client that finished loading.")?);
        }
        MessageType::ChangeSettings => {}
        MessageType::Unknown(tag) => unknown_body(reader, fields, "message type", tag)?,
    }
    Ok(())
}
