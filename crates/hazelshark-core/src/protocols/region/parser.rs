use tracing::debug;

use crate::RegionInfo;
use crate::protocols::common::error::{DecodeError, Warning, WarningKind};
use crate::protocols::common::fields::{FieldReader, Fields};

/// Decode a region descriptor.
///
/// A server count that is negative or larger than the servers actually
/// present stops at the end of the buffer with a `ClampedLength` warning.
///
/// # Examples
/// ```
/// use hazelshark_core::{FieldTree, decode_region_info};
///
/// let mut bytes = 0i32.to_le_bytes().to_vec();
/// bytes.extend_from_slice(&[2, b'E', b'U', 0]);
/// bytes.extend_from_slice(&1i32.to_le_bytes());
/// bytes.extend_from_slice(&[1, b'A', 127, 0, 0, 1, 0x07, 0x56]);
/// let region = decode_region_info(&bytes)?;
/// assert_eq!(region.field("Region name").and_then(|f| f.value.as_str()), Some("EU"));
/// assert_eq!(region.fields.iter().filter(|f| f.name == "Server").count(), 1);
/// # Ok::<(), hazelshark_core::DecodeError>(())
/// ```
pub fn decode_region_info(buffer: &[u8]) -> Result<RegionInfo, DecodeError> {
    let mut reader = FieldReader::new(buffer);
    let mut fields = Fields::new();

    fields.push(reader.i32_le("Selected", "Index of the selected region.")?);
    fields.push(reader.string("Region name", "Name of the region.")?);
    fields.push(reader.string("Ping IP", "Host pinged to measure latency.")?);
    let count = reader.i32_le("Server count", "Number of servers in the region.")?;
    let declared = count.value.as_i64().unwrap_or_default();
    let count_offset = count.range.start;
    fields.push(count);

    let mut decoded = 0i64;
    while decoded < declared && reader.has_remaining() {
        let start = reader.position();
        let mut server = Fields::new();
        server.push(reader.string("Server name", "Name of the server.")?);
        server.push(reader.ipv4("IP", "Server address.")?);
        server.push(reader.u16_le("Port", "")?);
        let entry = reader.group("Server", "One game server.", start, server);
        let label = entry
            .child("Server name")
            .and_then(|f| f.value.as_str())
            .map(str::to_string);
        fields.push(match label {
            Some(label) => entry.with_label(label),
            None => entry,
        });
        decoded += 1;
    }

    if decoded != declared.max(0) || declared < 0 {
        debug!(declared, decoded, "region server count clamped");
        fields.warn(Warning::new(
            WarningKind::ClampedLength,
            count_offset,
            format!("server count {declared} clamped to {decoded}"),
        ));
    }

    if reader.has_remaining() {
        let offset = reader.position();
        let trailing = reader.remaining();
        fields.push(reader.rest("Trailing data", "Bytes after the server list.")?);
        fields.warn(Warning::new(
            WarningKind::LengthMismatch,
            offset,
            format!("{trailing} unexpected bytes after the server list"),
        ));
    }

    Ok(RegionInfo {
        fields: fields.children,
        warnings: fields.warnings,
    })
}
