//! Capture decoding.
//!
//! Walks a pcap/pcapng file frame by frame, keeps the UDP datagrams that
//! belong to the game or announcement servers, and decodes each one. A
//! datagram that fails to decode is reported in its entry; it never aborts
//! the rest of the capture.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::{debug, trace};

use crate::source::{CaptureFrame, FrameSource, PcapFileSource, SourceError};
use crate::{Direction, PacketKind, PacketRecord, RecordDecode};

mod udp;

use udp::{UdpDatagram, parse_udp_datagram};

pub const DEFAULT_GAME_PORT: u16 = 22023;
pub const DEFAULT_ANNOUNCEMENT_PORT: u16 = 22024;

/// Ports used to recognise and orient game traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub game_port: u16,
    pub announcement_port: u16,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            game_port: DEFAULT_GAME_PORT,
            announcement_port: DEFAULT_ANNOUNCEMENT_PORT,
        }
    }
}

impl CaptureConfig {
    /// Kind and direction of a datagram, or `None` when neither port matches.
    ///
    /// A datagram sent to a server port is serverbound; one sent from it is
    /// clientbound. The game port is checked first.
    pub fn classify(&self, src_port: u16, dst_port: u16) -> Option<(PacketKind, Direction)> {
        [
            (self.game_port, PacketKind::GameServer),
            (self.announcement_port, PacketKind::AnnouncementServer),
        ]
        .into_iter()
        .find_map(|(port, kind)| {
            if dst_port == port {
                Some((kind, Direction::Serverbound))
            } else if src_port == port {
                Some((kind, Direction::Clientbound))
            } else {
                None
            }
        })
    }
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("source error: {0}")]
    Source(#[from] SourceError),
}

/// One game datagram found in a capture.
#[derive(Debug, Clone, Serialize)]
pub struct CaptureEntry {
    /// 1-based frame number in the capture.
    pub index: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub source: String,
    pub destination: String,
    #[serde(flatten)]
    pub record: PacketRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoded: Option<RecordDecode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CaptureEntry {
    /// The datagram as a saveable record.
    pub fn to_record(&self) -> PacketRecord {
        self.record.clone()
    }

    pub fn warning_count(&self) -> usize {
        self.decoded
            .as_ref()
            .map(|decoded| decoded.tree().all_warnings().len())
            .unwrap_or_default()
    }
}

/// Result of [`decode_capture`].
#[derive(Debug, Clone, Serialize)]
pub struct CaptureReport {
    pub capture: String,
    pub frames_total: u64,
    /// Frames that were not game or announcement datagrams.
    pub skipped: u64,
    pub decoded: u64,
    pub failed: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_end: Option<String>,
    pub entries: Vec<CaptureEntry>,
}

/// Decode every game datagram of a pcap or pcapng file.
pub fn decode_capture(path: &Path, config: &CaptureConfig) -> Result<CaptureReport, CaptureError> {
    let source = PcapFileSource::open(path)?;
    decode_source(&path.display().to_string(), source, config)
}

/// Decode every game datagram yielded by `source`.
pub fn decode_source<S: FrameSource>(
    capture: &str,
    mut source: S,
    config: &CaptureConfig,
) -> Result<CaptureReport, CaptureError> {
    let mut report = CaptureReport {
        capture: capture.to_string(),
        frames_total: 0,
        skipped: 0,
        decoded: 0,
        failed: 0,
        time_start: None,
        time_end: None,
        entries: Vec::new(),
    };
    let mut first_ts = None;
    let mut last_ts = None;

    while let Some(frame) = source.next_frame()? {
        report.frames_total += 1;
        update_ts_bounds(&mut first_ts, &mut last_ts, frame.timestamp);
        let index = report.frames_total;
        match game_datagram(&frame, index, config) {
            Some((datagram, kind, direction)) => {
                let entry = decode_datagram(index, frame.timestamp, &datagram, kind, direction);
                if entry.error.is_some() {
                    report.failed += 1;
                } else {
                    report.decoded += 1;
                }
                report.entries.push(entry);
            }
            None => report.skipped += 1,
        }
    }

    report.time_start = ts_to_rfc3339(first_ts);
    report.time_end = ts_to_rfc3339(last_ts);
    debug!(
        capture,
        frames = report.frames_total,
        decoded = report.decoded,
        failed = report.failed,
        "capture decoded"
    );
    Ok(report)
}

fn game_datagram<'f>(
    frame: &'f CaptureFrame,
    index: u64,
    config: &CaptureConfig,
) -> Option<(UdpDatagram<'f>, PacketKind, Direction)> {
    let datagram = match parse_udp_datagram(frame.linktype, &frame.data) {
        Ok(Some(datagram)) => datagram,
        Ok(None) => {
            trace!(index, "frame is not UDP");
            return None;
        }
        Err(err) => {
            trace!(index, %err, "frame could not be sliced");
            return None;
        }
    };
    match config.classify(datagram.src_port, datagram.dst_port) {
        Some((kind, direction)) => Some((datagram, kind, direction)),
        None => {
            trace!(
                index,
                src_port = datagram.src_port,
                dst_port = datagram.dst_port,
                "datagram on unrelated ports"
            );
            None
        }
    }
}

fn decode_datagram(
    index: u64,
    timestamp: Option<f64>,
    datagram: &UdpDatagram<'_>,
    kind: PacketKind,
    direction: Direction,
) -> CaptureEntry {
    let record = PacketRecord::new(
        format!("Frame {index}"),
        datagram.payload.to_vec(),
        direction,
        kind,
    );
    let (decoded, error) = match record.decode() {
        Ok(decoded) => (Some(decoded), None),
        Err(err) => {
            debug!(index, %err, "datagram failed to decode");
            (None, Some(err.to_string()))
        }
    };
    CaptureEntry {
        index,
        timestamp: ts_to_rfc3339(timestamp),
        source: datagram.source(),
        destination: datagram.destination(),
        record,
        decoded,
        error,
    }
}

fn update_ts_bounds(first: &mut Option<f64>, last: &mut Option<f64>, ts: Option<f64>) {
    let Some(ts) = ts else {
        return;
    };
    if first.is_none_or(|existing| ts < existing) {
        *first = Some(ts);
    }
    if last.is_none_or(|existing| ts > existing) {
        *last = Some(ts);
    }
}

fn ts_to_rfc3339(ts: Option<f64>) -> Option<String> {
    let ts = ts?;
    let nanos = (ts * 1_000_000_000.0) as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use etherparse::PacketBuilder;
    use pcap_parser::Linktype;

    use super::*;

    struct MemorySource(VecDeque<CaptureFrame>);

    impl FrameSource for MemorySource {
        fn next_frame(&mut self) -> Result<Option<CaptureFrame>, SourceError> {
            Ok(self.0.pop_front())
        }
    }

    fn udp_frame(ts: f64, src_port: u16, dst_port: u16, payload: &[u8]) -> CaptureFrame {
        let builder = PacketBuilder::ethernet2([1, 2, 3, 4, 5, 6], [6, 5, 4, 3, 2, 1])
            .ipv4([10, 0, 0, 1], [10, 0, 0, 2], 64)
            .udp(src_port, dst_port);
        let mut data = Vec::with_capacity(builder.size(payload.len()));
        builder.write(&mut data, payload).unwrap();
        CaptureFrame {
            timestamp: Some(ts),
            linktype: Linktype::ETHERNET,
            data,
        }
    }

    #[test]
    fn classify_uses_destination_for_direction() {
        let config = CaptureConfig::default();
        assert_eq!(
            config.classify(50000, 22023),
            Some((PacketKind::GameServer, Direction::Serverbound))
        );
        assert_eq!(
            config.classify(22024, 50000),
            Some((PacketKind::AnnouncementServer, Direction::Clientbound))
        );
        assert_eq!(config.classify(53, 50000), None);
    }

    #[test]
    fn datagrams_are_decoded_in_capture_order() {
        let source = MemorySource(VecDeque::from(vec![
            udp_frame(2.0, 22023, 50000, &[0x0c, 0x00, 0x05]),
            udp_frame(1.0, 50000, 53, &[0x00]),
            udp_frame(3.5, 50000, 22023, &[0x01, 0x00]),
        ]));
        let report = decode_source("memory", source, &CaptureConfig::default()).unwrap();

        assert_eq!(report.frames_total, 3);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.decoded, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.time_start.as_deref(), Some("1970-01-01T00:00:01Z"));
        assert_eq!(report.time_end.as_deref(), Some("1970-01-01T00:00:03.5Z"));

        let ping = &report.entries[0];
        assert_eq!(ping.index, 1);
        assert_eq!(ping.record.direction, Direction::Clientbound);
        assert!(ping.decoded.is_some());

        let broken = &report.entries[1];
        assert_eq!(broken.index, 3);
        assert_eq!(broken.record.direction, Direction::Serverbound);
        assert!(broken.error.as_deref().unwrap_or_default().contains("Nonce"));
    }

    #[test]
    fn entry_json_flattens_record() {
        let source = MemorySource(VecDeque::from(vec![udp_frame(
            0.0,
            50000,
            22023,
            &[0x0c, 0x00, 0x05],
        )]));
        let report = decode_source("memory", source, &CaptureConfig::default()).unwrap();
        let value = serde_json::to_value(&report.entries[0]).unwrap();
        assert_eq!(value["name"], "Frame 1");
        assert_eq!(value["data"], "0c 00 05");
        assert_eq!(value["kind"], "game_server");
        assert!(value.get("error").is_none());
        assert_eq!(report.entries[0].to_record().data, vec![0x0c, 0x00, 0x05]);
    }

    #[test]
    fn custom_ports_are_honoured() {
        let config = CaptureConfig {
            game_port: 4000,
            announcement_port: 4001,
        };
        let source = MemorySource(VecDeque::from(vec![
            udp_frame(0.0, 50000, 22023, &[0x0c, 0x00, 0x05]),
            udp_frame(0.0, 50000, 4000, &[0x0c, 0x00, 0x05]),
        ]));
        let report = decode_source("memory", source, &config).unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].index, 2);
    }

    #[test]
    fn ts_bounds_track_min_and_max() {
        let mut first = None;
        let mut last = None;
        for ts in [Some(5.0), None, Some(1.0), Some(9.0)] {
            update_ts_bounds(&mut first, &mut last, ts);
        }
        assert_eq!(first, Some(1.0));
        assert_eq!(last, Some(9.0));
        assert_eq!(ts_to_rfc3339(None), None);
    }
}
