use std::fs;
use std::path::Path;

use etherparse::PacketBuilder;
use hazelshark_core::{
    CaptureConfig, Direction, FrameSource, PacketKind, PcapFileSource, RecordDecode, SourceError,
    decode_capture,
};

const CLIENT: [u8; 4] = [192, 168, 1, 20];
const SERVER: [u8; 4] = [45, 79, 5, 6];

fn udp_frame(src: [u8; 4], dst: [u8; 4], src_port: u16, dst_port: u16, payload: &[u8]) -> Vec<u8> {
    let builder = PacketBuilder::ethernet2([1, 2, 3, 4, 5, 6], [0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f])
        .ipv4(src, dst, 64)
        .udp(src_port, dst_port);
    let mut frame = Vec::with_capacity(builder.size(payload.len()));
    builder.write(&mut frame, payload).unwrap();
    frame
}

fn pcapng_block(block_type: u32, body: &[u8]) -> Vec<u8> {
    let total_len = (8 + body.len() + 4) as u32;
    let mut block = Vec::with_capacity(total_len as usize);
    block.extend_from_slice(&block_type.to_be_bytes());
    block.extend_from_slice(&total_len.to_be_bytes());
    block.extend_from_slice(body);
    block.extend_from_slice(&total_len.to_be_bytes());
    block
}

fn write_pcapng(path: &Path, frames: &[(u64, Vec<u8>)]) {
    let mut section = Vec::new();
    section.extend_from_slice(&0x1A2B_3C4Du32.to_be_bytes());
    section.extend_from_slice(&1u16.to_be_bytes());
    section.extend_from_slice(&0u16.to_be_bytes());
    section.extend_from_slice(&(-1i64).to_be_bytes());

    let mut interface = Vec::new();
    interface.extend_from_slice(&1u16.to_be_bytes());
    interface.extend_from_slice(&0u16.to_be_bytes());
    interface.extend_from_slice(&65535u32.to_be_bytes());

    let mut output = pcapng_block(0x0A0D_0D0A, &section);
    output.extend_from_slice(&pcapng_block(1, &interface));
    for (ts_us, data) in frames {
        let mut body = Vec::new();
        body.extend_from_slice(&0u32.to_be_bytes());
        body.extend_from_slice(&((*ts_us >> 32) as u32).to_be_bytes());
        body.extend_from_slice(&(*ts_us as u32).to_be_bytes());
        body.extend_from_slice(&(data.len() as u32).to_be_bytes());
        body.extend_from_slice(&(data.len() as u32).to_be_bytes());
        body.extend_from_slice(data);
        body.resize(body.len() + (4 - data.len() % 4) % 4, 0);
        output.extend_from_slice(&pcapng_block(6, &body));
    }
    fs::write(path, output).unwrap();
}

fn write_legacy_pcap(path: &Path, frames: &[(u32, u32, Vec<u8>)]) {
    let mut output = Vec::new();
    output.extend_from_slice(&0xa1b2_c3d4u32.to_le_bytes());
    output.extend_from_slice(&2u16.to_le_bytes());
    output.extend_from_slice(&4u16.to_le_bytes());
    output.extend_from_slice(&0i32.to_le_bytes());
    output.extend_from_slice(&0u32.to_le_bytes());
    output.extend_from_slice(&65535u32.to_le_bytes());
    output.extend_from_slice(&1u32.to_le_bytes());
    for (sec, usec, data) in frames {
        output.extend_from_slice(&sec.to_le_bytes());
        output.extend_from_slice(&usec.to_le_bytes());
        output.extend_from_slice(&(data.len() as u32).to_le_bytes());
        output.extend_from_slice(&(data.len() as u32).to_le_bytes());
        output.extend_from_slice(data);
    }
    fs::write(path, output).unwrap();
}

const HELLO: [u8; 17] = [8, 0, 1, 0, 70, 210, 2, 3, 8, 119, 101, 97, 107, 101, 121, 101, 115];

#[test]
fn pcapng_capture_is_decoded_per_datagram() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.pcapng");
    let base = 1_600_000_000_000_000u64;
    write_pcapng(
        &path,
        &[
            (base, udp_frame(CLIENT, SERVER, 50000, 22023, &HELLO)),
            (base + 10, udp_frame(SERVER, CLIENT, 22023, 50000, &[0x0a, 0x00, 0x01, 0xff])),
            (base + 20, udp_frame(CLIENT, [8, 8, 8, 8], 50001, 53, &[0x00; 12])),
            (base + 30, udp_frame(SERVER, CLIENT, 22024, 50002, &[0x0c, 0x00])),
            (base + 40, udp_frame(CLIENT, SERVER, 50000, 22023, &[0x01, 0x00, 0x02])),
        ],
    );

    let report = decode_capture(&path, &CaptureConfig::default()).unwrap();
    assert_eq!(report.frames_total, 5);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.decoded, 3);
    assert_eq!(report.failed, 1);
    assert!(
        report
            .time_start
            .as_deref()
            .is_some_and(|ts| ts.starts_with("2020-09-13T12:26:"))
    );

    let indices: Vec<u64> = report.entries.iter().map(|entry| entry.index).collect();
    assert_eq!(indices, vec![1, 2, 4, 5]);

    let hello = &report.entries[0];
    assert_eq!(hello.source, "192.168.1.20:50000");
    assert_eq!(hello.record.direction, Direction::Serverbound);
    match &hello.decoded {
        Some(RecordDecode::Game(packet)) => assert_eq!(
            packet.field("Username").and_then(|f| f.value.as_str()),
            Some("weakeyes")
        ),
        other => panic!("unexpected decode {other:?}"),
    }

    let ack = &report.entries[1];
    assert_eq!(ack.record.direction, Direction::Clientbound);
    assert_eq!(ack.warning_count(), 0);

    let announcement = &report.entries[2];
    assert_eq!(announcement.record.kind, PacketKind::AnnouncementServer);
    assert!(announcement.error.as_deref().is_some_and(|e| e.contains("Nonce")));
    assert!(announcement.decoded.is_none());

    let reliable = &report.entries[3];
    assert!(reliable.error.is_none());
    assert_eq!(reliable.to_record().data, vec![0x01, 0x00, 0x02]);
}

#[test]
fn legacy_pcap_capture_is_decoded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.pcap");
    write_legacy_pcap(
        &path,
        &[(
            1_600_000_000,
            500_000,
            udp_frame(SERVER, CLIENT, 22023, 50000, &[0x0c, 0x00, 0x09]),
        )],
    );

    let mut source = PcapFileSource::open(&path).unwrap();
    let frame = source.next_frame().unwrap().expect("one frame");
    assert!(frame.timestamp.is_some_and(|ts| (ts - 1_600_000_000.5).abs() < 1e-3));
    assert!(source.next_frame().unwrap().is_none());

    let report = decode_capture(&path, &CaptureConfig::default()).unwrap();
    assert_eq!(report.decoded, 1);
    assert_eq!(report.entries[0].record.direction, Direction::Clientbound);
}

#[test]
fn report_serializes_without_raw_tree_hints() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ping.pcapng");
    write_pcapng(
        &path,
        &[(0, udp_frame(CLIENT, SERVER, 50000, 22023, &[0x0c, 0x00, 0x07]))],
    );
    let report = decode_capture(&path, &CaptureConfig::default()).unwrap();
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["frames_total"], 1);
    let entry = &value["entries"][0];
    assert_eq!(entry["direction"], "serverbound");
    assert_eq!(entry["decoded"]["fields"][0]["label"], "Ping");
}

#[test]
fn truncated_capture_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("truncated.pcapng");
    fs::write(&path, [0x0a, 0x0d, 0x0d]).unwrap();
    let err = match PcapFileSource::open(&path) {
        Ok(_) => panic!("expected truncated file to be rejected"),
        Err(err) => err,
    };
    assert!(matches!(err, SourceError::Io(_)));
    assert!(decode_capture(&path, &CaptureConfig::default()).is_err());
}
