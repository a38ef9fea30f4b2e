use std::fs::File;
use std::path::Path;

use pcap_parser::traits::PcapReaderIterator;
use pcap_parser::{Block, LegacyPcapReader, Linktype, PcapBlockOwned, PcapError, PcapNGReader};
use tracing::trace;

use crate::source::{CaptureFrame, FrameSource, SourceError};

use super::error::PcapSourceError;
use super::layout;
use super::reader::{
    is_pcapng_magic, legacy_ts_to_seconds, linktype_for_interface, pcapng_ts_to_seconds,
    read_magic_and_rewind,
};

/// Frames of a PCAP or PCAPNG file, detected by magic bytes.
pub struct PcapFileSource {
    inner: PcapReader,
}

enum PcapReader {
    Legacy {
        reader: LegacyPcapReader<File>,
        linktype: Option<Linktype>,
    },
    Ng {
        reader: PcapNGReader<File>,
        linktypes: Vec<Linktype>,
    },
}

impl PcapFileSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let mut file = File::open(path)?;
        let magic = read_magic_and_rewind(&mut file)?;
        let inner = if is_pcapng_magic(&magic) {
            trace!(path = %path.display(), "opening pcapng capture");
            let reader = PcapNGReader::new(layout::PCAP_READER_BUFFER_SIZE, file)
                .map_err(|e| PcapSourceError::pcap("pcapng reader init", e))?;
            PcapReader::Ng {
                reader,
                linktypes: Vec::new(),
            }
        } else {
            trace!(path = %path.display(), "opening pcap capture");
            let reader = LegacyPcapReader::new(layout::PCAP_READER_BUFFER_SIZE, file)
                .map_err(|e| PcapSourceError::pcap("pcap reader init", e))?;
            PcapReader::Legacy {
                reader,
                linktype: None,
            }
        };
        Ok(Self { inner })
    }
}

impl FrameSource for PcapFileSource {
    fn next_frame(&mut self) -> Result<Option<CaptureFrame>, SourceError> {
        let frame = match &mut self.inner {
            PcapReader::Legacy { reader, linktype } => pump(reader, "pcap reader", |block| match block {
                PcapBlockOwned::LegacyHeader(header) => {
                    *linktype = Some(header.network);
                    None
                }
                PcapBlockOwned::Legacy(packet) => Some(CaptureFrame {
                    timestamp: Some(legacy_ts_to_seconds(packet.ts_sec, packet.ts_usec)),
                    linktype: linktype.unwrap_or(Linktype::ETHERNET),
                    data: packet.data.to_vec(),
                }),
                _ => None,
            })?,
            PcapReader::Ng { reader, linktypes } => pump(reader, "pcapng reader", |block| match block {
                PcapBlockOwned::NG(Block::InterfaceDescription(intf)) => {
                    linktypes.push(intf.linktype);
                    None
                }
                PcapBlockOwned::NG(Block::EnhancedPacket(packet)) => Some(CaptureFrame {
                    timestamp: Some(pcapng_ts_to_seconds(packet.ts_high, packet.ts_low)),
                    linktype: linktype_for_interface(linktypes, packet.if_id),
                    data: packet.data.to_vec(),
                }),
                _ => None,
            })?,
        };
        Ok(frame)
    }
}

/// Drive a pcap-parser reader until `handle` turns a block into a frame.
///
/// Blocks for which `handle` returns `None` (headers, statistics) are
/// consumed silently; `Ok(None)` means end of file.
fn pump<R>(
    reader: &mut R,
    context: &'static str,
    mut handle: impl FnMut(PcapBlockOwned<'_>) -> Option<CaptureFrame>,
) -> Result<Option<CaptureFrame>, PcapSourceError>
where
    R: PcapReaderIterator,
{
    loop {
        match reader.next() {
            Ok((offset, block)) => {
                let frame = handle(block);
                reader.consume(offset);
                if frame.is_some() {
                    return Ok(frame);
                }
            }
            Err(PcapError::Eof) => return Ok(None),
            Err(PcapError::Incomplete(_)) => {
                reader
                    .refill()
                    .map_err(|e| PcapSourceError::pcap(context, format!("refill: {e}")))?;
            }
            Err(e) => return Err(PcapSourceError::pcap(context, format!("next block: {e}"))),
        }
    }
}
