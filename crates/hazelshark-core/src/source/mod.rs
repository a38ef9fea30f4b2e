//! Capture file sources.
//!
//! A source yields raw link-layer frames in capture order; decoding and
//! classification happen in `capture`.

mod pcap;

pub use pcap::PcapFileSource;

use pcap_parser::Linktype;
use thiserror::Error;

/// One captured link-layer frame.
#[derive(Debug, Clone)]
pub struct CaptureFrame {
    /// Seconds since the Unix epoch, when the capture records it.
    pub timestamp: Option<f64>,
    pub linktype: Linktype,
    pub data: Vec<u8>,
}

/// Sequential access to the frames of a capture.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<CaptureFrame>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("capture parse error: {0}")]
    Pcap(String),
}

impl From<pcap::error::PcapSourceError> for SourceError {
    fn from(value: pcap::error::PcapSourceError) -> Self {
        match value {
            pcap::error::PcapSourceError::Io(err) => SourceError::Io(err),
            pcap::error::PcapSourceError::Pcap { context, message } => {
                SourceError::Pcap(format!("{context}: {message}"))
            }
        }
    }
}
