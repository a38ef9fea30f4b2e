//! PCAP/PCAPNG source implementation.
//!
//! Provides a `FrameSource` backed by a capture file. Handles file I/O and
//! block parsing, emitting raw frames with their link type and timestamp.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use parser::PcapFileSource;
