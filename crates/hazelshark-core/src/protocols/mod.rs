//! Protocol decoding modules.
//!
//! Each protocol follows a layered structure:
//! - `layout`: dispatch values and wire constants (source of truth)
//! - `common`: the byte cursor, the annotated field reader and record framing
//! - `parser`: domain-level decoding into annotated field trees
//!
//! Parsers are pure and contain no I/O; sources, capture decoding and the
//! workspace handle file access.

pub mod announcement;
pub(crate) mod common;
pub mod hazel;
pub mod region;
