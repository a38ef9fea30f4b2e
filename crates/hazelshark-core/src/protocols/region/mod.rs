//! Region descriptor decoding.
//!
//! A region file is a flat record: selected index, region name, ping host and
//! a counted server list. There is no tag dispatch.

pub mod parser;

pub use parser::decode_region_info;
