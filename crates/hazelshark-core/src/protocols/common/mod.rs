//! Primitives shared by every dissector: the byte cursor, the annotated
//! field reader, the error/warning taxonomy and the static label tables.

pub mod cursor;
pub mod envelope;
pub mod error;
pub mod fields;
pub mod hex;
pub mod names;
