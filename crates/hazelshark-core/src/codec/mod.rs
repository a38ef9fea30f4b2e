//! Auxiliary codecs: pure, stateless conversions used by the dissectors.
//!
//! - `varint`: 7-bit packed integers (group-capped).
//! - `game_code`: game code text ⇄ integer, both protocol generations.
//! - `version`: client version ⇄ integer.
//! - `lerp`: linear interpolation for compressed coordinates.

pub mod game_code;
pub mod lerp;
pub mod varint;
pub mod version;

pub use game_code::{GameCodeError, code_to_int, int_to_code};
pub use lerp::{decode_coordinate, encode_coordinate, lerp, unlerp};
pub use varint::{MAX_PACKED_GROUPS, PackedInt, decode_packed, encode_packed};
pub use version::ClientVersion;
