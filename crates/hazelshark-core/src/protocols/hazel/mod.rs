//! Game-server protocol decoding.
//!
//! The dissector walks opcode → payload → message → RPC or spawn component.
//! Every level below the opcode is framed by a declared length, so each
//! record is decoded inside a region scoped to that length and the cursor is
//! then forced to its declared end. Unknown tags keep their raw bytes.
//!
//! Dispatch values live in `layout`, flag bytes and formatting hints in
//! `bitfields`, and each framing level in its own module.
//!
//! Version française (résumé):
//! Le module décode les paquets du serveur de jeu (opcode, charge utile,
//! message, RPC, composants). Chaque enregistrement est borné par sa longueur
//! déclarée; les étiquettes inconnues conservent leurs octets bruts.

pub mod bitfields;
pub mod layout;
mod message;
mod options;
pub mod parser;
mod payload;
mod rpc;
mod spawn;

pub use parser::decode;
pub(crate) use payload::disconnect_reason;
