//! Announcement-server protocol decoding.
//!
//! Same transport framing as the game server with a much smaller payload set:
//! cached announcement, new announcement text and the free-weekend state.
//!
//! Version française (résumé):
//! Décodage des messages du serveur d'annonces (cache, annonce, week-end
//! gratuit) avec les mêmes primitives que le serveur de jeu.

pub mod layout;
pub mod parser;

pub use parser::decode_announcement;
