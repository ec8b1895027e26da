//! Lyrics-to-recognition timestamp linking.
//!
//! Takes correct lyrics (one phrase per line) and the word-level output of a
//! speech recognizer, and returns the lyrics with a start/end time on every
//! word. See [`align::get_linker`] for the available strategies.

pub mod align;
pub mod cache;
pub mod config;
pub mod error;
pub mod interpolate;
pub mod text;
pub mod timed_text;
pub mod transcript;
pub mod types;

pub use align::{LineLinker, LinkReport, Linker, WordLinker, get_linker};
pub use config::{AlignConfig, VowelSet};
pub use error::AlignError;
pub use types::{Phrase, Timing, Word};
