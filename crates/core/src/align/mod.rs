//! Linker interface and strategies.
//!
//! Links correct lyrics to recognized phrases, producing per-word
//! timestamps for the lyrics:
//! - WordLinker: whole-text character diff, word by word
//! - LineLinker: greedy per-line window search refined by WordLinker

pub mod line_level;
pub mod word_level;

use anyhow::{Result, bail};

use crate::config::AlignConfig;
use crate::error::AlignError;
use crate::types::Phrase;

pub use line_level::{LineLinker, LinkReport};
pub use word_level::WordLinker;

/// Timestamp linking strategy.
pub trait Linker: Send + Sync {
    /// Strategy name for caching/display.
    fn name(&self) -> &str;

    /// Align `full_text` (one phrase per line) to recognized phrases.
    ///
    /// Every word of the returned phrases carries timing.
    fn link(&self, full_text: &str, phrases: &[Phrase]) -> Result<Vec<Phrase>, AlignError>;
}

/// Start of the recognized audio: first phrase start, else first word start.
pub(crate) fn recognized_lead(phrases: &[Phrase]) -> f64 {
    phrases
        .first()
        .and_then(|p| p.start().or_else(|| p.words.first().and_then(|w| w.start())))
        .unwrap_or(0.0)
}

/// End of the recognized audio: last phrase end, else last word end.
pub(crate) fn recognized_tail(phrases: &[Phrase]) -> f64 {
    phrases
        .last()
        .and_then(|p| p.end().or_else(|| p.words.last().and_then(|w| w.end())))
        .unwrap_or(0.0)
}

/// Get a linker by name.
///
/// Modes:
/// - "word": character diff over the whole text.
/// - "line": greedy line windows, refined per line.
pub fn get_linker(name: &str, config: AlignConfig) -> Result<Box<dyn Linker>> {
    config.validate()?;
    match name {
        "word" => Ok(Box::new(WordLinker::new(config))),
        "line" => Ok(Box::new(LineLinker::new(config))),
        _ => bail!("Unknown linker: '{}'. Available: word, line", name),
    }
}
