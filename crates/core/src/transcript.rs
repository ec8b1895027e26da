//! Recognized phrases on disk.
//!
//! Reads Whisper-style transcription responses and the persisted phrase
//! array written by [`write_phrases`].

use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::types::{Phrase, Timing, Word};

/// Parse a Whisper response with word timestamps into phrases.
///
/// Words are trimmed and empty ones dropped; segments left without words
/// are dropped too.
pub fn parse_whisper_json(json_str: &str) -> Result<Vec<Phrase>> {
    let value: serde_json::Value =
        serde_json::from_str(json_str).context("Failed to parse whisper JSON")?;
    phrases_from_whisper(&value)
}

fn phrases_from_whisper(value: &serde_json::Value) -> Result<Vec<Phrase>> {
    let Some(segments) = value["segments"].as_array() else {
        bail!("Whisper JSON has no 'segments' array");
    };

    let mut phrases = Vec::new();
    for segment in segments {
        let mut words = Vec::new();
        if let Some(segment_words) = segment["words"].as_array() {
            for w in segment_words {
                let text = w["word"].as_str().unwrap_or("").trim().to_string();
                let (Some(start), Some(end)) = (w["start"].as_f64(), w["end"].as_f64()) else {
                    continue;
                };
                if !text.is_empty() {
                    words.push(Word::new(text, start, end.max(start)));
                }
            }
        }
        if words.is_empty() {
            continue;
        }

        let text = segment["text"].as_str().unwrap_or("").trim().to_string();
        let mut phrase = Phrase::new(text, words);
        if let (Some(start), Some(end)) = (segment["start"].as_f64(), segment["end"].as_f64()) {
            // Segment bounds may be looser than the word bounds
            if let Some((first, last)) = phrase.timing.bounds() {
                phrase.timing = Timing::span(start.min(first), end.max(last));
            }
        }
        phrases.push(phrase);
    }
    Ok(phrases)
}

/// Parse either a persisted phrase array or a Whisper response.
pub fn parse_phrases(json_str: &str) -> Result<Vec<Phrase>> {
    let value: serde_json::Value =
        serde_json::from_str(json_str).context("Failed to parse transcript JSON")?;
    if value.is_array() {
        serde_json::from_value(value).context("Failed to read phrase array")
    } else {
        phrases_from_whisper(&value)
    }
}

/// Read recognized phrases from a file (either format).
pub fn read_phrases(path: &Path) -> Result<Vec<Phrase>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read transcript: {}", path.display()))?;
    parse_phrases(&data).with_context(|| format!("Invalid transcript: {}", path.display()))
}

/// Write phrases as a pretty-printed JSON array.
pub fn write_phrases(path: &Path, phrases: &[Phrase]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(phrases)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
