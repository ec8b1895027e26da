//! Tuning knobs for the linkers.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::AlignError;

/// Characters counted as vowels when estimating how long a word is sung.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VowelSet {
    chars: String,
}

impl VowelSet {
    pub const LATIN: &'static str = "aeiouу";
    pub const CYRILLIC: &'static str = "еыаоэяию";

    pub fn new(chars: impl Into<String>) -> Self {
        Self {
            chars: chars.into().to_lowercase(),
        }
    }

    /// Number of vowel characters in `word`, case-insensitive.
    pub fn count(&self, word: &str) -> usize {
        word.chars()
            .flat_map(char::to_lowercase)
            .filter(|c| self.chars.contains(*c))
            .count()
    }

    /// Duration weight of a word: vowel count with a floor of 1.
    pub fn weight(&self, word: &str) -> f64 {
        self.count(word).max(1) as f64
    }
}

impl Default for VowelSet {
    fn default() -> Self {
        Self::new(format!("{}{}", Self::LATIN, Self::CYRILLIC))
    }
}

/// Thresholds, search windows and heuristics shared by both linkers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignConfig {
    /// Minimum lyrics/transcript ratio before word linking gives up
    pub min_text_ratio: f64,
    /// Minimum ratio for accepting a near-miss word
    pub min_word_ratio: f64,
    /// Minimum ratio for accepting a line window
    pub min_line_ratio: f64,
    /// Accept near-miss words by ratio
    pub match_words_linking: bool,
    /// Accept near-miss words by equal vowel count
    pub vowel_linking: bool,
    pub min_vowels_for_match: usize,
    /// First `maxSkip` tried by the line search (inclusive)
    pub min_window: usize,
    /// Last `maxSkip` bound of the line search (exclusive)
    pub max_window: usize,
    /// Cap on recognized words taken for one line (exclusive)
    pub max_words_per_line: usize,
    pub vowels: VowelSet,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            min_text_ratio: 0.1,
            min_word_ratio: 0.6,
            min_line_ratio: 0.6,
            match_words_linking: true,
            vowel_linking: false,
            min_vowels_for_match: 2,
            min_window: 5,
            max_window: 55,
            max_words_per_line: 50,
            vowels: VowelSet::default(),
        }
    }
}

impl AlignConfig {
    /// Load a config from JSON; missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: AlignConfig = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AlignError> {
        for (name, value) in [
            ("min_text_ratio", self.min_text_ratio),
            ("min_word_ratio", self.min_word_ratio),
            ("min_line_ratio", self.min_line_ratio),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(AlignError::invalid_config(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        if self.min_window == 0 || self.min_window >= self.max_window {
            return Err(AlignError::invalid_config(format!(
                "window range {}..{} is empty",
                self.min_window, self.max_window
            )));
        }
        if self.max_words_per_line < 2 {
            return Err(AlignError::invalid_config(
                "max_words_per_line must allow at least one word",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AlignConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.min_text_ratio - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.min_window, 5);
        assert_eq!(config.max_window, 55);
        assert_eq!(config.max_words_per_line, 50);
        assert!(!config.vowel_linking);
    }

    #[test]
    fn test_vowel_count_latin_and_cyrillic() {
        let vowels = VowelSet::default();
        assert_eq!(vowels.count("hello"), 2);
        assert_eq!(vowels.count("HELLO"), 2);
        assert_eq!(vowels.count("пожар"), 2);
        assert_eq!(vowels.count("rhythm"), 0);
    }

    #[test]
    fn test_vowel_weight_floor() {
        let vowels = VowelSet::default();
        assert!((vowels.weight("shh") - 1.0).abs() < f64::EPSILON);
        assert!((vowels.weight("banana") - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_custom_vowel_set() {
        let vowels = VowelSet::new("AEIOUY");
        assert_eq!(vowels.count("rhythm"), 1);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: AlignConfig =
            serde_json::from_str(r#"{"min_line_ratio": 0.75, "vowels": "aeiouy"}"#).unwrap();
        assert!((config.min_line_ratio - 0.75).abs() < f64::EPSILON);
        assert!((config.min_word_ratio - 0.6).abs() < f64::EPSILON);
        assert_eq!(config.vowels, VowelSet::new("aeiouy"));
    }

    #[test]
    fn test_validate_rejects_bad_ratio() {
        let config = AlignConfig {
            min_word_ratio: 1.5,
            ..AlignConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_window() {
        let config = AlignConfig {
            min_window: 10,
            max_window: 10,
            ..AlignConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("lyricsync_config_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, r#"{"vowel_linking": true}"#).unwrap();

        let config = AlignConfig::load(&path).unwrap();
        assert!(config.vowel_linking);
        assert_eq!(config.min_vowels_for_match, 2);

        std::fs::remove_dir_all(&dir).ok();
    }
}
