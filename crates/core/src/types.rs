use serde::{Deserialize, Serialize};

/// Timing state of a word or phrase.
///
/// Canonical words start out `Unresolved` and are widened by match evidence
/// or filled by interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Timing {
    #[default]
    Unresolved,
    /// Interval in seconds, `start <= end`
    Resolved { start: f64, end: f64 },
}

impl Timing {
    pub fn span(start: f64, end: f64) -> Self {
        Timing::Resolved { start, end }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Timing::Resolved { .. })
    }

    pub fn start(&self) -> Option<f64> {
        match self {
            Timing::Resolved { start, .. } => Some(*start),
            Timing::Unresolved => None,
        }
    }

    pub fn end(&self) -> Option<f64> {
        match self {
            Timing::Resolved { end, .. } => Some(*end),
            Timing::Unresolved => None,
        }
    }

    pub fn bounds(&self) -> Option<(f64, f64)> {
        match self {
            Timing::Resolved { start, end } => Some((*start, *end)),
            Timing::Unresolved => None,
        }
    }

    /// Union of this timing with `[start, end]`.
    pub fn widen(self, start: f64, end: f64) -> Self {
        match self {
            Timing::Unresolved => Timing::span(start, end),
            Timing::Resolved { start: s, end: e } => Timing::span(s.min(start), e.max(end)),
        }
    }
}

/// A single word with its timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WordRecord", into = "WordRecord")]
pub struct Word {
    pub text: String,
    pub timing: Timing,
}

impl Word {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            timing: Timing::span(start, end),
        }
    }

    pub fn unresolved(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            timing: Timing::Unresolved,
        }
    }

    pub fn start(&self) -> Option<f64> {
        self.timing.start()
    }

    pub fn end(&self) -> Option<f64> {
        self.timing.end()
    }

    pub fn is_resolved(&self) -> bool {
        self.timing.is_resolved()
    }

    pub fn set_span(&mut self, start: f64, end: f64) {
        self.timing = Timing::span(start, end);
    }

    pub fn widen(&mut self, start: f64, end: f64) {
        self.timing = self.timing.widen(start, end);
    }
}

/// A line-like unit of text composed of ordered words.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PhraseRecord", into = "PhraseRecord")]
pub struct Phrase {
    pub text: String,
    pub timing: Timing,
    pub words: Vec<Word>,
}

impl Phrase {
    /// Build a phrase from already-timed words; bounds follow the words.
    pub fn new(text: impl Into<String>, words: Vec<Word>) -> Self {
        let mut phrase = Self {
            text: text.into(),
            timing: Timing::Unresolved,
            words,
        };
        phrase.refresh_bounds();
        phrase
    }

    /// Split a line into unresolved words.
    pub fn from_line(line: &str) -> Self {
        Self {
            text: line.to_string(),
            timing: Timing::Unresolved,
            words: line.split_whitespace().map(Word::unresolved).collect(),
        }
    }

    pub fn start(&self) -> Option<f64> {
        self.timing.start()
    }

    pub fn end(&self) -> Option<f64> {
        self.timing.end()
    }

    pub fn is_resolved(&self) -> bool {
        self.timing.is_resolved()
    }

    /// True when the phrase and every one of its words carry timing.
    pub fn is_fully_resolved(&self) -> bool {
        self.is_resolved() && self.words.iter().all(Word::is_resolved)
    }

    /// Recompute the phrase span from its first and last word.
    ///
    /// Wordless phrases are left untouched.
    pub fn refresh_bounds(&mut self) {
        let (Some(first), Some(last)) = (self.words.first(), self.words.last()) else {
            return;
        };
        self.timing = match (first.start(), last.end()) {
            (Some(start), Some(end)) => Timing::span(start, end),
            _ => Timing::Unresolved,
        };
    }
}

// --- Persisted JSON shape ---

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WordRecord {
    #[serde(rename = "word", alias = "text")]
    text: String,
    #[serde(default)]
    start: Option<f64>,
    #[serde(default)]
    end: Option<f64>,
}

impl From<WordRecord> for Word {
    fn from(record: WordRecord) -> Self {
        Word {
            text: record.text,
            timing: timing_from_record(record.start, record.end),
        }
    }
}

impl From<Word> for WordRecord {
    fn from(word: Word) -> Self {
        WordRecord {
            text: word.text,
            start: word.timing.start(),
            end: word.timing.end(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PhraseRecord {
    text: String,
    #[serde(default)]
    start: Option<f64>,
    #[serde(default)]
    end: Option<f64>,
    #[serde(default)]
    words: Vec<Word>,
}

impl From<PhraseRecord> for Phrase {
    fn from(record: PhraseRecord) -> Self {
        Phrase {
            text: record.text,
            timing: timing_from_record(record.start, record.end),
            words: record.words,
        }
    }
}

impl From<Phrase> for PhraseRecord {
    fn from(phrase: Phrase) -> Self {
        PhraseRecord {
            text: phrase.text,
            start: phrase.timing.start(),
            end: phrase.timing.end(),
            words: phrase.words,
        }
    }
}

fn timing_from_record(start: Option<f64>, end: Option<f64>) -> Timing {
    match (start, end) {
        (Some(start), Some(end)) if start.is_finite() && end.is_finite() && start <= end => {
            Timing::span(start, end)
        }
        _ => Timing::Unresolved,
    }
}
