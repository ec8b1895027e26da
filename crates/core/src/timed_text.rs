//! Canonical lyrics held as phrases/words, addressable by flat character
//! offset.
//!
//! The flat text is every word, lower-cased, joined by single spaces in
//! document order. Word `k` owns the closed range `[start, start + len]`;
//! the following word starts at `start + len + 1`.

use crate::types::{Phrase, Word};

#[derive(Debug, Clone, Copy)]
struct Slot {
    phrase: usize,
    word: usize,
    start: usize,
    end: usize,
}

#[derive(Debug, Clone)]
pub struct TimedText {
    phrases: Vec<Phrase>,
    flat: Vec<char>,
    slots: Vec<Slot>,
}

impl TimedText {
    /// One phrase per line, every word unresolved.
    pub fn from_text(text: &str) -> Self {
        let phrases: Vec<Phrase> = text.lines().map(Phrase::from_line).collect();

        let mut flat = Vec::new();
        let mut slots = Vec::new();
        for (pi, phrase) in phrases.iter().enumerate() {
            for (wi, word) in phrase.words.iter().enumerate() {
                if !slots.is_empty() {
                    flat.push(' ');
                }
                let start = flat.len();
                flat.extend(word.text.chars().flat_map(char::to_lowercase));
                slots.push(Slot {
                    phrase: pi,
                    word: wi,
                    start,
                    end: flat.len(),
                });
            }
        }

        Self { phrases, flat, slots }
    }

    /// Lower-cased words joined by single spaces.
    pub fn flat(&self) -> &[char] {
        &self.flat
    }

    pub fn phrases(&self) -> &[Phrase] {
        &self.phrases
    }

    pub fn into_phrases(self) -> Vec<Phrase> {
        self.phrases
    }

    fn locate(&self, index: f64) -> Option<Slot> {
        // Last slot starting at or before `index`; slots are sorted and disjoint.
        let n = self.slots.partition_point(|s| s.start as f64 <= index);
        let slot = *self.slots.get(n.checked_sub(1)?)?;
        (index <= slot.end as f64).then_some(slot)
    }

    /// Word owning flat offset `index`, or `None` in a separator gap.
    pub fn word_at(&self, index: f64) -> Option<&Word> {
        let slot = self.locate(index)?;
        Some(&self.phrases[slot.phrase].words[slot.word])
    }

    /// Widen the timing of the word under the midpoint of
    /// `[flat_start, flat_end)`. Returns false when no word is there.
    pub fn write_timecode(
        &mut self,
        start_time: f64,
        end_time: f64,
        flat_start: usize,
        flat_end: usize,
    ) -> bool {
        let midpoint = (flat_start + flat_end) as f64 / 2.0;
        let Some(slot) = self.locate(midpoint) else {
            return false;
        };
        self.phrases[slot.phrase].words[slot.word].widen(start_time, end_time);
        true
    }
}
