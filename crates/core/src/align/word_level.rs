//! Word-level linking by character diff over the whole text.
//!
//! All recognized words are lower-cased and joined with a separator that
//! never matches lyric text, then diffed against the flattened lyrics.
//! Each recognized word transfers its timing to the lyric word its
//! matching blocks land on; the remaining lyric words are interpolated.

use crate::config::AlignConfig;
use crate::error::AlignError;
use crate::interpolate::{fill_word_gaps, settle_phrase_bounds};
use crate::text::matcher::{Match, SequenceMatcher, ratio};
use crate::text::normalize::{is_blank, normalize_word};
use crate::timed_text::TimedText;
use crate::types::{Phrase, Word};

use super::{Linker, recognized_lead, recognized_tail};

/// Joins recognized words in the diffed stream.
const WORD_SEPARATOR: char = '^';

/// A recognized word and its closed flat range `[start, end]` in the stream.
struct StreamWord<'p> {
    word: &'p Word,
    start: usize,
    end: usize,
}

struct RecognizedStream<'p> {
    chars: Vec<char>,
    words: Vec<StreamWord<'p>>,
}

impl<'p> RecognizedStream<'p> {
    fn new(phrases: &'p [Phrase]) -> Self {
        let mut chars = Vec::new();
        let mut words = Vec::new();
        for word in phrases.iter().flat_map(|p| p.words.iter()) {
            if !words.is_empty() {
                chars.push(WORD_SEPARATOR);
            }
            let start = chars.len();
            chars.extend(word.text.trim().chars().flat_map(char::to_lowercase));
            words.push(StreamWord {
                word,
                start,
                end: chars.len(),
            });
        }
        Self { chars, words }
    }
}

fn intersects(a: (usize, usize), b: (usize, usize)) -> bool {
    a.0.max(b.0) <= a.1.min(b.1)
}

/// Links lyrics to recognized words through one whole-text diff.
#[derive(Debug, Clone, Default)]
pub struct WordLinker {
    config: AlignConfig,
}

impl WordLinker {
    pub fn new(config: AlignConfig) -> Self {
        Self { config }
    }

    /// Transfer one recognized word's timing onto the lyrics.
    ///
    /// Returns true if a lyric word received the timing.
    fn link_word(
        &self,
        storage: &mut TimedText,
        canonical: &[char],
        blocks: &[Match],
        entry: &StreamWord<'_>,
    ) -> bool {
        let Some((start_time, end_time)) = entry.word.timing.bounds() else {
            return false;
        };
        let needle = normalize_word(&entry.word.text);
        if needle.is_empty() {
            return false;
        }

        let hits: Vec<&Match> = blocks
            .iter()
            .filter(|m| {
                intersects((entry.start, entry.end), (m.b, m.b + m.size))
                    && !is_blank(&canonical[m.a..m.a + m.size])
            })
            .collect();
        let Some(first) = hits.first().copied() else {
            return false;
        };

        let mut full_match = false;
        for m in &hits {
            let fragment: String = canonical[m.a..m.a + m.size].iter().collect();
            if normalize_word(&fragment) == needle {
                full_match = true;
                storage.write_timecode(start_time, end_time, m.a, m.a + m.size);
            }
        }
        if full_match {
            return true;
        }

        let midpoint = first.a as f64 + first.size as f64 / 2.0;
        let Some(original) = storage.word_at(midpoint) else {
            return false;
        };
        let by_ratio = self.config.match_words_linking
            && ratio(&normalize_word(&original.text), &needle) >= self.config.min_word_ratio;
        let by_vowels = self.config.vowel_linking && self.vowels_agree(&original.text, &entry.word.text);
        if !(by_ratio || by_vowels) {
            log::trace!("No link for '{}' near '{}'", entry.word.text, original.text);
            return false;
        }

        storage.write_timecode(start_time, end_time, first.a, first.a + first.size)
    }

    fn vowels_agree(&self, original: &str, recognized: &str) -> bool {
        let vowels = &self.config.vowels;
        let count = vowels.count(recognized);
        count == vowels.count(original) && count >= self.config.min_vowels_for_match
    }
}

impl Linker for WordLinker {
    fn name(&self) -> &str {
        "word"
    }

    fn link(&self, full_text: &str, phrases: &[Phrase]) -> Result<Vec<Phrase>, AlignError> {
        let mut storage = TimedText::from_text(full_text);
        let canonical = storage.flat().to_vec();
        let stream = RecognizedStream::new(phrases);

        let matcher = SequenceMatcher::new(&canonical, &stream.chars);
        let text_ratio = matcher.ratio();
        log::debug!(
            "Text ratio {:.3} ({} lyric chars, {} recognized chars)",
            text_ratio,
            canonical.len(),
            stream.chars.len()
        );
        if text_ratio < self.config.min_text_ratio {
            return Err(AlignError::mismatch(text_ratio, self.config.min_text_ratio));
        }

        let blocks = matcher.matching_blocks();
        let linked = stream
            .words
            .iter()
            .filter(|entry| self.link_word(&mut storage, &canonical, blocks, entry))
            .count();

        let lead = recognized_lead(phrases);
        let tail = recognized_tail(phrases);
        let mut result = storage.into_phrases();

        let mut words: Vec<&mut Word> = result.iter_mut().flat_map(|p| p.words.iter_mut()).collect();
        let evidence = words.iter().filter(|w| w.is_resolved()).count();
        let total = words.len();
        fill_word_gaps(&mut words, lead, tail, &self.config.vowels);
        settle_phrase_bounds(&mut result, lead);

        log::debug!(
            "Linked {}/{} recognized words, {}/{} lyric words from evidence",
            linked,
            stream.words.len(),
            evidence,
            total
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Timing;

    fn phrase(words: &[(&str, f64, f64)]) -> Phrase {
        let words: Vec<Word> = words.iter().map(|&(t, s, e)| Word::new(t, s, e)).collect();
        let text = words.iter().map(|w| w.text.trim()).collect::<Vec<_>>().join(" ");
        Phrase::new(text, words)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_stream_offsets() {
        let phrases = vec![phrase(&[(" Hello", 0.0, 0.5)]), phrase(&[("World", 0.5, 1.0)])];
        let stream = RecognizedStream::new(&phrases);
        let text: String = stream.chars.iter().collect();
        assert_eq!(text, "hello^world");
        assert_eq!((stream.words[0].start, stream.words[0].end), (0, 5));
        assert_eq!((stream.words[1].start, stream.words[1].end), (6, 11));
    }

    #[test]
    fn test_intersects_closed() {
        assert!(intersects((0, 5), (5, 8)));
        assert!(intersects((2, 3), (0, 10)));
        assert!(!intersects((0, 5), (6, 8)));
    }

    #[test]
    fn test_exact_match() {
        let linker = WordLinker::default();
        let recognized = vec![phrase(&[("hello", 0.0, 0.5), ("world", 0.5, 1.0)])];
        let result = linker.link("hello world", &recognized).unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].timing, Timing::span(0.0, 1.0));
        assert_eq!(result[0].words[0].timing, Timing::span(0.0, 0.5));
        assert_eq!(result[0].words[1].timing, Timing::span(0.5, 1.0));
    }

    #[test]
    fn test_near_miss_words_use_secondary_ratio() {
        let linker = WordLinker::default();
        let recognized = vec![phrase(&[("halo", 0.0, 0.5), ("wurld", 0.5, 1.0)])];
        let result = linker.link("hello world", &recognized).unwrap();

        assert_eq!(result[0].words[0].text, "hello");
        assert_eq!(result[0].words[0].timing, Timing::span(0.0, 0.5));
        assert_eq!(result[0].words[1].text, "world");
        assert_eq!(result[0].words[1].timing, Timing::span(0.5, 1.0));
    }

    #[test]
    fn test_gibberish_is_mismatch() {
        let linker = WordLinker::default();
        let recognized = vec![phrase(&[("kkk", 0.0, 0.5), ("mmm", 0.5, 1.0), ("ppp", 1.0, 1.5)])];
        let err = linker.link("foo bar\nbaz qux", &recognized).unwrap_err();
        assert!(matches!(err, AlignError::RecognitionMismatch { .. }));
    }

    #[test]
    fn test_text_gate_is_inclusive() {
        let recognized = vec![phrase(&[("halo", 0.0, 0.5), ("wurld", 0.5, 1.0)])];
        let exact = 14.0 / 21.0;

        let at_gate = WordLinker::new(AlignConfig {
            min_text_ratio: exact,
            ..AlignConfig::default()
        });
        assert!(at_gate.link("hello world", &recognized).is_ok());

        let above_gate = WordLinker::new(AlignConfig {
            min_text_ratio: exact + 1e-9,
            ..AlignConfig::default()
        });
        assert!(above_gate.link("hello world", &recognized).is_err());
    }

    #[test]
    fn test_word_gate_is_inclusive() {
        // "abcde" vs "abcxy" scores exactly 0.6
        let recognized = vec![Phrase {
            text: "abcxy fghij".into(),
            timing: Timing::span(0.0, 3.0),
            words: vec![Word::new("abcxy", 1.0, 2.0), Word::new("fghij", 2.0, 3.0)],
        }];

        let result = WordLinker::default().link("abcde fghij", &recognized).unwrap();
        assert_eq!(result[0].words[0].timing, Timing::span(1.0, 2.0));

        let strict = WordLinker::new(AlignConfig {
            min_word_ratio: 0.61,
            ..AlignConfig::default()
        });
        let result = strict.link("abcde fghij", &recognized).unwrap();
        // Not linked: interpolated from the phrase start instead
        assert_eq!(result[0].words[0].timing, Timing::span(0.0, 2.0));
    }

    #[test]
    fn test_vowel_linking() {
        // "tomato" vs "potato": no secondary ratio match at 0.9, same vowel count
        let recognized = vec![Phrase {
            text: "potato end".into(),
            timing: Timing::span(0.0, 3.0),
            words: vec![Word::new("potato", 1.0, 2.0), Word::new("end", 2.0, 3.0)],
        }];
        let base = AlignConfig {
            min_word_ratio: 0.9,
            ..AlignConfig::default()
        };

        let result = WordLinker::new(base.clone()).link("tomato end", &recognized).unwrap();
        assert_eq!(result[0].words[0].timing, Timing::span(0.0, 2.0));

        let with_vowels = WordLinker::new(AlignConfig {
            vowel_linking: true,
            ..base
        });
        let result = with_vowels.link("tomato end", &recognized).unwrap();
        assert_eq!(result[0].words[0].timing, Timing::span(1.0, 2.0));
    }

    #[test]
    fn test_exact_transcription_roundtrip() {
        let linker = WordLinker::default();
        let recognized = vec![
            phrase(&[(" Hello,", 0.0, 0.4), (" World", 0.4, 1.0)]),
            phrase(&[("foo", 1.5, 1.8), ("bar", 1.8, 2.1), ("baz", 2.1, 2.6)]),
        ];
        let result = linker.link("Hello, World\nFoo bar baz", &recognized).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].text, "Hello, World");
        assert_eq!(result[0].words[0].text, "Hello,");
        let got: Vec<Timing> = result.iter().flat_map(|p| p.words.iter().map(|w| w.timing)).collect();
        let expected: Vec<Timing> = recognized
            .iter()
            .flat_map(|p| p.words.iter().map(|w| w.timing))
            .collect();
        assert_eq!(got, expected);
        assert_eq!(result[1].timing, Timing::span(1.5, 2.6));
    }

    #[test]
    fn test_missing_words_are_interpolated() {
        let linker = WordLinker::default();
        let recognized = vec![phrase(&[("one", 0.0, 1.0), ("four", 3.0, 4.0)])];
        let result = linker.link("one two three four", &recognized).unwrap();
        let words = &result[0].words;

        // "two" weighs 1, "three" weighs 2 over [1, 3]
        let (s, e) = words[1].timing.bounds().unwrap();
        assert!(approx(s, 1.0) && approx(e, 1.0 + 2.0 / 3.0));
        let (s, e) = words[2].timing.bounds().unwrap();
        assert!(approx(s, 1.0 + 2.0 / 3.0) && approx(e, 3.0));
        assert_eq!(words[3].timing, Timing::span(3.0, 4.0));
    }

    #[test]
    fn test_trailing_words_fill_to_recognized_end() {
        let linker = WordLinker::default();
        let recognized = vec![phrase(&[("sing", 0.0, 1.0), ("mmm", 1.0, 3.0)])];
        let result = linker.link("sing along", &recognized).unwrap();
        assert_eq!(result[0].words[0].timing, Timing::span(0.0, 1.0));
        assert_eq!(result[0].words[1].timing, Timing::span(1.0, 3.0));
    }

    #[test]
    fn test_blank_lines_get_zero_length_phrase() {
        let linker = WordLinker::default();
        let recognized = vec![phrase(&[("hello", 0.0, 1.0), ("world", 2.0, 3.0)])];
        let result = linker.link("hello\n\nworld", &recognized).unwrap();

        assert_eq!(result.len(), 3);
        assert!(result[1].words.is_empty());
        assert_eq!(result[1].timing, Timing::span(1.0, 1.0));
        assert_eq!(result[2].timing, Timing::span(2.0, 3.0));
    }

    #[test]
    fn test_full_coverage() {
        let linker = WordLinker::default();
        let recognized = vec![
            phrase(&[("i", 0.0, 0.2), ("walk", 0.2, 0.6), ("alone", 0.6, 1.2)]),
            phrase(&[("on", 2.0, 2.2), ("the", 2.2, 2.3), ("street", 2.3, 2.9)]),
        ];
        let result = linker
            .link("I walked alone\nunder the lonely street\nyeah", &recognized)
            .unwrap();

        assert_eq!(result.len(), 3);
        for p in &result {
            assert!(p.is_fully_resolved(), "unresolved phrase: {:?}", p);
            for w in &p.words {
                let (s, e) = w.timing.bounds().unwrap();
                assert!(s.is_finite() && s <= e, "bad word timing: {:?}", w);
            }
        }
    }
}
