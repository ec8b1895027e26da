//! Line-level linking by greedy window search.
//!
//! For each lyric line, look at "skip N recognized words, take M words"
//! windows after the last claimed word and keep the best-scoring one. The
//! accepted window is handed to [`WordLinker`] for per-word timing; lines
//! without an acceptable window are interpolated afterwards.

use crate::config::AlignConfig;
use crate::error::AlignError;
use crate::interpolate::{fill_phrase, fill_phrase_gaps};
use crate::text::matcher::SequenceMatcher;
use crate::types::{Phrase, Timing, Word};

use super::word_level::WordLinker;
use super::{Linker, recognized_lead, recognized_tail};

/// Counters from one line-linking pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkReport {
    pub matched_lines: usize,
    pub missing_lines: usize,
    pub blank_lines: usize,
    /// Recognized words claimed by matched lines (skipped ones included)
    pub consumed_words: usize,
    pub total_words: usize,
}

/// Candidate window relative to the cursor.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Window {
    skip: usize,
    take: usize,
    ratio: f64,
}

#[derive(Debug, Clone, Default)]
pub struct LineLinker {
    config: AlignConfig,
    words: WordLinker,
}

impl LineLinker {
    pub fn new(config: AlignConfig) -> Self {
        Self {
            words: WordLinker::new(config.clone()),
            config,
        }
    }

    /// Link every line and report how many lines found a window.
    pub fn link_with_report(&self, full_text: &str, phrases: &[Phrase]) -> (Vec<Phrase>, LinkReport) {
        let words: Vec<&Word> = phrases.iter().flat_map(|p| p.words.iter()).collect();
        let mut report = LinkReport {
            total_words: words.len(),
            ..LinkReport::default()
        };
        let mut cursor = 0;
        let mut result = Vec::new();

        for line in full_text.lines() {
            if line.trim().is_empty() {
                report.blank_lines += 1;
                result.push(Phrase::from_line(line));
                continue;
            }

            match self.find_window(line, &words, cursor) {
                Some(window) => {
                    let from = cursor + window.skip;
                    let to = from + window.take;
                    log::debug!(
                        "'{}' <- words {}..{} (ratio {:.3}, skipped {})",
                        line,
                        from,
                        to,
                        window.ratio,
                        window.skip
                    );
                    result.push(self.refine(line, &words[from..to]));
                    cursor = to;
                    report.matched_lines += 1;
                }
                None => {
                    log::debug!("No window for '{}'", line);
                    result.push(Phrase::from_line(line));
                    report.missing_lines += 1;
                }
            }
        }
        report.consumed_words = cursor;

        fill_phrase_gaps(
            &mut result,
            recognized_lead(phrases),
            recognized_tail(phrases),
            &self.config.vowels,
        );

        log::info!(
            "Lines: {} matched, {} missing, {} blank; consumed {}/{} recognized words",
            report.matched_lines,
            report.missing_lines,
            report.blank_lines,
            report.consumed_words,
            report.total_words
        );
        (result, report)
    }

    /// Widen the skip range until a window reaches the line threshold.
    ///
    /// Each wider sweep only adds one new skip row, so the best candidate
    /// is carried over instead of re-scoring narrower rows. Ties keep the
    /// first candidate seen: lowest skip, then lowest take.
    fn find_window(&self, line: &str, words: &[&Word], cursor: usize) -> Option<Window> {
        let line: Vec<char> = line.chars().collect();
        let mut best: Option<Window> = None;
        let mut next_skip = 0;

        for max_skip in self.config.min_window..self.config.max_window {
            while next_skip < max_skip {
                self.score_row(&line, words, cursor, next_skip, &mut best);
                next_skip += 1;
            }
            if let Some(window) = best {
                if window.ratio >= self.config.min_line_ratio {
                    return Some(window);
                }
            }
            if cursor + next_skip >= words.len() {
                // Wider windows add no candidates
                break;
            }
        }
        None
    }

    fn score_row(
        &self,
        line: &[char],
        words: &[&Word],
        cursor: usize,
        skip: usize,
        best: &mut Option<Window>,
    ) {
        let base = cursor + skip;
        let mut candidate: Vec<char> = Vec::new();

        for take in 1..self.config.max_words_per_line {
            let Some(word) = words.get(base + take - 1) else {
                break;
            };
            if take > 1 {
                candidate.push(' ');
            }
            candidate.extend(word.text.trim().chars());

            if let Some(current) = best {
                // Ratio is at most 2 * min(la, lb) / (la + lb), which only
                // shrinks as the candidate grows past the line.
                let bound = 2.0 * line.len().min(candidate.len()) as f64
                    / (line.len() + candidate.len()) as f64;
                if candidate.len() >= line.len() && bound <= current.ratio {
                    break;
                }
            }

            let ratio = SequenceMatcher::new(line, &candidate).ratio();
            if best.map_or(true, |current| ratio > current.ratio) {
                *best = Some(Window { skip, take, ratio });
            }
        }
    }

    /// Word-level timing for a line inside its accepted window.
    fn refine(&self, line: &str, span: &[&Word]) -> Phrase {
        let words: Vec<Word> = span.iter().map(|w| (*w).clone()).collect();
        let text = words.iter().map(|w| w.text.trim()).collect::<Vec<_>>().join(" ");
        let recognized = Phrase::new(text, words);
        let Some((start, end)) = recognized.timing.bounds() else {
            log::warn!("Window for '{}' has no timing", line);
            return Phrase::from_line(line);
        };

        match self.words.link(line, std::slice::from_ref(&recognized)) {
            Ok(linked) => match linked.into_iter().next() {
                Some(mut phrase) => {
                    pin_edges(&mut phrase, start, end);
                    phrase
                }
                None => spread(line, start, end, &self.config),
            },
            Err(err) => {
                log::warn!("Word linking failed for '{}': {}", line, err);
                spread(line, start, end, &self.config)
            }
        }
    }
}

impl Linker for LineLinker {
    fn name(&self) -> &str {
        "line"
    }

    fn link(&self, full_text: &str, phrases: &[Phrase]) -> Result<Vec<Phrase>, AlignError> {
        Ok(self.link_with_report(full_text, phrases).0)
    }
}

/// Force the first word to start at `start` and the last to end at `end`.
fn pin_edges(phrase: &mut Phrase, start: f64, end: f64) {
    if let Some(first) = phrase.words.first_mut() {
        let first_end = first.end().unwrap_or(start).max(start);
        first.set_span(start, first_end);
    }
    if let Some(last) = phrase.words.last_mut() {
        let last_start = last.start().unwrap_or(end).min(end);
        last.set_span(last_start, end);
    }
    phrase.refresh_bounds();
}

/// The whole window spread over the line's words by vowel weight.
fn spread(line: &str, start: f64, end: f64, config: &AlignConfig) -> Phrase {
    let mut phrase = Phrase::from_line(line);
    phrase.timing = Timing::span(start, end);
    fill_phrase(&mut phrase, &config.vowels);
    phrase
}
