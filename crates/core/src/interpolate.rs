//! Weight-proportional distribution of time spans.
//!
//! Words (and phrases) without timing evidence share the gap between their
//! timed neighbours in proportion to their vowel weight, assuming sung
//! duration roughly follows the number of vowels.

use crate::config::VowelSet;
use crate::types::{Phrase, Timing, Word};

/// Split `[start, end]` into consecutive sub-intervals sized by `weights`.
///
/// Neighbouring items share their boundary exactly and the run closes
/// exactly at `end`. An inverted span is treated as zero-length at `start`.
/// When all weights are zero every item gets a zero-length interval at
/// `start`.
pub fn split_span(start: f64, end: f64, weights: &[f64]) -> Vec<(f64, f64)> {
    let stop = end.max(start);
    let duration = stop - start;
    let total: f64 = weights.iter().sum();

    let mut current = start;
    let mut seen = 0.0;
    weights
        .iter()
        .map(|&w| {
            seen += w;
            let next = if seen >= total {
                stop
            } else {
                (start + duration * seen / total).min(stop)
            };
            let item = (current, next);
            current = next;
            item
        })
        .collect()
}

/// Sum of word weights; wordless phrases weigh nothing.
pub fn phrase_weight(phrase: &Phrase, vowels: &VowelSet) -> f64 {
    phrase.words.iter().map(|w| vowels.weight(&w.text)).sum()
}

/// Spread `[start, end]` over `words` by vowel weight.
pub fn fill_words(words: &mut [&mut Word], start: f64, end: f64, vowels: &VowelSet) {
    let weights: Vec<f64> = words.iter().map(|w| vowels.weight(&w.text)).collect();
    for (word, (s, e)) in words.iter_mut().zip(split_span(start, end, &weights)) {
        word.set_span(s, e);
    }
}

/// Give every word of a timed phrase its share of the phrase span.
pub fn fill_phrase(phrase: &mut Phrase, vowels: &VowelSet) {
    let Some((start, end)) = phrase.timing.bounds() else {
        return;
    };
    let mut words: Vec<&mut Word> = phrase.words.iter_mut().collect();
    fill_words(&mut words, start, end, vowels);
}

/// Fill every run of unresolved words from its timed neighbours.
///
/// A leading run starts at `lead`; a trailing run ends at `tail`, or at the
/// last known end if that is later. Resolved words are never touched, so a
/// fully timed sequence passes through unchanged.
pub fn fill_word_gaps(words: &mut [&mut Word], lead: f64, tail: f64, vowels: &VowelSet) {
    let mut last_end = lead;
    let mut run_start: Option<usize> = None;

    for i in 0..words.len() {
        let Some((start, end)) = words[i].timing.bounds() else {
            run_start.get_or_insert(i);
            continue;
        };
        if let Some(first) = run_start.take() {
            fill_words(&mut words[first..i], last_end, start, vowels);
        }
        last_end = end;
    }

    if let Some(first) = run_start {
        fill_words(&mut words[first..], last_end, tail.max(last_end), vowels);
    }
}

/// Fill every run of unresolved phrases, then the words inside them.
///
/// Phrase shares follow [`phrase_weight`]; boundaries follow the same rules
/// as [`fill_word_gaps`].
pub fn fill_phrase_gaps(phrases: &mut [Phrase], lead: f64, tail: f64, vowels: &VowelSet) {
    let mut last_end = lead;
    let mut run_start: Option<usize> = None;

    for i in 0..phrases.len() {
        let Some((start, end)) = phrases[i].timing.bounds() else {
            run_start.get_or_insert(i);
            continue;
        };
        if let Some(first) = run_start.take() {
            split_phrases(&mut phrases[first..i], last_end, start, vowels);
        }
        last_end = end;
    }

    if let Some(first) = run_start {
        split_phrases(&mut phrases[first..], last_end, tail.max(last_end), vowels);
    }
}

fn split_phrases(phrases: &mut [Phrase], start: f64, end: f64, vowels: &VowelSet) {
    let weights: Vec<f64> = phrases.iter().map(|p| phrase_weight(p, vowels)).collect();
    for (phrase, (s, e)) in phrases.iter_mut().zip(split_span(start, end, &weights)) {
        phrase.timing = Timing::span(s, e);
        fill_phrase(phrase, vowels);
        phrase.refresh_bounds();
    }
}

/// Recompute phrase spans from their words; wordless phrases get a
/// zero-length span at the end of the phrase before them (or at `lead`).
pub fn settle_phrase_bounds(phrases: &mut [Phrase], lead: f64) {
    let mut cursor = lead;
    for phrase in phrases.iter_mut() {
        if phrase.words.is_empty() {
            phrase.timing = Timing::span(cursor, cursor);
        } else {
            phrase.refresh_bounds();
        }
        if let Some(end) = phrase.end() {
            cursor = end;
        }
    }
}
