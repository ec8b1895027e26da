//! Ratcliff/Obershelp sequence matching over characters.
//!
//! Every element takes part in matching: there is no junk filter and no
//! popularity pruning, so frequent short tokens ("a", "i", spaces) still
//! anchor blocks.

use std::cell::OnceCell;
use std::collections::HashMap;

/// A common block: `a[a..a + size] == b[b..b + size]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub a: usize,
    pub b: usize,
    pub size: usize,
}

/// Edit operation between two sequences, in `a`/`b` index ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCode {
    Equal { a: (usize, usize), b: (usize, usize) },
    Replace { a: (usize, usize), b: (usize, usize) },
    Delete { a: (usize, usize), b: (usize, usize) },
    Insert { a: (usize, usize), b: (usize, usize) },
}

pub struct SequenceMatcher<'s> {
    a: &'s [char],
    b: &'s [char],
    b2j: HashMap<char, Vec<usize>>,
    blocks: OnceCell<Vec<Match>>,
}

impl<'s> SequenceMatcher<'s> {
    pub fn new(a: &'s [char], b: &'s [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, &c) in b.iter().enumerate() {
            b2j.entry(c).or_default().push(j);
        }
        Self {
            a,
            b,
            b2j,
            blocks: OnceCell::new(),
        }
    }

    /// Longest block within `a[alo..ahi]` and `b[blo..bhi]`.
    ///
    /// Among equally long blocks the one starting earliest in `a` wins,
    /// then the one starting earliest in `b`.
    pub fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> Match {
        let mut best = Match { a: alo, b: blo, size: 0 };
        // j2len[j] = length of the block ending at a[i - 1], b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next.insert(j, k);
                    if k > best.size {
                        best = Match {
                            a: i + 1 - k,
                            b: j + 1 - k,
                            size: k,
                        };
                    }
                }
            }
            j2len = next;
        }
        best
    }

    /// Non-overlapping common blocks in increasing order, adjacent blocks
    /// merged.
    pub fn matching_blocks(&self) -> &[Match] {
        self.blocks.get_or_init(|| self.compute_blocks())
    }

    fn compute_blocks(&self) -> Vec<Match> {
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        let mut found = Vec::new();
        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let m = self.find_longest_match(alo, ahi, blo, bhi);
            if m.size == 0 {
                continue;
            }
            if alo < m.a && blo < m.b {
                queue.push((alo, m.a, blo, m.b));
            }
            if m.a + m.size < ahi && m.b + m.size < bhi {
                queue.push((m.a + m.size, ahi, m.b + m.size, bhi));
            }
            found.push(m);
        }
        found.sort_by_key(|m| (m.a, m.b));

        let mut merged: Vec<Match> = Vec::with_capacity(found.len());
        for m in found {
            match merged.last_mut() {
                Some(last) if last.a + last.size == m.a && last.b + last.size == m.b => {
                    last.size += m.size;
                }
                _ => merged.push(m),
            }
        }
        merged
    }

    /// Similarity in `[0, 1]`: twice the matched length over the total length.
    pub fn ratio(&self) -> f64 {
        let total = self.a.len() + self.b.len();
        if total == 0 {
            return 1.0;
        }
        let matched: usize = self.matching_blocks().iter().map(|m| m.size).sum();
        2.0 * matched as f64 / total as f64
    }

    /// Edit script turning `a` into `b`.
    pub fn opcodes(&self) -> Vec<OpCode> {
        let mut ops = Vec::new();
        let (mut i, mut j) = (0, 0);
        let terminator = Match {
            a: self.a.len(),
            b: self.b.len(),
            size: 0,
        };
        for m in self.matching_blocks().iter().copied().chain(std::iter::once(terminator)) {
            let a = (i, m.a);
            let b = (j, m.b);
            match (i < m.a, j < m.b) {
                (true, true) => ops.push(OpCode::Replace { a, b }),
                (true, false) => ops.push(OpCode::Delete { a, b }),
                (false, true) => ops.push(OpCode::Insert { a, b }),
                (false, false) => {}
            }
            if m.size > 0 {
                ops.push(OpCode::Equal {
                    a: (m.a, m.a + m.size),
                    b: (m.b, m.b + m.size),
                });
            }
            i = m.a + m.size;
            j = m.b + m.size;
        }
        ops
    }
}

/// Similarity ratio of two strings.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    SequenceMatcher::new(&a, &b).ratio()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_longest_match_prefers_earliest() {
        let a = chars(" abcd");
        let b = chars("abcd abcd");
        let m = SequenceMatcher::new(&a, &b).find_longest_match(0, 5, 0, 9);
        assert_eq!(m, Match { a: 0, b: 4, size: 5 });
    }

    #[test]
    fn test_matching_blocks() {
        let a = chars("abxcd");
        let b = chars("abcd");
        let sm = SequenceMatcher::new(&a, &b);
        assert_eq!(
            sm.matching_blocks(),
            &[Match { a: 0, b: 0, size: 2 }, Match { a: 3, b: 2, size: 2 }]
        );
    }

    #[test]
    fn test_near_miss_blocks() {
        let a = chars("hello world");
        let b = chars("halo^wurld");
        let sm = SequenceMatcher::new(&a, &b);
        assert_eq!(
            sm.matching_blocks(),
            &[
                Match { a: 0, b: 0, size: 1 },
                Match { a: 3, b: 2, size: 2 },
                Match { a: 6, b: 5, size: 1 },
                Match { a: 8, b: 7, size: 3 },
            ]
        );
        assert!((sm.ratio() - 14.0 / 21.0).abs() < 1e-9);
    }

    #[test]
    fn test_ratio_identical_and_empty() {
        assert!((ratio("same text", "same text") - 1.0).abs() < f64::EPSILON);
        assert!((ratio("", "") - 1.0).abs() < f64::EPSILON);
        assert!(ratio("abc", "").abs() < f64::EPSILON);
        assert!(ratio("abc", "xyz").abs() < f64::EPSILON);
    }

    #[test]
    fn test_ratio_values() {
        assert!((ratio("hello", "halo") - 6.0 / 9.0).abs() < 1e-9);
        assert!((ratio("world", "wurld") - 0.8).abs() < 1e-9);
        assert!((ratio("one two three", "one two garbage three") - 26.0 / 34.0).abs() < 1e-9);
    }

    #[test]
    fn test_opcodes() {
        let a = chars("qabxcd");
        let b = chars("abycdf");
        let ops = SequenceMatcher::new(&a, &b).opcodes();
        assert_eq!(
            ops,
            vec![
                OpCode::Delete { a: (0, 1), b: (0, 0) },
                OpCode::Equal { a: (1, 3), b: (0, 2) },
                OpCode::Replace { a: (3, 4), b: (2, 3) },
                OpCode::Equal { a: (4, 6), b: (3, 5) },
                OpCode::Insert { a: (6, 6), b: (5, 6) },
            ]
        );
    }
}
