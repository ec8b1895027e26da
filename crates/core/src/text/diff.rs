//! Human-readable diff between lyrics and recognized text.

use super::matcher::{OpCode, SequenceMatcher};

/// Render the edit script from `expected` to `actual`.
///
/// Removed text is wrapped in `[-...-]`, added text in `{+...+}`.
pub fn render_diff(expected: &str, actual: &str) -> String {
    let a: Vec<char> = expected.chars().collect();
    let b: Vec<char> = actual.chars().collect();
    let matcher = SequenceMatcher::new(&a, &b);

    let slice = |chars: &[char], (lo, hi): (usize, usize)| chars[lo..hi].iter().collect::<String>();

    let mut out = String::new();
    for op in matcher.opcodes() {
        match op {
            OpCode::Equal { a: ra, .. } => out.push_str(&slice(&a, ra)),
            OpCode::Replace { a: ra, b: rb } => {
                out.push_str(&format!("[-{}-]{{+{}+}}", slice(&a, ra), slice(&b, rb)));
            }
            OpCode::Delete { a: ra, .. } => out.push_str(&format!("[-{}-]", slice(&a, ra))),
            OpCode::Insert { b: rb, .. } => out.push_str(&format!("{{+{}+}}", slice(&b, rb))),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_identical() {
        assert_eq!(render_diff("same", "same"), "same");
    }

    #[test]
    fn test_render_edits() {
        assert_eq!(render_diff("qabxcd", "abycdf"), "[-q-]ab[-x-]{+y+}cd{+f+}");
    }
}
