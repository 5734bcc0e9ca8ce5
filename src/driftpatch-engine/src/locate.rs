//! Multi-line equality and bounded locate scans.
//!
//! These are the primitives both replacers lean on when a caller-supplied
//! line number no longer points at the text it describes. Scans are single
//! pass and linear time: a partial run that mismatches resets and resumes at
//! the next source line, never from the middle of itself. That can miss a
//! valid match whose prefix overlaps a decoy line inside the window; the
//! bounded window keeps the cost of that tradeoff small.

/// Bounds on how many lines before and after a hinted position may be
/// searched when the hinted position does not match exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanWindow {
    /// Lines searched before the hinted position.
    pub backward: usize,
    /// Lines searched after the hinted position.
    pub forward: usize,
}

impl ScanWindow {
    pub fn new(backward: usize, forward: usize) -> Self {
        Self { backward, forward }
    }
}

impl Default for ScanWindow {
    fn default() -> Self {
        Self {
            backward: 10,
            forward: 15,
        }
    }
}

/// True iff every line of `pattern` equals, character for character, the
/// source line at `start + offset`. False, not an error, when `start` is
/// past the end or the pattern would run past the end.
pub fn lines_equal_at(source: &[String], start: usize, pattern: &[String]) -> bool {
    if start >= source.len() || start + pattern.len() > source.len() {
        return false;
    }
    pattern
        .iter()
        .zip(&source[start..])
        .all(|(expected, actual)| expected == actual)
}

/// Scan forward from `from` for a contiguous run equal to `pattern`.
///
/// At most `window` source lines are visited; the run must complete before
/// the window closes. On a mismatch the partial run is discarded and
/// matching resumes at the next source line. Returns the index of the run's
/// first line.
pub fn locate_forward(
    pattern: &[String],
    source: &[String],
    from: usize,
    window: usize,
) -> Option<usize> {
    if pattern.is_empty() {
        return None;
    }
    let end = from.saturating_add(window).min(source.len());
    let mut run_start = None;
    let mut matched = 0;
    for i in from..end {
        if source[i] == pattern[matched] {
            if run_start.is_none() {
                run_start = Some(i);
            }
            matched += 1;
            if matched == pattern.len() {
                return run_start;
            }
        } else {
            run_start = None;
            matched = 0;
        }
    }
    None
}

/// Scan backward from `from` for a contiguous run equal to `pattern`,
/// matching the pattern's last line first.
///
/// Visits at most `window` lines before `from` (inclusive of `from`), with
/// the same reset-on-mismatch policy as [`locate_forward`]. Returns the
/// index of the pattern's first line.
pub fn locate_backward(
    pattern: &[String],
    source: &[String],
    from: usize,
    window: usize,
) -> Option<usize> {
    if pattern.is_empty() || source.is_empty() {
        return None;
    }
    let from = from.min(source.len() - 1);
    let lowest = from.saturating_sub(window);
    let mut run_start = None;
    let mut matched = 0;
    let mut i = from;
    loop {
        if source[i] == pattern[pattern.len() - 1 - matched] {
            matched += 1;
            run_start = Some(i);
            if matched == pattern.len() {
                return run_start;
            }
        } else {
            run_start = None;
            matched = 0;
        }
        if i == lowest {
            return None;
        }
        i -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn equal_at_matches_exact_run() {
        let source = doc(&["a", "b", "c", "d"]);
        let pattern = doc(&["b", "c"]);
        assert!(lines_equal_at(&source, 1, &pattern));
        assert!(!lines_equal_at(&source, 0, &pattern));
    }

    #[test]
    fn equal_at_is_false_past_the_end() {
        let source = doc(&["a", "b"]);
        let pattern = doc(&["b", "c"]);
        assert!(!lines_equal_at(&source, 1, &pattern));
        assert!(!lines_equal_at(&source, 5, &pattern));
    }

    #[test]
    fn equal_at_empty_pattern_is_trivially_true_in_bounds() {
        let source = doc(&["a"]);
        assert!(lines_equal_at(&source, 0, &[]));
        assert!(!lines_equal_at(&source, 1, &[]));
    }

    #[test]
    fn forward_finds_first_run() {
        let source = doc(&["x", "a", "b", "a", "b"]);
        let pattern = doc(&["a", "b"]);
        assert_eq!(locate_forward(&pattern, &source, 0, 10), Some(1));
    }

    #[test]
    fn forward_respects_window() {
        let source = doc(&["x", "x", "x", "a", "b"]);
        let pattern = doc(&["a", "b"]);
        assert_eq!(locate_forward(&pattern, &source, 0, 3), None);
        // Run must complete inside the window, not merely begin there.
        assert_eq!(locate_forward(&pattern, &source, 0, 4), None);
        assert_eq!(locate_forward(&pattern, &source, 0, 5), Some(3));
    }

    #[test]
    fn forward_resets_on_mismatch_without_backtracking() {
        // The decoy "a" at index 1 starts a run that dies at index 2; the
        // scan resumes at index 3 and still finds the real run.
        let source = doc(&["x", "a", "z", "a", "b"]);
        let pattern = doc(&["a", "b"]);
        assert_eq!(locate_forward(&pattern, &source, 0, 10), Some(3));
    }

    #[test]
    fn forward_mismatched_line_is_not_retried_as_run_start() {
        // After the run ["a", "b"] dies on "a" at index 2, that same "a" is
        // not reconsidered as a new run start; the accepted miss.
        let source = doc(&["a", "b", "a", "b", "c"]);
        let pattern = doc(&["a", "b", "c"]);
        assert_eq!(locate_forward(&pattern, &source, 0, 10), None);
    }

    #[test]
    fn backward_finds_run_and_returns_first_line() {
        let source = doc(&["a", "b", "c", "d", "e"]);
        let pattern = doc(&["b", "c"]);
        assert_eq!(locate_backward(&pattern, &source, 4, 10), Some(1));
    }

    #[test]
    fn backward_respects_window() {
        let source = doc(&["a", "b", "x", "x", "x"]);
        let pattern = doc(&["a", "b"]);
        assert_eq!(locate_backward(&pattern, &source, 4, 2), None);
        assert_eq!(locate_backward(&pattern, &source, 4, 4), Some(0));
    }

    #[test]
    fn backward_includes_the_from_line() {
        let source = doc(&["x", "target"]);
        let pattern = doc(&["target"]);
        assert_eq!(locate_backward(&pattern, &source, 1, 0), Some(1));
    }

    #[test]
    fn backward_clamps_out_of_range_start() {
        let source = doc(&["a", "b"]);
        let pattern = doc(&["b"]);
        assert_eq!(locate_backward(&pattern, &source, 99, 5), Some(1));
    }

    #[test]
    fn empty_inputs_locate_nothing() {
        let source = doc(&["a"]);
        assert_eq!(locate_forward(&[], &source, 0, 10), None);
        assert_eq!(locate_backward(&[], &source, 0, 10), None);
        assert_eq!(locate_backward(&source, &[], 0, 10), None);
    }
}
