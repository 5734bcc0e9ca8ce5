//! Reports returned by successful operations.

use serde::Serialize;
use std::fmt;

/// How the content replacer found its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// `old_str` occurred exactly once as a literal substring.
    ExactSubstring,
    /// The literal search failed; the target was located line by line around
    /// the hinted position.
    LineAnchored,
}

/// Outcome of a successful [`replace_by_content`](crate::replace_by_content).
#[derive(Debug, Clone, Serialize)]
pub struct ContentReport {
    /// 1-indexed first line of the replacement.
    pub line: usize,
    /// Logical lines removed.
    pub lines_removed: usize,
    /// Logical lines inserted.
    pub lines_inserted: usize,
    pub strategy: MatchStrategy,
}

impl fmt::Display for ContentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Replaced at LN-{}, deleted {} lines, inserted {} lines",
            self.line, self.lines_removed, self.lines_inserted
        )?;
        if self.strategy == MatchStrategy::LineAnchored {
            write!(f, " (line-anchored)")?;
        }
        Ok(())
    }
}

/// A 1-indexed, inclusive span of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineSpan {
    pub start: usize,
    pub end: usize,
}

impl LineSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of lines covered.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start) + 1
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

impl fmt::Display for LineSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LN{}~{}", self.start, self.end)
    }
}

/// Outcome of a successful [`replace_by_range`](crate::replace_by_range).
#[derive(Debug, Clone, Serialize)]
pub struct RangeReport {
    /// The span the instruction asked for, with a resolved end line.
    pub requested: LineSpan,
    /// The span actually replaced after marker validation.
    pub actual: LineSpan,
    /// Whether drift search moved either boundary.
    pub drift_adjusted: bool,
}

impl RangeReport {
    /// Number of lines replaced.
    pub fn replaced_lines(&self) -> usize {
        self.actual.len()
    }
}

impl fmt::Display for RangeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.drift_adjusted {
            write!(
                f,
                "Replaced {} lines {} (adjusted from requested {})",
                self.replaced_lines(),
                self.actual,
                self.requested
            )
        } else {
            write!(f, "Replaced {} lines {}", self.replaced_lines(), self.actual)
        }
    }
}
