//! Content-addressed replacement with a line-anchored fallback.
//!
//! The fast path treats `old_str` as a literal substring of the whole
//! document and requires it to be unique. When the literal search comes up
//! empty (usually because the instruction was generated against a slightly
//! older revision), the fallback re-locates the target line by line around
//! the hinted position.

use crate::backup::BackupSlot;
use crate::error::{EditError, EditResult};
use crate::lines::{line_number_at, normalize_newlines, split_for_matching, split_lines};
use crate::locate::ScanWindow;
use crate::report::{ContentReport, MatchStrategy};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// A content-form edit request: replace `old_str` with `new_str`, expected
/// near `hint_line`.
#[derive(Debug, Clone)]
pub struct ContentEdit {
    /// Text expected to currently exist in the file, possibly multi-line.
    pub old_str: String,
    /// Replacement text.
    pub new_str: String,
    /// 1-indexed line the caller expects the match near; 0 means no hint.
    pub hint_line: usize,
    pub window: ScanWindow,
}

impl ContentEdit {
    pub fn new(old_str: impl Into<String>, new_str: impl Into<String>) -> Self {
        Self {
            old_str: old_str.into(),
            new_str: new_str.into(),
            hint_line: 0,
            window: ScanWindow::default(),
        }
    }

    pub fn near_line(mut self, hint_line: usize) -> Self {
        self.hint_line = hint_line;
        self
    }

    pub fn with_window(mut self, window: ScanWindow) -> Self {
        self.window = window;
        self
    }
}

/// Replace `old_str` with `new_str` in `path`.
///
/// Line endings in the file content and `old_str` are normalized before the
/// search; `new_str` is written as given. A unique literal occurrence is
/// replaced directly; zero occurrences fall back to the line-anchored
/// replacer; two or more fail [`EditError::AmbiguousMatch`] without touching
/// the file. The pre-edit file is captured into `slot` before any write.
pub fn replace_by_content(
    path: &Path,
    edit: &ContentEdit,
    slot: &BackupSlot,
) -> EditResult<ContentReport> {
    if !path.exists() {
        return Err(EditError::file_not_found(path));
    }
    let raw = fs::read_to_string(path).map_err(|e| EditError::read(path, e))?;
    let content = normalize_newlines(&raw);
    let old = normalize_newlines(&edit.old_str);

    match content.find(old.as_str()) {
        Some(index) => {
            let occurrences = content.matches(old.as_str()).count();
            if occurrences > 1 {
                warn!(
                    path = %path.display(),
                    occurrences,
                    "old_str is not unique; refusing to guess"
                );
                return Err(EditError::AmbiguousMatch {
                    path: path.to_path_buf(),
                    occurrences,
                });
            }

            let line = line_number_at(&content, index);
            let lines_removed = split_lines(&old).len();
            let lines_inserted = split_lines(&edit.new_str).len();
            let updated = content.replacen(old.as_str(), &edit.new_str, 1);

            slot.capture(path)?;
            fs::write(path, updated).map_err(|e| EditError::write(path, e))?;
            debug!(path = %path.display(), line, "replaced unique literal occurrence");

            Ok(ContentReport {
                line,
                lines_removed,
                lines_inserted,
                strategy: MatchStrategy::ExactSubstring,
            })
        }
        None => replace_anchored(path, &content, &old, edit, slot),
    }
}

/// Fallback: locate the pattern line by line around the hint and rewrite the
/// spanned lines.
fn replace_anchored(
    path: &Path,
    content: &str,
    old: &str,
    edit: &ContentEdit,
    slot: &BackupSlot,
) -> EditResult<ContentReport> {
    let pattern = split_for_matching(path, old);
    let replacement = split_for_matching(path, &edit.new_str);
    let document = split_lines(content);

    let Some(first) = pattern.first() else {
        // An empty old_str never reaches here; the literal search matches it.
        return Err(EditError::AnchorNotFound {
            hint: edit.hint_line,
            backward: edit.window.backward,
            forward: edit.window.forward,
            expected: String::new(),
        });
    };

    // Only the first line of the pattern tolerates positional drift; it must
    // sit inside the scan window around the hint.
    let low = edit.hint_line.saturating_sub(edit.window.backward);
    let high = edit.hint_line.saturating_add(edit.window.forward);
    let mut window_hits = (low..=high)
        .take_while(|&i| i < document.len())
        .filter(|&i| document[i] == *first);

    let anchor = window_hits.next().ok_or_else(|| EditError::AnchorNotFound {
        hint: edit.hint_line,
        backward: edit.window.backward,
        forward: edit.window.forward,
        expected: first.clone(),
    })?;

    validate_span(&document, anchor, &pattern, edit.window.forward)?;

    // A second fully-valid span inside the window means the instruction does
    // not pin down a single target; refuse rather than take the first.
    if let Some(duplicate) =
        window_hits.find(|&i| span_matches(&document, i, &pattern, edit.window.forward))
    {
        warn!(
            path = %path.display(),
            anchor = anchor + 1,
            duplicate = duplicate + 1,
            "anchored pattern is valid at two positions in the scan window"
        );
        return Err(EditError::AmbiguousMatch {
            path: path.to_path_buf(),
            occurrences: 2,
        });
    }

    let mut output = String::new();
    for line in document[..anchor]
        .iter()
        .chain(replacement.iter())
        .chain(document[anchor + pattern.len()..].iter())
    {
        output.push_str(line);
        output.push('\n');
    }

    slot.capture(path)?;
    fs::write(path, output).map_err(|e| EditError::write(path, e))?;
    debug!(
        path = %path.display(),
        anchor = anchor + 1,
        removed = pattern.len(),
        inserted = replacement.len(),
        "replaced line-anchored span"
    );

    Ok(ContentReport {
        line: anchor + 1,
        lines_removed: pattern.len(),
        lines_inserted: replacement.len(),
        strategy: MatchStrategy::LineAnchored,
    })
}

/// Validate the span anchored at `anchor`, reporting the first problem.
///
/// A single-line pattern is the anchor itself. For longer patterns the span
/// must fit the document, the last line must reappear within `forward` lines
/// after the expected end position, and every interior line must match the
/// document verbatim; interior content is never fuzzed, since that risks
/// silently replacing the wrong block.
fn validate_span(
    document: &[String],
    anchor: usize,
    pattern: &[String],
    forward: usize,
) -> EditResult<()> {
    if pattern.len() == 1 {
        return Ok(());
    }

    if anchor + pattern.len() > document.len() {
        return Err(EditError::PatternExceedsDocument {
            anchor: anchor + 1,
            pattern_lines: pattern.len(),
            document_lines: document.len(),
        });
    }

    let after_span = anchor + pattern.len();
    let last = &pattern[pattern.len() - 1];
    let end_found = (after_span..after_span.saturating_add(forward))
        .take_while(|&i| i < document.len())
        .any(|i| document[i] == *last);
    if !end_found {
        return Err(EditError::EndLineMismatch {
            near: after_span,
            forward,
            expected: last.clone(),
        });
    }

    for offset in 1..pattern.len() - 1 {
        if document[anchor + offset] != pattern[offset] {
            return Err(EditError::InteriorLineMismatch {
                line: anchor + offset + 1,
                expected: pattern[offset].clone(),
                actual: document[anchor + offset].clone(),
            });
        }
    }

    Ok(())
}

/// Non-reporting twin of [`validate_span`] for ambiguity probing.
fn span_matches(document: &[String], anchor: usize, pattern: &[String], forward: usize) -> bool {
    document.get(anchor) == pattern.first() && validate_span(document, anchor, pattern, forward).is_ok()
}
