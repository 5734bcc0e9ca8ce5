//! Marker-validated line-range replacement.
//!
//! The caller names a 1-indexed span and supplies the text it expects at the
//! span's boundaries. Boundaries that no longer sit where the caller said
//! are relocated within bounded scan windows; boundaries that cannot be
//! relocated fail the operation before anything is written.

use crate::backup::BackupSlot;
use crate::error::{EditError, EditResult};
use crate::lines::split_lines;
use crate::locate::{ScanWindow, lines_equal_at, locate_backward, locate_forward};
use crate::report::{LineSpan, RangeReport};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// A range-form edit request.
#[derive(Debug, Clone)]
pub struct RangeEdit {
    /// 1-indexed first line of the span to replace.
    pub start_line: usize,
    /// 1-indexed last line of the span; `None` means to end of file.
    pub end_line: Option<usize>,
    /// Replacement text for the whole span.
    pub new_str: String,
    /// Text expected at the start of the span, possibly multi-line. Used
    /// only to validate or relocate the boundary; its line count does not
    /// have to match the span.
    pub start_marker: String,
    /// Text expected at the end of the span, possibly multi-line.
    pub end_marker: String,
    pub window: ScanWindow,
}

/// Replace the lines between two marker-validated boundaries of `path`.
///
/// The start boundary prefers backward drift over forward drift: between
/// instruction generation and application, documents more often lose lines
/// before the target, shifting it earlier. The end boundary is searched
/// forward only, anchored no earlier than immediately after the resolved
/// start marker so it can never land inside or before it.
pub fn replace_by_range(
    path: &Path,
    edit: &RangeEdit,
    slot: &BackupSlot,
) -> EditResult<RangeReport> {
    if !path.exists() {
        return Err(EditError::file_not_found(path));
    }
    let raw = fs::read_to_string(path).map_err(|e| EditError::read(path, e))?;
    let lines = split_lines(&raw);
    let len = lines.len();

    let requested_end = edit.end_line.unwrap_or(len);
    if edit.start_line == 0 || edit.start_line > len || requested_end > len {
        return Err(EditError::RangeOutOfBounds {
            start: edit.start_line,
            end: requested_end,
            len,
        });
    }

    let start_marker = split_lines(&edit.start_marker);
    let actual_start = resolve_start(&lines, edit, &start_marker)?;

    let end_marker = split_lines(&edit.end_marker);
    let actual_end = resolve_end(
        &lines,
        edit,
        requested_end,
        actual_start,
        start_marker.len(),
        &end_marker,
    )?;

    // Both boundaries resolved; the span must still be coherent before any
    // byte of the file is rewritten.
    if actual_start > actual_end {
        return Err(EditError::RangeOutOfBounds {
            start: actual_start,
            end: actual_end,
            len,
        });
    }

    let replacement = split_lines(&edit.new_str);
    let mut output = String::new();
    for line in lines[..actual_start - 1]
        .iter()
        .chain(replacement.iter())
        .chain(lines[actual_end..].iter())
    {
        output.push_str(line);
        output.push('\n');
    }

    slot.capture(path)?;
    fs::write(path, output).map_err(|e| EditError::write(path, e))?;

    let report = RangeReport {
        requested: LineSpan::new(edit.start_line, requested_end),
        actual: LineSpan::new(actual_start, actual_end),
        drift_adjusted: actual_start != edit.start_line || actual_end != requested_end,
    };
    debug!(path = %path.display(), %report, "replaced line range");
    Ok(report)
}

/// Validate or relocate the start boundary. Returns the 1-indexed first line
/// of the span.
fn resolve_start(lines: &[String], edit: &RangeEdit, marker: &[String]) -> EditResult<usize> {
    let origin = edit.start_line - 1;
    if lines_equal_at(lines, origin, marker) {
        return Ok(edit.start_line);
    }

    let located = locate_backward(marker, lines, origin, edit.window.backward)
        .or_else(|| locate_forward(marker, lines, origin, edit.window.forward));
    match located {
        Some(position) => {
            info!(
                requested = edit.start_line,
                actual = position + 1,
                "start marker drifted"
            );
            Ok(position + 1)
        }
        None => Err(EditError::StartMarkerNotFound {
            requested: edit.start_line,
            backward: edit.window.backward,
            forward: edit.window.forward,
            expected: edit.start_marker.clone(),
            actual: lines[origin].clone(),
        }),
    }
}

/// Validate or relocate the end boundary. Returns the 1-indexed last line of
/// the span, which is always the last line of wherever the end marker was
/// accepted.
///
/// Resolution order: the marker is compared at the requested end, then at
/// the requested end shifted by however far the start drifted (lines
/// inserted or removed above the span move both boundaries equally), and
/// only then searched forward. The search begins at the first line after the
/// resolved start marker so a searched end can never land inside or before
/// it; the shifted probe is exempt because a span may legitimately be its
/// own boundary when both markers name the same lines.
fn resolve_end(
    lines: &[String],
    edit: &RangeEdit,
    requested_end: usize,
    actual_start: usize,
    start_marker_len: usize,
    marker: &[String],
) -> EditResult<usize> {
    let marker_ends_at = |end: usize| {
        end.checked_sub(marker.len())
            .is_some_and(|origin| lines_equal_at(lines, origin, marker))
    };

    if marker_ends_at(requested_end) {
        return Ok(requested_end);
    }

    let drift = actual_start as isize - edit.start_line as isize;
    let shifted_end = requested_end as isize + drift;
    if drift != 0 && shifted_end > 0 && marker_ends_at(shifted_end as usize) {
        info!(
            requested = requested_end,
            actual = shifted_end,
            "end marker found at the drift-shifted position"
        );
        return Ok(shifted_end as usize);
    }

    let search_origin = actual_start + start_marker_len - 1;
    match locate_forward(marker, lines, search_origin, edit.window.forward) {
        Some(position) => {
            info!(
                requested = requested_end,
                found = position + 1,
                "end marker drifted; search extended"
            );
            Ok(position + marker.len())
        }
        None => Err(EditError::EndMarkerNotFound {
            requested: requested_end,
            forward: edit.window.forward,
            expected: edit.end_marker.clone(),
            actual: requested_end
                .checked_sub(1)
                .and_then(|i| lines.get(i))
                .cloned()
                .unwrap_or_default(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        file: std::path::PathBuf,
        slot: BackupSlot,
    }

    fn fixture(content: &str) -> Fixture {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("doc.txt");
        fs::write(&file, content).unwrap();
        let slot = BackupSlot::new(dir.path().join(".driftpatch"));
        Fixture {
            _dir: dir,
            file,
            slot,
        }
    }

    fn read(fx: &Fixture) -> String {
        fs::read_to_string(&fx.file).unwrap()
    }

    fn edit(start: usize, end: Option<usize>, new: &str, smark: &str, emark: &str) -> RangeEdit {
        RangeEdit {
            start_line: start,
            end_line: end,
            new_str: new.to_string(),
            start_marker: smark.to_string(),
            end_marker: emark.to_string(),
            window: ScanWindow::default(),
        }
    }

    #[test]
    fn exact_markers_replace_the_requested_span() {
        let fx = fixture("l1\nl2\nl3\nl4\nl5\n");
        let edit = edit(2, Some(4), "n1\nn2", "l2", "l4");

        let report = replace_by_range(&fx.file, &edit, &fx.slot).unwrap();

        assert_eq!(read(&fx), "l1\nn1\nn2\nl5\n");
        assert!(!report.drift_adjusted);
        assert_eq!(report.actual, LineSpan::new(2, 4));
        assert_eq!(report.replaced_lines(), 3);
    }

    #[test]
    fn end_line_none_means_to_end_of_file() {
        let fx = fixture("l1\nl2\nl3\n");
        let edit = edit(2, None, "tail", "l2", "l3");

        let report = replace_by_range(&fx.file, &edit, &fx.slot).unwrap();

        assert_eq!(read(&fx), "l1\ntail\n");
        assert_eq!(report.actual, LineSpan::new(2, 3));
        assert!(!report.drift_adjusted);
    }

    #[test]
    fn start_marker_off_by_one_is_relocated_backward_first() {
        // Scenario: the instruction says line 2 but the text now sits at
        // line 3. Both boundaries share the line, window 2 suffices.
        let fx = fixture("a\nb\nc\nd\ne\n");
        let edit = RangeEdit {
            start_line: 2,
            end_line: Some(2),
            new_str: "X".to_string(),
            start_marker: "c".to_string(),
            end_marker: "c".to_string(),
            window: ScanWindow::new(2, 2),
        };

        let report = replace_by_range(&fx.file, &edit, &fx.slot).unwrap();

        assert_eq!(read(&fx), "a\nb\nX\nd\ne\n");
        assert!(report.drift_adjusted);
        assert_eq!(report.requested, LineSpan::new(2, 2));
        assert_eq!(report.actual, LineSpan::new(3, 3));
    }

    #[test]
    fn start_marker_prefers_the_earlier_occurrence() {
        // "dup" exists both before and after the requested start; backward
        // drift wins.
        let fx = fixture("dup\nx\ndup\ny\nz\n");
        let edit = edit(2, Some(2), "D", "dup", "dup");

        let report = replace_by_range(&fx.file, &edit, &fx.slot).unwrap();

        assert_eq!(read(&fx), "D\nx\ndup\ny\nz\n");
        assert_eq!(report.actual, LineSpan::new(1, 1));
    }

    #[test]
    fn multiline_markers_validate_the_boundaries() {
        let fx = fixture("h1\nh2\nbody\nf1\nf2\n");
        let edit = edit(1, Some(5), "only", "h1\nh2", "f1\nf2");

        let report = replace_by_range(&fx.file, &edit, &fx.slot).unwrap();

        assert_eq!(read(&fx), "only\n");
        assert!(!report.drift_adjusted);
    }

    #[test]
    fn drifted_end_marker_extends_the_search_forward() {
        // The end marker is expected at line 3 but now sits at line 5; the
        // span stretches to the marker's last line.
        let fx = fixture("s\nb1\nb2\nb3\nend\nrest\n");
        let edit = edit(1, Some(3), "S\nE", "s", "end");

        let report = replace_by_range(&fx.file, &edit, &fx.slot).unwrap();

        assert!(report.drift_adjusted);
        assert_eq!(report.actual, LineSpan::new(1, 5));
        assert_eq!(read(&fx), "S\nE\nrest\n");
    }

    #[test]
    fn end_marker_search_starts_after_the_start_marker() {
        // An end marker equal to the start marker is not accepted at the
        // start position itself; the search finds the next occurrence.
        let fx = fixture("mark\na\nmark\nb\n");
        let edit = RangeEdit {
            start_line: 1,
            end_line: Some(4),
            new_str: "X".to_string(),
            start_marker: "mark".to_string(),
            end_marker: "mark".to_string(),
            window: ScanWindow::default(),
        };

        let report = replace_by_range(&fx.file, &edit, &fx.slot).unwrap();

        assert_eq!(report.actual, LineSpan::new(1, 3));
        assert_eq!(read(&fx), "X\nb\n");
    }

    #[test]
    fn out_of_bounds_range_is_rejected() {
        let fx = fixture("a\nb\n");

        let err = replace_by_range(&fx.file, &edit(3, Some(3), "X", "a", "b"), &fx.slot).unwrap_err();
        assert!(matches!(err, EditError::RangeOutOfBounds { len: 2, .. }));

        let err = replace_by_range(&fx.file, &edit(1, Some(9), "X", "a", "b"), &fx.slot).unwrap_err();
        assert!(matches!(err, EditError::RangeOutOfBounds { .. }));

        let err = replace_by_range(&fx.file, &edit(0, Some(1), "X", "a", "b"), &fx.slot).unwrap_err();
        assert!(matches!(err, EditError::RangeOutOfBounds { .. }));

        assert_eq!(read(&fx), "a\nb\n");
    }

    #[test]
    fn missing_start_marker_reports_requested_and_actual() {
        let fx = fixture("a\nb\nc\n");
        let edit = RangeEdit {
            start_line: 2,
            end_line: Some(2),
            new_str: "X".to_string(),
            start_marker: "nowhere".to_string(),
            end_marker: "b".to_string(),
            window: ScanWindow::new(1, 1),
        };

        let err = replace_by_range(&fx.file, &edit, &fx.slot).unwrap_err();

        match err {
            EditError::StartMarkerNotFound {
                requested,
                expected,
                actual,
                ..
            } => {
                assert_eq!(requested, 2);
                assert_eq!(expected, "nowhere");
                assert_eq!(actual, "b");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(read(&fx), "a\nb\nc\n");
        assert!(!fx.slot.backup_path().exists());
    }

    #[test]
    fn missing_end_marker_fails_without_mutation() {
        let fx = fixture("a\nb\nc\n");
        let edit = edit(1, Some(2), "X", "a", "nowhere");

        let err = replace_by_range(&fx.file, &edit, &fx.slot).unwrap_err();

        assert!(matches!(err, EditError::EndMarkerNotFound { .. }));
        assert_eq!(read(&fx), "a\nb\nc\n");
    }

    #[test]
    fn start_drifted_past_exact_end_is_rejected() {
        // The start marker resolves forward to line 4 while the end marker
        // still matches the requested line 2 exactly; the inverted span must
        // not be written.
        let fx = fixture("x\nkeep\ny\nstart\nz\n");
        let edit = RangeEdit {
            start_line: 2,
            end_line: Some(2),
            new_str: "X".to_string(),
            start_marker: "start".to_string(),
            end_marker: "keep".to_string(),
            window: ScanWindow::new(0, 5),
        };

        let err = replace_by_range(&fx.file, &edit, &fx.slot).unwrap_err();

        assert!(matches!(err, EditError::RangeOutOfBounds { .. }));
        assert_eq!(read(&fx), "x\nkeep\ny\nstart\nz\n");
    }

    #[test]
    fn replacing_a_span_with_itself_is_idempotent_but_backs_up() {
        let fx = fixture("a\nb\nc\n");
        let edit = edit(2, Some(2), "b", "b", "b");

        let report = replace_by_range(&fx.file, &edit, &fx.slot).unwrap();

        assert_eq!(read(&fx), "a\nb\nc\n");
        assert!(!report.drift_adjusted);
        assert_eq!(
            fs::read_to_string(fx.slot.backup_path()).unwrap(),
            "a\nb\nc\n"
        );
    }

    #[test]
    fn end_marker_found_on_the_last_line_resolves() {
        let fx = fixture("s\nx\nend\n");
        let edit = edit(1, Some(2), "S", "s", "end");

        let report = replace_by_range(&fx.file, &edit, &fx.slot).unwrap();

        assert_eq!(report.actual, LineSpan::new(1, 3));
        assert_eq!(read(&fx), "S\n");
    }

    #[test]
    fn equal_drift_on_both_boundaries_shifts_the_whole_span() {
        // Two lines were inserted above the span; both markers drift by the
        // same amount and the shifted probe resolves the end without a
        // search.
        let fx = fixture("new1\nnew2\nalpha\nbody\nomega\ntail\n");
        let edit = RangeEdit {
            start_line: 1,
            end_line: Some(3),
            new_str: "A\nB\nO".to_string(),
            start_marker: "alpha".to_string(),
            end_marker: "omega".to_string(),
            window: ScanWindow::new(10, 15),
        };

        let report = replace_by_range(&fx.file, &edit, &fx.slot).unwrap();

        assert_eq!(report.requested, LineSpan::new(1, 3));
        assert_eq!(report.actual, LineSpan::new(3, 5));
        assert_eq!(read(&fx), "new1\nnew2\nA\nB\nO\ntail\n");
    }
}
