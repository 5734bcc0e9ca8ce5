//! Logical line model.
//!
//! Documents and patterns are compared line by line. Most of the time a
//! logical line is a physical line, but pattern text destined for
//! template-literal-bearing sources (`.js`, `.ts`, `.tsx`) may encode
//! newlines as escape sequences inside backtick strings; those are split
//! into additional logical lines so matching operates at the granularity
//! the instruction author saw.

use std::path::Path;

/// File extensions whose template literals encode newlines as `\n` escapes.
const TEMPLATE_LITERAL_EXTENSIONS: &[&str] = &["js", "ts", "tsx"];

/// Normalize CRLF line endings to LF. Lone `\r` bytes are left alone.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n")
}

/// Split text into logical lines.
///
/// CRLF is normalized to LF before splitting. A trailing segment without a
/// terminator counts as a line; a terminating newline does not produce an
/// empty final line. An empty string yields an empty sequence.
pub fn split_lines(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let normalized = normalize_newlines(text);
    let mut lines: Vec<String> = normalized.split('\n').map(str::to_owned).collect();
    if lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    lines
}

/// Split pattern text into logical lines for matching against `path`.
///
/// For template-literal-bearing sources containing a backtick, each physical
/// line is additionally split at every literal `\r\n` escape (checked first)
/// and then at every literal `\n` escape. All segments are kept, including
/// the tail after the final escape. Everything else splits physically.
pub fn split_for_matching(path: &Path, text: &str) -> Vec<String> {
    if is_template_literal_source(path) && text.contains('`') {
        split_lines(text)
            .iter()
            .flat_map(|line| split_escaped(line))
            .collect()
    } else {
        split_lines(text)
    }
}

/// 1-indexed number of the line containing the byte at `index`.
pub fn line_number_at(text: &str, index: usize) -> usize {
    let upto = index.min(text.len());
    text.as_bytes()[..upto].iter().filter(|&&b| b == b'\n').count() + 1
}

fn is_template_literal_source(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            TEMPLATE_LITERAL_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Split one physical line at escaped newline sequences. `\r\n` is consumed
/// before `\n` so the trailing half of a `\r\n` escape is never split twice.
fn split_escaped(line: &str) -> Vec<String> {
    line.split("\\r\\n")
        .flat_map(|segment| segment.split("\\n"))
        .map(str::to_owned)
        .collect()
}
