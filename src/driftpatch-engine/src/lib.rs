//! Anchored, drift-tolerant line edits.
//!
//! This crate applies structured edit instructions to source files without
//! requiring the instructions to carry exact, currently-valid line numbers.
//! Callers describe an edit as "replace this old text with this new text,
//! expected near line N" or "replace lines A-B, where the boundaries should
//! read X and Y". The engine locates the real target even if the file has
//! shifted a few lines since the instruction was generated, and refuses to
//! guess when the evidence is ambiguous or absent.
//!
//! Two operations are exposed:
//! - [`replace_by_content`]: unique literal substring replacement with a
//!   line-anchored fuzzy fallback around a hinted line.
//! - [`replace_by_range`]: marker-validated range replacement with bounded
//!   backward/forward drift search at the boundaries.
//!
//! Before every write, the pre-edit file is captured into a single shared
//! [`BackupSlot`]; the most recent mutation of either kind is recoverable.
//!
//! # Example
//!
//! ```no_run
//! use driftpatch_engine::{BackupSlot, ContentEdit, replace_by_content};
//! use std::path::Path;
//!
//! let slot = BackupSlot::default();
//! let edit = ContentEdit::new("let x = 1;", "let x = 2;").near_line(40);
//! let report = replace_by_content(Path::new("src/main.rs"), &edit, &slot)?;
//! println!("{report}");
//! # Ok::<(), driftpatch_engine::EditError>(())
//! ```

mod backup;
mod content;
mod error;
mod lines;
mod locate;
mod range;
mod report;

pub use backup::{BackupSlot, SLOT_DIR};
pub use content::{ContentEdit, replace_by_content};
pub use error::{EditError, EditResult};
pub use lines::{line_number_at, normalize_newlines, split_for_matching, split_lines};
pub use locate::{ScanWindow, lines_equal_at, locate_backward, locate_forward};
pub use range::{RangeEdit, replace_by_range};
pub use report::{ContentReport, LineSpan, MatchStrategy, RangeReport};
