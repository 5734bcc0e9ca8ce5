//! Batch file format and operation dispatch.

use crate::{BatchError, Result};
use driftpatch_engine::{ContentEdit, RangeEdit, ScanWindow};
use serde::Deserialize;
use std::path::PathBuf;

/// A parsed batch file: an ordered list of instructions.
#[derive(Debug, Clone, Deserialize)]
pub struct Batch {
    pub commands: Vec<Instruction>,
}

impl Batch {
    /// Parse batch JSON.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// One instruction as it appears in the batch file. The argument bundle
/// stays untyped until the call name is resolved.
#[derive(Debug, Clone, Deserialize)]
pub struct Instruction {
    pub call: String,
    #[serde(default)]
    pub title: Option<String>,
    pub args: serde_json::Value,
}

/// Wire arguments of a `replace_by_content` instruction.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentArgs {
    pub file: String,
    pub old_str: String,
    pub new_str: String,
    #[serde(rename = "startLine", default)]
    pub start_line: usize,
    #[serde(default = "default_backward")]
    pub backward_scan_limit: usize,
    #[serde(default = "default_forward")]
    pub forward_scan_limit: usize,
}

/// Wire arguments of a `replace_by_range` instruction.
#[derive(Debug, Clone, Deserialize)]
pub struct RangeArgs {
    pub file: String,
    #[serde(rename = "startLine")]
    pub start_line: usize,
    /// 1-indexed end line; -1 means to end of file.
    #[serde(rename = "endLine")]
    pub end_line: i64,
    pub new_str: String,
    #[serde(rename = "startLine_str")]
    pub start_marker: String,
    #[serde(rename = "endLine_str")]
    pub end_marker: String,
    #[serde(default = "default_backward")]
    pub backward_scan_limit: usize,
    #[serde(default = "default_forward")]
    pub forward_scan_limit: usize,
}

fn default_backward() -> usize {
    10
}

fn default_forward() -> usize {
    15
}

/// A fully-typed operation, resolved once at the batch boundary.
///
/// Call names are matched ASCII case-insensitively; sentinel values (the
/// `-1` end line) are converted here so the engine never sees them.
#[derive(Debug, Clone)]
pub enum Operation {
    ReplaceByContent { file: PathBuf, edit: ContentEdit },
    ReplaceByRange { file: PathBuf, edit: RangeEdit },
}

impl Operation {
    /// Resolve an instruction into a typed operation, rejecting unknown
    /// calls and malformed argument bundles.
    pub fn resolve(instruction: &Instruction) -> Result<Self> {
        let call = instruction.call.to_ascii_lowercase();
        match call.as_str() {
            "replace_by_content" => {
                let args: ContentArgs = serde_json::from_value(instruction.args.clone())
                    .map_err(|e| BatchError::InvalidArgs {
                        call: call.clone(),
                        source: e,
                    })?;
                Ok(Self::ReplaceByContent {
                    file: PathBuf::from(args.file.trim()),
                    edit: ContentEdit {
                        old_str: args.old_str,
                        new_str: args.new_str,
                        hint_line: args.start_line,
                        window: ScanWindow::new(args.backward_scan_limit, args.forward_scan_limit),
                    },
                })
            }
            "replace_by_range" => {
                let args: RangeArgs = serde_json::from_value(instruction.args.clone())
                    .map_err(|e| BatchError::InvalidArgs {
                        call: call.clone(),
                        source: e,
                    })?;
                let end_line = match args.end_line {
                    -1 => None,
                    n if n > 0 => Some(n as usize),
                    n => return Err(BatchError::InvalidEndLine(n)),
                };
                Ok(Self::ReplaceByRange {
                    file: PathBuf::from(args.file.trim()),
                    edit: RangeEdit {
                        start_line: args.start_line,
                        end_line,
                        new_str: args.new_str.trim().to_string(),
                        start_marker: args.start_marker,
                        end_marker: args.end_marker,
                        window: ScanWindow::new(args.backward_scan_limit, args.forward_scan_limit),
                    },
                })
            }
            _ => Err(BatchError::UnsupportedOperation(instruction.call.clone())),
        }
    }

    /// The canonical call name, for diagnostics.
    pub fn call_name(&self) -> &'static str {
        match self {
            Self::ReplaceByContent { .. } => "replace_by_content",
            Self::ReplaceByRange { .. } => "replace_by_range",
        }
    }
}
