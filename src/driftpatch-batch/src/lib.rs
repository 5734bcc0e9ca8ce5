//! Instruction batches for driftpatch.
//!
//! A batch file is a JSON document listing edit instructions:
//!
//! ```json
//! {
//!   "commands": [
//!     {
//!       "call": "replace_by_content",
//!       "title": "bump the retry count",
//!       "args": { "file": "src/client.rs", "old_str": "retries = 2", "new_str": "retries = 5" }
//!     }
//!   ]
//! }
//! ```
//!
//! Parsing and argument typing happen here, before the engine is invoked;
//! the engine assumes well-typed input. Instructions run strictly in order
//! and the first failure stops the batch, leaving earlier edits applied and
//! later instructions untouched.

pub mod instruction;
pub mod runner;

pub use instruction::{Batch, ContentArgs, Instruction, Operation, RangeArgs};
pub use runner::{AppliedInstruction, BatchOutcome, BatchRunner, InstructionOutcome};

use thiserror::Error;

/// Errors raised while parsing or executing a batch.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Batch file not found: {0}")]
    BatchFileNotFound(String),

    #[error("Invalid batch JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Invalid arguments for {call}: {source}")]
    InvalidArgs {
        call: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("endLine must be -1 or a positive line number, got {0}")]
    InvalidEndLine(i64),

    #[error("instruction #{index} ({call}) failed: {source}")]
    Instruction {
        index: usize,
        call: String,
        #[source]
        source: driftpatch_engine::EditError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for batch operations.
pub type Result<T> = std::result::Result<T, BatchError>;
