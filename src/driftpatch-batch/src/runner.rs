//! Fail-fast execution of instruction batches.

use crate::instruction::{Batch, Operation};
use crate::{BatchError, Result};
use driftpatch_engine::{
    BackupSlot, ContentReport, RangeReport, replace_by_content, replace_by_range,
};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Name of the archived copy of the last fully-applied batch, inside the
/// backup slot directory.
const APPLIED_FILE: &str = "last-applied";

/// What a single applied instruction reported.
#[derive(Debug, Clone)]
pub enum InstructionOutcome {
    Content(ContentReport),
    Range(RangeReport),
}

impl fmt::Display for InstructionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Content(report) => report.fmt(f),
            Self::Range(report) => report.fmt(f),
        }
    }
}

/// One successfully applied instruction.
#[derive(Debug, Clone)]
pub struct AppliedInstruction {
    /// Position in the batch, 0-indexed.
    pub index: usize,
    pub title: Option<String>,
    pub outcome: InstructionOutcome,
}

/// Result of running one batch to completion.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub applied: Vec<AppliedInstruction>,
}

/// Executes instruction batches against the filesystem.
///
/// Each instruction is a complete open-modify-close unit; nothing is held
/// across instructions except the shared backup slot. There is no rollback:
/// when an instruction fails, edits applied earlier in the same batch stay
/// on disk and the caller re-issues the remainder.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    slot: BackupSlot,
    consume: bool,
}

impl Default for BatchRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchRunner {
    pub fn new() -> Self {
        Self {
            slot: BackupSlot::default(),
            consume: true,
        }
    }

    /// Use a backup slot other than the default one in the working
    /// directory.
    pub fn with_slot(mut self, slot: BackupSlot) -> Self {
        self.slot = slot;
        self
    }

    /// Keep batch files on disk instead of consuming them after success.
    pub fn keep_batch_files(mut self) -> Self {
        self.consume = false;
        self
    }

    /// Read, parse, and run a batch file. On full success the batch is
    /// archived next to the backup slot and the original file is deleted,
    /// so a crashed caller cannot re-apply it.
    pub fn run_file(&self, batch_file: &Path) -> Result<BatchOutcome> {
        if !batch_file.exists() {
            return Err(BatchError::BatchFileNotFound(
                batch_file.display().to_string(),
            ));
        }
        let text = fs::read_to_string(batch_file)?;
        let batch = Batch::parse(&text)?;

        let outcome = self.run(&batch)?;

        if self.consume {
            self.archive_and_delete(batch_file)?;
        }
        Ok(outcome)
    }

    /// Run a parsed batch, strictly in order, stopping at the first
    /// instruction that fails.
    pub fn run(&self, batch: &Batch) -> Result<BatchOutcome> {
        let mut applied = Vec::with_capacity(batch.commands.len());

        for (index, instruction) in batch.commands.iter().enumerate() {
            let operation = Operation::resolve(instruction)?;
            if let Some(title) = instruction.title.as_deref() {
                info!(index, title, "executing");
            }

            let call = operation.call_name();
            let outcome = match operation {
                Operation::ReplaceByContent { file, edit } => {
                    replace_by_content(&file, &edit, &self.slot)
                        .map(InstructionOutcome::Content)
                }
                Operation::ReplaceByRange { file, edit } => {
                    replace_by_range(&file, &edit, &self.slot).map(InstructionOutcome::Range)
                }
            }
            .map_err(|source| BatchError::Instruction {
                index,
                call: call.to_string(),
                source,
            })?;

            debug!(index, %outcome, "instruction applied");
            applied.push(AppliedInstruction {
                index,
                title: instruction.title.clone(),
                outcome,
            });
        }

        Ok(BatchOutcome { applied })
    }

    fn archive_and_delete(&self, batch_file: &Path) -> Result<()> {
        fs::create_dir_all(self.slot.dir())?;
        fs::copy(batch_file, self.slot.dir().join(APPLIED_FILE))?;
        fs::remove_file(batch_file)?;
        info!(batch = %batch_file.display(), "batch applied and consumed");
        Ok(())
    }
}
