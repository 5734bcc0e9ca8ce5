//! driftpatch CLI - apply JSON edit batches to source files.
//!
//! Batches are applied in the order given; a batch that fully applies is
//! consumed (archived into the backup slot directory and deleted). The
//! process exits 0 only when every batch fully applied.

use anyhow::{Context, Result};
use clap::Parser;
use driftpatch_batch::BatchRunner;
use driftpatch_engine::BackupSlot;
use std::path::PathBuf;
use std::process::ExitCode;

const AFTER_HELP: &str = r#"The batch file contains JSON instructions:
{
  "commands": [
    {
      "call": "replace_by_content",
      "title": "optional description shown while applying",
      "args": {
        "file": "path/to/file.txt",
        "old_str": "old text",
        "new_str": "new text",
        "startLine": 0,
        "backward_scan_limit": 10,
        "forward_scan_limit": 15
      }
    },
    {
      "call": "replace_by_range",
      "args": {
        "file": "path/to/file.txt",
        "startLine": 5,
        "endLine": 10,
        "startLine_str": "start line validation text",
        "endLine_str": "end line validation text",
        "new_str": "new multi-line content"
      }
    }
  ]
}

replace_by_content replaces a unique occurrence of old_str, falling back to
a line-anchored search near startLine when the literal text has drifted.
replace_by_range replaces the lines between two marker-validated boundaries;
endLine -1 means to end of file.
"#;

#[derive(Debug, Parser)]
#[command(
    name = "driftpatch",
    version,
    about = "Apply anchored, drift-tolerant edit batches to source files",
    after_help = AFTER_HELP
)]
struct Cli {
    /// Batch files to apply, in order.
    #[arg(
        short = 'f',
        long = "file",
        value_name = "BATCH",
        num_args = 1..,
        required_unless_present = "undo"
    )]
    files: Vec<PathBuf>,

    /// Restore the file recorded in the backup slot instead of applying
    /// batches.
    #[arg(long, conflicts_with = "files")]
    undo: bool,

    /// Keep batch files instead of consuming them after success.
    #[arg(long)]
    keep: bool,
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<bool> {
    if cli.undo {
        let restored = BackupSlot::default()
            .restore_last()
            .context("nothing to restore")?;
        println!("Restored {}", restored.display());
        return Ok(true);
    }

    let mut runner = BatchRunner::new();
    if cli.keep {
        runner = runner.keep_batch_files();
    }

    let mut all_ok = true;
    for file in &cli.files {
        println!("Applying batch {}", file.display());
        match runner.run_file(file) {
            Ok(outcome) => {
                for applied in &outcome.applied {
                    match applied.title.as_deref() {
                        Some(title) => {
                            println!("  [{}] `{title}`: {}", applied.index + 1, applied.outcome);
                        }
                        None => println!("  [{}] {}", applied.index + 1, applied.outcome),
                    }
                }
                println!("  OK: {} instruction(s) applied", outcome.applied.len());
            }
            Err(err) => {
                eprintln!("  {err}");
                all_ok = false;
            }
        }
    }
    Ok(all_ok)
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}
