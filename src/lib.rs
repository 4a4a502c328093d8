//! dupsweep - duplicate file finder engine
//!
//! Finds groups of byte-identical files across directory trees. Files are
//! partitioned by exact size, size buckets are split by a BLAKE3 digest of
//! their first 4 KiB, and the survivors by a full-content BLAKE3 digest.
//! Hashing runs per size bucket on a rayon pool; progress and cancellation
//! are observable at any time.
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::cancel::CancelToken;
//! use dupsweep::duplicates::{FinderConfig, RetentionPolicy, ScanCoordinator, ScanOutcome};
//! use dupsweep::progress::NoProgress;
//! use std::path::PathBuf;
//!
//! let coordinator = ScanCoordinator::new(FinderConfig::default());
//! let outcome = coordinator
//!     .run_scan(&[PathBuf::from("/srv/media")], &NoProgress, &CancelToken::new())
//!     .unwrap();
//!
//! if let ScanOutcome::Completed(report) = outcome {
//!     for group in &report.groups {
//!         let keep = group.keeper(RetentionPolicy::Newest);
//!         println!("keep {} of {} copies", keep.path.display(), group.len());
//!     }
//! }
//! ```

pub mod actions;
pub mod cancel;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::Context;

use crate::actions::{delete_batch, deletion_plan, BatchDeleteResult, DeleteConfig};
use crate::cli::{Cli, Commands, DeleteArgs, OutputFormat, ScanArgs};
use crate::config::Config;
use crate::duplicates::{ScanCoordinator, ScanOutcome};
use crate::error::ExitCode;
use crate::output::{JsonOutput, TextOutput};
use crate::progress::TerminalProgress;

/// Run the application logic for parsed CLI arguments.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded, the scan fails, or
/// results cannot be written.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let color = !cli.no_color && io::stdout().is_terminal();
    if !color {
        yansi::disable();
    }

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Scan(args) => run_scan(args, config, cli.quiet, color),
        Commands::Delete(args) => run_delete(&args, color),
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(ExitCode::Success)
        }
    }
}

fn run_scan(args: ScanArgs, mut config: Config, quiet: bool, color: bool) -> anyhow::Result<ExitCode> {
    if let Some(threads) = args.threads {
        config.threads = threads;
    }
    config.paranoid |= args.paranoid;

    let coordinator = ScanCoordinator::new(config.finder_config());
    let token = signal::install_handler()?;
    let progress = TerminalProgress::new(quiet || args.output == OutputFormat::Json);

    let outcome = coordinator
        .run_scan(&args.roots, &progress, &token)
        .context("Scan failed")?;
    progress.clear();

    let mut exit_code = ExitCode::from_outcome(&outcome);
    let mut stdout = io::stdout().lock();
    match args.output {
        OutputFormat::Text => TextOutput::new(color).write_outcome(&mut stdout, &outcome)?,
        OutputFormat::Json => JsonOutput::new(&outcome).write_to(&mut stdout)?,
    }
    drop(stdout);

    let ScanOutcome::Completed(report) = &outcome else {
        return Ok(exit_code);
    };
    if !args.delete {
        return Ok(exit_code);
    }

    let plan = deletion_plan(&report.groups, args.keep.into());
    if plan.is_empty() {
        return Ok(exit_code);
    }
    if !args.yes && !confirm_deletion(plan.len(), args.trash)? {
        log::info!("Deletion aborted by user");
        return Ok(exit_code);
    }

    let result = delete_batch(&plan, &DeleteConfig { trash: args.trash });
    report_deletion(&result, args.output, color)?;
    if !result.all_succeeded() {
        exit_code = ExitCode::PartialSuccess;
    }
    Ok(exit_code)
}

fn run_delete(args: &DeleteArgs, color: bool) -> anyhow::Result<ExitCode> {
    let result = delete_batch(&args.paths, &DeleteConfig { trash: args.trash });
    report_deletion(&result, OutputFormat::Text, color)?;

    Ok(if result.all_succeeded() {
        ExitCode::Success
    } else {
        ExitCode::PartialSuccess
    })
}

/// Deletion reports go to stderr when stdout carries JSON.
fn report_deletion(result: &BatchDeleteResult, output: OutputFormat, color: bool) -> io::Result<()> {
    let text = TextOutput::new(color);
    match output {
        OutputFormat::Text => text.write_delete_result(&mut io::stdout().lock(), result),
        OutputFormat::Json => text.write_delete_result(&mut io::stderr().lock(), result),
    }
}

fn confirm_deletion(count: usize, trash: bool) -> io::Result<bool> {
    let question = if trash {
        format!("Move {count} duplicate file(s) to the trash?")
    } else {
        format!("Permanently delete {count} duplicate file(s)?")
    };
    let mut stderr = io::stderr().lock();
    write!(stderr, "{question} [y/N] ")?;
    stderr.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
