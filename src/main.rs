//! dupsweep - duplicate file finder
//!
//! Entry point for the dupsweep CLI application.

use clap::Parser;
use dupsweep::cli::Cli;
use dupsweep::error::{ExitCode, StructuredError};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let json_errors = cli.json_errors;

    match dupsweep::run_app(cli) {
        Ok(code) => code.into(),
        Err(err) => {
            let exit_code = ExitCode::GeneralError;
            if json_errors {
                eprintln!("{}", StructuredError::new(&err, exit_code).to_json());
            } else {
                eprintln!("[{}] Error: {:#}", exit_code.code_prefix(), err);
            }
            exit_code.into()
        }
    }
}
