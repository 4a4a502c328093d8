//! Output formatters for scan results.
//!
//! - [`json`]: machine-readable document for scripting
//! - [`text`]: human-readable terminal report
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::cancel::CancelToken;
//! use dupsweep::duplicates::{FinderConfig, ScanCoordinator};
//! use dupsweep::output::JsonOutput;
//! use dupsweep::progress::NoProgress;
//! use std::path::PathBuf;
//!
//! let coordinator = ScanCoordinator::new(FinderConfig::default());
//! let outcome = coordinator
//!     .run_scan(&[PathBuf::from(".")], &NoProgress, &CancelToken::new())
//!     .unwrap();
//!
//! println!("{}", JsonOutput::new(&outcome).to_json_pretty().unwrap());
//! ```

pub mod json;
pub mod text;

pub use json::JsonOutput;
pub use text::TextOutput;
