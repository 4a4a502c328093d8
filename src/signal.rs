//! Ctrl+C handling.
//!
//! The binary runs one scan per process, so the handler cancels a single
//! process-wide [`CancelToken`] that is handed to that scan. Library users
//! that run several scans create their own tokens instead.
//!
//! # Usage
//!
//! ```rust,no_run
//! use dupsweep::signal::install_handler;
//!
//! let token = install_handler().expect("Failed to install signal handler");
//! // Pass `token` to ScanCoordinator::run_scan; Ctrl+C cancels it.
//! ```

use std::io::Write;
use std::sync::OnceLock;

use crate::cancel::CancelToken;

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Failed to install the Ctrl+C handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static PROCESS_TOKEN: OnceLock<CancelToken> = OnceLock::new();

/// Install a Ctrl+C handler that cancels the returned token.
///
/// Calling this again returns the token installed by the first call. If
/// another handler was registered outside this module, the returned token
/// is not hooked to the signal but can still be cancelled manually.
///
/// # Errors
///
/// Returns [`SignalError`] if the platform refuses the handler for a reason
/// other than one already being registered.
pub fn install_handler() -> Result<CancelToken, SignalError> {
    if let Some(token) = PROCESS_TOKEN.get() {
        return Ok(token.clone());
    }

    let token = CancelToken::new();
    let hooked = token.clone();

    match ctrlc::set_handler(move || {
        hooked.cancel();
        let _ = writeln!(std::io::stderr(), "\nInterrupted. Finishing current reads...");
        let _ = std::io::stderr().flush();
        log::info!("Cancellation requested by signal");
    }) {
        Ok(()) => {}
        Err(ctrlc::Error::MultipleHandlers) => {
            log::debug!("Ctrl+C handler already registered, using unhooked token");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(PROCESS_TOKEN.get_or_init(|| token).clone())
}
