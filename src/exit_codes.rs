//! Exit code constants for the launcher.
//!
//! Once the host application has started, the launcher exits with the host's
//! own status. The remaining codes only apply when it never ran:
//! - 0: Success
//! - 1: Host status that does not fit an exit byte
//! - 2: Bad launcher arguments
//! - 127: Host command could not be started
//! - 128 + N: Host was terminated by signal N

use std::process::{ExitCode, ExitStatus};

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// Reported when the host's status is outside `0..=255`.
pub const GENERAL_FAILURE: i32 = 1;

/// Launcher arguments were rejected (clap uses the same code).
pub const USAGE_ERROR: i32 = 2;

/// The host command could not be spawned.
pub const LAUNCH_FAILURE: i32 = 127;

/// Added to the signal number when the host was killed by a signal.
pub const SIGNAL_BASE: i32 = 128;

/// Exit code mirroring the host application's termination.
pub fn from_status(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return from_signal(signal);
        }
    }
    LAUNCH_FAILURE
}

/// Exit code for a launcher stopped by `signal`.
pub fn from_signal(signal: i32) -> i32 {
    SIGNAL_BASE + signal
}

/// Process exit byte for `code`. Codes outside `0..=255` become
/// [`GENERAL_FAILURE`] rather than wrapping around to success.
pub fn exit_byte(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(GENERAL_FAILURE as u8)
}

/// [`ExitCode`] for `code`, see [`exit_byte`].
pub fn to_exit_code(code: i32) -> ExitCode {
    ExitCode::from(exit_byte(code))
}
