//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract. Scripts rely on them.
//!
//! | Code | Meaning                                                  |
//! |------|----------------------------------------------------------|
//! | 0    | Success (orphan tap-offs are reported, not failures)     |
//! | 1    | General error (unspecified)                              |
//! | 2    | CLI usage error (bad args)                               |
//! | 3    | File could not be read or written                        |
//! | 4    | Malformed input: bad CSV, missing column, invalid tap    |
//! | 5    | Invalid route: bad fare table row or fare lookup failure |
//! | 6    | A tap-off is earlier than its tap-on (reject policy)     |
//! | 7    | Settings file missing, malformed or invalid              |

use tapfare_io::IoError;
use tapfare_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Input or output file could not be read or written.
pub const EXIT_IO: u8 = 3;

/// Fare table or taps file is malformed.
pub const EXIT_INPUT: u8 = 4;

/// Fare table row rejected, or a tap references a stop/pair with no fare.
pub const EXIT_ROUTE: u8 = 5;

/// Tap-off timestamp precedes its tap-on under `timestamp_policy = "reject"`.
pub const EXIT_TAP_ORDER: u8 = 6;

/// Settings file could not be loaded.
pub const EXIT_CONFIG: u8 = 7;

pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::InvalidRoute(_) => EXIT_ROUTE,
        ReconError::OutOfOrderTaps { .. } => EXIT_TAP_ORDER,
    }
}

pub fn io_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::Io(_) => EXIT_IO,
        IoError::Csv(_)
        | IoError::MissingColumn { .. }
        | IoError::InvalidTap { .. }
        | IoError::InvalidCost { .. }
        | IoError::InvalidDateFormat(_) => EXIT_INPUT,
        IoError::Route { source, .. } => recon_exit_code(source),
    }
}
