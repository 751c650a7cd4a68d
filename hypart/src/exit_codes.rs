//! Stable exit codes for the `hypart` binary.

/// Partitioning finished and results were reported.
pub const OK: i32 = 0;
/// An auxiliary file could not be read, or loading/partitioning failed.
pub const FAILURE: i32 = 1;
/// Too few arguments to name both auxiliary files.
pub const USAGE: i32 = 2;

/// Exit code used after a signal-triggered checkpoint (`128 + signal`).
pub fn interrupted(signal: i32) -> i32 {
    128 + signal
}
