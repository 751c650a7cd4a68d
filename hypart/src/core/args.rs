//! Argument compaction for the two leading auxiliary paths.

use std::ffi::OsString;

use crate::error::StartupError;

/// Process arguments split into the auxiliary paths and the delegate's view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitArguments {
    /// `argv[1]`: per-element values (the "ER" file).
    pub element_values: OsString,
    /// `argv[2]`: community/grouping hints (the "idx" file).
    pub community_hints: OsString,
    /// `argv[0]` followed by `argv[3..]` in original order.
    pub delegate: Vec<OsString>,
}

/// Remove positions 1 and 2 from `args` and keep everything else in order.
///
/// The result's `delegate` list has length `args.len() - 2` and is the only
/// argument view handed to the delegate parser.
pub fn split_auxiliary_arguments(args: Vec<OsString>) -> Result<SplitArguments, StartupError> {
    if args.len() < 3 {
        let program = args
            .first()
            .map(|arg| arg.to_string_lossy().into_owned())
            .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());
        return Err(StartupError::Arguments {
            program,
            provided: args.len().saturating_sub(1),
        });
    }

    let mut delegate = args;
    let community_hints = delegate.remove(2);
    let element_values = delegate.remove(1);
    Ok(SplitArguments {
        element_values,
        community_hints,
        delegate,
    })
}
