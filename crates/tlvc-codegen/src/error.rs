//! Error taxonomy for the generator.

use thiserror::Error;

/// Errors surfaced by the generator.
///
/// There are exactly three classes of failure. A configuration error is
/// reported before any artifact is opened. An invariant violation means the
/// upstream schema resolver handed us a tree that a validated schema cannot
/// produce; generation for the whole invocation is aborted rather than
/// emitting partially-wrong metadata. I/O errors come from artifact writes.
#[derive(Debug, Error)]
pub enum Error {
    /// An option name the generator does not recognize.
    #[error("unknown generator option: {0}")]
    UnknownOption(String),

    /// An internally-inconsistent state that should be unreachable given a
    /// valid schema (e.g. a default value on a message-typed field).
    #[error("internal invariant violated: {0}")]
    Invariant(String),

    /// An artifact could not be opened or written.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
