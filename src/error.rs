//! Errors shared by every layer of the niri client.
//!
//! Nothing is retried.  Each variant carries a human-readable context string
//! and propagates straight up to the CLI, which prints it and exits non-zero.

/// Everything that can go wrong while talking to niri.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NiriError {
    /// The socket address is missing from the environment.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Connecting, writing or reading failed at the socket level.
    #[error("connection error: {0}")]
    Connection(String),

    /// The daemon sent something that is not a valid reply line.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The daemon answered with an `Err` envelope.
    #[error("niri rejected the request: {0}")]
    Command(String),

    /// A well-formed reply breaks an assumption about niri's state, e.g. the
    /// focused output has no active workspace.
    #[error("unexpected compositor state: {0}")]
    ContractViolation(String),

    /// The read deadline passed before the next line arrived.
    #[error("timed out waiting for niri")]
    Timeout,

    /// The caller supplied arguments the operation cannot work with.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
