use thiserror::Error;

/// Failure taxonomy for every public ledger operation.
///
/// All failures are surfaced synchronously to the caller; a failing
/// precondition aborts the call with no observable state change.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),
    #[error("mutating calls are paused")]
    Paused,
    #[error("already configured: {0}")]
    AlreadyConfigured(&'static str),
    #[error("ledger is shut down")]
    ShutdownActive,
    #[error("no expired locks to process")]
    NothingToProcess,
    #[error("reentrant call rejected")]
    Reentrant,
    #[error("value transfer failed: {0}")]
    Transfer(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
