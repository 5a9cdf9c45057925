use thiserror::Error;

/// Failures the execution subsystem can surface to its caller.
///
/// A user compile error is not listed here: it is a normal outcome carried
/// in the response body. These variants are the thrown cases the route
/// layer translates to HTTP statuses.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("program {0} not found")]
    ProgramNotFound(i64),

    /// The toolchain binary itself could not be invoked. This is an
    /// operator-facing configuration problem, not a property of the
    /// submitted code.
    #[error("toolchain unavailable: {0}")]
    ToolchainUnavailable(String),

    #[error("execution exceeded the time limit of {seconds}s")]
    Timeout { seconds: u64 },

    #[error("workspace I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
