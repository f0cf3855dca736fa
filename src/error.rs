/// Failure kinds surfaced by the close and list workflows.
///
/// Library functions return `anyhow::Result` and attach context to each
/// step; the binaries look for one of these in the error chain to decide
/// the process exit code.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Config(String),

    #[error("{0}")]
    Argument(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Precondition(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("GitHub API error: {0}")]
    Api(String),

    #[error("failed to write output: {0}")]
    Output(String),
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Argument(_) => 2,
            Error::Config(_) => 3,
            Error::Auth(_) => 4,
            Error::NotFound(_) => 5,
            Error::Precondition(_) => 6,
            Error::Transport(_) => 7,
            Error::Api(_) | Error::Output(_) => 1,
        }
    }

    /// Classifies an octocrab failure by HTTP status where one is available.
    pub fn from_octocrab(err: octocrab::Error) -> Self {
        match err {
            octocrab::Error::GitHub { source, .. } => {
                let message = source.message.clone();
                match source.status_code.as_u16() {
                    401 | 403 => Error::Auth(message),
                    404 => Error::NotFound(message),
                    status => Error::Api(format!("{status}: {message}")),
                }
            }
            other => Error::Transport(other.to_string()),
        }
    }
}

/// Finds the first typed [`Error`] in an `anyhow` chain and returns its exit
/// code, falling back to 1 for untyped failures.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<Error>())
        .map_or(1, Error::exit_code)
}
