use thiserror::Error;

/// Errors surfaced by the pipe endpoints.
///
/// `AsyncClosed` is kept apart from `Failed` so readers can treat an external
/// teardown as a clean end of stream while still reporting genuine failures.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PipeError {
    #[error("pipe closed")]
    Closed,

    #[error("pipe closed asynchronously")]
    AsyncClosed,

    #[error("pipe failed: {0}")]
    Failed(String),
}

pub type PipeResult<T> = Result<T, PipeError>;

impl From<PipeError> for std::io::Error {
    fn from(err: PipeError) -> Self {
        let kind = match err {
            PipeError::Closed => std::io::ErrorKind::BrokenPipe,
            PipeError::AsyncClosed => std::io::ErrorKind::ConnectionAborted,
            PipeError::Failed(_) => std::io::ErrorKind::Other,
        };
        std::io::Error::new(kind, err)
    }
}
