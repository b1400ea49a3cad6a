use thiserror::Error;
use weir_pipe::PipeError;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("write side already closed")]
    Closed,
    #[error("transport error: {0}")]
    Pipe(#[from] PipeError),
}

pub type IoResult<T> = Result<T, IoError>;
