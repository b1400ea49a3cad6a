//! # Weir pipe
//!
//! Bounded, unidirectional, in-process byte pipe.
//!
//! - `PipeSink`: async write end, waits only for room in the pipe buffer
//! - `PipeSource`: blocking read end, implements `Read`
//! - `PipeCloser`: tears the pipe down from any thread
//!
//! ## End of stream
//!
//! A read returns `Ok(0)` (or `recv` returns `None`) once buffered data is
//! exhausted after the sink called `finish()` or was dropped.
//!
//! ## Teardown
//!
//! A teardown through `PipeCloser` surfaces as `PipeError::AsyncClosed` on
//! every in-flight and later read. A stream ended with `PipeSink::fail`
//! surfaces as `PipeError::Failed`.

#![forbid(unsafe_code)]

mod error;
mod pipe;
mod sink;
mod source;

pub use error::{PipeError, PipeResult};
pub use pipe::{DEFAULT_PIPE_CAPACITY, PipeOptions, pipe};
pub use sink::PipeSink;
pub use source::{PipeCloser, PipeSource};
