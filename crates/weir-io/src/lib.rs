//! # Weir I/O
//!
//! Flow-controlled bridge between async chunk producers and blocking
//! `std::io::Read` consumers, built on a `weir-pipe` pipe.
//!
//! ## Core Components
//!
//! - `FlowWriter`: async producer interface with full/drain signalling
//! - `FlowReader`: blocking consumer implementing `Read`
//! - `FlowTracker`: shared counter, full flag and handler slots
//!
//! ## Backpressure
//!
//! `available` counts bytes written but not yet read. The write queue is
//! reported full once `available` reaches `max_write_queue_size` and stays
//! full until it drops below half of that (or to zero). That transition
//! fires the drain handler exactly once.
//!
//! ## EOF Semantics
//!
//! `Read::read()` returns `Ok(0)` only for an empty buffer or once the
//! stream is over:
//! 1. the writer was closed or dropped and all buffered data was consumed,
//! 2. the pipe was torn down through a `PipeCloser`, or
//! 3. the transport failed; the exception handler sees the error first.
//!
//! No "false EOFs": while the stream is open and empty, the reader blocks.

#![forbid(unsafe_code)]

pub mod bridge;
pub mod errors;
pub mod reader;
mod sync;
pub mod writer;

pub use bridge::{DEFAULT_MAX_WRITE_QUEUE_SIZE, FlowOptions, flow_pair};
pub use errors::{IoError, IoResult};
pub use reader::FlowReader;
pub use sync::FlowControl;
pub use weir_pipe::{PipeCloser, PipeError, PipeOptions};
pub use writer::FlowWriter;
