use std::sync::{Arc, atomic::AtomicBool};

use bytes::Bytes;

use crate::{sink::PipeSink, source::PipeSource};

/// Default number of chunks the pipe buffers before `send` waits.
pub const DEFAULT_PIPE_CAPACITY: usize = 64;

#[derive(Debug)]
pub(crate) enum PipeMsg {
    Data(Bytes),
    EndOfStream,
    Failed(String),
}

#[derive(Clone, Debug)]
pub struct PipeOptions {
    /// Chunks held in flight between sink and source.
    pub capacity: usize,
}

impl Default for PipeOptions {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_PIPE_CAPACITY,
        }
    }
}

/// Create one connected sink/source pair.
///
/// Both ends share a single bounded buffer and a teardown flag. The flag is
/// raised only by [`PipeCloser::close`](crate::PipeCloser::close), which lets
/// the source tell an external teardown apart from the sink going away.
pub fn pipe(opts: PipeOptions) -> (PipeSink, PipeSource) {
    let (tx, rx) = kanal::bounded(opts.capacity.max(1));
    let torn_down = Arc::new(AtomicBool::new(false));
    let sink = PipeSink::new(tx.to_async());
    let source = PipeSource::new(rx, torn_down);
    (sink, source)
}
