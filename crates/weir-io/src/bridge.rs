use weir_pipe::{PipeOptions, pipe};

use crate::{reader::FlowReader, sync::FlowTracker, writer::FlowWriter};

/// Default high-water mark, in bytes.
pub const DEFAULT_MAX_WRITE_QUEUE_SIZE: usize = 1000;

#[derive(Clone, Debug)]
pub struct FlowOptions {
    /// Buffered bytes at which the writer reports a full queue.
    pub max_write_queue_size: usize,
    /// Options for the underlying pipe.
    pub pipe: PipeOptions,
}

impl Default for FlowOptions {
    fn default() -> Self {
        Self {
            max_write_queue_size: DEFAULT_MAX_WRITE_QUEUE_SIZE,
            pipe: PipeOptions::default(),
        }
    }
}

impl FlowOptions {
    pub fn with_max_write_queue_size(mut self, max: usize) -> Self {
        self.max_write_queue_size = max;
        self
    }

    pub fn with_pipe(mut self, pipe: PipeOptions) -> Self {
        self.pipe = pipe;
        self
    }
}

/// Create a connected writer/reader pair over a fresh pipe.
pub fn flow_pair(opts: FlowOptions) -> (FlowWriter, FlowReader) {
    let (sink, source) = pipe(opts.pipe);
    let tracker = FlowTracker::new(opts.max_write_queue_size);
    let writer = FlowWriter::new(sink, tracker.clone());
    let reader = FlowReader::new(source, tracker);
    (writer, reader)
}
