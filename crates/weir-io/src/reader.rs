use std::io::{ErrorKind, Read};

use tracing::{debug, trace};
use weir_pipe::{PipeCloser, PipeError, PipeSource};

use crate::sync::{FlowControl, FlowTracker};

/// Consumer-facing half of a flow-controlled pipe.
///
/// Reads block until data arrives or the stream ends. Every outcome other
/// than data is final: end of stream, an external teardown and a transport
/// failure all close the reader, and later reads return `Ok(0)`.
#[derive(Debug)]
pub struct FlowReader {
    source: PipeSource,
    tracker: FlowTracker,
    closed: bool,
}

impl FlowReader {
    pub(crate) fn new(source: PipeSource, tracker: FlowTracker) -> Self {
        Self {
            source,
            tracker,
            closed: false,
        }
    }

    /// Bytes written but not yet read.
    ///
    /// A hint: it may count bytes still in flight inside the pipe.
    pub fn available(&self) -> usize {
        self.tracker.available()
    }

    pub fn control(&self) -> FlowControl {
        self.tracker.snapshot()
    }

    /// Handle for tearing the pipe down from another thread. A read parked
    /// at that moment returns end of stream.
    pub fn close_handle(&self) -> PipeCloser {
        self.source.closer()
    }

    /// Read a single byte; `None` at end of stream.
    pub fn read_byte(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        match self.pull(&mut byte) {
            0 => None,
            _ => Some(byte[0]),
        }
    }

    /// Read up to `max_len` bytes into `buf[offset..]`.
    ///
    /// Fails with `InvalidInput` when the range does not fit in `buf`.
    pub fn read_into(
        &mut self,
        buf: &mut [u8],
        offset: usize,
        max_len: usize,
    ) -> std::io::Result<usize> {
        let range = offset
            .checked_add(max_len)
            .and_then(|end| buf.get_mut(offset..end))
            .ok_or_else(|| {
                std::io::Error::new(ErrorKind::InvalidInput, "read range out of bounds")
            })?;
        Ok(self.pull(range))
    }

    /// Close the reader and the pipe source. Idempotent.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.source.close();
        debug!(available = self.tracker.available(), "flow reader closed");
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn pull(&mut self, buf: &mut [u8]) -> usize {
        if buf.is_empty() || self.closed {
            return 0;
        }

        match self.source.pull(buf) {
            Ok(0) => {
                trace!("flow reader reached end of stream");
                self.close();
                0
            }
            Ok(n) => {
                self.tracker.release(n);
                n
            }
            Err(PipeError::AsyncClosed) => {
                debug!("pipe closed under reader, treating as end of stream");
                self.close();
                0
            }
            Err(e) => {
                self.tracker.report(&e);
                self.close();
                0
            }
        }
    }
}

impl Read for FlowReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        Ok(self.pull(buf))
    }
}
