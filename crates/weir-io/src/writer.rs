use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, trace};
use weir_pipe::{PipeError, PipeSink};

use crate::{
    errors::{IoError, IoResult},
    sync::{FlowControl, FlowTracker},
};

/// Producer-facing half of a flow-controlled pipe.
///
/// Writes never wait for the reader to consume; they wait only for room in
/// the pipe buffer. Producers should stop writing while
/// [`is_write_queue_full`](Self::is_write_queue_full) is true and resume from
/// the drain handler. Dropping the writer ends the stream.
#[derive(Debug)]
pub struct FlowWriter {
    sink: PipeSink,
    tracker: FlowTracker,
    closed: bool,
}

impl FlowWriter {
    pub(crate) fn new(sink: PipeSink, tracker: FlowTracker) -> Self {
        Self {
            sink,
            tracker,
            closed: false,
        }
    }

    /// Set the high-water mark. `0` is treated as `1`.
    pub fn set_max_queue_size(&mut self, max: usize) -> &mut Self {
        self.tracker.set_max_write_queue_size(max);
        self
    }

    /// Replace the drain handler, called once each time a full queue drops
    /// below half the high-water mark.
    pub fn set_drain_handler<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.tracker.set_drain_handler(Some(Arc::new(handler)));
        self
    }

    pub fn clear_drain_handler(&mut self) -> &mut Self {
        self.tracker.set_drain_handler(None);
        self
    }

    /// Replace the exception handler, called once for each transport failure
    /// the reader runs into.
    pub fn set_exception_handler<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&PipeError) + Send + Sync + 'static,
    {
        self.tracker.set_exception_handler(Some(Arc::new(handler)));
        self
    }

    pub fn clear_exception_handler(&mut self) -> &mut Self {
        self.tracker.set_exception_handler(None);
        self
    }

    pub fn is_write_queue_full(&self) -> bool {
        self.tracker.is_full()
    }

    pub fn control(&self) -> FlowControl {
        self.tracker.snapshot()
    }

    /// Queue a chunk for the reader.
    ///
    /// The chunk is counted as available before it is forwarded, so the call
    /// may cross the high-water mark. Resolves once the pipe accepted the
    /// chunk; fails only if the pipe is gone.
    ///
    /// Dropping the future while it waits for room in the pipe takes the
    /// chunk back out of the count.
    pub async fn write(&mut self, chunk: Bytes) -> IoResult<()> {
        if self.closed {
            return Err(IoError::Closed);
        }

        let len = chunk.len();
        self.tracker.reserve(len);
        let reservation = Reservation {
            tracker: &self.tracker,
            len,
        };
        if let Err(e) = self.sink.send(chunk).await {
            debug!(len, %e, "write rejected by pipe");
            return Err(e.into());
        }
        reservation.commit();
        Ok(())
    }

    /// Finish the stream. The reader sees end of stream after every byte
    /// already written. Idempotent.
    pub async fn close(&mut self) -> IoResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        match self.sink.finish().await {
            Ok(()) => Ok(()),
            Err(PipeError::Closed) => {
                debug!("reader already gone at writer close");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// End the stream with a failure that the reader reports to the
    /// exception handler.
    pub async fn abort(&mut self, reason: impl Into<String>) -> IoResult<()> {
        if self.closed {
            return Err(IoError::Closed);
        }
        self.closed = true;
        self.sink.fail(reason).await.map_err(IoError::from)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Bytes counted for a write that has not reached the pipe yet. Released on
/// drop unless committed.
struct Reservation<'a> {
    tracker: &'a FlowTracker,
    len: usize,
}

impl Reservation<'_> {
    fn commit(mut self) {
        self.len = 0;
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if self.len > 0 {
            trace!(len = self.len, "releasing undelivered write");
            self.tracker.release(self.len);
        }
    }
}
