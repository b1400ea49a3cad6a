use std::{
    io::Read,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use bytes::Bytes;
use kanal::Receiver;
use tracing::{debug, trace};

use crate::{
    error::{PipeError, PipeResult},
    pipe::PipeMsg,
};

/// Read end of a pipe.
///
/// Reads block until a chunk arrives, the sink finishes or drops (end of
/// stream), the sink fails the stream, or the pipe is torn down through a
/// [`PipeCloser`].
#[derive(Debug)]
pub struct PipeSource {
    rx: Receiver<PipeMsg>,
    torn_down: Arc<AtomicBool>,
    current: Bytes,
    finished: bool,
    closed: bool,
}

impl PipeSource {
    pub(crate) fn new(rx: Receiver<PipeMsg>, torn_down: Arc<AtomicBool>) -> Self {
        Self {
            rx,
            torn_down,
            current: Bytes::new(),
            finished: false,
            closed: false,
        }
    }

    /// Handle that tears the pipe down from any thread.
    pub fn closer(&self) -> PipeCloser {
        PipeCloser {
            rx: self.rx.clone(),
            torn_down: Arc::clone(&self.torn_down),
        }
    }

    /// Next chunk, or `None` at end of stream.
    pub fn recv(&mut self) -> PipeResult<Option<Bytes>> {
        if self.closed {
            return Ok(None);
        }
        if self.torn_down.load(Ordering::Acquire) {
            return Err(PipeError::AsyncClosed);
        }
        if !self.current.is_empty() {
            return Ok(Some(std::mem::take(&mut self.current)));
        }
        if self.finished {
            return Ok(None);
        }

        match self.rx.recv() {
            Ok(PipeMsg::Data(bytes)) => Ok(Some(bytes)),
            Ok(PipeMsg::EndOfStream) => {
                trace!("pipe source reached end of stream");
                self.finished = true;
                Ok(None)
            }
            Ok(PipeMsg::Failed(reason)) => {
                self.finished = true;
                Err(PipeError::Failed(reason))
            }
            // The closer raises the flag before closing the channel, so a
            // receive error seen after that is an external teardown.
            Err(_) if self.torn_down.load(Ordering::Acquire) => {
                debug!("pipe source torn down while reading");
                Err(PipeError::AsyncClosed)
            }
            Err(_) => {
                trace!("pipe sink dropped, treating as end of stream");
                self.finished = true;
                Ok(None)
            }
        }
    }

    /// Copy up to `buf.len()` bytes of the next available data.
    ///
    /// Returns `Ok(0)` only for an empty `buf` or at end of stream.
    pub fn pull(&mut self, buf: &mut [u8]) -> PipeResult<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let Some(mut chunk) = self.recv()? else {
            return Ok(0);
        };

        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk.split_to(n));
        self.current = chunk;
        Ok(n)
    }

    /// Close the read end. Pending chunks are dropped and further sends fail.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.current = Bytes::new();
        let _ = self.rx.close();
        debug!("pipe source closed");
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Read for PipeSource {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.pull(buf).map_err(Into::into)
    }
}

impl Drop for PipeSource {
    fn drop(&mut self) {
        self.close();
    }
}

/// Tears a pipe down from outside the normal close path.
///
/// Blocked and later reads on the source fail with [`PipeError::AsyncClosed`];
/// later sends fail with [`PipeError::Closed`].
#[derive(Clone, Debug)]
pub struct PipeCloser {
    rx: Receiver<PipeMsg>,
    torn_down: Arc<AtomicBool>,
}

impl PipeCloser {
    pub fn close(&self) {
        if !self.torn_down.swap(true, Ordering::AcqRel) {
            debug!("pipe torn down");
        }
        let _ = self.rx.close();
    }

    pub fn is_closed(&self) -> bool {
        self.torn_down.load(Ordering::Acquire)
    }
}
