use bytes::Bytes;
use kanal::AsyncSender;
use tracing::{debug, trace};

use crate::{
    error::{PipeError, PipeResult},
    pipe::PipeMsg,
};

/// Write end of a pipe.
///
/// Every operation waits only for room in the pipe's own buffer, never for
/// the reader to consume. Dropping the sink ends the stream the same way
/// [`finish`](Self::finish) does.
#[derive(Debug)]
pub struct PipeSink {
    tx: AsyncSender<PipeMsg>,
}

impl PipeSink {
    pub(crate) fn new(tx: AsyncSender<PipeMsg>) -> Self {
        Self { tx }
    }

    /// Forward one chunk. Empty chunks are skipped.
    pub async fn send(&self, bytes: Bytes) -> PipeResult<()> {
        if bytes.is_empty() {
            trace!("pipe sink skipping empty chunk");
            return Ok(());
        }
        self.deliver(PipeMsg::Data(bytes)).await
    }

    /// Blocking variant of [`send`](Self::send) for producers outside an
    /// async context.
    pub fn send_blocking(&self, bytes: Bytes) -> PipeResult<()> {
        if bytes.is_empty() {
            trace!("pipe sink skipping empty chunk");
            return Ok(());
        }
        self.tx
            .as_sync()
            .send(PipeMsg::Data(bytes))
            .map_err(|_| PipeError::Closed)
    }

    /// Signal end of stream; the reader sees it after all buffered chunks.
    pub async fn finish(&self) -> PipeResult<()> {
        debug!("pipe sink finished");
        self.deliver(PipeMsg::EndOfStream).await
    }

    /// End the stream with a failure the reader reports as [`PipeError::Failed`].
    pub async fn fail(&self, reason: impl Into<String>) -> PipeResult<()> {
        let reason = reason.into();
        debug!(%reason, "pipe sink failing stream");
        self.deliver(PipeMsg::Failed(reason)).await
    }

    async fn deliver(&self, msg: PipeMsg) -> PipeResult<()> {
        self.tx.send(msg).await.map_err(|_| PipeError::Closed)
    }
}
