use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};
use weir_pipe::PipeError;

pub(crate) type DrainHandler = Arc<dyn Fn() + Send + Sync>;
pub(crate) type ExceptionHandler = Arc<dyn Fn(&PipeError) + Send + Sync>;

/// Point-in-time view of the flow-control state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlowControl {
    /// Bytes accepted from the producer and not yet consumed.
    pub available: usize,
    /// High-water mark.
    pub max_write_queue_size: usize,
    pub write_queue_full: bool,
}

struct FlowState {
    available: usize,
    max_write_queue_size: usize,
    write_queue_full: bool,
    drain_handler: Option<DrainHandler>,
    exception_handler: Option<ExceptionHandler>,
}

impl FlowState {
    fn low_water(&self) -> usize {
        self.max_write_queue_size / 2
    }

    /// Re-derive the full flag; returns the drain handler when this update
    /// crossed from full to below the low-water mark.
    fn recompute(&mut self) -> Option<DrainHandler> {
        if self.available >= self.max_write_queue_size {
            if !self.write_queue_full {
                debug!(
                    available = self.available,
                    max = self.max_write_queue_size,
                    "write queue full"
                );
                self.write_queue_full = true;
            }
            return None;
        }

        // Between low and high water the flag keeps its previous value.
        let drained = self.available < self.low_water() || self.available == 0;
        if self.write_queue_full && drained {
            self.write_queue_full = false;
            debug!(available = self.available, "write queue drained");
            return self.drain_handler.clone();
        }
        None
    }

    fn snapshot(&self) -> FlowControl {
        FlowControl {
            available: self.available,
            max_write_queue_size: self.max_write_queue_size,
            write_queue_full: self.write_queue_full,
        }
    }
}

/// Counter, full flag and handler slots shared by the writer and reader.
///
/// All mutations go through one mutex. Handlers are cloned out and invoked
/// after the lock is released, so they may call back into either facade.
#[derive(Clone)]
pub(crate) struct FlowTracker {
    state: Arc<Mutex<FlowState>>,
}

impl std::fmt::Debug for FlowTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("FlowTracker")
            .field("available", &state.available)
            .field("max_write_queue_size", &state.max_write_queue_size)
            .field("write_queue_full", &state.write_queue_full)
            .finish()
    }
}

impl FlowTracker {
    pub(crate) fn new(max_write_queue_size: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(FlowState {
                available: 0,
                max_write_queue_size: clamp_max(max_write_queue_size),
                write_queue_full: false,
                drain_handler: None,
                exception_handler: None,
            })),
        }
    }

    /// Account for bytes accepted from the producer.
    pub(crate) fn reserve(&self, len: usize) {
        self.apply(|available| *available = available.saturating_add(len));
    }

    /// Account for bytes consumed by the reader.
    pub(crate) fn release(&self, len: usize) {
        self.apply(|available| *available = available.saturating_sub(len));
    }

    fn apply(&self, update: impl FnOnce(&mut usize)) {
        let drain = {
            let mut state = self.state.lock();
            update(&mut state.available);
            state.recompute()
        };
        if let Some(handler) = drain {
            trace!("firing drain handler");
            handler();
        }
    }

    pub(crate) fn available(&self) -> usize {
        self.state.lock().available
    }

    pub(crate) fn is_full(&self) -> bool {
        self.state.lock().write_queue_full
    }

    pub(crate) fn snapshot(&self) -> FlowControl {
        self.state.lock().snapshot()
    }

    pub(crate) fn set_max_write_queue_size(&self, max: usize) {
        self.state.lock().max_write_queue_size = clamp_max(max);
    }

    pub(crate) fn set_drain_handler(&self, handler: Option<DrainHandler>) {
        self.state.lock().drain_handler = handler;
    }

    pub(crate) fn set_exception_handler(&self, handler: Option<ExceptionHandler>) {
        self.state.lock().exception_handler = handler;
    }

    /// Hand a transport failure to the exception handler, if any.
    pub(crate) fn report(&self, err: &PipeError) {
        let handler = self.state.lock().exception_handler.clone();
        match handler {
            Some(handler) => handler(err),
            None => warn!(%err, "transport failure with no exception handler"),
        }
    }
}

fn clamp_max(max: usize) -> usize {
    if max == 0 {
        warn!("max write queue size must be positive, using 1");
        return 1;
    }
    max
}
