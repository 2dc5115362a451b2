//! Thread-safe inbound queues
//!
//! Cross-island communication happens exclusively through these queues: one
//! feedback inbox and one migrant inbox per island, pushed to by any island
//! and drained only by the owner.

use std::collections::VecDeque;
use std::sync::Mutex;

/// A mutex-protected FIFO of `(payload, source_rank)` tuples
///
/// Pushes from different producers may interleave, but entries pushed by a
/// single producer are popped in the order they were pushed.
#[derive(Debug)]
pub struct SharedQueue<T> {
    inner: Mutex<VecDeque<(T, usize)>>,
}

impl<T> SharedQueue<T> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(VecDeque::new()),
        }
    }

    /// Push a payload tagged with the sending island's rank
    pub fn push(&self, payload: T, source_rank: usize) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back((payload, source_rank));
    }

    /// Pop the oldest entry, `None` if the queue is empty.
    ///
    /// The pipeline drains with `while let Some(..) = queue.pop()`, so an
    /// empty queue is never an error here.
    pub fn pop(&self) -> Option<(T, usize)> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
    }

    /// Number of queued entries
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_empty()
    }
}

impl<T> Default for SharedQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
