//! Invalidation hook for reactive hosts.

/// Receives a signal after every state-changing history operation.
///
/// The controller calls [`history_changed`](Self::history_changed)
/// only once all internal pointer and size updates for an operation
/// are complete, so an observer never sees the history mid-mutation.
/// Boundary no-ops (undo at the oldest entry, a write equal to the
/// current value, and so on) do not signal.
///
/// How the signal fans out is the host's business: re-render a view,
/// push into a channel, bump a dirty flag. Any `FnMut(usize)` closure
/// works directly.
pub trait HistoryObserver {
    /// Called with the post-operation history length.
    fn history_changed(&mut self, len: usize);
}

impl<F: FnMut(usize)> HistoryObserver for F {
    fn history_changed(&mut self, len: usize) {
        self(len)
    }
}
