//! History controller: the public undo/redo surface.
//!
//! Wraps a [`SnapshotChain`] and layers on equality-based write
//! suppression, transition callbacks, and the host invalidation hook.

use crate::chain::{Iter, SnapshotChain};
use crate::config::{EqualsFn, HistoryConfig};
use crate::observer::HistoryObserver;

/// Transition callback, invoked with `(new_current, origin)` after the
/// cursor has already moved.
pub type TransitionFn<T> = Box<dyn Fn(&T, &T)>;

/// Which transition a callback listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackKind {
    Undo,
    Redo,
}

/// Handle to a registered callback, used to remove it later.
///
/// Boxed closures are not comparable, so registration hands out an
/// opaque id instead of removing by function instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(u64);

/// Bounded undo/redo history over a single value.
///
/// The history is either *empty* (no value yet, nothing to step
/// through) or *populated*; every operation on a boundary degrades to
/// a no-op rather than failing. All operations run in O(1) apart from
/// the write that prunes a forward branch, which is O(steps undone).
///
/// ```
/// use rewind_core::History;
///
/// let mut history = History::new(1);
/// history.set(2);
/// history.undo();
/// assert_eq!(history.value(), Some(&1));
/// history.redo();
/// assert_eq!(history.value(), Some(&2));
/// ```
pub struct History<T> {
    chain: SnapshotChain<T>,
    equals: EqualsFn<T>,
    /// Steps undone since the last divergent write; mirrors the length
    /// of the chain's forward branch.
    pending_redo: usize,
    undo_callbacks: Vec<(CallbackId, TransitionFn<T>)>,
    redo_callbacks: Vec<(CallbackId, TransitionFn<T>)>,
    next_callback_id: u64,
    observer: Option<Box<dyn HistoryObserver>>,
}

impl<T: PartialEq + 'static> History<T> {
    /// Creates a history seeded with an initial value.
    pub fn new(initial: T) -> Self {
        Self::with_config(Some(initial), HistoryConfig::new())
    }

    /// Creates an empty history; the first write populates it.
    pub fn empty() -> Self {
        Self::with_config(None, HistoryConfig::new())
    }

    /// Creates a history from an optional initial value and a config.
    pub fn with_config(initial: Option<T>, config: HistoryConfig<T>) -> Self {
        let HistoryConfig {
            capacity,
            equals,
            on_undo,
            on_redo,
        } = config;

        let chain = match initial {
            Some(value) => SnapshotChain::with_initial(value, capacity),
            None => SnapshotChain::new(capacity),
        };

        let mut history = Self {
            chain,
            equals: equals.unwrap_or_else(|| Box::new(|a: &T, b: &T| a == b)),
            pending_redo: 0,
            undo_callbacks: Vec::new(),
            redo_callbacks: Vec::new(),
            next_callback_id: 0,
            observer: None,
        };
        if let Some(callback) = on_undo {
            let id = history.next_id();
            history.undo_callbacks.push((id, callback));
        }
        if let Some(callback) = on_redo {
            let id = history.next_id();
            history.redo_callbacks.push((id, callback));
        }
        history
    }
}

impl<T> History<T> {
    /// Current value, or `None` while the history is empty.
    pub fn value(&self) -> Option<&T> {
        self.chain.current()
    }

    /// Writes a value.
    ///
    /// A value equal to the current one (per the configured predicate)
    /// is discarded without touching the history. A distinct value
    /// prunes any forward branch, becomes the new current snapshot,
    /// and may evict the oldest snapshot when the history is full.
    ///
    /// Returns the value that is current after the write.
    pub fn set(&mut self, value: T) -> &T {
        let suppressed = match self.chain.current() {
            Some(current) => (self.equals)(current, &value),
            None => false,
        };

        if !suppressed {
            let undone = self.pending_redo;
            self.pending_redo = 0;
            let pruned = self.chain.append(value);
            debug_assert_eq!(
                pruned, undone,
                "pending redo count drifted from the forward-chain length"
            );
            self.notify();
        }

        self.chain
            .current()
            .expect("history holds a value after a write")
    }

    /// Writes the value produced by `f` from the current value.
    ///
    /// `f` receives `None` while the history is empty. The result goes
    /// through the same suppression as [`set`](Self::set).
    pub fn update(&mut self, f: impl FnOnce(Option<&T>) -> T) -> &T {
        let next = f(self.chain.current());
        self.set(next)
    }

    /// Steps back to the previous snapshot.
    ///
    /// Undo callbacks run synchronously after the move, each receiving
    /// `(new_current, origin)`. Returns `false` without firing
    /// anything when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        if !self.chain.step_back() {
            return false;
        }
        self.pending_redo += 1;

        let current = self.chain.current().expect("cursor set after stepping back");
        let origin = self
            .chain
            .peek_forward()
            .expect("origin snapshot remains ahead of the cursor");
        for (_, callback) in &self.undo_callbacks {
            callback(current, origin);
        }

        self.notify();
        true
    }

    /// Steps forward to the next snapshot.
    ///
    /// The mirror of [`undo`](Self::undo): redo callbacks receive
    /// `(new_current, origin)`; returns `false` when there is nothing
    /// to redo.
    pub fn redo(&mut self) -> bool {
        if !self.chain.step_forward() {
            return false;
        }
        debug_assert!(self.pending_redo > 0, "redo without a pending undo step");
        self.pending_redo = self.pending_redo.saturating_sub(1);

        let current = self
            .chain
            .current()
            .expect("cursor set after stepping forward");
        let origin = self
            .chain
            .peek_back()
            .expect("origin snapshot remains behind the cursor");
        for (_, callback) in &self.redo_callbacks {
            callback(current, origin);
        }

        self.notify();
        true
    }

    /// Clears the history.
    ///
    /// By default the current value survives as the sole snapshot;
    /// with `clear_current` the history ends up empty.
    pub fn clear(&mut self, clear_current: bool) {
        self.chain.reset(!clear_current);
        self.pending_redo = 0;
        self.notify();
    }

    /// Tears the controller down: drops every callback and the
    /// observer, and clears the history including the current value.
    pub fn dispose(&mut self) {
        self.undo_callbacks.clear();
        self.redo_callbacks.clear();
        self.observer = None;
        self.clear(true);
    }

    pub fn can_undo(&self) -> bool {
        self.chain.can_step_back()
    }

    pub fn can_redo(&self) -> bool {
        self.chain.can_step_forward()
    }

    /// Number of retained snapshots.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Maximum number of retained snapshots.
    pub fn capacity(&self) -> usize {
        self.chain.capacity()
    }

    /// Iterates the retained snapshots from oldest to newest.
    ///
    /// Each call produces a fresh iterator over the live history.
    pub fn iter(&self) -> Iter<'_, T> {
        self.chain.iter()
    }

    /// Copies the retained history into a `Vec`, oldest first.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    /// Registers a transition callback for the given kind.
    ///
    /// Callbacks of a kind all fire on each matching transition, in no
    /// guaranteed order. The returned id removes this registration.
    pub fn register_callback(
        &mut self,
        kind: CallbackKind,
        callback: impl Fn(&T, &T) + 'static,
    ) -> CallbackId {
        let id = self.next_id();
        self.callbacks_mut(kind).push((id, Box::new(callback)));
        id
    }

    /// Removes a previously registered callback. Unknown ids are a
    /// no-op.
    pub fn remove_callback(&mut self, kind: CallbackKind, id: CallbackId) {
        self.callbacks_mut(kind).retain(|(existing, _)| *existing != id);
    }

    /// Installs the host invalidation hook, replacing any previous
    /// one. See [`HistoryObserver`].
    pub fn set_observer(&mut self, observer: impl HistoryObserver + 'static) {
        self.observer = Some(Box::new(observer));
    }

    fn next_id(&mut self) -> CallbackId {
        let id = CallbackId(self.next_callback_id);
        self.next_callback_id += 1;
        id
    }

    fn callbacks_mut(&mut self, kind: CallbackKind) -> &mut Vec<(CallbackId, TransitionFn<T>)> {
        match kind {
            CallbackKind::Undo => &mut self.undo_callbacks,
            CallbackKind::Redo => &mut self.redo_callbacks,
        }
    }

    fn notify(&mut self) {
        let len = self.chain.len();
        if let Some(observer) = self.observer.as_mut() {
            observer.history_changed(len);
        }
    }
}

impl<T> std::fmt::Debug for History<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("History")
            .field("len", &self.chain.len())
            .field("capacity", &self.chain.capacity())
            .field("can_undo", &self.can_undo())
            .field("can_redo", &self.can_redo())
            .field("pending_redo", &self.pending_redo)
            .field("undo_callbacks", &self.undo_callbacks.len())
            .field("redo_callbacks", &self.redo_callbacks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Shared recorder standing in for a host-side callback.
    fn recorder() -> (Rc<RefCell<Vec<(i32, i32)>>>, impl Fn(&i32, &i32)) {
        let calls: Rc<RefCell<Vec<(i32, i32)>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        (calls, move |current: &i32, origin: &i32| {
            sink.borrow_mut().push((*current, *origin));
        })
    }

    #[test]
    fn test_initial_state() {
        let history = History::new(1);
        assert_eq!(history.value(), Some(&1));
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_empty_state() {
        let history: History<i32> = History::empty();
        assert_eq!(history.value(), None);
        assert_eq!(history.len(), 0);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_set_and_update() {
        let mut history = History::new(1);
        assert_eq!(history.set(2), &2);
        assert_eq!(history.update(|v| v.copied().unwrap_or(0) + 2), &4);
        assert_eq!(history.len(), 3);
        assert!(history.can_undo());
    }

    #[test]
    fn test_first_write_populates_empty_history() {
        let mut history = History::empty();
        assert_eq!(history.set(1), &1);
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_equal_write_is_suppressed() {
        let mut history = History::new(1);
        assert_eq!(history.set(1), &1);
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_custom_equality_predicate() {
        let mut history = History::with_config(
            Some("123".to_string()),
            HistoryConfig::new().equals(|a: &String, b: &String| a.chars().next() == b.chars().next()),
        );

        history.set("12355".to_string());
        assert_eq!(history.value().map(String::as_str), Some("123"));
        assert!(!history.can_undo());
    }

    #[test]
    fn test_keep_equal_values() {
        let mut history =
            History::with_config(Some(1), HistoryConfig::new().capacity(2).keep_equal_values());

        history.set(1);
        history.set(1);
        history.set(1);
        assert_eq!(history.to_vec(), vec![1, 1]);
        assert!(history.can_undo());
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut history = History::new(1);
        history.set(2);
        let len_after_write = history.len();

        assert!(history.undo());
        assert_eq!(history.value(), Some(&1));
        assert!(history.redo());
        assert_eq!(history.value(), Some(&2));
        assert_eq!(history.len(), len_after_write);
    }

    #[test]
    fn test_boundary_undo_redo_are_noops() {
        let mut history = History::new(1);
        assert!(!history.undo());
        assert!(!history.redo());
        assert_eq!(history.value(), Some(&1));
    }

    #[test]
    fn test_write_after_undo_prunes_redo_branch() {
        let mut history = History::new(0);
        history.set(1);
        history.set(2);
        history.undo();

        history.set(3);
        assert!(!history.can_redo());
        assert_eq!(history.to_vec(), vec![0, 1, 3]);
    }

    #[test]
    fn test_eviction_at_capacity() {
        let mut history = History::with_config(Some(1), HistoryConfig::new().capacity(3));
        history.set(2);
        history.set(3);
        history.set(4);
        assert_eq!(history.len(), 3);
        assert_eq!(history.to_vec(), vec![2, 3, 4]);
    }

    #[test]
    fn test_prune_and_evict_in_same_write() {
        // Fill to capacity, step back twice, then diverge. Pruning
        // empties two forward slots, so the divergent write must fit
        // without evicting the head.
        let mut history = History::with_config(Some(1), HistoryConfig::new().capacity(3));
        history.set(2);
        history.set(3);
        history.undo();
        history.undo();

        history.set(9);
        assert_eq!(history.len(), 2);
        assert_eq!(history.to_vec(), vec![1, 9]);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_callback_arguments() {
        let mut history = History::new(1);
        let (undo_calls, on_undo) = recorder();
        let (redo_calls, on_redo) = recorder();
        history.register_callback(CallbackKind::Undo, on_undo);
        history.register_callback(CallbackKind::Redo, on_redo);

        history.set(2);
        history.undo();
        assert_eq!(undo_calls.borrow().as_slice(), &[(1, 2)]);

        history.redo();
        assert_eq!(redo_calls.borrow().as_slice(), &[(2, 1)]);
    }

    #[test]
    fn test_callbacks_silent_on_boundary() {
        let mut history = History::new(1);
        let (undo_calls, on_undo) = recorder();
        let (redo_calls, on_redo) = recorder();
        history.register_callback(CallbackKind::Undo, on_undo);
        history.register_callback(CallbackKind::Redo, on_redo);

        history.undo();
        history.redo();
        assert!(undo_calls.borrow().is_empty());
        assert!(redo_calls.borrow().is_empty());
    }

    #[test]
    fn test_remove_callback() {
        let mut history = History::new(1);
        let (calls, on_undo) = recorder();
        let id = history.register_callback(CallbackKind::Undo, on_undo);

        history.set(2);
        history.undo();
        assert_eq!(calls.borrow().len(), 1);

        history.remove_callback(CallbackKind::Undo, id);
        history.redo();
        history.undo();
        assert_eq!(calls.borrow().len(), 1);

        // Removing again is a no-op.
        history.remove_callback(CallbackKind::Undo, id);
    }

    #[test]
    fn test_constructor_callbacks() {
        let (undo_calls, on_undo) = recorder();
        let (redo_calls, on_redo) = recorder();
        let mut history = History::with_config(
            Some(1),
            HistoryConfig::new().on_undo(on_undo).on_redo(on_redo),
        );

        history.set(2);
        history.undo();
        history.redo();
        assert_eq!(undo_calls.borrow().as_slice(), &[(1, 2)]);
        assert_eq!(redo_calls.borrow().as_slice(), &[(2, 1)]);
    }

    #[test]
    fn test_clear_keeps_current_by_default() {
        let mut history = History::new(1);
        history.set(2);
        history.clear(false);

        assert_eq!(history.value(), Some(&2));
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_clear_current_empties_history() {
        let mut history = History::new(1);
        history.set(2);
        history.clear(true);

        assert_eq!(history.value(), None);
        assert_eq!(history.len(), 0);

        history.set(1);
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_clear_empty_history_stays_empty() {
        let mut history: History<i32> = History::empty();
        history.clear(false);
        assert_eq!(history.len(), 0);
    }

    #[test]
    fn test_dispose_silences_callbacks_and_empties() {
        let mut history = History::empty();
        let (undo_calls, on_undo) = recorder();
        let (redo_calls, on_redo) = recorder();
        history.register_callback(CallbackKind::Undo, on_undo);
        history.register_callback(CallbackKind::Redo, on_redo);

        history.set(1);
        history.set(2);
        history.undo();
        history.redo();
        assert_eq!(undo_calls.borrow().len(), 1);
        assert_eq!(redo_calls.borrow().len(), 1);

        history.dispose();
        history.undo();
        history.redo();
        assert_eq!(undo_calls.borrow().len(), 1);
        assert_eq!(redo_calls.borrow().len(), 1);
        assert_eq!(history.len(), 0);
    }

    #[test]
    fn test_observer_fires_once_per_mutation() {
        let mut history = History::new(1);
        let lens: Rc<RefCell<Vec<usize>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&lens);
        history.set_observer(move |len: usize| sink.borrow_mut().push(len));

        history.set(2); // len 2
        history.set(2); // suppressed, silent
        history.undo(); // len still 2
        history.undo(); // boundary, silent
        history.set(9); // branch pruned, len 2
        history.clear(false); // len 1

        assert_eq!(lens.borrow().as_slice(), &[2, 2, 2, 1]);
    }

    #[test]
    fn test_pending_redo_rebuilds_after_clear() {
        let mut history = History::new(1);
        history.set(2);
        history.undo();
        history.clear(false);

        // The pending undo step must not leak into the next write.
        history.set(5);
        assert_eq!(history.len(), 2);
        assert_eq!(history.to_vec(), vec![1, 5]);
    }

    #[test]
    fn test_len_never_exceeds_capacity() {
        let mut history = History::with_config(Some(0), HistoryConfig::new().capacity(4));
        for i in 1..50 {
            history.set(i);
            if i % 3 == 0 {
                history.undo();
            }
            assert!(history.len() <= history.capacity());
        }
    }
}
