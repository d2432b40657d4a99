//! Configuration for the history controller.

use crate::controller::TransitionFn;

/// Fallback capacity when none (or an invalid one) is configured.
pub const DEFAULT_CAPACITY: usize = 100;

/// Equality predicate deciding whether a write is a no-op.
pub type EqualsFn<T> = Box<dyn Fn(&T, &T) -> bool>;

/// Builder-style configuration for [`History`](crate::History).
///
/// All fields are optional; an unconfigured `HistoryConfig` yields the
/// default capacity of 100 and `PartialEq`-based write suppression.
pub struct HistoryConfig<T> {
    /// Maximum number of retained snapshots. Zero is corrected to
    /// [`DEFAULT_CAPACITY`] at construction time.
    pub capacity: usize,
    pub(crate) equals: Option<EqualsFn<T>>,
    pub(crate) on_undo: Option<TransitionFn<T>>,
    pub(crate) on_redo: Option<TransitionFn<T>>,
}

impl<T> HistoryConfig<T> {
    pub fn new() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            equals: None,
            on_undo: None,
            on_redo: None,
        }
    }

    /// Sets the maximum number of retained snapshots.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Installs a custom equality predicate, replacing the default
    /// `PartialEq` comparison.
    pub fn equals(mut self, f: impl Fn(&T, &T) -> bool + 'static) -> Self {
        self.equals = Some(Box::new(f));
        self
    }

    /// Records every write, even one equal to the current value.
    pub fn keep_equal_values(self) -> Self
    where
        T: 'static,
    {
        self.equals(|_, _| false)
    }

    /// Registers an undo callback at construction time.
    ///
    /// Equivalent to calling
    /// [`register_callback`](crate::History::register_callback) with
    /// [`CallbackKind::Undo`](crate::CallbackKind::Undo) right after
    /// construction.
    pub fn on_undo(mut self, f: impl Fn(&T, &T) + 'static) -> Self {
        self.on_undo = Some(Box::new(f));
        self
    }

    /// Registers a redo callback at construction time.
    pub fn on_redo(mut self, f: impl Fn(&T, &T) + 'static) -> Self {
        self.on_redo = Some(Box::new(f));
        self
    }
}

impl<T> Default for HistoryConfig<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for HistoryConfig<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryConfig")
            .field("capacity", &self.capacity)
            .field("custom_equals", &self.equals.is_some())
            .field("on_undo", &self.on_undo.is_some())
            .field("on_redo", &self.on_redo.is_some())
            .finish()
    }
}
