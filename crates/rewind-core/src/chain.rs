//! Arena-backed snapshot chain.
//!
//! Snapshots live in index-addressed slots with explicit `prev`/`next`
//! links, so the chain behaves like a doubly-linked list without any
//! reference surgery: eviction advances the head index, pruning walks
//! `next` links and releases slots back to a free list.

use crate::config::DEFAULT_CAPACITY;

/// One retained snapshot plus its neighbor links.
struct Slot<T> {
    value: T,
    prev: Option<usize>,
    next: Option<usize>,
}

/// A bounded, cursor-navigable chain of value snapshots.
///
/// The cursor marks the current position. Appending past the capacity
/// evicts the oldest snapshot instead of growing, which keeps every
/// operation O(1) with a hard memory ceiling.
///
/// A chain may hold zero snapshots (no cursor); stepping and peeking
/// degrade to no-ops in that state. A vacant slot reached through a
/// live link is corrupted state and panics.
pub struct SnapshotChain<T> {
    slots: Vec<Option<Slot<T>>>,
    /// Recycled slot indices, reused before growing `slots`.
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    cursor: Option<usize>,
    len: usize,
    capacity: usize,
}

impl<T> SnapshotChain<T> {
    /// Creates an empty chain.
    ///
    /// A zero capacity is invalid and falls back to the default with a
    /// warning; construction still succeeds.
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            tracing::warn!(
                "history capacity must be positive, falling back to default of {DEFAULT_CAPACITY}"
            );
            DEFAULT_CAPACITY
        } else {
            capacity
        };

        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            cursor: None,
            len: 0,
            capacity,
        }
    }

    /// Creates a chain holding a single initial snapshot.
    pub fn with_initial(value: T, capacity: usize) -> Self {
        let mut chain = Self::new(capacity);
        chain.append(value);
        chain
    }

    /// Number of retained snapshots.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum number of retained snapshots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Value at the cursor, or `None` for an empty chain.
    pub fn current(&self) -> Option<&T> {
        self.cursor.map(|c| &self.slot(c).value)
    }

    /// Value one step behind the cursor, if any.
    pub fn peek_back(&self) -> Option<&T> {
        self.cursor
            .and_then(|c| self.slot(c).prev)
            .map(|p| &self.slot(p).value)
    }

    /// Value one step ahead of the cursor, if any.
    pub fn peek_forward(&self) -> Option<&T> {
        self.cursor
            .and_then(|c| self.slot(c).next)
            .map(|n| &self.slot(n).value)
    }

    pub fn can_step_back(&self) -> bool {
        self.cursor.is_some_and(|c| self.slot(c).prev.is_some())
    }

    pub fn can_step_forward(&self) -> bool {
        self.cursor.is_some_and(|c| self.slot(c).next.is_some())
    }

    /// Appends a snapshot after the cursor and makes it the new cursor
    /// and tail.
    ///
    /// Any forward branch (snapshots ahead of the cursor, left over
    /// from earlier steps back) is pruned first; those snapshots are
    /// permanently gone. If the chain is full after pruning, the head
    /// is evicted instead of growing `len`.
    ///
    /// Returns the number of snapshots pruned.
    pub fn append(&mut self, value: T) -> usize {
        let Some(cursor) = self.cursor else {
            // First snapshot: becomes head, tail, and cursor at once.
            let idx = self.alloc(Slot {
                value,
                prev: None,
                next: None,
            });
            self.head = Some(idx);
            self.tail = Some(idx);
            self.cursor = Some(idx);
            self.len = 1;
            return 0;
        };

        let pruned = self.prune_forward();

        let idx = self.alloc(Slot {
            value,
            prev: Some(cursor),
            next: None,
        });
        self.slot_mut(cursor).next = Some(idx);
        self.cursor = Some(idx);
        self.tail = Some(idx);

        if self.len + 1 > self.capacity {
            // At capacity the chain holds at least two snapshots here,
            // so the head always has a successor to advance to.
            self.evict_head();
        } else {
            self.len += 1;
        }

        pruned
    }

    /// Detaches and releases every snapshot ahead of the cursor.
    ///
    /// The cursor becomes the tail. Returns the number of snapshots
    /// released; zero for an empty chain or a cursor already at the
    /// tail.
    pub fn prune_forward(&mut self) -> usize {
        let Some(cursor) = self.cursor else {
            return 0;
        };

        let mut walk = self.slot_mut(cursor).next.take();
        self.tail = Some(cursor);

        let mut pruned = 0;
        while let Some(idx) = walk {
            walk = self.release(idx).next;
            pruned += 1;
        }

        self.len -= pruned;
        pruned
    }

    /// Moves the cursor one step toward the head.
    ///
    /// Returns `false` (and leaves the cursor in place) when already
    /// at the oldest snapshot or the chain is empty.
    pub fn step_back(&mut self) -> bool {
        match self.cursor.and_then(|c| self.slot(c).prev) {
            Some(prev) => {
                self.cursor = Some(prev);
                true
            }
            None => false,
        }
    }

    /// Moves the cursor one step toward the tail.
    ///
    /// Returns `false` when already at the newest snapshot or the
    /// chain is empty.
    pub fn step_forward(&mut self) -> bool {
        match self.cursor.and_then(|c| self.slot(c).next) {
            Some(next) => {
                self.cursor = Some(next);
                true
            }
            None => false,
        }
    }

    /// Replaces the whole chain with at most one snapshot.
    ///
    /// With `keep_current` the cursor's value survives as the sole
    /// snapshot (`len` 1); otherwise, or when the chain was already
    /// empty, the chain ends up empty (`len` 0).
    pub fn reset(&mut self, keep_current: bool) {
        let kept = if keep_current {
            self.cursor
                .and_then(|c| self.slots[c].take())
                .map(|slot| slot.value)
        } else {
            None
        };

        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.cursor = None;
        self.len = 0;

        if let Some(value) = kept {
            self.append(value);
        }
    }

    /// Iterates the retained snapshots from oldest to newest.
    ///
    /// Each call starts fresh from the live head, so the iterator
    /// reflects the chain as of the call, not of some earlier moment.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            chain: self,
            next: self.head,
        }
    }

    /// Drops the head snapshot and advances the head link.
    fn evict_head(&mut self) {
        let head = self.head.expect("evicting from an empty chain");
        let next = self
            .slot(head)
            .next
            .expect("evicting the only retained snapshot");
        self.slot_mut(next).prev = None;
        self.head = Some(next);
        self.release(head);
    }

    fn alloc(&mut self, slot: Slot<T>) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(slot);
                idx
            }
            None => {
                self.slots.push(Some(slot));
                self.slots.len() - 1
            }
        }
    }

    fn release(&mut self, idx: usize) -> Slot<T> {
        let slot = self.slots[idx]
            .take()
            .expect("releasing a vacant snapshot slot");
        self.free.push(idx);
        slot
    }

    fn slot(&self, idx: usize) -> &Slot<T> {
        self.slots[idx]
            .as_ref()
            .expect("linked snapshot slot is vacant")
    }

    fn slot_mut(&mut self, idx: usize) -> &mut Slot<T> {
        self.slots[idx]
            .as_mut()
            .expect("linked snapshot slot is vacant")
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for SnapshotChain<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotChain")
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .field("current", &self.current())
            .finish()
    }
}

/// Chronological (head to tail) iterator over a [`SnapshotChain`].
pub struct Iter<'a, T> {
    chain: &'a SnapshotChain<T>,
    next: Option<usize>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let idx = self.next?;
        let slot = self.chain.slot(idx);
        self.next = slot.next;
        Some(&slot.value)
    }
}

impl<'a, T> IntoIterator for &'a SnapshotChain<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}
