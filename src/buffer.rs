//! Bounded buffer shared between the producer and the workers
//!
//! The buffer holds at most `capacity` items. The producer signals that no
//! more items will arrive with [`BoundedBuffer::finish`]; once the buffer is
//! finished and drained every pop reports [`Pop::Closed`].
//!
//! Two access styles are offered:
//!
//! * [`try_push`](BoundedBuffer::try_push) / [`try_pop`](BoundedBuffer::try_pop)
//!   never block. A full buffer hands the item back and an empty, unfinished
//!   buffer reports [`Pop::Empty`].
//! * [`push`](BoundedBuffer::push) / [`pop`](BoundedBuffer::pop) wait on a
//!   condition variable until they can make progress. `pop` never reports
//!   [`Pop::Empty`].
//!
//! Consumers may register through [`BoundedBuffer::consumer`]. Once every
//! registered [`Consumer`] has been dropped before the buffer was finished, the
//! buffer is abandoned: pushes fail with [`PushError::Abandoned`] instead of
//! waiting for space that will never free up.

use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};

use crate::{ConfigError, Result};

/// Outcome of a pop from a [`BoundedBuffer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pop<T> {
    /// An item was removed from the buffer
    Item(T),
    /// Nothing is available yet but the producer is still running
    ///
    /// Transient: callers should retry.
    Empty,
    /// Nothing is available and the producer has finished
    ///
    /// Permanent: every later pop reports `Closed` as well.
    Closed,
}
impl<T> Pop<T> {
    /// Returns true for the terminal [`Pop::Closed`] outcome
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Returns the popped item, or `None` for [`Pop::Empty`] and [`Pop::Closed`]
    pub fn into_item(self) -> Option<T> {
        match self {
            Self::Item(item) => Some(item),
            _ => None,
        }
    }
}

/// A rejected push, handing the item back to the caller
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PushError<T> {
    /// The buffer is at capacity
    ///
    /// Transient: only returned by [`BoundedBuffer::try_push`].
    #[error("Bounded buffer is full")]
    Full(T),

    /// Every registered consumer is gone and the buffer was never finished
    ///
    /// Permanent: no pop will ever free space again.
    #[error("Bounded buffer has no consumers left")]
    Abandoned(T),
}
impl<T> PushError<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Full(item) | Self::Abandoned(item) => item,
        }
    }
}

#[derive(Debug)]
struct State<T> {
    items: VecDeque<T>,
    finished: bool,

    /// Number of live [`Consumer`] handles
    consumers: usize,

    /// Set when the last consumer left an unfinished buffer
    abandoned: bool,
}

/// Thread-safe bounded FIFO with producer-completion signalling
#[derive(Debug)]
pub struct BoundedBuffer<T> {
    state: Mutex<State<T>>,

    /// Signalled when an item is pushed or the buffer is finished
    not_empty: Condvar,

    /// Signalled when an item is popped, or the buffer is finished or abandoned
    not_full: Condvar,

    capacity: usize,
}
impl<T> BoundedBuffer<T> {
    /// Creates an empty buffer holding at most `capacity` items
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroCapacity`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity.into());
        }
        Ok(Self {
            state: Mutex::new(State {
                items: VecDeque::with_capacity(capacity),
                finished: false,
                consumers: 0,
                abandoned: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.state.lock().finished
    }

    pub fn is_abandoned(&self) -> bool {
        self.state.lock().abandoned
    }

    /// Registers a consumer of this buffer
    ///
    /// Register consumers before the producer starts pushing: the buffer is
    /// abandoned when the last registered consumer is dropped, including
    /// during a panic unwind.
    pub fn consumer(&self) -> Consumer<'_, T> {
        self.state.lock().consumers += 1;
        Consumer { buffer: self }
    }

    /// Attempts to add an item without blocking
    ///
    /// # Errors
    ///
    /// Returns [`PushError::Full`] if the buffer is at capacity and
    /// [`PushError::Abandoned`] if no consumer is left. Either way the item is
    /// handed back untouched.
    ///
    /// # Panics
    ///
    /// Panics if the buffer has already been finished.
    pub fn try_push(&self, item: T) -> std::result::Result<(), PushError<T>> {
        let mut state = self.state.lock();
        assert!(!state.finished, "push on a finished buffer");
        if state.abandoned {
            return Err(PushError::Abandoned(item));
        }
        if state.items.len() >= self.capacity {
            return Err(PushError::Full(item));
        }
        state.items.push_back(item);
        drop(state);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Adds an item, waiting while the buffer is full
    ///
    /// # Errors
    ///
    /// Returns [`PushError::Abandoned`] if no consumer is left, before or
    /// while waiting. Never returns [`PushError::Full`].
    ///
    /// # Panics
    ///
    /// Panics if the buffer is finished, before or while waiting.
    pub fn push(&self, item: T) -> std::result::Result<(), PushError<T>> {
        let mut state = self.state.lock();
        loop {
            assert!(!state.finished, "push on a finished buffer");
            if state.abandoned {
                return Err(PushError::Abandoned(item));
            }
            if state.items.len() < self.capacity {
                break;
            }
            self.not_full.wait(&mut state);
        }
        state.items.push_back(item);
        drop(state);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Removes the oldest item without blocking
    pub fn try_pop(&self) -> Pop<T> {
        let mut state = self.state.lock();
        let popped = state.items.pop_front();
        match popped {
            Some(item) => {
                drop(state);
                self.not_full.notify_one();
                Pop::Item(item)
            }
            None if state.finished => Pop::Closed,
            None => Pop::Empty,
        }
    }

    /// Removes the oldest item, waiting while the buffer is empty and unfinished
    ///
    /// Returns either [`Pop::Item`] or [`Pop::Closed`].
    pub fn pop(&self) -> Pop<T> {
        let mut state = self.state.lock();
        loop {
            if let Some(item) = state.items.pop_front() {
                drop(state);
                self.not_full.notify_one();
                return Pop::Item(item);
            }
            if state.finished {
                return Pop::Closed;
            }
            self.not_empty.wait(&mut state);
        }
    }

    /// Marks the producer side as complete
    ///
    /// Items still held remain poppable. Calling this more than once has no
    /// further effect.
    pub fn finish(&self) {
        self.state.lock().finished = true;
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    fn release_consumer(&self) {
        let mut state = self.state.lock();
        state.consumers -= 1;
        if state.consumers == 0 && !state.finished {
            state.abandoned = true;
            drop(state);
            self.not_full.notify_all();
        }
    }
}

/// Registered consumer handle of a [`BoundedBuffer`]
///
/// Dropping the last handle of an unfinished buffer abandons it.
#[derive(Debug)]
pub struct Consumer<'a, T> {
    buffer: &'a BoundedBuffer<T>,
}
impl<T> Consumer<'_, T> {
    /// See [`BoundedBuffer::try_pop`]
    pub fn try_pop(&self) -> Pop<T> {
        self.buffer.try_pop()
    }

    /// See [`BoundedBuffer::pop`]
    pub fn pop(&self) -> Pop<T> {
        self.buffer.pop()
    }
}
impl<T> Drop for Consumer<'_, T> {
    fn drop(&mut self) {
        self.buffer.release_consumer();
    }
}
