//! Observable value cells.

use std::sync::Arc;

use tokio::sync::watch;

/// An observable value with subscribe/update semantics.
///
/// Cloning a store clones the handle: both clones see the same value.
/// Subscribers are only woken when the value actually changes.
#[derive(Debug)]
pub struct Store<T> {
    tx: Arc<watch::Sender<T>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T: Clone + PartialEq> Store<T> {
    /// Creates a store holding `value`.
    pub fn new(value: T) -> Self {
        let (tx, _rx) = watch::channel(value);
        Self { tx: Arc::new(tx) }
    }

    /// Returns a copy of the current value.
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Reads the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// Replaces the value, notifying subscribers if it changed.
    pub fn set(&self, value: T) {
        self.tx.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }

    /// Mutates the value in place, notifying subscribers if it changed.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.tx.send_if_modified(|current| {
            let before = current.clone();
            f(current);
            *current != before
        });
    }

    /// Subscribes to changes.
    ///
    /// The receiver starts out having seen the current value.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

impl<T: Clone + PartialEq + Default> Default for Store<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
