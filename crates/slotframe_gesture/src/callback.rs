//! Stable-identity callbacks that always run the latest handler.
//!
//! The recognizer graph lives on the gesture thread for the whole lifetime of
//! an element and must not be rebuilt whenever the application swaps out its
//! handlers. [`LatestCallback`] splits the two concerns:
//!
//! - *identity*: the shared cell, created once and cloned into whoever needs
//!   to call it;
//! - *behavior*: the boxed closure inside the cell, replaced by the
//!   application as often as it likes.
//!
//! A caller holding an old clone therefore never runs a handler that closed
//! over state from an earlier render.
//!
//! # Examples
//!
//! ```
//! use slotframe_gesture::LatestCallback;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::sync::Arc;
//!
//! let hits = Arc::new(AtomicU32::new(0));
//! let on_select: LatestCallback<u32> = LatestCallback::new();
//! let held_by_gesture_thread = on_select.clone();
//!
//! let first = Arc::clone(&hits);
//! on_select.set(move |v| { first.fetch_add(v, Ordering::SeqCst); });
//! let second = Arc::clone(&hits);
//! on_select.set(move |v| { second.fetch_add(v * 10, Ordering::SeqCst); });
//!
//! assert!(held_by_gesture_thread.call(1));
//! assert_eq!(hits.load(Ordering::SeqCst), 10);
//! assert!(held_by_gesture_thread.ptr_eq(&on_select));
//! ```

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

type Handler<T> = Box<dyn Fn(T) + Send + Sync>;

/// A shared, replaceable handler with a stable identity.
///
/// Cloning shares the same cell, so every clone observes [`set`](Self::set)
/// immediately. A handler must not call `set` or `clear` on its own cell.
pub struct LatestCallback<T> {
    cell: Arc<RwLock<Option<Handler<T>>>>,
}

impl<T> LatestCallback<T> {
    /// Create an empty callback (no handler yet).
    pub fn new() -> Self {
        Self {
            cell: Arc::new(RwLock::new(None)),
        }
    }

    /// Create a callback with an initial handler.
    pub fn with<F>(f: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        let callback = Self::new();
        callback.set(f);
        callback
    }

    /// Replace the behavior. Identity is unchanged.
    pub fn set<F>(&self, f: F)
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        *self.cell.write() = Some(Box::new(f));
    }

    /// Remove the behavior; later calls become no-ops.
    pub fn clear(&self) {
        *self.cell.write() = None;
    }

    /// Invoke the current handler. Returns `false` when none is installed.
    pub fn call(&self, value: T) -> bool {
        match self.cell.read().as_ref() {
            Some(f) => {
                f(value);
                true
            }
            None => false,
        }
    }

    /// Check if a handler is installed.
    pub fn is_set(&self) -> bool {
        self.cell.read().is_some()
    }

    /// Whether two callbacks share the same identity.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}

impl<T> Default for LatestCallback<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for LatestCallback<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T> fmt::Debug for LatestCallback<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LatestCallback")
            .field("set", &self.is_set())
            .finish()
    }
}

/// A latest-handler callback that takes no parameters.
pub type LatestCallback0 = LatestCallback<()>;

impl LatestCallback0 {
    /// Invoke without a value. Equivalent to `call(())`.
    pub fn emit(&self) -> bool {
        self.call(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_empty_callback_is_noop() {
        let cb: LatestCallback<u8> = LatestCallback::new();
        assert!(!cb.is_set());
        assert!(!cb.call(3));
    }

    #[test]
    fn test_replacement_visible_through_old_clone() {
        let seen = Arc::new(AtomicUsize::new(0));
        let cb: LatestCallback<usize> = LatestCallback::new();
        let old_clone = cb.clone();

        for render in 1..=5 {
            let seen = Arc::clone(&seen);
            // Every "render" installs a closure capturing fresh state.
            cb.set(move |v| seen.store(v * render, Ordering::SeqCst));
        }

        assert!(old_clone.call(2));
        assert_eq!(seen.load(Ordering::SeqCst), 10);
        assert!(old_clone.ptr_eq(&cb));
    }

    #[test]
    fn test_clear_disables_handler() {
        let cb = LatestCallback0::with(|_| {});
        assert!(cb.emit());
        cb.clear();
        assert!(!cb.emit());
    }

    #[test]
    fn test_call_from_other_thread() {
        let seen = Arc::new(AtomicUsize::new(0));
        let cb: LatestCallback<usize> = LatestCallback::new();
        let seen_clone = Arc::clone(&seen);
        cb.set(move |v| {
            seen_clone.fetch_add(v, Ordering::SeqCst);
        });

        let remote = cb.clone();
        let handle = thread::spawn(move || remote.call(7));
        assert!(handle.join().unwrap());
        assert_eq!(seen.load(Ordering::SeqCst), 7);
    }

    #[test]
    fn test_distinct_callbacks_have_distinct_identity() {
        let a: LatestCallback<()> = LatestCallback::new();
        let b: LatestCallback<()> = LatestCallback::new();
        assert!(!a.ptr_eq(&b));
    }
}
