//! # Serialized Shared Access
//!
//! Gate and registry calls are meant to run one at a time, each to
//! completion, as if the whole system sat behind a single lock. Within one
//! thread `&mut self` already guarantees that. [`Shared`] extends it across
//! threads: every call runs inside one `parking_lot::Mutex`, so a
//! check-then-commit such as [`AccessGate::admit_deposit`] can never
//! interleave with another and pass a cap check against a stale total.
//!
//! [`AccessGate::admit_deposit`]: crate::access_gate::AccessGate::admit_deposit

use std::sync::Arc;

use parking_lot::Mutex;

use crate::access_gate::AccessGate;
use crate::registry::Registry;

/// A cloneable handle that serializes every call on the wrapped value.
#[derive(Debug)]
pub struct Shared<T> {
    inner: Arc<Mutex<T>>,
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Shared<T> {
    /// Wraps `value`.
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(value)),
        }
    }

    /// Runs `f` with exclusive access. No other call observes the value
    /// until `f` returns.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut *guard)
    }

    /// Runs a read-only `f`. Reads are serialized with writes too.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.inner.lock();
        f(&*guard)
    }
}

/// A gate shared between threads.
pub type SharedGate = Shared<AccessGate>;

/// A registry shared between threads.
pub type SharedRegistry = Shared<Registry>;
