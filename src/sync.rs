//! Thread-shareable callable references.
//!
//! [`FnRef`](crate::FnRef) carries a raw pointer and is deliberately neither
//! `Send` nor `Sync`: the erased callee's thread affinity is unknown to the
//! type system once its concrete type is gone. [`SyncFnRef`] restores
//! cross-thread use by demanding the affinity up front - it only binds
//! callees that are `Sync` - and is itself `Send + Sync + Copy`, so copies
//! can fan out to worker threads and be invoked concurrently.
//!
//! The wrapper adds no synchronization of its own: its two words are
//! read-only after binding, so concurrent invocation is data-race-free
//! exactly when the callee's `Sync` bound says it is.
//!
//! # Examples
//!
//! ```
//! use prometheus_fn_ref::SyncFnRef;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let hits = AtomicUsize::new(0);
//! let record = |weight: usize| {
//!     hits.fetch_add(weight, Ordering::Relaxed);
//! };
//! let view = SyncFnRef::new(&record);
//!
//! std::thread::scope(|scope| {
//!     for _ in 0..4 {
//!         scope.spawn(|| view.call((1,)));
//!     }
//! });
//! assert_eq!(hits.load(Ordering::Relaxed), 4);
//! ```

use std::fmt;

use crate::call::{Callable, FnPointer, Method};
use crate::fn_ref::FnRef;

/// A non-owning callable reference that may cross and be shared between
/// threads.
///
/// Construction requires the bound callee to be `Sync`; function pointers
/// qualify unconditionally. Rebinding a view concurrently with invocation is
/// not expressible: copies are independent two-word values, and replacing a
/// view in place needs `&mut`, which excludes concurrent readers.
///
/// A callee that is not `Sync` is rejected at compile time:
///
/// ```compile_fail
/// use prometheus_fn_ref::SyncFnRef;
/// use std::cell::Cell;
///
/// let counter = Cell::new(0);
/// let bump = |weight: i32| counter.set(counter.get() + weight);
/// let view = SyncFnRef::new(&bump);
/// ```
pub struct SyncFnRef<'a, Args, Ret> {
    inner: FnRef<'a, Args, Ret>,
}

// SAFETY: every constructor requires the bound callee to be `Sync` (function
// pointers are unconditionally `Send + Sync`), and invocation only ever forms
// a shared reference to it. Moving or sharing the two-word view across
// threads therefore cannot create unsynchronized access to the callee.
unsafe impl<Args, Ret> Send for SyncFnRef<'_, Args, Ret> {}

// SAFETY: as for `Send`; the view's own words are immutable after binding.
unsafe impl<Args, Ret> Sync for SyncFnRef<'_, Args, Ret> {}

impl<'a, Args, Ret> SyncFnRef<'a, Args, Ret> {
    /// Bind to a `Sync` invocable object by reference.
    pub fn new<F>(callee: &'a F) -> Self
    where
        F: Callable<Args, Output = Ret> + Sync,
    {
        Self {
            inner: FnRef::new(callee),
        }
    }

    /// Bind to a plain function pointer.
    pub fn from_fn<P>(pointer: P) -> Self
    where
        P: FnPointer<Args, Output = Ret>,
    {
        Self {
            inner: FnRef::from_fn(pointer),
        }
    }

    /// Bind a `Sync` receiver together with one of its methods.
    ///
    /// The same zero-size rule as
    /// [`FnRef::with_receiver`](crate::FnRef::with_receiver) applies to the
    /// method value.
    pub fn with_receiver<C, M>(receiver: &'a C, method: M) -> Self
    where
        C: Sync,
        M: Method<C, Args, Output = Ret> + Copy + Send,
    {
        Self {
            inner: FnRef::with_receiver(receiver, method),
        }
    }

    /// Invoke the bound invocable, forwarding the argument tuple.
    #[inline]
    pub fn call(&self, args: Args) -> Ret {
        self.inner.call(args)
    }

    /// Downgrade to the single-threaded view type.
    ///
    /// Useful for handing the binding to an API that takes the plain
    /// [`FnRef`]; the thread-sharing guarantee is simply forgotten.
    #[must_use]
    pub fn as_fn_ref(&self) -> FnRef<'a, Args, Ret> {
        self.inner
    }
}

impl<Args, Ret> Clone for SyncFnRef<'_, Args, Ret> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<Args, Ret> Copy for SyncFnRef<'_, Args, Ret> {}

impl<Args, Ret> fmt::Debug for SyncFnRef<'_, Args, Ret> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncFnRef").field("inner", &self.inner).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_concurrent_invocation_through_copies() {
        let double = |i: u64| i * 2;
        let view = SyncFnRef::new(&double);
        let (tx, rx) = crossbeam_channel::unbounded();

        thread::scope(|scope| {
            for worker in 0..4_u64 {
                let tx = tx.clone();
                scope.spawn(move || {
                    tx.send(view.call((worker,))).unwrap();
                });
            }
        });
        drop(tx);

        let mut results: Vec<u64> = rx.iter().collect();
        results.sort_unstable();
        assert_eq!(results, vec![0, 2, 4, 6]);
    }

    #[test]
    fn test_shared_state_behind_mutex() {
        let log = parking_lot::Mutex::new(Vec::new());
        let record = |name: &'static str| log.lock().push(name);
        let view = SyncFnRef::new(&record);

        thread::scope(|scope| {
            for _ in 0..3 {
                scope.spawn(|| view.call(("worker",)));
            }
        });

        assert_eq!(log.lock().len(), 3);
    }

    #[test]
    fn test_atomic_side_effects() {
        let hits = AtomicUsize::new(0);
        let record = |weight: usize| {
            hits.fetch_add(weight, Ordering::Relaxed);
        };
        let view = SyncFnRef::new(&record);

        thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| view.call((2,)));
            }
        });

        assert_eq!(hits.load(Ordering::Relaxed), 16);
    }

    #[test]
    fn test_receiver_binding_across_threads() {
        struct Tally {
            total: AtomicUsize,
        }

        impl Tally {
            fn bump(&self, weight: usize) {
                self.total.fetch_add(weight, Ordering::Relaxed);
            }
        }

        let tally = Tally {
            total: AtomicUsize::new(0),
        };
        let view: SyncFnRef<'_, (usize,), ()> = SyncFnRef::with_receiver(&tally, Tally::bump);

        thread::scope(|scope| {
            for _ in 0..5 {
                scope.spawn(|| view.call((3,)));
            }
        });

        assert_eq!(tally.total.load(Ordering::Relaxed), 15);
    }

    #[test]
    fn test_function_pointer_binding() {
        fn triple(i: u64) -> u64 {
            i * 3
        }

        let view = SyncFnRef::from_fn(triple as fn(u64) -> u64);
        let tripled = thread::scope(|scope| scope.spawn(|| view.call((7,))).join().unwrap());
        assert_eq!(tripled, 21);
    }

    #[test]
    fn test_downgrade_to_fn_ref() {
        let double = |i: u64| i * 2;
        let view = SyncFnRef::new(&double);
        assert_eq!(view.as_fn_ref().call((6,)), 12);
    }
}
