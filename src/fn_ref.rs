//! The core non-owning callable reference.
//!
//! This module provides [`FnRef`], a fixed-size view over any invocable
//! matching a given call shape. The view is two machine words: an opaque
//! context pointer and a trampoline chosen when the binding is made. Invoking
//! the view costs one indirect call, the same as a C-style callback pair.
//!
//! # Features
//!
//! - No allocation, ever; the bound invocable is borrowed, not stored
//! - Cheap to copy and to pass by value
//! - Binds function pointers, closures, function objects, and
//!   receiver + method pairs behind one type
//! - Dangling bindings are compile errors, not documented footguns
//!
//! # Examples
//!
//! Accepting any predicate without a generic parameter:
//!
//! ```
//! use prometheus_fn_ref::FnRef;
//!
//! fn count_matching(values: &[u64], predicate: FnRef<'_, (u64,), bool>) -> usize {
//!     values.iter().filter(|value| predicate.call((**value,))).count()
//! }
//!
//! let over_ten = |value: u64| value > 10;
//! let matches = count_matching(&[3, 11, 25, 7], FnRef::new(&over_ten));
//! assert_eq!(matches, 2);
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::mem::MaybeUninit;
use std::ptr;

use crate::call::{Callable, FnPointer, Method};

/// The dispatch half of a raw view: reinterprets an erased context word and
/// performs the real call.
pub type RawTrampoline<Args, Ret> = unsafe fn(*const (), Args) -> Ret;

/// A non-owning, type-erased reference to an invocable.
///
/// `FnRef<'a, Args, Ret>` binds to anything that can be called with the
/// argument tuple `Args` and produces `Ret`, for as long as the bound
/// invocable outlives `'a`. The view itself is two words and is `Copy`;
/// copying it never copies the invocable.
///
/// A view is bound from birth: there is no empty or default state, so every
/// reachable `FnRef` can be called. Callers that need "maybe bound" spell it
/// `Option<FnRef>`, which costs nothing extra.
///
/// `FnRef` contains a raw pointer and is therefore neither `Send` nor `Sync`;
/// see [`SyncFnRef`](crate::SyncFnRef) for the thread-shareable variant.
///
/// # Examples
///
/// ```
/// use prometheus_fn_ref::FnRef;
///
/// fn two_times(i: i32) -> i32 {
///     i * 2
/// }
///
/// let doubler = FnRef::from_fn(two_times as fn(i32) -> i32);
/// assert_eq!(doubler.call((5,)), 10);
/// ```
///
/// Binding storage that does not live long enough is rejected at compile
/// time:
///
/// ```compile_fail
/// use prometheus_fn_ref::FnRef;
///
/// let dangling = {
///     let doubler = |i: i32| i * 2;
///     FnRef::new(&doubler)
/// };
/// dangling.call((5,));
/// ```
pub struct FnRef<'a, Args, Ret> {
    context: *const (),
    trampoline: RawTrampoline<Args, Ret>,
    _bound: PhantomData<&'a ()>,
}

impl<'a, Args, Ret> FnRef<'a, Args, Ret> {
    /// Bind to an invocable object by reference.
    ///
    /// The object is neither copied nor moved; the view records its address
    /// and a trampoline for its concrete type. Works for closures, function
    /// objects, and named function items alike.
    ///
    /// # Examples
    ///
    /// ```
    /// use prometheus_fn_ref::FnRef;
    ///
    /// let offset = 10;
    /// let shift = move |i: i32| i + offset;
    /// let view = FnRef::new(&shift);
    /// assert_eq!(view.call((5,)), 15);
    /// ```
    ///
    /// An invocable that mutates captured state only satisfies `FnMut` and is
    /// rejected here; bind it through
    /// [`FnMutRef`](crate::FnMutRef) instead:
    ///
    /// ```compile_fail
    /// use prometheus_fn_ref::FnRef;
    ///
    /// let mut total = 0;
    /// let mut accumulate = |i: i32| total += i;
    /// let view = FnRef::new(&accumulate);
    /// ```
    ///
    /// So is an invocable whose call shape does not match the view's:
    ///
    /// ```compile_fail
    /// use prometheus_fn_ref::FnRef;
    ///
    /// let length = |s: &str| s.len();
    /// let view: FnRef<'_, (i32,), usize> = FnRef::new(&length);
    /// ```
    pub fn new<F>(callee: &'a F) -> Self
    where
        F: Callable<Args, Output = Ret>,
    {
        unsafe fn trampoline<F, Args, Ret>(context: *const (), args: Args) -> Ret
        where
            F: Callable<Args, Output = Ret>,
        {
            // SAFETY: `context` was erased from a `&'a F` at binding time, and
            // the view's lifetime keeps that borrow alive.
            let callee = unsafe { &*context.cast::<F>() };
            callee.invoke(args)
        }

        Self {
            context: ptr::from_ref(callee).cast::<()>(),
            trampoline: trampoline::<F, Args, Ret>,
            _bound: PhantomData,
        }
    }

    /// Bind to a plain function pointer.
    ///
    /// The pointer value itself becomes the context word, so nothing has to
    /// outlive the binding and the resulting view is valid for any lifetime.
    ///
    /// # Examples
    ///
    /// ```
    /// use prometheus_fn_ref::FnRef;
    ///
    /// fn times_two(a: f64) -> f64 {
    ///     a * 2.0
    /// }
    ///
    /// let view = FnRef::from_fn(times_two as fn(f64) -> f64);
    /// assert_eq!(view.call((2.5,)), 5.0);
    /// ```
    pub fn from_fn<P>(pointer: P) -> Self
    where
        P: FnPointer<Args, Output = Ret>,
    {
        Self {
            context: pointer.addr(),
            trampoline: P::trampoline,
            _bound: PhantomData,
        }
    }

    /// Bind a receiver together with one of its methods.
    ///
    /// The view records the receiver's address as its context; the method
    /// value is re-materialized inside a trampoline specialized on it, which
    /// is why it must be zero-sized (a function item such as `Sensor::apply`,
    /// or a non-capturing closure). A capturing closure here fails to compile.
    ///
    /// # Examples
    ///
    /// ```
    /// use prometheus_fn_ref::FnRef;
    ///
    /// struct Sensor {
    ///     scale: i32,
    /// }
    ///
    /// impl Sensor {
    ///     fn apply(&self, reading: i32) -> i32 {
    ///         reading * self.scale
    ///     }
    /// }
    ///
    /// let sensor = Sensor { scale: 3 };
    /// let view: FnRef<'_, (i32,), i32> = FnRef::with_receiver(&sensor, Sensor::apply);
    /// assert_eq!(view.call((7,)), 21);
    /// ```
    pub fn with_receiver<C, M>(receiver: &'a C, method: M) -> Self
    where
        M: Method<C, Args, Output = Ret> + Copy,
    {
        const {
            assert!(
                std::mem::size_of::<M>() == 0,
                "bound methods must be zero-sized function items or non-capturing closures",
            );
        };

        unsafe fn trampoline<C, M, Args, Ret>(context: *const (), args: Args) -> Ret
        where
            M: Method<C, Args, Output = Ret> + Copy,
        {
            // SAFETY: `context` was erased from a `&'a C` at binding time, and
            // the view's lifetime keeps that borrow alive.
            let receiver = unsafe { &*context.cast::<C>() };
            // SAFETY: `M` is zero-sized (checked at binding time) and a value
            // of it was supplied to `with_receiver`, so materializing a copy
            // out of no bytes is sound.
            let method = unsafe { MaybeUninit::<M>::uninit().assume_init() };
            method.invoke_on(receiver, args)
        }

        let _ = method;
        Self {
            context: ptr::from_ref(receiver).cast::<()>(),
            trampoline: trampoline::<C, M, Args, Ret>,
            _bound: PhantomData,
        }
    }

    /// Invoke the bound invocable, forwarding the argument tuple.
    ///
    /// Repeated calls reuse the same binding; rebinding is done by assigning
    /// a freshly constructed view.
    #[inline]
    pub fn call(&self, args: Args) -> Ret {
        // SAFETY: `context` and `trampoline` were paired at binding time, and
        // `'a` keeps the bound storage alive.
        unsafe { (self.trampoline)(self.context, args) }
    }

    /// Decompose the view into its context word and trampoline.
    ///
    /// The parts can later be reassembled with [`FnRef::from_raw_parts`].
    /// This is the escape hatch for plumbing that cannot carry `'a`, such as
    /// FFI-adjacent callback registries; the lifetime obligation does not go
    /// away, it just stops being compiler-checked.
    #[must_use]
    pub fn into_raw_parts(self) -> (*const (), RawTrampoline<Args, Ret>) {
        (self.context, self.trampoline)
    }

    /// Reassemble a view from parts produced by [`FnRef::into_raw_parts`].
    ///
    /// # Safety
    ///
    /// `context` and `trampoline` must originate from the same
    /// `into_raw_parts` call, and the storage the original view was bound to
    /// must remain valid for `'a` and for every subsequent `call`. Invoking a
    /// reassembled view whose backing storage is gone is undefined behavior.
    ///
    /// # Examples
    ///
    /// ```
    /// use prometheus_fn_ref::FnRef;
    ///
    /// let double = |i: i32| i * 2;
    /// let view = FnRef::new(&double);
    /// let (context, trampoline) = view.into_raw_parts();
    /// // SAFETY: `double` is still alive, and the parts are a matched pair.
    /// let restored: FnRef<'_, (i32,), i32> =
    ///     unsafe { FnRef::from_raw_parts(context, trampoline) };
    /// assert_eq!(restored.call((4,)), 8);
    /// ```
    pub const unsafe fn from_raw_parts(
        context: *const (),
        trampoline: RawTrampoline<Args, Ret>,
    ) -> Self {
        Self {
            context,
            trampoline,
            _bound: PhantomData,
        }
    }
}

// A blanket `impl<P: FnPointer<Args, Output = Ret>> From<P> for FnRef` would
// overlap `core`'s reflexive `impl<T> From<T> for T`, because coherence must
// assume a downstream crate could implement `FnPointer<SomeLocalType>` for
// `FnRef`. `FnPointer` is only implemented for `fn(..) -> Ret` pointers (see
// `call.rs`), so the conversion surface is spelled out per arity instead,
// which covers exactly the same set of types.
macro_rules! impl_from_fn_pointer {
    ($($T:ident),*) => {
        impl<'a, Ret $(, $T)*> From<fn($($T),*) -> Ret> for FnRef<'a, ($($T,)*), Ret> {
            fn from(pointer: fn($($T),*) -> Ret) -> Self {
                Self::from_fn(pointer)
            }
        }
    };
}

impl_from_fn_pointer!();
impl_from_fn_pointer!(A0);
impl_from_fn_pointer!(A0, A1);
impl_from_fn_pointer!(A0, A1, A2);
impl_from_fn_pointer!(A0, A1, A2, A3);
impl_from_fn_pointer!(A0, A1, A2, A3, A4);
impl_from_fn_pointer!(A0, A1, A2, A3, A4, A5);
impl_from_fn_pointer!(A0, A1, A2, A3, A4, A5, A6);
impl_from_fn_pointer!(A0, A1, A2, A3, A4, A5, A6, A7);

// Derived impls would demand `Args: Clone` and friends, but the view is two
// words regardless of the erased signature.
impl<Args, Ret> Clone for FnRef<'_, Args, Ret> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<Args, Ret> Copy for FnRef<'_, Args, Ret> {}

impl<Args, Ret> fmt::Debug for FnRef<'_, Args, Ret> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnRef")
            .field("context", &self.context)
            .field("trampoline", &(self.trampoline as *const ()))
            .finish()
    }
}
