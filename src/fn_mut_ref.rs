//! Exclusive callable references for mutating invocables.
//!
//! [`FnMutRef`] is the `FnMut` counterpart of [`FnRef`](crate::FnRef): it
//! binds invocables that mutate their own state, so the binding borrow is
//! exclusive and the view itself is neither `Copy` nor cloneable. Invocation
//! takes `&mut self`, which makes "one caller at a time" a type-level fact
//! rather than a documented rule.
//!
//! # Examples
//!
//! ```
//! use prometheus_fn_ref::FnMutRef;
//!
//! let mut total = 0;
//! {
//!     let mut accumulate = |i: i32| total += i;
//!     let mut view = FnMutRef::new(&mut accumulate);
//!     view.call((2,));
//!     view.call((3,));
//! }
//! assert_eq!(total, 5);
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::mem::MaybeUninit;
use std::ptr;

use crate::call::{CallableMut, FnPointer, MethodMut};

/// The dispatch half of a raw exclusive view; the context is mutable because
/// the bound invocable's state may change on every call.
pub type RawTrampolineMut<Args, Ret> = unsafe fn(*mut (), Args) -> Ret;

/// A non-owning, type-erased reference to a mutating invocable.
///
/// Everything said about [`FnRef`](crate::FnRef) applies, except that the
/// bound invocable is borrowed exclusively and invocation requires `&mut`
/// access to the view. Because `Fn` implies `FnMut`, shared-state invocables
/// and function pointers bind here too.
///
/// Two live views over one invocable cannot exist:
///
/// ```compile_fail
/// use prometheus_fn_ref::FnMutRef;
///
/// let mut total = 0;
/// let mut accumulate = |i: i32| total += i;
/// let mut first = FnMutRef::new(&mut accumulate);
/// let mut second = FnMutRef::new(&mut accumulate);
/// first.call((1,));
/// ```
pub struct FnMutRef<'a, Args, Ret> {
    context: *mut (),
    trampoline: RawTrampolineMut<Args, Ret>,
    _bound: PhantomData<&'a mut ()>,
}

impl<'a, Args, Ret> FnMutRef<'a, Args, Ret> {
    /// Bind to a mutating invocable by exclusive reference.
    ///
    /// # Examples
    ///
    /// ```
    /// use prometheus_fn_ref::FnMutRef;
    ///
    /// let mut history = Vec::new();
    /// {
    ///     let mut record = |event: &'static str| history.push(event);
    ///     let mut view = FnMutRef::new(&mut record);
    ///     view.call(("started",));
    ///     view.call(("finished",));
    /// }
    /// assert_eq!(history, ["started", "finished"]);
    /// ```
    pub fn new<F>(callee: &'a mut F) -> Self
    where
        F: CallableMut<Args, Output = Ret>,
    {
        unsafe fn trampoline<F, Args, Ret>(context: *mut (), args: Args) -> Ret
        where
            F: CallableMut<Args, Output = Ret>,
        {
            // SAFETY: `context` was erased from a `&'a mut F` at binding time;
            // the view's lifetime keeps the borrow alive, and `call` taking
            // `&mut self` upholds its exclusivity.
            let callee = unsafe { &mut *context.cast::<F>() };
            callee.invoke_mut(args)
        }

        Self {
            context: ptr::from_mut(callee).cast::<()>(),
            trampoline: trampoline::<F, Args, Ret>,
            _bound: PhantomData,
        }
    }

    /// Bind to a plain function pointer.
    ///
    /// Useful when a caller only holds an `FnMutRef`-shaped slot; the pointer
    /// has no state to mutate, so exclusivity costs nothing.
    pub fn from_fn<P>(pointer: P) -> Self
    where
        P: FnPointer<Args, Output = Ret>,
    {
        unsafe fn trampoline<P, Args, Ret>(context: *mut (), args: Args) -> Ret
        where
            P: FnPointer<Args, Output = Ret>,
        {
            // SAFETY: `context` holds the erased pointer value produced by
            // `addr`, unchanged apart from mutability of the opaque word.
            unsafe { P::trampoline(context.cast_const(), args) }
        }

        Self {
            context: pointer.addr().cast_mut(),
            trampoline: trampoline::<P, Args, Ret>,
            _bound: PhantomData,
        }
    }

    /// Bind a receiver together with one of its `&mut self` methods.
    ///
    /// As with [`FnRef::with_receiver`](crate::FnRef::with_receiver), the
    /// method value must be zero-sized; the receiver is borrowed exclusively.
    ///
    /// # Examples
    ///
    /// ```
    /// use prometheus_fn_ref::FnMutRef;
    ///
    /// struct Counter {
    ///     hits: u32,
    /// }
    ///
    /// impl Counter {
    ///     fn record(&mut self, weight: u32) {
    ///         self.hits += weight;
    ///     }
    /// }
    ///
    /// let mut counter = Counter { hits: 0 };
    /// {
    ///     let mut view: FnMutRef<'_, (u32,), ()> =
    ///         FnMutRef::with_receiver_mut(&mut counter, Counter::record);
    ///     view.call((2,));
    ///     view.call((5,));
    /// }
    /// assert_eq!(counter.hits, 7);
    /// ```
    pub fn with_receiver_mut<C, M>(receiver: &'a mut C, method: M) -> Self
    where
        M: MethodMut<C, Args, Output = Ret> + Copy,
    {
        const {
            assert!(
                std::mem::size_of::<M>() == 0,
                "bound methods must be zero-sized function items or non-capturing closures",
            );
        };

        unsafe fn trampoline<C, M, Args, Ret>(context: *mut (), args: Args) -> Ret
        where
            M: MethodMut<C, Args, Output = Ret> + Copy,
        {
            // SAFETY: `context` was erased from a `&'a mut C` at binding time;
            // exclusivity is upheld by `call` taking `&mut self`.
            let receiver = unsafe { &mut *context.cast::<C>() };
            // SAFETY: `M` is zero-sized (checked at binding time) and a value
            // of it was supplied to `with_receiver_mut`.
            let method = unsafe { MaybeUninit::<M>::uninit().assume_init() };
            method.invoke_on_mut(receiver, args)
        }

        let _ = method;
        Self {
            context: ptr::from_mut(receiver).cast::<()>(),
            trampoline: trampoline::<C, M, Args, Ret>,
            _bound: PhantomData,
        }
    }

    /// Invoke the bound invocable, forwarding the argument tuple.
    #[inline]
    pub fn call(&mut self, args: Args) -> Ret {
        // SAFETY: `context` and `trampoline` were paired at binding time, `'a`
        // keeps the bound storage alive, and `&mut self` gives us the
        // exclusive access the trampoline reconstructs.
        unsafe { (self.trampoline)(self.context, args) }
    }

    /// Reborrow the view for a shorter scope, like `&mut` reborrowing.
    ///
    /// Handy for handing the view to a helper without giving it up.
    #[inline]
    pub fn reborrow(&mut self) -> FnMutRef<'_, Args, Ret> {
        FnMutRef {
            context: self.context,
            trampoline: self.trampoline,
            _bound: PhantomData,
        }
    }
}

impl<Args, Ret> fmt::Debug for FnMutRef<'_, Args, Ret> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMutRef")
            .field("context", &self.context)
            .field("trampoline", &(self.trampoline as *const ()))
            .finish()
    }
}
