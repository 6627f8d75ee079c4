//! Invocation traits giving every supported invocable one call surface.
//!
//! The reference types in this crate are parameterized over a tuple-typed
//! argument list rather than over the concrete invocable, so they need a
//! bridge from "tuple of arguments" back to "real call". That bridge is the
//! trait family below:
//!
//! - [`Callable`] - invocables callable through a shared reference (`Fn`)
//! - [`CallableMut`] - invocables that mutate their own state (`FnMut`)
//! - [`Method`] / [`MethodMut`] - invocables curried over a receiver that is
//!   supplied separately at binding time
//! - [`FnPointer`] - plain function pointers, which are bound by value rather
//!   than by reference
//!
//! Blanket implementations cover argument arities 0 through 8. Adding an arity
//! is one more line in the macro invocation list at the bottom of the module.

/// An invocable that can be called any number of times through a shared
/// reference, with arguments supplied as a tuple.
///
/// Implemented for every `Fn` closure, function item, and function pointer
/// whose argument count is at most 8.
pub trait Callable<Args> {
    /// Value produced by an invocation.
    type Output;

    /// Invoke with the given argument tuple.
    fn invoke(&self, args: Args) -> Self::Output;
}

/// An invocable that needs exclusive access to its own state to be called.
///
/// Implemented for every `FnMut` closure (which includes all `Fn` closures)
/// whose argument count is at most 8.
pub trait CallableMut<Args> {
    /// Value produced by an invocation.
    type Output;

    /// Invoke with the given argument tuple.
    fn invoke_mut(&mut self, args: Args) -> Self::Output;
}

/// An invocable whose first argument is a shared receiver, split off so the
/// receiver can be captured at binding time and the rest of the arguments
/// supplied per call.
///
/// Implemented for every `Fn(&Receiver, ...)` invocable - most usefully for
/// method function items such as `Sensor::apply`.
pub trait Method<Receiver, Args> {
    /// Value produced by an invocation.
    type Output;

    /// Invoke against `receiver` with the given argument tuple.
    fn invoke_on(&self, receiver: &Receiver, args: Args) -> Self::Output;
}

/// The exclusive-receiver counterpart of [`Method`], for methods that take
/// `&mut self`.
pub trait MethodMut<Receiver, Args> {
    /// Value produced by an invocation.
    type Output;

    /// Invoke against `receiver` with the given argument tuple.
    fn invoke_on_mut(&self, receiver: &mut Receiver, args: Args) -> Self::Output;
}

/// A plain function pointer, bound by value: the pointer itself becomes the
/// context word of a view, so no storage has to outlive the binding.
pub trait FnPointer<Args>: Copy {
    /// Value produced by a call.
    type Output;

    /// The pointer value, erased to an opaque context word.
    fn addr(self) -> *const ();

    /// Rebuild the pointer from an erased context word and call it.
    ///
    /// # Safety
    ///
    /// `context` must be a value previously returned by [`FnPointer::addr`]
    /// on a pointer of exactly this type.
    unsafe fn trampoline(context: *const (), args: Args) -> Self::Output;
}

macro_rules! impl_call_traits {
    ($(($T:ident, $a:ident)),*) => {
        impl<Func, Ret $(, $T)*> Callable<($($T,)*)> for Func
        where
            Func: Fn($($T),*) -> Ret,
        {
            type Output = Ret;

            #[inline]
            fn invoke(&self, args: ($($T,)*)) -> Ret {
                let ($($a,)*) = args;
                self($($a),*)
            }
        }

        impl<Func, Ret $(, $T)*> CallableMut<($($T,)*)> for Func
        where
            Func: FnMut($($T),*) -> Ret,
        {
            type Output = Ret;

            #[inline]
            fn invoke_mut(&mut self, args: ($($T,)*)) -> Ret {
                let ($($a,)*) = args;
                self($($a),*)
            }
        }

        impl<Func, Recv, Ret $(, $T)*> Method<Recv, ($($T,)*)> for Func
        where
            Func: Fn(&Recv $(, $T)*) -> Ret,
        {
            type Output = Ret;

            #[inline]
            fn invoke_on(&self, receiver: &Recv, args: ($($T,)*)) -> Ret {
                let ($($a,)*) = args;
                self(receiver $(, $a)*)
            }
        }

        impl<Func, Recv, Ret $(, $T)*> MethodMut<Recv, ($($T,)*)> for Func
        where
            Func: Fn(&mut Recv $(, $T)*) -> Ret,
        {
            type Output = Ret;

            #[inline]
            fn invoke_on_mut(&self, receiver: &mut Recv, args: ($($T,)*)) -> Ret {
                let ($($a,)*) = args;
                self(receiver $(, $a)*)
            }
        }

        impl<Ret $(, $T)*> FnPointer<($($T,)*)> for fn($($T),*) -> Ret {
            type Output = Ret;

            #[inline]
            fn addr(self) -> *const () {
                self as *const ()
            }

            #[inline]
            unsafe fn trampoline(context: *const (), args: ($($T,)*)) -> Ret {
                // SAFETY: `context` holds the erased value of a pointer of this
                // exact type, produced by `addr`.
                let callee: Self = unsafe { std::mem::transmute(context) };
                let ($($a,)*) = args;
                callee($($a),*)
            }
        }
    };
}

impl_call_traits!();
impl_call_traits!((A0, a0));
impl_call_traits!((A0, a0), (A1, a1));
impl_call_traits!((A0, a0), (A1, a1), (A2, a2));
impl_call_traits!((A0, a0), (A1, a1), (A2, a2), (A3, a3));
impl_call_traits!((A0, a0), (A1, a1), (A2, a2), (A3, a3), (A4, a4));
impl_call_traits!((A0, a0), (A1, a1), (A2, a2), (A3, a3), (A4, a4), (A5, a5));
impl_call_traits!(
    (A0, a0),
    (A1, a1),
    (A2, a2),
    (A3, a3),
    (A4, a4),
    (A5, a5),
    (A6, a6)
);
impl_call_traits!(
    (A0, a0),
    (A1, a1),
    (A2, a2),
    (A3, a3),
    (A4, a4),
    (A5, a5),
    (A6, a6),
    (A7, a7)
);
