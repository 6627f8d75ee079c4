//! # Prometheus Function References
//!
//! Non-owning, allocation-free callable references for the Prometheus AI Platform.
//!
//! This library provides a family of lightweight view types that bind to any
//! invocable matching a given call shape and re-invoke it through a single
//! indirect call. A view is two machine words - an opaque context pointer and a
//! monomorphized trampoline - and borrows the invocable instead of owning it,
//! so callback-style APIs can accept arbitrary callables without templating
//! every call site and without the heap traffic of `Box<dyn Fn>`.
//!
//! ## Core Problem Solved
//!
//! Hot paths in the platform hand callbacks across layers constantly, and the
//! usual options all cost something:
//!
//! - **Generic parameters**: monomorphize every call site and infect every
//!   signature they pass through
//! - **`Box<dyn Fn>`**: allocates and takes ownership the caller often cannot
//!   give up
//! - **`&dyn Fn`**: close, but cannot bind plain function pointers by value or
//!   curry a receiver into the view
//!
//! A callable reference keeps the indirect-call cost and drops everything else.
//!
//! ## Key Features
//!
//! - **Two-Word Views**: context pointer plus trampoline, chosen at binding
//!   time, never a runtime-resolved vtable
//! - **No Ownership**: the bound invocable is borrowed; the borrow checker
//!   rejects bindings that could dangle
//! - **Uniform Binding**: function pointers (by value), closures and function
//!   objects (by reference), and receiver + method pairs all erase to the same
//!   view type
//! - **Mutability Tiers**: [`FnRef`] for shared-state invocables, [`FnMutRef`]
//!   for mutating ones
//! - **Thread Sharing Opt-In**: [`SyncFnRef`] is `Send + Sync` and only binds
//!   `Sync` callees
//!
//! ## Quick Start
//!
//! ```
//! use prometheus_fn_ref::FnRef;
//!
//! fn two_times(i: i32) -> i32 {
//!     i * 2
//! }
//!
//! // Function pointers bind by value: the pointer itself is the context word.
//! let doubler = FnRef::from_fn(two_times as fn(i32) -> i32);
//! assert_eq!(doubler.call((5,)), 10);
//!
//! // Closures bind by reference and are never copied or moved.
//! let threshold = 10_000_000_u64;
//! let megacity = move |population: u64| population > threshold;
//! let predicate = FnRef::new(&megacity);
//! assert!(predicate.call((37_339_804,)));
//! assert!(!predicate.call((3_144_473,)));
//! ```
//!
//! For complete examples, see:
//! - `tests/fn_ref_test.rs` - Binding surface walked end to end
//! - `tests/city_filter_test.rs` - Predicate-driven filtering scenario

#![deny(warnings)]
#![deny(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Invocation traits giving every supported invocable one call surface.
pub mod call;
/// Exclusive callable references for mutating invocables.
pub mod fn_mut_ref;
/// The core non-owning callable reference.
pub mod fn_ref;
/// Thread-shareable callable references.
pub mod sync;
/// Shared utilities.
pub mod util;

pub use call::{Callable, CallableMut, FnPointer, Method, MethodMut};
pub use fn_mut_ref::FnMutRef;
pub use fn_ref::FnRef;
pub use sync::SyncFnRef;
