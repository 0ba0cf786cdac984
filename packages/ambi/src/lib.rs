//! Caller-context detection and paired sync/async dispatch
//!
//! # General Principle
//! A function that exists in two renditions - one that runs to completion on
//! the calling thread, and one that cooperates with an async scheduler - can
//! be merged behind a single entry point. The entry point asks one question
//! on every call: *does my caller belong to a suspendable execution context?*
//! Answering that question cheaply, and routing on the answer, is all this
//! crate does. It is not a scheduler, it never suspends on its own, and it
//! adds no suspension points to either rendition.
//!
//! # Context classification
//! [`ctx::is_suspendable`] classifies the calling line. A call chain counts
//! as suspendable when either:
//! - an explicit scope override is active on the thread (see
//!   [`ctx::enter`] and [`ctx::scoped`]), or
//! - the thread carries an ambient async runtime context - the thread-local
//!   handle `tokio` installs on every thread it drives (`tokio` cargo
//!   feature, enabled by default).
//!
//! The answer is memoized per call site. A given source line is expected to
//! run in one mode for the lifetime of the process; the first observation
//! wins and later calls take the cached fast path. Explicit overrides are
//! dynamically scoped, so answers under an override bypass the cache in both
//! directions.
//!
//! # Paired dispatch
//! [`pair`] merges the two renditions after checking, at construction time,
//! that they agree on their contract:
//!
//! ```rust
//! use ambi::pair;
//!
//! fn main() -> ambi::Result<()> {
//!     let handler = pair(|()| "running to completion")
//!         .with(|()| async { "running cooperatively" })?;
//!
//!     // a plain caller gets the plain side's value
//!     assert_eq!(handler.call(()).value()?, "running to completion");
//!
//!     // a suspendable caller gets the suspendable side's future, unevaluated
//!     let runtime = tokio::runtime::Runtime::new()?;
//!     let body = runtime.block_on(async { handler.call(()).await });
//!     assert_eq!(body, "running cooperatively");
//!     Ok(())
//! }
//! ```
//!
//! [`Paired::call`] returns a [`Dispatched`] value holding either the plain
//! side's already-computed result or the suspendable side's future. Awaiting
//! it resolves both; [`Dispatched::value`] extracts the plain result.
//!
//! Contract drift between the two sides is caught when the pair is built,
//! not when it is called. [`Pairing::lenient`] drops the construction-time
//! checks for pairs that intentionally diverge; see [`pair()`] for details.
//!
//! # Wrapper layers
//! Classification attributes its answer to the calling line through
//! `#[track_caller]`. A wrapper that forwards to [`Paired::call`] should be
//! `#[track_caller]` itself, so that the cached decision lands on the
//! wrapper's caller rather than on one line inside the wrapper shared by
//! every caller.
//!
//! # Cargo features
//! - `tokio` (default): probe the thread-local tokio runtime handle as the
//!   ambient marker. Without it the crate is runtime-agnostic and only
//!   explicit scope overrides mark a chain as suspendable.

pub mod ctx;

mod pair;
pub use pair::{
    BoxedFuture, Dispatched, LenientPairing, PairError, Paired, PairedDyn, Pairing, PlainFn,
    SuspendableFn, pair,
};

// re-exports from libraries
pub use anyhow::{Context, Result};
