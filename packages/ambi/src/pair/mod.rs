//! # Paired dispatch
//!
//! Merges a plain implementation and a suspendable implementation of the
//! same operation into one entry point. Every call consults the context
//! classifier ([`crate::ctx`]) and forwards to the side matching the
//! caller's context: the plain side runs to completion and its value comes
//! back directly, the suspendable side's future comes back unevaluated so
//! the caller's own `.await` drives it.
//!
//! Pairs are built once and are immutable afterwards. The contract between
//! the two sides is checked when the pair is built, never when it is called:
//! drift between the sides is a construction bug and surfaces immediately.

use std::any::{TypeId, type_name};
use std::marker::PhantomData;
use std::pin::Pin;

use thiserror::Error;

use crate::ctx;

mod dispatched;
pub use dispatched::Dispatched;

/// Alias for a boxed future
pub type BoxedFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Boxed plain implementation, for positions that must name their type.
pub type PlainFn<A, R> = Box<dyn Fn(A) -> R + Send + Sync>;
/// Boxed suspendable implementation, for positions that must name their type.
pub type SuspendableFn<A, R> = Box<dyn Fn(A) -> BoxedFuture<R> + Send + Sync>;
/// A fully type-erased pair: nameable in struct fields and statics.
pub type PairedDyn<A, R> = Paired<PlainFn<A, R>, SuspendableFn<A, R>, A, A>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PairError {
    /// The two sides declare different parameter contracts.
    #[error("parameter contracts differ: plain side takes `{plain}`, suspendable side takes `{suspendable}`")]
    SignatureMismatch {
        plain: &'static str,
        suspendable: &'static str,
    },
    /// The two sides declare different return contracts.
    #[error("return contracts differ: plain side yields `{plain}`, suspendable side yields `{suspendable}`")]
    ReturnTypeMismatch {
        plain: &'static str,
        suspendable: &'static str,
    },
}

/// Start pairing a plain implementation with a suspendable one.
///
/// The returned [`Pairing`] is applied to the suspendable side with
/// [`Pairing::with`], which checks the contract between the two sides and
/// yields the merged [`Paired`] dispatcher:
///
/// ```rust
/// # fn main() -> ambi::Result<()> {
/// let increment = ambi::pair(|x: i64| x + 1)
///     .with(|x: i64| async move { x + 1 })?;
///
/// assert_eq!(increment.call(1).value()?, 2);
/// # Ok(()) }
/// ```
///
/// By default the two sides must agree exactly on parameter and return
/// types. [`Pairing::lenient`] drops that requirement for pairs that
/// intentionally diverge; mismatches then surface only through the ordinary
/// conversion and type obligations at each call site, and lenient pairing
/// itself cannot fail:
///
/// ```rust
/// # fn main() -> ambi::Result<()> {
/// let stringify = ambi::pair(|x: i64| x + 1)
///     .lenient()
///     .with(|x: i64| async move { (x + 1).to_string() });
///
/// assert_eq!(stringify.call(1_i64).value()?, 2);
/// # Ok(()) }
/// ```
///
/// The suspendable side must be genuinely suspendable - a callable whose
/// body compiles to a future. Offering a second plain callable is rejected
/// at compile time:
///
/// ```compile_fail
/// let merged = ambi::pair(|x: i64| x + 1).with(|x: i64| x + 2);
/// ```
pub fn pair<P>(plain: P) -> Pairing<P> {
    Pairing { plain, doc: None }
}

/// Half-built pair holding the plain side. See [`pair`].
pub struct Pairing<P> {
    plain: P,
    doc: Option<&'static str>,
}

impl<P> Pairing<P> {
    /// Allow the two sides to disagree on parameter and return contracts.
    pub fn lenient(self) -> LenientPairing<P> {
        LenientPairing {
            plain: self.plain,
            doc: self.doc,
        }
    }

    /// Attach a description to the plain side.
    pub fn describe(mut self, doc: &'static str) -> Self {
        self.doc = Some(doc);
        self
    }

    /// Apply the suspendable side and build the merged dispatcher.
    ///
    /// Both sides must declare the same parameter type and the same return
    /// type; a mismatch fails here, before any call is made, with
    /// [`PairError::SignatureMismatch`] or [`PairError::ReturnTypeMismatch`].
    pub fn with<S, PA, SA, PR, Fut>(self, suspendable: S) -> Result<Paired<P, S, PA, SA>, PairError>
    where
        P: Fn(PA) -> PR,
        S: Fn(SA) -> Fut,
        Fut: Future,
        PA: 'static,
        SA: 'static,
        PR: 'static,
        Fut::Output: 'static,
    {
        if TypeId::of::<PA>() != TypeId::of::<SA>() {
            return Err(PairError::SignatureMismatch {
                plain: type_name::<PA>(),
                suspendable: type_name::<SA>(),
            });
        }
        if TypeId::of::<PR>() != TypeId::of::<Fut::Output>() {
            return Err(PairError::ReturnTypeMismatch {
                plain: type_name::<PR>(),
                suspendable: type_name::<Fut::Output>(),
            });
        }
        Ok(Paired {
            plain: self.plain,
            suspendable,
            plain_doc: self.doc,
            suspendable_doc: None,
            _args: PhantomData,
        })
    }
}

/// Half-built pair whose contract checks are waived. See [`Pairing::lenient`].
pub struct LenientPairing<P> {
    plain: P,
    doc: Option<&'static str>,
}

impl<P> LenientPairing<P> {
    /// Attach a description to the plain side.
    pub fn describe(mut self, doc: &'static str) -> Self {
        self.doc = Some(doc);
        self
    }

    /// Apply the suspendable side and build the merged dispatcher.
    ///
    /// No contract is checked, so nothing can fail here; the sides may
    /// disagree on parameters and returns, including borrowed types. Each
    /// call site then carries the conversion obligations for both sides.
    pub fn with<S, PA, SA, PR, Fut>(self, suspendable: S) -> Paired<P, S, PA, SA>
    where
        P: Fn(PA) -> PR,
        S: Fn(SA) -> Fut,
        Fut: Future,
    {
        Paired {
            plain: self.plain,
            suspendable,
            plain_doc: self.doc,
            suspendable_doc: None,
            _args: PhantomData,
        }
    }
}

/// Merged dispatcher over a plain and a suspendable implementation.
///
/// Built with [`pair`]. An ordinary value: store it in a struct field, a
/// `LazyLock` static, or a local - binding follows from wherever it lives.
/// Use [`PairedDyn`] when the position needs a nameable type.
pub struct Paired<P, S, PA, SA> {
    plain: P,
    suspendable: S,
    plain_doc: Option<&'static str>,
    suspendable_doc: Option<&'static str>,
    _args: PhantomData<fn(PA, SA)>,
}

impl<P, S, PA, SA> Paired<P, S, PA, SA> {
    /// Attach a description to the suspendable side.
    pub fn describe(mut self, doc: &'static str) -> Self {
        self.suspendable_doc = Some(doc);
        self
    }

    /// The pair's description: the suspendable side's, else the plain side's.
    pub fn description(&self) -> Option<&'static str> {
        self.suspendable_doc.or(self.plain_doc)
    }

    /// Dispatch one call on the caller's context.
    ///
    /// A suspendable caller gets the suspendable side's future back
    /// unevaluated inside [`Dispatched`] and awaits it; a plain caller gets
    /// the plain side's result, already computed. `args` is anything
    /// convertible into both sides' parameter types - for a strict pair
    /// that is simply the shared parameter type itself.
    ///
    /// The classification is attributed to the calling line (and cached
    /// there); wrappers forwarding here should be `#[track_caller]`.
    #[track_caller]
    pub fn call<A, PR, Fut>(&self, args: A) -> Dispatched<PR, Fut>
    where
        A: Into<PA> + Into<SA>,
        P: Fn(PA) -> PR,
        S: Fn(SA) -> Fut,
        Fut: Future,
    {
        if ctx::is_suspendable() {
            Dispatched::pending((self.suspendable)(args.into()))
        } else {
            Dispatched::ready((self.plain)(args.into()))
        }
    }
}
