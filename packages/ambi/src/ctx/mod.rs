//! # Context classification
//!
//! Code that is handed a job can be running under two very different
//! disciplines. In a *suspendable* chain, some entry point up the stack is
//! driving a future, and waiting must be expressed as `.await` so the
//! scheduler can interleave other work. In a *blocking* chain there is no
//! scheduler to yield to, and waiting means blocking the thread. Picking the
//! wrong discipline either stalls a runtime or panics it, which is why dual
//! APIs usually push the choice onto the caller.
//!
//! This module answers the question at runtime instead: given the line that
//! is asking, is the current flow of control suspendable? Detection combines
//! two markers, checked in order:
//!
//! 1. **Explicit scope overrides.** [`enter`] pushes a [`Mode`] onto a
//!    thread-local stack for the extent of an RAII guard; [`scoped`] enters
//!    an override around every poll of a future. The innermost override
//!    answers, and overrides always win.
//! 2. **The ambient runtime context.** With the `tokio` cargo feature
//!    (default), a thread that is driving or belonging to a tokio runtime
//!    carries a thread-local handle; its presence marks every chain on that
//!    thread as suspendable.
//!
//! # Memoization
//! [`is_suspendable`] is meant to be consulted on every dispatch, so the
//! ambient answer is cached per call site - the `file:line:column` of the
//! asking call, captured through `#[track_caller]`. The cache is
//! process-wide, grows monotonically, and is never evicted: a call site is
//! assumed to run in the same mode for the lifetime of the process. The one
//! exception is classification under an explicit override, which is
//! dynamically scoped and therefore never cached.
//!
//! # Depth
//! [`classify_at`] indexes the active context stack directly: depth 0 is the
//! innermost override, each increment steps one override outward, and the
//! position one past the outermost override is the ambient runtime context.
//! Asking past that is a [`ClassifyError::StackUnderflow`], which callers
//! get propagated rather than swallowed - a wrong depth is a bug at the
//! asking site, not a recoverable condition.

use std::collections::HashMap;
use std::panic::Location;
use std::sync::{LazyLock, RwLock};

use thiserror::Error;

mod scope;
pub use scope::{Mode, Scoped, ScopeGuard, enter, scoped};

/// Identity of a classifying call: file, line, column.
type CallSite = (&'static str, u32, u32);

/// Per-call-site memoization of the ambient classification.
static CACHE: LazyLock<RwLock<HashMap<CallSite, bool>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    /// The requested depth points past every active context.
    #[error("context depth {depth} exceeds the {available} active context(s)")]
    StackUnderflow { depth: usize, available: usize },
}

/// Whether the calling line runs inside a suspendable execution context.
///
/// The answer is attributed to the caller via `#[track_caller]` and cached
/// under that call site, so repeated calls from one line cost a single map
/// lookup. Wrappers that forward here (or to [`Paired::call`](crate::Paired::call))
/// should themselves be `#[track_caller]` so the decision lands on their
/// caller instead of on the wrapper's shared body.
///
/// Never suspends and never blocks, regardless of the answer.
#[track_caller]
pub fn is_suspendable() -> bool {
    // overrides are dynamically scoped; their answer is not stable per call
    // site and must not populate the cache
    if let Some(mode) = scope::current() {
        return mode.is_suspendable();
    }
    let location = Location::caller();
    let site: CallSite = (location.file(), location.line(), location.column());
    if let Some(cached) = CACHE
        .read()
        .expect("classification cache lock poisoned")
        .get(&site)
    {
        return *cached;
    }
    let suspendable = ambient_suspendable();
    log::trace!(
        "{}:{}:{} first classified as {}",
        site.0,
        site.1,
        site.2,
        if suspendable { "suspendable" } else { "blocking" }
    );
    CACHE
        .write()
        .expect("classification cache lock poisoned")
        .entry(site)
        .or_insert(suspendable);
    suspendable
}

/// Classify the context at `depth` steps outward from the innermost one.
///
/// Depth 0 is the innermost active override ([`enter`] or [`scoped`]); each
/// increment steps one override outward; the position one past the outermost
/// override is the ambient runtime context. Unlike [`is_suspendable`], the
/// answer is never cached.
///
/// Fails with [`ClassifyError::StackUnderflow`] when `depth` points past
/// every active context.
pub fn classify_at(depth: usize) -> Result<bool, ClassifyError> {
    scope::with_stack(|scopes| {
        let overrides = scopes.len();
        if depth < overrides {
            Ok(scopes[overrides - 1 - depth].is_suspendable())
        } else if depth == overrides {
            Ok(ambient_suspendable())
        } else {
            Err(ClassifyError::StackUnderflow {
                depth,
                available: overrides + 1,
            })
        }
    })
}

/// Probe the ambient runtime marker installed on this thread.
#[cfg(feature = "tokio")]
#[inline(always)]
fn ambient_suspendable() -> bool {
    tokio::runtime::Handle::try_current().is_ok()
}

#[cfg(not(feature = "tokio"))]
#[inline(always)]
fn ambient_suspendable() -> bool {
    false
}
