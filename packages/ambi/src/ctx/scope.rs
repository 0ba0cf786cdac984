use std::cell::RefCell;
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};

/// The two kinds of execution context a call chain can run under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The chain can yield control to a scheduler and resume later.
    Suspendable,
    /// The chain runs to completion on the calling thread.
    Blocking,
}

impl Mode {
    #[inline(always)]
    pub fn is_suspendable(self) -> bool {
        matches!(self, Mode::Suspendable)
    }
}

thread_local! {
    static SCOPES: RefCell<Vec<Mode>> = const { RefCell::new(Vec::new()) };
}

/// Enter an explicit context override on the current thread.
///
/// The override stays active until the returned guard is dropped, and takes
/// precedence over both the classification cache and the ambient runtime
/// probe. Overrides nest; the innermost one answers.
///
/// The guard must be dropped on the thread that created it, so it cannot be
/// held across an `.await` on a work-stealing runtime. To mark a whole
/// future, use [`scoped`] instead.
///
/// ```rust
/// use ambi::ctx::{self, Mode};
///
/// assert!(!ctx::is_suspendable());
/// {
///     let _scope = ctx::enter(Mode::Suspendable);
///     assert!(ctx::is_suspendable());
/// }
/// assert!(!ctx::is_suspendable());
/// ```
pub fn enter(mode: Mode) -> ScopeGuard {
    SCOPES.with(|scopes| scopes.borrow_mut().push(mode));
    ScopeGuard {
        _not_send: PhantomData,
    }
}

/// Override for the extent of one [`enter`] call. Pops on drop.
pub struct ScopeGuard {
    // pin the guard to the thread whose stack it pushed onto
    _not_send: PhantomData<*const ()>,
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        SCOPES.with(|scopes| {
            scopes.borrow_mut().pop();
        });
    }
}

/// Wrap a future so the given override is active whenever it is polled.
///
/// The override is entered at the start of every poll and left when the poll
/// returns, so it follows the future across threads on a work-stealing
/// runtime and never leaks to sibling tasks. Use this to mark a suspendable
/// chain under an executor that installs no ambient marker, or to mask the
/// ambient marker around plain code that ends up on a runtime thread.
pub fn scoped<F: Future>(mode: Mode, future: F) -> Scoped<F> {
    Scoped {
        mode,
        inner: future,
    }
}

/// Future returned by [`scoped`].
pub struct Scoped<F> {
    mode: Mode,
    inner: F,
}

impl<F: Future> Future for Scoped<F> {
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // SAFETY: `inner` is structurally pinned and never moved out of `this`.
        let this = unsafe { self.get_unchecked_mut() };
        let _scope = enter(this.mode);
        // SAFETY: re-pinning a field of a value we hold pinned.
        unsafe { Pin::new_unchecked(&mut this.inner) }.poll(cx)
    }
}

/// The innermost active override, if any.
pub(crate) fn current() -> Option<Mode> {
    SCOPES.with(|scopes| scopes.borrow().last().copied())
}

/// Read access to the whole override stack, innermost last.
pub(crate) fn with_stack<R>(f: impl FnOnce(&[Mode]) -> R) -> R {
    SCOPES.with(|scopes| f(&scopes.borrow()))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn guards_nest_and_unwind_in_order() {
        assert_eq!(current(), None);
        let outer = enter(Mode::Suspendable);
        assert_eq!(current(), Some(Mode::Suspendable));
        {
            let _inner = enter(Mode::Blocking);
            assert_eq!(current(), Some(Mode::Blocking));
        }
        assert_eq!(current(), Some(Mode::Suspendable));
        drop(outer);
        assert_eq!(current(), None);
    }

    #[test]
    fn stack_is_ordered_outermost_first() {
        let _outer = enter(Mode::Blocking);
        let _inner = enter(Mode::Suspendable);
        with_stack(|scopes| assert_eq!(scopes, [Mode::Blocking, Mode::Suspendable]));
    }
}
