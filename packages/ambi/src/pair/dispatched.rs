use std::pin::Pin;
use std::task::{Context, Poll};

use anyhow::bail;

/// Tagged outcome of one dispatched call.
///
/// Holds either the plain side's already-computed value or the suspendable
/// side's future, untouched. When both sides agree on their output type the
/// whole thing is a [`Future`], so a suspendable caller just awaits it -
/// the plain variant resolves on the first poll without suspending, the
/// suspended variant forwards every poll to the inner future.
///
/// A plain caller extracts its result with [`value`](Self::value).
pub struct Dispatched<T, F> {
    inner: Inner<T, F>,
}

enum Inner<T, F> {
    Ready(Option<T>),
    Suspended(F),
}

impl<T, F> Dispatched<T, F> {
    /// A call that already ran to completion.
    pub fn ready(value: T) -> Self {
        Self {
            inner: Inner::Ready(Some(value)),
        }
    }

    /// A call forwarded to a suspendable implementation, unevaluated.
    pub fn pending(future: F) -> Self {
        Self {
            inner: Inner::Suspended(future),
        }
    }

    /// Whether the call ran a plain implementation to completion.
    pub fn is_ready(&self) -> bool {
        matches!(self.inner, Inner::Ready(_))
    }

    /// The plain side's result.
    ///
    /// Errors when the call was dispatched to the suspendable side - that
    /// result only exists by awaiting, and asking for it here means the
    /// caller mislabeled its own context.
    pub fn value(self) -> crate::Result<T> {
        match self.inner {
            Inner::Ready(Some(value)) => Ok(value),
            Inner::Ready(None) => bail!("plain result already taken by an earlier poll"),
            Inner::Suspended(_) => {
                bail!("dispatched to the suspendable implementation; await it instead")
            }
        }
    }

    /// The suspendable side's future, if the call was dispatched there.
    ///
    /// This is the escape hatch for lenient pairs whose two sides disagree
    /// on their output type: such a [`Dispatched`] is not a [`Future`], and
    /// the caller takes the inner future out to await it on its own terms.
    pub fn suspended(self) -> Option<F> {
        match self.inner {
            Inner::Suspended(future) => Some(future),
            Inner::Ready(_) => None,
        }
    }
}

impl<T, F> Future for Dispatched<T, F>
where
    F: Future<Output = T>,
{
    type Output = T;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // SAFETY: `Suspended` is structurally pinned and never moved;
        // `Ready` is not pinned, its payload is moved out exactly once.
        let inner = unsafe { &mut self.get_unchecked_mut().inner };
        match inner {
            Inner::Ready(value) => {
                Poll::Ready(value.take().expect("polled after completion"))
            }
            // SAFETY: see above
            Inner::Suspended(future) => unsafe { Pin::new_unchecked(future) }.poll(cx),
        }
    }
}
