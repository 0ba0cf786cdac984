#![cfg(feature = "tokio")]

use std::pin::pin;
use std::task::{Context, Poll, Waker};

use ambi::ctx::{self, ClassifyError, Mode};

#[test]
fn plain_toplevel_is_not_suspendable() {
    assert!(!ctx::is_suspendable());
}

#[tokio::test]
async fn task_context_is_suspendable() {
    assert!(ctx::is_suspendable());
}

#[test]
fn repeated_classification_is_stable() {
    for _ in 0..3 {
        assert!(!ctx::is_suspendable());
    }
}

#[tokio::test]
async fn repeated_classification_is_stable_in_task_context() {
    for _ in 0..3 {
        assert!(ctx::is_suspendable());
    }
}

fn probe() -> bool {
    ctx::is_suspendable()
}

#[test]
fn first_observation_pins_the_call_site() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    assert!(runtime.block_on(async { probe() }));
    // the line inside `probe` keeps its first classification even though
    // this call reaches it without a runtime
    assert!(probe());
}

#[tokio::test]
async fn sees_through_lazy_pipelines() {
    let observed: Vec<bool> = (0..1).map(|_| ctx::is_suspendable()).collect();
    assert_eq!(observed, vec![true]);
}

#[test]
fn explicit_suspendable_scope_marks_plain_code() {
    assert!(!ctx::is_suspendable());
    let _scope = ctx::enter(Mode::Suspendable);
    assert!(ctx::is_suspendable());
}

#[test]
fn override_ends_with_its_guard() {
    {
        let _scope = ctx::enter(Mode::Suspendable);
        assert!(ctx::is_suspendable());
    }
    assert!(!ctx::is_suspendable());
}

#[tokio::test]
async fn blocking_override_masks_the_runtime() {
    assert!(ctx::is_suspendable());
    let _scope = ctx::enter(Mode::Blocking);
    assert!(!ctx::is_suspendable());
}

#[test]
fn depth_indexes_outward_through_overrides() {
    let _outer = ctx::enter(Mode::Suspendable);
    let _inner = ctx::enter(Mode::Blocking);
    assert_eq!(ctx::classify_at(0), Ok(false));
    assert_eq!(ctx::classify_at(1), Ok(true));
    // one past the outermost override is the ambient context; no runtime here
    assert_eq!(ctx::classify_at(2), Ok(false));
    assert_eq!(
        ctx::classify_at(3),
        Err(ClassifyError::StackUnderflow {
            depth: 3,
            available: 3
        })
    );
}

#[tokio::test]
async fn depth_reaches_the_ambient_runtime() {
    let _scope = ctx::enter(Mode::Blocking);
    assert_eq!(ctx::classify_at(0), Ok(false));
    assert_eq!(ctx::classify_at(1), Ok(true));
}

#[test]
fn depth_past_the_stack_is_an_error() {
    let err = ctx::classify_at(1).unwrap_err();
    assert_eq!(
        err.to_string(),
        "context depth 1 exceeds the 1 active context(s)"
    );
}

#[tokio::test]
async fn scoped_blocking_masks_each_poll() {
    let inside = ctx::scoped(Mode::Blocking, async { ctx::is_suspendable() }).await;
    assert!(!inside);
}

#[test]
fn scoped_suspendable_marks_chains_without_a_runtime() {
    let mut future = pin!(ctx::scoped(Mode::Suspendable, async {
        ctx::is_suspendable()
    }));
    let mut cx = Context::from_waker(Waker::noop());
    match future.as_mut().poll(&mut cx) {
        Poll::Ready(inside) => assert!(inside),
        Poll::Pending => unreachable!("future has no suspension points"),
    }
}
