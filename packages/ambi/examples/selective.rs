//! Hand-rolled dispatch directly on the context classifier, without pairing.

use ambi::ctx;
use ambi::{BoxedFuture, Dispatched};

fn blocking_handler() -> &'static str {
    "blocking handler"
}

async fn suspendable_handler() -> &'static str {
    "suspendable handler"
}

// forward the caller's identity so each calling line is classified on its
// own, not this wrapper's shared body
#[track_caller]
fn handler() -> Dispatched<&'static str, BoxedFuture<&'static str>> {
    if ctx::is_suspendable() {
        Dispatched::pending(Box::pin(suspendable_handler()))
    } else {
        Dispatched::ready(blocking_handler())
    }
}

fn main() -> ambi::Result<()> {
    println!("plain context: {}", handler().value()?);

    let runtime = tokio::runtime::Runtime::new()?;
    let chosen = runtime.block_on(async { handler().await });
    println!("suspendable context: {chosen}");

    Ok(())
}
