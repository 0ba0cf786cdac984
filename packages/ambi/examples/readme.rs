//! One paired operation, invoked from a plain context and a suspendable one.

use ambi::pair;

fn main() -> ambi::Result<()> {
    let handler = pair(|()| "running to completion")
        .with(|()| async { "running cooperatively" })?;

    // plain entry: the plain side's value comes back directly
    println!("plain context: {}", handler.call(()).value()?);

    // suspendable entry: the suspendable side's future is awaited
    let runtime = tokio::runtime::Runtime::new()?;
    let body = runtime.block_on(async { handler.call(()).await });
    println!("suspendable context: {body}");

    Ok(())
}
