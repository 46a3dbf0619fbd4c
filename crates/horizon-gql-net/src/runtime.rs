//! Shared async runtime behind the blocking client.
//!
//! [`GraphQLClient::execute`](crate::GraphQLClient::execute) is synchronous;
//! the HTTP transport drives `reqwest` on a lazily created multi-threaded
//! tokio runtime through [`block_on`].

use std::sync::OnceLock;

use tokio::runtime::Runtime;

use crate::error::TransportError;

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Get the shared runtime, creating it on first use.
pub fn get() -> Result<&'static Runtime, TransportError> {
    if let Some(runtime) = RUNTIME.get() {
        return Ok(runtime);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("horizon-gql-net")
        .enable_all()
        .build()
        .map_err(|e| TransportError::Runtime(e.to_string()))?;

    // A concurrent caller may have installed its runtime first; ours is
    // dropped in that case.
    let _ = RUNTIME.set(runtime);
    RUNTIME
        .get()
        .ok_or_else(|| TransportError::Runtime("runtime was not installed".into()))
}

/// Block on a future using the shared runtime.
///
/// # Warning
///
/// Do not call this from within an async context; tokio panics when a
/// runtime is blocked on from one of its own worker threads. Wrap blocking
/// calls in `tokio::task::spawn_blocking` instead.
pub fn block_on<F: std::future::Future>(future: F) -> Result<F::Output, TransportError> {
    Ok(get()?.block_on(future))
}
