//! Runs blocking work off the calling thread and exposes it as a future.

use std::thread;
use std::time::Duration;

use futures::channel::oneshot;

use crate::error::ExportError;

/// Runs `task` on a dedicated thread and resolves once it finishes.
///
/// The caller is never blocked. If the task panics, the future resolves to
/// [`ExportError::WorkerLost`].
pub async fn run_in_background<T, F>(task: F) -> Result<T, ExportError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    thread::Builder::new()
        .name("noisy-gradient-export".into())
        .spawn(move || {
            // The receiver may be gone if the export was abandoned.
            let _ = tx.send(task());
        })?;
    rx.await.map_err(|_| ExportError::WorkerLost)
}

/// Resolves after `duration` without blocking the caller.
pub async fn delay(duration: Duration) -> Result<(), ExportError> {
    if duration.is_zero() {
        return Ok(());
    }
    run_in_background(move || thread::sleep(duration)).await
}
