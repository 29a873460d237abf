use crate::error::ModelError;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

/// Runs a blocking external call with an upper bound on its duration
///
/// The call runs on its own thread. If it has not answered within `timeout`
/// the caller gets [`ModelError::Timeout`] immediately; the worker thread is
/// left to finish on its own and its result is discarded.
pub fn call_with_deadline<T, F>(timeout: Duration, call: F) -> Result<T, ModelError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ModelError> + Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel(1);
    thread::Builder::new()
        .name("mammoscreen-call".to_string())
        .spawn(move || {
            // Receiver is gone once the deadline passed
            let _ = tx.send(call());
        })
        .map_err(|e| ModelError::Unavailable(format!("failed to spawn call thread: {}", e)))?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => Err(ModelError::Timeout(timeout)),
        Err(RecvTimeoutError::Disconnected) => Err(ModelError::Unavailable(
            "external call terminated without a result".to_string(),
        )),
    }
}
