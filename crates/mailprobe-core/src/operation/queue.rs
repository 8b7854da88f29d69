//! Serial operation queue.

use std::any::type_name;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::Operation;
use crate::{Error, ErrorCode, Result};

/// A queued unit of work.
type Job = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Cancellation flag shared between a caller and a queued operation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Requests cancellation.
    ///
    /// An operation that has not started yet is skipped and finishes with
    /// [`ErrorCode::Cancelled`]. One that is already running completes.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns true if cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// A submitted operation.
#[derive(Debug)]
pub struct OperationHandle<O> {
    receiver: oneshot::Receiver<O>,
    token: CancelToken,
}

impl<O> OperationHandle<O> {
    /// Requests cancellation; see [`CancelToken::cancel`].
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Waits for the operation to finish and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueueClosed`] if the queue stopped before the
    /// operation finished.
    pub async fn wait(self) -> Result<O> {
        self.receiver.await.map_err(|_| Error::QueueClosed)
    }
}

/// Runs operations one after another on a background task.
///
/// Must be created inside a tokio runtime. Dropping the queue lets the
/// worker finish what is already queued and then exit.
#[derive(Debug)]
pub struct OperationQueue {
    sender: mpsc::UnboundedSender<Job>,
    worker: JoinHandle<()>,
}

impl OperationQueue {
    /// Creates a queue and spawns its worker.
    #[must_use]
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();

        let worker = tokio::spawn(async move {
            while let Some(job) = receiver.recv().await {
                job.await;
            }
            debug!("operation queue drained");
        });

        Self { sender, worker }
    }

    /// Queues an operation; await the handle to get it back.
    pub fn start<O: Operation>(&self, operation: O) -> OperationHandle<O> {
        let (sender, receiver) = oneshot::channel();
        // On a closed queue the job and its sender are dropped, so `wait`
        // reports QueueClosed.
        let token = self
            .submit(operation, move |operation| {
                // The caller may have dropped the handle.
                let _ = sender.send(operation);
            })
            .unwrap_or_default();
        OperationHandle { receiver, token }
    }

    /// Queues an operation and calls `callback` with it when it finishes.
    ///
    /// The callback runs on the queue's worker; keep it short.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueueClosed`] if the worker is gone; the callback
    /// is dropped without being called.
    pub fn start_with<O, F>(&self, operation: O, callback: F) -> Result<CancelToken>
    where
        O: Operation,
        F: FnOnce(O) + Send + 'static,
    {
        self.submit(operation, callback)
    }

    /// Returns true while the worker is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.worker.is_finished()
    }

    /// Stops accepting operations and waits for the queued ones to finish.
    pub async fn shutdown(self) {
        let Self { sender, worker } = self;
        drop(sender);
        if let Err(e) = worker.await {
            warn!(error = %e, "operation queue worker failed");
        }
    }

    fn submit<O, F>(&self, operation: O, done: F) -> Result<CancelToken>
    where
        O: Operation,
        F: FnOnce(O) + Send + 'static,
    {
        let token = CancelToken::default();
        let flag = token.clone();

        let job: Job = Box::pin(async move {
            let mut operation = operation;
            if flag.is_cancelled() {
                debug!(operation = type_name::<O>(), "skipping cancelled operation");
                operation.set_error(ErrorCode::Cancelled);
            } else {
                debug!(operation = type_name::<O>(), "running operation");
                operation.run().await;
            }
            done(operation);
        });

        if self.sender.send(job).is_err() {
            warn!(operation = type_name::<O>(), "operation queue closed");
            return Err(Error::QueueClosed);
        }
        Ok(token)
    }
}

impl Default for OperationQueue {
    fn default() -> Self {
        Self::new()
    }
}
