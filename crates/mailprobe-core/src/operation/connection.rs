//! A session paired with the queue that runs its operations.

use super::{CancelToken, CheckAccountOperation, Operation, OperationHandle, OperationQueue};
use crate::Result;
use crate::session::{self, Session, SessionHandle};

/// Runs operations against one session, one at a time.
#[derive(Debug)]
pub struct AsyncConnection<S> {
    session: SessionHandle<S>,
    queue: OperationQueue,
}

impl<S: Session + 'static> AsyncConnection<S> {
    /// Creates a connection around `session`.
    ///
    /// Must be called inside a tokio runtime.
    #[must_use]
    pub fn new(session: S) -> Self {
        Self::with_handle(session::handle(session))
    }

    /// Creates a connection around a session shared with other code.
    #[must_use]
    pub fn with_handle(session: SessionHandle<S>) -> Self {
        Self {
            session,
            queue: OperationQueue::new(),
        }
    }

    /// Returns the shared session.
    #[must_use]
    pub const fn session(&self) -> &SessionHandle<S> {
        &self.session
    }

    /// Builds an account check bound to this connection's session.
    #[must_use]
    pub fn check_account_operation(&self) -> CheckAccountOperation<S> {
        CheckAccountOperation::new(SessionHandle::clone(&self.session))
    }

    /// Queues an operation.
    pub fn start<O: Operation>(&self, operation: O) -> OperationHandle<O> {
        self.queue.start(operation)
    }

    /// Queues an operation with a completion callback.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::QueueClosed`] if the queue stopped.
    pub fn start_with<O, F>(&self, operation: O, callback: F) -> Result<CancelToken>
    where
        O: Operation,
        F: FnOnce(O) + Send + 'static,
    {
        self.queue.start_with(operation, callback)
    }

    /// Queues an account check and waits for it.
    ///
    /// # Errors
    ///
    /// Returns an error only if the queue stopped; the check's own outcome
    /// is in [`CheckAccountOperation::error`].
    pub async fn check_account(&self) -> Result<CheckAccountOperation<S>> {
        self.start(self.check_account_operation()).wait().await
    }

    /// Waits for queued operations and stops the queue.
    pub async fn shutdown(self) {
        self.queue.shutdown().await;
    }
}
