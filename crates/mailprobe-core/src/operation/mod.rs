//! Asynchronous operations and the queue that runs them.
//!
//! An [`Operation`] is one unit of work against a session. Operations are
//! submitted to an [`OperationQueue`], which runs them one at a time on a
//! background task and hands each finished operation back to the caller.

mod check_account;
mod connection;
mod queue;

use std::future::Future;

pub use check_account::{CheckAccountOperation, CheckState, RetentionPolicy};
pub use connection::AsyncConnection;
pub use queue::{CancelToken, OperationHandle, OperationQueue};

use crate::ErrorCode;

/// A unit of work with a stored outcome.
pub trait Operation: Send + 'static {
    /// Runs the operation to completion, recording its outcome.
    fn run(&mut self) -> impl Future<Output = ()> + Send;

    /// Outcome of the last run.
    fn error(&self) -> ErrorCode;

    /// Overrides the outcome, e.g. when the queue skips the operation.
    fn set_error(&mut self, error: ErrorCode);
}
