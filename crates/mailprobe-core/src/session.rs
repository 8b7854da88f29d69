//! The session collaborator used by operations.
//!
//! A [`Session`] owns a connection to a mail server and reports each step
//! as an [`ErrorCode`]. Operations never own the session: they hold a
//! [`SessionHandle`] injected at construction and lock it while they run.

use std::future::Future;
use std::sync::Arc;

use mailprobe_imap::ImapSession;
use tokio::sync::Mutex;

use crate::ErrorCode;

/// Connection and login steps of a mail session.
pub trait Session: Send {
    /// Connects unless already connected.
    fn connect_if_needed(&mut self) -> impl Future<Output = ErrorCode> + Send;

    /// Authenticates the connection.
    fn login(&mut self) -> impl Future<Output = ErrorCode> + Send;

    /// The server's raw reply to the last failed login.
    fn login_response(&self) -> Option<&str>;
}

/// Shared, non-owning access to a session.
pub type SessionHandle<S> = Arc<Mutex<S>>;

/// Wraps a session in a [`SessionHandle`].
#[must_use]
pub fn handle<S: Session>(session: S) -> SessionHandle<S> {
    Arc::new(Mutex::new(session))
}

impl Session for ImapSession {
    async fn connect_if_needed(&mut self) -> ErrorCode {
        match Self::connect_if_needed(self).await {
            Ok(()) => ErrorCode::None,
            Err(e) => {
                tracing::warn!(error = %e, "connect failed");
                ErrorCode::from_connect_error(&e)
            }
        }
    }

    async fn login(&mut self) -> ErrorCode {
        match Self::login(self).await {
            Ok(()) => ErrorCode::None,
            Err(e) => ErrorCode::from_login_error(&e, Self::login_response(self)),
        }
    }

    fn login_response(&self) -> Option<&str> {
        Self::login_response(self)
    }
}
