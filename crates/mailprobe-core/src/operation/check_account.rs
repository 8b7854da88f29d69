//! Account check: connect if needed, then log in.

use tracing::{debug, info, warn};

use super::Operation;
use crate::ErrorCode;
use crate::session::{Session, SessionHandle};

/// Progress of a [`CheckAccountOperation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckState {
    /// Not run yet.
    #[default]
    NotStarted,
    /// Waiting for the connection.
    Connecting,
    /// The connect step failed.
    ConnectFailed,
    /// Waiting for the login reply.
    LoggingIn,
    /// The login step failed.
    LoginFailed,
    /// Both steps succeeded.
    LoginSucceeded,
}

impl CheckState {
    /// Returns true once a run has finished.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::ConnectFailed | Self::LoginFailed | Self::LoginSucceeded
        )
    }
}

/// What happens to a stored login response when a later run does not fail
/// at login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetentionPolicy {
    /// Keep it until a later login failure replaces it.
    #[default]
    Preserve,
    /// Clear it at the start of every run.
    ClearOnRun,
}

/// Verifies that an account is reachable and its credentials are accepted.
///
/// The operation runs `connect_if_needed` and, if that succeeds, `login` on
/// the bound session. The code of the last step that ran becomes the
/// operation's [`error`](Self::error). A failed login also captures a copy
/// of the session's login response.
#[derive(Debug)]
pub struct CheckAccountOperation<S> {
    session: SessionHandle<S>,
    login_response: Option<String>,
    error: ErrorCode,
    state: CheckState,
    retention: RetentionPolicy,
}

impl<S: Session> CheckAccountOperation<S> {
    /// Creates an operation bound to `session`.
    #[must_use]
    pub fn new(session: SessionHandle<S>) -> Self {
        Self {
            session,
            login_response: None,
            error: ErrorCode::None,
            state: CheckState::NotStarted,
            retention: RetentionPolicy::default(),
        }
    }

    /// Sets the retention policy for the stored login response.
    #[must_use]
    pub const fn with_retention(mut self, retention: RetentionPolicy) -> Self {
        self.retention = retention;
        self
    }

    /// Runs the check.
    ///
    /// The session stays locked for the whole run.
    pub async fn run(&mut self) {
        let mut session = self.session.lock().await;

        if self.retention == RetentionPolicy::ClearOnRun {
            self.login_response = None;
        }

        self.state = CheckState::Connecting;
        let connect = session.connect_if_needed().await;
        if !connect.is_none() {
            warn!(error = %connect, "account check: connect failed");
            self.state = CheckState::ConnectFailed;
            self.error = connect;
            return;
        }
        self.state = CheckState::LoggingIn;
        let login = session.login().await;
        if login.is_none() {
            info!("account check: login succeeded");
            self.state = CheckState::LoginSucceeded;
        } else {
            self.login_response = session.login_response().map(ToOwned::to_owned);
            warn!(
                error = %login,
                response = self.login_response.as_deref().unwrap_or_default(),
                "account check: login failed"
            );
            self.state = CheckState::LoginFailed;
        }
        self.error = login;
    }
}

impl<S> CheckAccountOperation<S> {
    /// The server's reply to the login that failed, if any.
    #[must_use]
    pub fn login_response(&self) -> Option<&str> {
        self.login_response.as_deref()
    }

    /// Outcome of the last run; [`ErrorCode::None`] before the first.
    #[must_use]
    pub const fn error(&self) -> ErrorCode {
        self.error
    }

    /// Where the last run got to.
    #[must_use]
    pub const fn state(&self) -> CheckState {
        self.state
    }

    /// The retention policy in effect.
    #[must_use]
    pub const fn retention(&self) -> RetentionPolicy {
        self.retention
    }

    /// The session this operation runs against.
    #[must_use]
    pub const fn session(&self) -> &SessionHandle<S> {
        &self.session
    }
}

impl<S: Session + 'static> Operation for CheckAccountOperation<S> {
    async fn run(&mut self) {
        Self::run(self).await;
    }

    fn error(&self) -> ErrorCode {
        self.error
    }

    fn set_error(&mut self, error: ErrorCode) {
        debug!(%error, "account check outcome overridden");
        self.error = error;
    }
}
