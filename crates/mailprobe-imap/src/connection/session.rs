//! Stateful IMAP session.
//!
//! `ImapSession` wraps the type-state [`Client`] behind a `&mut self` API
//! so callers can ask for a connection and a login without tracking the
//! state transitions themselves:
//!
//! ```ignore
//! use mailprobe_imap::{Config, Credentials, ImapSession, SessionConfig};
//!
//! let config = SessionConfig::new(
//!     Config::new("imap.example.com"),
//!     Credentials::password("user@example.com", "secret"),
//! );
//! let mut session = ImapSession::new(config);
//!
//! session.connect_if_needed().await?;
//! if let Err(e) = session.login().await {
//!     eprintln!("{e}: {:?}", session.login_response());
//! }
//! ```

use tracing::{debug, info, warn};

use super::client::{Authenticated, Client, Greeted, NotAuthenticated, with_timeout};
use super::{Config, ImapStream, Security, connect};
use crate::auth::Credentials;
use crate::quirks::ServerType;
use crate::types::Capability;
use crate::{Error, Result};

/// Configuration for an IMAP session.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Where and how to connect.
    pub connection: Option<Config>,
    /// How to authenticate.
    pub credentials: Credentials,
}

impl SessionConfig {
    /// Creates a session configuration.
    #[must_use]
    pub const fn new(connection: Config, credentials: Credentials) -> Self {
        Self {
            connection: Some(connection),
            credentials,
        }
    }

    /// Replaces the credentials.
    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }
}

enum SessionState {
    Disconnected,
    Connected(Client<ImapStream, NotAuthenticated>),
    LoggedIn(Client<ImapStream, Authenticated>),
}

/// A single IMAP connection that connects and logs in on demand.
pub struct ImapSession {
    config: SessionConfig,
    state: SessionState,
    login_response: Option<String>,
}

impl std::fmt::Debug for ImapSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImapSession")
            .field("config", &self.config)
            .field("connected", &self.is_connected())
            .field("authenticated", &self.is_authenticated())
            .field("login_response", &self.login_response)
            .finish()
    }
}

impl ImapSession {
    /// Creates a disconnected session.
    #[must_use]
    pub const fn new(config: SessionConfig) -> Self {
        Self {
            config,
            state: SessionState::Disconnected,
            login_response: None,
        }
    }

    /// Returns the session configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns true if a connection is open.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        !matches!(self.state, SessionState::Disconnected)
    }

    /// Returns true if the connection is authenticated.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::LoggedIn(_))
    }

    /// Returns the capabilities of the open connection.
    #[must_use]
    pub fn capabilities(&self) -> &[Capability] {
        match &self.state {
            SessionState::Disconnected => &[],
            SessionState::Connected(client) => client.capabilities(),
            SessionState::LoggedIn(client) => client.capabilities(),
        }
    }

    /// Returns the greeting text of the open connection.
    #[must_use]
    pub fn greeting(&self) -> Option<&str> {
        match &self.state {
            SessionState::Disconnected => None,
            SessionState::Connected(client) => Some(client.greeting()),
            SessionState::LoggedIn(client) => Some(client.greeting()),
        }
    }

    /// Guesses the server software from capabilities and greeting.
    #[must_use]
    pub fn server_type(&self) -> ServerType {
        ServerType::detect(self.capabilities(), self.greeting())
    }

    /// Returns the server's reply to the last failed login, without its tag.
    #[must_use]
    pub fn login_response(&self) -> Option<&str> {
        self.login_response.as_deref()
    }

    /// Opens the connection unless one is already open.
    ///
    /// The TCP connect, TLS handshake, greeting and STARTTLS upgrade all run
    /// under the configured connect timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection config is set, or if the server
    /// cannot be reached, refuses the greeting, or lacks STARTTLS.
    pub async fn connect_if_needed(&mut self) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }
        let Some(config) = self.config.connection.clone() else {
            return Err(Error::InvalidState("no connection configured".to_string()));
        };

        info!(address = %config.address(), security = %config.security, "connecting");
        let greeted = with_timeout(Some(config.connect_timeout), open(&config)).await?;

        self.state = match greeted {
            Greeted::NotAuthenticated(client) => {
                SessionState::Connected(client.with_io_timeout(config.io_timeout))
            }
            Greeted::PreAuthenticated(client) => {
                info!("server pre-authenticated the connection");
                SessionState::LoggedIn(client.with_io_timeout(config.io_timeout))
            }
        };
        debug!(server = %self.server_type(), "connected");
        Ok(())
    }

    /// Authenticates the open connection.
    ///
    /// A rejected login keeps the connection open and records the server's
    /// reply; any other failure closes it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] when not connected, [`Error::No`] or
    /// [`Error::Bad`] when the server rejects the credentials, and
    /// connection errors otherwise.
    pub async fn login(&mut self) -> Result<()> {
        let client = match std::mem::replace(&mut self.state, SessionState::Disconnected) {
            SessionState::Disconnected => {
                return Err(Error::InvalidState("not connected".to_string()));
            }
            SessionState::LoggedIn(client) => {
                self.state = SessionState::LoggedIn(client);
                return Ok(());
            }
            SessionState::Connected(client) => client,
        };
        self.login_response = None;

        match client.authenticate(&self.config.credentials).await {
            Ok(client) => {
                info!(username = self.config.credentials.username(), "logged in");
                self.state = SessionState::LoggedIn(client);
                Ok(())
            }
            Err((e, client)) => {
                self.login_response = match &e {
                    Error::Bye(text) => Some(format!("BYE {text}")),
                    _ => client.last_status().map(ToOwned::to_owned),
                };
                warn!(
                    error = %e,
                    response = self.login_response.as_deref().unwrap_or_default(),
                    "login failed"
                );
                if e.is_rejection() {
                    self.state = SessionState::Connected(client);
                }
                Err(e)
            }
        }
    }

    /// Logs out and closes the connection, if one is open.
    pub async fn disconnect(&mut self) {
        let result = match std::mem::replace(&mut self.state, SessionState::Disconnected) {
            SessionState::Disconnected => return,
            SessionState::Connected(client) => client.logout().await,
            SessionState::LoggedIn(client) => client.logout().await,
        };
        if let Err(e) = result {
            debug!(error = %e, "logout failed");
        }
    }
}

/// Connects, reads the greeting and upgrades with STARTTLS if configured.
async fn open(config: &Config) -> Result<Greeted<ImapStream>> {
    let stream = connect(config).await?;
    let greeted = Client::from_stream(stream).await?;

    match (config.security, greeted) {
        (Security::StartTls, Greeted::NotAuthenticated(client)) => Ok(
            Greeted::NotAuthenticated(client.starttls(&config.host).await?),
        ),
        (Security::StartTls, Greeted::PreAuthenticated(_)) => Err(Error::Protocol(
            "PREAUTH greeting on a connection that requires STARTTLS".to_string(),
        )),
        (_, greeted) => Ok(greeted),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_login_requires_connection() {
        let mut session = ImapSession::new(SessionConfig::default());
        assert!(matches!(session.login().await, Err(Error::InvalidState(_))));
        assert!(session.login_response().is_none());
    }

    #[tokio::test]
    async fn test_connect_without_config() {
        let mut session = ImapSession::new(SessionConfig::default());
        assert!(matches!(
            session.connect_if_needed().await,
            Err(Error::InvalidState(_))
        ));
        assert!(!session.is_connected());
    }

    #[tokio::test]
    async fn test_disconnect_when_disconnected_is_noop() {
        let mut session = ImapSession::new(SessionConfig::default());
        session.disconnect().await;
        assert!(!session.is_connected());
        assert_eq!(session.server_type(), ServerType::Unknown);
        assert!(session.capabilities().is_empty());
    }

    #[test]
    fn test_debug_hides_password() {
        let config = SessionConfig::new(
            Config::new("imap.example.com"),
            Credentials::password("user", "hunter2"),
        );
        let debug = format!("{:?}", ImapSession::new(config));
        assert!(debug.contains("imap.example.com"));
        assert!(!debug.contains("hunter2"));
    }
}
