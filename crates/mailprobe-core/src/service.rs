//! Account check service.
//!
//! Ties an [`Account`] to an IMAP session, runs the account check on an
//! [`AsyncConnection`] and summarizes the outcome as a [`CheckReport`].

use std::time::Instant;

use chrono::{DateTime, Utc};
use mailprobe_imap::{ImapSession, ServerType};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::account::{Account, Security, validate_account};
use crate::operation::AsyncConnection;
use crate::{Error, ErrorCode, Result};

/// Outcome of checking one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    /// Account name.
    pub account: String,
    /// IMAP server host.
    pub host: String,
    /// IMAP server port.
    pub port: u16,
    /// Connection security.
    pub security: Security,
    /// Outcome code.
    pub error: ErrorCode,
    /// Human-readable outcome.
    pub message: String,
    /// Server reply to a failed login, without its tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_response: Option<String>,
    /// Detected server software.
    pub server: String,
    /// Advice for fixing a failed login.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// When the check finished.
    pub checked_at: DateTime<Utc>,
    /// How long the check took, in milliseconds.
    pub elapsed_ms: u64,
}

impl CheckReport {
    /// Returns true if the account passed the check.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Checks that `account` can connect and log in.
///
/// The connection is logged out afterwards, whatever the outcome.
///
/// # Errors
///
/// Returns [`Error::Validation`] if the account is incomplete. Connection
/// and login failures are not errors; they are reported in the
/// [`CheckReport`].
pub async fn check_account(account: &Account) -> Result<CheckReport> {
    validate_account(account).map_err(Error::Validation)?;

    info!(account = %account.name, host = %account.imap.host, "checking account");
    let started = Instant::now();

    let connection = AsyncConnection::new(ImapSession::new(account.session_config()));
    let operation = connection.check_account().await?;

    let server = {
        let mut session = connection.session().lock().await;
        let server = session.server_type();
        session.disconnect().await;
        server
    };
    connection.shutdown().await;

    let error = operation.error();
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    info!(account = %account.name, %error, elapsed_ms, "account check finished");

    Ok(CheckReport {
        account: account.name.clone(),
        host: account.imap.host.clone(),
        port: account.imap.port,
        security: account.imap.security,
        error,
        message: error.to_string(),
        login_response: operation.login_response().map(ToOwned::to_owned),
        server: server.name().to_string(),
        hint: hint(error, server).map(ToOwned::to_owned),
        checked_at: Utc::now(),
        elapsed_ms,
    })
}

/// Advice for a failed check.
fn hint(error: ErrorCode, server: ServerType) -> Option<&'static str> {
    match error {
        ErrorCode::GmailImapNotEnabled => Some("enable IMAP in the Gmail web settings"),
        ErrorCode::GmailApplicationSpecificPasswordRequired => {
            Some("create an app password in your Google account security settings")
        }
        ErrorCode::MobileMeMoved => Some("the account moved to iCloud; use imap.mail.me.com"),
        ErrorCode::Certificate => Some("the server certificate is not trusted"),
        ErrorCode::StartTlsNotAvailable => {
            Some("the server does not offer STARTTLS; try implicit TLS on port 993")
        }
        ErrorCode::Authentication => server.login_hint(),
        _ => None,
    }
}
