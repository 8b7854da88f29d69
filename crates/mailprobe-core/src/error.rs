//! Error types for the core library.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::account::ValidationError;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IMAP operation failed.
    #[error("IMAP error: {0}")]
    Imap(#[from] mailprobe_imap::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Account failed validation.
    #[error("Invalid account: {}", join_messages(.0))]
    Validation(Vec<ValidationError>),

    /// The operation queue shut down before the operation finished.
    #[error("Operation queue closed")]
    QueueClosed,
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ValidationError::message)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Outcome of a session step.
///
/// [`ErrorCode::None`] means success; every other value names a failure
/// category a caller can act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// No error.
    #[default]
    #[error("no error")]
    None,
    /// The server could not be reached or dropped the connection.
    #[error("connection failed")]
    Connection,
    /// The TLS handshake failed.
    #[error("TLS not available")]
    TlsNotAvailable,
    /// The server does not offer STARTTLS.
    #[error("STARTTLS not available")]
    StartTlsNotAvailable,
    /// The server certificate was rejected.
    #[error("certificate rejected")]
    Certificate,
    /// The server sent something we could not parse.
    #[error("parse error")]
    Parse,
    /// The credentials were rejected.
    #[error("authentication failed")]
    Authentication,
    /// Gmail: IMAP access is disabled for the account.
    #[error("IMAP is not enabled for this Gmail account")]
    GmailImapNotEnabled,
    /// Gmail: the account exceeded its IMAP bandwidth.
    #[error("Gmail bandwidth limit exceeded")]
    GmailExceededBandwidthLimit,
    /// Gmail: too many connections for the account.
    #[error("too many simultaneous Gmail connections")]
    GmailTooManySimultaneousConnections,
    /// Gmail: an app password is required.
    #[error("Gmail requires an application-specific password")]
    GmailApplicationSpecificPasswordRequired,
    /// `MobileMe` accounts moved to iCloud.
    #[error("MobileMe account moved to iCloud")]
    MobileMeMoved,
    /// Yahoo refused IMAP access (OCF12).
    #[error("Yahoo IMAP unavailable")]
    YahooUnavailable,
    /// A connect or command timeout expired.
    #[error("timed out")]
    Timeout,
    /// The operation was cancelled before it ran.
    #[error("cancelled")]
    Cancelled,
}

/// Login refusal phrases with the code they map to, matched case-insensitively.
const LOGIN_RESPONSE_PATTERNS: &[(&str, ErrorCode)] = &[
    ("not enabled for imap use", ErrorCode::GmailImapNotEnabled),
    ("web login required", ErrorCode::GmailImapNotEnabled),
    ("bandwidth limits", ErrorCode::GmailExceededBandwidthLimit),
    (
        "too many simultaneous connections",
        ErrorCode::GmailTooManySimultaneousConnections,
    ),
    (
        "maximum number of connections",
        ErrorCode::GmailTooManySimultaneousConnections,
    ),
    (
        "application-specific password required",
        ErrorCode::GmailApplicationSpecificPasswordRequired,
    ),
    ("me.com/move", ErrorCode::MobileMeMoved),
    ("ocf12", ErrorCode::YahooUnavailable),
];

impl ErrorCode {
    /// Returns true for [`ErrorCode::None`].
    #[must_use]
    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }

    /// Converts to a `Result`, with [`ErrorCode::None`] as `Ok`.
    ///
    /// # Errors
    ///
    /// Returns `self` when it is not [`ErrorCode::None`].
    pub const fn into_result(self) -> std::result::Result<(), Self> {
        match self {
            Self::None => Ok(()),
            other => Err(other),
        }
    }

    /// Classifies an error raised while connecting.
    #[must_use]
    pub const fn from_connect_error(error: &mailprobe_imap::Error) -> Self {
        use mailprobe_imap::Error as E;

        if error.is_certificate_error() {
            return Self::Certificate;
        }
        match error {
            E::Tls(_) | E::InvalidDnsName(_) => Self::TlsNotAvailable,
            E::StartTlsNotSupported => Self::StartTlsNotAvailable,
            E::Parse { .. } | E::Protocol(_) => Self::Parse,
            E::Timeout(_) => Self::Timeout,
            E::Auth(_) => Self::Authentication,
            E::Io(_) | E::No(_) | E::Bad(_) | E::Bye(_) | E::InvalidState(_) => Self::Connection,
        }
    }

    /// Classifies an error raised by a login attempt.
    ///
    /// Rejections are classified from the server's reply; anything else
    /// is treated like a connection failure.
    #[must_use]
    pub fn from_login_error(error: &mailprobe_imap::Error, response: Option<&str>) -> Self {
        use mailprobe_imap::Error as E;

        match error {
            E::No(text) | E::Bad(text) => Self::from_login_response(response.unwrap_or(text)),
            E::Auth(_) => Self::Authentication,
            other => Self::from_connect_error(other),
        }
    }

    /// Classifies the text of a refused login.
    ///
    /// Some providers explain why they refuse a login in the response text;
    /// known phrases map to a specific code, anything else is
    /// [`ErrorCode::Authentication`].
    #[must_use]
    pub fn from_login_response(response: &str) -> Self {
        let lower = response.to_lowercase();
        LOGIN_RESPONSE_PATTERNS
            .iter()
            .find(|(needle, _)| lower.contains(needle))
            .map_or(Self::Authentication, |(_, code)| *code)
    }

    /// Returns true for codes produced by a refused login.
    #[must_use]
    pub const fn is_authentication_failure(self) -> bool {
        matches!(
            self,
            Self::Authentication
                | Self::GmailImapNotEnabled
                | Self::GmailExceededBandwidthLimit
                | Self::GmailTooManySimultaneousConnections
                | Self::GmailApplicationSpecificPasswordRequired
                | Self::MobileMeMoved
                | Self::YahooUnavailable
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn none_is_success() {
        assert!(ErrorCode::default().is_none());
        assert_eq!(ErrorCode::None.into_result(), Ok(()));
        assert_eq!(
            ErrorCode::Authentication.into_result(),
            Err(ErrorCode::Authentication)
        );
    }

    #[test]
    fn connect_errors() {
        use mailprobe_imap::Error as E;

        let io = E::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        ));
        assert_eq!(ErrorCode::from_connect_error(&io), ErrorCode::Connection);
        assert_eq!(
            ErrorCode::from_connect_error(&E::Timeout(Duration::from_secs(1))),
            ErrorCode::Timeout
        );
        assert_eq!(
            ErrorCode::from_connect_error(&E::StartTlsNotSupported),
            ErrorCode::StartTlsNotAvailable
        );
        assert_eq!(
            ErrorCode::from_connect_error(&E::Protocol("junk".into())),
            ErrorCode::Parse
        );
        assert_eq!(
            ErrorCode::from_connect_error(&E::Bye("go away".into())),
            ErrorCode::Connection
        );
    }

    #[test]
    fn login_errors_use_response_text() {
        use mailprobe_imap::Error as E;

        let err = E::No("Invalid credentials".into());
        assert_eq!(
            ErrorCode::from_login_error(&err, Some("NO [AUTHENTICATIONFAILED] Invalid credentials")),
            ErrorCode::Authentication
        );

        let err = E::No("[ALERT] Application-specific password required".into());
        assert_eq!(
            ErrorCode::from_login_error(&err, None),
            ErrorCode::GmailApplicationSpecificPasswordRequired
        );

        assert_eq!(
            ErrorCode::from_login_error(&E::Timeout(Duration::from_secs(5)), None),
            ErrorCode::Timeout
        );
    }

    #[test]
    fn provider_phrases() {
        let cases = [
            (
                "NO [ALERT] Your account is not enabled for IMAP use.",
                ErrorCode::GmailImapNotEnabled,
            ),
            (
                "NO [ALERT] Account exceeded command or bandwidth limits.",
                ErrorCode::GmailExceededBandwidthLimit,
            ),
            (
                "NO [ALERT] Too many simultaneous connections. (Failure)",
                ErrorCode::GmailTooManySimultaneousConnections,
            ),
            (
                "NO See http://me.com/move for details",
                ErrorCode::MobileMeMoved,
            ),
            (
                "NO [UNAVAILABLE] OCF12 server error",
                ErrorCode::YahooUnavailable,
            ),
            ("NO LOGIN failed", ErrorCode::Authentication),
        ];
        for (text, expected) in cases {
            assert_eq!(ErrorCode::from_login_response(text), expected, "{text}");
            assert!(expected.is_authentication_failure());
        }
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&ErrorCode::GmailImapNotEnabled).unwrap();
        assert_eq!(json, "\"gmail_imap_not_enabled\"");
        let code: ErrorCode = serde_json::from_str("\"timeout\"").unwrap();
        assert_eq!(code, ErrorCode::Timeout);
    }

    #[test]
    fn validation_error_message() {
        let err = Error::Validation(vec![ValidationError::EmptyName, ValidationError::EmptyImapHost]);
        assert_eq!(
            err.to_string(),
            "Invalid account: Account name is required; IMAP server is required"
        );
    }

    proptest! {
        #[test]
        fn login_response_never_succeeds(text in ".*") {
            let code = ErrorCode::from_login_response(&text);
            prop_assert!(!code.is_none());
            prop_assert!(code.is_authentication_failure());
        }
    }
}
