//! Error types for the IMAP library.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during IMAP operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error during network operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// TLS handshake or encryption error.
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    /// Invalid DNS name for TLS.
    #[error("Invalid DNS name: {0}")]
    InvalidDnsName(#[from] rustls::pki_types::InvalidDnsNameError),

    /// Protocol parsing error.
    #[error("Protocol error at position {position}: {message}")]
    Parse {
        /// Byte position where the error occurred.
        position: usize,
        /// Description of what went wrong.
        message: String,
    },

    /// Authentication could not be attempted with the given credentials.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Server returned NO response.
    #[error("Server returned NO: {0}")]
    No(String),

    /// Server returned BAD response.
    #[error("Server returned BAD: {0}")]
    Bad(String),

    /// Server sent BYE (disconnecting).
    #[error("Server sent BYE: {0}")]
    Bye(String),

    /// Operation timed out.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Server does not advertise STARTTLS.
    #[error("Server does not support STARTTLS")]
    StartTlsNotSupported,

    /// Invalid state for the requested operation.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Protocol violation or unexpected data.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl Error {
    /// Converts an I/O error raised by the TLS handshake, surfacing the
    /// underlying rustls error when there is one.
    #[must_use]
    pub fn from_handshake(err: io::Error) -> Self {
        let kind = err.kind();
        match err.into_inner() {
            Some(inner) => match inner.downcast::<rustls::Error>() {
                Ok(tls) => Self::Tls(*tls),
                Err(other) => Self::Io(io::Error::new(kind, other)),
            },
            None => Self::Io(kind.into()),
        }
    }

    /// Returns true if the TLS peer presented an unacceptable certificate.
    #[must_use]
    pub const fn is_certificate_error(&self) -> bool {
        matches!(
            self,
            Self::Tls(
                rustls::Error::InvalidCertificate(_) | rustls::Error::NoCertificatesPresented
            )
        )
    }

    /// Returns true if the server rejected a command (NO or BAD).
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::No(_) | Self::Bad(_))
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn handshake_error_unwraps_rustls() {
        let io_err = io::Error::new(
            io::ErrorKind::InvalidData,
            rustls::Error::InvalidCertificate(rustls::CertificateError::Expired),
        );
        let err = Error::from_handshake(io_err);
        assert!(matches!(
            err,
            Error::Tls(rustls::Error::InvalidCertificate(
                rustls::CertificateError::Expired
            ))
        ));
        assert!(err.is_certificate_error());
    }

    #[test]
    fn handshake_error_keeps_plain_io() {
        let io_err = io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer");
        let err = Error::from_handshake(io_err);
        match err {
            Error::Io(e) => assert_eq!(e.kind(), io::ErrorKind::ConnectionReset),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejection_detection() {
        assert!(Error::No("nope".into()).is_rejection());
        assert!(Error::Bad("syntax".into()).is_rejection());
        assert!(!Error::Bye("later".into()).is_rejection());
    }
}
