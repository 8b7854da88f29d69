//! IMAP command builder.
//!
//! Only the commands needed to open and authenticate a session.

mod serialize;
mod tag_generator;

pub use serialize::needs_literal;
pub use tag_generator::TagGenerator;

use serialize::write_astring;

/// IMAP command.
#[derive(Clone, PartialEq, Eq)]
pub enum Command {
    /// CAPABILITY command.
    Capability,
    /// LOGOUT command.
    Logout,
    /// STARTTLS command.
    StartTls,
    /// LOGIN command.
    Login {
        /// Username.
        username: String,
        /// Password.
        password: String,
    },
    /// AUTHENTICATE command.
    Authenticate {
        /// Authentication mechanism.
        mechanism: String,
        /// Initial response (SASL-IR), already base64 encoded.
        initial_response: Option<String>,
    },
}

impl Command {
    /// Serializes the command with the given tag, CRLF included.
    #[must_use]
    pub fn serialize(&self, tag: &str) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(tag.as_bytes());
        buf.push(b' ');

        match self {
            Self::Capability => buf.extend_from_slice(b"CAPABILITY"),
            Self::Logout => buf.extend_from_slice(b"LOGOUT"),
            Self::StartTls => buf.extend_from_slice(b"STARTTLS"),
            Self::Login { username, password } => {
                buf.extend_from_slice(b"LOGIN ");
                write_astring(&mut buf, username);
                buf.push(b' ');
                write_astring(&mut buf, password);
            }
            Self::Authenticate {
                mechanism,
                initial_response,
            } => {
                buf.extend_from_slice(b"AUTHENTICATE ");
                buf.extend_from_slice(mechanism.as_bytes());
                if let Some(resp) = initial_response {
                    buf.push(b' ');
                    // An empty initial response is sent as "=" (RFC 4959).
                    if resp.is_empty() {
                        buf.push(b'=');
                    } else {
                        buf.extend_from_slice(resp.as_bytes());
                    }
                }
            }
        }

        buf.extend_from_slice(b"\r\n");
        buf
    }

    /// Returns the command name, for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Capability => "CAPABILITY",
            Self::Logout => "LOGOUT",
            Self::StartTls => "STARTTLS",
            Self::Login { .. } => "LOGIN",
            Self::Authenticate { .. } => "AUTHENTICATE",
        }
    }
}

// Credentials never reach the logs.
impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Login { username, .. } => f
                .debug_struct("Login")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::Authenticate { mechanism, .. } => f
                .debug_struct("Authenticate")
                .field("mechanism", mechanism)
                .finish_non_exhaustive(),
            other => f.write_str(other.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_commands() {
        assert_eq!(Command::Capability.serialize("A0000"), b"A0000 CAPABILITY\r\n");
        assert_eq!(Command::StartTls.serialize("A0001"), b"A0001 STARTTLS\r\n");
        assert_eq!(Command::Logout.serialize("A0002"), b"A0002 LOGOUT\r\n");
    }

    #[test]
    fn test_login_quotes_password() {
        let cmd = Command::Login {
            username: "user@example.com".to_string(),
            password: "p@ss word".to_string(),
        };
        assert_eq!(
            cmd.serialize("A0001"),
            b"A0001 LOGIN user@example.com \"p@ss word\"\r\n"
        );
    }

    #[test]
    fn test_authenticate_with_initial_response() {
        let cmd = Command::Authenticate {
            mechanism: "PLAIN".to_string(),
            initial_response: Some("AHVzZXIAcGFzcw==".to_string()),
        };
        assert_eq!(
            cmd.serialize("A0001"),
            b"A0001 AUTHENTICATE PLAIN AHVzZXIAcGFzcw==\r\n"
        );

        let empty = Command::Authenticate {
            mechanism: "EXTERNAL".to_string(),
            initial_response: Some(String::new()),
        };
        assert_eq!(empty.serialize("A0002"), b"A0002 AUTHENTICATE EXTERNAL =\r\n");
    }

    #[test]
    fn test_authenticate_without_initial_response() {
        let cmd = Command::Authenticate {
            mechanism: "XOAUTH2".to_string(),
            initial_response: None,
        };
        assert_eq!(cmd.serialize("A0001"), b"A0001 AUTHENTICATE XOAUTH2\r\n");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let cmd = Command::Login {
            username: "user".to_string(),
            password: "hunter2".to_string(),
        };
        let debug = format!("{cmd:?}");
        assert!(debug.contains("user"));
        assert!(!debug.contains("hunter2"));
    }
}
