//! Credentials and SASL mechanisms.
//!
//! Implements the initial responses for:
//! - PLAIN (RFC 4616)
//! - OAUTHBEARER (RFC 7628)
//! - XOAUTH2 (Google/Microsoft proprietary)
//!
//! and picks the mechanism a session should use from the credentials it
//! holds and the capabilities the server advertises.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::command::needs_literal;
use crate::types::Capability;
use crate::{Error, Result};

/// Account credentials.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Username and password.
    Password {
        /// Login name.
        username: String,
        /// Password.
        password: String,
    },
    /// Username and `OAuth2` access token.
    OAuth2 {
        /// Login name (usually the email address).
        username: String,
        /// Bearer access token.
        access_token: String,
    },
}

impl Credentials {
    /// Password credentials.
    #[must_use]
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Password {
            username: username.into(),
            password: password.into(),
        }
    }

    /// `OAuth2` bearer token credentials.
    #[must_use]
    pub fn oauth2(username: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self::OAuth2 {
            username: username.into(),
            access_token: access_token.into(),
        }
    }

    /// Returns the login name.
    #[must_use]
    pub fn username(&self) -> &str {
        match self {
            Self::Password { username, .. } | Self::OAuth2 { username, .. } => username,
        }
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::password(String::new(), String::new())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .finish_non_exhaustive(),
            Self::OAuth2 { username, .. } => f
                .debug_struct("OAuth2")
                .field("username", username)
                .finish_non_exhaustive(),
        }
    }
}

/// How a session authenticates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mechanism {
    /// The LOGIN command.
    Login,
    /// AUTHENTICATE PLAIN.
    Plain,
    /// AUTHENTICATE XOAUTH2.
    XOAuth2,
    /// AUTHENTICATE OAUTHBEARER.
    OAuthBearer,
}

impl Mechanism {
    /// Picks the mechanism for the given credentials and server capabilities.
    ///
    /// Password credentials use LOGIN unless the server disabled it or the
    /// password cannot be sent as a quoted string, in which case AUTH=PLAIN
    /// is required. Tokens prefer XOAUTH2, falling back to OAUTHBEARER when
    /// only that is advertised.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`] when no usable mechanism is left.
    pub fn select(credentials: &Credentials, capabilities: &[Capability]) -> Result<Self> {
        let supports = |mech: &str| capabilities.iter().any(|c| c.is_auth(mech));

        match credentials {
            Credentials::Password { username, password } => {
                let login_ok = !capabilities.contains(&Capability::LoginDisabled)
                    && !needs_literal(username)
                    && !needs_literal(password);
                if login_ok {
                    Ok(Self::Login)
                } else if supports("PLAIN") {
                    Ok(Self::Plain)
                } else {
                    Err(Error::Auth(
                        "LOGIN is not possible and the server does not offer AUTH=PLAIN"
                            .to_string(),
                    ))
                }
            }
            Credentials::OAuth2 { .. } => {
                if supports("OAUTHBEARER") && !supports("XOAUTH2") {
                    Ok(Self::OAuthBearer)
                } else {
                    Ok(Self::XOAuth2)
                }
            }
        }
    }

    /// Returns the SASL mechanism name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "LOGIN",
            Self::Plain => "PLAIN",
            Self::XOAuth2 => "XOAUTH2",
            Self::OAuthBearer => "OAUTHBEARER",
        }
    }

    /// Builds the base64 SASL response for this mechanism.
    ///
    /// Returns `None` for [`Mechanism::Login`], which is not a SASL exchange.
    #[must_use]
    pub fn response(self, credentials: &Credentials) -> Option<String> {
        match (self, credentials) {
            (Self::Login, _) => None,
            (Self::Plain, Credentials::Password { username, password }) => {
                Some(plain_response(username, password))
            }
            (Self::Plain, Credentials::OAuth2 { username, .. }) => {
                Some(plain_response(username, ""))
            }
            (Self::XOAuth2, creds) => Some(xoauth2_response(creds.username(), secret(creds))),
            (Self::OAuthBearer, creds) => {
                Some(oauthbearer_response(creds.username(), secret(creds)))
            }
        }
    }
}

fn secret(credentials: &Credentials) -> &str {
    match credentials {
        Credentials::Password { password, .. } => password,
        Credentials::OAuth2 { access_token, .. } => access_token,
    }
}

/// Generates PLAIN initial response (RFC 4616).
///
/// Format: `\0<username>\0<password>` (base64 encoded)
#[must_use]
pub fn plain_response(username: &str, password: &str) -> String {
    STANDARD.encode(format!("\0{username}\0{password}").as_bytes())
}

/// Generates OAUTHBEARER initial response (RFC 7628).
///
/// Format: `n,a=<user>,\x01auth=Bearer <token>\x01\x01`
#[must_use]
pub fn oauthbearer_response(user: &str, token: &str) -> String {
    STANDARD.encode(format!("n,a={user},\x01auth=Bearer {token}\x01\x01").as_bytes())
}

/// Generates XOAUTH2 initial response.
///
/// Format: `user=<user>\x01auth=Bearer <token>\x01\x01`
#[must_use]
pub fn xoauth2_response(user: &str, token: &str) -> String {
    STANDARD.encode(format!("user={user}\x01auth=Bearer {token}\x01\x01").as_bytes())
}

/// Decodes a base64 server challenge, as sent with XOAUTH2 failures.
#[must_use]
pub fn decode_challenge(challenge: &str) -> Option<String> {
    let bytes = STANDARD.decode(challenge.trim()).ok()?;
    String::from_utf8(bytes).ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn decoded(response: &str) -> String {
        String::from_utf8(STANDARD.decode(response).unwrap()).unwrap()
    }

    #[test]
    fn test_plain_format() {
        assert_eq!(decoded(&plain_response("test", "pass")), "\0test\0pass");
    }

    #[test]
    fn test_xoauth2_format() {
        assert_eq!(
            decoded(&xoauth2_response("test@test.com", "abc")),
            "user=test@test.com\x01auth=Bearer abc\x01\x01"
        );
    }

    #[test]
    fn test_oauthbearer_format() {
        assert_eq!(
            decoded(&oauthbearer_response("test@test.com", "abc")),
            "n,a=test@test.com,\x01auth=Bearer abc\x01\x01"
        );
    }

    #[test]
    fn test_password_defaults_to_login() {
        let creds = Credentials::password("user", "secret");
        let caps = vec![Capability::Imap4Rev1, Capability::Auth("PLAIN".into())];
        assert_eq!(Mechanism::select(&creds, &caps).unwrap(), Mechanism::Login);
        assert_eq!(Mechanism::Login.response(&creds), None);
    }

    #[test]
    fn test_login_disabled_falls_back_to_plain() {
        let creds = Credentials::password("user", "secret");
        let caps = vec![Capability::LoginDisabled, Capability::Auth("PLAIN".into())];
        assert_eq!(Mechanism::select(&creds, &caps).unwrap(), Mechanism::Plain);
    }

    #[test]
    fn test_non_ascii_password_needs_plain() {
        let creds = Credentials::password("user", "pässwörd");
        assert!(Mechanism::select(&creds, &[Capability::Imap4Rev1]).is_err());
        assert_eq!(
            Mechanism::select(&creds, &[Capability::Auth("PLAIN".into())]).unwrap(),
            Mechanism::Plain
        );
    }

    #[test]
    fn test_oauth_mechanism_choice() {
        let creds = Credentials::oauth2("user@example.com", "ya29.token");
        assert_eq!(Mechanism::select(&creds, &[]).unwrap(), Mechanism::XOAuth2);
        assert_eq!(
            Mechanism::select(&creds, &[Capability::Auth("OAUTHBEARER".into())]).unwrap(),
            Mechanism::OAuthBearer
        );
        let response = Mechanism::XOAuth2.response(&creds).unwrap();
        assert!(decoded(&response).contains("auth=Bearer ya29.token"));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let debug = format!("{:?}", Credentials::password("user", "hunter2"));
        assert!(debug.contains("user"));
        assert!(!debug.contains("hunter2"));

        let debug = format!("{:?}", Credentials::oauth2("user", "ya29.secret"));
        assert!(!debug.contains("ya29"));
    }

    #[test]
    fn test_decode_challenge() {
        let challenge = STANDARD.encode(r#"{"status":"401","schemes":"bearer"}"#);
        assert_eq!(
            decode_challenge(&challenge).as_deref(),
            Some(r#"{"status":"401","schemes":"bearer"}"#)
        );
        assert_eq!(decode_challenge("not base64!"), None);
    }
}
