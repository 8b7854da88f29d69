//! Account model types.

use std::time::Duration;

use mailprobe_imap::connection::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_IO_TIMEOUT};
use mailprobe_imap::{Config, Credentials, SessionConfig};
use serde::{Deserialize, Serialize};

/// Security/encryption mode for connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Security {
    /// No encryption (not recommended).
    None,
    /// Implicit TLS (connect directly with TLS).
    #[default]
    Tls,
    /// STARTTLS upgrade after plaintext connect.
    StartTls,
}

impl Security {
    /// Get display name for the security mode.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::None => "None (insecure)",
            Self::Tls => "SSL/TLS",
            Self::StartTls => "STARTTLS",
        }
    }
}

impl From<Security> for mailprobe_imap::Security {
    fn from(security: Security) -> Self {
        match security {
            Security::None => Self::None,
            Security::Tls => Self::Implicit,
            Security::StartTls => Self::StartTls,
        }
    }
}

impl From<mailprobe_imap::Security> for Security {
    fn from(security: mailprobe_imap::Security) -> Self {
        match security {
            mailprobe_imap::Security::None => Self::None,
            mailprobe_imap::Security::Implicit => Self::Tls,
            mailprobe_imap::Security::StartTls => Self::StartTls,
        }
    }
}

/// How the account authenticates.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Auth {
    /// Plain password (or app password).
    Password {
        /// The password.
        password: String,
    },
    /// `OAuth2` bearer token, obtained elsewhere.
    OAuth2 {
        /// The access token.
        token: String,
    },
}

impl Default for Auth {
    fn default() -> Self {
        Self::Password {
            password: String::new(),
        }
    }
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Password { .. } => f.write_str("Password(..)"),
            Self::OAuth2 { .. } => f.write_str("OAuth2(..)"),
        }
    }
}

/// IMAP server configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImapConfig {
    /// Server hostname.
    pub host: String,
    /// Server port (default: 993 for TLS, 143 for STARTTLS).
    pub port: u16,
    /// Security mode.
    #[serde(default)]
    pub security: Security,
    /// Username for authentication.
    pub username: String,
    /// Authentication secret.
    #[serde(default)]
    pub auth: Auth,
}

impl ImapConfig {
    /// Get default port for the security mode.
    #[must_use]
    pub const fn default_port(security: Security) -> u16 {
        match security {
            Security::None | Security::StartTls => 143,
            Security::Tls => 993,
        }
    }

    /// Builds the credentials for this configuration.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        match &self.auth {
            Auth::Password { password } => Credentials::password(&self.username, password),
            Auth::OAuth2 { token } => Credentials::oauth2(&self.username, token),
        }
    }
}

/// Email account configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Display name for the account.
    pub name: String,
    /// Email address.
    pub email: String,
    /// IMAP configuration.
    pub imap: ImapConfig,
    /// Whether this is the default account.
    #[serde(default)]
    pub is_default: bool,
    /// Connect timeout in seconds (connect, TLS and greeting).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout_secs: Option<u64>,
    /// Per-command timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub io_timeout_secs: Option<u64>,
}

impl Account {
    /// Create a new empty account.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create account with common defaults for well-known providers.
    #[must_use]
    pub fn with_email(email: &str) -> Self {
        let mut account = Self {
            email: email.to_string(),
            ..Default::default()
        };

        if let Some(domain) = email.split('@').nth(1) {
            let provider = match domain.to_lowercase().as_str() {
                "gmail.com" | "googlemail.com" => Some(("Gmail", "imap.gmail.com")),
                "outlook.com" | "hotmail.com" | "live.com" => {
                    Some(("Outlook", "outlook.office365.com"))
                }
                "yahoo.com" | "ymail.com" => Some(("Yahoo", "imap.mail.yahoo.com")),
                "icloud.com" | "me.com" | "mac.com" => Some(("iCloud", "imap.mail.me.com")),
                "fastmail.com" | "fastmail.fm" => Some(("Fastmail", "imap.fastmail.com")),
                _ => None,
            };

            match provider {
                Some((name, host)) => {
                    account.name = name.to_string();
                    account.imap.host = host.to_string();
                    account.imap.port = 993;
                    account.imap.security = Security::Tls;
                }
                // Use domain as account name
                None => account.name = domain.to_string(),
            }
        }

        // Set username to email by default
        account.imap.username = email.to_string();

        account
    }

    /// Builds the IMAP connection config for this account.
    #[must_use]
    pub fn connection_config(&self) -> Config {
        let connect_timeout = self
            .connect_timeout_secs
            .map_or(DEFAULT_CONNECT_TIMEOUT, Duration::from_secs);
        let io_timeout = self
            .io_timeout_secs
            .map_or(DEFAULT_IO_TIMEOUT, Duration::from_secs);

        Config::builder(&self.imap.host)
            .port(self.imap.port)
            .security(self.imap.security.into())
            .connect_timeout(connect_timeout)
            .io_timeout(io_timeout)
            .build()
    }

    /// Builds the IMAP session config (connection and credentials).
    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new(self.connection_config(), self.imap.credentials())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    mod security_tests {
        use super::*;

        #[test]
        fn default_is_tls() {
            assert_eq!(Security::default(), Security::Tls);
        }

        #[test]
        fn display_names() {
            assert_eq!(Security::None.display_name(), "None (insecure)");
            assert_eq!(Security::Tls.display_name(), "SSL/TLS");
            assert_eq!(Security::StartTls.display_name(), "STARTTLS");
        }

        #[test]
        fn converts_to_imap_security() {
            assert_eq!(
                mailprobe_imap::Security::from(Security::Tls),
                mailprobe_imap::Security::Implicit
            );
            assert_eq!(
                Security::from(mailprobe_imap::Security::StartTls),
                Security::StartTls
            );
        }

        #[test]
        fn serde_names() {
            assert_eq!(
                serde_json::to_string(&Security::StartTls).unwrap(),
                "\"starttls\""
            );
        }
    }

    mod imap_config_tests {
        use super::*;

        #[test]
        fn default_port_tls() {
            assert_eq!(ImapConfig::default_port(Security::Tls), 993);
        }

        #[test]
        fn default_port_starttls() {
            assert_eq!(ImapConfig::default_port(Security::StartTls), 143);
        }

        #[test]
        fn default() {
            let config = ImapConfig::default();
            assert!(config.host.is_empty());
            assert_eq!(config.port, 0);
            assert_eq!(config.security, Security::Tls);
            assert_eq!(config.auth, Auth::default());
        }

        #[test]
        fn credentials_follow_auth() {
            let mut config = ImapConfig {
                username: "user@example.com".to_string(),
                ..Default::default()
            };
            config.auth = Auth::OAuth2 {
                token: "ya29.token".to_string(),
            };
            assert_eq!(
                config.credentials(),
                Credentials::oauth2("user@example.com", "ya29.token")
            );
        }

        #[test]
        fn auth_debug_hides_secret() {
            let auth = Auth::Password {
                password: "hunter2".to_string(),
            };
            assert!(!format!("{auth:?}").contains("hunter2"));
        }
    }

    mod account_tests {
        use super::*;

        #[test]
        fn new_creates_empty() {
            let account = Account::new();
            assert!(account.name.is_empty());
            assert!(account.email.is_empty());
            assert!(!account.is_default);
        }

        #[test]
        fn with_email_gmail() {
            let account = Account::with_email("user@gmail.com");
            assert_eq!(account.name, "Gmail");
            assert_eq!(account.email, "user@gmail.com");
            assert_eq!(account.imap.host, "imap.gmail.com");
            assert_eq!(account.imap.port, 993);
            assert_eq!(account.imap.security, Security::Tls);
            assert_eq!(account.imap.username, "user@gmail.com");
        }

        #[test]
        fn with_email_providers() {
            assert_eq!(
                Account::with_email("a@hotmail.com").imap.host,
                "outlook.office365.com"
            );
            assert_eq!(
                Account::with_email("a@ymail.com").imap.host,
                "imap.mail.yahoo.com"
            );
            assert_eq!(Account::with_email("a@me.com").name, "iCloud");
            assert_eq!(
                Account::with_email("a@fastmail.com").imap.host,
                "imap.fastmail.com"
            );
        }

        #[test]
        fn with_email_unknown_domain() {
            let account = Account::with_email("user@example.org");
            assert_eq!(account.name, "example.org");
            assert!(account.imap.host.is_empty());
            assert_eq!(account.imap.username, "user@example.org");
        }

        #[test]
        fn session_config_uses_timeouts() {
            let mut account = Account::with_email("user@gmail.com");
            account.connect_timeout_secs = Some(5);
            let config = account.session_config();
            let connection = config.connection.unwrap();

            assert_eq!(connection.address(), "imap.gmail.com:993");
            assert_eq!(connection.security, mailprobe_imap::Security::Implicit);
            assert_eq!(connection.connect_timeout, Duration::from_secs(5));
            assert_eq!(connection.io_timeout, DEFAULT_IO_TIMEOUT);
            assert_eq!(config.credentials.username(), "user@gmail.com");
        }

        #[test]
        fn json_round_trip() {
            let json = r#"{
                "name": "Work",
                "email": "me@example.com",
                "imap": {
                    "host": "imap.example.com",
                    "port": 143,
                    "security": "starttls",
                    "username": "me",
                    "auth": { "type": "oauth2", "token": "abc" }
                }
            }"#;
            let account: Account = serde_json::from_str(json).unwrap();
            assert_eq!(account.imap.security, Security::StartTls);
            assert!(matches!(account.imap.auth, Auth::OAuth2 { ref token } if token == "abc"));
            assert!(!account.is_default);

            let back: Account =
                serde_json::from_str(&serde_json::to_string(&account).unwrap()).unwrap();
            assert_eq!(back, account);
        }
    }
}
