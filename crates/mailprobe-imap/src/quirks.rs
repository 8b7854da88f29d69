//! Server identification.
//!
//! Providers differ in how they refuse a login (app passwords, disabled
//! basic auth, IMAP switched off in web settings). Knowing which server we
//! talk to lets callers turn a bare authentication failure into advice.

use crate::types::Capability;

/// Known IMAP server types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServerType {
    /// Unknown or generic IMAP server.
    #[default]
    Unknown,
    /// Gmail IMAP (imap.gmail.com).
    Gmail,
    /// Microsoft Outlook/Office 365.
    Outlook,
    /// Yahoo Mail.
    Yahoo,
    /// Apple iCloud Mail.
    ICloud,
    /// Fastmail.
    Fastmail,
    /// Dovecot (common open-source server).
    Dovecot,
    /// Courier IMAP.
    Courier,
    /// Cyrus IMAP.
    Cyrus,
}

impl ServerType {
    /// Detects the server type from capabilities and greeting text.
    #[must_use]
    pub fn detect(capabilities: &[Capability], greeting: Option<&str>) -> Self {
        for cap in capabilities {
            if let Capability::Unknown(s) = cap {
                let upper = s.to_uppercase();
                if upper.starts_with("X-GM-") {
                    return Self::Gmail;
                }
                if upper.starts_with("XYM") {
                    return Self::Yahoo;
                }
            }
        }

        let Some(greeting) = greeting else {
            return Self::Unknown;
        };
        let lower = greeting.to_lowercase();
        [
            ("gimap", Self::Gmail),
            ("gmail", Self::Gmail),
            ("outlook", Self::Outlook),
            ("microsoft", Self::Outlook),
            ("yahoo", Self::Yahoo),
            ("dovecot", Self::Dovecot),
            ("courier", Self::Courier),
            ("cyrus", Self::Cyrus),
            ("fastmail", Self::Fastmail),
            ("icloud", Self::ICloud),
            ("apple", Self::ICloud),
        ]
        .into_iter()
        .find_map(|(needle, server)| lower.contains(needle).then_some(server))
        .unwrap_or(Self::Unknown)
    }

    /// Returns a display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Gmail => "Gmail",
            Self::Outlook => "Outlook",
            Self::Yahoo => "Yahoo",
            Self::ICloud => "iCloud",
            Self::Fastmail => "Fastmail",
            Self::Dovecot => "Dovecot",
            Self::Courier => "Courier",
            Self::Cyrus => "Cyrus",
        }
    }

    /// Advice to show when this server rejects a password login.
    #[must_use]
    pub const fn login_hint(self) -> Option<&'static str> {
        match self {
            Self::Gmail => Some(
                "Gmail rejects account passwords over IMAP; use an app password or an OAuth2 token",
            ),
            Self::Outlook => {
                Some("Microsoft has disabled basic authentication; use an OAuth2 token")
            }
            Self::Yahoo | Self::ICloud | Self::Fastmail => {
                Some("this provider requires an app-specific password for IMAP")
            }
            Self::Unknown | Self::Dovecot | Self::Courier | Self::Cyrus => None,
        }
    }
}

impl std::fmt::Display for ServerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_gmail_from_capability() {
        let caps = vec![Capability::Unknown("X-GM-EXT-1".to_string())];
        assert_eq!(ServerType::detect(&caps, None), ServerType::Gmail);
    }

    #[test]
    fn test_detect_from_greeting() {
        let caps = vec![Capability::Imap4Rev1];
        assert_eq!(
            ServerType::detect(&caps, Some("Dovecot ready.")),
            ServerType::Dovecot
        );
        assert_eq!(
            ServerType::detect(&caps, Some("The Microsoft Exchange IMAP4 service is ready.")),
            ServerType::Outlook
        );
        assert_eq!(
            ServerType::detect(&caps, Some("Gimap ready for requests from 1.2.3.4")),
            ServerType::Gmail
        );
    }

    #[test]
    fn test_detect_unknown() {
        assert_eq!(
            ServerType::detect(&[], Some("IMAP server ready")),
            ServerType::Unknown
        );
        assert_eq!(ServerType::detect(&[], None), ServerType::Unknown);
    }

    #[test]
    fn test_login_hints() {
        assert!(ServerType::Gmail.login_hint().is_some());
        assert!(ServerType::Dovecot.login_hint().is_none());
        assert_eq!(ServerType::ICloud.to_string(), "iCloud");
    }
}
