//! Server capabilities and response status.

/// Response status from a tagged or untagged status response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Command completed successfully.
    Ok,
    /// Command failed (operational error).
    No,
    /// Command failed (protocol/syntax error).
    Bad,
    /// Server greeting (pre-authenticated).
    PreAuth,
    /// Server is closing connection.
    Bye,
}

impl Status {
    /// Returns true if this is a successful status.
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok | Self::PreAuth)
    }

    /// Parses a status atom (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "OK" => Some(Self::Ok),
            "NO" => Some(Self::No),
            "BAD" => Some(Self::Bad),
            "PREAUTH" => Some(Self::PreAuth),
            "BYE" => Some(Self::Bye),
            _ => None,
        }
    }

    /// Returns the wire form of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::No => "NO",
            Self::Bad => "BAD",
            Self::PreAuth => "PREAUTH",
            Self::Bye => "BYE",
        }
    }
}

/// Server capability.
///
/// Only the capabilities that influence connection setup and
/// authentication get their own variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Capability {
    /// `IMAP4rev1` (RFC 3501)
    Imap4Rev1,
    /// `IMAP4rev2` (RFC 9051)
    Imap4Rev2,
    /// STARTTLS support
    StartTls,
    /// LOGIN disabled
    LoginDisabled,
    /// AUTH mechanism
    Auth(String),
    /// SASL initial response (RFC 4959)
    SaslIr,
    /// ID extension (RFC 2971)
    Id,
    /// IDLE command support (RFC 2177)
    Idle,
    /// Unknown capability
    Unknown(String),
}

impl Capability {
    /// Parses a capability string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let upper = s.to_uppercase();
        match upper.as_str() {
            "IMAP4REV1" => Self::Imap4Rev1,
            "IMAP4REV2" => Self::Imap4Rev2,
            "STARTTLS" => Self::StartTls,
            "LOGINDISABLED" => Self::LoginDisabled,
            "SASL-IR" => Self::SaslIr,
            "ID" => Self::Id,
            "IDLE" => Self::Idle,
            _ if upper.starts_with("AUTH=") => Self::Auth(s[5..].to_string()),
            _ => Self::Unknown(s.to_string()),
        }
    }

    /// Returns true if this advertises the given SASL mechanism.
    #[must_use]
    pub fn is_auth(&self, mechanism: &str) -> bool {
        matches!(self, Self::Auth(m) if m.eq_ignore_ascii_case(mechanism))
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Imap4Rev1 => write!(f, "IMAP4rev1"),
            Self::Imap4Rev2 => write!(f, "IMAP4rev2"),
            Self::StartTls => write!(f, "STARTTLS"),
            Self::LoginDisabled => write!(f, "LOGINDISABLED"),
            Self::Auth(mech) => write!(f, "AUTH={mech}"),
            Self::SaslIr => write!(f, "SASL-IR"),
            Self::Id => write!(f, "ID"),
            Self::Idle => write!(f, "IDLE"),
            Self::Unknown(s) => write!(f, "{s}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_ok() {
        assert!(Status::Ok.is_ok());
        assert!(Status::PreAuth.is_ok());
        assert!(!Status::No.is_ok());
        assert!(!Status::Bad.is_ok());
        assert!(!Status::Bye.is_ok());
    }

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(Status::parse("ok"), Some(Status::Ok));
        assert_eq!(Status::parse("No"), Some(Status::No));
        assert_eq!(Status::parse("PREAUTH"), Some(Status::PreAuth));
        assert_eq!(Status::parse("CAPABILITY"), None);
    }

    #[test]
    fn parse_known_capabilities() {
        assert_eq!(Capability::parse("imap4rev1"), Capability::Imap4Rev1);
        assert_eq!(Capability::parse("STARTTLS"), Capability::StartTls);
        assert_eq!(Capability::parse("LOGINDISABLED"), Capability::LoginDisabled);
        assert_eq!(Capability::parse("SASL-IR"), Capability::SaslIr);
    }

    #[test]
    fn parse_auth_keeps_mechanism_case() {
        assert_eq!(
            Capability::parse("AUTH=XOAUTH2"),
            Capability::Auth("XOAUTH2".to_string())
        );
        assert!(Capability::parse("auth=plain").is_auth("PLAIN"));
    }

    #[test]
    fn parse_unknown() {
        assert_eq!(
            Capability::parse("X-GM-EXT-1"),
            Capability::Unknown("X-GM-EXT-1".to_string())
        );
    }

    #[test]
    fn display_round_trips_wire_form() {
        assert_eq!(Capability::Auth("PLAIN".into()).to_string(), "AUTH=PLAIN");
        assert_eq!(Capability::SaslIr.to_string(), "SASL-IR");
    }
}
