//! Response codes.

use super::Capability;

/// Response code carried in `[...]` brackets of a status response.
///
/// Besides the RFC 3501 basics this covers the RFC 5530 codes servers use
/// to explain why a LOGIN or AUTHENTICATE was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseCode {
    /// ALERT: Human-readable message that MUST be shown to user.
    Alert,
    /// CAPABILITY response.
    Capability(Vec<Capability>),
    /// PARSE: Error parsing message.
    Parse,
    /// UNAVAILABLE: Temporary failure, try again later.
    Unavailable,
    /// AUTHENTICATIONFAILED: Credentials rejected.
    AuthenticationFailed,
    /// AUTHORIZATIONFAILED: Authenticated but not authorized.
    AuthorizationFailed,
    /// EXPIRED: Credentials have expired.
    Expired,
    /// PRIVACYREQUIRED: Operation requires an encrypted connection.
    PrivacyRequired,
    /// CONTACTADMIN: User should contact the administrator.
    ContactAdmin,
    /// Unknown response code.
    Unknown(String),
}

impl ResponseCode {
    /// Builds a response code from its atom and optional argument text.
    #[must_use]
    pub fn parse(atom: &str, args: Option<&str>) -> Self {
        match atom.to_ascii_uppercase().as_str() {
            "ALERT" => Self::Alert,
            "CAPABILITY" => Self::Capability(
                args.unwrap_or_default()
                    .split_ascii_whitespace()
                    .map(Capability::parse)
                    .collect(),
            ),
            "PARSE" => Self::Parse,
            "UNAVAILABLE" => Self::Unavailable,
            "AUTHENTICATIONFAILED" => Self::AuthenticationFailed,
            "AUTHORIZATIONFAILED" => Self::AuthorizationFailed,
            "EXPIRED" => Self::Expired,
            "PRIVACYREQUIRED" => Self::PrivacyRequired,
            "CONTACTADMIN" => Self::ContactAdmin,
            _ => Self::Unknown(match args {
                Some(args) => format!("{atom} {args}"),
                None => atom.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_failure_codes() {
        assert_eq!(
            ResponseCode::parse("AUTHENTICATIONFAILED", None),
            ResponseCode::AuthenticationFailed
        );
        assert_eq!(
            ResponseCode::parse("unavailable", None),
            ResponseCode::Unavailable
        );
        assert_eq!(
            ResponseCode::parse("PRIVACYREQUIRED", None),
            ResponseCode::PrivacyRequired
        );
    }

    #[test]
    fn capability_code_with_list() {
        let code = ResponseCode::parse("CAPABILITY", Some("IMAP4rev1 AUTH=PLAIN"));
        let ResponseCode::Capability(caps) = code else {
            panic!("Expected Capability variant");
        };
        assert_eq!(caps.len(), 2);
        assert!(caps[1].is_auth("plain"));
    }

    #[test]
    fn unknown_keeps_arguments() {
        assert_eq!(
            ResponseCode::parse("WEBALERT", Some("https://example.com")),
            ResponseCode::Unknown("WEBALERT https://example.com".to_string())
        );
    }
}
