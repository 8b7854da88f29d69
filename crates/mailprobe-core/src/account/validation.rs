//! Account validation.

use super::model::{Account, Auth};

/// Validation error for account configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Account name is empty.
    EmptyName,
    /// Email address is empty.
    EmptyEmail,
    /// Email address format is invalid.
    InvalidEmail,
    /// IMAP host is empty.
    EmptyImapHost,
    /// IMAP port is invalid.
    InvalidImapPort,
    /// IMAP username is empty.
    EmptyImapUsername,
    /// IMAP password is empty.
    EmptyImapPassword,
    /// `OAuth2` token is empty.
    EmptyOAuth2Token,
    /// A timeout is zero.
    InvalidTimeout,
}

impl ValidationError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::EmptyName => "Account name is required",
            Self::EmptyEmail => "Email address is required",
            Self::InvalidEmail => "Invalid email address format",
            Self::EmptyImapHost => "IMAP server is required",
            Self::InvalidImapPort => "IMAP port must be 1-65535",
            Self::EmptyImapUsername => "IMAP username is required",
            Self::EmptyImapPassword => "IMAP password is required",
            Self::EmptyOAuth2Token => "OAuth2 access token is required",
            Self::InvalidTimeout => "Timeouts must be at least one second",
        }
    }

    /// Get the field name this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyName => "name",
            Self::EmptyEmail | Self::InvalidEmail => "email",
            Self::EmptyImapHost => "imap_host",
            Self::InvalidImapPort => "imap_port",
            Self::EmptyImapUsername => "imap_username",
            Self::EmptyImapPassword => "imap_password",
            Self::EmptyOAuth2Token => "imap_token",
            Self::InvalidTimeout => "timeout",
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Result of validating an account.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Validate an account configuration.
///
/// Returns `Ok(())` if valid, or `Err(Vec<ValidationError>)` with all errors.
///
/// # Errors
///
/// Returns a vector of `ValidationError` if any fields are invalid.
pub fn validate_account(account: &Account) -> ValidationResult {
    let mut errors = Vec::new();

    if account.name.trim().is_empty() {
        errors.push(ValidationError::EmptyName);
    }

    if account.email.trim().is_empty() {
        errors.push(ValidationError::EmptyEmail);
    } else if !is_valid_email(&account.email) {
        errors.push(ValidationError::InvalidEmail);
    }

    if account.imap.host.trim().is_empty() {
        errors.push(ValidationError::EmptyImapHost);
    }
    if account.imap.port == 0 {
        errors.push(ValidationError::InvalidImapPort);
    }
    if account.imap.username.trim().is_empty() {
        errors.push(ValidationError::EmptyImapUsername);
    }
    match &account.imap.auth {
        Auth::Password { password } if password.is_empty() => {
            errors.push(ValidationError::EmptyImapPassword);
        }
        Auth::OAuth2 { token } if token.trim().is_empty() => {
            errors.push(ValidationError::EmptyOAuth2Token);
        }
        _ => {}
    }

    if account.connect_timeout_secs == Some(0) || account.io_timeout_secs == Some(0) {
        errors.push(ValidationError::InvalidTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Basic email validation: one `@`, a local part, and a dotted domain
/// without empty labels.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.trim().split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_account() -> Account {
        let mut account = Account::with_email("test@gmail.com");
        account.imap.auth = Auth::Password {
            password: "secret".to_string(),
        };
        account
    }

    #[test]
    fn test_valid_email() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("user.name@example.com"));
        assert!(is_valid_email(" user@sub.example.com "));
    }

    #[test]
    fn test_invalid_email() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("user"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user@example"));
        assert!(!is_valid_email("user@@example.com"));
        assert!(!is_valid_email("user@example..com"));
    }

    #[test]
    fn test_validate_empty_account() {
        let errors = validate_account(&Account::new()).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::EmptyName,
                ValidationError::EmptyEmail,
                ValidationError::EmptyImapHost,
                ValidationError::InvalidImapPort,
                ValidationError::EmptyImapUsername,
                ValidationError::EmptyImapPassword,
            ]
        );
    }

    #[test]
    fn test_validate_complete_account() {
        assert!(validate_account(&valid_account()).is_ok());
    }

    #[test]
    fn test_validate_oauth2_token() {
        let mut account = valid_account();
        account.imap.auth = Auth::OAuth2 {
            token: "  ".to_string(),
        };
        let errors = validate_account(&account).unwrap_err();
        assert_eq!(errors, vec![ValidationError::EmptyOAuth2Token]);
        assert_eq!(errors[0].field(), "imap_token");
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut account = valid_account();
        account.io_timeout_secs = Some(0);
        let errors = validate_account(&account).unwrap_err();
        assert_eq!(errors, vec![ValidationError::InvalidTimeout]);
    }
}
