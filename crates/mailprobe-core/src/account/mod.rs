//! Account management module.
//!
//! Provides account configuration, the accounts file, and validation.

mod file;
mod model;
mod validation;

pub use file::AccountsFile;
pub use model::{Account, Auth, ImapConfig, Security};
pub use validation::{ValidationError, ValidationResult, validate_account};
