//! # mailprobe-core
//!
//! Account checking for `mailprobe`.
//!
//! This crate provides:
//! - [`ErrorCode`]: the outcome of a session step
//! - [`Session`]: the connect/login collaborator, implemented for
//!   [`mailprobe_imap::ImapSession`]
//! - [`CheckAccountOperation`] and the serial [`OperationQueue`] that runs
//!   operations for an [`AsyncConnection`]
//! - Account model, validation and the accounts file
//! - [`check_account`]: the end-to-end check producing a [`CheckReport`]

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod account;
mod error;
pub mod operation;
pub mod service;
pub mod session;

pub use account::{
    Account, AccountsFile, Auth, ImapConfig, Security, ValidationError, ValidationResult,
    validate_account,
};
pub use error::{Error, ErrorCode, Result};
pub use operation::{
    AsyncConnection, CancelToken, CheckAccountOperation, CheckState, Operation, OperationHandle,
    OperationQueue, RetentionPolicy,
};
pub use service::{CheckReport, check_account};
pub use session::{Session, SessionHandle};
