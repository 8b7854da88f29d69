//! # mailprobe-imap
//!
//! A small async IMAP client covering what an account check needs: connect
//! (implicit TLS, STARTTLS or plaintext), read the greeting, query
//! capabilities, authenticate and log out.
//!
//! ## Features
//!
//! - **Type-state connection management**: compile-time enforcement of valid
//!   IMAP state transitions (`NotAuthenticated` → `Authenticated`)
//! - **Authentication**: LOGIN, and AUTHENTICATE with PLAIN, XOAUTH2 or
//!   OAUTHBEARER (SASL-IR when the server offers it)
//! - **TLS via rustls**: secure connections without an OpenSSL dependency
//! - **Timeouts**: one limit for connect plus greeting, one per command
//! - **Sans-I/O parser**: protocol parsing separated from network I/O
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailprobe_imap::{Config, Credentials, ImapSession, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> mailprobe_imap::Result<()> {
//!     let config = SessionConfig::new(
//!         Config::new("imap.example.com"),
//!         Credentials::password("user@example.com", "password"),
//!     );
//!     let mut session = ImapSession::new(config);
//!
//!     session.connect_if_needed().await?;
//!     println!("talking to {}", session.server_type());
//!
//!     if let Err(e) = session.login().await {
//!         println!("refused: {e} ({:?})", session.login_response());
//!     }
//!
//!     session.disconnect().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`auth`]: credentials and SASL mechanisms
//! - [`command`]: command serialization and tag generation
//! - [`connection`]: connection management, type-state client and session
//! - [`parser`]: sans-I/O response parser
//! - [`quirks`]: server identification
//! - [`types`]: capabilities, status and response codes

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod auth;
pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod quirks;
pub mod types;

pub use auth::{Credentials, Mechanism};
pub use command::{Command, TagGenerator};
pub use connection::{
    AuthResult, Authenticated, Client, Config, ConfigBuilder, FramedStream, Greeted, ImapSession,
    ImapStream, NotAuthenticated, Security, SessionConfig,
};
pub use error::{Error, Result};
pub use parser::{Response, ResponseParser, UntaggedResponse};
pub use quirks::ServerType;
pub use types::{Capability, ResponseCode, Status, Tag};
