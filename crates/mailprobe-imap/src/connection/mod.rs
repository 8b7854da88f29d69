//! IMAP connection management.
//!
//! This module provides connection handling for IMAP servers, including:
//! - Configuration (host, port, security mode, timeouts)
//! - TLS/plaintext stream abstraction
//! - Framed I/O for IMAP protocol
//! - Type-state connection wrapper
//! - A stateful session that connects and logs in on demand

mod client;
mod config;
mod framed;
mod session;
mod stream;

pub use client::{AuthResult, Authenticated, Client, Greeted, NotAuthenticated, State};
pub use config::{
    Config, ConfigBuilder, DEFAULT_CONNECT_TIMEOUT, DEFAULT_IO_TIMEOUT, Security,
};
pub use framed::FramedStream;
pub use session::{ImapSession, SessionConfig};
pub use stream::{ImapStream, connect, create_tls_connector};
