//! Type-state IMAP client connection.
//!
//! Uses the type-state pattern to enforce valid state transitions at compile time:
//!
//! - `NotAuthenticated`: after a normal `* OK` greeting
//! - `Authenticated`: after LOGIN/AUTHENTICATE, or straight away on `* PREAUTH`
//!
//! A failed authentication hands the not-authenticated client back so the
//! caller keeps the connection and can read the server's refusal with
//! [`Client::last_status`].

#![allow(clippy::missing_errors_doc)]

mod not_authenticated;
mod states;

use std::marker::PhantomData;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, trace};

pub use self::not_authenticated::{AuthResult, Greeted};
pub use self::states::{Authenticated, NotAuthenticated, State};
use super::framed::FramedStream;
use crate::command::{Command, TagGenerator};
use crate::parser::{Response, ResponseParser, UntaggedResponse, strip_crlf};
use crate::types::{Capability, ResponseCode, Status};
use crate::{Error, Result};

/// IMAP client connection with type-state.
///
/// The type parameter `St` (a [`State`] marker) tracks the connection state at
/// compile time.
pub struct Client<S, St> {
    pub(crate) stream: FramedStream<S>,
    pub(crate) tag_gen: TagGenerator,
    pub(crate) capabilities: Vec<Capability>,
    pub(crate) greeting: String,
    pub(crate) last_status: Option<String>,
    pub(crate) io_timeout: Option<Duration>,
    _state: PhantomData<St>,
}

// Manual Debug implementation since FramedStream doesn't implement Debug
impl<S, St: State> std::fmt::Debug for Client<S, St> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("state", &St::NAME)
            .field("tag_gen", &self.tag_gen)
            .field("capabilities", &self.capabilities)
            .field("greeting", &self.greeting)
            .field("last_status", &self.last_status)
            .finish_non_exhaustive()
    }
}

/// Shared implementation for all states.
impl<S, St> Client<S, St>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Returns the server capabilities.
    #[must_use]
    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    /// Checks if the server has a specific capability.
    #[must_use]
    pub fn has_capability(&self, cap: &Capability) -> bool {
        self.capabilities.contains(cap)
    }

    /// Returns the text of the server greeting.
    #[must_use]
    pub fn greeting(&self) -> &str {
        &self.greeting
    }

    /// Returns the last tagged completion line without its tag, e.g.
    /// `NO [AUTHENTICATIONFAILED] Invalid credentials`.
    #[must_use]
    pub fn last_status(&self) -> Option<&str> {
        self.last_status.as_deref()
    }

    /// Sets the per-command round-trip timeout.
    #[must_use]
    pub const fn with_io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = Some(timeout);
        self
    }

    /// Sends a CAPABILITY command and updates the stored capabilities.
    pub async fn capability(&mut self) -> Result<Vec<Capability>> {
        self.execute(&Command::Capability).await?;
        Ok(self.capabilities.clone())
    }

    /// Gracefully disconnects from the server.
    ///
    /// The server's reply is not checked; the connection is going away.
    pub async fn logout(mut self) -> Result<()> {
        let _ = self.execute(&Command::Logout).await;
        Ok(())
    }

    /// Moves the connection into another state.
    pub(crate) fn transition<Next: State>(self) -> Client<S, Next> {
        debug!(state = Next::NAME, "state transition");
        Client {
            stream: self.stream,
            tag_gen: self.tag_gen,
            capabilities: self.capabilities,
            greeting: self.greeting,
            last_status: self.last_status,
            io_timeout: self.io_timeout,
            _state: PhantomData,
        }
    }

    /// Sends a command and waits for its tagged completion.
    pub(crate) async fn execute(&mut self, command: &Command) -> Result<Vec<Vec<u8>>> {
        let tag = self.tag_gen.next();
        debug!(tag, command = ?command, "sending command");
        let data = command.serialize(&tag);

        let timeout = self.io_timeout;
        let responses = with_timeout(timeout, self.round_trip(&data, &tag)).await?;

        self.complete(&responses, &tag)?;
        Ok(responses)
    }

    async fn round_trip(&mut self, data: &[u8], tag: &str) -> Result<Vec<Vec<u8>>> {
        self.stream.write_command(data).await?;
        self.read_until_tagged(tag).await
    }

    /// Reads responses until the tagged response for `tag` arrives.
    ///
    /// If the server says BYE and then closes the socket, the BYE text is
    /// reported instead of a bare end-of-file.
    pub(crate) async fn read_until_tagged(&mut self, tag: &str) -> Result<Vec<Vec<u8>>> {
        let mut responses = Vec::new();
        let mut bye: Option<String> = None;

        loop {
            let response = match self.stream.read_response().await {
                Ok(response) => response,
                Err(Error::Io(_)) if bye.is_some() => {
                    return Err(Error::Bye(bye.unwrap_or_default()));
                }
                Err(e) => return Err(e),
            };
            trace!(line = %String::from_utf8_lossy(strip_crlf(&response)), "received");

            if let Ok(Response::Untagged(UntaggedResponse::Bye { text, .. })) =
                ResponseParser::parse(&response)
            {
                bye = Some(text);
            }

            let done = is_tagged(&response, tag);
            responses.push(response);
            if done {
                return Ok(responses);
            }
        }
    }

    /// Absorbs capability updates and checks that the tagged response is OK.
    pub(crate) fn complete(&mut self, responses: &[Vec<u8>], tag: &str) -> Result<()> {
        for response_bytes in responses {
            match ResponseParser::parse(response_bytes) {
                Ok(
                    Response::Untagged(UntaggedResponse::Capability(caps))
                    | Response::Untagged(UntaggedResponse::Ok {
                        code: Some(ResponseCode::Capability(caps)),
                        ..
                    })
                    | Response::Tagged {
                        code: Some(ResponseCode::Capability(caps)),
                        ..
                    },
                ) => self.capabilities = caps,
                Ok(Response::Untagged(UntaggedResponse::Ok {
                    code: Some(ResponseCode::Alert),
                    text,
                })) => tracing::warn!(alert = %text, "server alert"),
                _ => {}
            }
        }

        let Some(last) = responses.last().filter(|r| is_tagged(r, tag)) else {
            return Err(Error::Protocol("missing tagged response".to_string()));
        };
        self.last_status = Some(status_text(last, tag));

        match ResponseParser::parse(last)? {
            Response::Tagged { status, text, .. } => match status {
                Status::Ok | Status::PreAuth => Ok(()),
                Status::No => Err(Error::No(text)),
                Status::Bad => Err(Error::Bad(text)),
                Status::Bye => Err(Error::Bye(text)),
            },
            _ => Err(Error::Protocol("missing tagged response".to_string())),
        }
    }
}

/// Returns true if `response` starts with `tag` followed by a space.
fn is_tagged(response: &[u8], tag: &str) -> bool {
    response
        .strip_prefix(tag.as_bytes())
        .is_some_and(|rest| rest.first() == Some(&b' '))
}

/// Returns the completion line without its tag and line ending.
fn status_text(response: &[u8], tag: &str) -> String {
    let line = strip_crlf(response);
    let rest = line.get(tag.len() + 1..).unwrap_or_default();
    String::from_utf8_lossy(rest).into_owned()
}

/// Runs `fut` under an optional timeout.
pub(crate) async fn with_timeout<T>(
    timeout: Option<Duration>,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| Error::Timeout(limit))?,
        None => fut.await,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_is_tagged() {
        assert!(is_tagged(b"A0001 OK done\r\n", "A0001"));
        assert!(!is_tagged(b"A00010 OK done\r\n", "A0001"));
        assert!(!is_tagged(b"* OK done\r\n", "A0001"));
    }

    #[test]
    fn test_status_text() {
        assert_eq!(
            status_text(b"A0001 NO [AUTHENTICATIONFAILED] Invalid credentials\r\n", "A0001"),
            "NO [AUTHENTICATIONFAILED] Invalid credentials"
        );
        assert_eq!(status_text(b"A0001\r\n", "A0001"), "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_timeout_expires() {
        let result: Result<()> = with_timeout(Some(Duration::from_secs(5)), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(Error::Timeout(d)) if d == Duration::from_secs(5)));
    }
}
