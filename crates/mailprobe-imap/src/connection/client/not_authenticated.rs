//! Implementation for the not-authenticated state.

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, warn};

use super::{Client, with_timeout};
use super::states::{Authenticated, NotAuthenticated};
use crate::auth::{Credentials, Mechanism, decode_challenge};
use crate::command::{Command, TagGenerator};
use crate::connection::ImapStream;
use crate::connection::framed::FramedStream;
use crate::parser::{Response, ResponseParser, UntaggedResponse};
use crate::types::{Capability, ResponseCode};
use crate::{Error, Result};

/// Outcome of an authentication attempt.
///
/// On failure the not-authenticated client comes back with the error, so
/// the connection survives a rejected password.
pub type AuthResult<S> =
    std::result::Result<Client<S, Authenticated>, (Error, Client<S, NotAuthenticated>)>;

/// A freshly greeted connection.
#[derive(Debug)]
pub enum Greeted<S> {
    /// `* OK` greeting: authentication is required.
    NotAuthenticated(Client<S, NotAuthenticated>),
    /// `* PREAUTH` greeting: the server already authenticated us.
    PreAuthenticated(Client<S, Authenticated>),
}

impl<S> Client<S, NotAuthenticated>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a new client from a connected stream.
    ///
    /// Reads the server greeting and any capabilities it carries.
    pub async fn from_stream(stream: S) -> Result<Greeted<S>> {
        let mut framed = FramedStream::new(stream);

        let greeting = framed.read_response().await?;
        let (preauth, code, text) = match ResponseParser::parse(&greeting)? {
            Response::Untagged(UntaggedResponse::Ok { code, text }) => (false, code, text),
            Response::Untagged(UntaggedResponse::PreAuth { code, text }) => (true, code, text),
            Response::Untagged(UntaggedResponse::Bye { text, .. }) => return Err(Error::Bye(text)),
            other => {
                return Err(Error::Protocol(format!("unexpected greeting: {other:?}")));
            }
        };
        debug!(greeting = %text, preauth, "server greeting");

        let capabilities = match code {
            Some(ResponseCode::Capability(caps)) => caps,
            _ => Vec::new(),
        };

        let client = Self {
            stream: framed,
            tag_gen: TagGenerator::default(),
            capabilities,
            greeting: text,
            last_status: None,
            io_timeout: None,
            _state: std::marker::PhantomData,
        };

        Ok(if preauth {
            Greeted::PreAuthenticated(client.transition())
        } else {
            Greeted::NotAuthenticated(client)
        })
    }

    /// Authenticates with the given credentials.
    ///
    /// Picks LOGIN or a SASL mechanism from the credentials and the server
    /// capabilities (fetching them first if the greeting carried none).
    pub async fn authenticate(mut self, credentials: &Credentials) -> AuthResult<S> {
        let fetched = if self.capabilities.is_empty() {
            self.capability().await.map(drop)
        } else {
            Ok(())
        };
        // Only the reply to LOGIN or AUTHENTICATE counts as the login status.
        self.last_status = None;
        if let Err(e) = fetched {
            return Err((e, self));
        }

        let mechanism = match Mechanism::select(credentials, &self.capabilities) {
            Ok(mechanism) => mechanism,
            Err(e) => return Err((e, self)),
        };
        debug!(mechanism = mechanism.as_str(), username = credentials.username(), "authenticating");

        let outcome = match (mechanism.response(credentials), credentials) {
            (Some(response), _) => self.sasl(mechanism, &response).await,
            (None, Credentials::Password { username, password }) => self
                .execute(&Command::Login {
                    username: username.clone(),
                    password: password.clone(),
                })
                .await
                .map(drop),
            (None, Credentials::OAuth2 { .. }) => {
                Err(Error::Auth("LOGIN needs a password".to_string()))
            }
        };

        match outcome {
            Ok(()) => Ok(self.transition()),
            Err(e) => Err((e, self)),
        }
    }

    /// Runs an AUTHENTICATE exchange.
    ///
    /// The response goes inline when the server supports SASL-IR, otherwise
    /// after the first continuation. A second continuation is the server's
    /// error challenge (XOAUTH2 sends JSON); it is answered with an empty
    /// line so the server finishes with a tagged NO.
    async fn sasl(&mut self, mechanism: Mechanism, response: &str) -> Result<()> {
        let inline = self.has_capability(&Capability::SaslIr);
        let tag = self.tag_gen.next();
        let command = Command::Authenticate {
            mechanism: mechanism.as_str().to_string(),
            initial_response: inline.then(|| response.to_string()),
        };
        debug!(tag, command = ?command, "sending command");
        let data = command.serialize(&tag);

        let timeout = self.io_timeout;
        let responses =
            with_timeout(timeout, self.sasl_exchange(&data, &tag, response, inline)).await?;

        self.complete(&responses, &tag)
    }

    async fn sasl_exchange(
        &mut self,
        data: &[u8],
        tag: &str,
        response: &str,
        inline: bool,
    ) -> Result<Vec<Vec<u8>>> {
        self.stream.write_command(data).await?;

        let mut sent = inline;
        let mut responses = Vec::new();
        let mut bye: Option<String> = None;
        loop {
            let line = match self.stream.read_response().await {
                Ok(line) => line,
                Err(Error::Io(_)) if bye.is_some() => {
                    return Err(Error::Bye(bye.unwrap_or_default()));
                }
                Err(e) => return Err(e),
            };
            match ResponseParser::parse(&line) {
                Ok(Response::Untagged(UntaggedResponse::Bye { text, .. })) => bye = Some(text),
                Ok(Response::Continuation { text }) => {
                    if sent {
                        if let Some(challenge) = text.as_deref().and_then(decode_challenge) {
                            warn!(%challenge, "server rejected SASL response");
                        }
                        self.stream.write_line(b"").await?;
                    } else {
                        self.stream.write_line(response.as_bytes()).await?;
                        sent = true;
                    }
                    continue;
                }
                _ => {}
            }

            let done = super::is_tagged(&line, tag);
            responses.push(line);
            if done {
                return Ok(responses);
            }
        }
    }
}

impl Client<ImapStream, NotAuthenticated> {
    /// Upgrades the connection with STARTTLS.
    ///
    /// Capabilities are discarded afterwards, as RFC 3501 requires, and
    /// re-read from the server.
    pub async fn starttls(mut self, host: &str) -> Result<Self> {
        if self.capabilities.is_empty() {
            self.capability().await?;
        }
        if !self.has_capability(&Capability::StartTls) {
            return Err(Error::StartTlsNotSupported);
        }

        self.execute(&Command::StartTls).await?;
        if self.stream.has_buffered_data() {
            // Plaintext injected after the STARTTLS reply (CVE-2011-0411 style).
            return Err(Error::Protocol(
                "unexpected data after STARTTLS response".to_string(),
            ));
        }

        let timeout = self.io_timeout;
        let stream = self.stream.into_inner();
        let tls = with_timeout(timeout, stream.upgrade_to_tls(host)).await?;

        let mut client = Self {
            stream: FramedStream::new(tls),
            tag_gen: self.tag_gen,
            capabilities: Vec::new(),
            greeting: self.greeting,
            last_status: None,
            io_timeout: self.io_timeout,
            _state: std::marker::PhantomData,
        };
        client.capability().await?;
        Ok(client)
    }
}
