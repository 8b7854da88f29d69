//! IMAP response parser.
//!
//! A sans-I/O parser for the server responses that occur while connecting
//! and authenticating: status responses (`OK`, `NO`, `BAD`, `PREAUTH`,
//! `BYE`), `CAPABILITY` data and continuation requests. Anything else is
//! kept verbatim as [`UntaggedResponse::Other`].
//!
//! # Example
//!
//! ```
//! use mailprobe_imap::parser::{ResponseParser, Response, UntaggedResponse};
//!
//! let input = b"* OK IMAP4rev2 server ready\r\n";
//! let response = ResponseParser::parse(input).unwrap();
//!
//! match response {
//!     Response::Untagged(UntaggedResponse::Ok { text, .. }) => {
//!         assert!(text.contains("IMAP4rev2"));
//!     }
//!     _ => panic!("Expected untagged OK"),
//! }
//! ```

#![allow(clippy::missing_errors_doc)]

use crate::types::{Capability, ResponseCode, Status, Tag};
use crate::{Error, Result};

/// A parsed IMAP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Tagged response (command completion).
    Tagged {
        /// The command tag.
        tag: Tag,
        /// Response status.
        status: Status,
        /// Optional response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// Untagged response (server data).
    Untagged(UntaggedResponse),
    /// Continuation request.
    Continuation {
        /// Optional text/data.
        text: Option<String>,
    },
}

/// Untagged server data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UntaggedResponse {
    /// `* OK`
    Ok {
        /// Optional response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// `* NO`
    No {
        /// Optional response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// `* BAD`
    Bad {
        /// Optional response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// `* PREAUTH` greeting.
    PreAuth {
        /// Optional response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// `* BYE`
    Bye {
        /// Optional response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// `* CAPABILITY ...`
    Capability(Vec<Capability>),
    /// Any other untagged data, without the leading `* `.
    Other(String),
}

/// Response parser.
pub struct ResponseParser;

impl ResponseParser {
    /// Parses a complete response line.
    pub fn parse(input: &[u8]) -> Result<Response> {
        let line = std::str::from_utf8(strip_crlf(input)).map_err(|e| Error::Parse {
            position: e.valid_up_to(),
            message: "response is not valid UTF-8".to_string(),
        })?;

        let (first, rest) = split_word(line);
        match first {
            "" => Err(Error::Parse {
                position: 0,
                message: "empty response".to_string(),
            }),
            "*" => Ok(Response::Untagged(Self::parse_untagged(rest))),
            "+" => Ok(Response::Continuation {
                text: Some(rest).filter(|t| !t.is_empty()).map(str::to_string),
            }),
            tag => Self::parse_tagged(line, tag, rest),
        }
    }

    /// Parses a tagged response.
    fn parse_tagged(line: &str, tag: &str, rest: &str) -> Result<Response> {
        if !tag.bytes().all(is_tag_char) {
            return Err(Error::Parse {
                position: 0,
                message: format!("Expected *, +, or tag, got {tag:?}"),
            });
        }

        let (word, rest) = split_word(rest);
        let status = Status::parse(word).ok_or_else(|| Error::Parse {
            position: line.len() - rest.len() - word.len(),
            message: format!("Expected status after tag, got {word:?}"),
        })?;
        let (code, text) = parse_resp_text(rest);

        Ok(Response::Tagged {
            tag: Tag::new(tag),
            status,
            code,
            text,
        })
    }

    /// Parses the data after `* `.
    fn parse_untagged(rest: &str) -> UntaggedResponse {
        let (word, tail) = split_word(rest);

        if word.eq_ignore_ascii_case("CAPABILITY") {
            return UntaggedResponse::Capability(
                tail.split_ascii_whitespace().map(Capability::parse).collect(),
            );
        }

        let Some(status) = Status::parse(word) else {
            return UntaggedResponse::Other(rest.to_string());
        };
        let (code, text) = parse_resp_text(tail);

        match status {
            Status::Ok => UntaggedResponse::Ok { code, text },
            Status::No => UntaggedResponse::No { code, text },
            Status::Bad => UntaggedResponse::Bad { code, text },
            Status::PreAuth => UntaggedResponse::PreAuth { code, text },
            Status::Bye => UntaggedResponse::Bye { code, text },
        }
    }
}

/// Splits off the first space-delimited word.
fn split_word(s: &str) -> (&str, &str) {
    s.split_once(' ').unwrap_or((s, ""))
}

/// Parses `[CODE args] text` into its parts.
fn parse_resp_text(s: &str) -> (Option<ResponseCode>, String) {
    let Some(inner) = s.strip_prefix('[') else {
        return (None, s.to_string());
    };
    let Some(end) = inner.find(']') else {
        // Unterminated code: treat the whole thing as text.
        return (None, s.to_string());
    };

    let (atom, args) = match inner[..end].split_once(' ') {
        Some((atom, args)) => (atom, Some(args)),
        None => (&inner[..end], None),
    };
    let text = inner[end + 1..].trim_start().to_string();

    (Some(ResponseCode::parse(atom, args)), text)
}

/// Strips a trailing CRLF (or bare LF) from a response line.
pub(crate) fn strip_crlf(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r\n")
        .or_else(|| line.strip_suffix(b"\n"))
        .unwrap_or(line)
}

/// Returns true if the byte may appear in a command tag.
const fn is_tag_char(b: u8) -> bool {
    b > 0x20
        && b < 0x7F
        && !matches!(b, b'(' | b')' | b'{' | b'%' | b'*' | b'"' | b'\\' | b'+' | b']')
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_parse_ok_greeting() {
        let response = ResponseParser::parse(b"* OK IMAP4rev2 server ready\r\n").unwrap();

        match response {
            Response::Untagged(UntaggedResponse::Ok { code, text }) => {
                assert!(code.is_none());
                assert_eq!(text, "IMAP4rev2 server ready");
            }
            _ => panic!("Expected untagged OK"),
        }
    }

    #[test]
    fn test_parse_greeting_with_capability_code() {
        let input = b"* OK [CAPABILITY IMAP4rev1 SASL-IR AUTH=PLAIN] Dovecot ready.\r\n";
        let response = ResponseParser::parse(input).unwrap();

        let Response::Untagged(UntaggedResponse::Ok {
            code: Some(ResponseCode::Capability(caps)),
            text,
        }) = response
        else {
            panic!("Expected OK with CAPABILITY code");
        };
        assert_eq!(
            caps,
            vec![
                Capability::Imap4Rev1,
                Capability::SaslIr,
                Capability::Auth("PLAIN".to_string())
            ]
        );
        assert_eq!(text, "Dovecot ready.");
    }

    #[test]
    fn test_parse_preauth_and_bye() {
        assert!(matches!(
            ResponseParser::parse(b"* PREAUTH welcome back\r\n").unwrap(),
            Response::Untagged(UntaggedResponse::PreAuth { .. })
        ));
        assert!(matches!(
            ResponseParser::parse(b"* BYE too many connections\r\n").unwrap(),
            Response::Untagged(UntaggedResponse::Bye { text, .. }) if text == "too many connections"
        ));
    }

    #[test]
    fn test_parse_capability_data() {
        let response = ResponseParser::parse(b"* CAPABILITY IMAP4rev1 STARTTLS LOGINDISABLED\r\n")
            .unwrap();
        assert_eq!(
            response,
            Response::Untagged(UntaggedResponse::Capability(vec![
                Capability::Imap4Rev1,
                Capability::StartTls,
                Capability::LoginDisabled,
            ]))
        );
    }

    #[test]
    fn test_parse_tagged_no_with_code() {
        let input = b"A0001 NO [AUTHENTICATIONFAILED] Invalid credentials (Failure)\r\n";
        let response = ResponseParser::parse(input).unwrap();

        assert_eq!(
            response,
            Response::Tagged {
                tag: Tag::new("A0001"),
                status: Status::No,
                code: Some(ResponseCode::AuthenticationFailed),
                text: "Invalid credentials (Failure)".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_tagged_without_text() {
        let response = ResponseParser::parse(b"A0002 OK\r\n").unwrap();
        assert!(matches!(
            response,
            Response::Tagged { status: Status::Ok, ref text, .. } if text.is_empty()
        ));
    }

    #[test]
    fn test_parse_continuation() {
        assert_eq!(
            ResponseParser::parse(b"+ \r\n").unwrap(),
            Response::Continuation { text: None }
        );
        assert_eq!(
            ResponseParser::parse(b"+ eyJzdGF0dXMiOiI0MDAifQ==\r\n").unwrap(),
            Response::Continuation {
                text: Some("eyJzdGF0dXMiOiI0MDAifQ==".to_string())
            }
        );
    }

    #[test]
    fn test_parse_other_untagged() {
        assert_eq!(
            ResponseParser::parse(b"* ID (\"name\" \"Dovecot\")\r\n").unwrap(),
            Response::Untagged(UntaggedResponse::Other("ID (\"name\" \"Dovecot\")".to_string()))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(ResponseParser::parse(b"\r\n").is_err());
        assert!(ResponseParser::parse(b"A0001 MAYBE later\r\n").is_err());
        assert!(ResponseParser::parse(b"(bad OK\r\n").is_err());
        assert!(ResponseParser::parse(b"A1 OK \xff\xfe\r\n").is_err());
    }

    #[test]
    fn test_unterminated_code_is_text() {
        let response = ResponseParser::parse(b"A1 NO [ALERT oops\r\n").unwrap();
        assert!(matches!(
            response,
            Response::Tagged { code: None, ref text, .. } if text == "[ALERT oops"
        ));
    }

    proptest! {
        #[test]
        fn tagged_text_survives_parsing(text in "[a-zA-Z0-9 .,:()-]{0,80}") {
            let text = text.trim_start();
            let line = format!("A0001 NO {text}\r\n");
            let response = ResponseParser::parse(line.as_bytes()).unwrap();
            match response {
                Response::Tagged { status, code, text: parsed, .. } => {
                    prop_assert_eq!(status, Status::No);
                    prop_assert!(code.is_none());
                    prop_assert_eq!(parsed, text);
                }
                other => prop_assert!(false, "unexpected response {:?}", other),
            }
        }
    }
}
