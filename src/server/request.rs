//! Incremental request parsing.
//!
//! [`RequestParser`] wraps the streaming `httparse` parser in an explicit
//! state machine (`AwaitingHead → AwaitingBody → Complete`). Each inbound
//! byte chunk is buffered and re-examined; a [`ParsedRequest`] is only
//! ever produced whole, on message-complete. A connection that closes
//! early simply drops the parser and all partial state with it.

use http::Method;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::dispatcher::HandlerRequest;

/// Maximum number of request headers accepted per request.
const MAX_HEADERS: usize = 32;

/// Error raised while assembling a request from inbound bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The request head is not parseable HTTP. The connection is torn
    /// down without a response.
    Protocol { detail: String },
    /// A body was present but did not decode as JSON. Deterministic: a
    /// bad body is never passed through as raw bytes.
    MalformedBody { detail: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Protocol { detail } => write!(f, "invalid HTTP request: {detail}"),
            ParseError::MalformedBody { detail } => {
                write!(f, "request body is not valid JSON: {detail}")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// A complete parsed HTTP request.
///
/// Header keys are lowercase. `body` is the JSON-decoded payload, absent
/// when the request carried no body bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRequest {
    pub method: Method,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Value>,
}

impl From<ParsedRequest> for HandlerRequest {
    fn from(req: ParsedRequest) -> Self {
        HandlerRequest {
            method: req.method,
            path: req.path,
            path_params: HashMap::new(),
            headers: req.headers,
            body: req.body,
        }
    }
}

/// Request head captured once `httparse` reports completion.
#[derive(Debug)]
struct Head {
    head_len: usize,
    content_length: usize,
    method: Method,
    path: String,
    headers: HashMap<String, String>,
}

#[derive(Debug)]
enum ParserState {
    AwaitingHead,
    AwaitingBody(Head),
    Complete,
}

/// Incremental parser adapter: one instance per connection.
///
/// Feed raw byte chunks with [`RequestParser::feed`]; the parser buffers
/// them and returns `Ok(Some(_))` exactly once, when the full request
/// (head plus `Content-Length` body bytes) has arrived. Further input
/// after completion is ignored; a connection serves one request.
#[derive(Debug)]
pub struct RequestParser {
    buf: Vec<u8>,
    state: ParserState,
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            state: ParserState::AwaitingHead,
        }
    }

    /// Feed one inbound chunk.
    ///
    /// Returns `Ok(None)` while the request is still incomplete and
    /// `Ok(Some(request))` on message-complete.
    ///
    /// # Errors
    ///
    /// [`ParseError::Protocol`] for an unparseable head or a
    /// `Content-Length` that overflows the total message size,
    /// [`ParseError::MalformedBody`] when the buffered body is not valid
    /// JSON.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Option<ParsedRequest>, ParseError> {
        if matches!(self.state, ParserState::Complete) {
            return Ok(None);
        }
        self.buf.extend_from_slice(chunk);

        if matches!(self.state, ParserState::AwaitingHead) {
            match self.parse_head()? {
                Some(head) => self.state = ParserState::AwaitingBody(head),
                None => return Ok(None),
            }
        }

        // Body assembly: wait until Content-Length bytes are buffered.
        match std::mem::replace(&mut self.state, ParserState::Complete) {
            ParserState::AwaitingBody(head) => {
                // A Content-Length that overflows the total message size
                // is hostile input, not a request worth waiting for.
                let total_len = head.head_len.checked_add(head.content_length).ok_or_else(
                    || ParseError::Protocol {
                        detail: format!("content-length {} too large", head.content_length),
                    },
                )?;
                if self.buf.len() < total_len {
                    self.state = ParserState::AwaitingBody(head);
                    return Ok(None);
                }

                let body_bytes = &self.buf[head.head_len..total_len];
                let body = if body_bytes.is_empty() {
                    None
                } else {
                    let value: Value = serde_json::from_slice(body_bytes).map_err(|e| {
                        ParseError::MalformedBody {
                            detail: e.to_string(),
                        }
                    })?;
                    Some(value)
                };

                debug!(
                    method = %head.method,
                    path = %head.path,
                    content_length = head.content_length,
                    "Message complete"
                );
                Ok(Some(ParsedRequest {
                    method: head.method,
                    path: head.path,
                    headers: head.headers,
                    body,
                }))
            }
            pending => {
                self.state = pending;
                Ok(None)
            }
        }
    }

    /// Try to parse the request head out of the buffered bytes.
    fn parse_head(&self) -> Result<Option<Head>, ParseError> {
        let mut header_buf = [httparse::EMPTY_HEADER; MAX_HEADERS];
        let mut req = httparse::Request::new(&mut header_buf);

        let head_len = match req.parse(&self.buf) {
            Ok(httparse::Status::Complete(len)) => len,
            Ok(httparse::Status::Partial) => return Ok(None),
            Err(e) => {
                return Err(ParseError::Protocol {
                    detail: e.to_string(),
                })
            }
        };

        let method = req
            .method
            .and_then(|m| Method::from_str(m).ok())
            .ok_or_else(|| ParseError::Protocol {
                detail: "unrecognized method".to_string(),
            })?;
        let path = req
            .path
            .ok_or_else(|| ParseError::Protocol {
                detail: "missing request path".to_string(),
            })?
            .to_string();

        let headers: HashMap<String, String> = req
            .headers
            .iter()
            .map(|h| {
                (
                    h.name.to_ascii_lowercase(),
                    String::from_utf8_lossy(h.value).to_string(),
                )
            })
            .collect();

        let content_length = match headers.get("content-length") {
            Some(v) => v.trim().parse::<usize>().map_err(|_| ParseError::Protocol {
                detail: format!("invalid content-length '{v}'"),
            })?,
            None => 0,
        };

        debug!(
            method = %method,
            path = %path,
            header_count = headers.len(),
            content_length = content_length,
            "Request head parsed"
        );
        Ok(Some(Head {
            head_len,
            content_length,
            method,
            path,
            headers,
        }))
    }
}
