use bytes::BytesMut;

use crate::http::error::{Error, Result};
use crate::http::headers::{HeaderMap, find_crlf, is_token};
use crate::http::request::{Request, RequestLine, content_length};

const CRLF_LEN: usize = 2;

/// Progress of a [`RequestParser`].
///
/// ```text
/// Init ──► Headers ──► Body ──► Done
///   │         │          │
///   └─────────┴──────────┴────► Error (absorbing)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// Waiting for the request line
    Init,
    /// Reading field lines
    Headers,
    /// Accumulating `Content-Length` bytes
    Body,
    Done,
    Error,
}

/// Incremental HTTP/1.1 request parser.
///
/// The parser never performs I/O. Each call to [`parse`](Self::parse) looks at
/// a caller-owned buffer and reports how many leading bytes it consumed; the
/// caller drops those bytes, appends newly read data, and calls again. Any
/// split of the input across calls yields the same request.
#[derive(Debug)]
pub struct RequestParser {
    state: ParserState,
    request_line: Option<RequestLine>,
    headers: HeaderMap,
    body: BytesMut,
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestParser {
    pub fn new() -> Self {
        Self {
            state: ParserState::Init,
            request_line: None,
            headers: HeaderMap::new(),
            body: BytesMut::new(),
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == ParserState::Done
    }

    pub fn is_error(&self) -> bool {
        self.state == ParserState::Error
    }

    /// Feeds the unconsumed prefix of the caller's buffer.
    ///
    /// Returns the number of bytes consumed. Zero means more data is needed
    /// (or the request is already done). Bytes past the end of the request are
    /// never consumed. Any error moves the parser to `Error` for good.
    pub fn parse(&mut self, data: &[u8]) -> Result<usize> {
        if self.state == ParserState::Error {
            return Err(Error::RequestInErrorState);
        }

        self.advance(data).inspect_err(|_| {
            self.state = ParserState::Error;
        })
    }

    fn advance(&mut self, data: &[u8]) -> Result<usize> {
        let mut read = 0;

        loop {
            match self.state {
                ParserState::Init => {
                    let Some((request_line, n)) = parse_request_line(&data[read..])? else {
                        return Ok(read);
                    };

                    self.request_line = Some(request_line);
                    read += n;
                    self.state = ParserState::Headers;
                }

                ParserState::Headers => {
                    let (n, done) = self.headers.parse(&data[read..])?;
                    read += n;

                    if !done {
                        return Ok(read);
                    }

                    self.state = ParserState::Body;
                }

                ParserState::Body => {
                    let expected = content_length(&self.headers);
                    if expected == 0 {
                        self.state = ParserState::Done;
                        continue;
                    }

                    let available = &data[read..];
                    let take = (expected - self.body.len()).min(available.len());
                    self.body.extend_from_slice(&available[..take]);
                    read += take;

                    if self.body.len() == expected {
                        self.state = ParserState::Done;
                    }

                    return Ok(read);
                }

                ParserState::Done => return Ok(read),

                ParserState::Error => return Err(Error::RequestInErrorState),
            }
        }
    }

    /// Consumes the parser and returns the request once parsing is done.
    pub fn finish(self) -> Option<Request> {
        match self.state {
            ParserState::Done => Some(Request {
                request_line: self.request_line?,
                headers: self.headers,
                body: self.body.freeze(),
            }),
            _ => None,
        }
    }
}

/// Parses the request line at the front of `buf`.
///
/// Returns `None` when no full line is buffered yet.
fn parse_request_line(buf: &[u8]) -> Result<Option<(RequestLine, usize)>> {
    let Some(idx) = find_crlf(buf) else {
        return Ok(None);
    };

    let parts: Vec<&[u8]> = buf[..idx].split(|&b| b == b' ').collect();
    let &[method, target, version] = parts.as_slice() else {
        return Err(Error::MalformedRequestLine);
    };

    let method = match std::str::from_utf8(method) {
        Ok(method) if is_token(method) => method,
        _ => return Err(Error::MalformedRequestLine),
    };

    if version != b"HTTP/1.1" {
        return Err(Error::MalformedRequestLine);
    }

    let request_line = RequestLine {
        method: method.to_string(),
        target: String::from_utf8_lossy(target).into_owned(),
        http_version: "1.1".to_string(),
    };

    Ok(Some((request_line, idx + CRLF_LEN)))
}
