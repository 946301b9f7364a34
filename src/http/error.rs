use crate::http::writer::WriterState;

/// Errors produced while parsing requests or writing responses.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Request line is not `METHOD SP TARGET SP HTTP/1.1`.
    #[error("malformed request line")]
    MalformedRequestLine,

    /// A header line has no colon.
    #[error("malformed field line")]
    MalformedFieldLine,

    /// A field name is empty, ends in whitespace or contains a non-token byte.
    #[error("malformed field name")]
    MalformedFieldName,

    /// The parser already failed once and refuses further input.
    #[error("request is in error state")]
    RequestInErrorState,

    #[error("unrecognized status code: {0}")]
    UnrecognizedStatusCode(u16),

    /// A writer method was called out of order.
    #[error("invalid writer state: expected {expected:?}, found {found:?}")]
    InvalidWriterState {
        expected: WriterState,
        found: WriterState,
    },

    #[error("stream read failure: {0}")]
    StreamReadFailure(#[source] std::io::Error),

    #[error("stream write failure: {0}")]
    StreamWriteFailure(#[source] std::io::Error),
}

impl Error {
    /// True for failures caused by malformed input from the peer.
    ///
    /// The connection driver answers these with `400 Bad Request`.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Error::MalformedRequestLine
                | Error::MalformedFieldLine
                | Error::MalformedFieldName
                | Error::RequestInErrorState
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
