use std::fmt;

use http::Method;

/// Error type for process-http
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
#[non_exhaustive]
pub enum Error {
    UnsupportedScheme(String),
    MissingHost,
    ContentTypeWithoutBody(Method),
    BadHeader(String),
    BadUrl(String),
    BadUpid(String),
    Resolve { domain: String, reason: String },
    Connect(String),
    Send(String),
    Recv(String),
    ResponseTooLarge(usize),
    Decode(String),
    HttpParseFail(String),
    HttpParseTooManyHeaders,
    BadContentLength,
    BadChunk,
    IncompleteResponse,
    QueryDecode(String),
    PipeClosed,
}

impl From<httparse::Error> for Error {
    fn from(value: httparse::Error) -> Self {
        match value {
            httparse::Error::TooManyHeaders => Error::HttpParseTooManyHeaders,
            v => Error::HttpParseFail(v.to_string()),
        }
    }
}

impl From<httparse::InvalidChunkSize> for Error {
    fn from(_: httparse::InvalidChunkSize) -> Self {
        Error::BadChunk
    }
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnsupportedScheme(v) => write!(f, "unsupported url scheme: {}", v),
            Error::MissingHost => write!(f, "missing url domain or ip"),
            Error::ContentTypeWithoutBody(m) => {
                write!(f, "attempted to do a {} with a content-type but no body", m)
            }
            Error::BadHeader(v) => write!(f, "bad header: {}", v),
            Error::BadUrl(v) => write!(f, "bad url: {}", v),
            Error::BadUpid(v) => write!(f, "bad upid: {}", v),
            Error::Resolve { domain, reason } => {
                write!(f, "failed to determine ip of domain '{}': {}", domain, reason)
            }
            Error::Connect(v) => write!(f, "failed to connect: {}", v),
            Error::Send(v) => write!(f, "failed to send request: {}", v),
            Error::Recv(v) => write!(f, "failed to receive response: {}", v),
            Error::ResponseTooLarge(max) => {
                write!(f, "response larger than the configured max of {} bytes", max)
            }
            Error::Decode(buffer) => write!(f, "failed to decode http response:\n{}\n", buffer),
            Error::HttpParseFail(v) => write!(f, "http parse fail: {}", v),
            Error::HttpParseTooManyHeaders => write!(f, "http parse resulted in too many headers"),
            Error::BadContentLength => write!(f, "content-length header not a number"),
            Error::BadChunk => write!(f, "malformed chunked body"),
            Error::IncompleteResponse => write!(f, "connection closed mid response"),
            Error::QueryDecode(v) => write!(f, "failed to decode query string: {}", v),
            Error::PipeClosed => write!(f, "closed"),
        }
    }
}
