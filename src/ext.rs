//! Extension traits for the http crate types.

use http::{header, HeaderMap, Request};

use crate::encoding;

/// Content negotiation on anything carrying request headers.
pub trait AcceptEncodingExt {
    /// Tell if the `accept-encoding` header allows `encoding`.
    ///
    /// See [`encoding::accepts`].
    fn accepts(&self, encoding: &str) -> bool;
}

impl AcceptEncodingExt for HeaderMap {
    fn accepts(&self, encoding: &str) -> bool {
        let header = self
            .get(header::ACCEPT_ENCODING)
            .and_then(|v| v.to_str().ok());

        encoding::accepts(header, encoding)
    }
}

impl<B> AcceptEncodingExt for Request<B> {
    fn accepts(&self, encoding: &str) -> bool {
        self.headers().accepts(encoding)
    }
}
