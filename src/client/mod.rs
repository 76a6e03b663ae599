//! HTTP/1.1 client request pipeline
//!
//! A request is sent over a fresh connection which is closed once the
//! response is read. There is no pooling and no pipelining: the request is
//! sent with `connection: close` and the end of the response is the server
//! closing the connection.
//!
//! The [`Call`] object encodes the pipeline as state variables, for example
//! `Call<Connecting>` to represent the stage where we are to open the
//! connection. Each `proceed()` consumes the call and, on success, yields the
//! call in the next state. A failure ends the call, the connection (if any)
//! is closed when the call is dropped.
//!
//! The states are:
//!
//! * **Resolving** - Turn the URL domain into an address, unless the URL
//!   has a literal IP
//! * **Connecting** - Open a TCP connection to the address
//! * **Sending** - Send the request line, headers and body in one write
//! * **Receiving** - Read everything until the server closes
//! * **Decoding** - Parse the received bytes into a response
//!
//! ```text
//!  ┌──────────────────┐
//!  │    Resolving     │
//!  └──────────────────┘
//!            │
//!            ▼
//!  ┌──────────────────┐
//!  │    Connecting    │
//!  └──────────────────┘
//!            │
//!            ▼
//!  ┌──────────────────┐
//!  │     Sending      │
//!  └──────────────────┘
//!            │
//!            ▼
//!  ┌──────────────────┐
//!  │    Receiving     │
//!  └──────────────────┘
//!            │
//!            ▼
//!  ┌──────────────────┐
//!  │     Decoding     │───▶ Response
//!  └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! # async_std::task::block_on(async {
//! use process_http::client::{Call, Outgoing};
//! use process_http::http::Method;
//! use process_http::{Config, Url};
//!
//! let url: Url = "http://127.0.0.1:5050/health".parse()?;
//! let request = Outgoing::new(Method::GET, None, None, None)?;
//!
//! // ********************************** Resolving
//!
//! // Rejects anything but http:// before any I/O.
//! let call = Call::new(url, request, Config::default())?;
//!
//! // ********************************** Connecting
//!
//! let call = call.proceed().await?;
//! println!("connecting to {}", call.address());
//!
//! // ********************************** Sending
//!
//! let call = call.proceed().await?;
//!
//! // The exact bytes that will be sent.
//! let prelude = call.prelude()?;
//! assert!(prelude.starts_with(b"GET /health HTTP/1.1\r\n"));
//!
//! // ********************************** Receiving
//!
//! let call = call.proceed().await?;
//!
//! // ********************************** Decoding
//!
//! let call = call.proceed().await?;
//! let response = call.proceed()?;
//!
//! println!("{}", response.status());
//! # Ok::<_, process_http::Error>(())
//! # });
//! ```
//!
//! Or, doing all of the above:
//!
//! ```no_run
//! # async_std::task::block_on(async {
//! # use process_http::client::{request, Outgoing};
//! # use process_http::http::Method;
//! # use process_http::{Config, Url};
//! # let url: Url = "http://127.0.0.1:5050/health".parse()?;
//! let response = request(url, Outgoing::new(Method::GET, None, None, None)?, &Config::default()).await?;
//! # Ok::<_, process_http::Error>(())
//! # });
//! ```

use std::fmt;
use std::net::IpAddr;

use http::{HeaderMap, HeaderValue, Method, Response};

use crate::{Config, Error, Url};

mod decode;
pub use decode::decode;

#[cfg(test)]
mod test;

/// State types for the Call state machine.
///
/// These types are used as type parameters to `Call<State>` to represent
/// the current stage of the request pipeline. Each holds what the stage
/// needs and nothing more.
pub mod state {
    use std::net::SocketAddr;

    use async_std::net::TcpStream;

    use super::Target;

    pub(crate) trait Named {
        fn name() -> &'static str;
    }

    macro_rules! call_state {
        ($n:tt { $($field:ident: $t:ty),* }) => {
            #[doc(hidden)]
            pub struct $n {
                $(pub(crate) $field: $t,)*
            }
            impl Named for $n {
                fn name() -> &'static str {
                    stringify!($n)
                }
            }
        };
    }

    call_state!(Resolving { target: Target });
    call_state!(Connecting { address: SocketAddr });
    call_state!(Sending { address: SocketAddr, stream: TcpStream });
    call_state!(Receiving { stream: TcpStream });
    call_state!(Decoding { buffer: Vec<u8> });
}
use self::state::*;

/// One request over one connection, in some state following the
/// [state graph][crate::client].
pub struct Call<State> {
    inner: Inner,
    state: State,
}

/// What stays the same through every state of a Call.
#[derive(Debug)]
pub(crate) struct Inner {
    pub url: Url,
    pub request: Outgoing,
    pub config: Config,
}

/// Where the request goes before resolving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Target {
    Ip(IpAddr),
    Domain(String),
}

/// A request to send.
///
/// Immutable once handed to a [`Call`].
#[derive(Debug, Clone)]
pub struct Outgoing {
    method: Method,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
    content_type: Option<HeaderValue>,
}

impl Outgoing {
    /// Create a request.
    ///
    /// The `content_type` overrides any `content-type` in `headers`.
    pub fn new(
        method: Method,
        headers: Option<HeaderMap>,
        body: Option<Vec<u8>>,
        content_type: Option<&str>,
    ) -> Result<Self, Error> {
        let content_type = content_type
            .map(HeaderValue::from_str)
            .transpose()
            .map_err(|e| Error::BadHeader(format!("content-type: {}", e)))?;

        Ok(Outgoing {
            method,
            headers: headers.unwrap_or_default(),
            body,
            content_type,
        })
    }

    /// The request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Headers as given by the caller.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The request body, if any.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// The explicit content type, if any.
    pub fn content_type(&self) -> Option<&HeaderValue> {
        self.content_type.as_ref()
    }
}

impl<S> Call<S> {
    fn wrap(inner: Inner, state: S) -> Call<S>
    where
        S: Named,
    {
        let wrapped = Call { inner, state };

        debug!("{:?}", wrapped);

        wrapped
    }

    /// The URL being requested.
    pub fn url(&self) -> &Url {
        &self.inner.url
    }

    /// The request being sent.
    pub fn request(&self) -> &Outgoing {
        &self.inner.request
    }

    #[cfg(test)]
    pub(crate) fn inner(&self) -> &Inner {
        &self.inner
    }
}

// //////////////////////////////////////////////////////////////////////////////////////////// RESOLVING

mod resolving;

// //////////////////////////////////////////////////////////////////////////////////////////// CONNECTING

mod connecting;

// //////////////////////////////////////////////////////////////////////////////////////////// SENDING

mod sending;

// //////////////////////////////////////////////////////////////////////////////////////////// RECEIVING

mod receiving;

// //////////////////////////////////////////////////////////////////////////////////////////// DECODING

impl Call<Decoding> {
    /// The raw bytes received from the server.
    pub fn buffer(&self) -> &[u8] {
        &self.state.buffer
    }

    /// Decode the received bytes into the response.
    ///
    /// See [`decode()`].
    pub fn proceed(self) -> Result<Response<Vec<u8>>, Error> {
        decode(&self.state.buffer, &self.inner.config)
    }
}

// ////////////////////////////////////////////////////////////////////////////////////////////

/// Run a request through every state of a [`Call`].
///
/// The first failing state ends the request.
pub async fn request(
    url: Url,
    request: Outgoing,
    config: &Config,
) -> Result<Response<Vec<u8>>, Error> {
    let call = Call::new(url, request, config.clone())?;

    let call = call.proceed().await?;
    let call = call.proceed().await?;
    let call = call.proceed().await?;
    let call = call.proceed().await?;

    call.proceed()
}

impl<State: Named> fmt::Debug for Call<State> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Call<{}>", State::name())
    }
}
