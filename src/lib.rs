//! Asynchronous HTTP/1.1 client transport for process runtimes.
//!
//! The crate has three layers:
//!
//! * [`pipe`] - a streaming byte pipe with independently closable read and
//!   write ends, used to move bodies between a producer and its consumers
//!   without buffering them wholesale.
//! * [`query`], [`encoding`] - protocol helpers: the query string codec and
//!   `Accept-Encoding` negotiation.
//! * [`client`] - a single-connection request pipeline that resolves, connects,
//!   sends one request, reads until the peer closes and decodes the reply.
//!
//! The verb functions ([`get`], [`put`], [`post`]) are the usual entry points.
//!
//! ```no_run
//! # async_std::task::block_on(async {
//! use process_http::Url;
//!
//! let url: Url = "http://127.0.0.1:5050/master/state".parse()?;
//! let response = process_http::get(&url, None).await?;
//!
//! println!("{}", response.status());
//! # Ok::<_, process_http::Error>(())
//! # });
//! ```
//!
//! Every request is sent with `connection: close`. There is no connection
//! pooling, no pipelining and no TLS.
//!
//! # The http crate
//!
//! Based on the [http crate](https://crates.io/crates/http) - a unified HTTP API for Rust.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
extern crate log;

mod error;
pub use error::Error;

pub mod encoding;
pub mod ext;
pub mod pipe;
pub mod query;

mod config;
pub use config::Config;

mod upid;
pub use upid::Upid;

mod url;
pub use url::Url;

#[cfg(feature = "client")]
mod util;

#[cfg(feature = "client")]
mod decoder;

#[cfg(feature = "client")]
pub mod client;

#[cfg(feature = "client")]
mod agent;
#[cfg(feature = "client")]
pub use agent::{get, get_process, post, post_process, put, Agent};

pub use http;
