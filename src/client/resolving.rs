use std::net::SocketAddr;

use async_std::net::ToSocketAddrs;

use crate::{Config, Error, Url};

use super::state::{Connecting, Resolving};
use super::{Call, Inner, Outgoing, Target};

impl Call<Resolving> {
    /// Create a new Call.
    ///
    /// Fails without doing any I/O if the URL scheme is not `http`, or the URL
    /// has neither a domain nor an IP.
    pub fn new(url: Url, request: Outgoing, config: Config) -> Result<Self, Error> {
        if url.scheme != "http" {
            return Err(Error::UnsupportedScheme(url.scheme));
        }

        let target = match (&url.ip, &url.domain) {
            (Some(ip), _) => Target::Ip(*ip),
            (None, Some(domain)) => Target::Domain(domain.clone()),
            (None, None) => return Err(Error::MissingHost),
        };

        let inner = Inner {
            url,
            request,
            config,
        };

        Ok(Call::wrap(inner, Resolving { target }))
    }

    /// Proceed to the next state.
    ///
    /// A literal IP is used as is, a domain is resolved.
    pub async fn proceed(self) -> Result<Call<Connecting>, Error> {
        let port = self.inner.url.port;

        let ip = match self.state.target {
            Target::Ip(ip) => ip,
            Target::Domain(domain) => resolve(&domain, port, self.inner.config.get_ipv4_only())
                .await
                .map_err(|reason| Error::Resolve { domain, reason })?,
        };

        let address = SocketAddr::new(ip, port);

        Ok(Call::wrap(self.inner, Connecting { address }))
    }
}

async fn resolve(domain: &str, port: u16, ipv4_only: bool) -> Result<std::net::IpAddr, String> {
    let addrs = (domain, port)
        .to_socket_addrs()
        .await
        .map_err(|e| e.to_string())?;

    let mut addrs = addrs.filter(|a| !ipv4_only || a.is_ipv4());

    addrs
        .next()
        .map(|a| a.ip())
        .ok_or_else(|| "no address found".to_string())
}
