use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::Error;

/// Process identifier: `id@ip:port`.
///
/// Names an actor reachable over HTTP at `http://ip:port/id`.
///
/// ```
/// use process_http::Upid;
///
/// let upid: Upid = "master@10.0.0.1:5050".parse().unwrap();
///
/// assert_eq!(upid.id, "master");
/// assert_eq!(upid.address.port(), 5050);
/// assert_eq!(upid.to_string(), "master@10.0.0.1:5050");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Upid {
    /// Process id, the first path segment of every endpoint of the process.
    pub id: String,
    /// Where the process listens.
    pub address: SocketAddr,
}

impl Upid {
    /// Create a process identifier.
    pub fn new(id: impl Into<String>, address: SocketAddr) -> Self {
        Upid {
            id: id.into(),
            address,
        }
    }
}

impl FromStr for Upid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, address) = s
            .split_once('@')
            .ok_or_else(|| Error::BadUpid(format!("missing '@' in '{}'", s)))?;

        if id.is_empty() {
            return Err(Error::BadUpid(format!("empty id in '{}'", s)));
        }

        let address = address
            .parse()
            .map_err(|e| Error::BadUpid(format!("bad address in '{}': {}", s, e)))?;

        Ok(Upid::new(id, address))
    }
}

impl fmt::Display for Upid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.address)
    }
}
