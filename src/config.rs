/// Max number of headers to parse from an HTTP response
pub const MAX_RESPONSE_HEADERS: usize = 128;

/// Tunables for the request pipeline.
///
/// ```
/// use process_http::Config;
///
/// let config = Config::new()
///     .max_response_size(Some(1024 * 1024))
///     .ipv4_only(false);
///
/// assert_eq!(config.get_max_response_headers(), 128);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    max_response_headers: usize,
    max_response_size: Option<usize>,
    ipv4_only: bool,
}

impl Config {
    /// Default configuration.
    pub fn new() -> Self {
        Config {
            max_response_headers: MAX_RESPONSE_HEADERS,
            max_response_size: None,
            ipv4_only: true,
        }
    }

    /// Max number of headers accepted in a response.
    ///
    /// Defaults to 128.
    pub fn max_response_headers(mut self, v: usize) -> Self {
        self.max_response_headers = v;
        self
    }

    /// Max number of bytes read from the connection before giving up.
    ///
    /// Defaults to `None`, which reads until the server closes no matter how
    /// much it sends.
    pub fn max_response_size(mut self, v: Option<usize>) -> Self {
        self.max_response_size = v;
        self
    }

    /// Only consider IPv4 addresses when resolving a domain.
    ///
    /// Defaults to `true`. Literal IPv6 addresses in a URL are always used.
    pub fn ipv4_only(mut self, v: bool) -> Self {
        self.ipv4_only = v;
        self
    }

    #[allow(missing_docs)]
    pub fn get_max_response_headers(&self) -> usize {
        self.max_response_headers
    }

    #[allow(missing_docs)]
    pub fn get_max_response_size(&self) -> Option<usize> {
        self.max_response_size
    }

    #[allow(missing_docs)]
    pub fn get_ipv4_only(&self) -> bool {
        self.ipv4_only
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
