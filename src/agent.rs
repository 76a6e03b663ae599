use http::{HeaderMap, Method, Response};

use crate::client::{self, Outgoing};
use crate::{query, Config, Error, Upid, Url};

/// Entry point for sending requests with a shared [`Config`].
///
/// The free functions [`get()`], [`put()`], [`post()`] etc. use an agent with
/// the default config.
///
/// ```no_run
/// # async_std::task::block_on(async {
/// use process_http::{Agent, Config, Url};
///
/// let agent = Agent::with_config(Config::new().max_response_size(Some(65_536)));
///
/// let url: Url = "http://127.0.0.1:5050/files/read".parse()?;
/// let response = agent
///     .post(&url, None, Some(b"path=/tmp/x".to_vec()), Some("application/x-www-form-urlencoded"))
///     .await?;
/// # Ok::<_, process_http::Error>(())
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct Agent {
    config: Config,
}

impl Agent {
    /// Agent with the default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Agent with the given config.
    pub fn with_config(config: Config) -> Self {
        Agent { config }
    }

    /// The config used for every request.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Send a GET request.
    pub async fn get(
        &self,
        url: &Url,
        headers: Option<HeaderMap>,
    ) -> Result<Response<Vec<u8>>, Error> {
        self.request(url.clone(), Method::GET, headers, None, None)
            .await
    }

    /// Send a PUT request.
    ///
    /// Fails before any I/O if a `content_type` is given without a `body`.
    pub async fn put(
        &self,
        url: &Url,
        headers: Option<HeaderMap>,
        body: Option<Vec<u8>>,
        content_type: Option<&str>,
    ) -> Result<Response<Vec<u8>>, Error> {
        self.request(url.clone(), Method::PUT, headers, body, content_type)
            .await
    }

    /// Send a POST request.
    ///
    /// Fails before any I/O if a `content_type` is given without a `body`.
    pub async fn post(
        &self,
        url: &Url,
        headers: Option<HeaderMap>,
        body: Option<Vec<u8>>,
        content_type: Option<&str>,
    ) -> Result<Response<Vec<u8>>, Error> {
        self.request(url.clone(), Method::POST, headers, body, content_type)
            .await
    }

    /// Send a GET request to an endpoint of a process.
    ///
    /// The `path` is appended to the process id. The `query` is a raw query
    /// string, with or without the leading `?`.
    pub async fn get_process(
        &self,
        upid: &Upid,
        path: Option<&str>,
        query: Option<&str>,
        headers: Option<HeaderMap>,
    ) -> Result<Response<Vec<u8>>, Error> {
        let mut url = Url::from_process(upid, path);

        if let Some(q) = query {
            url.query = query::decode(q.strip_prefix('?').unwrap_or(q))?;
        }

        self.request(url, Method::GET, headers, None, None).await
    }

    /// Send a POST request to an endpoint of a process.
    ///
    /// Fails before any I/O if a `content_type` is given without a `body`.
    pub async fn post_process(
        &self,
        upid: &Upid,
        path: Option<&str>,
        headers: Option<HeaderMap>,
        body: Option<Vec<u8>>,
        content_type: Option<&str>,
    ) -> Result<Response<Vec<u8>>, Error> {
        let url = Url::from_process(upid, path);

        self.request(url, Method::POST, headers, body, content_type)
            .await
    }

    async fn request(
        &self,
        url: Url,
        method: Method,
        headers: Option<HeaderMap>,
        body: Option<Vec<u8>>,
        content_type: Option<&str>,
    ) -> Result<Response<Vec<u8>>, Error> {
        if body.is_none() && content_type.is_some() {
            return Err(Error::ContentTypeWithoutBody(method));
        }

        let request = Outgoing::new(method, headers, body, content_type)?;

        client::request(url, request, &self.config).await
    }
}

/// Send a GET request.
///
/// See [`Agent::get()`].
pub async fn get(url: &Url, headers: Option<HeaderMap>) -> Result<Response<Vec<u8>>, Error> {
    Agent::new().get(url, headers).await
}

/// Send a PUT request.
///
/// See [`Agent::put()`].
pub async fn put(
    url: &Url,
    headers: Option<HeaderMap>,
    body: Option<Vec<u8>>,
    content_type: Option<&str>,
) -> Result<Response<Vec<u8>>, Error> {
    Agent::new().put(url, headers, body, content_type).await
}

/// Send a POST request.
///
/// See [`Agent::post()`].
pub async fn post(
    url: &Url,
    headers: Option<HeaderMap>,
    body: Option<Vec<u8>>,
    content_type: Option<&str>,
) -> Result<Response<Vec<u8>>, Error> {
    Agent::new().post(url, headers, body, content_type).await
}

/// Send a GET request to an endpoint of a process.
///
/// See [`Agent::get_process()`].
pub async fn get_process(
    upid: &Upid,
    path: Option<&str>,
    query: Option<&str>,
    headers: Option<HeaderMap>,
) -> Result<Response<Vec<u8>>, Error> {
    Agent::new().get_process(upid, path, query, headers).await
}

/// Send a POST request to an endpoint of a process.
///
/// See [`Agent::post_process()`].
pub async fn post_process(
    upid: &Upid,
    path: Option<&str>,
    headers: Option<HeaderMap>,
    body: Option<Vec<u8>>,
    content_type: Option<&str>,
) -> Result<Response<Vec<u8>>, Error> {
    Agent::new()
        .post_process(upid, path, headers, body, content_type)
        .await
}
