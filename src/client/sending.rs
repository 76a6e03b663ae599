use std::io::{self, Write};
use std::net::SocketAddr;

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use http::{header, HeaderMap, HeaderValue};

use crate::util::log_data;
use crate::Error;

use super::state::{Receiving, Sending};
use super::{Call, Inner};

impl Call<Sending> {
    /// The entire request as it goes on the wire.
    ///
    /// ```text
    /// POST /bar?x=1 HTTP/1.1\r\n
    /// host: 10.0.0.1:80\r\n
    /// connection: close\r\n
    /// content-length: 5\r\n
    /// \r\n
    /// hello
    /// ```
    pub fn prelude(&self) -> Result<Vec<u8>, Error> {
        self.inner.prelude(self.state.address)
    }

    /// Proceed to the next state.
    ///
    /// Sends the request as one write.
    pub async fn proceed(self) -> Result<Call<Receiving>, Error> {
        // Scoped, Vec<u8> is both io::Write and AsyncWrite.
        use async_std::io::WriteExt;

        let output = self.prelude()?;

        log_data(&output);

        let Sending { mut stream, .. } = self.state;

        stream
            .write_all(&output)
            .await
            .map_err(|e| Error::Send(e.to_string()))?;

        stream
            .flush()
            .await
            .map_err(|e| Error::Send(e.to_string()))?;

        Ok(Call::wrap(self.inner, Receiving { stream }))
    }
}

impl Inner {
    /// Render request line, headers and body.
    ///
    /// Headers given by the caller are kept unless overridden: `host` is
    /// always the resolved address and `connection` is always `close`.
    pub(crate) fn prelude(&self, address: SocketAddr) -> Result<Vec<u8>, Error> {
        let headers = self.headers(address)?;

        let mut output = Vec::with_capacity(256 + self.request.body().map_or(0, |b| b.len()));

        write_prelude(self, &headers, &mut output).map_err(|e| Error::Send(e.to_string()))?;

        Ok(output)
    }

    fn headers(&self, address: SocketAddr) -> Result<HeaderMap, Error> {
        fn from_str(src: &str) -> Result<HeaderValue, Error> {
            HeaderValue::from_str(src).map_err(|e| Error::BadHeader(e.to_string()))
        }

        let request = &self.request;
        let mut headers = request.headers().clone();

        headers.insert(header::HOST, from_str(&address.to_string())?);

        // Tell the server to close the connection when it's done.
        headers.insert(header::CONNECTION, HeaderValue::from_static("close"));

        if let Some(content_type) = request.content_type() {
            headers.insert(header::CONTENT_TYPE, content_type.clone());
        }

        if let Some(body) = request.body() {
            headers.insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));
        }

        let url = &self.url;
        let has_userinfo = url.username.is_some() || url.password.is_some();

        if has_userinfo && !headers.contains_key(header::AUTHORIZATION) {
            let user = url.username.as_deref().unwrap_or_default();
            let pass = url.password.as_deref().unwrap_or_default();
            let creds = BASE64_STANDARD.encode(format!("{}:{}", user, pass));
            headers.insert(header::AUTHORIZATION, from_str(&format!("Basic {}", creds))?);
        }

        Ok(headers)
    }
}

fn write_prelude(inner: &Inner, headers: &HeaderMap, w: &mut Vec<u8>) -> io::Result<()> {
    write!(
        w,
        "{} {} HTTP/1.1\r\n",
        inner.request.method(),
        inner.url.target()
    )?;

    for (name, value) in headers {
        write!(w, "{}: ", name)?;
        w.write_all(value.as_bytes())?;
        write!(w, "\r\n")?;
    }

    write!(w, "\r\n")?;

    if let Some(body) = inner.request.body() {
        w.write_all(body)?;
    }

    Ok(())
}
