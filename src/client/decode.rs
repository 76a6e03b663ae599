use http::Response;

use crate::decoder::ResponseDecoder;
use crate::{Config, Error};

/// Decode exactly one response from everything received on a connection.
///
/// Fails if the bytes do not hold a well formed response, the error carries
/// the bytes for diagnosis.
///
/// Pipelining is not supported. Should the server send more than one response,
/// the first is used and the rest are discarded.
///
/// ```
/// use process_http::client::decode;
/// use process_http::Config;
///
/// let buffer = b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\n\r\nok";
/// let response = decode(buffer, &Config::default()).unwrap();
///
/// assert_eq!(response.status(), 200);
/// assert_eq!(response.body(), b"ok");
/// ```
pub fn decode(buffer: &[u8], config: &Config) -> Result<Response<Vec<u8>>, Error> {
    let mut decoder = ResponseDecoder::new(config.get_max_response_headers());

    let mut responses = decoder.decode(buffer);
    responses.extend(decoder.finish());

    if decoder.failed() || responses.is_empty() {
        if let Some(e) = decoder.failure() {
            debug!("Failed to decode response: {}", e);
        }
        return Err(Error::Decode(String::from_utf8_lossy(buffer).into_owned()));
    }

    if responses.len() > 1 {
        warn!(
            "Received more than 1 HTTP response, discarding {}",
            responses.len() - 1
        );
    }

    Ok(responses.swap_remove(0))
}
