//! Incremental HTTP/1.1 response decoder.
//!
//! Bytes are fed in as they arrive and complete responses, head and body,
//! come out. One input may hold any number of responses.

use http::{header, HeaderMap, HeaderName, HeaderValue, Response, StatusCode, Version};

use crate::util::log_data;
use crate::Error;

#[derive(Debug)]
pub(crate) struct ResponseDecoder {
    buffer: Vec<u8>,
    max_headers: usize,
    failure: Option<Error>,
}

impl ResponseDecoder {
    pub fn new(max_headers: usize) -> Self {
        ResponseDecoder {
            buffer: Vec::new(),
            max_headers,
            failure: None,
        }
    }

    /// Feed more input, returning every response completed by it.
    pub fn decode(&mut self, input: &[u8]) -> Vec<Response<Vec<u8>>> {
        if self.failure.is_some() {
            return vec![];
        }

        self.buffer.extend_from_slice(input);
        self.drain(false)
    }

    /// Signal end of input.
    ///
    /// Completes a close delimited body. Anything left unparsed after that is a
    /// truncated response and fails the decoder.
    pub fn finish(&mut self) -> Vec<Response<Vec<u8>>> {
        let responses = self.drain(true);

        if self.failure.is_none() && !self.buffer.is_empty() {
            debug!("{} bytes left of an incomplete response", self.buffer.len());
            self.failure = Some(Error::IncompleteResponse);
        }

        responses
    }

    pub fn failed(&self) -> bool {
        self.failure.is_some()
    }

    pub fn failure(&self) -> Option<&Error> {
        self.failure.as_ref()
    }

    fn drain(&mut self, eof: bool) -> Vec<Response<Vec<u8>>> {
        let mut responses = Vec::new();

        while self.failure.is_none() && !self.buffer.is_empty() {
            match try_parse_response(&self.buffer, self.max_headers, eof) {
                Ok(Some((input_used, response))) => {
                    self.buffer.drain(..input_used);

                    if response.status().is_informational() {
                        debug!("Discard interim response: {}", response.status());
                        continue;
                    }

                    responses.push(response);
                }
                // Not enough input yet
                Ok(None) => break,
                Err(e) => {
                    debug!("Response decoding failed: {}", e);
                    self.failure = Some(e);
                }
            }
        }

        responses
    }
}

/// Try to parse one complete response from the start of `input`.
///
/// Returns `None` until the input holds the entire response.
fn try_parse_response(
    input: &[u8],
    max_headers: usize,
    eof: bool,
) -> Result<Option<(usize, Response<Vec<u8>>)>, Error> {
    let mut headers = vec![httparse::EMPTY_HEADER; max_headers];
    let mut res = httparse::Response::new(&mut headers);

    let head_len = match res.parse(input)? {
        httparse::Status::Complete(v) => v,
        httparse::Status::Partial => return Ok(None),
    };

    let version = match res.version {
        Some(0) => Version::HTTP_10,
        Some(1) => Version::HTTP_11,
        _ => return Err(Error::HttpParseFail("unsupported http version".into())),
    };

    let status = res
        .code
        .and_then(|c| StatusCode::from_u16(c).ok())
        .ok_or_else(|| Error::HttpParseFail("bad status code".into()))?;

    let mut map = HeaderMap::with_capacity(res.headers.len());

    for h in res.headers.iter() {
        let name = HeaderName::from_bytes(h.name.as_bytes())
            .map_err(|_| Error::BadHeader(h.name.to_string()))?;
        let value =
            HeaderValue::from_bytes(h.value).map_err(|_| Error::BadHeader(h.name.to_string()))?;
        map.append(name, value);
    }

    let reader = BodyReader::for_response(status, &map)?;

    let Some((body_used, body)) = reader.read(&input[head_len..], eof)? else {
        return Ok(None);
    };

    log_data(&input[..head_len]);

    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.version_mut() = version;
    *response.headers_mut() = map;

    Ok(Some((head_len + body_used, response)))
}

/// How the response body is delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyReader {
    NoBody,
    LengthDelimited(u64),
    Chunked,
    CloseDelimited,
}

impl BodyReader {
    fn for_response(status: StatusCode, headers: &HeaderMap) -> Result<Self, Error> {
        if status.is_informational()
            || status == StatusCode::NO_CONTENT
            || status == StatusCode::NOT_MODIFIED
        {
            return Ok(BodyReader::NoBody);
        }

        let is_chunked = headers
            .get_all(header::TRANSFER_ENCODING)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.rsplit(',').next())
            .any(|v| v.trim().eq_ignore_ascii_case("chunked"));

        // Chunked wins over content-length.
        if is_chunked {
            return Ok(BodyReader::Chunked);
        }

        let mut lengths = headers.get_all(header::CONTENT_LENGTH).iter().map(|v| {
            v.to_str()
                .ok()
                .and_then(|v| v.trim().parse::<u64>().ok())
                .ok_or(Error::BadContentLength)
        });

        let Some(length) = lengths.next() else {
            return Ok(BodyReader::CloseDelimited);
        };
        let length = length?;

        for other in lengths {
            if other? != length {
                return Err(Error::BadContentLength);
            }
        }

        Ok(BodyReader::LengthDelimited(length))
    }

    fn read(&self, input: &[u8], eof: bool) -> Result<Option<(usize, Vec<u8>)>, Error> {
        match *self {
            BodyReader::NoBody => Ok(Some((0, vec![]))),
            BodyReader::LengthDelimited(length) => {
                let length = usize::try_from(length).map_err(|_| Error::BadContentLength)?;
                if input.len() < length {
                    return Ok(None);
                }
                Ok(Some((length, input[..length].to_vec())))
            }
            BodyReader::Chunked => read_chunked(input),
            BodyReader::CloseDelimited => {
                if !eof {
                    return Ok(None);
                }
                Ok(Some((input.len(), input.to_vec())))
            }
        }
    }
}

fn read_chunked(input: &[u8]) -> Result<Option<(usize, Vec<u8>)>, Error> {
    let mut pos = 0;
    let mut body = Vec::new();

    loop {
        let (size_len, size) = match httparse::parse_chunk_size(&input[pos..])? {
            httparse::Status::Complete(v) => v,
            httparse::Status::Partial => return Ok(None),
        };
        pos += size_len;

        if size == 0 {
            break;
        }

        let end = usize::try_from(size)
            .ok()
            .and_then(|size| pos.checked_add(size))
            .ok_or(Error::BadChunk)?;

        let Some(chunk_end) = end.checked_add(2) else {
            return Err(Error::BadChunk);
        };

        if input.len() < chunk_end {
            return Ok(None);
        }

        if &input[end..chunk_end] != b"\r\n" {
            return Err(Error::BadChunk);
        }

        body.extend_from_slice(&input[pos..end]);
        pos = chunk_end;
    }

    // Trailers are skipped up to the terminating empty line.
    loop {
        let Some(line_len) = input[pos..].windows(2).position(|w| w == b"\r\n") else {
            return Ok(None);
        };

        pos += line_len + 2;

        if line_len == 0 {
            return Ok(Some((pos, body)));
        }
    }
}
