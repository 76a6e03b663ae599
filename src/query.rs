//! Query string codec.
//!
//! Decoding accepts both `&` and `;` as pair separators. Duplicate keys are
//! not supported, the last occurrence wins.

use std::collections::HashMap;

use percent_encoding::{percent_decode, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::Error;

/// Everything but the RFC 3986 unreserved characters is escaped.
const QUERY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Decode a raw query string (without the leading `?`).
///
/// ```
/// let query = process_http::query::decode("a=1&b=x%20y;c").unwrap();
///
/// assert_eq!(query["a"], "1");
/// assert_eq!(query["b"], "x y");
/// assert_eq!(query["c"], "");
/// ```
pub fn decode(query: &str) -> Result<HashMap<String, String>, Error> {
    let mut result = HashMap::new();

    for token in query.split(|c| c == ';' || c == '&') {
        if token.is_empty() {
            continue;
        }

        let (key, value) = match token.split_once('=') {
            Some((key, value)) => (decode_part(key)?, decode_part(value)?),
            None => (decode_part(token)?, String::new()),
        };

        result.insert(key, value);
    }

    Ok(result)
}

/// Encode a query map.
///
/// A key with an empty value is written without `=`. The order of pairs
/// follows the iteration order of the map.
pub fn encode(query: &HashMap<String, String>) -> String {
    let mut output = String::new();

    for (key, value) in query {
        if !output.is_empty() {
            output.push('&');
        }

        output.extend(utf8_percent_encode(key, QUERY));

        if !value.is_empty() {
            output.push('=');
            output.extend(utf8_percent_encode(value, QUERY));
        }
    }

    output
}

fn decode_part(s: &str) -> Result<String, Error> {
    let bytes = s.as_bytes();

    // percent_decode passes malformed escapes through, we want them rejected.
    for (i, b) in bytes.iter().enumerate() {
        if *b != b'%' {
            continue;
        }

        let valid = bytes
            .get(i + 1..i + 3)
            .map(|hex| hex.iter().all(u8::is_ascii_hexdigit))
            .unwrap_or(false);

        if !valid {
            return Err(Error::QueryDecode(format!("malformed % escape in '{}'", s)));
        }
    }

    let plus_as_space: Vec<u8> = bytes
        .iter()
        .map(|b| if *b == b'+' { b' ' } else { *b })
        .collect();

    percent_decode(&plus_as_space)
        .decode_utf8()
        .map(|v| v.into_owned())
        .map_err(|e| Error::QueryDecode(format!("'{}' is not utf-8: {}", s, e)))
}
