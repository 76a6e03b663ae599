#![no_main]

use libfuzzer_sys::fuzz_target;
use process_http::client::decode;
use process_http::Config;

// Response headers that change how the body is framed
const FRAMING_HEADERS: &[(&str, &[&str])] = &[
    ("content-length", &["0", "5", "11", "100", "x"]),
    ("transfer-encoding", &["chunked", "gzip, chunked", "identity"]),
    ("connection", &["close", "keep-alive"]),
    ("content-type", &["text/plain", "application/json"]),
];

const STATUS_CODES: &[u16] = &[100, 101, 200, 204, 304, 404, 500];

const BODIES: &[&[u8]] = &[
    b"",
    b"hello",
    b"hello world",
    b"5\r\nhello\r\n0\r\n\r\n",
    b"5;ext=1\r\nhello\r\n0\r\nx-trailer: 1\r\n\r\n",
    b"zz\r\n",
];

fuzz_target!(|data: &[u8]| {
    // Raw bytes straight into the decoder.
    let _ = decode(data, &Config::default());

    if data.len() < 4 {
        return;
    }

    // A response assembled from the input, trying the framing rules.
    let status = STATUS_CODES[(data[0] as usize) % STATUS_CODES.len()];
    let mut response = format!("HTTP/1.1 {} X\r\n", status).into_bytes();

    let header_count = (data[1] as usize) % 4;

    for i in 0..header_count {
        let Some(b) = data.get(4 + i) else {
            break;
        };

        let (name, values) = FRAMING_HEADERS[(*b as usize) % FRAMING_HEADERS.len()];
        let value = values[(*b as usize / 7) % values.len()];

        response.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
    }

    response.extend_from_slice(b"\r\n");
    response.extend_from_slice(BODIES[(data[2] as usize) % BODIES.len()]);

    // Some of the input after the response, maybe another response.
    response.extend_from_slice(&data[4..]);

    let config = Config::new().max_response_headers(1 + (data[3] as usize) % 8);

    let _ = decode(&response, &config);
});
