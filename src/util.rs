use std::str;

/// Trace log the head of an HTTP message, line by line.
pub(crate) fn log_data(data: &[u8]) {
    if !log_enabled!(log::Level::Trace) {
        return;
    }

    let end = find_head_end(data).unwrap_or(data.len());

    for line in data[..end].split(|b| *b == b'\n') {
        let line = line.strip_suffix(b"\r").unwrap_or(line);

        match str::from_utf8(line) {
            Ok(s) => trace!("{}", s),
            Err(_) => trace!("{:?}", line),
        }
    }
}

/// Index just past the `\r\n\r\n` ending a message head.
pub(crate) fn find_head_end(data: &[u8]) -> Option<usize> {
    data.windows(4).position(|w| w == b"\r\n\r\n").map(|i| i + 4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_end() {
        assert_eq!(find_head_end(b"GET / HTTP/1.1\r\n\r\nbody"), Some(18));
        assert_eq!(find_head_end(b"GET / HTTP/1.1\r\n"), None);
    }
}
