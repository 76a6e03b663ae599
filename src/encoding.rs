//! Content-coding negotiation.

/// Tell whether `encoding` is acceptable according to an `Accept-Encoding`
/// header value.
///
/// See RFC 2616, section 14.3. The explicitly listed coding is looked up
/// first, then `*`. The first coding specification matching a candidate
/// decides: it is acceptable unless it carries a q-value of zero.
///
/// Preference ranking between several acceptable codings is not done, and a
/// missing header means nothing but identity is acceptable, hence `false`.
///
/// ```
/// use process_http::encoding::accepts;
///
/// assert!(accepts(Some("gzip, deflate"), "gzip"));
/// assert!(!accepts(Some("gzip;q=0"), "gzip"));
/// assert!(accepts(Some("*"), "br"));
/// assert!(!accepts(None, "gzip"));
/// ```
pub fn accepts(header: Option<&str>, encoding: &str) -> bool {
    let Some(header) = header else {
        return false;
    };

    let accepted: String = header
        .chars()
        .filter(|c| !matches!(c, ' ' | '\t' | '\n'))
        .collect();

    for candidate in [encoding, "*"] {
        let matching = accepted
            .split(',')
            .filter(|s| !s.is_empty())
            .find(|s| s.starts_with(candidate));

        if let Some(coding) = matching {
            return is_acceptable(coding);
        }
    }

    false
}

fn is_acceptable(coding: &str) -> bool {
    let mut q_values = coding
        .split(';')
        .filter_map(|param| param.split_once('='))
        .filter(|(key, value)| *key == "q" && !value.is_empty() && !value.contains('='))
        .map(|(_, value)| value);

    let (Some(q), None) = (q_values.next(), q_values.next()) else {
        // No q-value, or more than one.
        return true;
    };

    q.parse::<f64>().map(|q| q > 0.0).unwrap_or(false)
}
