//! RFC 3986 percent-encoding

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything except `A-Z a-z 0-9 - . _ ~`
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode a string, leaving only unreserved characters as-is
pub fn percent_encode(input: &str) -> String {
    utf8_percent_encode(input, UNRESERVED).to_string()
}

/// Encode each segment of a slash-separated path
pub fn encode_path(path: &str) -> String {
    path.trim_matches('/')
        .split('/')
        .map(percent_encode)
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreserved_untouched() {
        assert_eq!(percent_encode("AZaz09-._~"), "AZaz09-._~");
    }

    #[test]
    fn test_reserved_encoded() {
        assert_eq!(
            percent_encode("Hello Ladies + Gentlemen, a signed OAuth request!"),
            "Hello%20Ladies%20%2B%20Gentlemen%2C%20a%20signed%20OAuth%20request%21"
        );
        assert_eq!(percent_encode("a/b=c&d"), "a%2Fb%3Dc%26d");
        assert_eq!(percent_encode("☃"), "%E2%98%83");
    }

    #[test]
    fn test_encode_path() {
        assert_eq!(encode_path("/docs/release notes.html"), "docs/release%20notes.html");
        assert_eq!(encode_path("index.html"), "index.html");
    }
}
