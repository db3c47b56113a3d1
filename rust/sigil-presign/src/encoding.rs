use std::fmt::Write as FmtWrite;

/// Encode bytes as a lowercase hexadecimal string.
pub(crate) fn hex_encode(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        })
}

/// Percent-encode a string according to RFC 3986.
///
/// Unreserved characters (A-Z, a-z, 0-9, `-`, `_`, `.`, `~`) pass through;
/// every other byte becomes `%XX` with uppercase hex.
pub(crate) fn percent_encode(s: &str) -> String {
    percent_encode_bytes(s.as_bytes())
}

fn percent_encode_bytes(bytes: &[u8]) -> String {
    let mut result = String::with_capacity(bytes.len() * 3);
    for &byte in bytes {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                result.push(byte as char);
            }
            _ => {
                let _ = write!(result, "%{byte:02X}");
            }
        }
    }
    result
}

/// SigV4 canonical URI for a path as it appears on the wire.
///
/// `Url::path()` is already percent-encoded, so each segment is decoded and
/// then encoded exactly once. `/` separators are kept.
pub(crate) fn canonical_path(path: &str) -> String {
    path.split('/')
        .map(|segment| percent_encode_bytes(&percent_decode(segment)))
        .collect::<Vec<_>>()
        .join("/")
}

/// Decode `%XX` escapes. Malformed escapes are kept as literal bytes.
fn percent_decode(s: &str) -> Vec<u8> {
    let bytes = s.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut index = 0;
    while index < bytes.len() {
        let escape = (bytes[index] == b'%')
            .then(|| bytes.get(index + 1..index + 3))
            .flatten()
            .and_then(|hex| std::str::from_utf8(hex).ok())
            .and_then(|hex| u8::from_str_radix(hex, 16).ok());

        match escape {
            Some(byte) => {
                decoded.push(byte);
                index += 3;
            }
            None => {
                decoded.push(bytes[index]);
                index += 1;
            }
        }
    }
    decoded
}

/// `host[:port]` of the URL, as it must appear in a signed `host` header.
pub(crate) fn host_header(url: &url::Url) -> Option<String> {
    let hostname = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{hostname}:{port}"),
        None => hostname.to_string(),
    })
}
