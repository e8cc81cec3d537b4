//! HTTP parsing utilities
//!
//! Just enough HTTP/1.1 for the API: a request head, a fixed-length body,
//! query strings, `multipart/form-data`, and close-delimited responses.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;

/// Largest accepted request head (request line + headers)
pub const MAX_HEADER_BYTES: usize = 16 * 1024;

/// Find the end of HTTP headers (position after \r\n\r\n or \n\n)
pub fn find_header_end(data: &[u8]) -> Option<usize> {
    // Whichever terminator comes first; a bare-LF head may precede a CRLF body
    let crlf = find_subsequence(data, b"\r\n\r\n").map(|i| i + 4);
    let lf = find_subsequence(data, b"\n\n").map(|i| i + 2);
    match (crlf, lf) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// Parse Content-Length header from HTTP headers string
pub fn parse_content_length(headers: &str) -> usize {
    for line in headers.lines() {
        let lower = line.to_lowercase();
        if lower.starts_with("content-length:") {
            if let Some(value) = line.split(':').nth(1) {
                if let Ok(len) = value.trim().parse::<usize>() {
                    return len;
                }
            }
        }
    }
    0 // No Content-Length header means no body
}

/// Position of the first occurrence of `needle` in `haystack`
pub fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

// ============================================================================
// Request
// ============================================================================

/// A parsed HTTP request
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub method: String,
    /// Path without the query string
    pub path: String,
    /// Decoded query parameters in order of appearance
    pub query: Vec<(String, String)>,
    /// Header names are lowercased
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Request {
    /// Parse the request line and headers; the body is filled in later
    pub fn parse_head(head: &str) -> Option<Request> {
        let mut lines = head.lines();
        let first_line = lines.next()?;

        let parts: Vec<&str> = first_line.split_whitespace().collect();
        if parts.len() < 2 {
            return None;
        }

        let (path, query) = match parts[1].split_once('?') {
            Some((p, q)) => (p, parse_query(q)),
            None => (parts[1], Vec::new()),
        };

        let headers = lines
            .take_while(|l| !l.trim().is_empty())
            .filter_map(|l| l.split_once(':'))
            .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
            .collect();

        Some(Request {
            method: parts[0].to_ascii_uppercase(),
            path: path.to_string(),
            query,
            headers,
            body: Vec::new(),
        })
    }

    /// First header with this name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// First query parameter with this name
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Split and decode `a=1&b=two`
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (percent_decode(k), percent_decode(v)),
            None => (percent_decode(pair), String::new()),
        })
        .collect()
}

/// Characters `encodeURIComponent` leaves alone
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Decode `%XX` escapes and `+` as space; invalid escapes pass through
pub fn percent_decode(input: &str) -> String {
    percent_decode_str(&input.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}

/// Encode like JavaScript's `encodeURIComponent`
pub fn percent_encode_component(input: &str) -> String {
    utf8_percent_encode(input, COMPONENT).to_string()
}

// ============================================================================
// multipart/form-data
// ============================================================================

/// One part of a multipart form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    /// Present for file fields
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl FormPart {
    /// Field value as text (lossy)
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }
}

/// Split a header value into `;`-separated params, respecting quotes
fn split_params(value: &str) -> Vec<String> {
    let mut params = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escaped = false;

    for c in value.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => {
                current.push(c);
                escaped = true;
            }
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            ';' if !in_quotes => params.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    params.push(current);

    params
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

fn unquote(value: &str) -> String {
    let value = value.trim();
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        value[1..value.len() - 1]
            .replace("\\\"", "\"")
            .replace("\\\\", "\\")
    } else {
        value.to_string()
    }
}

/// Look up a `key=value` parameter in a header value
pub fn header_param(value: &str, key: &str) -> Option<String> {
    split_params(value).into_iter().skip(1).find_map(|p| {
        let (k, v) = p.split_once('=')?;
        if k.trim().eq_ignore_ascii_case(key) {
            Some(unquote(v))
        } else {
            None
        }
    })
}

/// Boundary from a `multipart/form-data` content type
pub fn multipart_boundary(content_type: &str) -> Option<String> {
    let media_type = content_type.split(';').next()?.trim();
    if !media_type.eq_ignore_ascii_case("multipart/form-data") {
        return None;
    }
    header_param(content_type, "boundary").filter(|b| !b.is_empty())
}

/// Parse a `multipart/form-data` body
pub fn parse_multipart(body: &[u8], boundary: &str) -> Result<Vec<FormPart>, String> {
    let delimiter = format!("--{}", boundary).into_bytes();
    let mut closing = b"\r\n".to_vec();
    closing.extend_from_slice(&delimiter);

    let mut pos = find_subsequence(body, &delimiter)
        .ok_or_else(|| "multipart boundary not found".to_string())?
        + delimiter.len();

    let mut parts = Vec::new();
    loop {
        let rest = &body[pos..];
        if rest.starts_with(b"--") {
            break; // final delimiter
        }
        let rest = rest
            .strip_prefix(b"\r\n")
            .or_else(|| rest.strip_prefix(b"\n"))
            .ok_or_else(|| "malformed multipart delimiter".to_string())?;
        let part_start = body.len() - rest.len();

        let header_end = find_header_end(rest)
            .ok_or_else(|| "multipart part has no header terminator".to_string())?;
        let head = String::from_utf8_lossy(&rest[..header_end]);
        let content_start = part_start + header_end;

        let content_len = find_subsequence(&body[content_start..], &closing)
            .ok_or_else(|| "multipart body is truncated".to_string())?;
        let data = body[content_start..content_start + content_len].to_vec();
        pos = content_start + content_len + closing.len();

        let mut disposition = None;
        let mut content_type = None;
        for line in head.lines() {
            if let Some((k, v)) = line.split_once(':') {
                let k = k.trim();
                if k.eq_ignore_ascii_case("content-disposition") {
                    disposition = Some(v.trim().to_string());
                } else if k.eq_ignore_ascii_case("content-type") {
                    content_type = Some(v.trim().to_string());
                }
            }
        }

        let disposition =
            disposition.ok_or_else(|| "multipart part lacks Content-Disposition".to_string())?;
        let name = header_param(&disposition, "name")
            .ok_or_else(|| "multipart part lacks a field name".to_string())?;

        parts.push(FormPart {
            name,
            filename: header_param(&disposition, "filename"),
            content_type,
            data,
        });
    }

    Ok(parts)
}

// ============================================================================
// Responses
// ============================================================================

/// An HTTP response ready to be written to the socket
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Raw bytes with the given content type
    pub fn bytes(status: u16, content_type: &str, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type: content_type.to_string(),
            headers: Vec::new(),
            body,
        }
    }

    /// Add an extra header
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    /// Serialize status line, headers and body
    pub fn into_bytes(self) -> Vec<u8> {
        let mut head = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n",
            self.status,
            status_text(self.status),
            self.content_type,
            self.body.len()
        );
        for (name, value) in &self.headers {
            head.push_str(&format!("{}: {}\r\n", name, value));
        }
        head.push_str("Connection: close\r\n\r\n");

        let mut out = head.into_bytes();
        out.extend_from_slice(&self.body);
        out
    }
}

#[cfg(test)]
impl HttpResponse {
    /// Extra header lookup (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub fn status_text(status: u16) -> &'static str {
    match status {
        100 => "Continue",
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        405 => "Method Not Allowed",
        411 => "Length Required",
        413 => "Payload Too Large",
        415 => "Unsupported Media Type",
        431 => "Request Header Fields Too Large",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

pub fn http_response(status: u16, body: &str) -> HttpResponse {
    HttpResponse::bytes(status, "text/plain; charset=utf-8", body.as_bytes().to_vec())
}

pub fn http_json_response<T: Serialize>(status: u16, value: &T) -> HttpResponse {
    match serde_json::to_vec(value) {
        Ok(body) => HttpResponse::bytes(status, "application/json", body),
        Err(e) => http_error(500, &format!("failed to encode response: {}", e)),
    }
}

/// `{"error": "..."}` with the given status
pub fn http_error(status: u16, message: &str) -> HttpResponse {
    let body = serde_json::json!({ "error": message }).to_string();
    HttpResponse::bytes(status, "application/json", body.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_header_end() {
        assert_eq!(find_header_end(b"GET / HTTP/1.1\r\nA: b\r\n\r\nbody"), Some(24));
        assert_eq!(find_header_end(b"GET / HTTP/1.1\nA: b\n\nbody"), Some(21));
        assert_eq!(find_header_end(b"GET / HTTP/1.1\r\nA: b\r\n"), None);

        // LF-terminated head followed by a CRLF multipart body
        let raw = b"POST / HTTP/1.1\nContent-Length: 40\n\n--b\r\nContent-Disposition: x\r\n\r\nv\r\n";
        assert_eq!(find_header_end(raw), Some(36));
    }

    #[test]
    fn test_parse_content_length() {
        assert_eq!(parse_content_length("POST / HTTP/1.1\r\nContent-Length: 42\r\n"), 42);
        assert_eq!(parse_content_length("POST / HTTP/1.1\r\ncontent-length:7\r\n"), 7);
        assert_eq!(parse_content_length("GET / HTTP/1.1\r\n"), 0);
    }

    #[test]
    fn test_parse_head() {
        let req = Request::parse_head(
            "GET /api/items?page=2&limit=5 HTTP/1.1\r\nHost: x\r\nAuthorization: pw\r\n\r\n",
        )
        .unwrap();
        assert_eq!(req.method, "GET");
        assert_eq!(req.path, "/api/items");
        assert_eq!(req.query_param("page"), Some("2"));
        assert_eq!(req.query_param("limit"), Some("5"));
        assert_eq!(req.header("authorization"), Some("pw"));
        assert_eq!(req.header("AUTHORIZATION"), Some("pw"));
        assert_eq!(req.header("cookie"), None);

        assert!(Request::parse_head("").is_none());
        assert!(Request::parse_head("GARBAGE").is_none());
    }

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("a%20b+c"), "a b c");
        assert_eq!(percent_decode("%E4%BD%A0"), "你");
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz"), "%zz");
        assert_eq!(percent_decode("p%40ss%2Fw"), "p@ss/w");
        assert_eq!(percent_decode("a%2Bb"), "a+b");
    }

    #[test]
    fn test_percent_encode_component() {
        assert_eq!(percent_encode_component("report (1).pdf"), "report%20(1).pdf");
        assert_eq!(percent_encode_component("你.txt"), "%E4%BD%A0.txt");
        assert_eq!(percent_encode_component("a\"b"), "a%22b");
    }

    #[test]
    fn test_multipart_boundary() {
        assert_eq!(
            multipart_boundary("multipart/form-data; boundary=----abc123"),
            Some("----abc123".to_string())
        );
        assert_eq!(
            multipart_boundary("multipart/form-data; charset=utf-8; boundary=\"q b\""),
            Some("q b".to_string())
        );
        assert_eq!(multipart_boundary("application/json"), None);
        assert_eq!(multipart_boundary("multipart/form-data"), None);
    }

    #[test]
    fn test_parse_multipart() {
        let body = b"--XyZ\r\n\
Content-Disposition: form-data; name=\"title\"\r\n\
\r\n\
Hello\r\n\
--XyZ\r\n\
Content-Disposition: form-data; name=\"file_1\"; filename=\"a;b.png\"\r\n\
Content-Type: image/png\r\n\
\r\n\
\x89PNG\r\n\x00\x01\r\n\
--XyZ--\r\n";

        let parts = parse_multipart(body, "XyZ").unwrap();
        assert_eq!(parts.len(), 2);

        assert_eq!(parts[0].name, "title");
        assert_eq!(parts[0].filename, None);
        assert_eq!(parts[0].text(), "Hello");

        assert_eq!(parts[1].name, "file_1");
        assert_eq!(parts[1].filename.as_deref(), Some("a;b.png"));
        assert_eq!(parts[1].content_type.as_deref(), Some("image/png"));
        assert_eq!(parts[1].data, b"\x89PNG\r\n\x00\x01".to_vec());
    }

    #[test]
    fn test_parse_multipart_empty_field() {
        let body = b"--b\r\nContent-Disposition: form-data; name=\"sharePassword\"\r\n\r\n\r\n--b--";
        let parts = parse_multipart(body, "b").unwrap();
        assert_eq!(parts.len(), 1);
        assert!(parts[0].data.is_empty());
    }

    #[test]
    fn test_parse_multipart_errors() {
        assert!(parse_multipart(b"no boundary here", "b").is_err());
        assert!(parse_multipart(
            b"--b\r\nContent-Disposition: form-data; name=\"x\"\r\n\r\nunterminated",
            "b"
        )
        .is_err());
        assert!(parse_multipart(b"--b\r\nContent-Type: text/plain\r\n\r\nx\r\n--b--", "b").is_err());
    }

    #[test]
    fn test_response_bytes() {
        let resp = http_response(404, "Not Found").with_header("X-Test", "1");
        let text = String::from_utf8(resp.into_bytes()).unwrap();
        assert!(text.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(text.contains("Content-Length: 9\r\n"));
        assert!(text.contains("X-Test: 1\r\n"));
        assert!(text.ends_with("\r\n\r\nNot Found"));
    }

    #[test]
    fn test_error_body_is_json() {
        let resp = http_error(401, "Unauthorized");
        assert_eq!(resp.content_type, "application/json");
        assert_eq!(resp.body_text(), r#"{"error":"Unauthorized"}"#);
    }
}
