//! HTTP API server for the clipboard service
//!
//! One request per connection: read the head, enforce limits, read the body
//! by Content-Length, dispatch, write the response and close.

mod handlers;
mod parse;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::{debug, info, trace, warn};

use cloudclip_core::ClipService;
use handlers::handle_request;
use parse::{
    find_header_end, http_error, parse_content_length, HttpResponse, Request, MAX_HEADER_BYTES,
};

/// Run the HTTP API server until the listener fails to bind
pub async fn run_api_server(service: ClipService, bind: String, port: u16) {
    let listener = match TcpListener::bind(format!("{}:{}", bind, port)).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind {}:{}: {}", bind, port, e);
            return;
        }
    };

    info!(bind = %bind, port = port, "API server started");

    loop {
        let (mut socket, peer) = match listener.accept().await {
            Ok(s) => s,
            Err(e) => {
                debug!(error = %e, "API: accept failed");
                continue;
            }
        };

        let service = service.clone();

        tokio::spawn(async move {
            let max_body = service.config().max_body_bytes;

            let response = match read_request(&mut socket, max_body).await {
                Ok(Some(request)) => handle_request(&service, &request).await,
                Ok(None) => return, // closed before sending anything
                Err(response) => response,
            };

            trace!(peer = %peer, status = response.status, "API response");
            if let Err(e) = socket.write_all(&response.into_bytes()).await {
                warn!("API: failed to send response: {}", e);
                return;
            }

            // Explicitly shutdown the socket to signal EOF to curl
            if let Err(e) = socket.shutdown().await {
                trace!("API: socket shutdown error (expected): {}", e);
            }
        });
    }
}

/// Read one request from the stream
///
/// `Ok(None)` means the peer closed without sending a request. `Err` carries
/// the response to send back when the request is rejected before dispatch.
pub async fn read_request<S>(stream: &mut S, max_body: u64) -> Result<Option<Request>, HttpResponse>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf: Vec<u8> = Vec::with_capacity(8 * 1024);
    let mut chunk = [0u8; 8 * 1024];

    // Read until we have complete headers (look for \r\n\r\n or \n\n)
    let header_end = loop {
        if let Some(pos) = find_header_end(&buf) {
            break pos;
        }
        if buf.len() > MAX_HEADER_BYTES {
            warn!(bytes = buf.len(), "API: request head too large");
            return Err(http_error(431, "Request Header Fields Too Large"));
        }

        let n = match stream.read(&mut chunk).await {
            Ok(n) => n,
            Err(e) => {
                debug!(error = %e, "API: read failed");
                return Ok(None);
            }
        };
        if n == 0 {
            if buf.is_empty() {
                return Ok(None);
            }
            return Err(http_error(400, "Bad Request"));
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    if header_end > MAX_HEADER_BYTES {
        return Err(http_error(431, "Request Header Fields Too Large"));
    }

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut request = match Request::parse_head(&head) {
        Some(r) => r,
        None => return Err(http_error(400, "Bad Request")),
    };

    if request.header("transfer-encoding").is_some() {
        return Err(http_error(411, "Content-Length required"));
    }

    let content_length = parse_content_length(&head);
    if content_length as u64 > max_body {
        warn!(
            content_length = content_length,
            max_body = max_body,
            "API: request body too large"
        );
        return Err(http_error(413, "Request body too large"));
    }

    let expects_continue = request
        .header("expect")
        .is_some_and(|v| v.eq_ignore_ascii_case("100-continue"));
    let already_read = buf.len() - header_end;
    if expects_continue && already_read < content_length {
        if let Err(e) = stream.write_all(b"HTTP/1.1 100 Continue\r\n\r\n").await {
            debug!(error = %e, "API: failed to send 100 Continue");
            return Ok(None);
        }
    }

    let mut body = buf.split_off(header_end);
    body.truncate(content_length);
    if body.len() < content_length {
        let start = body.len();
        body.resize(content_length, 0);
        if let Err(e) = stream.read_exact(&mut body[start..]).await {
            debug!(error = %e, expected = content_length, "API: body ended early");
            return Err(http_error(400, "Incomplete request body"));
        }
    }

    request.body = body;
    Ok(Some(request))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    async fn read_from(raw: &[u8], max_body: u64) -> Result<Option<Request>, HttpResponse> {
        let (mut client, mut server) = duplex(64 * 1024);
        client.write_all(raw).await.unwrap();
        client.shutdown().await.unwrap();
        read_request(&mut server, max_body).await
    }

    #[tokio::test]
    async fn test_reads_head_and_body() {
        let raw = b"POST /api/auth HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
        let request = read_from(raw, 1024).await.unwrap().unwrap();
        assert_eq!(request.method, "POST");
        assert_eq!(request.path, "/api/auth");
        assert_eq!(request.body, b"hello");
    }

    #[tokio::test]
    async fn test_extra_bytes_are_ignored() {
        let raw = b"POST / HTTP/1.1\r\nContent-Length: 2\r\n\r\nabcdef";
        let request = read_from(raw, 1024).await.unwrap().unwrap();
        assert_eq!(request.body, b"ab");
    }

    #[tokio::test]
    async fn test_empty_connection() {
        assert!(read_from(b"", 1024).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_body_over_limit() {
        let raw = b"POST /api/items HTTP/1.1\r\nContent-Length: 2048\r\n\r\n";
        let err = read_from(raw, 1024).await.unwrap_err();
        assert_eq!(err.status, 413);
    }

    #[tokio::test]
    async fn test_chunked_rejected() {
        let raw = b"POST /api/items HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n0\r\n\r\n";
        let err = read_from(raw, 1024).await.unwrap_err();
        assert_eq!(err.status, 411);
    }

    #[tokio::test]
    async fn test_head_too_large() {
        let mut raw = b"GET / HTTP/1.1\r\nX-Pad: ".to_vec();
        raw.extend(std::iter::repeat(b'a').take(MAX_HEADER_BYTES + 10));
        raw.extend_from_slice(b"\r\n\r\n");
        let err = read_from(&raw, 1024).await.unwrap_err();
        assert_eq!(err.status, 431);
    }

    #[tokio::test]
    async fn test_truncated_body() {
        let raw = b"POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc";
        let err = read_from(raw, 1024).await.unwrap_err();
        assert_eq!(err.status, 400);
    }

    #[tokio::test]
    async fn test_expect_continue() {
        let (mut client, mut server) = duplex(64 * 1024);
        client
            .write_all(b"POST / HTTP/1.1\r\nExpect: 100-continue\r\nContent-Length: 3\r\n\r\n")
            .await
            .unwrap();

        let reader = tokio::spawn(async move { read_request(&mut server, 1024).await });

        let mut interim = [0u8; 25];
        client.read_exact(&mut interim).await.unwrap();
        assert_eq!(&interim, b"HTTP/1.1 100 Continue\r\n\r\n");

        client.write_all(b"abc").await.unwrap();
        let request = reader.await.unwrap().unwrap().unwrap();
        assert_eq!(request.body, b"abc");
    }
}
