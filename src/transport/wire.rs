//! Raw HTTP/1.1 request bytes to [`TransportState`].
//!
//! Only framing is checked here. Method and scheme tokens are passed through
//! untouched so the request parser can reject them.

use indexmap::IndexMap;

use crate::http::form::parse_query;
use crate::http::headers::parse_cookie_header;
use crate::http::status::Status;
use crate::transport::TransportState;

/// Largest request line plus headers accepted, terminator included.
pub const MAX_HEADER_BYTES: usize = 64 * 1024;

/// Largest `Content-Length` accepted.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    InvalidRequest,
    InvalidHeader,
    InvalidContentLength,
    HeadersTooLarge,
    PayloadTooLarge,
    UnsupportedTransferEncoding,
    Incomplete,
}

impl ParseError {
    /// Status to answer with before closing the connection.
    pub fn status(&self) -> Status {
        match self {
            ParseError::HeadersTooLarge => Status::RequestHeaderFieldsTooLarge,
            ParseError::PayloadTooLarge => Status::PayloadTooLarge,
            ParseError::UnsupportedTransferEncoding => Status::NotImplemented,
            _ => Status::BadRequest,
        }
    }
}

/// Server-side facts that are not part of the request bytes.
#[derive(Debug, Clone)]
pub struct ServerContext {
    pub server_name: String,
    pub server_port: u16,
    pub script_base: String,
}

/// Parses one request from the front of `buf`.
///
/// Returns the transport state and the number of bytes consumed, or
/// [`ParseError::Incomplete`] when more bytes are needed. Chunked bodies
/// are not decoded and fail with [`ParseError::UnsupportedTransferEncoding`].
pub fn parse_http_request(
    buf: &[u8],
    ctx: &ServerContext,
) -> Result<(TransportState, usize), ParseError> {
    // Look for header/body separator
    let Some(headers_end) = find_headers_end(buf) else {
        if buf.len() > MAX_HEADER_BYTES {
            return Err(ParseError::HeadersTooLarge);
        }
        return Err(ParseError::Incomplete);
    };
    if headers_end + 4 > MAX_HEADER_BYTES {
        return Err(ParseError::HeadersTooLarge);
    }
    let header_bytes = &buf[..headers_end];
    let body_bytes = &buf[headers_end + 4..];

    let headers_str = std::str::from_utf8(header_bytes)
        .map_err(|_| ParseError::InvalidRequest)?;

    let mut lines = headers_str.split("\r\n");

    // Request line
    let request_line = lines.next().ok_or(ParseError::InvalidRequest)?;
    let mut parts = request_line.split_whitespace();

    let method = parts.next().ok_or(ParseError::InvalidRequest)?;
    let target = parts.next().ok_or(ParseError::InvalidRequest)?;
    let _version = parts.next().ok_or(ParseError::InvalidRequest)?;

    let mut headers = IndexMap::new();
    for line in lines {
        if line.is_empty() {
            continue;
        }

        let (key, value) = line
            .split_once(':')
            .ok_or(ParseError::InvalidHeader)?;

        headers.insert(key.trim().to_string(), value.trim().to_string());
    }

    if header_value(&headers, "Transfer-Encoding")
        .is_some_and(|te| !te.eq_ignore_ascii_case("identity"))
    {
        return Err(ParseError::UnsupportedTransferEncoding);
    }

    let content_length = header_value(&headers, "Content-Length")
        .map(|v| v.parse::<u64>().map_err(|_| ParseError::InvalidContentLength))
        .transpose()?
        .unwrap_or(0);
    if content_length > MAX_BODY_BYTES as u64 {
        return Err(ParseError::PayloadTooLarge);
    }
    let content_length = content_length as usize;

    if body_bytes.len() < content_length {
        return Err(ParseError::Incomplete);
    }
    let body = &body_bytes[..content_length];

    let form = match header_value(&headers, "Content-Type") {
        Some(ct) if ct.starts_with("application/x-www-form-urlencoded") => {
            parse_query(&String::from_utf8_lossy(body))
        }
        _ => Default::default(),
    };
    let cookies = header_value(&headers, "Cookie")
        .map(parse_cookie_header)
        .unwrap_or_default();

    let state = TransportState {
        method: Some(method.to_string()),
        scheme: Some("HTTP".to_string()),
        server_name: Some(ctx.server_name.clone()),
        server_port: Some(ctx.server_port.to_string()),
        request_uri: Some(target.to_string()),
        script_base: Some(ctx.script_base.clone()),
        form,
        cookies,
        headers,
    };

    let total_consumed = headers_end + 4 + content_length;
    Ok((state, total_consumed))
}

fn header_value<'a>(headers: &'a IndexMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4)
        .position(|w| w == b"\r\n\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ServerContext {
        ServerContext {
            server_name: "localhost".into(),
            server_port: 8080,
            script_base: "/".into(),
        }
    }

    #[test]
    fn parse_simple_get() {
        let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";

        let (state, consumed) = parse_http_request(req, &ctx()).unwrap();

        assert_eq!(state.request_uri.as_deref(), Some("/"));
        assert_eq!(state.headers.get("Host").unwrap(), "example.com");
        assert_eq!(consumed, req.len());
    }

    #[test]
    fn unterminated_headers_past_limit() {
        let mut req = b"GET / HTTP/1.1\r\nX-Big: ".to_vec();
        req.resize(MAX_HEADER_BYTES, b'a');
        assert_eq!(parse_http_request(&req, &ctx()).unwrap_err(), ParseError::Incomplete);

        req.push(b'a');
        assert_eq!(parse_http_request(&req, &ctx()).unwrap_err(), ParseError::HeadersTooLarge);
    }

    #[test]
    fn oversized_declared_body() {
        let req = b"POST / HTTP/1.1\r\nContent-Length: 99999999999\r\n\r\n";
        let err = parse_http_request(req, &ctx()).unwrap_err();
        assert_eq!(err, ParseError::PayloadTooLarge);
        assert_eq!(err.status(), Status::PayloadTooLarge);
    }

    #[test]
    fn chunked_body_is_refused() {
        let req = b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n0\r\n\r\n";
        let err = parse_http_request(req, &ctx()).unwrap_err();
        assert_eq!(err, ParseError::UnsupportedTransferEncoding);
        assert_eq!(err.status(), Status::NotImplemented);
    }

    #[test]
    fn unknown_method_is_left_for_the_parser() {
        let req = b"BREW /pot HTTP/1.1\r\n\r\n";
        let (state, _) = parse_http_request(req, &ctx()).unwrap();
        assert_eq!(state.method.as_deref(), Some("BREW"));
    }
}
