//! Request parsing.
//!
//! Turns the raw per-request state handed over by a transport into a
//! validated [`Request`]. Parsing is all-or-nothing: an unknown method or
//! scheme fails the whole request.
//!
//! # Query strings
//!
//! Keys that appear without `=` are collected as flags, everything else
//! lands in the parameters:
//!
//! ```text
//! /app/path?foo&bar=baz   (script base /app)
//!
//! path       = "app"
//! uri        = "path"
//! flags      = ["foo"]
//! parameters = { bar => "baz" }
//! ```
//!
//! The flag test is textual: a key whose decoded value is empty counts as a
//! flag unless the raw query contains `key=` anywhere. `?b&ab=1` therefore
//! reports `b` as an empty parameter, because `b=` occurs inside `ab=1`.

use tracing::{debug, warn};

use crate::error::WebResult;
use crate::http::form::{parse_query, FormMap};
use crate::http::headers::normalize_headers;
use crate::http::request::{Method, Request, Scheme};
use crate::transport::TransportState;

pub const DEFAULT_METHOD: &str = "GET";
pub const DEFAULT_SCHEME: &str = "HTTP";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_TARGET: &str = "/";
pub const DEFAULT_SCRIPT_BASE: &str = "/";

/// Parses raw transport state into a [`Request`].
///
/// # Errors
///
/// [`WebError::UndefinedRequestMethod`](crate::error::WebError::UndefinedRequestMethod)
/// or [`WebError::UndefinedRequestScheme`](crate::error::WebError::UndefinedRequestScheme)
/// carrying the offending token as the transport reported it.
pub fn parse(state: &TransportState) -> WebResult<Request> {
    let method_token = state.method.as_deref().unwrap_or(DEFAULT_METHOD);
    let method = method_token.parse::<Method>().inspect_err(|_| {
        warn!(method = method_token, "Rejected request method");
    })?;

    let scheme_token = state.scheme.as_deref().unwrap_or(DEFAULT_SCHEME);
    let scheme = scheme_token.parse::<Scheme>().inspect_err(|_| {
        warn!(scheme = scheme_token, "Rejected request scheme");
    })?;

    let host = state.server_name.as_deref().unwrap_or(DEFAULT_HOST);
    let port = coerce_port(state.server_port.as_deref().unwrap_or("0"));

    let target = state
        .request_uri
        .as_deref()
        .unwrap_or(DEFAULT_TARGET)
        .trim_start_matches('/');
    let path = state
        .script_base
        .as_deref()
        .unwrap_or(DEFAULT_SCRIPT_BASE)
        .trim_matches('/');

    let (working, query) = match target.split_once('?') {
        Some((before, after)) => (before, after),
        None => (target, ""),
    };
    let (flags, parameters) = split_flags(query);
    let uri = strip_base(working, path);

    let request = Request::new(
        method,
        scheme,
        host,
        port,
        path,
        uri,
        flags,
        parameters,
        state.form.clone(),
        state.cookies.clone(),
        normalize_headers(&state.headers),
    );

    debug!(
        method = %request.method(),
        scheme = %request.scheme(),
        host = request.host(),
        port = request.port(),
        path = request.path(),
        uri = request.uri(),
        "Parsed request"
    );

    Ok(request)
}

/// Separates bare query tokens from `key=value` parameters.
pub fn split_flags(query: &str) -> (Vec<String>, FormMap) {
    let mut flags = Vec::new();
    let mut parameters = FormMap::new();

    for (key, value) in parse_query(query) {
        if value.is_empty_text() && !query.contains(&format!("{key}=")) {
            flags.push(key);
        } else {
            parameters.insert(key, value);
        }
    }

    (flags, parameters)
}

/// Drops `base.len()` bytes from the front of `working`, then trims `/`.
///
/// The cut is by length only; the prefix itself is not compared.
fn strip_base(working: &str, base: &str) -> String {
    let rest = working.as_bytes().get(base.len()..).unwrap_or_default();
    String::from_utf8_lossy(rest).trim_matches('/').to_string()
}

/// Reads the leading decimal digits of a raw port value.
///
/// Anything without leading digits, or above 65535, becomes 0.
fn coerce_port(raw: &str) -> u16 {
    let trimmed = raw.trim_start();
    let digits = trimmed
        .strip_prefix('+')
        .unwrap_or(trimmed)
        .split(|c: char| !c.is_ascii_digit())
        .next()
        .unwrap_or_default();

    match digits.parse::<u16>() {
        Ok(port) => port,
        Err(_) => {
            warn!(port = raw, "Unusable server port, falling back to 0");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_coercion() {
        assert_eq!(coerce_port("80"), 80);
        assert_eq!(coerce_port(" 8080"), 8080);
        assert_eq!(coerce_port("443abc"), 443);
        assert_eq!(coerce_port("+22"), 22);
        assert_eq!(coerce_port("abc"), 0);
        assert_eq!(coerce_port(""), 0);
        assert_eq!(coerce_port("-1"), 0);
        assert_eq!(coerce_port("70000"), 0);
        assert_eq!(coerce_port("65535"), 65535);
    }

    #[test]
    fn strip_base_is_length_based() {
        assert_eq!(strip_base("app/path/", "app"), "path");
        assert_eq!(strip_base("xyz/path", "app"), "path");
        assert_eq!(strip_base("ap", "app"), "");
        assert_eq!(strip_base("index", ""), "index");
    }
}
