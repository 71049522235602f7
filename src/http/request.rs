use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::WebError;
use crate::http::form::{FormMap, FormValue};

/// HTTP request methods.
///
/// The closed set of methods a [`Request`] can carry. Tokens are matched
/// case-insensitively by [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// POST - Create or submit data
    POST,
    /// PUT - Replace a resource
    PUT,
    /// DELETE - Delete a resource
    DELETE,
    /// CONNECT - Open a tunnel to the target
    CONNECT,
    /// OPTIONS - Describe communication options
    OPTIONS,
    /// TRACE - Loop-back test along the request path
    TRACE,
    /// PATCH - Partial modification of a resource
    PATCH,
}

impl Method {
    pub const ALL: [Method; 9] = [
        Method::GET,
        Method::HEAD,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::CONNECT,
        Method::OPTIONS,
        Method::TRACE,
        Method::PATCH,
    ];

    /// Looks up an exact (already uppercased) token.
    ///
    /// # Example
    ///
    /// ```
    /// # use portico::http::request::Method;
    /// assert_eq!(Method::from_token("GET"), Some(Method::GET));
    /// assert_eq!(Method::from_token("get"), None);
    /// ```
    pub fn from_token(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::GET),
            "HEAD" => Some(Method::HEAD),
            "POST" => Some(Method::POST),
            "PUT" => Some(Method::PUT),
            "DELETE" => Some(Method::DELETE),
            "CONNECT" => Some(Method::CONNECT),
            "OPTIONS" => Some(Method::OPTIONS),
            "TRACE" => Some(Method::TRACE),
            "PATCH" => Some(Method::PATCH),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::CONNECT => "CONNECT",
            Method::OPTIONS => "OPTIONS",
            Method::TRACE => "TRACE",
            Method::PATCH => "PATCH",
        }
    }
}

impl FromStr for Method {
    type Err = WebError;

    /// Uppercases `s` and matches it; the error carries `s` untouched.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::from_token(&s.to_ascii_uppercase())
            .ok_or_else(|| WebError::UndefinedRequestMethod(s.to_string()))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport scheme: plain or secure HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Scheme {
    HTTP,
    HTTPS,
}

impl Scheme {
    pub fn from_token(s: &str) -> Option<Self> {
        match s {
            "HTTP" => Some(Scheme::HTTP),
            "HTTPS" => Some(Scheme::HTTPS),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::HTTP => "HTTP",
            Scheme::HTTPS => "HTTPS",
        }
    }

    pub fn is_secure(&self) -> bool {
        *self == Scheme::HTTPS
    }
}

impl FromStr for Scheme {
    type Err = WebError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scheme::from_token(&s.to_ascii_uppercase())
            .ok_or_else(|| WebError::UndefinedRequestScheme(s.to_string()))
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized, immutable view of an incoming HTTP request.
///
/// Built once by [`parse`](crate::http::parser::parse) and read through
/// accessors afterwards; nothing can change it after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Request {
    method: Method,
    scheme: Scheme,
    host: String,
    port: u16,
    path: String,
    uri: String,
    flags: Vec<String>,
    parameters: FormMap,
    values: FormMap,
    cookies: IndexMap<String, String>,
    headers: IndexMap<String, String>,
}

impl Request {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        method: Method,
        scheme: Scheme,
        host: impl Into<String>,
        port: u16,
        path: impl Into<String>,
        uri: impl Into<String>,
        flags: Vec<String>,
        parameters: FormMap,
        values: FormMap,
        cookies: IndexMap<String, String>,
        headers: IndexMap<String, String>,
    ) -> Self {
        Self {
            method,
            scheme,
            host: host.into(),
            port,
            path: path.into(),
            uri: uri.into(),
            flags,
            parameters,
            values,
            cookies,
            headers,
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Directory of the entry point, without leading/trailing `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Request target below [`path`](Self::path), without the query string
    /// and without leading/trailing `/`.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Query tokens that appeared without `=`, in order.
    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    pub fn parameters(&self) -> &FormMap {
        &self.parameters
    }

    /// Decoded form fields from the request body.
    pub fn values(&self) -> &FormMap {
        &self.values
    }

    pub fn cookies(&self) -> &IndexMap<String, String> {
        &self.cookies
    }

    pub fn headers(&self) -> &IndexMap<String, String> {
        &self.headers
    }

    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.iter().any(|f| f == name)
    }

    pub fn parameter(&self, name: &str) -> Option<&FormValue> {
        self.parameters.get(name)
    }

    pub fn value(&self, name: &str) -> Option<&FormValue> {
        self.values.get(name)
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(|v| v.as_str())
    }

    /// Retrieves a header value by name, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Determines whether the connection should remain open after the response.
    ///
    /// Defaults to `true` unless a `Connection: close` header is present.
    pub fn keep_alive(&self) -> bool {
        self.header("Connection")
            .map(|v| !v.eq_ignore_ascii_case("close"))
            .unwrap_or(true)
    }
}
