use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::error::{WebError, WebResult};
use crate::http::status::Status;
use crate::transport::Transport;

/// Status used when none is given.
pub const DEFAULT_STATUS: Status = Status::Accepted;

/// Ordered response headers; emission follows insertion order.
pub type Headers = IndexMap<String, String>;

/// Anything that can name a response status.
///
/// [`Status`] values are always valid; raw integers are looked up in the
/// status table and fail with [`WebError::UndefinedStatusCode`].
pub trait IntoStatus {
    fn into_status(self) -> WebResult<Status>;
}

impl IntoStatus for Status {
    fn into_status(self) -> WebResult<Status> {
        Ok(self)
    }
}

impl IntoStatus for u16 {
    fn into_status(self) -> WebResult<Status> {
        Status::try_from(self)
    }
}

impl IntoStatus for i32 {
    fn into_status(self) -> WebResult<Status> {
        Status::try_from(i64::from(self))
    }
}

impl IntoStatus for i64 {
    fn into_status(self) -> WebResult<Status> {
        Status::try_from(self)
    }
}

/// An immutable HTTP response ready to be emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    body: String,
    status: Status,
    headers: Headers,
}

impl Response {
    /// Creates a response, validating `status` against the status table.
    ///
    /// # Example
    ///
    /// ```
    /// # use portico::http::response::{Headers, Response};
    /// let resp = Response::new("", 200, Headers::new()).unwrap();
    /// assert_eq!(resp.status_message(), "OK");
    /// assert!(Response::new("", 999, Headers::new()).is_err());
    /// ```
    pub fn new(body: impl Into<String>, status: impl IntoStatus, headers: Headers) -> WebResult<Self> {
        Ok(Self::with_status(body, status.into_status()?, headers))
    }

    /// Creates a response from a known [`Status`]; cannot fail.
    pub fn with_status(body: impl Into<String>, status: Status, headers: Headers) -> Self {
        Self {
            body: body.into(),
            status,
            headers,
        }
    }

    pub fn builder() -> ResponseBuilder {
        ResponseBuilder::new()
    }

    /// Creates a simple 200 OK response with the given body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::with_status(body, Status::Ok, Headers::new())
    }

    /// Creates a 404 Not Found response.
    pub fn not_found() -> Self {
        Self::with_status("404 Not Found", Status::NotFound, plain_text())
    }

    /// Maps a web validation error to the reply a caller would usually send.
    ///
    /// Unknown methods answer 501, unknown schemes 400, and an invalid status
    /// from application code 500.
    pub fn from_error(err: &WebError) -> Self {
        let status = match err {
            WebError::UndefinedRequestMethod(_) => Status::NotImplemented,
            WebError::UndefinedRequestScheme(_) => Status::BadRequest,
            WebError::UndefinedStatusCode(_) => Status::InternalServerError,
        };
        Self::with_status(err.to_string(), status, plain_text())
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn status_message(&self) -> &'static str {
        self.status.reason_phrase()
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|v| v.as_str())
    }

    /// Hands the response to `transport` and completes the reply.
    ///
    /// Sets the status, writes each header in insertion order, flushes, and
    /// writes the body last. The response is consumed: nothing about this
    /// request can be sent after it.
    pub fn emit<T: Transport + ?Sized>(self, transport: &mut T) -> anyhow::Result<()> {
        debug!(
            status = self.status.as_u16(),
            headers = self.headers.len(),
            body_len = self.body.len(),
            "Emitting response"
        );

        transport.set_status(self.status)?;
        for (name, value) in &self.headers {
            transport.write_header(name, value)?;
        }
        transport.flush()?;
        transport.finish(self.body.as_bytes())
    }
}

impl Default for Response {
    /// Empty body, `202 Accepted`, no headers.
    fn default() -> Self {
        Self::with_status(String::new(), DEFAULT_STATUS, Headers::new())
    }
}

fn plain_text() -> Headers {
    let mut headers = Headers::new();
    headers.insert("Content-Type".to_string(), "text/plain; charset=utf-8".to_string());
    headers
}

/// Builder for constructing responses in a fluent style.
///
/// An invalid status is remembered and reported by [`build`](Self::build).
///
/// ```
/// # use portico::http::response::ResponseBuilder;
/// let response = ResponseBuilder::new()
///     .status(404)
///     .header("Content-Type", "application/json")
///     .body("{}")
///     .build()
///     .unwrap();
/// assert_eq!(response.status_message(), "Not Found");
/// ```
#[derive(Debug)]
pub struct ResponseBuilder {
    body: String,
    status: WebResult<Status>,
    headers: Headers,
}

impl ResponseBuilder {
    pub fn new() -> Self {
        Self {
            body: String::new(),
            status: Ok(DEFAULT_STATUS),
            headers: Headers::new(),
        }
    }

    pub fn status(mut self, status: impl IntoStatus) -> Self {
        self.status = status.into_status();
        self
    }

    /// Adds or replaces a header. A replaced header keeps its position.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> WebResult<Response> {
        Ok(Response::with_status(self.body, self.status?, self.headers))
    }
}

impl Default for ResponseBuilder {
    fn default() -> Self {
        Self::new()
    }
}
