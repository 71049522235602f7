//! Web input validation errors.
//!
//! Every variant is fatal to the request that produced it. All of them share
//! the `23xx` code range so a caller can either match a single kind or treat
//! "some web validation failed" as one case through [`WebError::code`].

use thiserror::Error;

/// Errors raised while building a [`Request`](crate::http::request::Request)
/// or a [`Response`](crate::http::response::Response).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebError {
    /// The status handed to a response is not in the status table.
    #[error("The status {0} is not a known HTTP status: https://developer.mozilla.org/en-US/docs/Web/HTTP/Status")]
    UndefinedStatusCode(i64),

    /// The transport reported a scheme other than http/https.
    #[error("The request scheme {0} is not a known HTTP request scheme: http,https")]
    UndefinedRequestScheme(String),

    /// The transport reported a method outside the known set.
    #[error("The request method {0} is not a known HTTP request method: https://developer.mozilla.org/en-US/docs/Web/HTTP/Methods")]
    UndefinedRequestMethod(String),
}

impl WebError {
    /// Code shared by the whole web error family.
    pub const BASE_CODE: u32 = 2300;

    /// Numeric code of this error, always within `BASE_CODE..BASE_CODE + 100`.
    pub fn code(&self) -> u32 {
        match self {
            WebError::UndefinedStatusCode(_) => Self::BASE_CODE + 1,
            WebError::UndefinedRequestScheme(_) => Self::BASE_CODE + 2,
            WebError::UndefinedRequestMethod(_) => Self::BASE_CODE + 3,
        }
    }

    /// Returns `true` if `code` belongs to the web error range.
    pub fn is_web_code(code: u32) -> bool {
        (Self::BASE_CODE..Self::BASE_CODE + 100).contains(&code)
    }
}

/// Result type for request/response construction.
pub type WebResult<T> = Result<T, WebError>;
