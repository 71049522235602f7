//! Request and response models.
//!
//! # Architecture
//!
//! - **`status`**: the closed status-code table with reason phrases
//! - **`request`**: `Method`, `Scheme` and the immutable `Request`
//! - **`parser`**: builds a `Request` from raw transport state
//! - **`form`**: urlencoded form decoding (query strings and bodies)
//! - **`headers`**: header-name normalization and cookie parsing
//! - **`response`**: the immutable `Response` and its terminal `emit`
//!
//! # Request cycle
//!
//! ```text
//!   TransportState ──parse──► Request ──handler──► Response ──emit──► Transport
//!        │                       │                                      │
//!        └── fails with UndefinedRequestMethod / UndefinedRequestScheme └── nothing after finish
//! ```

pub mod form;
pub mod headers;
pub mod parser;
pub mod request;
pub mod response;
pub mod status;
