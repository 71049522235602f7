//! Portico - HTTP request and response value objects
//!
//! Parses raw transport state into an immutable [`Request`], builds
//! immutable [`Response`] values validated against a closed status table, and
//! emits them through a [`Transport`].

pub mod config;
pub mod error;
pub mod http;
pub mod server;
pub mod transport;

pub use error::{WebError, WebResult};
pub use http::parser::parse;
pub use http::request::{Method, Request, Scheme};
pub use http::response::{Response, ResponseBuilder};
pub use http::status::Status;
pub use transport::{Transport, TransportState};
