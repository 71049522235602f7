//! Development server: serves parsed requests over plain TCP.

use std::sync::Arc;

use crate::http::request::Request;
use crate::http::response::{Headers, Response};
use crate::http::status::Status;
use crate::transport::connection::Handler;

pub mod listener;

/// Handler that answers every request with a YAML dump of the parsed request.
pub fn echo_handler() -> Handler {
    Arc::new(|request: &Request| match serde_yaml::to_string(request) {
        Ok(dump) => {
            let mut headers = Headers::new();
            headers.insert("Content-Type".to_string(), "application/yaml".to_string());
            Response::with_status(dump, Status::Ok, headers)
        }
        Err(e) => Response::with_status(e.to_string(), Status::InternalServerError, Headers::new()),
    })
}
