//! Transport collaborator seam.
//!
//! A transport supplies the raw per-request state ([`TransportState`]) and
//! accepts the status, headers and body of the reply ([`Transport`]).
//!
//! - **`cgi`**: CGI environment variables in, stdout out
//! - **`wire`**: raw HTTP/1.1 request bytes in (dev server)
//! - **`writer`**: HTTP/1.1 response serializer (dev server)
//! - **`connection`**: keep-alive connection state machine (dev server)

use indexmap::IndexMap;

use crate::http::form::FormMap;
use crate::http::status::Status;

pub mod cgi;
pub mod connection;
pub mod wire;
pub mod writer;

/// Raw per-request input, exactly as a transport reports it.
///
/// Unset fields fall back to the parser defaults (`GET`, `HTTP`,
/// `127.0.0.1`, port `0`, target `/`, script base `/`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportState {
    pub method: Option<String>,
    pub scheme: Option<String>,
    pub server_name: Option<String>,
    pub server_port: Option<String>,
    /// Raw request target, query string included.
    pub request_uri: Option<String>,
    /// Directory containing the entry point.
    pub script_base: Option<String>,
    /// Decoded body form fields.
    pub form: FormMap,
    pub cookies: IndexMap<String, String>,
    /// Header names as the transport names them (`HTTP_USER_AGENT`, ...).
    pub headers: IndexMap<String, String>,
}

impl TransportState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    pub fn server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = Some(name.into());
        self
    }

    pub fn server_port(mut self, port: impl Into<String>) -> Self {
        self.server_port = Some(port.into());
        self
    }

    pub fn request_uri(mut self, uri: impl Into<String>) -> Self {
        self.request_uri = Some(uri.into());
        self
    }

    pub fn script_base(mut self, base: impl Into<String>) -> Self {
        self.script_base = Some(base.into());
        self
    }

    pub fn form(mut self, form: FormMap) -> Self {
        self.form = form;
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Output side of a transport.
///
/// [`Response::emit`](crate::http::response::Response::emit) drives the calls
/// in a fixed order: `set_status`, `write_header` once per header,
/// `flush`, then `finish`. After `finish` the reply is complete and further
/// writes are an error.
pub trait Transport {
    fn set_status(&mut self, status: Status) -> anyhow::Result<()>;

    fn write_header(&mut self, name: &str, value: &str) -> anyhow::Result<()>;

    fn flush(&mut self) -> anyhow::Result<()>;

    fn finish(&mut self, body: &[u8]) -> anyhow::Result<()>;
}

/// Rejects header lines that would break the framing of the reply.
pub(crate) fn check_header(name: &str, value: &str) -> anyhow::Result<()> {
    if name.is_empty() || name.contains([':', '\r', '\n']) {
        anyhow::bail!("invalid header name {:?}", name);
    }
    if value.contains(['\r', '\n']) {
        anyhow::bail!("invalid value for header {}", name);
    }
    Ok(())
}

/// In-memory transport that keeps everything it is handed.
#[derive(Debug, Default)]
pub struct Recorder {
    pub status: Option<Status>,
    pub headers: Vec<(String, String)>,
    pub flushes: usize,
    pub body: Option<Vec<u8>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_finished(&self) -> bool {
        self.body.is_some()
    }

    pub fn body_str(&self) -> Option<&str> {
        self.body.as_deref().and_then(|b| std::str::from_utf8(b).ok())
    }
}

impl Transport for Recorder {
    fn set_status(&mut self, status: Status) -> anyhow::Result<()> {
        if self.is_finished() {
            anyhow::bail!("reply already finished");
        }
        self.status = Some(status);
        Ok(())
    }

    fn write_header(&mut self, name: &str, value: &str) -> anyhow::Result<()> {
        if self.is_finished() {
            anyhow::bail!("reply already finished");
        }
        check_header(name, value)?;
        self.headers.push((name.to_string(), value.to_string()));
        Ok(())
    }

    fn flush(&mut self) -> anyhow::Result<()> {
        self.flushes += 1;
        Ok(())
    }

    fn finish(&mut self, body: &[u8]) -> anyhow::Result<()> {
        if self.is_finished() {
            anyhow::bail!("reply already finished");
        }
        self.body = Some(body.to_vec());
        Ok(())
    }
}
