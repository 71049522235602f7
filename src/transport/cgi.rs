//! CGI transport.
//!
//! Reads the request from CGI meta-variables and writes the reply to stdout
//! using the CGI `Status:` header convention.

use std::io::{Read, Write};

use tracing::error;

use crate::http::form::parse_query;
use crate::http::headers::{parse_cookie_header, HEADER_PREFIX};
use crate::http::response::Response;
use crate::http::status::Status;
use crate::transport::{check_header, Transport, TransportState};

impl TransportState {
    /// Builds transport state from CGI meta-variables and the request body.
    ///
    /// `SCRIPT_NAME` is reduced to its directory. When `REQUEST_SCHEME` is
    /// missing, `HTTPS=on` selects the secure scheme. `HTTP_*` variables and
    /// `CONTENT_TYPE`/`CONTENT_LENGTH` become headers, `HTTP_COOKIE` also
    /// fills the cookie map, and urlencoded bodies fill the form fields.
    pub fn from_cgi_vars<I, K, V>(vars: I, body: &[u8]) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut state = TransportState::new();
        let mut https = false;

        for (key, value) in vars {
            let key = key.into();
            let value = value.into();
            match key.as_str() {
                "REQUEST_METHOD" => state.method = Some(value),
                "REQUEST_SCHEME" => state.scheme = Some(value),
                "HTTPS" => https = !value.is_empty() && !value.eq_ignore_ascii_case("off"),
                "SERVER_NAME" => state.server_name = Some(value),
                "SERVER_PORT" => state.server_port = Some(value),
                "REQUEST_URI" => state.request_uri = Some(value),
                "SCRIPT_NAME" => state.script_base = Some(dirname(&value).to_string()),
                "CONTENT_TYPE" | "CONTENT_LENGTH" => {
                    state.headers.insert(key, value);
                }
                _ if key.starts_with(HEADER_PREFIX) => {
                    if key == "HTTP_COOKIE" {
                        state.cookies = parse_cookie_header(&value);
                    }
                    state.headers.insert(key, value);
                }
                _ => {}
            }
        }

        if state.scheme.is_none() && https {
            state.scheme = Some("HTTPS".to_string());
        }

        let urlencoded = state
            .headers
            .get("CONTENT_TYPE")
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));
        if urlencoded {
            state.form = parse_query(&String::from_utf8_lossy(body));
        }

        state
    }

    /// Reads the current process environment and up to `CONTENT_LENGTH`
    /// bytes of stdin.
    pub fn from_cgi_env() -> anyhow::Result<Self> {
        let length = std::env::var("CONTENT_LENGTH")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(0);

        let mut body = Vec::new();
        std::io::stdin().lock().take(length).read_to_end(&mut body)?;

        Ok(Self::from_cgi_vars(std::env::vars(), &body))
    }
}

/// Directory part of a script path: `/app/index.cgi` -> `/app`.
fn dirname(path: &str) -> &str {
    if path.is_empty() {
        return "";
    }
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/";
    }
    match trimmed.rfind('/') {
        None => ".",
        Some(i) => {
            let dir = trimmed[..i].trim_end_matches('/');
            if dir.is_empty() { "/" } else { dir }
        }
    }
}

/// Writes a reply in CGI response format to any [`Write`].
pub struct CgiWriter<W: Write> {
    out: W,
    status_set: bool,
    finished: bool,
}

impl<W: Write> CgiWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            status_set: false,
            finished: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn ensure_open(&self) -> anyhow::Result<()> {
        if self.finished {
            anyhow::bail!("response already finished");
        }
        Ok(())
    }
}

impl<W: Write> Transport for CgiWriter<W> {
    fn set_status(&mut self, status: Status) -> anyhow::Result<()> {
        self.ensure_open()?;
        write!(self.out, "Status: {}\r\n", status)?;
        self.status_set = true;
        Ok(())
    }

    fn write_header(&mut self, name: &str, value: &str) -> anyhow::Result<()> {
        self.ensure_open()?;
        if !self.status_set {
            anyhow::bail!("header written before status");
        }
        check_header(name, value)?;
        write!(self.out, "{}: {}\r\n", name, value)?;
        Ok(())
    }

    fn flush(&mut self) -> anyhow::Result<()> {
        self.out.flush()?;
        Ok(())
    }

    fn finish(&mut self, body: &[u8]) -> anyhow::Result<()> {
        self.ensure_open()?;
        if !self.status_set {
            anyhow::bail!("body written before status");
        }
        self.out.write_all(b"\r\n")?;
        self.out.write_all(body)?;
        self.out.flush()?;
        self.finished = true;
        Ok(())
    }
}

/// Emits `response` to stdout and ends the process.
///
/// This is the last step of a CGI request: it never returns. The exit code
/// is 1 if the reply could not be written.
pub fn send(response: Response) -> ! {
    let stdout = std::io::stdout();
    let mut writer = CgiWriter::new(stdout.lock());

    let code = match response.emit(&mut writer) {
        Ok(()) => 0,
        Err(e) => {
            error!("Failed to emit response: {}", e);
            1
        }
    };
    std::process::exit(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dirname_matches_script_layout() {
        assert_eq!(dirname("/"), "/");
        assert_eq!(dirname("/index.cgi"), "/");
        assert_eq!(dirname("/app/index.cgi"), "/app");
        assert_eq!(dirname("/app/sub/"), "/app");
        assert_eq!(dirname("index.cgi"), ".");
        assert_eq!(dirname(""), "");
    }
}
