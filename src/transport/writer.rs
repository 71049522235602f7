use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::Response;
use crate::http::status::Status;
use crate::transport::{check_header, Transport};

const HTTP_VERSION: &str = "HTTP/1.1";

/// Serializes an emitted response into an HTTP/1.1 byte buffer, then writes
/// that buffer to a stream.
///
/// `Content-Length` is added when the response does not carry one.
#[derive(Debug, Default)]
pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
    status_set: bool,
    has_content_length: bool,
    finished: bool,
    head_only: bool,
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writer for a reply to `HEAD`: headers are sent, the body is not.
    pub fn head_only() -> Self {
        Self {
            head_only: true,
            ..Self::default()
        }
    }

    /// Emits `response` into a fresh writer.
    pub fn from_response(response: Response, head_only: bool) -> anyhow::Result<Self> {
        let mut writer = if head_only { Self::head_only() } else { Self::new() };
        response.emit(&mut writer)?;
        Ok(writer)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        if !self.finished {
            anyhow::bail!("response not finished");
        }

        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }

        stream.flush().await?;
        Ok(())
    }

    fn ensure_open(&self) -> anyhow::Result<()> {
        if self.finished {
            anyhow::bail!("response already finished");
        }
        Ok(())
    }
}

impl Transport for ResponseWriter {
    fn set_status(&mut self, status: Status) -> anyhow::Result<()> {
        self.ensure_open()?;
        if self.status_set {
            anyhow::bail!("status line already written");
        }
        let status_line = format!(
            "{} {} {}\r\n",
            HTTP_VERSION,
            status.as_u16(),
            status.reason_phrase()
        );
        self.buffer.extend_from_slice(status_line.as_bytes());
        self.status_set = true;
        Ok(())
    }

    fn write_header(&mut self, name: &str, value: &str) -> anyhow::Result<()> {
        self.ensure_open()?;
        if !self.status_set {
            anyhow::bail!("header written before status line");
        }
        check_header(name, value)?;

        if name.eq_ignore_ascii_case("Content-Length") {
            self.has_content_length = true;
        }
        self.buffer.extend_from_slice(name.as_bytes());
        self.buffer.extend_from_slice(b": ");
        self.buffer.extend_from_slice(value.as_bytes());
        self.buffer.extend_from_slice(b"\r\n");
        Ok(())
    }

    fn flush(&mut self) -> anyhow::Result<()> {
        // nothing reaches the socket before finish
        Ok(())
    }

    fn finish(&mut self, body: &[u8]) -> anyhow::Result<()> {
        self.ensure_open()?;
        if !self.status_set {
            anyhow::bail!("body written before status line");
        }

        if !self.has_content_length {
            let length = format!("Content-Length: {}\r\n", body.len());
            self.buffer.extend_from_slice(length.as_bytes());
        }
        self.buffer.extend_from_slice(b"\r\n");
        if !self.head_only {
            self.buffer.extend_from_slice(body);
        }
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::response::Headers;

    #[test]
    fn serializes_in_header_order() {
        let mut headers = Headers::new();
        headers.insert("X-B".into(), "2".into());
        headers.insert("X-A".into(), "1".into());
        let response = Response::new("hi", 200, headers).unwrap();

        let writer = ResponseWriter::from_response(response, false).unwrap();
        assert_eq!(
            writer.as_bytes(),
            b"HTTP/1.1 200 OK\r\nX-B: 2\r\nX-A: 1\r\nContent-Length: 2\r\n\r\nhi"
        );
    }

    #[test]
    fn head_reply_drops_body_but_keeps_length() {
        let writer = ResponseWriter::from_response(Response::ok("hello"), true).unwrap();
        assert_eq!(
            writer.as_bytes(),
            b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\n"
        );
    }

    #[test]
    fn rejects_writes_after_finish() {
        let mut writer = ResponseWriter::from_response(Response::default(), false).unwrap();
        assert!(writer.write_header("X-Late", "1").is_err());
        assert!(writer.finish(b"again").is_err());
    }
}
