use std::io;

/// Destination of an emitted response, provided by the host environment.
///
/// [`Response::send`](super::Response::send) calls `send_status` once, then
/// `send_header` per header in insertion order, then `send_body` zero or more
/// times.
pub trait ResponseSink {
    /// Status line, e.g. `(404, "Not Found")`.
    fn send_status(&mut self, code: u16, reason: &str);

    /// One response header.
    fn send_header(&mut self, name: &str, value: &str);

    /// A chunk of the response body.
    fn send_body(&mut self, chunk: &[u8]);
}

/// `io::Write` adapter over a sink, handed to deferred body producers.
pub(crate) struct SinkWriter<'a>(pub(crate) &'a mut dyn ResponseSink);

impl io::Write for SinkWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.send_body(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A [`ResponseSink`] that keeps everything in memory.
///
/// Used by hosts that hand the result to another HTTP stack, by the CLI and
/// by tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferedResponse {
    pub status: u16,
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// Number of times a status line was sent
    pub sends: usize,
}

impl BufferedResponse {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Header value, looked up case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body decoded as UTF-8 (lossy).
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Body parsed as JSON, `None` when it is not valid JSON.
    #[must_use]
    pub fn body_json(&self) -> Option<serde_json::Value> {
        serde_json::from_slice(&self.body).ok()
    }

    /// Raw HTTP/1.0 rendering: status line, headers, blank line, body.
    #[must_use]
    pub fn to_http_string(&self) -> String {
        let mut out = format!("HTTP/1.0 {} {}\r\n", self.status, self.reason);
        for (k, v) in &self.headers {
            out.push_str(&format!("{k}: {v}\r\n"));
        }
        out.push_str("\r\n");
        out.push_str(&self.body_text());
        out
    }

    /// Convert into an `http::Response`.
    pub fn into_http(self) -> Result<http::Response<Vec<u8>>, http::Error> {
        let mut builder = http::Response::builder().status(self.status);
        for (k, v) in &self.headers {
            builder = builder.header(k.as_str(), v.as_str());
        }
        builder.body(self.body)
    }
}

impl ResponseSink for BufferedResponse {
    fn send_status(&mut self, code: u16, reason: &str) {
        self.status = code;
        self.reason = reason.to_string();
        self.sends += 1;
    }

    fn send_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_string(), value.to_string()));
    }

    fn send_body(&mut self, chunk: &[u8]) {
        self.body.extend_from_slice(chunk);
    }
}
