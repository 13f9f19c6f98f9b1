use serde::Serialize;
use serde_json::Value;
use std::io;
use tracing::{debug, error, warn};

use super::format::{as_json, as_text, OutputFormat};
use super::sink::{ResponseSink, SinkWriter};
use super::xml::as_xml;
use crate::config::RouterConfig;
use crate::error::RouterError;
use crate::request::RequestContext;

/// Producer of a body that is written only when the response is sent.
pub type BodyWriter = Box<dyn FnOnce(&mut dyn io::Write) -> io::Result<()> + Send>;

/// Response payload.
pub enum Body {
    /// No body: only status and headers are emitted
    Empty,
    /// Structured or scalar value serialized per the output format
    Value(Value),
    /// Written by a closure at send time, without `Content-Length`
    Deferred(BodyWriter),
}

impl std::fmt::Debug for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Body::Empty => write!(f, "Empty"),
            Body::Value(v) => write!(f, "Value({v})"),
            Body::Deferred(_) => write!(f, "Deferred(..)"),
        }
    }
}

/// Reason phrase of a status code, `None` for codes without one.
#[must_use]
pub fn status_reason(code: u16) -> Option<&'static str> {
    http::StatusCode::from_u16(code)
        .ok()
        .and_then(|s| s.canonical_reason())
}

/// Interpret the value of the pretty-print query parameter.
///
/// Absent, `"0"` and `"false"` are off; anything else is on.
#[must_use]
pub fn pretty_flag(value: Option<&str>) -> bool {
    !matches!(value, None | Some("0") | Some("false"))
}

/// An HTTP response: status, ordered headers, body and serialization settings.
///
/// Handlers build one and return it; the router negotiates the format against
/// the request and sends it.
///
/// ```rust
/// use micro_router::{BufferedResponse, OutputFormat, Response};
/// use serde_json::json;
///
/// let mut sink = BufferedResponse::new();
/// Response::new()
///     .body(json!({"a": 1}))
///     .output_format(Some(OutputFormat::Json))
///     .send(&mut sink);
/// assert_eq!(sink.body_text(), r#"{"a":1}"#);
/// assert_eq!(sink.header("Content-Length"), Some("7"));
/// ```
#[derive(Debug)]
pub struct Response {
    status: u16,
    headers: Vec<(String, String)>,
    body: Body,
    format: Option<OutputFormat>,
    pretty: bool,
    format_explicit: bool,
    pretty_explicit: bool,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    /// A `200 OK` JSON response without body.
    #[must_use]
    pub fn new() -> Self {
        let mut res = Self {
            status: 200,
            headers: Vec::new(),
            body: Body::Empty,
            format: None,
            pretty: false,
            format_explicit: false,
            pretty_explicit: false,
        };
        res.apply_format(Some(OutputFormat::default()));
        res
    }

    /// Set the status code, rejecting codes without a reason phrase.
    pub fn status(mut self, code: u16) -> Result<Self, RouterError> {
        self.set_status(code)?;
        Ok(self)
    }

    pub fn set_status(&mut self, code: u16) -> Result<&mut Self, RouterError> {
        if status_reason(code).is_none() {
            return Err(RouterError::InvalidStatusCode(code));
        }
        self.status = code;
        Ok(self)
    }

    /// Set the body from any serializable value. `null` means no body.
    #[must_use]
    pub fn body<T: Serialize>(mut self, body: T) -> Self {
        self.set_body(body);
        self
    }

    pub fn set_body<T: Serialize>(&mut self, body: T) -> &mut Self {
        self.body = match serde_json::to_value(body) {
            Ok(Value::Null) => Body::Empty,
            Ok(v) => Body::Value(v),
            Err(e) => {
                warn!(error = %e, "Response body is not serializable, sending empty body");
                Body::Empty
            }
        };
        self
    }

    /// Set a body written by `writer` when the response is sent.
    #[must_use]
    pub fn deferred<F>(mut self, writer: F) -> Self
    where
        F: FnOnce(&mut dyn io::Write) -> io::Result<()> + Send + 'static,
    {
        self.body = Body::Deferred(Box::new(writer));
        self
    }

    #[must_use]
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Set a header. An existing header of the same name (case-insensitive)
    /// keeps its position and gets the new value.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some((_, v)) => *v = value,
            None => self.headers.push((name.to_string(), value)),
        }
        self
    }

    pub fn remove_header(&mut self, name: &str) -> &mut Self {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self
    }

    /// Set the output format explicitly; `None` writes the body verbatim.
    ///
    /// An explicit format is kept by [`negotiate`](Self::negotiate).
    #[must_use]
    pub fn output_format(mut self, format: Option<OutputFormat>) -> Self {
        self.set_output_format(format);
        self
    }

    pub fn set_output_format(&mut self, format: Option<OutputFormat>) -> &mut Self {
        self.format_explicit = true;
        self.apply_format(format);
        self
    }

    /// Set the output format by name (`json`, `xml` or `text`).
    pub fn output_format_str(self, format: &str) -> Result<Self, RouterError> {
        let format = format.parse::<OutputFormat>()?;
        Ok(self.output_format(Some(format)))
    }

    /// Enable or disable indentation explicitly.
    #[must_use]
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.set_pretty(pretty);
        self
    }

    pub fn set_pretty(&mut self, pretty: bool) -> &mut Self {
        self.pretty = pretty;
        self.pretty_explicit = true;
        self
    }

    /// Pick format and indentation from the request unless set explicitly.
    ///
    /// The format comes from the `Accept` header (first of json, xml, text
    /// whose token it contains; `*/*` or no match means the configured
    /// default). Indentation comes from the pretty-print query parameter.
    pub fn negotiate(&mut self, ctx: &RequestContext, config: &RouterConfig) -> &mut Self {
        if !self.pretty_explicit {
            self.pretty = pretty_flag(ctx.query(&config.pretty_param));
        }
        if !self.format_explicit {
            let format = ctx
                .header("accept")
                .and_then(OutputFormat::from_accept)
                .unwrap_or(config.default_format);
            self.apply_format(Some(format));
        }
        self
    }

    fn apply_format(&mut self, format: Option<OutputFormat>) {
        self.format = format;
        match format {
            Some(f) => {
                self.set_header("Content-Type", f.content_type());
            }
            None => {
                self.remove_header("Content-Type");
            }
        }
    }

    #[must_use]
    pub fn code(&self) -> u16 {
        self.status
    }

    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn payload(&self) -> &Body {
        &self.body
    }

    #[must_use]
    pub fn format(&self) -> Option<OutputFormat> {
        self.format
    }

    #[must_use]
    pub fn is_pretty(&self) -> bool {
        self.pretty
    }

    /// Serialize a value body per the output format.
    #[must_use]
    pub fn render(&self, body: &Value) -> String {
        match self.format {
            Some(OutputFormat::Json) => as_json(body, self.pretty),
            Some(OutputFormat::Xml) => as_xml(body, self.pretty),
            Some(OutputFormat::Text) | None => as_text(body),
        }
    }

    /// Emit the response: status line, headers, then the serialized body.
    ///
    /// Status 204 and empty bodies emit headers only. `Content-Length` is set
    /// from the serialized body before any header goes out.
    pub fn send(mut self, sink: &mut dyn ResponseSink) {
        let body = std::mem::replace(&mut self.body, Body::Empty);
        let body = if self.status == 204 { Body::Empty } else { body };

        let rendered = match &body {
            Body::Value(v) => Some(self.render(v)),
            Body::Empty | Body::Deferred(_) => None,
        };
        if let Some(bytes) = &rendered {
            self.set_header("Content-Length", bytes.len().to_string());
        }

        let reason = status_reason(self.status).unwrap_or_default();
        sink.send_status(self.status, reason);
        for (name, value) in &self.headers {
            sink.send_header(name, value);
        }

        debug!(
            status = self.status,
            format = ?self.format,
            pretty = self.pretty,
            body_bytes = rendered.as_ref().map(String::len),
            "Response sent"
        );

        match body {
            Body::Value(_) => {
                if let Some(bytes) = rendered {
                    sink.send_body(bytes.as_bytes());
                }
            }
            Body::Deferred(writer) => {
                if let Err(e) = writer(&mut SinkWriter(sink)) {
                    error!(error = %e, "Deferred response body failed");
                }
            }
            Body::Empty => {}
        }
    }
}
