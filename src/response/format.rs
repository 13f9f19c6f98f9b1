use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::str::FromStr;
use tracing::warn;

use crate::error::RouterError;

/// Serialization format of a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Xml,
    Text,
}

impl OutputFormat {
    /// Formats in negotiation order.
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Json, OutputFormat::Xml, OutputFormat::Text];

    /// `Content-Type` header value for the format.
    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            OutputFormat::Json => "application/json; charset=utf-8",
            OutputFormat::Xml => "application/xml; charset=utf-8",
            OutputFormat::Text => "text/html; charset=utf-8",
        }
    }

    /// Token looked for in `Accept` headers.
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Xml => "xml",
            OutputFormat::Text => "text",
        }
    }

    /// First format whose token appears in `accept`.
    ///
    /// `None` when the header names none of them or contains the `*/*`
    /// wildcard.
    #[must_use]
    pub fn from_accept(accept: &str) -> Option<Self> {
        if accept.contains("*/*") {
            return None;
        }
        let accept = accept.to_ascii_lowercase();
        Self::ALL.into_iter().find(|f| accept.contains(f.token()))
    }
}

impl FromStr for OutputFormat {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(OutputFormat::Json),
            "xml" => Ok(OutputFormat::Xml),
            "text" => Ok(OutputFormat::Text),
            other => Err(RouterError::InvalidOutputFormat(other.to_string())),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

/// Serialize `body` as JSON; pretty output is indented with four spaces.
///
/// A serialization failure yields an empty string.
#[must_use]
pub fn as_json(body: &Value, pretty: bool) -> String {
    let result = if pretty {
        let mut out = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
        body.serialize(&mut ser)
            .map_err(|e| e.to_string())
            .and_then(|()| String::from_utf8(out).map_err(|e| e.to_string()))
    } else {
        serde_json::to_string(body).map_err(|e| e.to_string())
    };

    match result {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "JSON serialization failed, sending empty body");
            String::new()
        }
    }
}

/// Render `body` verbatim: strings as-is, everything else as compact JSON.
#[must_use]
pub fn as_text(body: &Value) -> String {
    match body {
        Value::String(s) => s.clone(),
        other => as_json(other, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_accept() {
        assert_eq!(OutputFormat::from_accept("application/xml"), Some(OutputFormat::Xml));
        assert_eq!(
            OutputFormat::from_accept("text/html,application/json;q=0.9"),
            Some(OutputFormat::Json)
        );
        assert_eq!(OutputFormat::from_accept("text/plain"), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::from_accept("application/xml, */*"), None);
        assert_eq!(OutputFormat::from_accept("image/png"), None);
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("xml".parse::<OutputFormat>().unwrap(), OutputFormat::Xml);
        let err = "yaml".parse::<OutputFormat>().unwrap_err();
        assert_eq!(err.kind(), "InvalidOutputFormat");
    }

    #[test]
    fn test_as_json_compact_and_pretty() {
        let body = json!({"a": 1});
        assert_eq!(as_json(&body, false), r#"{"a":1}"#);
        assert_eq!(as_json(&body, true), "{\n    \"a\": 1\n}");
    }

    #[test]
    fn test_as_text() {
        assert_eq!(as_text(&json!("plain <b>text</b>")), "plain <b>text</b>");
        assert_eq!(as_text(&json!([1, 2])), "[1,2]");
    }
}
