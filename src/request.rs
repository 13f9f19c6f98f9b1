//! Inbound request description.
//!
//! The router never reads process-global state. Everything it needs about the
//! request is handed over once, as an immutable [`RequestContext`], by the host
//! environment that owns the connection.

use std::collections::HashMap;
use tracing::debug;

/// Immutable view of the inbound request.
///
/// Built either field by field:
///
/// ```rust
/// use micro_router::RequestContext;
///
/// let ctx = RequestContext::new("POST", "/users/42")
///     .with_query_string("pretty=1")
///     .with_content_type("application/json; charset=utf-8")
///     .with_body(r#"{"name":"ada"}"#);
/// assert_eq!(ctx.query("pretty"), Some("1"));
/// ```
///
/// or from an [`http::Request`] via [`RequestContext::from_http`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    verb: String,
    path: String,
    content_type: Option<String>,
    body: Vec<u8>,
    query_string: String,
    query: HashMap<String, String>,
    params: HashMap<String, String>,
    headers: HashMap<String, String>,
}

impl RequestContext {
    /// Create a context for `verb` on `path` (path without query string).
    pub fn new(verb: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    /// Build a context from an `http::Request`, acting as the host.
    ///
    /// Query parameters become both `query` and `params`; for
    /// `application/x-www-form-urlencoded` bodies the form fields are merged
    /// into `params` as well, overriding same-named query values.
    pub fn from_http<B: AsRef<[u8]>>(req: &http::Request<B>) -> Self {
        let mut ctx = Self::new(req.method().as_str(), req.uri().path())
            .with_query_string(req.uri().query().unwrap_or(""))
            .with_body(req.body().as_ref().to_vec());

        for (name, value) in req.headers() {
            let value = String::from_utf8_lossy(value.as_bytes()).to_string();
            if name == http::header::CONTENT_TYPE {
                ctx.content_type = Some(value.clone());
            }
            ctx.headers.insert(name.as_str().to_ascii_lowercase(), value);
        }

        let is_form = ctx
            .content_type
            .as_deref()
            .and_then(|ct| ct.split(';').next())
            .is_some_and(|ct| ct.trim().eq_ignore_ascii_case("application/x-www-form-urlencoded"));
        if is_form {
            let fields = parse_form(&ctx.body);
            debug!(field_count = fields.len(), "Form fields merged into request params");
            ctx.params.extend(fields);
        }

        ctx
    }

    /// Set the raw query string and parse it into query and request parameters.
    #[must_use]
    pub fn with_query_string(mut self, query_string: impl Into<String>) -> Self {
        self.query_string = query_string.into();
        let parsed = parse_query_params(&self.query_string);
        self.params.extend(parsed.clone());
        self.query = parsed;
        self
    }

    /// Set the `Content-Type` of the request body.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        let content_type = content_type.into();
        self.headers
            .insert("content-type".to_string(), content_type.clone());
        self.content_type = Some(content_type);
        self
    }

    /// Set the raw request body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Add a request header. Names are stored lower-cased.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Add an already-parsed request parameter (query or form field).
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// HTTP verb as sent by the client.
    #[must_use]
    pub fn verb(&self) -> &str {
        &self.verb
    }

    /// Request path without query string.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw `Content-Type`, parameters included.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Raw request body.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Raw query string (without the leading `?`).
    #[must_use]
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// Decoded query-string parameter.
    #[must_use]
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Query and form parameters combined by the host.
    #[must_use]
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// Header value, looked up case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Parse a query string (`a=1&b=two`) into decoded key/value pairs.
///
/// Later occurrences of a key win.
#[must_use]
pub fn parse_query_params(query: &str) -> HashMap<String, String> {
    let query = query.strip_prefix('?').unwrap_or(query);
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Parse an `application/x-www-form-urlencoded` body.
#[must_use]
pub fn parse_form(body: &[u8]) -> HashMap<String, String> {
    url::form_urlencoded::parse(body)
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_params() {
        let q = parse_query_params("x=1&y=hello%20world");
        assert_eq!(q.get("x"), Some(&"1".to_string()));
        assert_eq!(q.get("y"), Some(&"hello world".to_string()));
    }

    #[test]
    fn test_parse_query_params_leading_question_mark() {
        let q = parse_query_params("?pretty=0");
        assert_eq!(q.get("pretty"), Some(&"0".to_string()));
    }

    #[test]
    fn test_query_string_feeds_params() {
        let ctx = RequestContext::new("GET", "/a").with_query_string("limit=10");
        assert_eq!(ctx.query("limit"), Some("10"));
        assert_eq!(ctx.params().get("limit"), Some(&"10".to_string()));
        assert_eq!(ctx.query_string(), "limit=10");
    }

    #[test]
    fn test_from_http_merges_form_fields() {
        let req = http::Request::builder()
            .method("POST")
            .uri("/users?name=query&page=2")
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header("Accept", "application/xml")
            .body(b"name=form".to_vec())
            .unwrap();
        let ctx = RequestContext::from_http(&req);
        assert_eq!(ctx.verb(), "POST");
        assert_eq!(ctx.path(), "/users");
        assert_eq!(ctx.query("name"), Some("query"));
        assert_eq!(ctx.params().get("name"), Some(&"form".to_string()));
        assert_eq!(ctx.params().get("page"), Some(&"2".to_string()));
        assert_eq!(ctx.header("ACCEPT"), Some("application/xml"));
        assert_eq!(
            ctx.content_type(),
            Some("application/x-www-form-urlencoded")
        );
    }
}
