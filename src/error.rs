//! # Error Module
//!
//! Every failure that can happen while a request is routed is a [`RouterError`].
//! Each variant carries the HTTP status it is reported with, so
//! [`Router::send_exception`](crate::router::Router::send_exception) can turn any
//! error into a structured response body:
//!
//! ```json
//! { "error": "NoRouteMatch", "message": "get /nowhere could not be routed, no matching routes found", "code": 0 }
//! ```
//!
//! Handlers return `RouterError` too. Application code that works with
//! [`anyhow`] can use `?` directly; the error is reported as kind `Error` with
//! status 500. Use [`RouterError::application`] to declare a custom kind and
//! status.

use thiserror::Error;

/// Errors raised during the match / bind / invoke / respond cycle.
#[derive(Debug, Error)]
pub enum RouterError {
    /// No route in the table produced a valid match for the request.
    #[error("{verb} {path} could not be routed, no matching routes found")]
    NoRouteMatch {
        /// Lower-cased request verb
        verb: String,
        /// Normalized request path
        path: String,
    },

    /// The request body (or the legacy query-string fallback) is not a JSON object.
    #[error("invalid json input given: {0}")]
    InvalidJson(String),

    /// A required handler parameter had no value in any source.
    #[error("missing required parameter {0}")]
    MissingParameter(String),

    /// The resolved controller does not expose the requested method.
    #[error("invalid target {target}::{method}")]
    InvalidTarget {
        /// Controller name
        target: String,
        /// Method name that could not be invoked
        method: String,
    },

    /// A route pattern did not translate into a valid matcher.
    #[error("invalid route pattern {pattern}: {reason}")]
    InvalidRoutePattern {
        /// Raw route pattern
        pattern: String,
        /// Compiler diagnostic
        reason: String,
    },

    /// An output format other than json, xml or text was requested.
    #[error("invalid output format given: {0}")]
    InvalidOutputFormat(String),

    /// A response status without a known reason phrase was requested.
    #[error("invalid http code set: {0}")]
    InvalidStatusCode(u16),

    /// Error raised by application code.
    #[error("{message}")]
    Application {
        /// Name reported in the `error` field of the response body
        kind: String,
        /// Human readable message
        message: String,
        /// Application specific numeric code
        code: i64,
        /// HTTP status to respond with (500 when `None`)
        status: Option<u16>,
    },
}

impl RouterError {
    /// Create an application error with the given kind and message.
    ///
    /// The error responds with status 500 and code 0 until
    /// [`with_status`](Self::with_status) / [`with_code`](Self::with_code) say
    /// otherwise.
    pub fn application(kind: impl Into<String>, message: impl Into<String>) -> Self {
        RouterError::Application {
            kind: kind.into(),
            message: message.into(),
            code: 0,
            status: None,
        }
    }

    /// Declare the HTTP status of an application error.
    ///
    /// Has no effect on the built-in variants, whose status is fixed.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        if let RouterError::Application { status: s, .. } = &mut self {
            *s = Some(status);
        }
        self
    }

    /// Attach an application specific numeric code.
    #[must_use]
    pub fn with_code(mut self, code: i64) -> Self {
        if let RouterError::Application { code: c, .. } = &mut self {
            *c = code;
        }
        self
    }

    /// Name of the error kind, used as the `error` field of error responses.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            RouterError::NoRouteMatch { .. } => "NoRouteMatch",
            RouterError::InvalidJson(_) => "InvalidJson",
            RouterError::MissingParameter(_) => "MissingParameter",
            RouterError::InvalidTarget { .. } => "InvalidTarget",
            RouterError::InvalidRoutePattern { .. } => "InvalidRoutePattern",
            RouterError::InvalidOutputFormat(_) => "InvalidOutputFormat",
            RouterError::InvalidStatusCode(_) => "InvalidStatusCode",
            RouterError::Application { kind, .. } => kind,
        }
    }

    /// HTTP status this error is reported with.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            RouterError::NoRouteMatch { .. } => 404,
            RouterError::InvalidJson(_) | RouterError::MissingParameter(_) => 400,
            RouterError::InvalidTarget { .. }
            | RouterError::InvalidRoutePattern { .. }
            | RouterError::InvalidOutputFormat(_)
            | RouterError::InvalidStatusCode(_) => 500,
            RouterError::Application { status, .. } => status.unwrap_or(500),
        }
    }

    /// Numeric code reported in the `code` field of error responses.
    #[must_use]
    pub fn code(&self) -> i64 {
        match self {
            RouterError::Application { code, .. } => *code,
            _ => 0,
        }
    }
}

impl From<anyhow::Error> for RouterError {
    fn from(err: anyhow::Error) -> Self {
        RouterError::application("Error", format!("{err:#}"))
    }
}

/// Result type used throughout the crate.
pub type Result<T, E = RouterError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_route_match_is_404() {
        let err = RouterError::NoRouteMatch {
            verb: "get".into(),
            path: "/missing".into(),
        };
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.kind(), "NoRouteMatch");
        assert_eq!(
            err.to_string(),
            "get /missing could not be routed, no matching routes found"
        );
    }

    #[test]
    fn test_application_error_declares_status() {
        let err = RouterError::application("Forbidden", "not yours")
            .with_status(403)
            .with_code(17);
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.kind(), "Forbidden");
        assert_eq!(err.code(), 17);
    }

    #[test]
    fn test_anyhow_errors_default_to_500() {
        let err: RouterError = anyhow::anyhow!("database went away").into();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.kind(), "Error");
        assert_eq!(err.to_string(), "database went away");
    }

    #[test]
    fn test_builtin_status_is_fixed() {
        let err = RouterError::MissingParameter("id".into()).with_status(418);
        assert_eq!(err.status_code(), 400);
    }
}
