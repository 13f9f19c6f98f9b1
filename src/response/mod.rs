//! # Response Module
//!
//! Formats and emits what a handler returns.
//!
//! A [`Response`] carries a status code (validated against the known reason
//! phrases), insertion-ordered headers, a [`Body`] and an [`OutputFormat`].
//! [`Response::negotiate`] picks the format from the request's `Accept`
//! header and indentation from the `pretty` query parameter, unless the
//! handler set them explicitly. [`Response::send`] serializes the body and
//! writes everything to a [`ResponseSink`] supplied by the host.
//!
//! | format | `Content-Type` | body |
//! |---|---|---|
//! | json | `application/json; charset=utf-8` | JSON, 4-space indent when pretty |
//! | xml | `application/xml; charset=utf-8` | `<response>` document, `<node>` for list items |
//! | text | `text/html; charset=utf-8` | strings verbatim |

mod core;
mod format;
mod sink;
pub mod xml;

pub use self::core::{pretty_flag, status_reason, Body, BodyWriter, Response};
pub use format::{as_json, as_text, OutputFormat};
pub use sink::{BufferedResponse, ResponseSink};
