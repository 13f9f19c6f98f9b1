//! # Router Module
//!
//! Pattern-table routing for one request at a time.
//!
//! ## Overview
//!
//! A [`Router`] holds an ordered table of [`Route`]s and the normalized
//! request (path without trailing `/`, lower-cased verb, bare media type).
//! [`Router::run`] walks the table:
//!
//! 1. **Match**: the route pattern is translated into a start-anchored regex
//!    (`{id}` → `\w+`, `{id:#\d+#}` → `\d+`, trailing `$` anchors the end) and
//!    tested against the path. Named captures are kept on the route.
//! 2. **Resolve**: the route's target becomes a controller instance, either
//!    directly, through the [`ServiceRegistry`](crate::handler::ServiceRegistry)
//!    or through a no-argument constructor. The method name is explicit or
//!    derived from verb and last path segment (`get /users/settings` →
//!    `getSettings`).
//! 3. **Bind**: request values are merged (path captures over request params
//!    over body fields) and coerced to the method's declared parameters.
//! 4. **Invoke** and **respond**: the handler's [`Response`](crate::Response)
//!    is negotiated against the request and sent. Errors and handler panics
//!    become structured error responses.
//!
//! Routes are evaluated in insertion order. A route marked with
//! [`Route::continue_propagation`] lets evaluation go on after it ran; the
//! last handler result is the one sent.

pub mod binding;
mod core;
mod route;
#[cfg(test)]
mod tests;

pub use self::core::{normalize_content_type, normalize_path, normalize_verb, Router};
pub use route::{build_method_name, camel_case_to_dashes, short_name, Route};
