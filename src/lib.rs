//! # micro-router
//!
//! **micro-router** is a minimal pattern-table HTTP request router. It matches a
//! request path and verb against an ordered table of route patterns, resolves
//! the target controller and method, binds request values to the method's
//! declared parameters, invokes it and serializes the result as JSON, XML or
//! plain text.
//!
//! ## Overview
//!
//! The host owns the connection: it parses the request into a
//! [`RequestContext`], builds a [`Router`] for it, and supplies a
//! [`ResponseSink`] the router writes the response to.
//!
//! ## Architecture
//!
//! - **[`router`]** - Route patterns, method name derivation, the routing cycle
//! - **[`handler`]** - Controllers, declared parameters, bound arguments, service registry
//! - **[`response`]** - Responses, content negotiation, JSON/XML/text serialization
//! - **[`request`]** - Immutable description of the inbound request
//! - **[`config`]** - Router configuration and route tables in TOML
//! - **[`error`]** - [`RouterError`] and its HTTP status mapping
//! - **[`logging`]** - `tracing-subscriber` setup for binaries
//! - **[`echo`]** - Echo controller used by the CLI
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Host
//!     participant Router
//!     participant Route
//!     participant Controller
//!     participant Sink as ResponseSink
//!
//!     Host->>Router: Router::new(RequestContext)
//!     Host->>Router: run(sink)
//!     loop every route in order
//!         Router->>Route: match_path(path)
//!         Route-->>Router: captures
//!         Router->>Route: callable(verb, path, registry)
//!         Route-->>Router: controller + method
//!         Router->>Router: bind_parameters
//!         Router->>Controller: call(method, args)
//!         Controller-->>Router: Option<Response>
//!     end
//!     Router->>Sink: status, headers, body
//! ```
//!
//! ## Example
//!
//! ```rust
//! use micro_router::handler::{ParamKind, ParamSpec, Resource};
//! use micro_router::{BufferedResponse, RequestContext, Response, Route, Router};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let users = Arc::new(Resource::new("Users").action(
//!     "get",
//!     vec![
//!         ParamSpec::required("id", ParamKind::Int),
//!         ParamSpec::optional("verbose", ParamKind::Bool, false),
//!     ],
//!     |args| {
//!         Ok(Some(Response::new().body(json!({
//!             "id": args.int("id"),
//!             "verbose": args.bool("verbose"),
//!         }))))
//!     },
//! ));
//!
//! let ctx = RequestContext::new("GET", "/users/42").with_query_string("verbose=1");
//! let mut router = Router::new(ctx);
//! router.append_route(Route::new("/users/{id:#\\d+#}", users));
//!
//! let mut sink = BufferedResponse::new();
//! router.run(&mut sink);
//! assert_eq!(sink.body_json(), Some(json!({"id": 42, "verbose": true})));
//! ```

pub mod cli;
pub mod config;
pub mod echo;
pub mod error;
pub mod handler;
pub mod logging;
pub mod request;
pub mod response;
pub mod router;

pub use config::{RouteTable, RouterConfig};
pub use error::RouterError;
pub use request::RequestContext;
pub use response::{BufferedResponse, OutputFormat, Response, ResponseSink};
pub use router::{Route, Router};
