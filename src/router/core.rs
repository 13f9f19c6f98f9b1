use serde_json::json;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::binding::{coerce, decode_body, is_present, merge_sources};
use super::route::Route;
use crate::config::RouterConfig;
use crate::error::RouterError;
use crate::handler::{Arg, Args, Callable, Controller, HandlerResult, ParamKind, ServiceRegistry};
use crate::request::RequestContext;
use crate::response::{Response, ResponseSink};

/// Trim surrounding whitespace and every trailing `/`.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    path.trim().trim_end_matches('/').to_string()
}

#[must_use]
pub fn normalize_verb(verb: &str) -> String {
    verb.to_lowercase()
}

/// Media type without parameters: `Application/JSON; charset=utf-8` → `application/json`.
#[must_use]
pub fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

/// Routes one request through an ordered table of [`Route`]s.
///
/// A router is built per request from its [`RequestContext`], filled with
/// routes and consumed by [`run`](Self::run):
///
/// ```rust
/// use micro_router::handler::Resource;
/// use micro_router::{BufferedResponse, RequestContext, Response, Route, Router};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let users = Arc::new(Resource::new("Users").action("get", vec![], |_| {
///     Ok(Some(Response::new().body(json!(["ada", "grace"]))))
/// }));
///
/// let mut router = Router::new(RequestContext::new("GET", "/users/"));
/// router.append_route(Route::new("/users", users));
///
/// let mut sink = BufferedResponse::new();
/// assert!(router.run(&mut sink));
/// assert_eq!(sink.status, 200);
/// assert_eq!(sink.body_text(), r#"["ada","grace"]"#);
/// ```
pub struct Router {
    routes: Vec<Route>,
    request: RequestContext,
    path: String,
    verb: String,
    content_type: String,
    registry: Option<Arc<dyn ServiceRegistry>>,
    config: RouterConfig,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("verb", &self.verb)
            .field("path", &self.path)
            .field("content_type", &self.content_type)
            .field("routes", &self.routes.len())
            .field("has_registry", &self.registry.is_some())
            .finish()
    }
}

impl Router {
    /// Router for `request` with an empty table and default configuration.
    #[must_use]
    pub fn new(request: RequestContext) -> Self {
        Self {
            path: normalize_path(request.path()),
            verb: normalize_verb(request.verb()),
            content_type: normalize_content_type(request.content_type().unwrap_or_default()),
            request,
            routes: Vec::new(),
            registry: None,
            config: RouterConfig::default(),
        }
    }

    /// Resolve service targets and object parameters through `registry`.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<dyn ServiceRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    /// Insert a route at the front of the table.
    pub fn prepend_route(&mut self, route: Route) -> &mut Self {
        self.routes.insert(0, route);
        self
    }

    /// Add a route at the end of the table.
    pub fn append_route(&mut self, route: Route) -> &mut Self {
        self.routes.push(route);
        self
    }

    pub fn clear_routing_table(&mut self) -> &mut Self {
        self.routes.clear();
        self
    }

    /// Routes in evaluation order.
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn set_path(&mut self, path: &str) -> &mut Self {
        self.path = normalize_path(path);
        self
    }

    pub fn set_verb(&mut self, verb: &str) -> &mut Self {
        self.verb = normalize_verb(verb);
        self
    }

    pub fn set_content_type(&mut self, content_type: &str) -> &mut Self {
        self.content_type = normalize_content_type(content_type);
        self
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn verb(&self) -> &str {
        &self.verb
    }

    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    #[must_use]
    pub fn request(&self) -> &RequestContext {
        &self.request
    }

    #[must_use]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Route the request and emit the outcome to `sink`.
    ///
    /// A handler's response is negotiated against the request and sent; any
    /// error, handler panics included, becomes an error response through
    /// [`send_exception`](Self::send_exception). Always returns `true`.
    pub fn run(&mut self, sink: &mut dyn ResponseSink) -> bool {
        info!(verb = %self.verb, path = %self.path, "Executing requested route");

        match self.dispatch() {
            Ok(Some(mut response)) => {
                response.negotiate(&self.request, &self.config);
                info!(status = response.code(), format = ?response.format(), "Sending response");
                response.send(sink);
                true
            }
            Ok(None) => {
                debug!(path = %self.path, "Handler returned no response, route executed successfully");
                true
            }
            Err(err) => self.send_exception(&err, sink),
        }
    }

    /// Run matching handlers and return the last produced result.
    ///
    /// Routes are evaluated in order. A matching route whose target cannot be
    /// resolved or does not expose the method is skipped. Evaluation stops
    /// after the first executed route unless it continues propagation.
    pub fn dispatch(&mut self) -> Result<Option<Response>, RouterError> {
        let mut matched = false;
        let mut result = None;

        for idx in 0..self.routes.len() {
            let route = &mut self.routes[idx];
            if !route.match_path(&self.path)? {
                debug!(path = %self.path, pattern = %route.pattern(), "Route did not match");
                continue;
            }

            let Some(callable) = route.callable(&self.verb, &self.path, self.registry.as_deref())
            else {
                debug!(pattern = %route.pattern(), target = %route.target().name(), "Matching route has no resolvable target");
                continue;
            };
            if !callable.is_callable() {
                debug!(pattern = %route.pattern(), callable = ?callable, "Matching route found, but method is not invocable");
                continue;
            }

            matched = true;
            let captured = route.params().clone();
            let continues = route.continues();
            info!(pattern = %route.pattern(), callable = ?callable, "Found matching route");

            let args = self.bind_parameters(callable.controller.as_ref(), &callable.method, &captured)?;
            result = invoke(&callable, args)?;

            if !continues {
                break;
            }
        }

        if !matched {
            return Err(RouterError::NoRouteMatch {
                verb: self.verb.clone(),
                path: self.path.clone(),
            });
        }
        Ok(result)
    }

    /// Bind request values to the declared parameters of `method`.
    ///
    /// Sources merge with path captures over request params over body
    /// fields. Each parameter takes, in order: its merged value coerced to
    /// the declared kind, its raw JSON body value, a registry service for
    /// object kinds, its default. Anything else is a missing parameter.
    pub fn bind_parameters(
        &self,
        controller: &dyn Controller,
        method: &str,
        captured: &HashMap<String, String>,
    ) -> Result<Args, RouterError> {
        let signature = controller
            .signature(method)
            .ok_or_else(|| RouterError::InvalidTarget {
                target: controller.name().to_string(),
                method: method.to_string(),
            })?;

        let body = decode_body(&self.content_type, &self.request, &self.config)?;
        let merged = merge_sources(&body.fields, self.request.params(), captured);

        let mut args = Args::new();
        for param in signature {
            if let Some(value) = merged.get(&param.name).filter(|v| is_present(v)) {
                args.push(&param.name, coerce(&param.kind, value.clone())?);
                continue;
            }

            if body.is_json {
                if let Some(value) = body.fields.get(&param.name).filter(|v| !v.is_null()) {
                    args.push(&param.name, Arg::Value(value.clone()));
                    continue;
                }
            }

            if let ParamKind::Object { type_name, .. } = &param.kind {
                if let Some(service) = self.registry.as_ref().and_then(|r| r.service(type_name)) {
                    debug!(param = %param.name, service = %type_name, "Parameter bound to registry service");
                    args.push(&param.name, Arg::Service(service));
                    continue;
                }
            }

            if let Some(default) = &param.default {
                args.push(&param.name, Arg::Value(default.clone()));
                continue;
            }

            return Err(RouterError::MissingParameter(param.name.clone()));
        }

        Ok(args)
    }

    /// Emit `err` as a structured error response.
    ///
    /// Body: `{"error": kind, "message": text, "code": code}`; status is the
    /// error's declared status, 500 when that status is unknown. Always
    /// returns `true`.
    pub fn send_exception(&self, err: &RouterError, sink: &mut dyn ResponseSink) -> bool {
        let declared = err.status_code();
        error!(
            error_kind = %err.kind(),
            status = declared,
            code = err.code(),
            message = %err,
            "Uncaught error while routing"
        );

        let response = Response::new().status(declared).or_else(|e| {
            warn!(status = declared, error = %e, "Unknown error status, responding with 500");
            Response::new().status(500)
        });

        match response {
            Ok(mut response) => {
                response.set_body(json!({
                    "error": err.kind(),
                    "message": err.to_string(),
                    "code": err.code(),
                }));
                response.negotiate(&self.request, &self.config);
                response.send(sink);
            }
            Err(e) => {
                error!(error = %e, "Failed to build error response");
                sink.send_status(500, "Internal Server Error");
            }
        }
        true
    }
}

/// Call the handler, turning a panic into a `HandlerPanic` error.
fn invoke(callable: &Callable, args: Args) -> HandlerResult {
    catch_unwind(AssertUnwindSafe(|| {
        callable.controller.call(&callable.method, args)
    }))
    .unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "handler panicked".to_string());
        error!(callable = ?callable, panic = %message, "Handler panicked");
        Err(RouterError::application("HandlerPanic", message))
    })
}
