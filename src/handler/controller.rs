use std::collections::HashMap;
use std::sync::Arc;

use super::params::{Args, ParamSpec};
use crate::error::RouterError;
use crate::response::Response;

/// Result of a handler invocation.
///
/// `Ok(None)` means the handler completed without producing a response of
/// its own.
pub type HandlerResult = Result<Option<Response>, RouterError>;

/// A named handler target exposing methods with declared parameters.
///
/// Routes resolve to a controller plus a method name; the router asks the
/// controller for the method's [`ParamSpec`] list, binds request values to it
/// and calls the method.
pub trait Controller: Send + Sync {
    /// Controller name, e.g. `UserProfile` or `api::v1::UserProfile`.
    ///
    /// The dash-cased short name (`user-profile`) takes part in method name
    /// derivation.
    fn name(&self) -> &str;

    /// Declared parameters of `method`, `None` when the method does not exist.
    fn signature(&self, method: &str) -> Option<&[ParamSpec]>;

    /// Invoke `method` with bound arguments.
    fn call(&self, method: &str, args: Args) -> HandlerResult;

    /// Whether `method` can be invoked on this controller.
    fn is_callable(&self, method: &str) -> bool {
        self.signature(method).is_some()
    }
}

type ActionFn = dyn Fn(Args) -> HandlerResult + Send + Sync;

struct Action {
    params: Vec<ParamSpec>,
    handler: Arc<ActionFn>,
}

/// Closure-backed [`Controller`].
///
/// ```rust
/// use micro_router::handler::{ParamKind, ParamSpec, Resource};
/// use micro_router::Response;
/// use serde_json::json;
///
/// let users = Resource::new("Users").action(
///     "getUser",
///     vec![ParamSpec::required("id", ParamKind::Int)],
///     |args| Ok(Some(Response::new().body(json!({ "id": args.int("id") })))),
/// );
/// ```
pub struct Resource {
    name: String,
    actions: HashMap<String, Action>,
}

impl Resource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: HashMap::new(),
        }
    }

    /// Register `method` with its parameter list and handler closure.
    ///
    /// Registering the same method twice replaces the earlier handler.
    #[must_use]
    pub fn action<F>(mut self, method: impl Into<String>, params: Vec<ParamSpec>, handler: F) -> Self
    where
        F: Fn(Args) -> HandlerResult + Send + Sync + 'static,
    {
        self.actions.insert(
            method.into(),
            Action {
                params,
                handler: Arc::new(handler),
            },
        );
        self
    }

    /// Registered method names, sorted.
    #[must_use]
    pub fn methods(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Controller for Resource {
    fn name(&self) -> &str {
        &self.name
    }

    fn signature(&self, method: &str) -> Option<&[ParamSpec]> {
        self.actions.get(method).map(|a| a.params.as_slice())
    }

    fn call(&self, method: &str, args: Args) -> HandlerResult {
        let action = self
            .actions
            .get(method)
            .ok_or_else(|| RouterError::InvalidTarget {
                target: self.name.clone(),
                method: method.to_string(),
            })?;
        (action.handler)(args)
    }
}

/// Constructor used by [`Target::Constructor`].
pub type ControllerCtor = fn() -> Arc<dyn Controller>;

/// Where a route finds its controller.
#[derive(Clone)]
pub enum Target {
    /// A live controller instance
    Instance(Arc<dyn Controller>),
    /// A controller id resolved through the router's service registry
    Service(String),
    /// A controller built with no arguments.
    ///
    /// When the router has a registry, `name` is looked up there first.
    Constructor {
        name: String,
        ctor: ControllerCtor,
    },
}

fn construct<C: Controller + Default + 'static>() -> Arc<dyn Controller> {
    Arc::new(C::default())
}

impl Target {
    /// Constructor target for a `Default` controller type.
    #[must_use]
    pub fn constructor<C: Controller + Default + 'static>() -> Self {
        Target::Constructor {
            name: std::any::type_name::<C>().to_string(),
            ctor: construct::<C>,
        }
    }

    /// Name of the target as known before resolution.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Target::Instance(c) => c.name(),
            Target::Service(id) => id,
            Target::Constructor { name, .. } => name,
        }
    }
}

impl std::fmt::Debug for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Instance(c) => write!(f, "Instance({})", c.name()),
            Target::Service(id) => write!(f, "Service({id})"),
            Target::Constructor { name, .. } => write!(f, "Constructor({name})"),
        }
    }
}

impl<C: Controller + 'static> From<Arc<C>> for Target {
    fn from(c: Arc<C>) -> Self {
        Target::Instance(c)
    }
}

impl From<Arc<dyn Controller>> for Target {
    fn from(c: Arc<dyn Controller>) -> Self {
        Target::Instance(c)
    }
}

impl From<&str> for Target {
    fn from(id: &str) -> Self {
        Target::Service(id.to_string())
    }
}

impl From<String> for Target {
    fn from(id: String) -> Self {
        Target::Service(id)
    }
}

/// A resolved handler target: controller instance plus method name.
#[derive(Clone)]
pub struct Callable {
    pub controller: Arc<dyn Controller>,
    pub method: String,
}

impl Callable {
    #[must_use]
    pub fn is_callable(&self) -> bool {
        self.controller.is_callable(&self.method)
    }
}

impl std::fmt::Debug for Callable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.controller.name(), self.method)
    }
}
