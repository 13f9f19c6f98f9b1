//! Echo controller for trying route tables without application code.

use serde_json::json;
use std::sync::Arc;

use crate::config::{RouteDef, RouteTable};
use crate::handler::{Args, Controller, HandlerResult, ParamSpec};
use crate::response::Response;
use crate::router::Route;

/// Controller that accepts every method and responds with what it was given.
///
/// Responds with `{"controller": name, "method": method, "args": {...}}`.
#[derive(Debug, Clone)]
pub struct EchoController {
    name: String,
    params: Vec<ParamSpec>,
}

impl EchoController {
    /// Echo controller named `name`, binding `params` for every method.
    pub fn new(name: impl Into<String>, params: Vec<ParamSpec>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }
}

impl Controller for EchoController {
    fn name(&self) -> &str {
        &self.name
    }

    fn signature(&self, _method: &str) -> Option<&[ParamSpec]> {
        Some(&self.params)
    }

    fn call(&self, method: &str, args: Args) -> HandlerResult {
        Ok(Some(Response::new().body(json!({
            "controller": self.name,
            "method": method,
            "args": args.to_json(),
        }))))
    }
}

/// Route for one table entry, backed by an [`EchoController`].
#[must_use]
pub fn echo_route(def: &RouteDef) -> Route {
    let controller = Arc::new(EchoController::new(&def.target, def.param_specs()));
    let route = Route::new(&def.path, controller).continue_propagation(def.continue_propagation);
    match &def.method {
        Some(method) => route.with_method(method),
        None => route,
    }
}

/// Every route of `table`, in order, backed by echo controllers.
#[must_use]
pub fn echo_routes(table: &RouteTable) -> Vec<Route> {
    table.routes.iter().map(echo_route).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{Arg, ParamKind};
    use crate::response::BufferedResponse;

    #[test]
    fn test_echo_returns_args() {
        let echo = EchoController::new("Users", vec![ParamSpec::required("id", ParamKind::Int)]);
        assert!(echo.is_callable("anything"));

        let mut args = Args::new();
        args.push("id", Arg::Value(json!(7)));
        let response = echo.call("getUser", args).unwrap().unwrap();

        let mut sink = BufferedResponse::new();
        response.send(&mut sink);
        assert_eq!(
            sink.body_json(),
            Some(json!({"controller": "Users", "method": "getUser", "args": {"id": 7}}))
        );
    }

    #[test]
    fn test_echo_routes_keep_table_settings() {
        let table = RouteTable::from_toml_str(
            r#"
[[routes]]
path = "/audit"
target = "Audit"
method = "record"
continue = true
"#,
        )
        .unwrap();
        let routes = echo_routes(&table);
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].pattern(), "/audit");
        assert_eq!(routes[0].method(), Some("record"));
        assert!(routes[0].continues());
    }
}
