#![allow(dead_code)]

pub mod temp_files {
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Temporary TOML file with `content`, removed when dropped
    pub fn create_temp_toml(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("micro_router_test_")
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }
}

pub mod test_tracing {
    use std::sync::Once;

    static INIT: Once = Once::new();

    /// Route test logs through the libtest capture, once per binary
    pub fn init() {
        INIT.call_once(|| {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
                )
                .with_test_writer()
                .try_init();
        });
    }
}

pub mod controllers {
    use micro_router::handler::{ParamKind, ParamSpec, Resource};
    use micro_router::{Response, RouterError};
    use serde_json::json;
    use std::sync::Arc;

    /// `Users` controller covering the usual verb/action combinations
    pub fn users() -> Arc<Resource> {
        Arc::new(
            Resource::new("Users")
                .action("get", vec![], |_| {
                    Ok(Some(Response::new().body(json!(["ada", "grace"]))))
                })
                .action(
                    "getUser",
                    vec![ParamSpec::required("id", ParamKind::Int)],
                    |args| Ok(Some(Response::new().body(json!({ "id": args.int("id") })))),
                )
                .action(
                    "getSettings",
                    vec![ParamSpec::optional("verbose", ParamKind::Bool, false)],
                    |args| {
                        Ok(Some(
                            Response::new().body(json!({ "verbose": args.bool("verbose") })),
                        ))
                    },
                )
                .action(
                    "post",
                    vec![
                        ParamSpec::required("name", ParamKind::String),
                        ParamSpec::optional("tags", ParamKind::Array, json!([])),
                    ],
                    |args| {
                        Ok(Some(Response::new().status(201)?.body(json!({
                            "name": args.str("name"),
                            "tags": args.get("tags"),
                        }))))
                    },
                )
                .action("delete", vec![], |_| Ok(Some(Response::new().status(204)?)))
                .action("put", vec![], |_| Ok(None))
                .action("getForbidden", vec![], |_| {
                    Err(RouterError::application("Forbidden", "not yours")
                        .with_status(403)
                        .with_code(7))
                })
                .action("getBoom", vec![], |_| panic!("boom")),
        )
    }

    /// Controller whose handler echoes the bound arguments
    pub fn echo(name: &str, params: Vec<ParamSpec>) -> Arc<Resource> {
        let name = name.to_string();
        let label = name.clone();
        Arc::new(Resource::new(name).action("get", params.clone(), move |args| {
            Ok(Some(Response::new().body(json!({
                "controller": label,
                "args": args.to_json(),
            }))))
        }).action("post", params, |args| {
            Ok(Some(Response::new().body(args.to_json())))
        }))
    }
}

pub mod harness {
    use micro_router::{BufferedResponse, RequestContext, Route, Router};

    /// Run `ctx` through a router over `routes` and collect the response
    pub fn route_request(ctx: RequestContext, routes: Vec<Route>) -> BufferedResponse {
        super::test_tracing::init();
        let mut router = Router::new(ctx);
        for route in routes {
            router.append_route(route);
        }
        let mut sink = BufferedResponse::new();
        assert!(router.run(&mut sink));
        sink
    }
}
