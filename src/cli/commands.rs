use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::{LoggingSection, RouteTable, RouterConfig};
use crate::echo::{echo_route, echo_routes};
use crate::logging::{init_logging, LogConfig};
use crate::request::RequestContext;
use crate::response::BufferedResponse;
use crate::router::{normalize_path, normalize_verb, Router};

/// Command-line interface for micro-router
///
/// Loads route tables from TOML and shows how requests are routed.
#[derive(Parser)]
#[command(name = "micro-router")]
#[command(about = "micro-router CLI", version, long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Show match result, captures and method name of every route
    Inspect {
        /// Route table (TOML)
        #[arg(short, long)]
        routes: PathBuf,

        /// Request verb
        #[arg(long, default_value = "GET")]
        verb: String,

        /// Request path, without query string
        #[arg(short, long)]
        path: String,
    },
    /// Route a request through echo controllers and print the HTTP response
    Dispatch(DispatchArgs),
}

/// Request description for `dispatch`.
#[derive(Args, Debug, Clone)]
pub struct DispatchArgs {
    /// Route table (TOML)
    #[arg(short, long)]
    pub routes: PathBuf,

    /// Request verb
    #[arg(long, default_value = "GET")]
    pub verb: String,

    /// Request path, without query string
    #[arg(short, long)]
    pub path: String,

    /// Raw query string, e.g. `pretty=1&limit=10`
    #[arg(short, long)]
    pub query: Option<String>,

    /// Request body
    #[arg(short, long)]
    pub body: Option<String>,

    /// Request `Content-Type`
    #[arg(long)]
    pub content_type: Option<String>,

    /// Request `Accept` header
    #[arg(long)]
    pub accept: Option<String>,

    /// Router configuration file (TOML)
    #[arg(long, env = "MICRO_ROUTER_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Logging settings: the `[logging]` table of the `dispatch` config file
    /// when one is given, then `MICRO_ROUTER_LOG_*` overrides.
    pub fn log_config(&self) -> anyhow::Result<LogConfig> {
        let section = match &self.command {
            Commands::Dispatch(DispatchArgs {
                config: Some(path), ..
            }) => RouterConfig::load(path)?.logging,
            _ => LoggingSection::default(),
        };
        Ok(LogConfig::from_section(&section).with_env_overrides())
    }
}

/// Parse arguments, install logging and run the selected command, printing
/// its output.
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_config()?)?;
    let output = match &cli.command {
        Commands::Inspect { routes, verb, path } => run_inspect(routes, verb, path)?,
        Commands::Dispatch(args) => run_dispatch(args)?,
    };
    print!("{output}");
    Ok(())
}

/// One line per route: pattern, match result, derived method and captures.
pub fn run_inspect(routes: &Path, verb: &str, path: &str) -> anyhow::Result<String> {
    let table = RouteTable::load(routes)?;
    let verb = normalize_verb(verb);
    let path = normalize_path(path);

    let mut out = String::new();
    for def in &table.routes {
        let mut route = echo_route(def);
        let matched = route
            .match_path(&path)
            .with_context(|| format!("Invalid route pattern: {}", def.path))?;
        if !matched {
            writeln!(out, "{:<32} no match", def.path)?;
            continue;
        }

        let method = route
            .callable(&verb, &path, None)
            .map(|c| c.method)
            .unwrap_or_default();
        let mut captures: Vec<String> = route
            .params()
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        captures.sort_unstable();
        writeln!(
            out,
            "{:<32} match    {}::{} [{}]",
            def.path,
            def.target,
            method,
            captures.join(", ")
        )?;
    }
    Ok(out)
}

/// Run the request through a router over the table and render the response.
pub fn run_dispatch(args: &DispatchArgs) -> anyhow::Result<String> {
    let config = match &args.config {
        Some(path) => RouterConfig::load(path)?,
        None => RouterConfig::default(),
    }
    .with_env_overrides();
    let table = RouteTable::load(&args.routes)?;

    let mut ctx = RequestContext::new(&args.verb, &args.path);
    if let Some(query) = &args.query {
        ctx = ctx.with_query_string(query);
    }
    if let Some(content_type) = &args.content_type {
        ctx = ctx.with_content_type(content_type);
    }
    if let Some(body) = &args.body {
        ctx = ctx.with_body(body.as_bytes());
    }
    if let Some(accept) = &args.accept {
        ctx = ctx.with_header("Accept", accept);
    }

    let mut router = Router::new(ctx).with_config(config);
    for route in echo_routes(&table) {
        router.append_route(route);
    }

    let mut sink = BufferedResponse::new();
    router.run(&mut sink);
    info!(status = sink.status, body_bytes = sink.body.len(), "Dispatch finished");
    Ok(sink.to_http_string())
}
