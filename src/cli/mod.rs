//! # CLI Module
//!
//! Command-line access to route tables.
//!
//! ## Commands
//!
//! ### `inspect`
//!
//! Show how each route of a table treats a request, without invoking anything:
//!
//! ```bash
//! micro-router inspect --routes routes.toml --verb GET --path /users/42
//! ```
//!
//! Prints one line per route: pattern, match result, captures and the method
//! that would be invoked.
//!
//! ### `dispatch`
//!
//! Run a full request through a router backed by echo controllers and print
//! the raw HTTP response:
//!
//! ```bash
//! micro-router dispatch --routes routes.toml --verb POST --path /users \
//!     --content-type application/json --body '{"name":"ada"}' --query pretty=1
//! ```
//!
//! Options:
//! - `--query <QUERY>` - Raw query string
//! - `--body <BODY>` - Request body
//! - `--content-type <TYPE>` - Request `Content-Type`
//! - `--accept <ACCEPT>` - Request `Accept` header
//! - `--config <FILE>` - Router configuration (TOML)

mod commands;


pub use commands::{run_cli, run_dispatch, run_inspect, Cli, Commands, DispatchArgs};
