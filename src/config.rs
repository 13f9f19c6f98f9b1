//! # Configuration Module
//!
//! Router behavior and route tables loaded from TOML, with environment
//! variable overrides.
//!
//! ## Router configuration
//!
//! ```toml
//! default_format = "json"        # json | xml | text
//! json_query_fallback = false    # parse the first query segment as JSON when a JSON body is empty
//! pretty_param = "pretty"        # query parameter toggling indentation
//!
//! [logging]
//! level = "info"
//! format = "pretty"              # json | pretty
//! ```
//!
//! ## Environment Variables
//!
//! ### `MICRO_ROUTER_DEFAULT_FORMAT`
//!
//! Overrides `default_format`. Unknown values are ignored with a warning.
//!
//! ### `MICRO_ROUTER_JSON_QUERY_FALLBACK`
//!
//! Overrides `json_query_fallback`; `1`/`true`/`yes`/`on` enable it, anything
//! else disables it.
//!
//! ## Route tables
//!
//! ```toml
//! [[routes]]
//! path = "/users/{id:#\\d+#}"
//! target = "Users"
//! method = "getUser"            # optional, derived from path and verb when absent
//! continue = false              # keep evaluating later routes after a match
//!
//! [[routes.params]]
//! name = "id"
//! kind = "int"                  # any | bool | int | float | string | array
//!
//! [[routes.params]]
//! name = "verbose"
//! kind = "bool"
//! default = false               # a default makes the parameter optional
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use tracing::warn;

use crate::handler::{ParamKind, ParamSpec};
use crate::response::OutputFormat;

/// Environment variable overriding [`RouterConfig::default_format`].
pub const ENV_DEFAULT_FORMAT: &str = "MICRO_ROUTER_DEFAULT_FORMAT";
/// Environment variable overriding [`RouterConfig::json_query_fallback`].
pub const ENV_JSON_QUERY_FALLBACK: &str = "MICRO_ROUTER_JSON_QUERY_FALLBACK";

/// Router behavior settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Format used when neither the handler nor the `Accept` header picks one
    pub default_format: OutputFormat,
    /// Legacy: with an empty JSON body, parse the first `&`-segment of the
    /// query string as the JSON parameter source
    pub json_query_fallback: bool,
    /// Query parameter that toggles pretty output
    pub pretty_param: String,
    /// Logging settings for binaries embedding the router
    pub logging: LoggingSection,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            default_format: OutputFormat::Json,
            json_query_fallback: false,
            pretty_param: "pretty".to_string(),
            logging: LoggingSection::default(),
        }
    }
}

/// `[logging]` table of the router configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    pub format: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl RouterConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        toml::from_str(contents).context("Failed to parse router config")
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read router config: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse router config: {}", path.display()))
    }

    /// Apply `MICRO_ROUTER_*` environment overrides.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(val) = lookup(ENV_DEFAULT_FORMAT) {
            match val.trim().to_lowercase().parse::<OutputFormat>() {
                Ok(format) => self.default_format = format,
                Err(e) => warn!(variable = ENV_DEFAULT_FORMAT, value = %val, error = %e, "Ignoring invalid override"),
            }
        }
        if let Some(val) = lookup(ENV_JSON_QUERY_FALLBACK) {
            self.json_query_fallback = matches!(
                val.trim().to_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
        self
    }
}

/// Kind names accepted in route files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKindName {
    #[default]
    Any,
    Bool,
    Int,
    Float,
    String,
    Array,
}

impl From<ParamKindName> for ParamKind {
    fn from(kind: ParamKindName) -> Self {
        match kind {
            ParamKindName::Any => ParamKind::Any,
            ParamKindName::Bool => ParamKind::Bool,
            ParamKindName::Int => ParamKind::Int,
            ParamKindName::Float => ParamKind::Float,
            ParamKindName::String => ParamKind::String,
            ParamKindName::Array => ParamKind::Array,
        }
    }
}

/// A declared handler parameter in a route file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDef {
    pub name: String,
    #[serde(default)]
    pub kind: ParamKindName,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
}

impl ParamDef {
    #[must_use]
    pub fn to_spec(&self) -> ParamSpec {
        ParamSpec {
            name: self.name.clone(),
            kind: self.kind.into(),
            default: self.default.clone(),
        }
    }
}

/// One `[[routes]]` entry of a route file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDef {
    pub path: String,
    pub target: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default, rename = "continue")]
    pub continue_propagation: bool,
    #[serde(default)]
    pub params: Vec<ParamDef>,
}

impl RouteDef {
    /// Declared parameters as binding specs.
    #[must_use]
    pub fn param_specs(&self) -> Vec<ParamSpec> {
        self.params.iter().map(ParamDef::to_spec).collect()
    }
}

/// Ordered route definitions loaded from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteTable {
    #[serde(default)]
    pub routes: Vec<RouteDef>,
}

impl RouteTable {
    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        toml::from_str(contents).context("Failed to parse route table")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read route table: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse route table: {}", path.display()))
    }
}
