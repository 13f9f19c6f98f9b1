use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::RouterError;
use crate::handler::{Callable, Controller, ServiceRegistry, Target};

/// `{name:#regex#}` (groups 1 and 2) or `{name}` (group 3).
static PLACEHOLDER: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z0-9_]+):#(.+?)#\}|\{([A-Za-z0-9_]+)\}"));

static CAMEL_BOUNDARY: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"([a-z])([A-Z])"));

/// One routing rule.
///
/// Patterns are literal text with placeholders:
///
/// | placeholder | matches |
/// |---|---|
/// | `{id}` | `\w+` |
/// | `{id:#\d+#}` | the regex between the `#` marks |
///
/// The typed regex is used exactly as written, with no implicit repetition:
/// `{id:#\d#}` matches `/users/42` too, capturing only `id = "4"`. Write
/// the quantifier (`\d+`) or end the pattern with `$` to capture whole
/// segments.
///
/// Matching is anchored at the start of the path only, so `/users` also
/// matches `/users/42/posts`. A trailing `$` anchors the end and makes the
/// method name the bare verb.
///
/// ```rust
/// use micro_router::handler::Resource;
/// use micro_router::Route;
/// use std::sync::Arc;
///
/// let mut route = Route::new("/users/{id:#\\d+#}", Arc::new(Resource::new("Users")));
/// assert!(route.match_path("/users/42").unwrap());
/// assert_eq!(route.params().get("id").map(String::as_str), Some("42"));
/// assert!(!route.match_path("/users/abc").unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct Route {
    pattern: String,
    target: Target,
    method: Option<String>,
    params: HashMap<String, String>,
    continue_propagation: bool,
}

impl Route {
    pub fn new(pattern: impl Into<String>, target: impl Into<Target>) -> Self {
        Self {
            pattern: pattern.into(),
            target: target.into(),
            method: None,
            params: HashMap::new(),
            continue_propagation: false,
        }
    }

    /// Invoke `method` instead of deriving the name from path and verb.
    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Keep evaluating later routes after this one matched and ran.
    #[must_use]
    pub fn continue_propagation(mut self, next: bool) -> Self {
        self.continue_propagation = next;
        self
    }

    #[must_use]
    pub fn continues(&self) -> bool {
        self.continue_propagation
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn target(&self) -> &Target {
        &self.target
    }

    #[must_use]
    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    /// Captures of the most recent successful match.
    #[must_use]
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    pub fn set_params(&mut self, params: HashMap<String, String>) -> &mut Self {
        self.params = params;
        self
    }

    /// Regex source the pattern translates to.
    pub fn regex_source(&self) -> Result<String, RouterError> {
        let placeholder = grammar(&PLACEHOLDER)?;
        let (body, anchored) = match self.pattern.strip_suffix('$') {
            Some(body) => (body, true),
            None => (self.pattern.as_str(), false),
        };

        let mut source = String::from("^");
        let mut last = 0;
        for caps in placeholder.captures_iter(body) {
            let Some(whole) = caps.get(0) else { continue };
            source.push_str(&regex::escape(&body[last..whole.start()]));
            match (caps.get(1), caps.get(2), caps.get(3)) {
                (Some(name), Some(expr), _) => {
                    source.push_str(&format!("(?P<{}>{})", name.as_str(), expr.as_str()));
                }
                (_, _, Some(name)) => {
                    source.push_str(&format!(r"(?P<{}>\w+)", name.as_str()));
                }
                _ => source.push_str(&regex::escape(whole.as_str())),
            }
            last = whole.end();
        }
        source.push_str(&regex::escape(&body[last..]));
        if anchored {
            source.push('$');
        }
        Ok(source)
    }

    /// Test `path` against the pattern.
    ///
    /// On a match every named capture is stored in [`params`](Self::params),
    /// replacing same-named values. A failed match leaves them untouched.
    pub fn match_path(&mut self, path: &str) -> Result<bool, RouterError> {
        let source = self.regex_source()?;
        let regex = Regex::new(&source).map_err(|e| RouterError::InvalidRoutePattern {
            pattern: self.pattern.clone(),
            reason: e.to_string(),
        })?;

        let Some(caps) = regex.captures(path) else {
            return Ok(false);
        };
        for name in regex.capture_names().flatten() {
            if let Some(value) = caps.name(name) {
                self.params
                    .insert(name.to_string(), value.as_str().to_string());
            }
        }
        Ok(true)
    }

    /// Resolve the controller instance and the method to invoke.
    ///
    /// `None` when the target cannot be resolved: a service id unknown to (or
    /// without) the registry.
    #[must_use]
    pub fn callable(
        &self,
        verb: &str,
        path: &str,
        registry: Option<&dyn ServiceRegistry>,
    ) -> Option<Callable> {
        let controller = self.resolve(registry)?;
        let method = match &self.method {
            Some(m) => m.clone(),
            None => self.derive_method(verb, path, controller.name()),
        };
        Some(Callable { controller, method })
    }

    fn resolve(&self, registry: Option<&dyn ServiceRegistry>) -> Option<Arc<dyn Controller>> {
        match &self.target {
            Target::Instance(c) => Some(Arc::clone(c)),
            Target::Service(id) => {
                let found = registry.and_then(|r| r.controller(id));
                if found.is_none() {
                    debug!(target_id = %id, has_registry = registry.is_some(), "Controller not found");
                }
                found
            }
            Target::Constructor { name, ctor } => registry
                .and_then(|r| r.controller(name))
                .or_else(|| Some(ctor())),
        }
    }

    /// Method name from verb and the last path segment.
    ///
    /// `get /api/user-profile/settings` on `UserProfile` gives `getSettings`;
    /// `get /api/user-profile` gives `get`; a last segment that is a captured
    /// value is not used as the action.
    #[must_use]
    pub fn derive_method(&self, verb: &str, path: &str, controller_name: &str) -> String {
        if self.pattern.ends_with('$') {
            return verb.to_string();
        }

        let segment = path.rsplit('/').next().unwrap_or(path);
        let mut action = if self.params.values().any(|v| v == segment) {
            ""
        } else {
            segment
        };

        if action == camel_case_to_dashes(short_name(controller_name)) {
            action = "";
        }

        build_method_name(verb, action)
    }
}

fn grammar(cell: &'static Lazy<Result<Regex, regex::Error>>) -> Result<&'static Regex, RouterError> {
    cell.as_ref().map_err(|e| {
        warn!(error = %e, "Route grammar failed to compile");
        RouterError::InvalidRoutePattern {
            pattern: String::new(),
            reason: e.to_string(),
        }
    })
}

/// Text after the last `::` or `\` of a controller name.
#[must_use]
pub fn short_name(name: &str) -> &str {
    let after_path = name.rsplit("::").next().unwrap_or(name);
    after_path.rsplit('\\').next().unwrap_or(after_path)
}

/// `UserProfile` → `user-profile`.
#[must_use]
pub fn camel_case_to_dashes(value: &str) -> String {
    match CAMEL_BOUNDARY.as_ref() {
        Ok(re) => re.replace_all(value, "$1-$2").to_lowercase(),
        Err(_) => value.to_lowercase(),
    }
}

/// Verb followed by each `-`-separated part with its first letter upper-cased.
#[must_use]
pub fn build_method_name(verb: &str, action: &str) -> String {
    let mut name = verb.to_string();
    for part in action.split('-') {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            name.extend(first.to_uppercase());
            name.push_str(chars.as_str());
        }
    }
    name
}
