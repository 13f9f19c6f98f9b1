use serde_json::Value;
use std::any::Any;
use std::sync::Arc;

use crate::error::RouterError;

/// Converter used by [`ParamKind::Object`] to build a value from its raw input.
pub type FromValue = fn(Value) -> Result<Value, RouterError>;

/// Declared type of a handler parameter.
///
/// Drives coercion of raw request values during binding.
#[derive(Debug, Clone)]
pub enum ParamKind {
    /// Value passed through unchanged
    Any,
    /// `"false"`, `"0"` and `""` are false, every other value is true
    Bool,
    /// Leading-numeric parse, 0 when the value has no numeric prefix
    Int,
    /// Leading-numeric parse, 0.0 when the value has no numeric prefix
    Float,
    /// Scalars are stringified, structured values pass through
    String,
    /// Arrays and maps are kept, scalars are wrapped in a one element array
    Array,
    /// An object type.
    ///
    /// A present value goes through `from_value` when one is given. An absent
    /// value is looked up in the service registry under `type_name`.
    Object {
        /// Type name, also the service registry key
        type_name: String,
        /// Single-argument constructor applied to present values
        from_value: Option<FromValue>,
    },
}

impl ParamKind {
    /// Object kind without a converter, resolved from the registry when absent.
    pub fn service(type_name: impl Into<String>) -> Self {
        ParamKind::Object {
            type_name: type_name.into(),
            from_value: None,
        }
    }

    /// Object kind that builds present values with `from_value`.
    pub fn object(type_name: impl Into<String>, from_value: FromValue) -> Self {
        ParamKind::Object {
            type_name: type_name.into(),
            from_value: Some(from_value),
        }
    }

    /// Short lower-case name of the kind, as used in route files.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            ParamKind::Any => "any",
            ParamKind::Bool => "bool",
            ParamKind::Int => "int",
            ParamKind::Float => "float",
            ParamKind::String => "string",
            ParamKind::Array => "array",
            ParamKind::Object { type_name, .. } => type_name,
        }
    }
}

/// Declared parameter of a controller method: name, kind and optional default.
///
/// A parameter with a default is optional.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
    pub default: Option<Value>,
}

impl ParamSpec {
    /// Required parameter.
    pub fn required(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
        }
    }

    /// Optional parameter falling back to `default`.
    pub fn optional(name: impl Into<String>, kind: ParamKind, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            kind,
            default: Some(default.into()),
        }
    }

    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.default.is_some()
    }
}

/// A bound argument: a plain value or a service from the registry.
#[derive(Clone)]
pub enum Arg {
    Value(Value),
    Service(Arc<dyn Any + Send + Sync>),
}

impl std::fmt::Debug for Arg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arg::Value(v) => write!(f, "Value({v})"),
            Arg::Service(_) => write!(f, "Service(..)"),
        }
    }
}

/// Arguments bound for one handler invocation, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Args {
    values: Vec<(String, Arg)>,
}

impl Args {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an argument. Later pushes of the same name shadow earlier ones.
    pub fn push(&mut self, name: impl Into<String>, arg: Arg) {
        self.values.push((name.into(), arg));
    }

    /// Bound value of `name`, `None` for absent names and services.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self.arg(name)? {
            Arg::Value(v) => Some(v),
            Arg::Service(_) => None,
        }
    }

    /// Raw bound argument of `name`.
    #[must_use]
    pub fn arg(&self, name: &str) -> Option<&Arg> {
        self.values
            .iter()
            .rfind(|(k, _)| k == name)
            .map(|(_, a)| a)
    }

    #[must_use]
    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    #[must_use]
    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    #[must_use]
    pub fn float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    #[must_use]
    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// Service bound to `name`, downcast to `T`.
    #[must_use]
    pub fn service<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        match self.arg(name)? {
            Arg::Service(s) => Arc::clone(s).downcast::<T>().ok(),
            Arg::Value(_) => None,
        }
    }

    /// Iterate over `(name, arg)` pairs in binding order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arg)> {
        self.values.iter().map(|(k, a)| (k.as_str(), a))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Plain values as a JSON object; services are skipped.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let map = self
            .values
            .iter()
            .filter_map(|(k, a)| match a {
                Arg::Value(v) => Some((k.clone(), v.clone())),
                Arg::Service(_) => None,
            })
            .collect::<serde_json::Map<_, _>>();
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_args_accessors() {
        let mut args = Args::new();
        args.push("id", Arg::Value(json!(42)));
        args.push("name", Arg::Value(json!("ada")));
        args.push("db", Arg::Service(Arc::new(String::from("pool"))));

        assert_eq!(args.int("id"), Some(42));
        assert_eq!(args.str("name"), Some("ada"));
        assert!(args.get("db").is_none());
        assert_eq!(
            args.service::<String>("db").as_deref(),
            Some(&"pool".to_string())
        );
        assert!(args.service::<u32>("db").is_none());
        assert_eq!(args.to_json(), json!({"id": 42, "name": "ada"}));
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn test_optional_param() {
        let p = ParamSpec::optional("verbose", ParamKind::Bool, false);
        assert!(p.is_optional());
        assert_eq!(p.default, Some(json!(false)));
        assert!(!ParamSpec::required("id", ParamKind::Int).is_optional());
    }
}
