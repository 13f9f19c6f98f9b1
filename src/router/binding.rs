//! Request value decoding and coercion for handler parameters.

use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use tracing::debug;

use crate::config::RouterConfig;
use crate::error::RouterError;
use crate::handler::{Arg, ParamKind};
use crate::request::{parse_form, RequestContext};

pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
pub const JSON: &str = "application/json";

/// Body parameters decoded per content type.
#[derive(Debug, Default)]
pub struct DecodedBody {
    /// Fields taking part in the merge
    pub fields: Map<String, Value>,
    /// Whether `fields` came from a JSON document
    pub is_json: bool,
}

/// Decode the request body according to the normalized content type.
///
/// JSON bodies must be objects. An empty JSON body yields no fields unless
/// `json_query_fallback` is set, in which case the first `&`-segment of the
/// raw query string is decoded as the document.
pub fn decode_body(
    content_type: &str,
    ctx: &RequestContext,
    config: &RouterConfig,
) -> Result<DecodedBody, RouterError> {
    match content_type {
        FORM_URLENCODED => Ok(DecodedBody {
            fields: parse_form(ctx.body())
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect(),
            is_json: false,
        }),
        JSON => {
            let body = String::from_utf8_lossy(ctx.body());
            let document = if !body.is_empty() {
                body.into_owned()
            } else if config.json_query_fallback {
                let segment = ctx.query_string().split('&').next().unwrap_or_default();
                let decoded = urlencoding::decode(segment)
                    .map_err(|e| RouterError::InvalidJson(e.to_string()))?;
                debug!(segment = %decoded, "Reading JSON parameters from query string");
                decoded.into_owned()
            } else {
                return Ok(DecodedBody {
                    fields: Map::new(),
                    is_json: true,
                });
            };

            match serde_json::from_str::<Value>(&document) {
                Ok(Value::Object(fields)) => Ok(DecodedBody {
                    fields,
                    is_json: true,
                }),
                Ok(other) => Err(RouterError::InvalidJson(format!(
                    "expected an object, got {}",
                    json_type(&other)
                ))),
                Err(e) => Err(RouterError::InvalidJson(e.to_string())),
            }
        }
        _ => Ok(DecodedBody::default()),
    }
}

/// Merge value sources; later sources win.
///
/// Order: decoded body, ambient request params, path captures.
#[must_use]
pub fn merge_sources(
    body: &Map<String, Value>,
    request: &HashMap<String, String>,
    captured: &HashMap<String, String>,
) -> Map<String, Value> {
    let mut merged = body.clone();
    for (k, v) in request.iter().chain(captured.iter()) {
        merged.insert(k.clone(), Value::String(v.clone()));
    }
    merged
}

/// Whether a merged value counts as present.
#[must_use]
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Convert a raw value to the declared kind.
pub fn coerce(kind: &ParamKind, value: Value) -> Result<Arg, RouterError> {
    let value = match kind {
        ParamKind::Any => value,
        ParamKind::Bool => Value::Bool(to_bool(&value)),
        ParamKind::Int => Value::from(to_int(&value)),
        ParamKind::Float => Number::from_f64(to_float(&value))
            .map(Value::Number)
            .unwrap_or_else(|| Value::from(0)),
        ParamKind::String => match value {
            Value::String(_) | Value::Array(_) | Value::Object(_) => value,
            Value::Null => Value::String(String::new()),
            Value::Bool(b) => Value::String(b.to_string()),
            Value::Number(n) => Value::String(n.to_string()),
        },
        ParamKind::Array => match value {
            Value::Array(_) | Value::Object(_) => value,
            Value::Null => Value::Array(Vec::new()),
            scalar => Value::Array(vec![scalar]),
        },
        ParamKind::Object { from_value, .. } => match from_value {
            Some(convert) => convert(value)?,
            None => value,
        },
    };
    Ok(Arg::Value(value))
}

fn to_bool(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !matches!(s.as_str(), "false" | "0" | ""),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn to_int(value: &Value) -> i64 {
    match value {
        Value::Null => 0,
        Value::Bool(b) => i64::from(*b),
        Value::Number(n) => n.as_i64().unwrap_or_else(|| n.as_f64().map_or(0, |f| f as i64)),
        Value::String(s) => leading_number(s).map_or(0, |f| f as i64),
        Value::Array(a) => i64::from(!a.is_empty()),
        Value::Object(o) => i64::from(!o.is_empty()),
    }
}

fn to_float(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => leading_number(s).unwrap_or(0.0),
        other => to_int(other) as f64,
    }
}

/// Parse the longest numeric prefix of `s`: sign, digits, fraction, exponent.
///
/// Leading whitespace is skipped; `None` when no digit is found.
#[must_use]
pub fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        if frac_end > frac_start || digits > 0 {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
