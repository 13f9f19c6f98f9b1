//! JSON value → XML document conversion.
//!
//! The document is rooted at `<response>`. Map entries become elements named
//! by the lower-cased key; integer keys and sequence items become `<node>`
//! elements. A scalar body becomes a single `<node>`.

use serde_json::Value;

const ROOT: &str = "response";
const ITEM: &str = "node";
const DECLARATION: &str = "<?xml version=\"1.0\"?>\n";

#[derive(Debug)]
struct Element {
    name: String,
    content: Content,
}

#[derive(Debug)]
enum Content {
    Text(String),
    Children(Vec<Element>),
}

impl Element {
    fn is_empty(&self) -> bool {
        match &self.content {
            Content::Text(t) => t.is_empty(),
            Content::Children(c) => c.is_empty(),
        }
    }
}

/// Convert `body` into an XML document, indented with two spaces when `pretty`.
#[must_use]
pub fn as_xml(body: &Value, pretty: bool) -> String {
    let root = Element {
        name: ROOT.to_string(),
        content: Content::Children(children_of(body)),
    };

    let mut out = String::from(DECLARATION);
    if pretty {
        write_pretty(&root, 0, &mut out);
    } else {
        write_compact(&root, &mut out);
        out.push('\n');
    }
    out
}

fn children_of(value: &Value) -> Vec<Element> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| element(&element_name(k), v))
            .collect(),
        Value::Array(items) => items.iter().map(|v| element(ITEM, v)).collect(),
        scalar => vec![element(ITEM, scalar)],
    }
}

fn element(name: &str, value: &Value) -> Element {
    let content = match value {
        Value::Object(_) | Value::Array(_) => Content::Children(children_of(value)),
        scalar => Content::Text(scalar_text(scalar)),
    };
    Element {
        name: name.to_string(),
        content,
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) | Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Integer keys map to `node`, other keys to a lower-cased valid XML name.
fn element_name(key: &str) -> String {
    if key.parse::<i64>().is_ok() {
        return ITEM.to_string();
    }

    let mut name: String = key
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    match name.chars().next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => name.insert(0, '_'),
    }
    name
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

fn write_compact(el: &Element, out: &mut String) {
    if el.is_empty() {
        out.push_str(&format!("<{}/>", el.name));
        return;
    }
    out.push_str(&format!("<{}>", el.name));
    match &el.content {
        Content::Text(t) => out.push_str(&escape(t)),
        Content::Children(children) => {
            for child in children {
                write_compact(child, out);
            }
        }
    }
    out.push_str(&format!("</{}>", el.name));
}

fn write_pretty(el: &Element, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    if el.is_empty() {
        out.push_str(&format!("{indent}<{}/>\n", el.name));
        return;
    }
    match &el.content {
        Content::Text(t) => {
            out.push_str(&format!("{indent}<{}>{}</{}>\n", el.name, escape(t), el.name));
        }
        Content::Children(children) => {
            out.push_str(&format!("{indent}<{}>\n", el.name));
            for child in children {
                write_pretty(child, depth + 1, out);
            }
            out.push_str(&format!("{indent}</{}>\n", el.name));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_map_keys_are_lowercased() {
        let xml = as_xml(&json!({"Name": "ada", "Age": 36}), false);
        assert_eq!(
            xml,
            "<?xml version=\"1.0\"?>\n<response><name>ada</name><age>36</age></response>\n"
        );
    }

    #[test]
    fn test_elements_keep_insertion_order() {
        let xml = as_xml(&json!({"zeta": 1, "alpha": 2, "mid": {"b": 1, "a": 2}}), false);
        assert_eq!(
            xml,
            "<?xml version=\"1.0\"?>\n<response><zeta>1</zeta><alpha>2</alpha><mid><b>1</b><a>2</a></mid></response>\n"
        );
    }

    #[test]
    fn test_sequences_become_nodes() {
        let xml = as_xml(&json!({"tags": ["a", "b"], "0": "zero"}), false);
        assert!(xml.contains("<tags><node>a</node><node>b</node></tags>"));
        assert!(xml.contains("<node>zero</node>"));
    }

    #[test]
    fn test_scalar_body() {
        let xml = as_xml(&json!("hello & bye"), false);
        assert_eq!(
            xml,
            "<?xml version=\"1.0\"?>\n<response><node>hello &amp; bye</node></response>\n"
        );
    }

    #[test]
    fn test_empty_values_self_close() {
        let xml = as_xml(&json!({"flag": false, "list": []}), false);
        assert!(xml.contains("<flag/>"));
        assert!(xml.contains("<list/>"));
    }

    #[test]
    fn test_pretty() {
        let xml = as_xml(&json!({"user": {"id": 1}}), true);
        assert_eq!(
            xml,
            "<?xml version=\"1.0\"?>\n<response>\n  <user>\n    <id>1</id>\n  </user>\n</response>\n"
        );
    }

    #[test]
    fn test_element_name_sanitized() {
        assert_eq!(element_name("First Name"), "first_name");
        assert_eq!(element_name("1st"), "_1st");
        assert_eq!(element_name("42"), "node");
    }
}
