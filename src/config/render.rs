//! Block-style YAML rendering for rewritten config files.
//!
//! String scalars are always written single-quoted so values such as
//! `'1883'` or `'true'` stay strings when read back. Strings containing
//! control characters, line or paragraph separators, or a byte order mark
//! fall back to escaped double quotes. Keys follow the same rule. Comments
//! and the original formatting of a file are not preserved.

use serde_json::{Map, Number, Value};

const INDENT: usize = 2;

/// Words a YAML reader would resolve to a non-string if left plain.
const RESERVED: &[&str] = &[
    "true", "false", "yes", "no", "on", "off", "y", "n", "null", "~",
];

/// Render a tree as a YAML document.
pub fn render_yaml(value: &Value) -> String {
    let mut out = String::new();
    match value {
        Value::Object(map) if !map.is_empty() => write_mapping(&mut out, 0, map),
        Value::Array(items) if !items.is_empty() => write_sequence(&mut out, 0, items),
        other => {
            out.push_str(&scalar(other));
            out.push('\n');
        }
    }
    out
}

fn write_mapping(out: &mut String, indent: usize, map: &Map<String, Value>) {
    let pad = " ".repeat(indent);
    for (key, value) in map {
        out.push_str(&pad);
        out.push_str(&render_key(key));
        out.push(':');
        match value {
            Value::Object(child) if !child.is_empty() => {
                out.push('\n');
                write_mapping(out, indent + INDENT, child);
            }
            // Sequences sit at the key's own indentation.
            Value::Array(items) if !items.is_empty() => {
                out.push('\n');
                write_sequence(out, indent, items);
            }
            other => {
                out.push(' ');
                out.push_str(&scalar(other));
                out.push('\n');
            }
        }
    }
}

fn write_sequence(out: &mut String, indent: usize, items: &[Value]) {
    let pad = " ".repeat(indent);
    for item in items {
        out.push_str(&pad);
        out.push_str("- ");
        let nested = indent + INDENT;
        let mut body = String::new();
        match item {
            Value::Object(map) if !map.is_empty() => write_mapping(&mut body, nested, map),
            Value::Array(inner) if !inner.is_empty() => write_sequence(&mut body, nested, inner),
            other => {
                out.push_str(&scalar(other));
                out.push('\n');
                continue;
            }
        }
        // First line of the nested block shares the dash line.
        out.push_str(&body[nested..]);
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number(n),
        Value::String(s) => quote(s),
        Value::Array(_) => "[]".to_string(),
        Value::Object(_) => "{}".to_string(),
    }
}

fn number(n: &Number) -> String {
    if n.is_f64() {
        let f = n.as_f64().unwrap_or_default();
        if f.is_nan() {
            return ".nan".to_string();
        }
        if f.is_infinite() {
            return if f > 0.0 { ".inf" } else { "-.inf" }.to_string();
        }
        let text = f.to_string();
        if text.contains(['.', 'e', 'E']) {
            text
        } else {
            format!("{text}.0")
        }
    } else {
        n.to_string()
    }
}

/// Characters a YAML reader folds or drops unless escaped.
fn needs_escape(c: char) -> bool {
    c.is_control() || matches!(c, '\u{2028}' | '\u{2029}' | '\u{FEFF}')
}

fn quote(s: &str) -> String {
    if s.chars().any(needs_escape) {
        double_quote(s)
    } else {
        format!("'{}'", s.replace('\'', "''"))
    }
}

fn double_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{85}' => out.push_str("\\N"),
            '\u{2028}' => out.push_str("\\L"),
            '\u{2029}' => out.push_str("\\P"),
            c if needs_escape(c) => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn render_key(key: &str) -> String {
    let mut chars = key.chars();
    let plain = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && !RESERVED.contains(&key.to_ascii_lowercase().as_str());
    if plain { key.to_string() } else { quote(key) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reparse(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_strings_single_quoted() {
        let doc = json!({"mqtt": {"host": "broker.local", "port": 1883}});
        let text = render_yaml(&doc);
        assert_eq!(text, "mqtt:\n  host: 'broker.local'\n  port: 1883\n");
    }

    #[test]
    fn test_device_list_layout() {
        let doc = json!({"devices": [{"name": "grill", "interval": 15}], "log": true});
        let text = render_yaml(&doc);
        assert_eq!(
            text,
            "devices:\n- name: 'grill'\n  interval: 15\nlog: true\n"
        );
    }

    #[test]
    fn test_ambiguous_strings_survive_reparse() {
        let doc = json!({
            "a": "1883",
            "b": "true",
            "c": "it's",
            "d": "",
            "e": "line\nbreak",
            "f": 2.0,
            "g": null,
            "h": [],
            "i": {},
            "yes": "key needs quotes",
            "with space": [[1, 2], ["x"]],
            "j": "next\u{85}line",
            "k": "para\u{2029}graph",
            "l": "\u{FEFF}marked",
            "m": "tab\there \"quoted\" back\\slash",
            "sep\u{2028}key": "line separator in key"
        });
        let text = render_yaml(&doc);
        assert!(text.contains("'yes': 'key needs quotes'"));
        assert!(text.contains("c: 'it''s'"));
        assert_eq!(reparse(&text), doc);
    }

    #[test]
    fn test_separators_escaped_in_double_quotes() {
        let doc = json!({"a": "x\u{85}y", "b\u{2028}": "p\u{2029}q", "c": "\u{FEFF}z"});
        let text = render_yaml(&doc);
        assert!(text.contains("a: \"x\\Ny\""));
        assert!(text.contains("\"b\\L\": \"p\\Pq\""));
        assert!(text.contains("c: \"\\uFEFFz\""));
        assert!(!text.contains('\u{2028}'));
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(render_yaml(&json!({})), "{}\n");
        assert_eq!(reparse(&render_yaml(&json!({}))), json!({}));
    }
}
