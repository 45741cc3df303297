//! Multi-argument console formatting
//!
//! Turns the raw arguments of a console call into the single line that is
//! written to the file log. Follows the usual console conventions: a leading
//! string is a printf-style template, leftover arguments are appended separated
//! by spaces, and non-string values are shown in an inspected form.

use serde_json::{Map, Number, Value};

/// Nesting shown by `%O` and for trailing arguments
const DEFAULT_DEPTH: usize = 2;
/// Nesting shown by `%o`
const EXPANDED_DEPTH: usize = 4;
/// Nesting shown for objects substituted by `%s`
const SHALLOW_DEPTH: usize = 0;

/// Format console call arguments into one display string
pub fn format_console_args(args: &[Value]) -> String {
    let Some((first, rest)) = args.split_first() else {
        return String::new();
    };

    let (mut out, consumed) = match first {
        Value::String(template) if rest.is_empty() => return template.clone(),
        Value::String(template) => substitute(template, rest),
        other => (inspect(other, DEFAULT_DEPTH), 0),
    };

    for arg in &rest[consumed..] {
        out.push(' ');
        match arg {
            Value::String(s) => out.push_str(s),
            other => out.push_str(&inspect(other, DEFAULT_DEPTH)),
        }
    }
    out
}

/// Expand placeholders in `template`, returning the text and how many of
/// `args` were consumed
fn substitute(template: &str, args: &[Value]) -> (String, usize) {
    let mut out = String::with_capacity(template.len());
    let mut next = 0;
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let Some(&spec) = chars.peek() else {
            out.push('%');
            break;
        };
        if spec == '%' {
            chars.next();
            out.push('%');
            continue;
        }
        if !matches!(spec, 's' | 'd' | 'i' | 'f' | 'j' | 'o' | 'O' | 'c') {
            out.push('%');
            continue;
        }
        // Placeholders without an argument stay literal
        let Some(arg) = args.get(next) else {
            out.push('%');
            continue;
        };
        chars.next();
        next += 1;

        match spec {
            's' => out.push_str(&format_string(arg)),
            'd' => out.push_str(&format_number(to_number(arg))),
            'i' => out.push_str(&format_number(to_integer(arg))),
            'f' => out.push_str(&format_number(to_float(arg))),
            'j' => out.push_str(&arg.to_string()),
            'o' => out.push_str(&inspect(arg, EXPANDED_DEPTH)),
            'O' => out.push_str(&inspect(arg, DEFAULT_DEPTH)),
            // %c carries CSS for browser consoles; consumed and dropped
            _ => {}
        }
    }

    (out, next)
}

fn format_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_json_number(n),
        other => inspect(other, SHALLOW_DEPTH),
    }
}

/// Numeric coercion used by `%d`
fn to_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Null => 0.0,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse().unwrap_or(f64::NAN)
            }
        }
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

/// Integer parse used by `%i`
fn to_integer(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().map(f64::trunc).unwrap_or(f64::NAN),
        Value::String(s) => leading_number(s.trim_start(), false)
            .map(f64::trunc)
            .unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

/// Float parse used by `%f`
fn to_float(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => leading_number(s.trim_start(), true).unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

/// Parse the longest numeric prefix of `s`
fn leading_number(s: &str, allow_fraction: bool) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if allow_fraction && end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    let number = &s[..end];
    if number.len() == digits_start || &number[digits_start..] == "." {
        return None;
    }
    number.parse().ok()
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if n == 0.0 && n.is_sign_negative() {
        "-0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}

fn format_json_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        format_number(n.as_f64().unwrap_or(f64::NAN))
    }
}

/// Inspected form of a value, showing containers up to `max_depth` levels deep
pub fn inspect(value: &Value, max_depth: usize) -> String {
    inspect_at(value, 0, max_depth)
}

fn inspect_at(value: &Value, depth: usize, max_depth: usize) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_json_number(n),
        Value::String(s) => quote(s),
        Value::Array(items) if items.is_empty() => "[]".to_string(),
        Value::Array(_) if depth > max_depth => "[Array]".to_string(),
        Value::Array(items) => {
            let inner: Vec<String> = items
                .iter()
                .map(|item| inspect_at(item, depth + 1, max_depth))
                .collect();
            format!("[ {} ]", inner.join(", "))
        }
        Value::Object(map) if map.is_empty() => "{}".to_string(),
        Value::Object(_) if depth > max_depth => "[Object]".to_string(),
        Value::Object(map) => format!("{{ {} }}", inspect_entries(map, depth, max_depth)),
    }
}

fn inspect_entries(map: &Map<String, Value>, depth: usize, max_depth: usize) -> String {
    map.iter()
        .map(|(key, value)| {
            let key = if is_identifier(key) {
                key.clone()
            } else {
                quote(key)
            };
            format!("{}: {}", key, inspect_at(value, depth + 1, max_depth))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Quote a string, preferring single quotes
fn quote(s: &str) -> String {
    let delimiter = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(delimiter);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c == delimiter => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(delimiter);
    out
}
