use toml::{Table, Value};

/// Build a `toml::Table` from environment variables named `{PREFIX}__*`.
///
/// `__` separates nesting levels and single `_` stays part of the key, so
/// `ENCFIG__PROBE__TIMEOUT_SECS` becomes `probe.timeout_secs`. Segments are
/// lowercased to match field names.
///
/// Takes an iterator so tests can pass synthetic data instead of `std::env::vars()`.
pub fn env_to_table(prefix: &str, vars: impl IntoIterator<Item = (String, String)>) -> Table {
    let needle = format!("{prefix}__");
    let mut table = Table::new();

    for (name, raw) in vars {
        let Some(rest) = name.strip_prefix(&needle) else {
            continue;
        };
        let segments: Vec<String> = rest.split("__").map(str::to_lowercase).collect();
        if segments.iter().any(String::is_empty) {
            tracing::warn!(var = %name, "ignoring malformed settings variable");
            continue;
        }
        insert_nested(&mut table, &segments, parse_env_value(&raw));
    }

    table
}

fn insert_nested(table: &mut Table, segments: &[String], value: Value) {
    let Some((leaf, parents)) = segments.split_last() else {
        return;
    };
    let mut current = table;
    for segment in parents {
        let entry = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Table(Table::new()));
        let Value::Table(next) = entry else {
            // A scalar already claimed this prefix (e.g. both X__A and X__A__B).
            return;
        };
        current = next;
    }
    current.insert(leaf.clone(), value);
}

/// Bool, then integer, then float (only with a `.`), then string.
fn parse_env_value(s: &str) -> Value {
    if s.eq_ignore_ascii_case("true") {
        Value::Boolean(true)
    } else if s.eq_ignore_ascii_case("false") {
        Value::Boolean(false)
    } else if let Ok(i) = s.parse::<i64>() {
        Value::Integer(i)
    } else if let Some(f) = s.contains('.').then(|| s.parse::<f64>().ok()).flatten() {
        Value::Float(f)
    } else {
        Value::String(s.to_string())
    }
}
