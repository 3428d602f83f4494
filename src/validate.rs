//! Strict-mode validation: detect unknown keys in settings files.
//!
//! Deserializes into the settings layer (all-optional fields) through
//! `serde_ignored` and reports every key the layer doesn't consume, with its
//! file path and best-effort line number.

use std::path::Path;

use confique::Config;

use crate::error::EncfigError;
use crate::settings::Settings;

pub fn validate_unknown_keys(content: &str, path: &Path) -> Result<(), EncfigError> {
    let mut unknown: Vec<String> = Vec::new();

    let deserializer = toml::Deserializer::new(content);
    let _layer: <Settings as Config>::Layer =
        serde_ignored::deserialize(deserializer, |ignored| unknown.push(ignored.to_string()))
            .map_err(|e| EncfigError::SettingsParse {
                path: path.to_path_buf(),
                source: e,
            })?;

    if unknown.is_empty() {
        return Ok(());
    }

    let errors = unknown
        .into_iter()
        .map(|key| EncfigError::UnknownKey {
            line: find_key_line(content, &key),
            key,
            path: path.to_path_buf(),
        })
        .collect();
    Err(EncfigError::UnknownKeys(errors))
}

/// 1-indexed line of `dotted_key` in `content`, or 0 if not found.
///
/// Tracks `[section]` headers so `probe.token` only matches a `token = ...`
/// line inside `[probe]`. Quoted keys and inline tables are not handled.
fn find_key_line(content: &str, dotted_key: &str) -> usize {
    let (section, leaf) = match dotted_key.rsplit_once('.') {
        Some((section, leaf)) => (section, leaf),
        None => ("", dotted_key),
    };

    let mut current = String::new();
    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if let Some(header) = trimmed.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
            current = header
                .split('.')
                .map(str::trim)
                .collect::<Vec<_>>()
                .join(".");
            continue;
        }
        if current == section
            && let Some(rest) = trimmed.strip_prefix(leaf)
            && rest.trim_start().starts_with('=')
        {
            return i + 1;
        }
    }
    0
}
